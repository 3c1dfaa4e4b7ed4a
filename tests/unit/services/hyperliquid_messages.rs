use perpscope::services::hyperliquid::messages::PING_MESSAGE;
use perpscope::services::hyperliquid::{parse_message, StreamMessage, SubscribeRequest};
use serde_json::json;

use crate::fixtures::at;

#[test]
fn test_subscribe_request_shape() {
    let json = serde_json::to_value(SubscribeRequest::trades("BTC")).unwrap();
    assert_eq!(
        json,
        json!({"method": "subscribe", "subscription": {"type": "trades", "coin": "BTC"}})
    );
    let ping: serde_json::Value = serde_json::from_str(PING_MESSAGE).unwrap();
    assert_eq!(ping["method"], "ping");
}

#[test]
fn test_parse_trades_message() {
    let text = json!({
        "channel": "trades",
        "data": [
            {"coin": "BTC", "side": "B", "px": "42000.5", "sz": "0.1", "time": 1704067200000i64, "tid": 1},
            {"coin": "BTC", "px": "42001.0", "time": "1704067260000"}
        ]
    })
    .to_string();

    let StreamMessage::Trades { trades, dropped } = parse_message(&text).unwrap() else {
        panic!("expected trades");
    };
    assert_eq!(dropped, 0);
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].symbol, "BTC");
    assert_eq!(trades[0].price, 42000.5);
    assert_eq!(trades[0].timestamp, at(0, 0));
    assert_eq!(trades[1].timestamp, at(0, 1));
}

#[test]
fn test_parse_drops_bad_rows() {
    let text = json!({
        "channel": "trades",
        "data": [
            {"coin": "BTC", "px": "-1", "time": 1704067200000i64},
            {"coin": "BTC", "px": "abc", "time": 1704067200000i64},
            {"coin": "BTC", "time": 1704067200000i64},
            {"coin": "BTC", "px": "100", "time": "not a time"},
            {"coin": "ETH", "px": "2500", "time": 1704067200000i64}
        ]
    })
    .to_string();

    let StreamMessage::Trades { trades, dropped } = parse_message(&text).unwrap() else {
        panic!("expected trades");
    };
    assert_eq!(dropped, 4);
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].symbol, "ETH");
}

#[test]
fn test_parse_other_channels() {
    let text = r#"{"channel":"subscriptionResponse","data":{"method":"subscribe"}}"#;
    assert_eq!(
        parse_message(text).unwrap(),
        StreamMessage::Other {
            channel: "subscriptionResponse".to_string()
        }
    );

    let pong = r#"{"channel":"pong"}"#;
    assert!(matches!(parse_message(pong).unwrap(), StreamMessage::Other { .. }));
}

#[test]
fn test_parse_rejects_malformed_json() {
    assert!(parse_message("not json").is_err());
    assert!(parse_message(r#"{"channel":"trades","data":{"coin":"BTC"}}"#).is_err());
}
