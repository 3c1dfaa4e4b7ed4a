//! HTTP endpoint server using Axum

use apalis::prelude::*;
use apalis_redis::RedisStorage;
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

use crate::config::{self, parse_symbol_list, EngineConfig};
use crate::db::{InMemoryStore, MarketStore, QuestDatabase, StoreError};
use crate::jobs::context::JobContext;
use crate::jobs::handlers::run_aggregation;
use crate::jobs::types::AggregateCandlesJob;
use crate::metrics::Metrics;
use crate::models::{Candle, IndicatorSet, Interval, Signal, SignalBoard};
use crate::services::analysis::{MarketAnalyzer, DEFAULT_BOARD_INTERVALS};
use crate::services::hyperliquid::HyperliquidRestClient;

const MAX_CANDLE_LIMIT: usize = 1000;
const DEFAULT_TOP_LIMIT: usize = 10;

type ApiError = (StatusCode, Json<Value>);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub analyzer: MarketAnalyzer,
    /// Symbols used when a request names none.
    pub symbols: Vec<String>,
    /// Job queue; `None` runs aggregation requests in-process.
    pub jobs: Option<RedisStorage<AggregateCandlesJob>>,
}

impl AppState {
    pub fn new(analyzer: MarketAnalyzer, metrics: Arc<Metrics>, symbols: Vec<String>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            analyzer,
            symbols,
            jobs: None,
        }
    }

    pub fn with_jobs(mut self, jobs: RedisStorage<AggregateCandlesJob>) -> Self {
        self.jobs = Some(jobs);
        self
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

fn bad_request(message: impl std::fmt::Display) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": message.to_string() })),
    )
}

fn store_failure(e: StoreError, symbol: &str) -> ApiError {
    error!(symbol = %symbol, error = %e, "Store read failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "storage unavailable" })),
    )
}

fn parse_interval(raw: Option<&str>, default: Interval) -> Result<Interval, ApiError> {
    match raw {
        None => Ok(default),
        Some(code) => code.parse().map_err(|e| bad_request(e)),
    }
}

fn parse_intervals(raw: Option<&str>) -> Result<Vec<Interval>, ApiError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(DEFAULT_BOARD_INTERVALS.to_vec());
    };
    raw.split(',')
        .map(|code| code.parse().map_err(|e| bad_request(e)))
        .collect()
}

fn symbols_or_default(raw: Option<&str>, state: &AppState) -> Vec<String> {
    raw.map(parse_symbol_list)
        .filter(|symbols| !symbols.is_empty())
        .unwrap_or_else(|| state.symbols.clone())
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "perpscope"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct SeriesQuery {
    interval: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SignalQuery {
    interval: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardQuery {
    symbols: Option<String>,
    intervals: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct AggregateRequest {
    #[serde(default)]
    symbols: Vec<String>,
}

/// Stored candles, oldest first
async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<SeriesQuery>,
) -> ApiResult<Vec<Candle>> {
    let symbol = symbol.to_uppercase();
    let interval = parse_interval(params.interval.as_deref(), Interval::OneMinute)?;
    let limit = params.limit.unwrap_or(100).clamp(1, MAX_CANDLE_LIMIT);

    let candles = state
        .analyzer
        .store()
        .recent_candles(&symbol, interval, limit)
        .await
        .map_err(|e| store_failure(e, &symbol))?;
    Ok(Json(candles))
}

/// Full indicator set, or 404 when the series is too short
async fn get_indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<SeriesQuery>,
) -> ApiResult<IndicatorSet> {
    let symbol = symbol.to_uppercase();
    let interval = parse_interval(params.interval.as_deref(), Interval::OneHour)?;
    let limit = params
        .limit
        .unwrap_or(state.analyzer.config().indicators.default_limit)
        .clamp(1, MAX_CANDLE_LIMIT);

    let set = state
        .analyzer
        .indicators(&symbol, interval, limit)
        .await
        .map_err(|e| store_failure(e, &symbol))?;

    match set {
        Some(set) => Ok(Json(set)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not enough data",
                "symbol": symbol,
                "interval": interval,
                "minCandles": state.analyzer.config().indicators.min_candles,
            })),
        )),
    }
}

/// Signals firing now for one symbol
async fn get_symbol_signals(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<SignalQuery>,
) -> ApiResult<Vec<Signal>> {
    let symbol = symbol.to_uppercase();
    let interval = parse_interval(params.interval.as_deref(), Interval::OneHour)?;

    let signals = state
        .analyzer
        .signals(&symbol, interval)
        .await
        .map_err(|e| store_failure(e, &symbol))?;
    Ok(Json(signals))
}

/// Signals across symbols and intervals, split by direction
async fn get_signal_board(
    State(state): State<AppState>,
    Query(params): Query<BoardQuery>,
) -> ApiResult<SignalBoard> {
    let symbols = symbols_or_default(params.symbols.as_deref(), &state);
    let intervals = parse_intervals(params.intervals.as_deref())?;
    Ok(Json(state.analyzer.board(&symbols, &intervals).await))
}

/// Strongest signals regardless of direction
async fn get_top_signals(
    State(state): State<AppState>,
    Query(params): Query<BoardQuery>,
) -> ApiResult<Vec<Signal>> {
    let symbols = symbols_or_default(params.symbols.as_deref(), &state);
    let intervals = parse_intervals(params.intervals.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    Ok(Json(state.analyzer.top(&symbols, &intervals, limit).await))
}

/// Schedule aggregation and return immediately
async fn trigger_aggregation(
    State(state): State<AppState>,
    Json(request): Json<AggregateRequest>,
) -> (StatusCode, Json<Value>) {
    let requested = parse_symbol_list(&request.symbols.join(","));
    let symbols = if requested.is_empty() {
        state.symbols.clone()
    } else {
        requested
    };

    let mut queued = false;
    if let Some(jobs) = &state.jobs {
        queued = true;
        for symbol in &symbols {
            let mut storage = jobs.clone();
            if let Err(e) = storage.push(AggregateCandlesJob::new(symbol.as_str())).await {
                warn!(symbol = %symbol, error = %e, "Failed to enqueue aggregation, running in-process");
                queued = false;
                break;
            }
        }
    }

    if !queued {
        let ctx = Arc::new(JobContext::new(
            state.analyzer.clone(),
            Some(state.metrics.clone()),
        ));
        let run_symbols = symbols.clone();
        tokio::spawn(async move {
            let runs = run_symbols.iter().map(|symbol| {
                let ctx = ctx.clone();
                async move {
                    if let Err(e) = run_aggregation(&ctx, symbol).await {
                        error!(symbol = %symbol, error = %e, "Aggregation failed");
                    }
                }
            });
            join_all(runs).await;
        });
    }

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "scheduled": true,
            "symbols": symbols,
            "queue": if queued { "redis" } else { "local" },
        })),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/candles/{symbol}", get(get_candles))
        .route("/api/indicators/{symbol}", get(get_indicators))
        .route("/api/signals", get(get_signal_board))
        .route("/api/signals/top", get(get_top_signals))
        .route("/api/signals/{symbol}", get(get_symbol_signals))
        .route("/api/aggregate", post(trigger_aggregation))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Connect the store, funding client and job queue, falling back to an
/// in-memory store and in-process aggregation when QuestDB or Redis is down.
pub async fn build_state(metrics: Arc<Metrics>) -> AppState {
    let store: Arc<dyn MarketStore> = match QuestDatabase::new().await {
        Ok(db) => {
            info!("QuestDB connected for API server");
            metrics.database_connected.set(1.0);
            Arc::new(db)
        }
        Err(e) => {
            warn!(error = %e, "QuestDB unavailable, serving from an in-memory store");
            metrics.database_connected.set(0.0);
            Arc::new(InMemoryStore::new())
        }
    };

    let analyzer = MarketAnalyzer::new(store, EngineConfig::from_env())
        .with_funding(Arc::new(HyperliquidRestClient::new()))
        .with_metrics(metrics.clone());
    let state = AppState::new(analyzer, metrics, config::get_symbols());

    match apalis_redis::connect(config::get_redis_url()).await {
        Ok(conn) => {
            info!("Redis connected, aggregation requests will be queued");
            state.with_jobs(RedisStorage::new(conn))
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable, aggregation requests run in-process");
            state
        }
    }
}

pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let state = build_state(metrics).await;
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}
