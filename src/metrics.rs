//! Prometheus metrics shared by the API server, worker and ingest service

use prometheus::{
    Counter, Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: Counter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: Gauge,
    pub aggregation_runs_total: IntCounter,
    pub candles_upserted_total: IntCounter,
    pub invalid_rows_dropped_total: IntCounter,
    /// Labelled by signal direction.
    pub signals_detected_total: IntCounterVec,
    pub trades_ingested_total: IntCounter,
    pub database_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total =
            Counter::with_opts(Opts::new("http_requests_total", "Total HTTP requests"))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = Gauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let aggregation_runs_total = IntCounter::with_opts(Opts::new(
            "aggregation_runs_total",
            "Completed per-symbol aggregation passes",
        ))?;
        let candles_upserted_total = IntCounter::with_opts(Opts::new(
            "candles_upserted_total",
            "Candles written by aggregation passes",
        ))?;
        let invalid_rows_dropped_total = IntCounter::with_opts(Opts::new(
            "invalid_rows_dropped_total",
            "Candle and trade rows rejected by validation",
        ))?;
        let signals_detected_total = IntCounterVec::new(
            Opts::new("signals_detected_total", "Signals produced by the rule set"),
            &["direction"],
        )?;
        let trades_ingested_total = IntCounter::with_opts(Opts::new(
            "trades_ingested_total",
            "Trades persisted from the exchange stream",
        ))?;
        let database_connected = Gauge::with_opts(Opts::new(
            "database_connected",
            "1 when the QuestDB connection is up",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(aggregation_runs_total.clone()))?;
        registry.register(Box::new(candles_upserted_total.clone()))?;
        registry.register(Box::new(invalid_rows_dropped_total.clone()))?;
        registry.register(Box::new(signals_detected_total.clone()))?;
        registry.register(Box::new(trades_ingested_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            aggregation_runs_total,
            candles_upserted_total,
            invalid_rows_dropped_total,
            signals_detected_total,
            trades_ingested_total,
            database_connected,
        })
    }

    /// Count signals by direction.
    pub fn record_signals(&self, signals: &[crate::models::Signal]) {
        for signal in signals {
            let direction = if signal.is_bullish() { "bullish" } else { "bearish" };
            self.signals_detected_total
                .with_label_values(&[direction])
                .inc();
        }
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
