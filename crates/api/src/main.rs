mod cache;
mod config;
mod metrics;
mod retry;
mod services;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use analysis::{ReportBuilder, ReportOptions, SeoReport};
use cache::{Cache, CacheStats};
use config::AppConfig;
use extract::Extractor;
use metrics::{Metrics, MetricsSnapshot, TimedOperation};
use retry::RetryPolicy;
use services::{CollaboratorFactory, DandelionFactory, ResilientExtractor};

#[derive(Clone)]
struct AppState {
    config: Arc<AppConfig>,
    services: Arc<dyn CollaboratorFactory>,
    cache: Option<Arc<Cache>>,
    metrics: Arc<Metrics>,
}

impl AppState {
    fn new(config: AppConfig, services: Arc<dyn CollaboratorFactory>) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(Cache::new(config.cache.max_entries)));

        Self {
            config: Arc::new(config),
            services,
            cache,
            metrics: Metrics::new(),
        }
    }

    fn report_builder(&self, token: Option<&str>) -> Option<ReportBuilder> {
        let collaborators = self.services.collaborators(token)?;
        let extraction = &self.config.extraction;
        let timeout = Duration::from_secs(extraction.request_timeout_secs);

        let resilient = ResilientExtractor::new(
            collaborators.extractor,
            self.cache.clone(),
            collaborators.cache_scope,
            RetryPolicy::from_config(&self.config.retry),
            self.metrics.clone(),
        );
        let extractor = Extractor::new(Arc::new(resilient), extraction.min_confidence, timeout);

        let options = ReportOptions {
            top_keywords: self.config.report.top_keywords,
            sentiment_timeout: timeout,
        };
        Some(ReportBuilder::new(extractor, collaborators.sentiment, options))
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    extraction_configured: bool,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    content: String,
    #[serde(default)]
    competitor_content: Option<String>,
    /// Overrides the configured Dandelion token for this request.
    #[serde(default)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(config.logging.json);

    if config.extraction.token.is_none() {
        warn!("DANDELION_TOKEN is not set; requests must supply their own token");
    }

    let services = Arc::new(DandelionFactory::new(
        config.extraction.base_url.clone(),
        config.extraction.token.clone(),
    ));
    let bind_addr = config.server.bind_addr.clone();
    let mode = config.mode;
    let state = Arc::new(AppState::new(config, services));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context(format!("Failed to bind {}", bind_addr))?;

    info!(addr = %bind_addr, mode = ?mode, "Server listening");

    axum::serve(listener, router(state)).await.context("Server error")?;
    Ok(())
}

fn init_tracing(json: bool) {
    if json {
        tracing_subscriber::fmt().json().init();
    } else {
        tracing_subscriber::fmt::init();
    }
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze))
        .route("/metrics", get(get_metrics))
        .route("/cache/stats", get(get_cache_stats))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        extraction_configured: state.services.has_default_token(),
    })
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<SeoReport>, StatusCode> {
    let request_id = Uuid::new_v4();

    if req.content.trim().is_empty() {
        warn!(%request_id, "Rejected request with empty content");
        state.metrics.record_request(false);
        return Err(StatusCode::BAD_REQUEST);
    }

    let Some(builder) = state.report_builder(req.token.as_deref()) else {
        warn!(%request_id, "Rejected request without an API token");
        state.metrics.record_request(false);
        return Err(StatusCode::UNAUTHORIZED);
    };

    let timer = TimedOperation::start();
    let report = builder
        .build(&req.content, req.competitor_content.as_deref())
        .await;

    state.metrics.record_report(timer.elapsed(), report.warnings.len());
    state.metrics.record_request(true);
    info!(
        %request_id,
        entities = report.entities.len(),
        warnings = report.warnings.len(),
        elapsed_ms = timer.elapsed().as_millis(),
        "Analysis complete"
    );

    Ok(Json(report))
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn get_cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    let stats = match &state.cache {
        Some(cache) => cache.stats(),
        None => CacheStats {
            annotations_cached: 0,
            max_entries: 0,
        },
    };
    Json(stats)
}
