use analytics::MetricsEngine;
use axum::{
    routing::get,
    Router,
};
use configuration::Settings;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod control;
pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// It only holds configuration; trade logs are read fresh on every request.
pub struct AppState {
    pub settings: Settings,
    pub engine: MetricsEngine,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let engine = MetricsEngine::new(settings.risk);
        Self { settings, engine }
    }
}

/// Builds the application routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/metrics", get(handlers::get_metrics))
        .route("/api/daily", get(handlers::get_daily))
        .route("/api/limits", get(handlers::get_limits))
        .route("/api/presets", get(handlers::get_presets))
        .route(
            "/api/control",
            get(handlers::get_control).post(handlers::update_control),
        )
        .with_state(state)
        .layer(cors)
        // Logs information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing is expected to be initialized by the calling binary.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let addr = settings.server.addr;
    tracing::info!(
        logs = %settings.paths.logs_dir().display(),
        base_equity = %settings.risk.base_equity,
        daily_loss_limit_pct = %settings.risk.daily_loss_limit_pct,
        "Serving trade log metrics."
    );

    let app = router(Arc::new(AppState::new(settings)));

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
