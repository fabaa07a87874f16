use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chess_commentary_core::{Analyzer, AppConfig, GeminiClient};

mod routes;

const ALLOWED_ORIGIN: &str = "http://localhost:8080";

pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Analyzer,
    pub commentator: Option<GeminiClient>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let commentator =
        GeminiClient::from_config(&config.commentary).expect("Failed to create HTTP client");
    if commentator.is_none() {
        warn!("GOOGLE_API_KEY not set, commentary disabled");
    }

    let state = Arc::new(AppState {
        analyzer: Analyzer::with_engine(config.engine.clone()),
        commentator,
        config,
    });

    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static(ALLOWED_ORIGIN))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/analyze", post(routes::analysis::analyze))
        .route("/api/analyze-pgn", post(routes::analysis::analyze_pgn))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(&state.config.bind_addr)
        .await
        .expect("Failed to bind address");

    info!(
        "Server running at http://{} (engine: {})",
        state.config.bind_addr,
        state.config.engine.path.display()
    );

    axum::serve(listener, app).await.expect("Server error");
}
