//! Shelfscope Web Server
//!
//! Axum-based REST API over the Shelfscope analytics core.
//!
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Security headers on every response
//! - Request tracing
//! - Sanitized error responses (causes are logged, never returned)

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use shelfscope_core::{
    AIBackend, AIClient, AnalyticsConfig, Error as CoreError, ForecastModel, InsightEngine,
    Repository, SimulationEngine,
};

mod handlers;

/// Maximum JSON request body size (64 KB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Environment variable holding comma-separated CORS origins
const ALLOWED_ORIGINS_ENV: &str = "SHELFSCOPE_ALLOWED_ORIGINS";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read `SHELFSCOPE_ALLOWED_ORIGINS`
    pub fn from_env() -> Self {
        let allowed_origins = std::env::var(ALLOWED_ORIGINS_ENV)
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        Self { allowed_origins }
    }
}

/// Split a comma-separated origin list, dropping blanks
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Shared application state
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub ai: Option<AIClient>,
    pub forecast_model: ForecastModel,
    pub simulation_engine: SimulationEngine,
    pub insight_engine: InsightEngine,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        analytics: AnalyticsConfig,
        ai: Option<AIClient>,
        config: ServerConfig,
    ) -> Self {
        Self {
            repo,
            ai,
            forecast_model: ForecastModel::new(analytics.forecast),
            simulation_engine: SimulationEngine::new(analytics.simulation),
            insight_engine: InsightEngine::new(),
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = cors_layer(&state.config);
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Metrics snapshots
        .route(
            "/nutrition-data",
            get(handlers::list_snapshots).post(handlers::upsert_snapshot),
        )
        .route("/nutrition-data/:upc", get(handlers::get_snapshot))
        // Forecasts
        .route(
            "/forecast",
            get(handlers::list_forecasts).post(handlers::create_forecast),
        )
        // Simulations
        .route("/simulate", post(handlers::simulate))
        .route("/simulations", get(handlers::list_simulations))
        // Customer segments
        .route("/customer-segments", get(handlers::list_segments))
        .route("/customer-segments/:id", patch(handlers::update_segment))
        // Insights
        .route("/insights", get(handlers::list_insights))
        .route("/insights/generate", post(handlers::generate_insights))
        .route("/insights/summary", get(handlers::get_summary))
        // Chat
        .route("/chat", post(handlers::ask_question));

    // CSP: same-origin scripts, inline styles for the bundled UI
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        return layer;
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Start the server
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    info!(storage = state.repo.kind(), "Repository ready");
    check_ai_connection(state.ai.as_ref()).await;

    let app = create_router(state, static_dir);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log text backend status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "Text backend ready: {} at {} (model: {})",
                    client.kind(),
                    client.host(),
                    client.model()
                );
            } else {
                warn!(
                    "Text backend configured but not responding: {} (model: {})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("Text backend disabled (set AI_BACKEND to enable insight augmentation)");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        // Caller mistakes keep their message
        match err.downcast_ref::<CoreError>() {
            Some(CoreError::Validation(msg)) => return Self::bad_request(msg),
            Some(CoreError::NotFound(msg)) => return Self::not_found(msg),
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
