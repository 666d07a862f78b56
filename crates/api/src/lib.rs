//! Bird Classification API Server
//!
//! Bootstraps the model once, then serves the landing page, static assets,
//! and the `/analyze` endpoint.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use inference_engine::{Classifier, ModelLoader};
use metrics_exporter_prometheus::PrometheusHandle;
use reference_lookup::{LookupError, ReferenceLookup, WikipediaLookup};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod bootstrap;
pub mod config;
pub mod error;
mod routes;

#[cfg(test)]
mod test_support;

pub use bootstrap::{Bootstrap, BootstrapError};
pub use config::{HttpConfig, LinkPolicy, LoggingConfig, ServerConfig};
pub use error::ApiError;
pub use routes::metrics::install_recorder as install_metrics;

use artifact_fetcher::{ArtifactFetcher, FetcherConfig};

/// Read-only state shared by every handler
pub struct AppState {
    /// Classifier over the bootstrapped predictor
    pub classifier: Classifier,
    /// Knowledge source for reference links
    pub lookup: Arc<dyn ReferenceLookup>,
    /// Behaviour when the lookup fails
    pub link_policy: LinkPolicy,
    /// Directory holding the landing page
    pub view_dir: PathBuf,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
    /// Prometheus handle, when the exporter is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create application state around a ready classifier
    pub fn new(
        classifier: Classifier,
        lookup: Arc<dyn ReferenceLookup>,
        link_policy: LinkPolicy,
        view_dir: PathBuf,
    ) -> Self {
        Self {
            classifier,
            lookup,
            link_policy,
            view_dir,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Fatal server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error("Reference lookup setup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("Listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, http: &HttpConfig) -> Router {
    Router::new()
        .route("/", get(routes::pages::index))
        .route("/analyze", post(routes::analyze::analyze))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::metrics::render))
        .nest_service("/static", ServeDir::new(&http.static_dir))
        .layer(DefaultBodyLimit::max(http.body_limit_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([HeaderName::from_static("x-requested-with"), header::CONTENT_TYPE])
}

fn parse_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or_else(|_| {
        eprintln!("Unknown log level {:?}, using info", level);
        Level::INFO
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let level = parse_level(&config.level);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Tracing subscriber already installed: {}", e);
    }
}

/// Bootstrap the model, then bind and serve until shutdown.
///
/// Nothing is bound if bootstrap fails.
pub async fn run_server(
    config: ServerConfig,
    loader: Arc<dyn ModelLoader>,
    metrics: Option<PrometheusHandle>,
) -> Result<(), ServerError> {
    let fetcher = ArtifactFetcher::new(&FetcherConfig {
        timeout: Some(Duration::from_secs(config.artifact.timeout_secs)),
    })
    .map_err(BootstrapError::from)?;

    let bootstrap = Bootstrap::new(fetcher, loader, &config.artifact);
    let predictor = bootstrap.run().await?;

    let lookup = Arc::new(WikipediaLookup::new(&config.lookup.to_wikipedia())?);
    let state = AppState::new(
        Classifier::new(predictor),
        lookup,
        config.lookup.link_policy,
        config.server.view_dir.clone(),
    )
    .with_metrics(metrics);
    let app = create_router(Arc::new(state), &config.server);

    let addr = config.bind_addr();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
