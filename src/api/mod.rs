//! HTTP API server

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{any, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::complaints::ComplaintIntake;
use crate::config::{AppConfig, CorsSection};
use crate::error::{Error, Result};

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::{RouteKind, RouteTable};
pub use state::AppState;

/// Build the API router from configuration and application state.
pub fn create_router(config: &AppConfig, state: AppState) -> Result<Router> {
    let table = RouteTable::from_config(&config.routes)?;

    for path in table.shadowed() {
        tracing::warn!(
            %path,
            prefix = %config.routes.catch_all.prefix,
            "Complaint route is shadowed by the catch-all and will not be registered"
        );
    }

    let mut router: Router<AppState> = Router::new();
    for entry in table.entries() {
        tracing::debug!(path = %entry.path, kind = ?entry.kind, "Registering route");
        router = match entry.kind {
            RouteKind::Root => router.route(&entry.path, get(handlers::root)),
            RouteKind::Complaint { catch_all_fallback } => {
                let method_router = post(handlers::create_complaint);
                if catch_all_fallback {
                    router.route(&entry.path, method_router.fallback(handlers::api_status))
                } else {
                    router.route(&entry.path, method_router)
                }
            }
            RouteKind::CatchAllPrefix | RouteKind::CatchAllWildcard => {
                router.route(&entry.path, any(handlers::api_status))
            }
        };
    }

    let routes = router
        .with_state(state)
        .layer(from_fn(middleware::parse_json_body))
        .layer(DefaultBodyLimit::disable());

    // Layers on a router only run after a route has matched, so the path is
    // normalised on an outer router whose fallback is the real one.
    let router = Router::new()
        .fallback_service(routes)
        .layer(from_fn(middleware::normalize_path))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes))
        .layer(cors_layer(&config.cors)?)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Permissive CORS: any origin unless a list is configured, the common
/// methods, and whatever request headers the preflight asks for.
fn cors_layer(config: &CorsSection) -> Result<CorsLayer> {
    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins = config
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim())
                    .map_err(|e| Error::config(format!("invalid CORS origin '{origin}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request()))
}

/// Owned application object handed to the process bootstrapper.
#[derive(Debug, Clone)]
pub struct ApiServer {
    config: AppConfig,
    router: Router,
}

impl ApiServer {
    /// Construct a server whose complaint endpoint delegates to `intake`.
    pub fn new(config: AppConfig, intake: Arc<dyn ComplaintIntake>) -> Result<Self> {
        let router = create_router(&config, AppState::new(intake))?;
        Ok(Self { config, router })
    }

    /// Construct a server with the default, always-accepting intake.
    pub fn with_default_intake(config: AppConfig) -> Result<Self> {
        let router = create_router(&config, AppState::default())?;
        Ok(Self { config, router })
    }

    /// The HTTP router for the current server state.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// `host:port` the server binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.address();
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "Listening for HTTP traffic");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves on SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
