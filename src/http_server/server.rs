//! # HTTP Server
//!
//! Combines the feature, query and health routers into one axum app.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::feature::{PointKind, PolygonKind};
use crate::observability::{log_event, Event};
use crate::store::SpatialStore;

use super::config::HttpServerConfig;
use super::errors::FailureDetails;
use super::feature_routes::feature_routes;
use super::health_routes::health_routes;
use super::query_routes::query_routes;
use super::state::AppState;

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServiceConfig, store: Arc<dyn SpatialStore>) -> Self {
        let state = AppState::new(config, store);
        let router = Self::build_router(&config.http, state);
        Self {
            config: config.http.clone(),
            router,
        }
    }

    fn build_router(config: &HttpServerConfig, state: AppState) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(feature_routes::<PointKind>())
            .merge(feature_routes::<PolygonKind>())
            .merge(query_routes())
            .layer(
                ServiceBuilder::new()
                    .layer(cors)
                    .layer(middleware::from_fn_with_state(state.clone(), report_failures)),
            )
            .with_state(state)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// The assembled app, for serving or for driving with `oneshot` in tests
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid listen address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?.to_string();
        log_event(Event::Serving, &[("addr", &bound)]);

        axum::serve(listener, self.router).await?;
        log_event(Event::Shutdown, &[("addr", &bound)]);
        Ok(())
    }
}

/// Logs every error response and, in debug mode, adds the source chain
/// to 500 bodies
async fn report_failures(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(details) = response.extensions_mut().remove::<FailureDetails>() else {
        return response;
    };

    let status = details.status.as_u16().to_string();
    log_event(
        Event::RequestFailed,
        &[
            ("code", details.code),
            ("error", &details.error),
            ("method", &method),
            ("path", &path),
            ("status", &status),
        ],
    );

    if state.debug && details.status.is_server_error() {
        return details.to_response(true);
    }
    response
}
