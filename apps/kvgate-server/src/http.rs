//! HTTP server and route table.
//!
//! Routes are declared once as `(path, verb, handler)` rows. Every path also
//! answers OPTIONS with an empty 200 and any other verb with 405, so no
//! handler checks its own method.

use crate::handlers::{self, GatewayState};
use crate::paths;
use axum::{
    http::{
        header::{self, HeaderName},
        Method,
    },
    routing::{delete, get, post, MethodRouter},
    Router,
};
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// One row of the route table.
struct Route {
    path: &'static str,
    method: Method,
    handler: MethodRouter<GatewayState>,
}

fn route_table() -> Vec<Route> {
    vec![
        Route {
            path: paths::SET,
            method: Method::POST,
            handler: post(handlers::set),
        },
        Route {
            path: paths::GET,
            method: Method::GET,
            handler: get(handlers::get),
        },
        Route {
            path: paths::GET_ALL,
            method: Method::GET,
            handler: get(handlers::get_all),
        },
        Route {
            path: paths::DELETE,
            method: Method::DELETE,
            handler: delete(handlers::delete),
        },
        Route {
            path: paths::HEALTH,
            method: Method::GET,
            handler: get(handlers::health),
        },
    ]
}

/// Build the gateway router.
///
/// `cors` attaches the cross-origin layer: any origin (mirrored, so that
/// credentialed requests are accepted), the common verbs and headers.
pub fn router(state: GatewayState, cors: bool) -> Router {
    let mut app = Router::new();

    for Route {
        path,
        method,
        handler,
    } in route_table()
    {
        let handler = handler.options(handlers::options).fallback(move || {
            let allowed = method.clone();
            async move { crate::error::GatewayError::MethodNotAllowed(allowed) }
        });
        app = app.route(path, handler);
    }

    let mut app = app.with_state(state);

    if cors {
        app = app.layer(cors_layer());
    }

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

/// HTTP server for the gateway endpoints.
///
/// Provides:
/// - POST /set
/// - GET /get?key=
/// - GET /getAll
/// - DELETE /delete?key=
/// - GET /health
pub struct HttpServer {
    addr: SocketAddr,
    app: Router,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    server_handle: Option<JoinHandle<Result<(), std::io::Error>>>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, app: Router) -> Self {
        Self {
            addr,
            app,
            local_addr: None,
            shutdown_tx: None,
            server_handle: None,
        }
    }

    /// Bind and start serving in the background.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    pub async fn start(&mut self) -> Result<SocketAddr, HttpServerError> {
        if self.server_handle.is_some() {
            return Err(HttpServerError::Startup("already started".to_string()));
        }

        tracing::info!("Starting HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| HttpServerError::Startup(format!("Failed to bind: {}", e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| HttpServerError::Startup(format!("Failed to read local addr: {}", e)))?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        let app = self.app.clone();
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
        });

        self.server_handle = Some(server_handle);
        self.local_addr = Some(local_addr);

        tracing::info!("HTTP server listening on http://{}", local_addr);
        Ok(local_addr)
    }

    /// Bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Shutdown the HTTP server gracefully.
    pub async fn shutdown(mut self) -> Result<(), HttpServerError> {
        tracing::info!("Shutting down HTTP server");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| HttpServerError::Shutdown(format!("Join error: {}", e)))?
                .map_err(|e| HttpServerError::Shutdown(format!("Server error: {}", e)))?;
        }

        tracing::info!("HTTP server shutdown complete");
        Ok(())
    }
}

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),
}
