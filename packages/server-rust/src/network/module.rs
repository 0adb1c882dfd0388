//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. This separation lets the application wire shared state and
//! mark readiness between `start()` and `serve()`.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::service::UserRegistry;

use super::config::NetworkConfig;
use super::handlers::{
    add_user_handler, fire_exception_handler, get_users_handler, health_handler,
    liveness_handler, readiness_handler, remove_user_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;

/// Manages the full HTTP server lifecycle.
///
/// 1. `new()` -- allocates shared state (registry, shutdown controller)
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until the shutdown future completes
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    users: Arc<UserRegistry>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            users: Arc::new(UserRegistry::new()),
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the user registry.
    #[must_use]
    pub fn users(&self) -> Arc<UserRegistry> {
        Arc::clone(&self.users)
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `GET /addUser?name=` -- register a name
    /// - `GET /removeUser?name=` -- remove a name
    /// - `GET /getUsers` -- all registered names, sorted
    /// - `GET /fireException` -- deliberate failure (error-path demo)
    /// - `GET /health` -- health JSON
    /// - `GET /health/live` -- liveness probe
    /// - `GET /health/ready` -- readiness probe
    pub fn build_router(&self) -> Router {
        let state = AppState {
            users: Arc::clone(&self.users),
            shutdown: Arc::clone(&self.shutdown),
            start_time: Instant::now(),
        };

        let layers = build_http_layers(&self.config);

        Router::new()
            .route("/addUser", get(add_user_handler))
            .route("/removeUser", get(remove_user_handler))
            .route("/getUsers", get(get_users_handler))
            .route("/fireException", get(fire_exception_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .layer(layers)
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Accepts connections until `shutdown` completes, then drains.
    ///
    /// Consumes `self` because the listener is moved into the server. Health
    /// state transitions to Draining when the shutdown future fires and to
    /// Stopped once the drain finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let controller = self.shutdown;

        let drain = Arc::clone(&controller);
        let app = router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("shutdown signal received, draining connections");
                drain.trigger_shutdown();
            })
            .await?;

        controller.set_stopped();
        info!("server stopped");
        Ok(())
    }
}
