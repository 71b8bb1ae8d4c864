//! HTTP server wrapper.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::handlers::router;
use crate::admission::AdmissionService;
use crate::error::{GatehouseError, Result};

/// HTTP server for the admission endpoints.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The admission service instance
    service: Arc<AdmissionService>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, service: Arc<AdmissionService>) -> Self {
        Self { addr, service }
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let listener = self.bind().await?;

        axum::serve(listener, router(self.service))
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                GatehouseError::Io(e)
            })
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;

        axum::serve(listener, router(self.service))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                GatehouseError::Io(e)
            })
    }

    async fn bind(&self) -> Result<TcpListener> {
        info!(addr = %self.addr, "Starting HTTP server for admission endpoints");
        TcpListener::bind(self.addr).await.map_err(GatehouseError::Io)
    }
}
