//! HTTP listener for the service's application router.
//!
//! # Responsibilities
//! - Bind to the configured host and port
//! - Serve the application with request tracing
//! - Stop accepting and drain in-flight requests on close or shutdown

use std::net::SocketAddr;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;

use crate::error::BoxError;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Failed to bind to address.
    Bind(std::io::Error),
    /// The server task ended with an error.
    Serve(std::io::Error),
    /// The server task panicked or was cancelled.
    Join(tokio::task::JoinError),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Serve(e) => write!(f, "Server error: {}", e),
            ListenerError::Join(e) => write!(f, "Server task failed: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// A bound, not yet serving, TCP listener.
pub struct HttpListener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl HttpListener {
    /// Bind to `host:port`. Port 0 picks an ephemeral port.
    pub async fn bind(host: &str, port: u16) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(ListenerError::Bind)?;

        let local_addr = listener
            .local_addr()
            .map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            local_addr,
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve `app` on a background task until [`ServerHandle::close`] is
    /// called or `shutdown` fires.
    pub fn serve(self, app: Router, mut shutdown: broadcast::Receiver<()>) -> ServerHandle {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let app = app.layer(TraceLayer::new_for_http());
        let addr = self.local_addr;

        let task = tokio::spawn(async move {
            axum::serve(self.inner, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        _ = stop_rx => {}
                        _ = shutdown.recv() => {}
                    }
                    tracing::info!(address = %addr, "Listener draining");
                })
                .await
        });

        ServerHandle {
            addr,
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Handle to a serving listener.
pub struct ServerHandle {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and wait for in-flight requests to finish.
    pub async fn close(mut self) -> Result<(), BoxError> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match self.task.await {
            Ok(Ok(())) => {
                tracing::info!(address = %self.addr, "Listener closed");
                Ok(())
            }
            Ok(Err(e)) => Err(Box::new(ListenerError::Serve(e))),
            Err(e) => Err(Box::new(ListenerError::Join(e))),
        }
    }
}
