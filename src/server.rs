//! Transport: TCP accept loop, one task per connection, graceful shutdown.
//!
//! The server is the only async part of burrow. Each connection gets its own
//! tokio task; each request on it is buffered, handed to the frozen
//! [`App`] on tokio's blocking pool, and the resulting response written
//! back. Handlers are synchronous and may block (file reads, database
//! drivers), so the chain never runs on a runtime worker. The app is shared
//! through an `Arc` and never locked.
//!
//! # Shutdown
//!
//! On SIGTERM or Ctrl-C the accept loop stops, in-flight connections are
//! allowed to finish, and [`Server::serve`] returns. Use
//! [`Server::serve_on`] to supply a different shutdown future.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::engine::App;
use crate::error::Error;
use crate::request::Request;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to listen on `addr`.
    ///
    /// Fails with [`Error::InvalidAddress`] if `addr` is not a valid
    /// `host:port` string.
    ///
    /// ```rust,no_run
    /// use burrow::Server;
    /// let server = Server::bind("0.0.0.0:9999").unwrap();
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr: SocketAddr = addr.parse()
            .map_err(|_| Error::InvalidAddress(addr.to_owned()))?;
        Ok(Self { addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serves `app` until SIGTERM or Ctrl-C, then drains connections.
    ///
    /// Accepts an [`Engine`](crate::Engine) directly; it is frozen first.
    pub async fn serve(self, app: impl Into<App>) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        Self::serve_on(listener, app, shutdown_signal()).await
    }

    /// Serves `app` on an already bound listener until `shutdown` resolves.
    pub async fn serve_on(
        listener: TcpListener,
        app: impl Into<App>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let app = Arc::new(app.into());
        info!(addr = %listener.local_addr()?, "burrow listening");

        let mut connections = tokio::task::JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Shutdown wins over queued connections.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = connections.len(), "shutdown requested, draining connections");
                    break;
                }

                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };
                    debug!(%peer, "connection accepted");

                    let app = Arc::clone(&app);
                    connections.spawn(async move {
                        // Called once per request on this connection.
                        let svc = service_fn(move |req| dispatch(Arc::clone(&app), req));

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(TokioIo::new(stream), svc)
                            .await
                        {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        while connections.join_next().await.is_some() {}

        info!("burrow stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one request, runs it through the app, and converts the result.
///
/// Never errors toward hyper: unmatched routes and aborted chains are
/// already responses, a body that fails to arrive is answered `400`, and a
/// chain that panics without a [`recovery`](crate::middleware::recovery)
/// middleware is answered `500`.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<http_body_util::Full<bytes::Bytes>>, std::convert::Infallible> {
    let request = match Request::from_hyper(req).await {
        Ok(request) => request,
        Err(e) => {
            warn!("failed to read request body: {e}");
            return Ok(bare_status(http::StatusCode::BAD_REQUEST));
        }
    };

    match tokio::task::spawn_blocking(move || app.handle(request)).await {
        Ok(response) => Ok(response.into_hyper()),
        Err(e) => {
            error!("handler chain did not complete: {e}");
            Ok(bare_status(http::StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

fn bare_status(status: http::StatusCode) -> http::Response<http_body_util::Full<bytes::Bytes>> {
    let mut res = http::Response::new(http_body_util::Full::default());
    *res.status_mut() = status;
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on SIGTERM or SIGINT (Ctrl-C). Only Ctrl-C exists off Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c  => {}
        () = sigterm => {}
    }
}
