//! TCP server: accept loop, per-connection request loop and deadlines.
//!
//! Cancellation is layered: the shutdown token passed to `serve` is the
//! parent of one token per connection, which in turn is the parent of one
//! token per request. A request token also fires when its deadline passes.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::codec;
use super::gateway::Gateway;
use super::protocol::{ErrorCode, Request, Response, StatusResponse};
use crate::config::ServerSettings;
use crate::errors::Result;

/// Pause after a failed `accept` before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound, not yet running server.
pub struct Server {
    listener: TcpListener,
    gateway: Gateway,
    idle_timeout: Duration,
    request_timeout: Duration,
}

impl Server {
    /// Bind the listening socket described by `settings`.
    pub async fn bind(settings: &ServerSettings, gateway: Gateway) -> Result<Self> {
        let addr = settings.listen_addr().await?;
        let listener = TcpListener::bind(addr).await.inspect_err(|e| {
            error!(%addr, error = %e, "unable to bind listening socket");
        })?;
        Ok(Self {
            listener,
            gateway,
            idle_timeout: settings.idle_timeout(),
            request_timeout: settings.request_timeout(),
        })
    }

    /// The actual bound address; differs from the configured one when
    /// port 0 was requested.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.local_addr()?;
        info!(%addr, "server is listening");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("received shutdown signal");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let conn = Connection {
                            gateway: self.gateway.clone(),
                            cancel: shutdown.child_token(),
                            idle_timeout: self.idle_timeout,
                            request_timeout: self.request_timeout,
                            peer,
                        };
                        tokio::spawn(conn.run(stream));
                    }
                    Err(e) => {
                        error!(error = %e, "failed to accept connection");
                        pause_after_accept_error(&shutdown).await;
                    }
                },
            }
        }

        info!("server stopped");
        Ok(())
    }

    /// Serve until Ctrl-C.
    pub async fn serve_until_ctrl_c(self) -> Result<()> {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("received Ctrl-C, initiating graceful shutdown"),
                Err(e) => error!(error = %e, "unable to listen for Ctrl-C"),
            }
            trigger.cancel();
        });
        self.serve(shutdown).await
    }
}

/// Errors such as EMFILE persist until some connection closes; wait
/// `ACCEPT_BACKOFF` (or until shutdown) instead of spinning.
async fn pause_after_accept_error(shutdown: &CancellationToken) {
    tokio::select! {
        _ = shutdown.cancelled() => {}
        _ = tokio::time::sleep(ACCEPT_BACKOFF) => {}
    }
}

struct Connection {
    gateway: Gateway,
    cancel: CancellationToken,
    idle_timeout: Duration,
    request_timeout: Duration,
    peer: SocketAddr,
}

impl Connection {
    async fn run(self, mut stream: TcpStream) {
        debug!(peer = %self.peer, "connection opened");
        if let Err(e) = self.serve_frames(&mut stream).await {
            warn!(peer = %self.peer, error = %e, "connection closed with error");
        }
        self.cancel.cancel();
        debug!(peer = %self.peer, "connection closed");
    }

    async fn serve_frames(&self, stream: &mut TcpStream) -> Result<()> {
        loop {
            let frame = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                read = tokio::time::timeout(self.idle_timeout, codec::read_frame(stream)) => {
                    match read {
                        Ok(frame) => frame?,
                        Err(_) => {
                            debug!(peer = %self.peer, "idle timeout elapsed");
                            return Ok(());
                        }
                    }
                }
            };
            let Some(payload) = frame else {
                return Ok(());
            };

            let response = match codec::decode::<Request>(&payload) {
                Ok(request) => self.handle(request).await,
                Err(e) => {
                    warn!(peer = %self.peer, error = %e, "received undecodable request");
                    Response::Malformed(StatusResponse {
                        code: ErrorCode::InvalidArgument,
                        error: e.to_string(),
                    })
                }
            };
            codec::send(stream, &response).await?;
        }
    }

    async fn handle(&self, request: Request) -> Response {
        let method = request.method();
        let cancel = self.cancel.child_token();

        let deadline = {
            let cancel = cancel.clone();
            let timeout = self.request_timeout;
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                cancel.cancel();
            })
        };

        let response = self.gateway.dispatch(&cancel, request).await;
        deadline.abort();

        match response.code() {
            ErrorCode::Ok => debug!(peer = %self.peer, method, "request served"),
            ErrorCode::Cancelled => {
                warn!(peer = %self.peer, method, "request was cancelled or timed out")
            }
            code => debug!(peer = %self.peer, method, ?code, "request failed"),
        }
        response
    }
}
