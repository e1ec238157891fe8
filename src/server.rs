//! Transport acceptor and server-role session orchestration.

use crate::config::ServerConfig;
use crate::handler::echo_lines;
use crate::session::ServerSession;
use crate::{MuxError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio_util::compat::FuturesAsyncReadCompatExt;
use tracing::{Instrument, error, info};

/// Multiplexed line-echo server.
///
/// Accepts TCP connections, establishes one server-role yamux session per
/// connection, and runs one echo handler per logical stream the peer opens.
/// Connections and streams each run on their own tokio task; failures never
/// cross task boundaries.
///
/// # Examples
///
/// ```no_run
/// use muxecho::{EchoServer, ServerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = EchoServer::new(ServerConfig::default());
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct EchoServer {
    config: ServerConfig,
    shutdown_signal: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl EchoServer {
    /// Creates a new server with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_signal, _) = tokio::sync::broadcast::channel(1);
        Self {
            config,
            shutdown_signal: Arc::new(shutdown_signal),
        }
    }

    /// Returns a shutdown signal sender that can be used to stop the server
    pub fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()> {
        self.shutdown_signal.as_ref().clone()
    }

    /// Binds the listener and accepts connections until shut down.
    ///
    /// A bind failure is fatal. An accept failure is logged and the loop
    /// keeps accepting; a failed accept affects no existing connection.
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                MuxError::Config(format!("Failed to bind {}: {}", self.config.bind_addr, e))
            })?;

        self.serve(listener).await
    }

    /// Accepts connections on an already-bound listener until shut down.
    ///
    /// Lets callers bind to port 0 themselves and learn the actual address
    /// before the accept loop starts; the listener queues connections from
    /// the moment it is bound, so there is no readiness window.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr().map_err(MuxError::Transport)?;
        info!(address = %local_addr, "Mux echo server listening");

        let connection_count = Arc::new(AtomicUsize::new(0));
        let mut shutdown_rx = self.shutdown_signal.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            connection_count.fetch_add(1, Ordering::SeqCst);
                            let current = connection_count.load(Ordering::SeqCst);
                            info!(%addr, current, "Accepted connection");

                            let connection_count = connection_count.clone();
                            let span = tracing::info_span!("connection", %addr);
                            tokio::spawn(async move {
                                if let Err(e) = Self::handle_connection(socket, addr).instrument(span).await {
                                    error!(%addr, error = %e, "Error handling connection");
                                }
                                let remaining = connection_count.fetch_sub(1, Ordering::SeqCst) - 1;
                                info!(%addr, current = remaining, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Received shutdown signal, stopping server");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal, stopping server");
                    break;
                }
            }
        }

        info!("Mux echo server stopped");
        Ok(())
    }

    /// Runs one server-role session: accepts logical streams and hands each
    /// to its own echo handler task.
    ///
    /// A session-establishment or stream-accept failure is fatal to this
    /// connection only; the session (and with it the connection) is released
    /// on every exit path. In-flight stream handlers keep running until their
    /// own streams end.
    async fn handle_connection(socket: TcpStream, addr: SocketAddr) -> Result<()> {
        let mut session = ServerSession::new(socket);

        loop {
            match session.accept_stream().await? {
                Some(stream) => {
                    let id = stream.id();
                    info!(stream = %id, "Accepted stream");

                    let span = tracing::info_span!("stream", %addr, stream = %id);
                    tokio::spawn(async move {
                        if let Err(e) = echo_lines(stream.compat()).instrument(span).await {
                            error!(%addr, stream = %id, error = %e, "Error handling stream");
                        }
                    });
                }
                None => {
                    info!("Peer closed session");
                    break;
                }
            }
        }

        Ok(())
    }
}
