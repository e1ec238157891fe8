//! Session adapter over the yamux multiplexing protocol.
//!
//! A session wraps exactly one raw transport connection and carries any
//! number of independent logical streams. The role is fixed at creation:
//! [`ServerSession`] accepts streams the peer opens, [`ClientSession`] opens
//! streams toward the peer. The yamux wire protocol itself (framing, flow
//! control) lives entirely in the `yamux` crate; this module only adapts it
//! to the tokio I/O types the rest of the crate uses.

use crate::{MuxError, Result};
use std::future::poll_fn;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::debug;
use yamux::{Connection, Mode};

/// One bidirectional logical stream multiplexed within a session.
///
/// Implements the futures-io traits; wrap it with
/// `tokio_util::compat::FuturesAsyncReadCompatExt::compat` to drive it with
/// tokio readers/writers.
pub type LogicalStream = yamux::Stream;

/// Server-role session: accepts logical streams opened by the peer.
pub struct ServerSession<T> {
    connection: Connection<Compat<T>>,
}

impl<T> ServerSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Establishes a server-mode session over the given connection. The
    /// session takes exclusive ownership of the connection until it ends.
    pub fn new(connection: T) -> Self {
        Self {
            connection: Connection::new(connection.compat(), yamux::Config::default(), Mode::Server),
        }
    }

    /// Accepts the next inbound logical stream.
    ///
    /// Returns `Ok(None)` when the peer closed the session cleanly. Session
    /// I/O only makes progress while this is being awaited, so the accept
    /// loop doubles as the connection driver for all accepted streams.
    pub async fn accept_stream(&mut self) -> Result<Option<LogicalStream>> {
        match poll_fn(|cx| self.connection.poll_next_inbound(cx)).await {
            Some(Ok(stream)) => Ok(Some(stream)),
            Some(Err(e)) => Err(MuxError::Session(e)),
            None => Ok(None),
        }
    }
}

/// Client-role session: opens logical streams toward the peer.
///
/// Streams are opened first, then [`ClientSession::drive`] consumes the
/// session to pump I/O for as long as the opened streams are in use.
pub struct ClientSession<T> {
    connection: Connection<Compat<T>>,
}

impl<T> ClientSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// Establishes a client-mode session over the given connection.
    pub fn new(connection: T) -> Self {
        Self {
            connection: Connection::new(connection.compat(), yamux::Config::default(), Mode::Client),
        }
    }

    /// Opens a new outbound logical stream.
    ///
    /// Fails if the underlying connection is broken or the peer tore the
    /// session down; such a failure is fatal to this session only.
    pub async fn open_stream(&mut self) -> Result<LogicalStream> {
        poll_fn(|cx| self.connection.poll_new_outbound(cx))
            .await
            .map_err(MuxError::Session)
    }

    /// Pumps session I/O until the session ends or `shutdown` resolves,
    /// then closes the session gracefully.
    ///
    /// Must run concurrently with any use of streams opened on this session
    /// (typically on its own task). Stream writes and closes only queue
    /// frames; this loop is what puts them on the wire, and the closing
    /// handshake flushes whatever is still queued. The driver therefore must
    /// not be dropped before shutdown completes, or queued lines are lost.
    /// Inbound streams are not expected in client role and are dropped.
    pub async fn drive(mut self, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                inbound = poll_fn(|cx| self.connection.poll_next_inbound(cx)) => {
                    match inbound {
                        Some(Ok(stream)) => {
                            debug!(stream = %stream.id(), "Dropping unexpected inbound stream");
                        }
                        Some(Err(e)) => {
                            debug!(error = %e, "Session terminated");
                            return;
                        }
                        None => return,
                    }
                }
            }
        }

        if let Err(e) = poll_fn(|cx| self.connection.poll_close(cx)).await {
            debug!(error = %e, "Session close failed");
        }
    }
}
