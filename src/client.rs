//! Client initiator: dial, open one logical stream, exchange lines.

use crate::session::{ClientSession, LogicalStream};
use crate::{MuxError, Result};
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};

/// Echo client holding one logical stream on its own client-role session.
///
/// The minimal exchange writes a line and returns without reading anything
/// back ([`EchoClient::send_line`]); the extended form reads the echo and
/// returns it ([`EchoClient::echo_line`]).
///
/// # Examples
///
/// ```no_run
/// use muxecho::EchoClient;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let addr = "127.0.0.1:1337".parse()?;
///     let mut client = EchoClient::connect(addr).await?;
///
///     let response = client.echo_line("hello").await?;
///     assert_eq!(response, "hello");
///     client.close().await?;
///     Ok(())
/// }
/// ```
pub struct EchoClient {
    reader: BufReader<ReadHalf<Compat<LogicalStream>>>,
    writer: WriteHalf<Compat<LogicalStream>>,
    driver: JoinHandle<()>,
    shutdown: oneshot::Sender<()>,
}

impl EchoClient {
    /// Dials the server, establishes a client-role session, and opens
    /// exactly one logical stream on it.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let socket = TcpStream::connect(addr)
            .await
            .map_err(|e| MuxError::Config(format!("Failed to connect to {}: {}", addr, e)))?;

        let mut session = ClientSession::new(socket);
        let stream = session.open_stream().await?;
        // The session must be pumped for the stream to make progress.
        let (shutdown, shutdown_rx) = oneshot::channel();
        let driver = tokio::spawn(session.drive(shutdown_rx));

        let (read_half, write_half) = tokio::io::split(stream.compat());
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            driver,
            shutdown,
        })
    }

    /// Writes the given bytes verbatim on the stream; the caller includes
    /// the newline delimiter. No response is read.
    pub async fn send_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Sends one line (delimiter appended) and returns the echoed line
    /// content with the delimiter stripped.
    pub async fn echo_line(&mut self, line: &str) -> Result<String> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut echoed = Vec::new();
        self.reader.read_until(b'\n', &mut echoed).await?;
        if echoed.last() == Some(&b'\n') {
            echoed.pop();
        }
        String::from_utf8(echoed).map_err(MuxError::Utf8)
    }

    /// Half-closes the stream, then waits for the session driver to flush
    /// everything still queued and close the underlying connection.
    ///
    /// Stream writes only queue frames with the session; they are not on
    /// the wire until the driver has pumped them, so `close` must not return
    /// before the driver does.
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        let _ = self.shutdown.send(());
        let _ = self.driver.await;
        Ok(())
    }
}

/// Minimal client exchange: dial, open one stream, write one line, return.
///
/// This is the reference scenario — the line sent is typically `"hello\n"`.
pub async fn send_one_line(addr: SocketAddr, line: &[u8]) -> Result<()> {
    let mut client = EchoClient::connect(addr).await?;
    client.send_line(line).await?;
    client.close().await
}
