//! Per-stream line-echo handler.

use crate::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

/// Echoes newline-delimited lines on a single logical stream.
///
/// Reads one line at a time (up to and including the delimiter, or the
/// unterminated tail at end-of-stream), logs it, and writes the exact bytes
/// read back onto the stream. FIFO order within the stream is preserved
/// because each line is fully echoed before the next read.
///
/// End-of-stream is a normal termination: the write side is closed and
/// `Ok(())` is returned. Any other read/write error ends only this handler;
/// the caller decides how to report it. A broken stream is never retried.
pub async fn echo_lines<S>(stream: S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);
    let mut line = Vec::new();

    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            info!("Peer closed stream");
            break;
        }

        let content = line.strip_suffix(b"\n").unwrap_or(&line);
        info!(size = n, line = %String::from_utf8_lossy(content), "Received line");

        // Echo back exactly what was read; no delimiter is re-appended.
        write_half.write_all(&line).await?;
        write_half.flush().await?;
    }

    write_half.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn echoes_lines_in_order() {
        let (mut local, remote) = tokio::io::duplex(1024);
        let handler = tokio::spawn(echo_lines(remote));

        local.write_all(b"first\nsecond\n").await.unwrap();
        local.shutdown().await.unwrap();

        let mut echoed = Vec::new();
        local.read_to_end(&mut echoed).await.unwrap();
        assert_eq!(echoed, b"first\nsecond\n");

        handler.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn unterminated_tail_is_echoed_verbatim_at_eof() {
        let (mut local, remote) = tokio::io::duplex(1024);
        let handler = tokio::spawn(echo_lines(remote));

        local.write_all(b"complete\nleftover").await.unwrap();
        local.shutdown().await.unwrap();

        let mut echoed = Vec::new();
        local.read_to_end(&mut echoed).await.unwrap();
        assert_eq!(echoed, b"complete\nleftover");

        handler.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn clean_close_is_not_an_error() {
        let (mut local, remote) = tokio::io::duplex(1024);
        let handler = tokio::spawn(echo_lines(remote));

        local.shutdown().await.unwrap();

        assert!(handler.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn blocks_on_missing_delimiter_without_echoing() {
        let (mut local, remote) = tokio::io::duplex(1024);
        let _handler = tokio::spawn(echo_lines(remote));

        local.write_all(b"no newline yet").await.unwrap();

        // Nothing may come back until the delimiter (or EOF) arrives.
        let mut buffer = [0u8; 16];
        let read = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            local.read(&mut buffer),
        )
        .await;
        assert!(read.is_err(), "handler echoed an incomplete line");
    }
}
