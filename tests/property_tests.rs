use muxecho::{EchoClient, EchoServer, ServerConfig};
use proptest::prelude::*;
use std::net::SocketAddr;
use tokio::task::JoinHandle;

async fn spawn_test_server() -> muxecho::Result<(JoinHandle<muxecho::Result<()>>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(muxecho::MuxError::Transport)?;
    let addr = listener.local_addr().map_err(muxecho::MuxError::Transport)?;

    let server = EchoServer::new(ServerConfig { bind_addr: addr });
    let server_handle = tokio::spawn(async move { server.serve(listener).await });

    Ok((server_handle, addr))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Property: every line comes back byte-for-byte identical
    #[test]
    fn echo_preserves_line_content(line in ".*") {
        tokio_test::block_on(async {
            let (server_handle, addr) = spawn_test_server().await
                .map_err(|e| TestCaseError::fail(format!("Server setup failed: {}", e)))?;

            let mut client = EchoClient::connect(addr).await
                .map_err(|e| TestCaseError::fail(format!("Client connection failed: {}", e)))?;

            let response = client.echo_line(&line).await
                .map_err(|e| TestCaseError::fail(format!("Echo failed: {}", e)))?;

            server_handle.abort();

            prop_assert_eq!(response, line);
            Ok(())
        })?;
    }

    /// Property: a sequence of lines on one stream is echoed in order
    #[test]
    fn echo_preserves_line_order(lines in prop::collection::vec(".*", 1..8)) {
        tokio_test::block_on(async {
            let (server_handle, addr) = spawn_test_server().await
                .map_err(|e| TestCaseError::fail(format!("Server setup failed: {}", e)))?;

            let mut client = EchoClient::connect(addr).await
                .map_err(|e| TestCaseError::fail(format!("Client connection failed: {}", e)))?;

            for line in &lines {
                let response = client.echo_line(line).await
                    .map_err(|e| TestCaseError::fail(format!("Echo failed: {}", e)))?;
                prop_assert_eq!(&response, line);
            }

            server_handle.abort();
            Ok(())
        })?;
    }
}
