use color_eyre::eyre::{Result, WrapErr};
use muxecho::client::send_one_line;
use muxecho::{ClientConfig, EchoServer, ServerConfig};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("muxecho=info")
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Default to server mode if no mode specified
    let mode = args
        .get(1)
        .map(|s| s.to_lowercase())
        .unwrap_or_else(|| "server".to_string());
    let addr_arg = args.get(2).map(|a| a.parse::<SocketAddr>()).transpose();

    match mode.as_str() {
        "server" => {
            let config = match addr_arg.wrap_err("Invalid bind address")? {
                Some(bind_addr) => ServerConfig { bind_addr },
                None => ServerConfig::default(),
            };

            info!(address = %config.bind_addr, "Starting mux echo server");

            let server = EchoServer::new(config);
            server.run().await.wrap_err("Failed to run mux echo server")?;
        }
        "client" => {
            let config = match addr_arg.wrap_err("Invalid dial address")? {
                Some(connect_addr) => ClientConfig { connect_addr },
                None => ClientConfig::default(),
            };

            info!(address = %config.connect_addr, "Sending one line");

            send_one_line(config.connect_addr, b"hello\n")
                .await
                .wrap_err("Failed to send line to mux echo server")?;
        }
        _ => {
            eprintln!("Usage: {} [server|client] [addr]", args[0]);
            eprintln!("  server|client: Mode to run in (default: server)");
            eprintln!("  addr:          Socket address (default: 127.0.0.1:1337)");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  {} server                 # Listen on 127.0.0.1:1337", args[0]);
            eprintln!("  {} server 0.0.0.0:9000    # Listen on all interfaces", args[0]);
            eprintln!("  {} client                 # Send 'hello' to 127.0.0.1:1337", args[0]);
            std::process::exit(1);
        }
    }

    Ok(())
}
