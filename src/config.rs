use std::net::SocketAddr;

/// Reference endpoint both sides default to when none is configured.
const DEFAULT_ADDR: &str = "127.0.0.1:1337";

/// Configuration for the multiplexed echo server
///
/// The endpoint is explicit configuration rather than a shared constant so
/// tests can bind to an ephemeral port (port 0) and production deployments
/// can pick their own address.
///
/// # Examples
///
/// ```
/// use muxecho::ServerConfig;
///
/// let config = ServerConfig {
///     bind_addr: "127.0.0.1:1337".parse().unwrap(),
/// };
/// ```
///
/// Using the default configuration:
///
/// ```
/// use muxecho::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.bind_addr.port(), 1337);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.parse().unwrap(),
        }
    }
}

/// Configuration for the echo client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Address of the server to dial
    pub connect_addr: SocketAddr,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_addr: DEFAULT_ADDR.parse().unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults_to_loopback_reference_port() {
        let config = ServerConfig::default();
        assert!(config.bind_addr.ip().is_loopback());
        assert_eq!(config.bind_addr.port(), 1337);
    }

    #[test]
    fn client_default_matches_server_default() {
        assert_eq!(
            ClientConfig::default().connect_addr,
            ServerConfig::default().bind_addr
        );
    }
}
