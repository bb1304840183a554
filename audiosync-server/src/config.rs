use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Coordinator settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory the client bundle is served from.
    pub static_dir: PathBuf,
    /// Reject requests from outside loopback and private ranges.
    pub lan_only: bool,
    /// Room-code draws before `create` gives up.
    pub code_attempts: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            static_dir: PathBuf::from("./public"),
            lan_only: false,
            code_attempts: 16,
        }
    }
}
