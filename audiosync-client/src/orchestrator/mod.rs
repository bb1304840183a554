mod connection_orchestrator;
mod peer_link;
mod signal_sink;

pub use connection_orchestrator::*;
pub use peer_link::*;
pub use signal_sink::*;
