mod app;
mod assets;
mod config;
mod error;
mod net;
mod room;
mod signaling;

pub use app::*;
pub use assets::content_type;
pub use config::*;
pub use error::*;
pub use net::is_local_network;
pub use room::*;
pub use signaling::*;
