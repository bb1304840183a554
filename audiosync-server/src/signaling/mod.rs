mod coordinator;
mod router;
mod session_table;
mod signaling_output;
mod ws_handler;

pub use coordinator::*;
pub use router::*;
pub use session_table::*;
pub use signaling_output::*;
pub use ws_handler::*;
