mod election;
mod registry;
mod room;

pub use election::*;
pub use registry::*;
pub use room::*;
