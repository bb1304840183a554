mod client_event;
mod client_runtime;

pub use client_event::*;
pub use client_runtime::*;
