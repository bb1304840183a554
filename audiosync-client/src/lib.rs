pub mod capture;
pub mod error;
pub mod link;
pub mod orchestrator;
pub mod runtime;

pub use capture::*;
pub use error::*;
pub use link::*;
pub use orchestrator::*;
pub use runtime::*;
