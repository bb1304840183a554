mod link_config;
mod link_event;
mod link_task;
mod media_link;
mod rtc_link;

pub use link_config::*;
pub use link_event::*;
pub use media_link::*;
pub(crate) use link_task::{LinkOp, LinkTask};
pub use rtc_link::*;
