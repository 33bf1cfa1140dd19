mod event_loop;
mod event_queue;
mod event_target;

pub use event_loop::*;
pub use event_queue::*;
pub use event_target::*;
