mod data_channel;
mod data_channel_event;
mod observer;

pub use data_channel::*;
pub use data_channel_event::*;
