mod listeners;
mod observers;
mod peer_connection;
mod peer_connection_event;

pub use listeners::*;
pub use peer_connection::*;
pub use peer_connection_event::*;
