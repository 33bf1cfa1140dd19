mod configuration;
mod connection_id;
mod data_channel;
mod error;
mod ice;
mod options;
mod sdp;
mod state;
mod stats;

pub use configuration::*;
pub use connection_id::*;
pub use data_channel::*;
pub use error::*;
pub use ice::*;
pub use options::*;
pub use sdp::*;
pub use state::*;
pub use stats::*;
