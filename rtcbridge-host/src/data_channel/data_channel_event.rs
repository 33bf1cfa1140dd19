use crate::engine::DataChannelMessage;
use rtcbridge_core::DataChannelState;

#[derive(Debug)]
pub enum DataChannelEvent {
    StateChanged(DataChannelState),
    Message(DataChannelMessage),
}
