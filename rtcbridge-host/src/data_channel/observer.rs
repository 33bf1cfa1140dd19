use crate::data_channel::DataChannelEvent;
use crate::engine::{DataChannelMessage, DataChannelObserver};
use crate::event::EventSender;
use rtcbridge_core::DataChannelState;

pub(crate) struct ChannelObserver {
    pub(crate) sender: EventSender<DataChannelEvent>,
}

impl DataChannelObserver for ChannelObserver {
    fn on_state_change(&self, state: DataChannelState) {
        self.sender.send(DataChannelEvent::StateChanged(state));
    }

    fn on_message(&self, message: DataChannelMessage) {
        self.sender.send(DataChannelEvent::Message(message));
    }
}
