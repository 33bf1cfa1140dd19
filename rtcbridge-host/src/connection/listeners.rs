use crate::data_channel::RtcDataChannel;
use rtcbridge_core::convert::HostValue;
use std::rc::Rc;

/// A host callback receiving a host-visible value.
pub type Listener = Rc<dyn Fn(&HostValue)>;

pub type DataChannelListener = Rc<dyn Fn(&RtcDataChannel)>;

#[derive(Default)]
pub(crate) struct PeerConnectionListeners {
    pub(crate) signaling_state_change: Option<Listener>,
    pub(crate) ice_connection_state_change: Option<Listener>,
    pub(crate) ice_gathering_state_change: Option<Listener>,
    pub(crate) connection_state_change: Option<Listener>,
    pub(crate) ice_candidate: Option<Listener>,
    pub(crate) ice_candidate_error: Option<Listener>,
    pub(crate) negotiation_needed: Option<Listener>,
    pub(crate) data_channel: Option<DataChannelListener>,
}
