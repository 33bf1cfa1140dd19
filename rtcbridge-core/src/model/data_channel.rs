use crate::convert::{FromHost, HostValue, object_or_empty, get_optional, get_or_default};
use crate::functional::Validation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataChannelInit {
    pub ordered: bool,
    pub max_packet_life_time: Option<u16>,
    pub max_retransmits: Option<u16>,
    pub protocol: String,
    pub negotiated: bool,
    pub id: Option<u16>,
}

impl Default for DataChannelInit {
    fn default() -> Self {
        Self {
            ordered: true,
            max_packet_life_time: None,
            max_retransmits: None,
            protocol: String::new(),
            negotiated: false,
            id: None,
        }
    }
}

impl DataChannelInit {
    pub fn from_host_optional(value: Option<&HostValue>) -> Validation<Self> {
        object_or_empty(value).flat_map(|object| {
            let reliability = get_optional::<u16>(&object, "maxPacketLifeTime")
                .zip(get_optional::<u16>(&object, "maxRetransmits"))
                .flat_map(|limits| match limits {
                    (Some(_), Some(_)) => Validation::invalid(
                        "Cannot set both \"maxPacketLifeTime\" and \"maxRetransmits\"",
                    ),
                    limits => Validation::Valid(limits),
                });

            get_or_default(&object, "ordered", true)
                .zip(reliability)
                .zip(get_or_default(&object, "protocol", String::new()))
                .zip(get_or_default(&object, "negotiated", false))
                .zip(get_optional::<u16>(&object, "id"))
                .flat_map(|((((ordered, (max_packet_life_time, max_retransmits)), protocol), negotiated), id)| {
                    if negotiated && id.is_none() {
                        return Validation::invalid("A negotiated channel requires an \"id\"");
                    }
                    Validation::Valid(DataChannelInit {
                        ordered,
                        max_packet_life_time,
                        max_retransmits,
                        protocol,
                        negotiated,
                        id,
                    })
                })
        })
    }
}

impl FromHost for DataChannelInit {
    fn from_host(value: &HostValue) -> Validation<Self> {
        Self::from_host_optional(Some(value))
    }
}
