use crate::convert::{HostValue, get_or_default, object_or_empty};
use crate::functional::Validation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferOptions {
    pub ice_restart: bool,
    pub voice_activity_detection: bool,
}

impl OfferOptions {
    pub fn from_host_optional(value: Option<&HostValue>) -> Validation<Self> {
        object_or_empty(value).flat_map(|object| {
            get_or_default(&object, "iceRestart", false)
                .zip(get_or_default(&object, "voiceActivityDetection", true))
                .map(|(ice_restart, voice_activity_detection)| OfferOptions {
                    ice_restart,
                    voice_activity_detection,
                })
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOptions {
    pub voice_activity_detection: bool,
}

impl AnswerOptions {
    pub fn from_host_optional(value: Option<&HostValue>) -> Validation<Self> {
        object_or_empty(value).flat_map(|object| {
            get_or_default(&object, "voiceActivityDetection", true)
                .map(|voice_activity_detection| AnswerOptions {
                    voice_activity_detection,
                })
        })
    }
}
