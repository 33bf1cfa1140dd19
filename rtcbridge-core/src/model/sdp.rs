use crate::convert::{FromHost, HostValue, ToHost, expect_object, get_optional, get_required};
use crate::functional::Validation;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Pranswer,
    Answer,
    Rollback,
}

impl SdpType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdpType::Offer => "offer",
            SdpType::Pranswer => "pranswer",
            SdpType::Answer => "answer",
            SdpType::Rollback => "rollback",
        }
    }

    pub fn parse(tag: &str) -> Validation<SdpType> {
        match tag {
            "offer" => Validation::Valid(SdpType::Offer),
            "pranswer" => Validation::Valid(SdpType::Pranswer),
            "answer" => Validation::Valid(SdpType::Answer),
            "rollback" => Validation::Valid(SdpType::Rollback),
            other => Validation::invalid(format!("Expected a valid RTCSdpType, got \"{other}\"")),
        }
    }
}

impl fmt::Display for SdpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromHost for SdpType {
    fn from_host(value: &HostValue) -> Validation<Self> {
        String::from_host(value).flat_map(|tag| SdpType::parse(&tag))
    }
}

/// Description payload exactly as the engine produced it: an unchecked type
/// tag plus the opaque body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSessionDescription {
    pub type_tag: String,
    pub sdp: String,
}

impl NativeSessionDescription {
    pub fn new(type_tag: impl Into<String>, sdp: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            sdp: sdp.into(),
        }
    }
}

impl From<&SessionDescription> for NativeSessionDescription {
    fn from(description: &SessionDescription) -> Self {
        Self::new(description.sdp_type.as_str(), description.sdp.clone())
    }
}

/// A checked session description: type plus opaque SDP body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn new(sdp_type: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            sdp_type,
            sdp: sdp.into(),
        }
    }

    /// Checks an engine payload. A bad tag and an empty body are both reported.
    pub fn from_native(native: &NativeSessionDescription) -> Validation<SessionDescription> {
        let sdp_type = SdpType::parse(&native.type_tag);
        let body = if native.sdp.is_empty() && native.type_tag != SdpType::Rollback.as_str() {
            Validation::invalid("Expected a non-empty sdp")
        } else {
            Validation::Valid(native.sdp.clone())
        };
        sdp_type
            .zip(body)
            .map(|(sdp_type, sdp)| SessionDescription { sdp_type, sdp })
    }
}

/// Requires both `type` and `sdp`.
impl FromHost for SessionDescription {
    fn from_host(value: &HostValue) -> Validation<Self> {
        expect_object(value).flat_map(|object| {
            get_required::<SdpType>(object, "type")
                .zip(get_required::<String>(object, "sdp"))
                .map(|(sdp_type, sdp)| SessionDescription { sdp_type, sdp })
        })
    }
}

impl ToHost for SessionDescription {
    fn to_host(&self) -> HostValue {
        json!({ "type": self.sdp_type.as_str(), "sdp": self.sdp })
    }
}

/// Description argument where the body may be left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescriptionInit {
    pub sdp_type: SdpType,
    pub sdp: Option<String>,
}

impl SessionDescriptionInit {
    /// Uses `fallback` when the body is absent or empty.
    pub fn or_fallback(self, fallback: Option<&SessionDescription>) -> SessionDescription {
        let sdp = match self.sdp {
            Some(sdp) if !sdp.is_empty() => sdp,
            _ => fallback
                .filter(|previous| previous.sdp_type == self.sdp_type)
                .map(|previous| previous.sdp.clone())
                .unwrap_or_default(),
        };
        SessionDescription::new(self.sdp_type, sdp)
    }
}

impl FromHost for SessionDescriptionInit {
    fn from_host(value: &HostValue) -> Validation<Self> {
        expect_object(value).flat_map(|object| {
            get_required::<SdpType>(object, "type")
                .zip(get_optional::<String>(object, "sdp"))
                .map(|(sdp_type, sdp)| SessionDescriptionInit { sdp_type, sdp })
        })
    }
}
