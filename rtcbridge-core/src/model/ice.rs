use crate::convert::{FromHost, HostValue, ToHost, expect_object, get_optional, get_required};
use crate::functional::Validation;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A trickled ICE candidate. The candidate line itself is opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u16>,
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>, sdp_mid: Option<String>, sdp_m_line_index: Option<u16>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid,
            sdp_m_line_index,
            username_fragment: None,
        }
    }

    /// An empty candidate line marks the end of candidates.
    pub fn is_end_of_candidates(&self) -> bool {
        self.candidate.is_empty()
    }
}

impl FromHost for IceCandidate {
    fn from_host(value: &HostValue) -> Validation<Self> {
        expect_object(value).flat_map(|object| {
            get_required::<String>(object, "candidate")
                .zip(get_optional::<String>(object, "sdpMid"))
                .zip(get_optional::<u16>(object, "sdpMLineIndex"))
                .zip(get_optional::<String>(object, "usernameFragment"))
                .flat_map(|(((candidate, sdp_mid), sdp_m_line_index), username_fragment)| {
                    if !candidate.is_empty() && sdp_mid.is_none() && sdp_m_line_index.is_none() {
                        return Validation::invalid(
                            "Expected at least one of \"sdpMid\" or \"sdpMLineIndex\"",
                        );
                    }
                    Validation::Valid(IceCandidate {
                        candidate,
                        sdp_mid,
                        sdp_m_line_index,
                        username_fragment,
                    })
                })
        })
    }
}

impl ToHost for IceCandidate {
    fn to_host(&self) -> HostValue {
        json!({
            "candidate": self.candidate,
            "sdpMid": self.sdp_mid,
            "sdpMLineIndex": self.sdp_m_line_index,
            "usernameFragment": self.username_fragment,
        })
    }
}

/// Details of a failed candidate gathering attempt against a STUN/TURN server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidateErrorEvent {
    pub host_candidate: String,
    pub url: String,
    pub error_code: u16,
    pub error_text: String,
}

impl ToHost for IceCandidateErrorEvent {
    fn to_host(&self) -> HostValue {
        json!({
            "hostCandidate": self.host_candidate,
            "url": self.url,
            "errorCode": self.error_code,
            "errorText": self.error_text,
        })
    }
}
