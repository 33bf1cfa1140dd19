use crate::convert::{FromHost, HostValue, ToHost, expect_object, get_optional, get_or_default, object_or_empty};
use crate::functional::Validation;
use crate::utils::DEFAULT_STUN_SERVERS;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

impl FromHost for IceServerConfig {
    fn from_host(value: &HostValue) -> Validation<Self> {
        expect_object(value).flat_map(|object| {
            let urls = match object.get("urls") {
                Some(Value::String(url)) => Validation::Valid(vec![url.clone()]),
                Some(other) => Vec::<String>::from_host(other).context("urls"),
                None => Validation::invalid("Missing required property \"urls\""),
            };
            urls.zip(get_optional::<String>(object, "username"))
                .zip(get_optional::<String>(object, "credential"))
                .map(|((urls, username), credential)| IceServerConfig {
                    urls,
                    username,
                    credential,
                })
        })
    }
}

impl ToHost for IceServerConfig {
    fn to_host(&self) -> HostValue {
        json!({
            "urls": self.urls,
            "username": self.username,
            "credential": self.credential,
        })
    }
}

/// Bounds for the local UDP ports the engine may allocate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub min: Option<u16>,
    pub max: Option<u16>,
}

impl FromHost for PortRange {
    fn from_host(value: &HostValue) -> Validation<Self> {
        expect_object(value).flat_map(|object| {
            get_optional::<u16>(object, "min")
                .zip(get_optional::<u16>(object, "max"))
                .flat_map(|(min, max)| match (min, max) {
                    (Some(min), Some(max)) if min > max => {
                        Validation::invalid("portRange.min must not exceed portRange.max")
                    }
                    (min, max) => Validation::Valid(PortRange { min, max }),
                })
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundlePolicy {
    #[default]
    Balanced,
    MaxCompat,
    MaxBundle,
}

impl FromHost for BundlePolicy {
    fn from_host(value: &HostValue) -> Validation<Self> {
        String::from_host(value).flat_map(|policy| match policy.as_str() {
            "balanced" => Validation::Valid(BundlePolicy::Balanced),
            "max-compat" => Validation::Valid(BundlePolicy::MaxCompat),
            "max-bundle" => Validation::Valid(BundlePolicy::MaxBundle),
            other => Validation::invalid(format!("Expected a valid RTCBundlePolicy, got \"{other}\"")),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IceTransportPolicy {
    #[default]
    All,
    Relay,
}

impl FromHost for IceTransportPolicy {
    fn from_host(value: &HostValue) -> Validation<Self> {
        String::from_host(value).flat_map(|policy| match policy.as_str() {
            "all" => Validation::Valid(IceTransportPolicy::All),
            "relay" => Validation::Valid(IceTransportPolicy::Relay),
            other => Validation::invalid(format!(
                "Expected a valid RTCIceTransportPolicy, got \"{other}\""
            )),
        })
    }
}

/// Connection configuration, decoded from the host's constructor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcConfiguration {
    pub ice_servers: Vec<IceServerConfig>,
    pub port_range: PortRange,
    pub bundle_policy: BundlePolicy,
    pub ice_transport_policy: IceTransportPolicy,
}

impl Default for RtcConfiguration {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: DEFAULT_STUN_SERVERS.iter().map(|url| url.to_string()).collect(),
                username: None,
                credential: None,
            }],
            port_range: PortRange::default(),
            bundle_policy: BundlePolicy::default(),
            ice_transport_policy: IceTransportPolicy::default(),
        }
    }
}

impl RtcConfiguration {
    /// Missing properties take their defaults; a missing argument is the default configuration.
    pub fn from_host_optional(value: Option<&HostValue>) -> Validation<Self> {
        let defaults = RtcConfiguration::default();
        object_or_empty(value).flat_map(|object| {
            get_or_default(&object, "iceServers", defaults.ice_servers)
                .zip(get_or_default(&object, "portRange", defaults.port_range))
                .zip(get_or_default(&object, "bundlePolicy", defaults.bundle_policy))
                .zip(get_or_default(
                    &object,
                    "iceTransportPolicy",
                    defaults.ice_transport_policy,
                ))
                .map(
                    |(((ice_servers, port_range), bundle_policy), ice_transport_policy)| {
                        RtcConfiguration {
                            ice_servers,
                            port_range,
                            bundle_policy,
                            ice_transport_policy,
                        }
                    },
                )
        })
    }
}

impl ToHost for RtcConfiguration {
    fn to_host(&self) -> HostValue {
        json!({
            "iceServers": self.ice_servers,
            "portRange": { "min": self.port_range.min, "max": self.port_range.max },
            "bundlePolicy": self.bundle_policy,
            "iceTransportPolicy": self.ice_transport_policy,
        })
    }
}
