use crate::functional::{Maybe, Validation};
use serde_json::{Map, Value};

/// Values handed to and received from the host runtime.
pub type HostValue = Value;
pub type HostObject = Map<String, Value>;

/// Decodes a host value without panicking; every problem becomes an error message.
pub trait FromHost: Sized {
    fn from_host(value: &HostValue) -> Validation<Self>;
}

/// Encodes a typed value into its host representation.
pub trait ToHost {
    fn to_host(&self) -> HostValue;
}

pub fn expect_object(value: &HostValue) -> Validation<&HostObject> {
    match value {
        Value::Object(object) => Validation::Valid(object),
        _ => Validation::invalid("Expected an object"),
    }
}

/// Like [`expect_object`], but treats `null`/absent arguments as an empty object.
pub fn object_or_empty(value: Option<&HostValue>) -> Validation<HostObject> {
    match value {
        None | Some(Value::Null) => Validation::Valid(HostObject::new()),
        Some(value) => expect_object(value).map(Clone::clone),
    }
}

pub fn get_required<T: FromHost>(object: &HostObject, name: &str) -> Validation<T> {
    match object.get(name) {
        None | Some(Value::Null) => {
            Validation::invalid(format!("Missing required property \"{name}\""))
        }
        Some(value) => T::from_host(value).context(name),
    }
}

pub fn get_optional<T: FromHost>(object: &HostObject, name: &str) -> Validation<Maybe<T>> {
    match object.get(name) {
        None | Some(Value::Null) => Validation::Valid(None),
        Some(value) => T::from_host(value).context(name).map(Some),
    }
}

pub fn get_or_default<T: FromHost>(object: &HostObject, name: &str, default: T) -> Validation<T> {
    get_optional(object, name).map(|value| value.unwrap_or(default))
}
