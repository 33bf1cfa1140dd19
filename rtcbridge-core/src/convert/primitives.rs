use crate::convert::{FromHost, HostValue, ToHost};
use crate::functional::{Maybe, Validation};
use serde_json::Value;

impl FromHost for HostValue {
    fn from_host(value: &HostValue) -> Validation<Self> {
        Validation::Valid(value.clone())
    }
}

impl FromHost for String {
    fn from_host(value: &HostValue) -> Validation<Self> {
        match value {
            Value::String(s) => Validation::Valid(s.clone()),
            _ => Validation::invalid("Expected a string"),
        }
    }
}

impl FromHost for bool {
    fn from_host(value: &HostValue) -> Validation<Self> {
        match value {
            Value::Bool(b) => Validation::Valid(*b),
            _ => Validation::invalid("Expected a boolean"),
        }
    }
}

impl FromHost for f64 {
    fn from_host(value: &HostValue) -> Validation<Self> {
        value
            .as_f64()
            .map(Validation::Valid)
            .unwrap_or_else(|| Validation::invalid("Expected a number"))
    }
}

macro_rules! integer_from_host {
    ($($ty:ty),*) => {
        $(
            impl FromHost for $ty {
                fn from_host(value: &HostValue) -> Validation<Self> {
                    let parsed = value
                        .as_i64()
                        .and_then(|n| <$ty>::try_from(n).ok());
                    match parsed {
                        Some(n) => Validation::Valid(n),
                        None => Validation::invalid(format!(
                            "Expected an integer between {} and {}",
                            <$ty>::MIN,
                            <$ty>::MAX
                        )),
                    }
                }
            }
        )*
    };
}

integer_from_host!(u16, u32, i32);

impl<T: FromHost> FromHost for Vec<T> {
    fn from_host(value: &HostValue) -> Validation<Self> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| T::from_host(item).context(&format!("[{index}]")))
                .collect(),
            _ => Validation::invalid("Expected an array"),
        }
    }
}

impl<T: FromHost> FromHost for Maybe<T> {
    fn from_host(value: &HostValue) -> Validation<Self> {
        match value {
            Value::Null => Validation::Valid(None),
            value => T::from_host(value).map(Some),
        }
    }
}

impl ToHost for String {
    fn to_host(&self) -> HostValue {
        Value::String(self.clone())
    }
}

impl ToHost for str {
    fn to_host(&self) -> HostValue {
        Value::String(self.to_owned())
    }
}

impl ToHost for bool {
    fn to_host(&self) -> HostValue {
        Value::Bool(*self)
    }
}

impl ToHost for f64 {
    fn to_host(&self) -> HostValue {
        Value::from(*self)
    }
}

impl ToHost for u16 {
    fn to_host(&self) -> HostValue {
        Value::from(*self)
    }
}

impl ToHost for i32 {
    fn to_host(&self) -> HostValue {
        Value::from(*self)
    }
}

impl<T: ToHost> ToHost for Vec<T> {
    fn to_host(&self) -> HostValue {
        Value::Array(self.iter().map(ToHost::to_host).collect())
    }
}

impl<T: ToHost> ToHost for Maybe<T> {
    fn to_host(&self) -> HostValue {
        self.as_ref().map(ToHost::to_host).unwrap_or(Value::Null)
    }
}
