mod host_value;
mod primitives;

pub use host_value::*;
