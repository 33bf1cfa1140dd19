//! Plain-data side of the bridge: the `Maybe`/`Validation` functors, the
//! handle map, the host-visible model types and their host conversions.

pub mod bidimap;
pub mod convert;
pub mod functional;
pub mod model;
pub mod utils;

pub use bidimap::BidiMap;
pub use functional::{Maybe, MaybeExt, Validation, ValidationErrors};
pub use model::*;
