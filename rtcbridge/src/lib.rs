pub use rtcbridge_core::{BidiMap, Maybe, MaybeExt, Validation, ValidationErrors};

pub mod model {
    pub use rtcbridge_core::model::*;
}

pub mod convert {
    pub use rtcbridge_core::convert::*;
}

#[cfg(feature = "host")]
pub mod host {
    pub use rtcbridge_host::*;
}
