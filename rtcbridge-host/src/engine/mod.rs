mod factory;
mod native;

pub use factory::*;
pub use native::*;
