mod maybe;
mod validation;

pub use maybe::*;
pub use validation::*;
