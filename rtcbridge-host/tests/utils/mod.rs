
pub use mock_engine::*;
pub use recorder::*;
