pub mod env;
pub mod logging;

pub use logging::setup_logging;
