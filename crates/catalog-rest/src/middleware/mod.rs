//! Custom middleware.

mod logging;

pub use logging::*;
