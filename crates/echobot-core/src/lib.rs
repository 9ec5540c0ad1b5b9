pub mod config;
pub mod error;

pub use config::EchobotConfig;
pub use error::{EchobotError, Result};
