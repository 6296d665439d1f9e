pub mod config;
pub mod error;
pub mod fixtures;
pub mod types;

pub use config::MindEaseConfig;
pub use error::{MindEaseError, Result};
pub use types::*;
