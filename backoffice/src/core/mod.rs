//! Configuration, errors, and logging

pub mod config;
pub mod error;
pub mod logger;

pub use config::Config;
pub use error::{AppError, AppResult};
