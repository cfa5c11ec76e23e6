//! `astra-core`: configuration and error types shared by every Astra crate.

pub mod config;
pub mod error;

pub use config::AstraConfig;
pub use error::{AstraError, Result};
