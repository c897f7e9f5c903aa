//! Common utilities shared by the driver and its tests

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::{Settings, SuiteConfig};
pub use error::{Error, Result};
