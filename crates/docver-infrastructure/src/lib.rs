//! Configuration loading and local file access for docver.

pub mod config_service;
pub mod content;
pub mod paths;

pub use config_service::ConfigService;
pub use content::FileContentProvider;
pub use paths::{DocverPaths, PathError};
