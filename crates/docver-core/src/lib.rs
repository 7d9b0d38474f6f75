//! Domain model and ports for carrying annotations across document versions.

pub mod annotation;
pub mod config;
pub mod document;
pub mod error;
pub mod gateway;
pub mod session;
pub mod status;

// Re-export common error type
pub use error::{DocverError, Result};

pub use annotation::{AnnotationGroup, AnnotationSnapshot};
pub use config::WorkflowConfig;
pub use document::{DocumentContent, DocumentRef, LockState, VersionDescriptor};
pub use session::{Credentials, SessionHandle};
pub use status::StatusCode;
