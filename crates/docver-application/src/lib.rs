//! Application layer for docver.
//!
//! Each component drives one part of the version transition through the
//! ports in `docver-core`; [`VersionWorkflow`] sequences them.

pub mod lock_controller;
pub mod replay;
pub mod snapshot;
pub mod version_transition;
pub mod workflow;

pub use lock_controller::LockController;
pub use replay::{AnnotationReplayer, GroupReplay, ReplayOutcome, ReplayReport};
pub use snapshot::AnnotationSnapshotter;
pub use version_transition::VersionTransition;
pub use workflow::{VersionWorkflow, WorkflowOutcome, WorkflowPorts, WorkflowReport, WorkflowStage};

const DIAGNOSTIC_LIMIT: usize = 1000;

/// Trims a raw response body for inclusion in an error.
pub(crate) fn diagnostic(raw: &str) -> String {
    if raw.len() <= DIAGNOSTIC_LIMIT {
        return raw.to_string();
    }
    let mut end = DIAGNOSTIC_LIMIT;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &raw[..end])
}
