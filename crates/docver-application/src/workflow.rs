//! End-to-end version transition that keeps annotations.
//!
//! ```text
//! login -> CleanState -> Peek -> Lock -> Snapshot(old)
//!       -> [empty: release, NothingToCopy]
//!       -> Transition -> Replay -> Verify
//! ```
//!
//! Stages run strictly one after another. Any error aborts the run; nothing
//! is rolled back, so the document may stay checked out after a failure.

use crate::lock_controller::LockController;
use crate::replay::{AnnotationReplayer, ReplayReport};
use crate::snapshot::AnnotationSnapshotter;
use crate::version_transition::VersionTransition;
use docver_core::config::WorkflowConfig;
use docver_core::document::DocumentRef;
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{CheckinTransport, ContentProvider, DocumentGateway, SessionProvider};
use serde::Serialize;
use std::sync::Arc;
use strum::Display;
use tracing::Instrument;
use uuid::Uuid;

/// The remote services a run talks to.
#[derive(Clone)]
pub struct WorkflowPorts {
    pub sessions: Arc<dyn SessionProvider>,
    pub documents: Arc<dyn DocumentGateway>,
    pub checkin: Arc<dyn CheckinTransport>,
    pub content: Arc<dyn ContentProvider>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WorkflowStage {
    Login,
    CleanState,
    Peek,
    Lock,
    Snapshot,
    Transition,
    Replay,
    Verify,
}

/// Summary of a run that reached verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub run_id: Uuid,
    pub document: DocumentRef,
    pub source_version: String,
    pub new_version: String,
    pub captured_groups: usize,
    pub replay: ReplayReport,
    pub verified_groups: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum WorkflowOutcome {
    /// The new version carries at least one annotation group.
    Verified(WorkflowReport),
    /// The new version was read back without any annotation group.
    NotVerified(WorkflowReport),
    /// The source version had no annotations; no version was created.
    NothingToCopy {
        run_id: Uuid,
        document: DocumentRef,
        source_version: String,
    },
}

impl WorkflowOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            WorkflowOutcome::Verified(report) | WorkflowOutcome::NotVerified(report) => {
                report.run_id
            }
            WorkflowOutcome::NothingToCopy { run_id, .. } => *run_id,
        }
    }

    pub fn report(&self) -> Option<&WorkflowReport> {
        match self {
            WorkflowOutcome::Verified(report) | WorkflowOutcome::NotVerified(report) => Some(report),
            WorkflowOutcome::NothingToCopy { .. } => None,
        }
    }

    /// True for outcomes that leave the document in the intended state.
    pub fn is_success(&self) -> bool {
        !matches!(self, WorkflowOutcome::NotVerified(_))
    }
}

/// Runs the workflow for the document named in the configuration.
pub struct VersionWorkflow {
    config: WorkflowConfig,
    ports: WorkflowPorts,
}

impl VersionWorkflow {
    pub fn new(config: WorkflowConfig, ports: WorkflowPorts) -> Self {
        Self { config, ports }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Executes one run within the configured run deadline.
    pub async fn run(&self) -> Result<WorkflowOutcome> {
        let run_id = Uuid::new_v4();
        let document = self.config.target.clone();
        let span = tracing::info_span!("workflow", run_id = %run_id, document = %document);
        let deadline = self.config.timeouts.run_deadline();

        let stages = self.run_stages(run_id, document).instrument(span);
        match tokio::time::timeout(deadline, stages).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    "[Workflow] Run {} exceeded deadline of {}s",
                    run_id,
                    deadline.as_secs()
                );
                Err(DocverError::DeadlineExceeded {
                    seconds: deadline.as_secs(),
                })
            }
        }
    }

    async fn run_stages(&self, run_id: Uuid, document: DocumentRef) -> Result<WorkflowOutcome> {
        let documents = Arc::clone(&self.ports.documents);
        let mut lock = LockController::new(Arc::clone(&documents));
        let snapshotter = AnnotationSnapshotter::new(Arc::clone(&documents), &self.config.annotations);
        let transition = VersionTransition::new(
            Arc::clone(&self.ports.checkin),
            Arc::clone(&self.ports.content),
            &self.config.checkin,
        );
        let replayer = AnnotationReplayer::new(documents);

        tracing::info!("[Workflow] Starting run {} for {}", run_id, document);

        enter(WorkflowStage::Login);
        let session = self.ports.sessions.login(&self.config.credentials).await?;

        enter(WorkflowStage::CleanState);
        lock.force_release(&session, &document).await?;

        enter(WorkflowStage::Peek);
        let peeked = lock.peek_version(&session, &document).await?;

        enter(WorkflowStage::Lock);
        let lock_info = lock.acquire_lock(&session, &document).await?;
        if lock_info.version_number != peeked.version_number {
            tracing::warn!(
                "[Workflow] Version moved from {} to {} between peek and lock",
                peeked.version_number,
                lock_info.version_number
            );
        }

        enter(WorkflowStage::Snapshot);
        let snapshot = snapshotter
            .capture(&session, &document, &lock_info.version_number)
            .await?;
        if snapshot.is_empty() {
            tracing::info!(
                "[Workflow] No annotations on v{}, releasing lock and stopping",
                lock_info.version_number
            );
            lock.release(&session, &document).await?;
            return Ok(WorkflowOutcome::NothingToCopy {
                run_id,
                document,
                source_version: lock_info.version_number,
            });
        }
        let captured_groups = snapshot.len();

        enter(WorkflowStage::Transition);
        let new_version = transition
            .create_new_version(&session, &document, &lock_info)
            .await?;
        lock.mark_released();

        enter(WorkflowStage::Replay);
        let replay = replayer
            .replay(&session, &document, &new_version, snapshot)
            .await?;

        enter(WorkflowStage::Verify);
        let verification = snapshotter.capture(&session, &document, &new_version).await?;

        let report = WorkflowReport {
            run_id,
            document,
            source_version: lock_info.version_number,
            new_version,
            captured_groups,
            replay,
            verified_groups: verification.len(),
        };

        if report.verified_groups > 0 {
            tracing::info!(
                "[Workflow] Verified: v{} carries {} of {} groups",
                report.new_version,
                report.verified_groups,
                report.captured_groups
            );
            Ok(WorkflowOutcome::Verified(report))
        } else {
            tracing::error!(
                "[Workflow] Verification failed: v{} has no annotation groups",
                report.new_version
            );
            Ok(WorkflowOutcome::NotVerified(report))
        }
    }
}

fn enter(stage: WorkflowStage) {
    tracing::info!("[Workflow] Stage {}", stage);
}
