//! Re-applies captured annotation groups onto a document version.

use docver_core::annotation::AnnotationSnapshot;
use docver_core::document::DocumentRef;
use docver_core::error::Result;
use docver_core::gateway::DocumentGateway;
use docver_core::session::SessionHandle;
use docver_core::status::StatusCode;
use serde::Serialize;
use std::sync::Arc;
use strum::Display;

/// What happened to one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display)]
pub enum ReplayOutcome {
    Applied,
    /// The target already had a group of this name.
    AlreadyPresent,
    Rejected {
        status: StatusCode,
        error: Option<String>,
    },
}

impl ReplayOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ReplayOutcome::Rejected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReplay {
    pub group_name: String,
    pub outcome: ReplayOutcome,
}

/// Per-group outcomes in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    target_version: String,
    entries: Vec<GroupReplay>,
}

impl ReplayReport {
    pub fn new(target_version: impl Into<String>) -> Self {
        Self {
            target_version: target_version.into(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, group_name: impl Into<String>, outcome: ReplayOutcome) {
        self.entries.push(GroupReplay {
            group_name: group_name.into(),
            outcome,
        });
    }

    pub fn target_version(&self) -> &str {
        &self.target_version
    }

    pub fn entries(&self) -> &[GroupReplay] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, ReplayOutcome::Applied))
    }

    pub fn already_present(&self) -> usize {
        self.count(|o| matches!(o, ReplayOutcome::AlreadyPresent))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, ReplayOutcome::Rejected { .. }))
    }

    /// True when no group was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected() == 0
    }

    fn count(&self, predicate: impl Fn(&ReplayOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

pub struct AnnotationReplayer {
    gateway: Arc<dyn DocumentGateway>,
}

impl AnnotationReplayer {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self { gateway }
    }

    /// Adds every group of `snapshot` to `document`, one call per group.
    ///
    /// A group rejected by the server is recorded and the loop moves on.
    /// Transport and decode failures abort the replay.
    pub async fn replay(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        target_version: &str,
        snapshot: AnnotationSnapshot,
    ) -> Result<ReplayReport> {
        let source_version = snapshot.version_number().to_string();
        let mut report = ReplayReport::new(target_version);

        tracing::info!(
            "[Replay] Replaying {} groups from v{} onto {} v{}",
            snapshot.len(),
            source_version,
            document,
            target_version
        );

        for group in snapshot {
            let reply = self.gateway.add_annotation(session, document, &group).await?;

            let outcome = if reply.status.is_success() {
                tracing::info!("[Replay] Applied {}", group.name);
                ReplayOutcome::Applied
            } else if reply.status.is_duplicate_group() {
                tracing::info!("[Replay] {} already present", group.name);
                ReplayOutcome::AlreadyPresent
            } else {
                tracing::warn!(
                    "[Replay] {} rejected with status {}: {}",
                    group.name,
                    reply.status,
                    reply.error.as_deref().unwrap_or("no error text")
                );
                ReplayOutcome::Rejected {
                    status: reply.status,
                    error: reply.error,
                }
            };
            report.record(group.name, outcome);
        }

        tracing::info!(
            "[Replay] Done: {} applied, {} already present, {} rejected",
            report.applied(),
            report.already_present(),
            report.rejected()
        );
        Ok(report)
    }
}
