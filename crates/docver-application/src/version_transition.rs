//! Commits the checked-out document as a new version.

use crate::diagnostic;
use docver_core::config::CheckinConfig;
use docver_core::document::{DocumentRef, VersionDescriptor};
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{CheckinRequest, CheckinTransport, ContentProvider};
use docver_core::session::SessionHandle;
use std::sync::Arc;

pub struct VersionTransition {
    transport: Arc<dyn CheckinTransport>,
    content: Arc<dyn ContentProvider>,
    created_by_app: String,
    major_version: bool,
}

impl VersionTransition {
    pub fn new(
        transport: Arc<dyn CheckinTransport>,
        content: Arc<dyn ContentProvider>,
        config: &CheckinConfig,
    ) -> Self {
        Self {
            transport,
            content,
            created_by_app: config.created_by_app.clone(),
            major_version: config.major_version,
        }
    }

    /// Checks in the payload against the storage location from `lock_info`
    /// and returns the new version number.
    ///
    /// The server releases the lock as part of a successful check-in.
    pub async fn create_new_version(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        lock_info: &VersionDescriptor,
    ) -> Result<String> {
        let content = self.content.load().await?;
        let request = CheckinRequest {
            volume_id: lock_info.volume_id.clone(),
            site_id: lock_info.site_id.clone(),
            major_version: self.major_version,
            created_by_app: self.created_by_app.clone(),
        };

        tracing::info!(
            "[VersionTransition] Checking in {} over v{} via {} transport ({} bytes)",
            document,
            lock_info.version_number,
            self.transport.name(),
            content.bytes.len()
        );
        let reply = self
            .transport
            .check_in(session, document, &request, &content)
            .await?;

        if !reply.status.is_success() {
            tracing::error!(
                "[VersionTransition] Check-in of {} rejected with status {}",
                document,
                reply.status
            );
            return Err(DocverError::rejected(
                "check-in",
                reply.status.to_string(),
                diagnostic(&reply.raw),
            ));
        }

        let new_version = reply
            .version_number
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                DocverError::decode(
                    "check-in",
                    "success response carries no document version",
                    diagnostic(&reply.raw),
                )
            })?;

        tracing::info!(
            "[VersionTransition] {} moved from v{} to v{}",
            document,
            lock_info.version_number,
            new_version
        );
        Ok(new_version)
    }
}
