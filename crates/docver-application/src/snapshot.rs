//! Capture of all annotation groups on one document version.

use crate::diagnostic;
use docver_core::annotation::AnnotationSnapshot;
use docver_core::annotation::filter::strip_view_hyperlinks;
use docver_core::config::AnnotationConfig;
use docver_core::document::DocumentRef;
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{AnnotationQuery, DocumentGateway};
use docver_core::session::SessionHandle;
use std::sync::Arc;

/// Reads annotation groups into an [`AnnotationSnapshot`].
///
/// A single bounded page is requested; `page_size` is treated as the upper
/// bound on groups per document page.
pub struct AnnotationSnapshotter {
    gateway: Arc<dyn DocumentGateway>,
    page_number: String,
    page_size: u32,
    filter_view_hyperlinks: bool,
}

impl AnnotationSnapshotter {
    pub fn new(gateway: Arc<dyn DocumentGateway>, config: &AnnotationConfig) -> Self {
        Self {
            gateway,
            page_number: config.page_number.clone(),
            page_size: config.page_size,
            filter_view_hyperlinks: config.filter_view_hyperlinks,
        }
    }

    /// Captures the groups of `version_number`.
    ///
    /// Success with no groups is an empty snapshot. A non-success status is
    /// [`DocverError::Rejected`], never an empty snapshot.
    pub async fn capture(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        version_number: &str,
    ) -> Result<AnnotationSnapshot> {
        let query = AnnotationQuery {
            version_number: version_number.to_string(),
            page_number: self.page_number.clone(),
            page_size: self.page_size,
        };

        let reply = self.gateway.annotation_groups(session, document, &query).await?;
        if !reply.status.is_success() {
            tracing::error!(
                "[Snapshot] Listing annotations of {} v{} failed with status {}",
                document,
                version_number,
                reply.status
            );
            let detail = match reply.error {
                Some(error) => format!("{} ({})", error, diagnostic(&reply.raw)),
                None => diagnostic(&reply.raw),
            };
            return Err(DocverError::rejected(
                "annotation listing",
                reply.status.to_string(),
                detail,
            ));
        }

        let captured = reply.groups.len();
        let mut snapshot = AnnotationSnapshot::new(document.clone(), version_number, reply.groups);
        if self.filter_view_hyperlinks {
            snapshot = snapshot.filter_map_groups(strip_view_hyperlinks);
            if snapshot.len() != captured {
                tracing::info!(
                    "[Snapshot] View-hyperlink filter dropped {} of {} groups",
                    captured - snapshot.len(),
                    captured
                );
            }
        }

        tracing::info!(
            "[Snapshot] Captured {} groups from {} v{}",
            snapshot.len(),
            document,
            version_number
        );
        for group in snapshot.groups() {
            tracing::debug!(
                "[Snapshot]   {} (type {:?}, page {}, {} records)",
                group.name,
                group.annotation_type,
                group.page_number,
                group.parsed_buffer().record_count()
            );
        }
        Ok(snapshot)
    }
}
