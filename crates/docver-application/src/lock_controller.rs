//! Exclusive editing rights on one document.
//!
//! Checkout conflicts are recovered by one forced undo-checkout and a single
//! retry. Undo failures are never fatal; they are logged at warn with the
//! status the server returned.

use crate::diagnostic;
use docver_core::document::{DocumentRef, LockState, VersionDescriptor};
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{CheckoutFlag, DocumentGateway};
use docver_core::session::SessionHandle;
use std::sync::Arc;

/// Tracks the lock this run holds on a document.
///
/// One controller belongs to one workflow run; the state it reports is only
/// what the last checkout or undo response implied.
pub struct LockController {
    gateway: Arc<dyn DocumentGateway>,
    state: LockState,
}

impl LockController {
    pub fn new(gateway: Arc<dyn DocumentGateway>) -> Self {
        Self {
            gateway,
            state: LockState::Unlocked,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Checks the document out for this session.
    ///
    /// A conflict status triggers [`force_release`](Self::force_release) and
    /// exactly one retry. A second conflict yields
    /// [`DocverError::LockConflict`]; any other non-success status yields
    /// [`DocverError::Rejected`].
    pub async fn acquire_lock(
        &mut self,
        session: &SessionHandle,
        document: &DocumentRef,
    ) -> Result<VersionDescriptor> {
        match self.try_checkout(session, document).await? {
            Checkout::Locked(descriptor) => Ok(descriptor),
            Checkout::Conflict(status) => {
                tracing::warn!(
                    "[LockController] {} is checked out elsewhere (status {}), forcing release",
                    document,
                    status
                );
                self.force_release(session, document).await?;

                match self.try_checkout(session, document).await? {
                    Checkout::Locked(descriptor) => Ok(descriptor),
                    Checkout::Conflict(status) => {
                        tracing::error!(
                            "[LockController] {} still checked out after forced release (status {})",
                            document,
                            status
                        );
                        Err(DocverError::LockConflict {
                            document: document.to_string(),
                            status,
                        })
                    }
                }
            }
        }
    }

    /// Undo-checkout that tolerates any status.
    pub async fn force_release(
        &mut self,
        session: &SessionHandle,
        document: &DocumentRef,
    ) -> Result<()> {
        self.undo(session, document, "forced release").await
    }

    /// Undo-checkout of a lock this run took itself.
    pub async fn release(&mut self, session: &SessionHandle, document: &DocumentRef) -> Result<()> {
        if self.state != LockState::CheckedOutBySelf {
            tracing::debug!(
                "[LockController] Releasing {} while state is {}",
                document,
                self.state
            );
        }
        self.undo(session, document, "release").await
    }

    /// Reads the current version by locking and immediately unlocking.
    pub async fn peek_version(
        &mut self,
        session: &SessionHandle,
        document: &DocumentRef,
    ) -> Result<VersionDescriptor> {
        let descriptor = self.acquire_lock(session, document).await?;
        self.force_release(session, document).await?;
        tracing::info!(
            "[LockController] Current version of {} is {}",
            document,
            descriptor.version_number
        );
        Ok(descriptor)
    }

    /// Records that the server dropped the lock on its own (a check-in does).
    pub fn mark_released(&mut self) {
        self.state = LockState::Unlocked;
    }

    async fn try_checkout(
        &mut self,
        session: &SessionHandle,
        document: &DocumentRef,
    ) -> Result<Checkout> {
        let reply = self
            .gateway
            .checkout(session, document, CheckoutFlag::Lock)
            .await?;

        if reply.status.is_checkout_conflict() {
            self.state = LockState::CheckedOutByOther;
            return Ok(Checkout::Conflict(reply.status.to_string()));
        }
        if !reply.status.is_success() {
            tracing::error!(
                "[LockController] Checkout of {} rejected with status {}",
                document,
                reply.status
            );
            return Err(DocverError::rejected(
                "checkout",
                reply.status.to_string(),
                diagnostic(&reply.raw),
            ));
        }

        let version_number = reply
            .version_number
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                DocverError::decode(
                    "checkout",
                    "success response carries no document version",
                    diagnostic(&reply.raw),
                )
            })?;

        self.state = LockState::CheckedOutBySelf;
        let descriptor = VersionDescriptor::from_parts(
            version_number,
            reply.volume_id,
            reply.site_id,
            reply.parent_folder_index,
        );
        tracing::info!(
            "[LockController] Locked {} at version {} (volume {}, site {})",
            document,
            descriptor.version_number,
            descriptor.volume_id,
            descriptor.site_id
        );
        Ok(Checkout::Locked(descriptor))
    }

    async fn undo(
        &mut self,
        session: &SessionHandle,
        document: &DocumentRef,
        purpose: &str,
    ) -> Result<()> {
        let reply = self
            .gateway
            .checkout(session, document, CheckoutFlag::Unlock)
            .await?;

        if reply.status.is_success() {
            tracing::info!("[LockController] {} of {} succeeded", purpose, document);
        } else {
            tracing::warn!(
                "[LockController] {} of {} returned status {}, continuing",
                purpose,
                document,
                reply.status
            );
        }
        self.state = LockState::Unlocked;
        Ok(())
    }
}

enum Checkout {
    Locked(VersionDescriptor),
    Conflict(String),
}
