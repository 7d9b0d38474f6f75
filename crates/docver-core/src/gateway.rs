//! Ports to the remote ECM service.
//!
//! Adapters return `Err` only when no usable answer came back (transport
//! failure, undecodable body). A well-formed answer carrying a non-success
//! status is returned as `Ok` so that the caller decides the policy: retry,
//! swallow, record or abort.

use crate::annotation::AnnotationGroup;
use crate::document::{DocumentContent, DocumentRef};
use crate::error::Result;
use crate::session::{Credentials, SessionHandle};
use crate::status::StatusCode;
use async_trait::async_trait;
use serde::Serialize;
use strum::Display;

/// Selects the lock or unlock branch of the checkout operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CheckoutFlag {
    Lock,
    Unlock,
}

impl CheckoutFlag {
    /// Value of the `CheckInOutFlag` request field.
    pub fn wire_value(self) -> &'static str {
        match self {
            CheckoutFlag::Lock => "Y",
            CheckoutFlag::Unlock => "U",
        }
    }
}

/// Answer to a checkout / undo-checkout call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutReply {
    pub status: StatusCode,
    pub version_number: Option<String>,
    pub volume_id: Option<String>,
    pub site_id: Option<String>,
    pub parent_folder_index: Option<String>,
    /// Response body as received, for diagnostics.
    pub raw: String,
}

/// Parameters of one annotation-group listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationQuery {
    pub version_number: String,
    pub page_number: String,
    pub page_size: u32,
}

/// Answer to an annotation-group listing, groups already in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationListReply {
    pub status: StatusCode,
    pub error: Option<String>,
    pub groups: Vec<AnnotationGroup>,
    pub raw: String,
}

/// Answer to a single add-annotation call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddAnnotationReply {
    pub status: StatusCode,
    pub error: Option<String>,
    pub raw: String,
}

/// Fields of a new-version check-in besides the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckinRequest {
    pub volume_id: String,
    pub site_id: String,
    pub major_version: bool,
    pub created_by_app: String,
}

/// Answer to a check-in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckinReply {
    pub status: StatusCode,
    pub version_number: Option<String>,
    pub raw: String,
}

/// Obtains a session handle.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionHandle>;
}

/// Structured-API operations on one document.
#[async_trait]
pub trait DocumentGateway: Send + Sync {
    async fn checkout(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        flag: CheckoutFlag,
    ) -> Result<CheckoutReply>;

    async fn annotation_groups(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        query: &AnnotationQuery,
    ) -> Result<AnnotationListReply>;

    async fn add_annotation(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        group: &AnnotationGroup,
    ) -> Result<AddAnnotationReply>;
}

/// Commits a new version. Implementations differ in how the payload travels.
#[async_trait]
pub trait CheckinTransport: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn check_in(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        request: &CheckinRequest,
        content: &DocumentContent,
    ) -> Result<CheckinReply>;
}

/// Supplies the file committed as the new version.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn load(&self) -> Result<DocumentContent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_flag_wire_values() {
        assert_eq!(CheckoutFlag::Lock.wire_value(), "Y");
        assert_eq!(CheckoutFlag::Unlock.wire_value(), "U");
        assert_eq!(CheckoutFlag::Unlock.to_string(), "Unlock");
    }
}
