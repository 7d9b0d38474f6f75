//! Annotation groups and snapshots.

pub mod buffer;
pub mod filter;

use crate::document::DocumentRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use buffer::{AnnotationBuffer, BufferEntry, BufferSection};

/// Page number used when the server omits one.
pub const DEFAULT_PAGE_NUMBER: &str = "1";
/// Access type used when the server omits one.
pub const DEFAULT_ACCESS_TYPE: &str = "I";

/// A named bundle of annotation records on one page of one version.
///
/// An empty `annotation_type` marks an image/stamp group; typed notes carry a
/// non-empty type. `buffer` is the server's mini-format text and is replayed
/// byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationGroup {
    pub name: String,
    pub annotation_type: String,
    pub page_number: String,
    pub access_type: String,
    pub buffer: String,
}

impl AnnotationGroup {
    pub fn new(name: impl Into<String>, buffer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation_type: String::new(),
            page_number: DEFAULT_PAGE_NUMBER.to_string(),
            access_type: DEFAULT_ACCESS_TYPE.to_string(),
            buffer: buffer.into(),
        }
    }

    pub fn with_type(mut self, annotation_type: impl Into<String>) -> Self {
        self.annotation_type = annotation_type.into();
        self
    }

    pub fn with_page(mut self, page_number: impl Into<String>) -> Self {
        self.page_number = page_number.into();
        self
    }

    pub fn with_access(mut self, access_type: impl Into<String>) -> Self {
        self.access_type = access_type.into();
        self
    }

    /// True for image/stamp groups (no annotation type).
    pub fn is_untyped(&self) -> bool {
        self.annotation_type.is_empty()
    }

    pub fn parsed_buffer(&self) -> AnnotationBuffer {
        AnnotationBuffer::parse(&self.buffer)
    }
}

/// Every annotation group read from one document version at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationSnapshot {
    document: DocumentRef,
    version_number: String,
    captured_at: DateTime<Utc>,
    groups: Vec<AnnotationGroup>,
}

impl AnnotationSnapshot {
    pub fn new(
        document: DocumentRef,
        version_number: impl Into<String>,
        groups: Vec<AnnotationGroup>,
    ) -> Self {
        Self {
            document,
            version_number: version_number.into(),
            captured_at: Utc::now(),
            groups,
        }
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn version_number(&self) -> &str {
        &self.version_number
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn groups(&self) -> &[AnnotationGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Applies `f` to every group; groups mapped to `None` are dropped.
    pub fn filter_map_groups<F>(mut self, f: F) -> Self
    where
        F: FnMut(AnnotationGroup) -> Option<AnnotationGroup>,
    {
        self.groups = self.groups.into_iter().filter_map(f).collect();
        self
    }
}

impl IntoIterator for AnnotationSnapshot {
    type Item = AnnotationGroup;
    type IntoIter = std::vec::IntoIter<AnnotationGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}
