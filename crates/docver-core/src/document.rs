//! Document identity, lock state and version coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

/// Value substituted when the server omits a storage coordinate.
pub const DEFAULT_STORAGE_ID: &str = "1";

/// Identifies the document a run works on. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentRef {
    pub cabinet: String,
    pub document_index: String,
}

impl DocumentRef {
    pub fn new(cabinet: impl Into<String>, document_index: impl Into<String>) -> Self {
        Self {
            cabinet: cabinet.into(),
            document_index: document_index.into(),
        }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cabinet, self.document_index)
    }
}

/// Lock state as inferred from checkout responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Default)]
pub enum LockState {
    #[default]
    Unlocked,
    CheckedOutBySelf,
    CheckedOutByOther,
}

/// Current version of a checked-out document plus where its content lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionDescriptor {
    pub version_number: String,
    pub volume_id: String,
    pub site_id: String,
    pub parent_folder_index: Option<String>,
}

impl VersionDescriptor {
    /// Builds a descriptor, substituting [`DEFAULT_STORAGE_ID`] for each
    /// storage coordinate that is absent or blank.
    pub fn from_parts(
        version_number: impl Into<String>,
        volume_id: Option<String>,
        site_id: Option<String>,
        parent_folder_index: Option<String>,
    ) -> Self {
        Self {
            version_number: version_number.into(),
            volume_id: or_default_storage_id(volume_id),
            site_id: or_default_storage_id(site_id),
            parent_folder_index: parent_folder_index.filter(|index| !index.trim().is_empty()),
        }
    }
}

fn or_default_storage_id(value: Option<String>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STORAGE_ID.to_string())
}

/// Binary payload committed as the new version.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentContent {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for DocumentContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentContent")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
