//! JSON shapes exchanged with the ECM service.
//!
//! Everything here is crate-private. Responses are converted into the
//! `docver_core::gateway` reply types right after deserialization, which is
//! where the "one object or a list of objects" ambiguity is resolved.

use docver_core::annotation::{AnnotationGroup, DEFAULT_ACCESS_TYPE, DEFAULT_PAGE_NUMBER};
use docver_core::error::{DocverError, Result};
use docver_core::status::{StatusCode, deserialize_optional_lenient};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Longest body excerpt embedded in an error.
const BODY_EXCERPT_LEN: usize = 2000;

// ============================================================================
// Shape helpers
// ============================================================================

/// A field the server emits as a single object when there is one element and
/// as an array otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Renders the `Error` field, which is usually text but sometimes an object.
fn error_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}

pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LEN {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

/// Parses a response body as JSON.
pub(crate) fn parse_body(operation: &'static str, body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| DocverError::decode(operation, e.to_string(), excerpt(body)))
}

// ============================================================================
// Execute-API envelope
// ============================================================================

/// An input object of the structured API, named by its `Option` value.
pub(crate) trait ExecuteOption: Serialize {
    const OPTION: &'static str;
}

#[derive(Debug, Serialize)]
pub(crate) struct ExecuteEnvelope<T> {
    #[serde(rename = "NGOExecuteAPIBDO")]
    bdo: ExecuteBdo<T>,
}

#[derive(Debug, Serialize)]
struct ExecuteBdo<T> {
    #[serde(rename = "inputData")]
    input_data: BTreeMap<String, T>,
    #[serde(rename = "base64Encoded")]
    base64_encoded: &'static str,
    locale: String,
}

impl<T: ExecuteOption> ExecuteEnvelope<T> {
    pub(crate) fn new(input: T, locale: &str) -> Self {
        let mut input_data = BTreeMap::new();
        input_data.insert(format!("{}_Input", T::OPTION), input);
        Self {
            bdo: ExecuteBdo {
                input_data,
                base64_encoded: "N",
                locale: locale.to_string(),
            },
        }
    }
}

/// Extracts `NGOExecuteAPIResponseBDO.outputData.<option>_Output`.
///
/// A missing output yields `T::default()`, whose status is empty and therefore
/// not a success; the caller reports it together with the raw body.
pub(crate) fn execute_output<T>(operation: &'static str, option: &str, body: &Value, raw: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let pointer = format!("/NGOExecuteAPIResponseBDO/outputData/{}_Output", option);
    match body.pointer(&pointer) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(output) => T::deserialize(output)
            .map_err(|e| DocverError::decode(operation, e.to_string(), excerpt(raw))),
    }
}

// ============================================================================
// NGOCheckinCheckoutExt
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CheckinCheckoutInput {
    option: &'static str,
    cabinet_name: String,
    #[serde(rename = "UserDBId")]
    user_db_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_date_time: Option<String>,
    check_in_out_flag: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sup_annot_version: Option<&'static str>,
    documents: DocumentsInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentsInput {
    document: DocumentIndexInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentIndexInput {
    document_index: String,
}

impl CheckinCheckoutInput {
    /// Checkout request. `now` is the client timestamp the service expects.
    pub(crate) fn lock(cabinet: &str, session: &str, document_index: &str, now: String) -> Self {
        Self {
            option: Self::OPTION,
            cabinet_name: cabinet.to_string(),
            user_db_id: session.to_string(),
            current_date_time: Some(now),
            check_in_out_flag: "Y",
            // keep annotations attached to the checked-out version
            sup_annot_version: Some("N"),
            documents: DocumentsInput {
                document: DocumentIndexInput {
                    document_index: document_index.to_string(),
                },
            },
        }
    }

    pub(crate) fn unlock(cabinet: &str, session: &str, document_index: &str) -> Self {
        Self {
            option: Self::OPTION,
            cabinet_name: cabinet.to_string(),
            user_db_id: session.to_string(),
            current_date_time: None,
            check_in_out_flag: "U",
            sup_annot_version: None,
            documents: DocumentsInput {
                document: DocumentIndexInput {
                    document_index: document_index.to_string(),
                },
            },
        }
    }
}

impl ExecuteOption for CheckinCheckoutInput {
    const OPTION: &'static str = "NGOCheckinCheckoutExt";
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct CheckinCheckoutOutput {
    pub status: StatusCode,
    pub error: Option<Value>,
    pub documents: Option<DocumentsOutput>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct DocumentsOutput {
    pub document: Option<OneOrMany<CheckedOutDocument>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct CheckedOutDocument {
    #[serde(deserialize_with = "deserialize_optional_lenient")]
    pub document_version_no: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_lenient")]
    pub volume_id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_lenient")]
    pub site_id: Option<String>,
    #[serde(deserialize_with = "deserialize_optional_lenient")]
    pub parent_folder_index: Option<String>,
}

impl CheckinCheckoutOutput {
    /// The checked-out document. Only one is ever requested, so the first wins.
    pub(crate) fn into_document(self) -> (StatusCode, Option<String>, Option<CheckedOutDocument>) {
        let document = self
            .documents
            .and_then(|docs| docs.document)
            .and_then(|doc| Vec::from(doc).into_iter().next());
        (self.status, error_text(self.error), document)
    }
}

// ============================================================================
// NGOGetAnnotationGroupList
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AnnotationGroupListInput {
    option: &'static str,
    cabinet_name: String,
    #[serde(rename = "UserDBId")]
    user_db_id: String,
    document_index: String,
    page_no: String,
    previous_annotation_index: &'static str,
    version_no: String,
    sort_order: &'static str,
    no_of_records_to_fetch: String,
}

impl AnnotationGroupListInput {
    pub(crate) fn new(
        cabinet: &str,
        session: &str,
        document_index: &str,
        version_number: &str,
        page_number: &str,
        page_size: u32,
    ) -> Self {
        Self {
            option: Self::OPTION,
            cabinet_name: cabinet.to_string(),
            user_db_id: session.to_string(),
            document_index: document_index.to_string(),
            page_no: page_number.to_string(),
            previous_annotation_index: "0",
            version_no: version_number.to_string(),
            sort_order: "A",
            no_of_records_to_fetch: page_size.to_string(),
        }
    }
}

impl ExecuteOption for AnnotationGroupListInput {
    const OPTION: &'static str = "NGOGetAnnotationGroupList";
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct AnnotationGroupListOutput {
    pub status: StatusCode,
    pub error: Option<Value>,
    pub annotation_groups: Option<GroupsField>,
}

/// The `AnnotationGroups` field: a wrapper object, a bare list, or an empty
/// string when there are no groups.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GroupsField {
    Wrapped(AnnotationGroupsWrapper),
    List(Vec<AnnotationGroupDto>),
    Blank(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AnnotationGroupsWrapper {
    #[serde(rename = "AnnotationGroup")]
    group: Option<OneOrMany<AnnotationGroupDto>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AnnotationGroupDto {
    #[serde(rename = "AnnotGroupName", deserialize_with = "deserialize_optional_lenient")]
    name: Option<String>,
    #[serde(rename = "AnnotationType", deserialize_with = "deserialize_optional_lenient")]
    annotation_type: Option<String>,
    #[serde(rename = "PageNo", deserialize_with = "deserialize_optional_lenient")]
    page_number: Option<String>,
    #[serde(rename = "AccessType", deserialize_with = "deserialize_optional_lenient")]
    access_type: Option<String>,
    #[serde(rename = "AnnotationBuffer", deserialize_with = "deserialize_optional_lenient")]
    buffer: Option<String>,
}

impl From<AnnotationGroupDto> for AnnotationGroup {
    fn from(dto: AnnotationGroupDto) -> Self {
        AnnotationGroup {
            name: dto.name.unwrap_or_default(),
            // absent type means image/stamp, not a missing field
            annotation_type: dto.annotation_type.unwrap_or_default(),
            page_number: dto
                .page_number
                .unwrap_or_else(|| DEFAULT_PAGE_NUMBER.to_string()),
            access_type: dto
                .access_type
                .unwrap_or_else(|| DEFAULT_ACCESS_TYPE.to_string()),
            buffer: dto.buffer.unwrap_or_default(),
        }
    }
}

impl AnnotationGroupListOutput {
    /// Status, error text and the groups in source order.
    pub(crate) fn into_parts(self) -> (StatusCode, Option<String>, Vec<AnnotationGroup>) {
        let dtos: Vec<AnnotationGroupDto> = match self.annotation_groups {
            Some(GroupsField::Wrapped(wrapper)) => wrapper.group.map(Vec::from).unwrap_or_default(),
            Some(GroupsField::List(list)) => list,
            Some(GroupsField::Blank(_)) | None => Vec::new(),
        };
        let groups = dtos.into_iter().map(AnnotationGroup::from).collect();
        (self.status, error_text(self.error), groups)
    }
}

// ============================================================================
// NGOAddAnnotation
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct AddAnnotationInput {
    option: &'static str,
    cabinet_name: String,
    #[serde(rename = "UserDBId")]
    user_db_id: String,
    document_index: String,
    annotation_group: AnnotationGroupInput,
    major_version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AnnotationGroupInput {
    annotation_type: String,
    page_no: String,
    annot_group_name: String,
    access_type: String,
    annotation_buffer: String,
}

impl AddAnnotationInput {
    pub(crate) fn new(cabinet: &str, session: &str, document_index: &str, group: &AnnotationGroup) -> Self {
        Self {
            option: Self::OPTION,
            cabinet_name: cabinet.to_string(),
            user_db_id: session.to_string(),
            document_index: document_index.to_string(),
            annotation_group: AnnotationGroupInput {
                annotation_type: group.annotation_type.clone(),
                page_no: group.page_number.clone(),
                annot_group_name: group.name.clone(),
                access_type: group.access_type.clone(),
                annotation_buffer: group.buffer.clone(),
            },
            major_version: "N",
        }
    }
}

impl ExecuteOption for AddAnnotationInput {
    const OPTION: &'static str = "NGOAddAnnotation";
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct AddAnnotationOutput {
    pub status: StatusCode,
    pub error: Option<Value>,
}

impl AddAnnotationOutput {
    pub(crate) fn into_parts(self) -> (StatusCode, Option<String>) {
        (self.status, error_text(self.error))
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginResponse {
    #[serde(rename = "wmConnectResponse")]
    wm_connect_response: Option<WmConnectResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WmConnectResponse {
    #[serde(rename = "Participant")]
    participant: Option<Participant>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Participant {
    #[serde(rename = "SessionId", deserialize_with = "deserialize_optional_lenient")]
    session_id: Option<String>,
}

impl LoginResponse {
    pub(crate) fn session_id(self) -> Option<String> {
        self.wm_connect_response
            .and_then(|r| r.participant)
            .and_then(|p| p.session_id)
            .filter(|id| !id.trim().is_empty())
    }
}

// ============================================================================
// Check-in
// ============================================================================

/// Fields of `NGOCheckInDocumentBDO` shared by both transports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckinBdo {
    pub cabinet_name: String,
    #[serde(rename = "userDBId")]
    pub user_db_id: String,
    pub document_index: String,
    pub check_in_out_flag: &'static str,
    pub major_version: &'static str,
    pub volume_id: String,
    pub site_id: String,
    pub sup_annot_version: &'static str,
    pub created_by_app_name: String,
}

/// JSON-transport body: the BDO with the file inline.
#[derive(Debug, Serialize)]
pub(crate) struct InlineCheckinEnvelope {
    #[serde(rename = "NGOCheckInDocumentBDO")]
    pub bdo: InlineCheckinBdo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineCheckinBdo {
    #[serde(flatten)]
    pub fields: CheckinBdo,
    pub file_name: String,
    pub content_type: String,
    /// Base64 of the file bytes.
    pub document_content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CheckinResponse {
    #[serde(rename = "NGOCheckInDocumentResponseBDO")]
    bdo: Option<CheckinResponseBdo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct CheckinResponseBdo {
    status: StatusCode,
    #[serde(deserialize_with = "deserialize_optional_lenient")]
    document_version_no: Option<String>,
}

impl CheckinResponse {
    pub(crate) fn into_parts(self) -> (StatusCode, Option<String>) {
        match self.bdo {
            Some(bdo) => (bdo.status, bdo.document_version_no.filter(|v| !v.is_empty())),
            None => (StatusCode::default(), None),
        }
    }
}
