//! New-version check-in transports.
//!
//! The check-in endpoint is not part of the structured execute-API: it takes
//! a `NGOCheckInDocumentBDO` plus the file. Two ways of sending the file are
//! supported; both answer with the same `NGOCheckInDocumentResponseBDO`.

use crate::http::{map_send_error, read_json};
use crate::wire::{CheckinBdo, CheckinResponse, InlineCheckinBdo, InlineCheckinEnvelope, excerpt};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docver_core::document::{DocumentContent, DocumentRef};
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{CheckinReply, CheckinRequest, CheckinTransport};
use docver_core::session::SessionHandle;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

const OPERATION: &str = "check-in";

fn checkin_fields(session: &SessionHandle, document: &DocumentRef, request: &CheckinRequest) -> CheckinBdo {
    CheckinBdo {
        cabinet_name: document.cabinet.clone(),
        user_db_id: session.as_str().to_string(),
        document_index: document.document_index.clone(),
        check_in_out_flag: "N",
        major_version: if request.major_version { "Y" } else { "N" },
        volume_id: request.volume_id.clone(),
        site_id: request.site_id.clone(),
        sup_annot_version: "N",
        created_by_app_name: request.created_by_app.clone(),
    }
}

fn into_reply(body: Value, raw: String) -> Result<CheckinReply> {
    let parsed: CheckinResponse = serde_json::from_value(body)
        .map_err(|e| DocverError::decode(OPERATION, e.to_string(), excerpt(&raw)))?;
    let (status, version_number) = parsed.into_parts();
    Ok(CheckinReply {
        status,
        version_number,
        raw,
    })
}

/// Sends the BDO as a JSON form part and the file as a second part.
#[derive(Clone)]
pub struct MultipartCheckinClient {
    client: Client,
    url: String,
}

impl MultipartCheckinClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CheckinTransport for MultipartCheckinClient {
    fn name(&self) -> &'static str {
        "multipart"
    }

    async fn check_in(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        request: &CheckinRequest,
        content: &DocumentContent,
    ) -> Result<CheckinReply> {
        let fields = checkin_fields(session, document, request);
        let fields_json = serde_json::to_string(&fields)
            .map_err(|e| DocverError::decode(OPERATION, e.to_string(), String::new()))?;

        let bdo_part = Part::text(fields_json)
            .mime_str("application/json")
            .map_err(|e| DocverError::config(format!("invalid BDO content type: {}", e)))?;
        let file_part = Part::bytes(content.bytes.clone())
            .file_name(content.file_name.clone())
            .mime_str(&content.mime_type)
            .map_err(|e| {
                DocverError::config(format!("invalid content type {:?}: {}", content.mime_type, e))
            })?;
        let form = Form::new()
            .part("NGOCheckInDocumentBDO", bdo_part)
            .part("file", file_part);

        tracing::debug!(
            "[Checkin] multipart upload of {} ({} bytes)",
            content.file_name,
            content.bytes.len()
        );
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_send_error(OPERATION, e))?;

        let (body, raw) = read_json(OPERATION, response).await?;
        into_reply(body, raw)
    }
}

/// Sends a single JSON body with the file base64-encoded inline.
#[derive(Clone)]
pub struct JsonCheckinClient {
    client: Client,
    url: String,
}

impl JsonCheckinClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl CheckinTransport for JsonCheckinClient {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn check_in(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        request: &CheckinRequest,
        content: &DocumentContent,
    ) -> Result<CheckinReply> {
        let envelope = InlineCheckinEnvelope {
            bdo: InlineCheckinBdo {
                fields: checkin_fields(session, document, request),
                file_name: content.file_name.clone(),
                content_type: content.mime_type.clone(),
                document_content: STANDARD.encode(&content.bytes),
            },
        };

        tracing::debug!(
            "[Checkin] inline JSON upload of {} ({} bytes)",
            content.file_name,
            content.bytes.len()
        );
        let response = self
            .client
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| map_send_error(OPERATION, e))?;

        let (body, raw) = read_json(OPERATION, response).await?;
        into_reply(body, raw)
    }
}
