//! Run configuration.
//!
//! Everything a workflow run needs is carried in [`WorkflowConfig`] and handed
//! to the orchestrator by the caller. Missing sections fall back to defaults
//! so a config file only has to name the endpoints, credentials and target.

use crate::document::DocumentRef;
use crate::error::{DocverError, Result};
use crate::session::Credentials;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use strum::Display;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub endpoint: EndpointConfig,
    pub credentials: Credentials,
    pub target: DocumentRef,
    pub content: ContentConfig,
    pub annotations: AnnotationConfig,
    pub checkin: CheckinConfig,
    pub timeouts: TimeoutConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Structured-API endpoint (`.../executeAPIJSON`).
    pub execute_api_url: String,
    /// Check-in endpoint (`.../checkInDocumentJSON`).
    pub checkin_api_url: String,
    pub login_url: String,
    pub locale: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            execute_api_url: String::new(),
            checkin_api_url: String::new(),
            login_url: String::new(),
            locale: "en_US".to_string(),
        }
    }
}

/// Where the new version's file comes from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub path: PathBuf,
    /// Guessed from the extension of `path` when absent.
    pub mime_type: Option<String>,
    /// Defaults to the file name of `path`.
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub page_number: String,
    /// Upper bound of groups fetched per snapshot. One page is the full set.
    pub page_size: u32,
    pub filter_view_hyperlinks: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            page_number: "1".to_string(),
            page_size: 100,
            filter_view_hyperlinks: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckinTransportKind {
    /// JSON part plus file part in a multipart form.
    #[default]
    Multipart,
    /// Single JSON body with the file base64-encoded inline.
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckinConfig {
    pub transport: CheckinTransportKind,
    pub created_by_app: String,
    pub major_version: bool,
}

impl Default for CheckinConfig {
    fn default() -> Self {
        Self {
            transport: CheckinTransportKind::default(),
            created_by_app: "pdf".to_string(),
            major_version: false,
        }
    }
}

/// Timeouts in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    #[serde(alias = "requestTimeout")]
    pub request_timeout: u64,
    #[serde(alias = "runDeadline")]
    pub run_deadline: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30,
            run_deadline: 300,
        }
    }
}

impl TimeoutConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline)
    }
}

impl WorkflowConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Checks that every value the run depends on is present.
    ///
    /// All problems are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let required = [
            ("endpoint.execute_api_url", &self.endpoint.execute_api_url),
            ("endpoint.checkin_api_url", &self.endpoint.checkin_api_url),
            ("endpoint.login_url", &self.endpoint.login_url),
            ("credentials.user_name", &self.credentials.user_name),
            ("credentials.password", &self.credentials.password),
            ("target.cabinet", &self.target.cabinet),
            ("target.document_index", &self.target.document_index),
            ("annotations.page_number", &self.annotations.page_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                problems.push(format!("{} is required", name));
            }
        }

        if self.content.path.as_os_str().is_empty() {
            problems.push("content.path is required".to_string());
        }
        if self.annotations.page_size == 0 {
            problems.push("annotations.page_size must be positive".to_string());
        }
        if self.timeouts.request_timeout == 0 {
            problems.push("timeouts.request_timeout must be positive".to_string());
        }
        if self.timeouts.run_deadline == 0 {
            problems.push("timeouts.run_deadline must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(DocverError::config(problems.join("; ")))
        }
    }
}
