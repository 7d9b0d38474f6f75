//! In-memory stand-in for the ECM service.
//!
//! One `FakeEcm` implements every port. Annotations are stored per version;
//! add-annotation targets the latest version, as the real service does.
#![allow(dead_code)]

use async_trait::async_trait;
use docver_application::WorkflowPorts;
use docver_core::annotation::AnnotationGroup;
use docver_core::config::WorkflowConfig;
use docver_core::document::{DocumentContent, DocumentRef};
use docver_core::error::{DocverError, Result};
use docver_core::gateway::{
    AddAnnotationReply, AnnotationListReply, AnnotationQuery, CheckinReply, CheckinRequest,
    CheckinTransport, CheckoutFlag, CheckoutReply, ContentProvider, DocumentGateway,
    SessionProvider,
};
use docver_core::session::{Credentials, SessionHandle};
use docver_core::status::{self, StatusCode};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SESSION: &str = "fake-session-0001";
pub const NOT_CHECKED_OUT: &str = "-50035";
pub const INVALID_ANNOTATION: &str = "-50001";

#[derive(Default)]
struct State {
    /// Version number -> groups, in insertion order.
    versions: BTreeMap<u32, Vec<AnnotationGroup>>,
    checked_out: bool,
    /// Statuses returned by the next lock attempts before normal behavior.
    scripted_conflicts: VecDeque<&'static str>,
    /// Storage coordinates reported by checkout; `None` omits the field.
    volume_id: Option<String>,
    site_id: Option<String>,
    rejected_groups: HashSet<String>,
    listing_status: Option<&'static str>,
    checkin_status: Option<&'static str>,
    drop_replays: bool,
    login_delay: Option<Duration>,
    fail_add_transport: bool,

    checkout_calls: Vec<CheckoutFlag>,
    add_calls: Vec<String>,
    checkin_requests: Vec<CheckinRequest>,
    listed_versions: Vec<String>,
}

pub struct FakeEcm {
    state: Mutex<State>,
}

impl FakeEcm {
    /// A document at version 1.0 carrying `groups`.
    pub fn with_groups(groups: Vec<AnnotationGroup>) -> Arc<Self> {
        let mut versions = BTreeMap::new();
        versions.insert(1, groups);
        Arc::new(Self {
            state: Mutex::new(State {
                versions,
                volume_id: Some("7".into()),
                site_id: Some("2".into()),
                ..State::default()
            }),
        })
    }

    pub fn script_conflicts(&self, statuses: &[&'static str]) {
        self.state.lock().unwrap().scripted_conflicts = statuses.iter().copied().collect();
    }

    pub fn set_checked_out(&self, checked_out: bool) {
        self.state.lock().unwrap().checked_out = checked_out;
    }

    pub fn omit_storage_ids(&self) {
        let mut state = self.state.lock().unwrap();
        state.volume_id = None;
        state.site_id = Some(String::new());
    }

    pub fn reject_group(&self, name: &str) {
        self.state.lock().unwrap().rejected_groups.insert(name.to_string());
    }

    pub fn fail_listing_with(&self, status: &'static str) {
        self.state.lock().unwrap().listing_status = Some(status);
    }

    pub fn fail_checkin_with(&self, status: &'static str) {
        self.state.lock().unwrap().checkin_status = Some(status);
    }

    /// Accept add-annotation calls without storing the groups.
    pub fn drop_replays(&self) {
        self.state.lock().unwrap().drop_replays = true;
    }

    pub fn delay_login(&self, delay: Duration) {
        self.state.lock().unwrap().login_delay = Some(delay);
    }

    pub fn fail_add_transport(&self) {
        self.state.lock().unwrap().fail_add_transport = true;
    }

    pub fn is_checked_out(&self) -> bool {
        self.state.lock().unwrap().checked_out
    }

    pub fn checkout_calls(&self) -> Vec<CheckoutFlag> {
        self.state.lock().unwrap().checkout_calls.clone()
    }

    pub fn add_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().add_calls.clone()
    }

    pub fn checkin_requests(&self) -> Vec<CheckinRequest> {
        self.state.lock().unwrap().checkin_requests.clone()
    }

    pub fn listed_versions(&self) -> Vec<String> {
        self.state.lock().unwrap().listed_versions.clone()
    }

    pub fn groups_of(&self, version: &str) -> Vec<AnnotationGroup> {
        let state = self.state.lock().unwrap();
        parse_version(version)
            .and_then(|v| state.versions.get(&v).cloned())
            .unwrap_or_default()
    }

    pub fn latest_version(&self) -> String {
        let state = self.state.lock().unwrap();
        render_version(latest(&state))
    }

    /// Adds a version without annotations, as a plain check-in would.
    pub fn push_empty_version(&self) -> String {
        let mut state = self.state.lock().unwrap();
        let next = latest(&state) + 1;
        state.versions.insert(next, Vec::new());
        render_version(next)
    }

    pub fn ports(self: &Arc<Self>) -> WorkflowPorts {
        WorkflowPorts {
            sessions: self.clone(),
            documents: self.clone(),
            checkin: self.clone(),
            content: self.clone(),
        }
    }
}

fn latest(state: &State) -> u32 {
    state.versions.keys().next_back().copied().unwrap_or(1)
}

fn render_version(version: u32) -> String {
    format!("{}.0", version)
}

fn parse_version(version: &str) -> Option<u32> {
    version.split('.').next()?.parse().ok()
}

#[async_trait]
impl SessionProvider for FakeEcm {
    async fn login(&self, _credentials: &Credentials) -> Result<SessionHandle> {
        let delay = self.state.lock().unwrap().login_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(SessionHandle::new(SESSION))
    }
}

#[async_trait]
impl DocumentGateway for FakeEcm {
    async fn checkout(
        &self,
        session: &SessionHandle,
        _document: &DocumentRef,
        flag: CheckoutFlag,
    ) -> Result<CheckoutReply> {
        assert_eq!(session.as_str(), SESSION);
        let mut state = self.state.lock().unwrap();
        state.checkout_calls.push(flag);

        match flag {
            CheckoutFlag::Unlock => {
                let status = if state.checked_out {
                    state.checked_out = false;
                    status::SUCCESS
                } else {
                    NOT_CHECKED_OUT
                };
                Ok(CheckoutReply {
                    status: StatusCode::new(status),
                    raw: format!("{{\"Status\":\"{}\"}}", status),
                    ..CheckoutReply::default()
                })
            }
            CheckoutFlag::Lock => {
                if let Some(conflict) = state.scripted_conflicts.pop_front() {
                    return Ok(CheckoutReply {
                        status: StatusCode::new(conflict),
                        ..CheckoutReply::default()
                    });
                }
                if state.checked_out {
                    return Ok(CheckoutReply {
                        status: StatusCode::new(status::ALREADY_CHECKED_OUT),
                        ..CheckoutReply::default()
                    });
                }
                state.checked_out = true;
                Ok(CheckoutReply {
                    status: StatusCode::success(),
                    version_number: Some(render_version(latest(&state))),
                    volume_id: state.volume_id.clone(),
                    site_id: state.site_id.clone(),
                    parent_folder_index: Some("88".into()),
                    raw: String::new(),
                })
            }
        }
    }

    async fn annotation_groups(
        &self,
        _session: &SessionHandle,
        _document: &DocumentRef,
        query: &AnnotationQuery,
    ) -> Result<AnnotationListReply> {
        let mut state = self.state.lock().unwrap();
        state.listed_versions.push(query.version_number.clone());

        if let Some(status) = state.listing_status {
            return Ok(AnnotationListReply {
                status: StatusCode::new(status),
                error: Some("Invalid version".into()),
                raw: format!("{{\"Status\":\"{}\"}}", status),
                ..AnnotationListReply::default()
            });
        }

        let groups = parse_version(&query.version_number)
            .and_then(|v| state.versions.get(&v))
            .map(|groups| {
                groups
                    .iter()
                    .filter(|g| g.page_number == query.page_number)
                    .take(query.page_size as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(AnnotationListReply {
            status: StatusCode::success(),
            groups,
            ..AnnotationListReply::default()
        })
    }

    async fn add_annotation(
        &self,
        _session: &SessionHandle,
        _document: &DocumentRef,
        group: &AnnotationGroup,
    ) -> Result<AddAnnotationReply> {
        let mut state = self.state.lock().unwrap();
        state.add_calls.push(group.name.clone());

        if state.fail_add_transport {
            return Err(DocverError::transport("add annotation", "connection reset"));
        }
        if state.rejected_groups.contains(&group.name) {
            return Ok(AddAnnotationReply {
                status: StatusCode::new(INVALID_ANNOTATION),
                error: Some("Invalid annotation buffer".into()),
                raw: String::new(),
            });
        }

        let version = latest(&state);
        let drop_replays = state.drop_replays;
        let groups = state.versions.entry(version).or_default();
        if groups.iter().any(|g| g.name == group.name) {
            return Ok(AddAnnotationReply {
                status: StatusCode::new(status::DUPLICATE_ANNOTATION_GROUP),
                error: Some("Annotation group already exists".into()),
                raw: String::new(),
            });
        }
        if !drop_replays {
            groups.push(group.clone());
        }
        Ok(AddAnnotationReply {
            status: StatusCode::success(),
            ..AddAnnotationReply::default()
        })
    }
}

#[async_trait]
impl CheckinTransport for FakeEcm {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn check_in(
        &self,
        _session: &SessionHandle,
        _document: &DocumentRef,
        request: &CheckinRequest,
        content: &DocumentContent,
    ) -> Result<CheckinReply> {
        assert!(!content.bytes.is_empty());
        let mut state = self.state.lock().unwrap();
        state.checkin_requests.push(request.clone());

        if let Some(status) = state.checkin_status {
            return Ok(CheckinReply {
                status: StatusCode::new(status),
                version_number: None,
                raw: format!("{{\"status\":\"{}\"}}", status),
            });
        }
        if !state.checked_out {
            return Ok(CheckinReply {
                status: StatusCode::new(NOT_CHECKED_OUT),
                ..CheckinReply::default()
            });
        }

        let next = latest(&state) + 1;
        state.versions.insert(next, Vec::new());
        state.checked_out = false;
        Ok(CheckinReply {
            status: StatusCode::success(),
            version_number: Some(render_version(next)),
            raw: String::new(),
        })
    }
}

#[async_trait]
impl ContentProvider for FakeEcm {
    async fn load(&self) -> Result<DocumentContent> {
        Ok(DocumentContent {
            file_name: "contract.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: b"%PDF-1.4 fake".to_vec(),
        })
    }
}

pub fn document() -> DocumentRef {
    DocumentRef::new("fosasoft", "1623")
}

pub fn config() -> WorkflowConfig {
    let mut config = WorkflowConfig::default();
    config.target = document();
    config.credentials = Credentials::new("supervisor", "secret");
    config
}

pub fn sample_groups() -> Vec<AnnotationGroup> {
    vec![
        AnnotationGroup::new(
            "Stamp_1",
            "TotalAnnotations=1\r\n[Stamp1AnnotationHeader]\r\nX1=10\r\n[Stamp1]\r\nImage=approved.png  \r\n",
        ),
        AnnotationGroup::new("Note_1", "TotalAnnotations=1\n[Note1]\nText=Check clause 4")
            .with_type("2")
            .with_access("S"),
        AnnotationGroup::new("Highlight_1", "TotalAnnotations=1\n[Highlight1]\nColor=255")
            .with_type("1"),
    ]
}
