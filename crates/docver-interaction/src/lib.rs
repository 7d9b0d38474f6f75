//! HTTP adapters for the ECM service ports defined in `docver-core`.

pub mod checkin;
pub mod execute_api;
pub mod http;
pub mod login;
mod wire;

use docver_core::config::{CheckinTransportKind, WorkflowConfig};
use docver_core::error::Result;
use docver_core::gateway::{CheckinTransport, DocumentGateway, SessionProvider};
use std::sync::Arc;

pub use checkin::{JsonCheckinClient, MultipartCheckinClient};
pub use execute_api::ExecuteApiClient;
pub use login::ConnectLoginClient;

/// The remote-facing ports of one run, sharing a single HTTP client.
#[derive(Clone)]
pub struct EcmClients {
    pub sessions: Arc<dyn SessionProvider>,
    pub documents: Arc<dyn DocumentGateway>,
    pub checkin: Arc<dyn CheckinTransport>,
}

impl EcmClients {
    /// Builds every adapter from the endpoint, timeout and check-in settings.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self> {
        let client = http::build_client(config.timeouts.request_timeout())?;
        let endpoint = &config.endpoint;

        let checkin: Arc<dyn CheckinTransport> = match config.checkin.transport {
            CheckinTransportKind::Multipart => Arc::new(MultipartCheckinClient::new(
                client.clone(),
                &endpoint.checkin_api_url,
            )),
            CheckinTransportKind::Json => Arc::new(JsonCheckinClient::new(
                client.clone(),
                &endpoint.checkin_api_url,
            )),
        };

        Ok(Self {
            sessions: Arc::new(ConnectLoginClient::new(client.clone(), &endpoint.login_url)),
            documents: Arc::new(
                ExecuteApiClient::new(client, &endpoint.execute_api_url)
                    .with_locale(&endpoint.locale),
            ),
            checkin,
        })
    }
}
