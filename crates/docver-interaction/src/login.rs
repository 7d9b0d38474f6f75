//! Login against the cabinet-connect endpoint.

use crate::http::{map_send_error, read_json};
use crate::wire::{LoginRequest, LoginResponse, excerpt};
use async_trait::async_trait;
use docver_core::error::{DocverError, Result};
use docver_core::gateway::SessionProvider;
use docver_core::session::{Credentials, SessionHandle};
use reqwest::Client;

const OPERATION: &str = "login";

/// [`SessionProvider`] that posts user name and password as JSON.
#[derive(Clone)]
pub struct ConnectLoginClient {
    client: Client,
    url: String,
}

impl ConnectLoginClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SessionProvider for ConnectLoginClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionHandle> {
        tracing::info!("[Login] Connecting as {}", credentials.user_name);

        let request = LoginRequest {
            user_name: &credentials.user_name,
            password: &credentials.password,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(OPERATION, e))?;

        let (body, raw) = read_json(OPERATION, response).await?;
        let parsed: LoginResponse = serde_json::from_value(body)
            .map_err(|e| DocverError::decode(OPERATION, e.to_string(), excerpt(&raw)))?;

        match parsed.session_id() {
            Some(id) => {
                let session = SessionHandle::new(id);
                tracing::info!("[Login] Session established ({})", session.redacted());
                Ok(session)
            }
            None => Err(DocverError::rejected(
                OPERATION,
                "no session id",
                excerpt(&raw),
            )),
        }
    }
}
