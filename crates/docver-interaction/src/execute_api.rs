//! Client for the structured `executeAPIJSON` endpoint.
//!
//! Checkout/undo, annotation listing and annotation add all go through the
//! same URL; the operation is named by the `<Option>_Input` key of the
//! envelope.

use crate::http::{map_send_error, read_json};
use crate::wire::{
    AddAnnotationInput, AddAnnotationOutput, AnnotationGroupListInput, AnnotationGroupListOutput,
    CheckinCheckoutInput, CheckinCheckoutOutput, ExecuteEnvelope, ExecuteOption, execute_output,
};
use async_trait::async_trait;
use docver_core::annotation::AnnotationGroup;
use docver_core::document::DocumentRef;
use docver_core::error::Result;
use docver_core::gateway::{
    AddAnnotationReply, AnnotationListReply, AnnotationQuery, CheckoutFlag, CheckoutReply,
    DocumentGateway,
};
use docver_core::session::SessionHandle;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Timestamp format of the `CurrentDateTime` checkout field.
const CLIENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// [`DocumentGateway`] backed by the execute-API endpoint.
#[derive(Clone)]
pub struct ExecuteApiClient {
    client: Client,
    url: String,
    locale: String,
}

impl ExecuteApiClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            locale: "en_US".to_string(),
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Posts one envelope and returns the decoded `<Option>_Output` plus raw body.
    async fn execute<I, O>(&self, operation: &'static str, input: I) -> Result<(O, String)>
    where
        I: ExecuteOption,
        O: DeserializeOwned + Default,
    {
        let envelope = ExecuteEnvelope::new(input, &self.locale);

        tracing::debug!("[ExecuteApi] POST {} ({})", I::OPTION, operation);
        let response = self
            .client
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| map_send_error(operation, e))?;

        let (body, raw) = read_json(operation, response).await?;
        let output = execute_output(operation, I::OPTION, &body, &raw)?;
        Ok((output, raw))
    }
}

#[async_trait]
impl DocumentGateway for ExecuteApiClient {
    async fn checkout(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        flag: CheckoutFlag,
    ) -> Result<CheckoutReply> {
        let (operation, input) = match flag {
            CheckoutFlag::Lock => {
                let now = chrono::Local::now().format(CLIENT_TIME_FORMAT).to_string();
                (
                    "checkout",
                    CheckinCheckoutInput::lock(
                        &document.cabinet,
                        session.as_str(),
                        &document.document_index,
                        now,
                    ),
                )
            }
            CheckoutFlag::Unlock => (
                "undo checkout",
                CheckinCheckoutInput::unlock(
                    &document.cabinet,
                    session.as_str(),
                    &document.document_index,
                ),
            ),
        };

        let (output, raw): (CheckinCheckoutOutput, String) = self.execute(operation, input).await?;
        let (status, _error, checked_out) = output.into_document();

        let mut reply = CheckoutReply {
            status,
            raw,
            ..CheckoutReply::default()
        };
        if let Some(doc) = checked_out {
            reply.version_number = doc.document_version_no;
            reply.volume_id = doc.volume_id;
            reply.site_id = doc.site_id;
            reply.parent_folder_index = doc.parent_folder_index;
        }
        Ok(reply)
    }

    async fn annotation_groups(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        query: &AnnotationQuery,
    ) -> Result<AnnotationListReply> {
        let input = AnnotationGroupListInput::new(
            &document.cabinet,
            session.as_str(),
            &document.document_index,
            &query.version_number,
            &query.page_number,
            query.page_size,
        );

        let (output, raw): (AnnotationGroupListOutput, String) =
            self.execute("annotation listing", input).await?;
        let (status, error, groups) = output.into_parts();

        Ok(AnnotationListReply {
            status,
            error,
            groups,
            raw,
        })
    }

    async fn add_annotation(
        &self,
        session: &SessionHandle,
        document: &DocumentRef,
        group: &AnnotationGroup,
    ) -> Result<AddAnnotationReply> {
        let input = AddAnnotationInput::new(
            &document.cabinet,
            session.as_str(),
            &document.document_index,
            group,
        );

        let (output, raw): (AddAnnotationOutput, String) =
            self.execute("add annotation", input).await?;
        let (status, error) = output.into_parts();

        Ok(AddAnnotationReply { status, error, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use docver_core::error::DocverError;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned HTTP response and hands back the request it received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/executeAPIJSON", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
            request
        });

        (url, handle)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn gateway(url: &str, timeout: Duration) -> ExecuteApiClient {
        ExecuteApiClient::new(build_client(timeout).unwrap(), url)
    }

    fn document() -> DocumentRef {
        DocumentRef::new("fosasoft", "1623")
    }

    fn query() -> AnnotationQuery {
        AnnotationQuery {
            version_number: "1.0".into(),
            page_number: "0".into(),
            page_size: 100,
        }
    }

    #[tokio::test]
    async fn test_http_error_status_is_rejected() {
        let (url, server) = serve_once(
            "500 Internal Server Error",
            "<html>server fault</html>",
            Duration::ZERO,
        )
        .await;

        let err = gateway(&url, Duration::from_secs(5))
            .checkout(&SessionHandle::new("s-1"), &document(), CheckoutFlag::Lock)
            .await
            .unwrap_err();

        match err {
            DocverError::Rejected {
                operation,
                status,
                detail,
            } => {
                assert_eq!(operation, "checkout");
                assert_eq!(status, "HTTP 500");
                assert!(detail.contains("server fault"));
            }
            other => panic!("expected Rejected, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let (url, server) = serve_once("200 OK", "{}", Duration::from_secs(2)).await;

        let err = gateway(&url, Duration::from_millis(100))
            .checkout(&SessionHandle::new("s-1"), &document(), CheckoutFlag::Lock)
            .await
            .unwrap_err();

        assert!(
            matches!(err, DocverError::Timeout { operation: "checkout" }),
            "expected Timeout, got {:?}",
            err
        );
        server.abort();
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (url, server) = serve_once("200 OK", "Session expired, please log in", Duration::ZERO).await;

        let err = gateway(&url, Duration::from_secs(5))
            .annotation_groups(&SessionHandle::new("s-1"), &document(), &query())
            .await
            .unwrap_err();

        match err {
            DocverError::Decode {
                operation, body, ..
            } => {
                assert_eq!(operation, "annotation listing");
                assert!(body.contains("Session expired"));
            }
            other => panic!("expected Decode, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_listing_posts_envelope_and_normalizes_single_group() {
        let body = r#"{"NGOExecuteAPIResponseBDO":{"outputData":{"NGOGetAnnotationGroupList_Output":{
            "Status":"0",
            "AnnotationGroups":{"AnnotationGroup":{
                "AnnotGroupName":"stamp","PageNo":1,"AccessType":"S",
                "AnnotationBuffer":"TotalAnnotations=1"}}}}}}"#;
        let (url, server) = serve_once("200 OK", body, Duration::ZERO).await;

        let reply = gateway(&url, Duration::from_secs(5))
            .annotation_groups(&SessionHandle::new("s-1"), &document(), &query())
            .await
            .unwrap();

        assert!(reply.status.is_success());
        assert_eq!(reply.groups.len(), 1);
        assert_eq!(reply.groups[0].name, "stamp");
        assert_eq!(reply.raw, body);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /executeAPIJSON"));
        assert!(request.contains("NGOGetAnnotationGroupList_Input"));
        assert!(request.contains("1623"));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/executeAPIJSON", listener.local_addr().unwrap());
        drop(listener);

        let err = gateway(&url, Duration::from_secs(5))
            .checkout(&SessionHandle::new("s-1"), &document(), CheckoutFlag::Unlock)
            .await
            .unwrap_err();

        assert!(
            matches!(err, DocverError::Transport { operation: "undo checkout", .. }),
            "expected Transport, got {:?}",
            err
        );
    }
}
