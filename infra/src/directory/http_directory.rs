//! HTTP client for the remote user/credential service
//!
//! Every endpoint answers with a `{code, msg, data}` envelope. A missing
//! record is reported either as HTTP 404 or as a successful envelope whose
//! `data` is null; both map to `None`.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use vc_core::domain::entities::{AuthCredential, Channel, UserInfo};
use vc_core::errors::CollaboratorError;
use vc_core::services::verification::CredentialDirectory;
use vc_shared::config::DirectoryConfig;

use crate::InfrastructureError;

/// Envelope code for a successful call
const SUCCESS_CODE: i32 = 200;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "success_code")]
    code: i32,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

fn success_code() -> i32 {
    SUCCESS_CODE
}

/// [`CredentialDirectory`] over the user service's HTTP API
#[derive(Clone)]
pub struct HttpCredentialDirectory {
    client: Client,
    base_url: Url,
}

impl HttpCredentialDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, InfrastructureError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            InfrastructureError::Config(format!("Invalid credential directory URL: {}", e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(InfrastructureError::Config(format!(
                "Credential directory URL cannot be a base: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .user_agent(format!("vc-infra/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: Url,
        channel: Channel,
        destination: &str,
    ) -> Result<Option<T>, CollaboratorError> {
        debug!(
            channel = %channel,
            destination = %channel.mask(destination),
            path = url.path(),
            "Querying credential directory"
        );
        let response = self.client.get(url).send().await.map_err(transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: Envelope<T> = read_envelope(response).await?;
        Ok(envelope.data)
    }

    async fn credential(&self, channel: Channel, destination: &str) -> Result<Option<AuthCredential>, CollaboratorError> {
        let url = self.endpoint(&["credentials", channel.as_str(), destination]);
        self.fetch(url, channel, destination).await
    }

    async fn profile(
        &self,
        channel: Channel,
        destination: &str,
        app_code: &str,
    ) -> Result<Option<UserInfo>, CollaboratorError> {
        let mut url = self.endpoint(&["users", channel.as_str(), destination]);
        url.query_pairs_mut().append_pair("appCode", app_code);
        self.fetch(url, channel, destination).await
    }

    async fn create(&self, channel: Channel, destination: &str) -> Result<(), CollaboratorError> {
        let url = self.endpoint(&["credentials", channel.as_str()]);
        let body = match channel {
            Channel::Email => json!({ "email": destination }),
            Channel::Phone => json!({ "phone": destination }),
        };

        debug!(
            channel = %channel,
            destination = %channel.mask(destination),
            "Creating credential in directory"
        );
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        read_envelope::<serde_json::Value>(response).await.map(|_| ())
    }
}

/// Check the status and decode the envelope, mapping failures by retryability
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Envelope<T>, CollaboratorError> {
    let status = response.status();
    if status.is_server_error() {
        return Err(CollaboratorError::Unavailable(format!(
            "credential directory returned {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(CollaboratorError::Rejected(format!(
            "credential directory returned {}",
            status
        )));
    }

    let envelope: Envelope<T> = response.json().await.map_err(|e| {
        warn!(error = %e, "Malformed credential directory response");
        CollaboratorError::Rejected(format!("malformed response: {}", e))
    })?;

    if envelope.code != SUCCESS_CODE {
        return Err(CollaboratorError::Rejected(format!(
            "credential directory error {}: {}",
            envelope.code,
            envelope.msg.as_deref().unwrap_or("no message")
        )));
    }
    Ok(envelope)
}

fn transport_error(err: reqwest::Error) -> CollaboratorError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        return CollaboratorError::Unavailable(err.to_string());
    }
    InfrastructureError::Http(err).into()
}

#[async_trait]
impl CredentialDirectory for HttpCredentialDirectory {
    async fn credential_by_email(&self, email: &str) -> Result<Option<AuthCredential>, CollaboratorError> {
        self.credential(Channel::Email, email).await
    }

    async fn credential_by_phone(&self, phone: &str) -> Result<Option<AuthCredential>, CollaboratorError> {
        self.credential(Channel::Phone, phone).await
    }

    async fn profile_by_email(&self, email: &str, app_code: &str) -> Result<Option<UserInfo>, CollaboratorError> {
        self.profile(Channel::Email, email, app_code).await
    }

    async fn profile_by_phone(&self, phone: &str, app_code: &str) -> Result<Option<UserInfo>, CollaboratorError> {
        self.profile(Channel::Phone, phone, app_code).await
    }

    async fn create_credential_by_email(&self, email: &str) -> Result<(), CollaboratorError> {
        self.create(Channel::Email, email).await
    }

    async fn create_credential_by_phone(&self, phone: &str) -> Result<(), CollaboratorError> {
        self.create(Channel::Phone, phone).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn directory(url: &str) -> HttpCredentialDirectory {
        HttpCredentialDirectory::new(&DirectoryConfig::new(url)).unwrap()
    }

    #[tokio::test]
    async fn test_credential_by_phone_found() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/credentials/phone/+15551234567")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"code":200,"msg":"ok","data":{"credentialId":"cred-1","phone":"+15551234567"}}"#,
            )
            .create_async()
            .await;

        let credential = directory(&mock_server.url())
            .credential_by_phone("+15551234567")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(credential.credential_id, "cred-1");
        assert_eq!(credential.phone.as_deref(), Some("+15551234567"));
        assert_eq!(credential.email, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_null_data_and_not_found_mean_absent() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("GET", "/credentials/email/alice@example.com")
            .with_status(200)
            .with_body(r#"{"code":200,"msg":"ok","data":null}"#)
            .create_async()
            .await;
        mock_server
            .mock("GET", "/credentials/email/bob@example.com")
            .with_status(404)
            .create_async()
            .await;

        let directory = directory(&mock_server.url());

        assert_eq!(directory.credential_by_email("alice@example.com").await.unwrap(), None);
        assert_eq!(directory.credential_by_email("bob@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_profile_sends_app_code() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("GET", "/users/email/alice@example.com")
            .match_query(Matcher::UrlEncoded("appCode".into(), "APP1".into()))
            .with_status(200)
            .with_body(r#"{"code":200,"data":{"userId":"u-1","appCode":"APP1","nickname":"Alice"}}"#)
            .create_async()
            .await;

        let profile = directory(&mock_server.url())
            .profile_by_email("alice@example.com", "APP1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(profile.user_id, "u-1");
        assert_eq!(profile.nickname.as_deref(), Some("Alice"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_posts_destination() {
        let mut mock_server = mockito::Server::new_async().await;
        let mock = mock_server
            .mock("POST", "/credentials/phone")
            .match_body(Matcher::Json(json!({ "phone": "+15551234567" })))
            .with_status(200)
            .with_body(r#"{"code":200,"msg":"created","data":null}"#)
            .create_async()
            .await;

        directory(&mock_server.url())
            .create_credential_by_phone("+15551234567")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retryable() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("GET", "/credentials/phone/+15551234567")
            .with_status(503)
            .create_async()
            .await;

        let err = directory(&mock_server.url())
            .credential_by_phone("+15551234567")
            .await
            .unwrap_err();

        assert!(matches!(err, CollaboratorError::Unavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_client_errors_and_error_envelopes_are_rejected() {
        let mut mock_server = mockito::Server::new_async().await;
        mock_server
            .mock("GET", "/credentials/phone/+15551234567")
            .with_status(403)
            .create_async()
            .await;
        mock_server
            .mock("POST", "/credentials/email")
            .with_status(200)
            .with_body(r#"{"code":500,"msg":"duplicate credential","data":null}"#)
            .create_async()
            .await;

        let directory = directory(&mock_server.url());

        let lookup = directory.credential_by_phone("+15551234567").await.unwrap_err();
        assert!(matches!(lookup, CollaboratorError::Rejected(_)));

        let create = directory
            .create_credential_by_email("alice@example.com")
            .await
            .unwrap_err();
        assert!(matches!(create, CollaboratorError::Rejected(ref msg) if msg.contains("duplicate")));
    }

    #[tokio::test]
    async fn test_unreachable_directory_is_unavailable() {
        // Nothing listens on port 9
        let err = directory("http://127.0.0.1:9")
            .credential_by_email("alice@example.com")
            .await
            .unwrap_err();

        assert!(err.is_retryable());
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = HttpCredentialDirectory::new(&DirectoryConfig::new("not a url"));
        assert!(matches!(result, Err(InfrastructureError::Config(_))));
    }

    #[test]
    fn test_base_path_is_preserved() {
        let directory = directory("http://users.internal/api/v1/");
        let url = directory.endpoint(&["credentials", "email", "a@b.co"]);
        assert_eq!(url.as_str(), "http://users.internal/api/v1/credentials/email/a@b.co");
    }
}
