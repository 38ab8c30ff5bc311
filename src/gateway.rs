//! Client side of the `sendMessage` remote operation.
//!
//! Every way the call can go wrong is folded into [`GatewayError`] right where
//! the response is read, so callers only ever see a [`SubmissionResult`].
use crate::client_config::ApiSettings;
use crate::domain::{Submission, SubmissionResult};
use crate::routes::API_KEY_HEADER;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FAILURE_REASON: &str = "Failed to send message";

pub const SEND_MESSAGE_MUTATION: &str = "mutation SendMessage($name: String!, $email: String!, $message: String!) {
  sendMessage(name: $name, email: $email, message: $message)
}";

#[async_trait::async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn send(&self, submission: &Submission) -> SubmissionResult;
}

#[async_trait::async_trait]
impl<T: SubmissionGateway + ?Sized> SubmissionGateway for Arc<T> {
    async fn send(&self, submission: &Submission) -> SubmissionResult {
        (**self).send(submission).await
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The endpoint answered with a GraphQL error.
    #[error("{0}")]
    Remote(String),
    /// The request never completed or came back with a failing status.
    #[error("{0}")]
    Transport(String),
    /// The response could not be decoded.
    #[error("{0}")]
    Exception(String),
    #[error("the response carried no sendMessage payload")]
    MissingPayload,
}

impl GatewayError {
    /// The text shown to the visitor.
    pub fn reason(&self) -> String {
        let message = match self {
            GatewayError::Remote(m) | GatewayError::Transport(m) | GatewayError::Exception(m) => {
                m.as_str()
            }
            GatewayError::MissingPayload => "",
        };
        if message.trim().is_empty() {
            DEFAULT_FAILURE_REASON.to_string()
        } else {
            message.to_string()
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: SendMessageVariables<'a>,
}

#[derive(serde::Serialize)]
struct SendMessageVariables<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(serde::Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    errors: Vec<RemoteError>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RemoteError>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let errors: Option<Vec<RemoteError>> = serde::Deserialize::deserialize(deserializer)?;
    Ok(errors.unwrap_or_default())
}

#[derive(serde::Deserialize)]
struct RemoteError {
    #[serde(default)]
    message: Option<String>,
}

/// Maps a completed HTTP exchange to the message id or a classified error.
fn classify(status: StatusCode, body: &[u8]) -> Result<String, GatewayError> {
    let envelope = serde_json::from_slice::<GraphQlEnvelope>(body);

    if let Ok(envelope) = &envelope {
        let remote = envelope
            .errors
            .first()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.trim().is_empty());
        if let Some(message) = remote {
            return Err(GatewayError::Remote(message.to_string()));
        }
    }

    if !status.is_success() {
        return Err(GatewayError::Transport(format!(
            "Request failed with status {}",
            status
        )));
    }

    let envelope = envelope.map_err(|e| GatewayError::Exception(e.to_string()))?;
    envelope
        .data
        .as_ref()
        .and_then(|data| data.get("sendMessage"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(GatewayError::MissingPayload)
}

/// Calls `sendMessage` on a GraphQL endpoint authenticated by a static API key.
pub struct GraphQlGateway {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: Secret<String>,
}

impl GraphQlGateway {
    pub fn new(endpoint: Url, api_key: Secret<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the GraphQL HTTP client");
        Self {
            http_client,
            endpoint,
            api_key,
        }
    }

    pub fn from_settings(settings: &ApiSettings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.api_key.clone(),
            settings.timeout(),
        )
    }

    pub async fn send_message(&self, submission: &Submission) -> Result<String, GatewayError> {
        let request = GraphQlRequest {
            query: SEND_MESSAGE_MUTATION,
            operation_name: "SendMessage",
            variables: SendMessageVariables {
                name: submission.name.as_ref(),
                email: submission.email.as_ref(),
                message: submission.message.as_ref(),
            },
        };

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        classify(status, &body)
    }
}

#[async_trait::async_trait]
impl SubmissionGateway for GraphQlGateway {
    #[tracing::instrument(
        name = "Submitting the contact form",
        skip(self, submission),
        fields(endpoint = %self.endpoint)
    )]
    async fn send(&self, submission: &Submission) -> SubmissionResult {
        match self.send_message(submission).await {
            Ok(message_id) => {
                tracing::info!(message_id = %message_id, "Message accepted");
                SubmissionResult::Success
            }
            Err(e) => {
                tracing::warn!(error = ?e, "Message was not sent");
                SubmissionResult::Failure(e.reason())
            }
        }
    }
}
