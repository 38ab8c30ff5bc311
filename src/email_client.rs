use crate::telemetry::spawn_blocking_with_tracing;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{
    transport::smtp::authentication::Credentials, Address, Message, SmtpTransport, Transport,
};
use reqwest::Url;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// A single plain-text email, ready to hand to a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: Address,
    pub to: Vec<Address>,
    pub subject: String,
    pub text_body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum EmailClientError {
    /// The provider answered but refused the message.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Builder(#[from] lettre::error::Error),
    #[error("{0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
    #[error("SMTP worker did not complete: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Sends one email and returns the provider's message identifier.
#[async_trait::async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, EmailClientError>;
}

/// Client for a transactional email provider's JSON API.
#[derive(Debug)]
pub struct EmailClient {
    http_client: reqwest::Client,
    base_url: Url,
    authorization_token: Secret<String>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from_email_address: &'a str,
    destination: Destination<'a>,
    content: Content<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct Destination<'a> {
    to_addresses: Vec<&'a str>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct Content<'a> {
    simple: SimpleContent<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimpleContent<'a> {
    subject: Data<'a>,
    body: Body<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct Body<'a> {
    text: Data<'a>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct Data<'a> {
    data: &'a str,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    message_id: String,
}

#[derive(serde::Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl EmailClient {
    pub fn new(mut base_url: Url, authorization_token: Secret<String>, timeout: Duration) -> Self {
        // `Url::join` replaces the last segment unless the path ends with `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the provider HTTP client");
        Self {
            http_client,
            base_url,
            authorization_token,
        }
    }
}

#[async_trait::async_trait]
impl MailTransport for EmailClient {
    #[tracing::instrument(name = "Sending an email through the provider API", skip_all)]
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, EmailClientError> {
        let url = self
            .base_url
            .join("v2/email/outbound-emails")
            .map_err(|e| EmailClientError::Rejected(format!("Invalid provider URL: {}", e)))?;
        let request_body = SendEmailRequest {
            from_email_address: email.from.as_ref(),
            destination: Destination {
                to_addresses: email.to.iter().map(AsRef::as_ref).collect(),
            },
            content: Content {
                simple: SimpleContent {
                    subject: Data {
                        data: &email.subject,
                    },
                    body: Body {
                        text: Data {
                            data: &email.text_body,
                        },
                    },
                },
            },
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.authorization_token.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ProviderErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Provider responded with {}", status));
            return Err(EmailClientError::Rejected(message));
        }

        let response: SendEmailResponse = response.json().await?;
        Ok(response.message_id)
    }
}

/// Sends through an SMTP relay with STARTTLS.
pub struct SmtpEmailClient {
    mailer: SmtpTransport,
}

impl SmtpEmailClient {
    pub fn new(
        host_url: &str,
        username: String,
        password: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, EmailClientError> {
        let creds = Credentials::new(username, password.expose_secret().to_owned());

        let mailer = SmtpTransport::starttls_relay(host_url)?
            .credentials(creds)
            .timeout(Some(timeout))
            .build();

        Ok(Self { mailer })
    }
}

fn build_message(email: &OutboundEmail) -> Result<Message, EmailClientError> {
    let mut builder = Message::builder()
        .from(Mailbox::new(None, email.from.clone()))
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for recipient in &email.to {
        builder = builder.to(Mailbox::new(None, recipient.clone()));
    }
    Ok(builder.body(email.text_body.clone())?)
}

#[async_trait::async_trait]
impl MailTransport for SmtpEmailClient {
    #[tracing::instrument(name = "Sending an email through the SMTP relay", skip_all)]
    async fn send_email(&self, email: &OutboundEmail) -> Result<String, EmailClientError> {
        let message = build_message(email)?;
        let mailer = self.mailer.clone();

        let response = spawn_blocking_with_tracing(move || mailer.send(&message)).await??;

        let message_id = message_id_from_reply(response.message())
            .unwrap_or_else(|| response.code().to_string());
        Ok(message_id)
    }
}

/// Relays answer `250 Ok <id>`; the id is the last word of the first line.
fn message_id_from_reply<'a>(mut lines: impl Iterator<Item = &'a str>) -> Option<String> {
    lines
        .next()
        .and_then(|line| line.split_whitespace().last())
        .map(str::to_owned)
}
