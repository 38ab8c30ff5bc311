use crate::domain::{DispatchResult, Submission};
use crate::email_client::{MailTransport, OutboundEmail};
use crate::templates::{render_body, render_subject};
use chrono::{DateTime, Utc};
use lettre::Address;
use std::sync::Arc;
use uuid::Uuid;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Turns a submission into one notification email for the site owner.
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    sender: Address,
    recipient: Address,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, sender: Address, recipient: Address) -> Self {
        Self {
            transport,
            sender,
            recipient,
        }
    }

    pub fn compose(
        &self,
        submission: &Submission,
        submitted_at: DateTime<Utc>,
    ) -> Result<OutboundEmail, tera::Error> {
        Ok(OutboundEmail {
            from: self.sender.clone(),
            to: vec![self.recipient.clone()],
            subject: render_subject(&submission.name)?,
            text_body: render_body(submission, submitted_at)?,
        })
    }

    #[tracing::instrument(
        name = "Dispatching a contact form submission",
        skip(self, submission),
        fields(
            submission_id = %Uuid::new_v4(),
            contact_email = %submission.email,
        )
    )]
    pub async fn dispatch(&self, submission: &Submission) -> DispatchResult {
        let email = match self.compose(submission, Utc::now()) {
            Ok(email) => email,
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Failed to render the notification email");
                return DispatchResult::Failed {
                    reason: non_empty_reason(e.to_string()),
                };
            }
        };

        match self.transport.send_email(&email).await {
            Ok(message_id) => {
                tracing::info!(message_id = %message_id, "Email sent");
                DispatchResult::Sent { message_id }
            }
            Err(e) => {
                tracing::error!(error.cause_chain = ?e, "Error sending email: {}", e);
                DispatchResult::Failed {
                    reason: non_empty_reason(e.to_string()),
                }
            }
        }
    }
}

fn non_empty_reason(message: String) -> String {
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
