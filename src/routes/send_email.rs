use super::ApiKey;
use crate::dispatcher::MailDispatcher;
use crate::domain::{DispatchResult, Submission, SubmissionDraft, SubmissionError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

#[derive(thiserror::Error, Debug)]
pub enum SendEmailError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] SubmissionError),
    #[error("Failed to send email: {0}")]
    Dispatch(String),
}

impl ResponseError for SendEmailError {
    fn status_code(&self) -> StatusCode {
        match self {
            SendEmailError::Unauthorized => StatusCode::UNAUTHORIZED,
            SendEmailError::Validation(_) => StatusCode::BAD_REQUEST,
            SendEmailError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct SendEmailResponse {
    pub message_id: String,
}

#[tracing::instrument(
    name = "Sending a contact form submission",
    skip(request, form, dispatcher, api_key),
    fields(contact_name = %form.name)
)]
pub async fn send_email(
    request: HttpRequest,
    form: web::Json<SubmissionDraft>,
    dispatcher: web::Data<MailDispatcher>,
    api_key: web::Data<ApiKey>,
) -> Result<HttpResponse, SendEmailError> {
    if !api_key.is_presented_by(&request) {
        return Err(SendEmailError::Unauthorized);
    }

    let submission: Submission = form.into_inner().try_into()?;

    match dispatcher.dispatch(&submission).await {
        DispatchResult::Sent { message_id } => {
            Ok(HttpResponse::Ok().json(SendEmailResponse { message_id }))
        }
        DispatchResult::Failed { reason } => Err(SendEmailError::Dispatch(reason)),
    }
}
