use super::ApiKey;
use crate::dispatcher::MailDispatcher;
use crate::domain::{DispatchResult, Field, Submission, SubmissionDraft};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: String,
    #[serde(default)]
    pub variables: Option<Value>,
    pub operation_name: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct GraphQlResponse {
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQlError>,
}

impl GraphQlResponse {
    fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    fn error(data: Option<Value>, message: impl Into<String>) -> Self {
        Self {
            data,
            errors: vec![GraphQlError {
                message: message.into(),
            }],
        }
    }
}

/// Answers unreadable request bodies with a GraphQL error envelope.
pub fn graphql_json_error(err: JsonPayloadError, _request: &HttpRequest) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(GraphQlResponse::error(
        None,
        format!("Malformed GraphQL request: {}", err),
    ));
    InternalError::from_response(err, response).into()
}

fn is_send_message(query: &str) -> bool {
    let query = query.trim_start();
    query.starts_with("mutation") && query.contains("sendMessage")
}

fn string_variable(variables: Option<&Value>, field: Field) -> Result<String, String> {
    variables
        .and_then(|v| v.get(field.as_str()))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| {
            format!(
                "Variable '${}' of required type 'String!' was not provided.",
                field
            )
        })
}

fn send_message_arguments(variables: Option<&Value>) -> Result<Submission, String> {
    let draft = SubmissionDraft {
        name: string_variable(variables, Field::Name)?,
        email: string_variable(variables, Field::Email)?,
        message: string_variable(variables, Field::Message)?,
    };
    Submission::try_from(draft).map_err(|e| e.to_string())
}

#[tracing::instrument(
    name = "Handling a GraphQL request",
    skip(request, body, dispatcher, api_key),
    fields(operation_name = ?body.operation_name)
)]
pub async fn graphql(
    request: HttpRequest,
    body: web::Json<GraphQlRequest>,
    dispatcher: web::Data<MailDispatcher>,
    api_key: web::Data<ApiKey>,
) -> HttpResponse {
    if !api_key.is_presented_by(&request) {
        tracing::warn!("Rejected a GraphQL request without a valid API key");
        return HttpResponse::Unauthorized().json(GraphQlResponse::error(None, "Unauthorized"));
    }

    if !is_send_message(&body.query) {
        return HttpResponse::Ok().json(GraphQlResponse::error(None, "Unsupported operation"));
    }

    let submission = match send_message_arguments(body.variables.as_ref()) {
        Ok(submission) => submission,
        Err(message) => {
            tracing::info!(reason = %message, "Rejected an invalid sendMessage request");
            return HttpResponse::Ok().json(GraphQlResponse::error(None, message));
        }
    };

    match dispatcher.dispatch(&submission).await {
        DispatchResult::Sent { message_id } => {
            HttpResponse::Ok().json(GraphQlResponse::data(json!({ "sendMessage": message_id })))
        }
        DispatchResult::Failed { reason } => HttpResponse::Ok().json(GraphQlResponse::error(
            Some(json!({ "sendMessage": null })),
            format!("Failed to send email: {}", reason),
        )),
    }
}
