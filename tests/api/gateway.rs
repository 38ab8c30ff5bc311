use contact_relay::domain::{Submission, SubmissionDraft, SubmissionResult};
use contact_relay::gateway::{GraphQlGateway, SubmissionGateway, DEFAULT_FAILURE_REASON};
use reqwest::Url;
use secrecy::Secret;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submission() -> Submission {
    Submission::parse(&SubmissionDraft {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        message: "Hello".into(),
    })
    .unwrap()
}

fn gateway(server: &MockServer) -> GraphQlGateway {
    GraphQlGateway::new(
        Url::parse(&format!("{}/graphql", server.uri())).unwrap(),
        Secret::new("da2-test-key".into()),
        Duration::from_millis(500),
    )
}

async fn remote_answers(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn send_forwards_the_submission_as_mutation_variables() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("x-api-key", "da2-test-key"))
        .and(body_partial_json(serde_json::json!({
            "operationName": "SendMessage",
            "variables": { "name": "Ada", "email": "ada@example.com", "message": "Hello" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "data": { "sendMessage": "abc123" } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = gateway(&server).send(&submission()).await;

    assert_eq!(result, SubmissionResult::Success);
}

#[tokio::test]
async fn a_remote_error_message_is_the_failure_reason() {
    let server = MockServer::start().await;
    remote_answers(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errors": [{ "message": "Service unavailable" }]
        })),
    )
    .await;

    let result = gateway(&server).send(&submission()).await;

    assert_eq!(result, SubmissionResult::Failure("Service unavailable".into()));
}

#[tokio::test]
async fn a_failing_status_without_errors_is_a_transport_failure() {
    let server = MockServer::start().await;
    remote_answers(&server, ResponseTemplate::new(503)).await;

    let result = gateway(&server).send(&submission()).await;

    match result {
        SubmissionResult::Failure(reason) => assert!(reason.contains("503"), "{}", reason),
        SubmissionResult::Success => panic!("a 503 must not be a success"),
    }
}

#[tokio::test]
async fn a_response_without_payload_is_a_failure() {
    let server = MockServer::start().await;
    remote_answers(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": null })),
    )
    .await;

    let result = gateway(&server).send(&submission()).await;

    assert_eq!(result, SubmissionResult::Failure(DEFAULT_FAILURE_REASON.into()));
}

#[tokio::test]
async fn a_slow_remote_times_out_into_a_failure() {
    let server = MockServer::start().await;
    remote_answers(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "data": { "sendMessage": "late" } }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let result = gateway(&server).send(&submission()).await;

    match result {
        SubmissionResult::Failure(reason) => assert!(!reason.is_empty()),
        SubmissionResult::Success => panic!("a timed out call must not be a success"),
    }
}
