use crate::helpers::{send_message_request, spawn_app};
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn send_message_returns_the_provider_message_id() {
    // Arrange
    let app = spawn_app().await;
    app.provider_accepts("abc123", 1).await;

    // Act
    let response = app
        .post_graphql(&send_message_request("Ada", "ada@example.com", "Hello"))
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["sendMessage"], "abc123");
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn send_message_emails_the_submission_to_the_site_owner() {
    let app = spawn_app().await;
    app.provider_accepts("abc123", 1).await;

    app.post_graphql(&send_message_request("Ada", "ada@example.com", "Hello"))
        .await;

    let emails = app.sent_emails().await;
    assert_eq!(emails.len(), 1);
    let email = &emails[0];
    assert_eq!(email["FromEmailAddress"], "hello@elevator-robot.com");
    assert_eq!(
        email["Destination"]["ToAddresses"],
        serde_json::json!(["hello@elevator-robot.com"])
    );
    assert_eq!(
        email["Content"]["Simple"]["Subject"]["Data"],
        "New Contact Form Submission - Ada"
    );
    let text = email["Content"]["Simple"]["Body"]["Text"]["Data"]
        .as_str()
        .unwrap();
    assert!(text.starts_with("Name: Ada\nEmail: ada@example.com\nMessage: Hello\n\nSubmitted at: "));
}

#[tokio::test]
async fn two_sequential_submissions_send_two_emails() {
    let app = spawn_app().await;
    app.provider_accepts("abc123", 2).await;

    for _ in 0..2 {
        let response = app
            .post_graphql(&send_message_request("Ada", "ada@example.com", "Hello"))
            .await;
        assert_eq!(200, response.status().as_u16());
    }
}

#[tokio::test]
async fn send_message_reports_a_provider_failure() {
    let app = spawn_app().await;
    app.provider_rejects("Throttled").await;

    let response = app
        .post_graphql(&send_message_request("Ada", "ada@example.com", "Hello"))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["data"]["sendMessage"].is_null());
    assert_eq!(body["errors"][0]["message"], "Failed to send email: Throttled");
}

#[tokio::test]
async fn send_message_rejects_empty_fields_without_sending() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (send_message_request("", "ada@example.com", "Hello"), "name must not be empty"),
        (send_message_request("Ada", "", "Hello"), "email must not be empty"),
        (send_message_request("Ada", "ada@example.com", "  "), "message must not be empty"),
    ];

    for (invalid_body, expected) in test_cases {
        let response = app.post_graphql(&invalid_body).await;

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body["errors"][0]["message"], expected,
            "The API did not reject the payload {}.",
            invalid_body
        );
    }
}

#[tokio::test]
async fn send_message_reports_missing_variables() {
    let app = spawn_app().await;

    let mut request = send_message_request("Ada", "ada@example.com", "Hello");
    request["variables"].as_object_mut().unwrap().remove("message");
    let response = app.post_graphql(&request).await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["errors"][0]["message"],
        "Variable '$message' of required type 'String!' was not provided."
    );
}

#[tokio::test]
async fn requests_without_the_api_key_are_rejected() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for key in [None, Some("wrong-key")] {
        let mut request = app
            .api_client
            .post(&format!("{}/graphql", &app.address))
            .json(&send_message_request("Ada", "ada@example.com", "Hello"));
        if let Some(key) = key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await.expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16());
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["errors"][0]["message"], "Unauthorized");
    }
}

#[tokio::test]
async fn other_operations_are_not_supported() {
    let app = spawn_app().await;

    let response = app
        .post_graphql(&serde_json::json!({ "query": "query { listMessages { id } }" }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Unsupported operation");
}

#[tokio::test]
async fn unreadable_bodies_get_a_graphql_error_envelope() {
    let app = spawn_app().await;

    let test_cases = vec![
        ("{not json".to_string(), "invalid JSON"),
        (serde_json::json!({ "variables": {} }).to_string(), "missing the query"),
    ];

    for (invalid_body, description) in test_cases {
        let response = app
            .api_client
            .post(&format!("{}/graphql", &app.address))
            .header("x-api-key", crate::helpers::API_KEY)
            .header("Content-Type", "application/json")
            .body(invalid_body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16(), "{}", description);
        let body: serde_json::Value = response.json().await.unwrap();
        let message = body["errors"][0]["message"].as_str().unwrap_or_default();
        assert!(
            message.starts_with("Malformed GraphQL request"),
            "The API did not answer with a GraphQL error when the payload was {}.",
            description
        );
    }
}
