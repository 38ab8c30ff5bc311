use crate::helpers::spawn_app;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

fn form(name: &str, email: &str, message: &str) -> serde_json::Value {
    serde_json::json!({ "name": name, "email": email, "message": message })
}

#[tokio::test]
async fn send_email_returns_200_with_the_message_id() {
    let app = spawn_app().await;
    app.provider_accepts("abc123", 1).await;

    let response = app.post_send_email(&form("Ada", "ada@example.com", "Hello")).await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message_id"], "abc123");
}

#[tokio::test]
async fn send_email_returns_400_when_data_is_missing() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let test_cases = vec![
        (serde_json::json!({ "email": "ada@example.com", "message": "Hello" }), "missing the name"),
        (form("Ada", "", "Hello"), "empty email"),
        (serde_json::json!({}), "missing every field"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = app.post_send_email(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
}

#[tokio::test]
async fn send_email_returns_500_when_the_provider_fails() {
    let app = spawn_app().await;
    app.provider_rejects("Throttled").await;

    let response = app.post_send_email(&form("Ada", "ada@example.com", "Hello")).await;

    assert_eq!(500, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to send email: Throttled");
}

#[tokio::test]
async fn send_email_requires_the_api_key() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(&format!("{}/send-email", &app.address))
        .json(&form("Ada", "ada@example.com", "Hello"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}
