use crate::domain::{ContactName, Submission};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use tera::{Context, Tera};

const SUBJECT: &str = "contact_subject.txt";
const BODY: &str = "contact_body.txt";

static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (SUBJECT, "New Contact Form Submission - {{ name }}"),
        (
            BODY,
            "Name: {{ name }}\nEmail: {{ email }}\nMessage: {{ message }}\n\nSubmitted at: {{ submitted_at }}",
        ),
    ])
    .expect("Failed to parse the built-in email templates");
    // Plain text only.
    tera.autoescape_on(vec![]);
    tera
});

fn submission_context(submission: &Submission, submitted_at: DateTime<Utc>) -> Context {
    let mut context = Context::new();
    context.insert("name", submission.name.as_ref());
    context.insert("email", submission.email.as_ref());
    context.insert("message", submission.message.as_ref());
    context.insert(
        "submitted_at",
        &submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    context
}

pub fn render_subject(name: &ContactName) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("name", name.as_ref());
    TEMPLATES.render(SUBJECT, &context)
}

pub fn render_body(
    submission: &Submission,
    submitted_at: DateTime<Utc>,
) -> Result<String, tera::Error> {
    TEMPLATES.render(BODY, &submission_context(submission, submitted_at))
}
