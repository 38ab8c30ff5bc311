use crate::domain::{Submission, SubmissionDraft, SubmissionError, SubmissionResult};
use crate::gateway::SubmissionGateway;
use std::sync::{Mutex, MutexGuard};

pub const SUCCESS_BANNER: &str =
    "Thanks for reaching out! We usually reply within one business day.";
pub const ERROR_BANNER: &str = "We couldn't send your message. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormStatus {
    /// No runtime configuration was found; the form cannot submit.
    Unconfigured,
    Idle,
    Loading,
    Success,
    Error(String),
}

impl FormStatus {
    fn is_terminal(&self) -> bool {
        matches!(self, FormStatus::Success | FormStatus::Error(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormState {
    pub draft: SubmissionDraft,
    pub status: FormStatus,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A submission is already in flight, or the form is unconfigured.
    Ignored,
    /// A required field was empty; nothing was sent.
    Invalid(SubmissionError),
    Completed(SubmissionResult),
}

/// Owns the contact form state and talks to the gateway on submit.
pub struct ContactFormController<G> {
    gateway: Option<G>,
    state: Mutex<FormState>,
}

impl<G: SubmissionGateway> ContactFormController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway: Some(gateway),
            state: Mutex::new(FormState {
                draft: SubmissionDraft::default(),
                status: FormStatus::Idle,
            }),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            gateway: None,
            state: Mutex::new(FormState {
                draft: SubmissionDraft::default(),
                status: FormStatus::Unconfigured,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        // The guard is never held across an await, so a poisoned lock
        // still holds a consistent state.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> FormState {
        self.lock().clone()
    }

    pub fn status(&self) -> FormStatus {
        self.lock().status.clone()
    }

    fn edit(&self, apply: impl FnOnce(&mut SubmissionDraft)) {
        let mut state = self.lock();
        apply(&mut state.draft);
        if state.status.is_terminal() {
            state.status = FormStatus::Idle;
        }
    }

    pub fn set_name(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|draft| draft.name = value);
    }

    pub fn set_email(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|draft| draft.email = value);
    }

    pub fn set_message(&self, value: impl Into<String>) {
        let value = value.into();
        self.edit(|draft| draft.message = value);
    }

    /// Returns a finished attempt to idle without touching the draft.
    pub fn dismiss(&self) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            state.status = FormStatus::Idle;
        }
    }

    /// The banner to show for the current status, if any.
    pub fn banner(&self) -> Option<String> {
        match self.status() {
            FormStatus::Success => Some(SUCCESS_BANNER.to_string()),
            FormStatus::Error(reason) => Some(format!("{} ({})", ERROR_BANNER, reason)),
            _ => None,
        }
    }

    #[tracing::instrument(name = "Contact form submit", skip(self))]
    pub async fn submit(&self) -> SubmitOutcome {
        let gateway = match &self.gateway {
            Some(gateway) => gateway,
            None => return SubmitOutcome::Ignored,
        };

        let submission = {
            let mut state = self.lock();
            if state.status == FormStatus::Loading {
                tracing::debug!("Ignoring submit while a submission is in flight");
                return SubmitOutcome::Ignored;
            }
            let submission = match Submission::parse(&state.draft) {
                Ok(submission) => submission,
                Err(e) => return SubmitOutcome::Invalid(e),
            };
            state.status = FormStatus::Loading;
            submission
        };

        let result = gateway.send(&submission).await;

        let mut state = self.lock();
        match &result {
            SubmissionResult::Success => {
                state.draft = SubmissionDraft::default();
                state.status = FormStatus::Success;
            }
            SubmissionResult::Failure(reason) => {
                state.status = FormStatus::Error(reason.clone());
            }
        }
        SubmitOutcome::Completed(result)
    }
}
