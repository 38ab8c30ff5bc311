/// What the client learns about one submission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    Success,
    Failure(String),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success)
    }
}

/// What the server learns from the email provider for one send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchResult {
    Sent { message_id: String },
    Failed { reason: String },
}
