mod outcome;
mod submission;

pub use outcome::{DispatchResult, SubmissionResult};
pub use submission::{
    ContactEmail, ContactMessage, ContactName, Field, Submission, SubmissionDraft,
    SubmissionError,
};
