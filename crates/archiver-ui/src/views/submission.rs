//! Submission form view

use super::describe;

pub const VALIDATION_MESSAGE: &str = "Please enter a valid URL.";
const SUBMIT_CONTEXT: &str = "Failed to add URL";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub url_input: String,
    pub status: SubmitStatus,
}

impl SubmissionState {
    /// Start a submission.
    ///
    /// Returns the trimmed URL to send, or `None` when nothing should be sent:
    /// blank input (status becomes the validation failure) or a submission
    /// already in flight.
    pub fn begin(&mut self, input: &str) -> Option<String> {
        if self.is_busy() {
            return None;
        }
        self.url_input = input.to_string();

        let trimmed = input.trim();
        if trimmed.is_empty() {
            self.status = SubmitStatus::Failed(VALIDATION_MESSAGE.to_string());
            return None;
        }
        self.status = SubmitStatus::Submitting;
        Some(trimmed.to_string())
    }

    pub fn resolve(&mut self, result: archiver_core::Result<()>) {
        match result {
            Ok(()) => {
                self.status = SubmitStatus::Succeeded;
                self.url_input.clear();
            }
            Err(err) => self.status = SubmitStatus::Failed(describe(SUBMIT_CONTEXT, &err)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status == SubmitStatus::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            SubmitStatus::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
