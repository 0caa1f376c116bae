use thiserror::Error;

use crate::ports::camera::CameraError;
use crate::ports::navigation::Destination;
use crate::ports::store::StoreError;

pub const MSG_LOAD_FAILED: &str = "Failed to load questionnaire";
pub const MSG_PROFILE_NOT_INITIALIZED: &str = "Please select your domains first";
pub const MSG_DOMAIN_NOT_SELECTED: &str = "You have not selected this domain";
pub const MSG_ALREADY_ATTEMPTED: &str = "You have already completed this questionnaire";
pub const MSG_NO_QUESTIONS: &str = "No questions found for this domain";
pub const MSG_CAMERA_UNAVAILABLE: &str = "Camera access is required for the quiz";
pub const MSG_INCOMPLETE: &str = "Please answer all questions before submitting";
pub const MSG_SUBMIT_FAILED: &str = "Failed to submit questionnaire";
pub const MSG_SUBMITTED: &str = "Questionnaire submitted successfully!";
pub const MSG_SUBMIT_PENDING: &str = "Submission already in progress";
pub const MSG_NOT_ACTIVE: &str = "Questionnaire is not active";

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("user or domain missing from attempt context")]
    MissingContext,
    #[error("user profile not initialized")]
    ProfileNotInitialized,
    #[error("domain not selected: {0}")]
    DomainNotSelected(String),
    #[error("questionnaire already attempted: {0}")]
    AlreadyAttempted(String),
    #[error("no questions available for domain: {0}")]
    NoQuestionsAvailable(String),
    #[error("eligibility check failed: {0}")]
    EligibilityCheckFailed(#[source] StoreError),
    #[error("unanswered questions: {missing:?}")]
    ValidationFailed { missing: Vec<usize> },
    #[error("commit failed: {0}")]
    CommitFailed(#[source] StoreError),
    #[error("camera unavailable: {0}")]
    CameraUnavailable(#[source] CameraError),
    #[error("submission already in progress")]
    SubmissionInProgress,
    #[error("questionnaire is not active")]
    NotActive,
}

impl FlowError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingContext | Self::EligibilityCheckFailed(_) => MSG_LOAD_FAILED,
            Self::ProfileNotInitialized => MSG_PROFILE_NOT_INITIALIZED,
            Self::DomainNotSelected(_) => MSG_DOMAIN_NOT_SELECTED,
            Self::AlreadyAttempted(_) => MSG_ALREADY_ATTEMPTED,
            Self::NoQuestionsAvailable(_) => MSG_NO_QUESTIONS,
            Self::ValidationFailed { .. } => MSG_INCOMPLETE,
            Self::CommitFailed(_) => MSG_SUBMIT_FAILED,
            Self::CameraUnavailable(_) => MSG_CAMERA_UNAVAILABLE,
            Self::SubmissionInProgress => MSG_SUBMIT_PENDING,
            Self::NotActive => MSG_NOT_ACTIVE,
        }
    }

    /// Where a gate-phase failure sends the user. `None` means stay in place.
    pub fn destination(&self) -> Option<Destination> {
        match self {
            Self::ProfileNotInitialized => Some(Destination::DomainSelection),
            Self::MissingContext
            | Self::DomainNotSelected(_)
            | Self::AlreadyAttempted(_)
            | Self::NoQuestionsAvailable(_)
            | Self::EligibilityCheckFailed(_) => Some(Destination::Dashboard),
            Self::ValidationFailed { .. }
            | Self::CommitFailed(_)
            | Self::CameraUnavailable(_)
            | Self::SubmissionInProgress
            | Self::NotActive => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.destination().is_some()
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            Self::MissingContext => "missing_context",
            Self::ProfileNotInitialized => "profile_not_initialized",
            Self::DomainNotSelected(_) => "domain_not_selected",
            Self::AlreadyAttempted(_) => "already_attempted",
            Self::NoQuestionsAvailable(_) => "no_questions_available",
            Self::EligibilityCheckFailed(_) => "eligibility_check_failed",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::CommitFailed(_) => "commit_failed",
            Self::CameraUnavailable(_) => "camera_unavailable",
            Self::SubmissionInProgress => "submission_in_progress",
            Self::NotActive => "not_active",
        }
    }
}
