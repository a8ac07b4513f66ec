use area_api::ApiError;
use thiserror::Error;

/// Errors raised while driving the applet wizard.
#[derive(Debug, Error)]
pub enum WizardError {
    /// The event is not legal in the current state; state is left untouched.
    #[error("cannot {event} while {state}")]
    InvalidTransition { state: &'static str, event: &'static str },

    #[error(transparent)]
    Backend(#[from] ApiError),

    /// Create or update was rejected; the draft is kept for a retry.
    #[error("applet submission failed: {0}")]
    Submission(String),

    #[error("{0}")]
    Plan(String),
}

impl WizardError {
    pub(crate) fn invalid(state: &'static str, event: &'static str) -> Self {
        Self::InvalidTransition { state, event }
    }
}
