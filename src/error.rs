use reqwest::StatusCode;
use thiserror::Error;

/// Shown for every transport, status and payload failure. The cause only goes to the log.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to connect to the server. Please ensure the backend is running.";

/// Shown when a submission is attempted before any file was chosen.
pub const NO_FILE_MESSAGE: &str = "Please select a CSV file first.";

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no file selected")]
    NoFileSelected,
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

impl SubmitError {
    /// Text the user sees; only the local precondition gets its own wording
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::NoFileSelected => NO_FILE_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(err: serde_json::Error) -> Self {
        SubmitError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_has_its_own_message() {
        assert_eq!(SubmitError::NoFileSelected.user_message(), NO_FILE_MESSAGE);
        assert!(!NO_FILE_MESSAGE.is_empty());
    }

    #[test]
    fn remote_failures_collapse_to_generic_message() {
        let errors = [
            SubmitError::Status(StatusCode::INTERNAL_SERVER_ERROR),
            SubmitError::Malformed("missing field `flux_data`".into()),
            SubmitError::InvalidEndpoint {
                endpoint: "nope".into(),
                reason: "relative URL without a base".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn cause_survives_in_display() {
        let err = SubmitError::Status(StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("502"));
    }
}
