//! Submission of hex payloads to the painting backend.

use async_trait::async_trait;

/// Sends one hex payload for a day with a brush.
///
/// Implementations talk to whatever records paintings. The payload is the
/// bare `XXYYCC…` hex without a `0x` prefix.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit `hex` for `day` using `brush_id`.
    async fn paint(&self, day: u64, brush_id: u64, hex: &str) -> Result<(), SubmitError>;
}

/// Submission failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The user declined to sign or send.
    #[error("Request rejected by user")]
    Rejected,
    /// Anything else.
    #[error("Submission failed: {0}")]
    Failed(String),
}

impl SubmitError {
    /// Classify a backend error message. Messages mentioning a user
    /// rejection or denial become [`SubmitError::Rejected`].
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("user rejected") || lower.contains("user denied") {
            Self::Rejected
        } else {
            Self::Failed(message)
        }
    }
}

/// Result of [`crate::PaintSession::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every payload was sent.
    Submitted {
        /// Number of payloads sent, spacers included.
        payloads: usize,
    },
    /// There was nothing to send.
    Empty,
    /// The user cancelled part way. Earlier payloads may have been sent.
    Cancelled {
        /// Payloads sent before the cancellation.
        payloads: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_classifies_rejection() {
        assert_eq!(
            SubmitError::from_message("MetaMask: User rejected the request."),
            SubmitError::Rejected
        );
        assert_eq!(
            SubmitError::from_message("User denied transaction signature"),
            SubmitError::Rejected
        );
        assert_eq!(
            SubmitError::from_message("insufficient funds"),
            SubmitError::Failed("insufficient funds".to_string())
        );
    }
}
