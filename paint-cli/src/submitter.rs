//! Dry-run submitter.

use std::sync::Mutex;

use async_trait::async_trait;
use paint_core::{SubmitError, Submitter};

/// A submitted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPayload {
    /// Day the payload was painted on.
    pub day: u64,
    /// Brush used.
    pub brush_id: u64,
    /// Bare hex payload.
    pub hex: String,
}

/// Records payloads instead of sending them anywhere.
#[derive(Debug, Default)]
pub struct DryRunSubmitter {
    payloads: Mutex<Vec<RecordedPayload>>,
}

impl DryRunSubmitter {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    #[must_use]
    pub fn payloads(&self) -> Vec<RecordedPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Submitter for DryRunSubmitter {
    async fn paint(&self, day: u64, brush_id: u64, hex: &str) -> Result<(), SubmitError> {
        tracing::debug!(day, brush_id, pixels = hex.len() / 6, "Dry-run paint");
        self.payloads
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(RecordedPayload {
                day,
                brush_id,
                hex: hex.to_string(),
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_in_order() {
        let submitter = DryRunSubmitter::new();
        submitter.paint(3, 9, "010101").await.expect("paint");
        submitter.paint(3, 9, "000000").await.expect("paint");
        let hexes: Vec<_> = submitter.payloads().into_iter().map(|p| p.hex).collect();
        assert_eq!(hexes, vec!["010101", "000000"]);
    }
}
