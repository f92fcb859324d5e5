use serde::Deserialize;

use crate::error::SubmitError;
use crate::time_series::{series_from_flux, SamplePoint};

/// Labels containing this literal are rendered as a negative verdict
pub const NEGATIVE_MARKER: &str = "No";

/// Wire shape of a successful prediction; decoded strictly before any use
#[derive(Debug, Deserialize)]
struct PredictionPayload {
    prediction: String,
    confidence: f64,
    flux_data: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    Positive,
    Negative,
}

impl Verdict {
    /// Case-sensitive substring test on the label exactly as the backend sent it
    pub fn of_label(label: &str) -> Self {
        if label.contains(NEGATIVE_MARKER) {
            Verdict::Negative
        } else {
            Verdict::Positive
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub confidence_fraction: f64,
    pub series: Vec<SamplePoint>,
}

impl ClassificationResult {
    /// Decode a response body. Missing fields, wrong types and confidences outside [0,1]
    /// are all rejected.
    pub fn from_json(body: &[u8]) -> Result<Self, SubmitError> {
        let payload: PredictionPayload = serde_json::from_slice(body)?;
        Self::from_payload(payload)
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::of_label(&self.label)
    }

    /// Confidence as a percentage with exactly two decimals, e.g. "87.00"
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}", self.confidence_fraction * 100.0)
    }

    fn from_payload(payload: PredictionPayload) -> Result<Self, SubmitError> {
        if !(0.0..=1.0).contains(&payload.confidence) {
            return Err(SubmitError::Malformed(format!(
                "confidence {} outside [0, 1]",
                payload.confidence
            )));
        }

        Ok(Self {
            series: series_from_flux(&payload.flux_data),
            label: payload.prediction,
            confidence_fraction: payload.confidence,
        })
    }
}
