use crate::classification::Verdict;
use crate::controller::{Controller, SubmissionState};
use crate::selection::InputFile;
use crate::time_series::SamplePoint;

pub const ANALYZE_LABEL: &str = "Analyze Light Curve";
pub const ANALYZING_LABEL: &str = "Analyzing...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusCard<'a> {
    pub label: &'a str,
    /// Two-decimal percentage, without the `%` sign
    pub confidence: String,
    pub verdict: Verdict,
}

/// Everything the screen shows, derived from state alone
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub file_name: Option<&'a str>,
    pub trigger: Trigger,
    pub error_banner: Option<&'a str>,
    pub status_card: Option<StatusCard<'a>>,
    pub chart: Option<&'a [SamplePoint]>,
}

impl<'a> View<'a> {
    pub fn project(state: &'a SubmissionState, file: Option<&'a InputFile>) -> Self {
        let loading = state.is_loading();
        let trigger = Trigger {
            enabled: !loading,
            label: if loading { ANALYZING_LABEL } else { ANALYZE_LABEL },
        };

        let (error_banner, status_card, chart) = match state {
            SubmissionState::Failed { message } => (Some(message.as_str()), None, None),
            SubmissionState::Succeeded { classification } => (
                None,
                Some(StatusCard {
                    label: &classification.label,
                    confidence: classification.confidence_percent(),
                    verdict: classification.verdict(),
                }),
                Some(classification.series.as_slice()),
            ),
            SubmissionState::Idle | SubmissionState::Loading => (None, None, None),
        };

        Self {
            file_name: file.map(|f| f.name.as_str()),
            trigger,
            error_banner,
            status_card,
            chart,
        }
    }

    pub fn of(controller: &'a Controller) -> Self {
        Self::project(controller.state(), controller.current_file())
    }
}
