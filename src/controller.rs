use crate::classification::ClassificationResult;
use crate::error::SubmitError;
use crate::selection::{InputFile, SelectionStore};

/// Tag carried by each request so late responses can be told apart from current ones
pub type Generation = u64;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Succeeded {
        classification: ClassificationResult,
    },
    Failed {
        message: String,
    },
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }
}

/// Inputs to the submission state machine
#[derive(Debug)]
pub enum Event {
    FileSelected(InputFile),
    SubmitRequested,
    Completed {
        generation: Generation,
        outcome: Result<ClassificationResult, SubmitError>,
    },
}

/// Side effect the caller owes after an [`Event`] was handled
#[derive(Debug, PartialEq)]
pub enum Effect {
    /// State changed; nothing to send
    Updated,
    /// Issue this request
    Dispatch(Dispatch),
    /// Stale response, state untouched
    Discarded,
}

/// Request the caller must issue after a successful `submit`
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub generation: Generation,
    pub file: InputFile,
}

/// Owns the selection and the submission state. Transitions never perform I/O; the
/// network call is described by the returned [`Dispatch`].
#[derive(Debug, Default)]
pub struct Controller {
    selection: SelectionStore,
    state: SubmissionState,
    generation: Generation,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn current_file(&self) -> Option<&InputFile> {
        self.selection.current_file()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Single entry point of the state machine
    pub fn handle(&mut self, event: Event) -> Effect {
        match event {
            Event::FileSelected(file) => {
                self.select_file(file);
                Effect::Updated
            }
            Event::SubmitRequested => match self.submit() {
                Some(dispatch) => Effect::Dispatch(dispatch),
                None => Effect::Updated,
            },
            Event::Completed {
                generation,
                outcome,
            } => {
                if self.complete(generation, outcome) {
                    Effect::Updated
                } else {
                    Effect::Discarded
                }
            }
        }
    }

    /// Replace the selection and reset to a clean `Idle`. Any request still in flight
    /// becomes stale.
    pub fn select_file(&mut self, file: InputFile) {
        tracing::info!(name = %file.name, bytes = file.len(), "file selected");
        self.selection.select_file(file);
        self.generation += 1;
        self.state = SubmissionState::Idle;
    }

    /// Move to `Loading` and describe the request to send. Concurrent calls are not
    /// rejected here; the trigger control is disabled while loading instead.
    pub fn submit(&mut self) -> Option<Dispatch> {
        let Some(file) = self.selection.current_file().cloned() else {
            tracing::info!("submit without a selected file");
            self.state = SubmissionState::Failed {
                message: SubmitError::NoFileSelected.user_message().to_string(),
            };
            return None;
        };

        self.generation += 1;
        self.state = SubmissionState::Loading;
        tracing::info!(
            name = %file.name,
            bytes = file.len(),
            generation = self.generation,
            "submitting sample"
        );

        Some(Dispatch {
            generation: self.generation,
            file,
        })
    }

    /// Apply a finished request. Returns false when the response was stale and dropped.
    pub fn complete(
        &mut self,
        generation: Generation,
        outcome: Result<ClassificationResult, SubmitError>,
    ) -> bool {
        if generation != self.generation || !self.state.is_loading() {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale classification response"
            );
            return false;
        }

        self.state = match outcome {
            Ok(classification) => {
                tracing::info!(
                    label = %classification.label,
                    points = classification.series.len(),
                    "classification succeeded"
                );
                SubmissionState::Succeeded { classification }
            }
            Err(err) => {
                tracing::warn!(error = %err, "classification failed");
                SubmissionState::Failed {
                    message: err.user_message().to_string(),
                }
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GENERIC_FAILURE_MESSAGE, NO_FILE_MESSAGE};
    use crate::time_series::series_from_flux;
    use assert_matches::assert_matches;

    fn sample(name: &str) -> InputFile {
        InputFile::new(name, "text/csv", b"LABEL,FLUX.1\n1,0.5\n".to_vec())
    }

    fn planet() -> ClassificationResult {
        ClassificationResult {
            label: "Planet Detected".into(),
            confidence_fraction: 0.87,
            series: series_from_flux(&[1.0, 0.98, 1.02]),
        }
    }

    #[test]
    fn starts_idle_without_file() {
        let controller = Controller::new();
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert!(controller.current_file().is_none());
    }

    #[test]
    fn submit_without_file_fails_locally() {
        let mut controller = Controller::new();
        let dispatch = controller.submit();

        assert!(dispatch.is_none());
        assert_eq!(
            controller.state(),
            &SubmissionState::Failed {
                message: NO_FILE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn submit_with_file_enters_loading_and_dispatches() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));

        let dispatch = controller.submit().expect("dispatch");
        assert!(controller.state().is_loading());
        assert_eq!(dispatch.file.name, "a.csv");
        assert_eq!(dispatch.generation, controller.generation());
    }

    #[test]
    fn successful_completion_stores_result() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));
        let dispatch = controller.submit().unwrap();

        assert!(controller.complete(dispatch.generation, Ok(planet())));
        assert_matches!(
            controller.state(),
            SubmissionState::Succeeded { classification } if classification.label == "Planet Detected"
        );
    }

    #[test]
    fn failed_completion_uses_generic_message() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));
        let dispatch = controller.submit().unwrap();

        controller.complete(
            dispatch.generation,
            Err(SubmitError::Malformed("missing field `flux_data`".into())),
        );
        assert_eq!(
            controller.state(),
            &SubmissionState::Failed {
                message: GENERIC_FAILURE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn selection_resets_result_and_error() {
        let mut controller = Controller::new();
        controller.submit();
        assert_matches!(controller.state(), SubmissionState::Failed { .. });

        controller.select_file(sample("a.csv"));
        assert_eq!(controller.state(), &SubmissionState::Idle);

        let dispatch = controller.submit().unwrap();
        controller.complete(dispatch.generation, Ok(planet()));
        assert_matches!(controller.state(), SubmissionState::Succeeded { .. });

        controller.select_file(sample("b.csv"));
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert_eq!(controller.current_file().unwrap().name, "b.csv");
    }

    #[test]
    fn stale_response_after_reselect_is_discarded() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));
        let dispatch = controller.submit().unwrap();

        controller.select_file(sample("b.csv"));
        assert!(!controller.complete(dispatch.generation, Ok(planet())));
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[test]
    fn superseded_submission_is_discarded() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));
        let first = controller.submit().unwrap();
        let second = controller.submit().unwrap();
        assert_ne!(first.generation, second.generation);

        assert!(!controller.complete(
            first.generation,
            Err(SubmitError::Malformed("late".into()))
        ));
        assert!(controller.state().is_loading());

        assert!(controller.complete(second.generation, Ok(planet())));
        assert_matches!(controller.state(), SubmissionState::Succeeded { .. });
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut controller = Controller::new();
        controller.select_file(sample("a.csv"));
        let dispatch = controller.submit().unwrap();

        assert!(controller.complete(dispatch.generation, Ok(planet())));
        assert!(!controller.complete(
            dispatch.generation,
            Err(SubmitError::Malformed("again".into()))
        ));
        assert_matches!(controller.state(), SubmissionState::Succeeded { .. });
    }

    #[test]
    fn handle_routes_events() {
        let mut controller = Controller::new();
        assert_eq!(
            controller.handle(Event::SubmitRequested),
            Effect::Updated
        );
        assert_matches!(controller.state(), SubmissionState::Failed { .. });

        assert_eq!(
            controller.handle(Event::FileSelected(sample("a.csv"))),
            Effect::Updated
        );
        assert_eq!(controller.state(), &SubmissionState::Idle);

        let Effect::Dispatch(dispatch) = controller.handle(Event::SubmitRequested) else {
            panic!("expected dispatch");
        };
        assert!(controller.state().is_loading());

        assert_eq!(
            controller.handle(Event::Completed {
                generation: dispatch.generation,
                outcome: Ok(planet()),
            }),
            Effect::Updated
        );
        assert_matches!(controller.state(), SubmissionState::Succeeded { .. });
    }

    #[test]
    fn handle_reports_discarded_completion() {
        let mut controller = Controller::new();
        controller.handle(Event::FileSelected(sample("a.csv")));
        let Effect::Dispatch(dispatch) = controller.handle(Event::SubmitRequested) else {
            panic!("expected dispatch");
        };
        controller.handle(Event::FileSelected(sample("b.csv")));

        assert_eq!(
            controller.handle(Event::Completed {
                generation: dispatch.generation,
                outcome: Ok(planet()),
            }),
            Effect::Discarded
        );
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }
}
