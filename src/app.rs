use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::classification::ClassificationResult;
use crate::controller::{Controller, Dispatch, Effect, Event, Generation};
use crate::error::SubmitError;
use crate::selection::InputFile;
use crate::view::View;

/// Which control receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Focus {
    #[strum(serialize = "file")]
    FileInput,
    #[strum(serialize = "analyze")]
    Analyze,
}

/// What the event loop has to do after a key was handled
#[derive(Debug, PartialEq)]
pub enum Action {
    None,
    Dispatch(Dispatch),
    Quit,
}

/// Interactive shell around the controller: the path input stands in for a file picker
#[derive(Debug)]
pub struct App {
    pub controller: Controller,
    pub focus: Focus,
    pub path_input: String,
    /// Host-side problems reading a file; never part of the submission state
    pub notice: Option<String>,
    pub endpoint: String,
}

impl App {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            controller: Controller::new(),
            focus: Focus::FileInput,
            path_input: String::new(),
            notice: None,
            endpoint: endpoint.into(),
        }
    }

    pub fn view(&self) -> View<'_> {
        View::of(&self.controller)
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Char('c') if ctrl => return Action::Quit,
            KeyCode::Char('r') if ctrl => return self.trigger(),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::FileInput => Focus::Analyze,
                    Focus::Analyze => Focus::FileInput,
                };
            }
            KeyCode::Enter => match self.focus {
                Focus::FileInput => self.select_typed_path(),
                Focus::Analyze => return self.trigger(),
            },
            KeyCode::Char(' ') if self.focus == Focus::Analyze => return self.trigger(),
            KeyCode::Backspace if self.focus == Focus::FileInput => {
                self.path_input.pop();
            }
            KeyCode::Char(c) if self.focus == Focus::FileInput && !ctrl => {
                self.path_input.push(c);
            }
            _ => {}
        }

        Action::None
    }

    /// Press the Analyze control. Ignored while a request is in flight.
    pub fn trigger(&mut self) -> Action {
        if !self.view().trigger.enabled {
            tracing::debug!("analyze pressed while loading, ignoring");
            return Action::None;
        }

        match self.controller.handle(Event::SubmitRequested) {
            Effect::Dispatch(dispatch) => Action::Dispatch(dispatch),
            Effect::Updated | Effect::Discarded => Action::None,
        }
    }

    pub fn select_typed_path(&mut self) {
        let path = self.path_input.trim().to_string();
        if path.is_empty() {
            self.notice = Some("Type the path of a CSV file, then press Enter".to_string());
            return;
        }
        self.select_path(&path);
    }

    /// Read `path` and make it the selection; on failure the previous selection stays
    pub fn select_path(&mut self, path: &str) -> bool {
        match InputFile::from_path(path) {
            Ok(file) => {
                self.path_input = path.to_string();
                self.notice = None;
                self.controller.handle(Event::FileSelected(file));
                self.focus = Focus::Analyze;
                true
            }
            Err(err) => {
                tracing::warn!(path, error = %err, "could not read selected file");
                self.notice = Some(format!("Could not read {path}: {err}"));
                false
            }
        }
    }

    /// Feed a finished request back in. Returns false when it was stale.
    pub fn on_classified(
        &mut self,
        generation: Generation,
        outcome: Result<ClassificationResult, SubmitError>,
    ) -> bool {
        let effect = self.controller.handle(Event::Completed {
            generation,
            outcome,
        });
        effect != Effect::Discarded
    }
}
