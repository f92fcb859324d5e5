use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::classification::ClassificationResult;
use crate::client::ClassificationService;
use crate::controller::{Dispatch, Generation};
use crate::error::SubmitError;

/// Unified event type consumed by the app runner
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// A submission finished; `generation` is the tag it was dispatched with
    Classified {
        generation: Generation,
        outcome: Result<ClassificationResult, SubmitError>,
    },
}

/// Source of application events (keyboard, resize, finished requests)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        let input_tx = tx.clone();
        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(error = %err, "terminal event reader stopped");
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Handle for posting non-terminal events (finished requests) into the same queue
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

/// Runs classification requests off the UI thread and posts each outcome back as
/// [`AppEvent::Classified`]. Requests cannot be cancelled once dispatched.
pub struct Dispatcher<S: ClassificationService> {
    runtime: tokio::runtime::Runtime,
    service: Arc<S>,
    events: Sender<AppEvent>,
}

impl<S: ClassificationService> Dispatcher<S> {
    pub fn new(service: S, events: Sender<AppEvent>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("exofinder-io")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            service: Arc::new(service),
            events,
        })
    }

    pub fn dispatch(&self, dispatch: Dispatch) {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();

        self.runtime.spawn(async move {
            let Dispatch { generation, file } = dispatch;
            let outcome = service.classify(file).await;
            if events
                .send(AppEvent::Classified {
                    generation,
                    outcome,
                })
                .is_err()
            {
                tracing::debug!(generation, "event loop gone, dropping classification outcome");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::InputFile;
    use crate::time_series::series_from_flux;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::sync::mpsc;

    struct EchoService;

    #[async_trait]
    impl ClassificationService for EchoService {
        async fn classify(&self, file: InputFile) -> Result<ClassificationResult, SubmitError> {
            Ok(ClassificationResult {
                label: file.name,
                confidence_fraction: 0.5,
                series: series_from_flux(&[1.0, 2.0]),
            })
        }
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            AppEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            AppEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn dispatcher_posts_tagged_outcome() {
        let (tx, rx) = mpsc::channel();
        let dispatcher = Dispatcher::new(EchoService, tx).unwrap();

        dispatcher.dispatch(Dispatch {
            generation: 7,
            file: InputFile::new("kepler.csv", "text/csv", vec![]),
        });

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_matches!(
            event,
            AppEvent::Classified { generation: 7, outcome: Ok(result) } if result.label == "kepler.csv"
        );
    }
}
