//! Tailer - owns the follow thread for one attached log file
//!
//! The worker thread is the only writer of session state. Consumers see
//! immutable snapshots delivered in order over an unbounded channel, so
//! the worker never waits on a slow consumer.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::follower::{FollowRead, LogFollower, Rotation};
use super::wait::{PollWait, WaitStrategy, DEFAULT_POLL_INTERVAL};
use crate::catalog::CardCatalog;
use crate::config::TrackerConfig;
use crate::offering::OfferingSnapshot;
use crate::session::{DraftSession, SessionUpdate};

pub const DEFAULT_MAX_READ_FAILURES: u32 = 30;

/// Messages delivered to the consumer, in production order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type")]
pub enum TailerEvent {
    /// New session started at the end of `path`
    Attached {
        path: PathBuf,
        at: DateTime<Utc>,
    },
    OfferingsChanged {
        snapshot: OfferingSnapshot,
    },
    TagHistoryChanged {
        history: Vec<String>,
    },
    /// The file was rotated; session state has been reset
    Rotated {
        reason: String,
    },
    /// Terminal: the worker has exited
    Failed {
        error: String,
    },
    /// Terminal: stop was requested
    Stopped,
}

impl From<SessionUpdate> for TailerEvent {
    fn from(update: SessionUpdate) -> Self {
        match update {
            SessionUpdate::TagHistoryChanged(history) => TailerEvent::TagHistoryChanged { history },
            SessionUpdate::OfferingsChanged(snapshot) => TailerEvent::OfferingsChanged { snapshot },
        }
    }
}

pub type TailerEvents = UnboundedReceiver<TailerEvent>;

#[derive(Debug, Clone, Copy)]
pub struct TailerOptions {
    pub poll_interval: Duration,
    /// Consecutive I/O failures tolerated before the session fails
    pub max_read_failures: u32,
}

impl Default for TailerOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_read_failures: DEFAULT_MAX_READ_FAILURES,
        }
    }
}

impl From<&TrackerConfig> for TailerOptions {
    fn from(config: &TrackerConfig) -> Self {
        Self {
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_read_failures: config.max_read_failures.max(1),
        }
    }
}

enum TailerState {
    Idle,
    Following {
        path: PathBuf,
        stop: Arc<AtomicBool>,
        worker: JoinHandle<()>,
    },
}

pub struct Tailer {
    catalog: Arc<CardCatalog>,
    options: TailerOptions,
    state: TailerState,
}

impl Tailer {
    pub fn new(catalog: Arc<CardCatalog>) -> Self {
        Self::with_options(catalog, TailerOptions::default())
    }

    pub fn with_options(catalog: Arc<CardCatalog>, options: TailerOptions) -> Self {
        Self {
            catalog,
            options,
            state: TailerState::Idle,
        }
    }

    /// Start a new session on `path`, stopping any current one first.
    /// The file is opened here so a bad path is reported to the caller.
    pub fn attach(&mut self, path: impl AsRef<Path>) -> Result<TailerEvents> {
        let wait = PollWait::new(self.options.poll_interval);
        self.attach_with(path, wait)
    }

    /// Like `attach`, with a custom suspension strategy
    pub fn attach_with<W>(&mut self, path: impl AsRef<Path>, wait: W) -> Result<TailerEvents>
    where
        W: WaitStrategy + 'static,
    {
        self.stop();

        let path = path.as_ref().to_path_buf();
        let follower = LogFollower::open_at_end(&path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));

        let worker = FollowWorker {
            follower,
            session: DraftSession::new(Arc::clone(&self.catalog)),
            wait: Box::new(wait),
            tx,
            stop: Arc::clone(&stop),
            max_read_failures: self.options.max_read_failures.max(1),
        };

        let handle = thread::Builder::new()
            .name("log-tailer".to_string())
            .spawn(move || worker.run())
            .context("failed to spawn tailer thread")?;

        info!(path = %path.display(), "Following log file");
        self.state = TailerState::Following {
            path,
            stop,
            worker: handle,
        };
        Ok(rx)
    }

    /// Signal the worker without waiting for it to exit
    pub fn request_stop(&self) {
        if let TailerState::Following { stop, .. } = &self.state {
            stop.store(true, Ordering::Relaxed);
        }
    }

    /// Signal the worker and wait for it to exit
    pub fn stop(&mut self) {
        let state = std::mem::replace(&mut self.state, TailerState::Idle);
        if let TailerState::Following { path, stop, worker } = state {
            stop.store(true, Ordering::Relaxed);
            if worker.join().is_err() {
                error!(path = %path.display(), "Tailer thread panicked");
            }
        }
    }

    pub fn is_following(&self) -> bool {
        match &self.state {
            TailerState::Idle => false,
            TailerState::Following { worker, .. } => !worker.is_finished(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            TailerState::Idle => None,
            TailerState::Following { path, .. } => Some(path),
        }
    }
}

impl Drop for Tailer {
    fn drop(&mut self) {
        self.request_stop();
    }
}

enum Step {
    Progress,
    Idle,
    Disconnected,
}

struct FollowWorker {
    follower: LogFollower,
    session: DraftSession,
    wait: Box<dyn WaitStrategy>,
    tx: UnboundedSender<TailerEvent>,
    stop: Arc<AtomicBool>,
    max_read_failures: u32,
}

impl FollowWorker {
    fn run(mut self) {
        let attached = TailerEvent::Attached {
            path: self.follower.path().to_path_buf(),
            at: Utc::now(),
        };
        if !self.emit(attached) {
            return;
        }

        let mut failures = 0u32;

        while !self.stop.load(Ordering::Relaxed) {
            match self.poll() {
                Ok(Step::Progress) => failures = 0,
                Ok(Step::Idle) => {
                    failures = 0;
                    self.wait.wait();
                }
                Ok(Step::Disconnected) => {
                    debug!("Consumer dropped, tailer exiting");
                    return;
                }
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, failures, "Log read failed");
                    if failures >= self.max_read_failures {
                        error!(error = %e, "Giving up on log file");
                        self.emit(TailerEvent::Failed {
                            error: format!("{:#}", e),
                        });
                        return;
                    }
                    self.wait.wait();
                    if let Err(e) = self.follower.resume() {
                        debug!(error = %e, "Resume failed, will retry");
                    }
                }
            }
        }

        info!(
            path = %self.follower.path().display(),
            position = self.follower.position(),
            lines = self.session.lines_processed(),
            "Tailer stopped"
        );
        self.emit(TailerEvent::Stopped);
    }

    /// One cycle: rotation check first, so a rewritten file is never read
    /// at the old offset, then every complete line available.
    fn poll(&mut self) -> Result<Step> {
        if let Some(rotation) = self.follower.check_rotation()? {
            return self.rotate(rotation);
        }

        let mut step = Step::Idle;
        while !self.stop.load(Ordering::Relaxed) {
            let FollowRead::Line(line) = self.follower.next_line()? else {
                break;
            };
            for update in self.session.process_line(&line) {
                if !self.emit(update.into()) {
                    return Ok(Step::Disconnected);
                }
            }
            step = Step::Progress;
        }
        Ok(step)
    }

    fn rotate(&mut self, rotation: Rotation) -> Result<Step> {
        info!(path = %self.follower.path().display(), %rotation, "Log file rotated, starting new session");
        self.follower.reopen_at_start()?;
        self.session.reset();

        let events = [
            TailerEvent::Rotated {
                reason: rotation.to_string(),
            },
            TailerEvent::TagHistoryChanged {
                history: self.session.tag_history(),
            },
            TailerEvent::OfferingsChanged {
                snapshot: self.session.offerings(),
            },
        ];
        for event in events {
            if !self.emit(event) {
                return Ok(Step::Disconnected);
            }
        }
        Ok(Step::Progress)
    }

    fn emit(&self, event: TailerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}
