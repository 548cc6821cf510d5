use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use crate::errors::{ControllerError, SpeechError};
use crate::services::pacing::Pacing;
use crate::services::speech::{EngineFactory, SpeechEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Running,
    Paused,
    Stopping,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::Running => "running",
            Status::Paused => "paused",
            Status::Stopping => "stopping",
        }
    }
}

#[derive(Debug)]
struct Session {
    status: Status,
    current_index: usize,
    total_words: usize,
    started_at: Option<DateTime<Utc>>,
}

impl Session {
    fn idle() -> Self {
        Session {
            status: Status::Idle,
            current_index: 0,
            total_words: 0,
            started_at: None,
        }
    }
}

/// Session state shared by request handlers and the worker thread
struct Shared {
    session: Mutex<Session>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Session>, timeout: Duration) -> MutexGuard<'a, Session> {
        match self.changed.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    fn set_index(&self, index: usize) {
        self.lock().current_index = index;
    }

    /// Block while paused. Returns false once a stop has been requested.
    fn proceed(&self, poll: Duration) -> bool {
        let mut session = self.lock();
        loop {
            let status = session.status;
            match status {
                Status::Running => return true,
                Status::Paused => session = self.wait(session, poll),
                Status::Stopping | Status::Idle => return false,
            }
        }
    }

    /// Sleep for `duration` unless stopped first, then honor a pending pause
    fn rest(&self, duration: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut session = self.lock();
        while session.status != Status::Stopping {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            session = self.wait(session, deadline - now);
        }
        drop(session);
        self.proceed(poll)
    }

    fn finish(&self) {
        *self.lock() = Session::idle();
        self.changed.notify_all();
    }
}

/// Resets the session even if the worker unwinds
struct FinishOnDrop(Arc<Shared>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Result of a pause/resume toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub status: Status,
    pub current_word: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub status: Status,
    pub current_word: usize,
    pub total_words: usize,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Finished,
    Stopped,
}

/// Owns playback state and runs at most one narration worker at a time.
///
/// Each entry is read twice with `Pacing::repeat_gap` in between, followed by a
/// gap that grows with the number of words in the entry. Pause and stop are
/// cooperative: they take effect at the checkpoints between utterances, never
/// in the middle of one.
pub struct Narrator {
    shared: Arc<Shared>,
    factory: Arc<dyn EngineFactory>,
    pacing: Pacing,
    closing_phrase: String,
}

impl Narrator {
    pub fn new(factory: Arc<dyn EngineFactory>, pacing: Pacing, closing_phrase: impl Into<String>) -> Self {
        Narrator {
            shared: Arc::new(Shared {
                session: Mutex::new(Session::idle()),
                changed: Condvar::new(),
            }),
            factory,
            pacing,
            closing_phrase: closing_phrase.into(),
        }
    }

    /// Begin narrating `words` followed by the closing phrase.
    /// Returns the number of entries queued, including the closing phrase.
    pub fn start(&self, mut words: Vec<String>) -> Result<usize, ControllerError> {
        words.push(self.closing_phrase.clone());
        let total = words.len();

        {
            let mut session = self.shared.lock();
            if session.status != Status::Idle {
                return Err(ControllerError::Busy(session.status.as_str()));
            }
            *session = Session {
                status: Status::Running,
                current_index: 0,
                total_words: total,
                started_at: Some(Utc::now()),
            };
        }

        let shared = self.shared.clone();
        let factory = self.factory.clone();
        let pacing = self.pacing.clone();
        let spawned = thread::Builder::new()
            .name("narrator".to_string())
            .spawn(move || {
                let _finish = FinishOnDrop(shared.clone());
                match narrate(&shared, factory.as_ref(), &pacing, &words) {
                    Ok(Outcome::Finished) => info!("Narration finished ({} entries)", words.len()),
                    Ok(Outcome::Stopped) => info!("Narration stopped"),
                    Err(e) => error!("Narration aborted: {}", e),
                }
            });

        if let Err(e) = spawned {
            self.shared.finish();
            return Err(ControllerError::Spawn(e.to_string()));
        }

        info!("Narration started with {} entries", total);
        Ok(total)
    }

    /// Pause a running session or resume a paused one
    pub fn pause_or_resume(&self) -> Result<Toggle, ControllerError> {
        let mut session = self.shared.lock();
        session.status = match session.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            Status::Stopping => return Err(ControllerError::Stopping),
            Status::Idle => return Err(ControllerError::NotPlaying),
        };
        self.shared.changed.notify_all();
        info!("Narration {} at entry {}", session.status.as_str(), session.current_index);

        Ok(Toggle {
            status: session.status,
            current_word: session.current_index,
        })
    }

    /// Ask the worker to stop at its next checkpoint. Clears any pause.
    pub fn stop(&self) -> Result<(), ControllerError> {
        let mut session = self.shared.lock();
        match session.status {
            Status::Idle => return Err(ControllerError::NotPlaying),
            Status::Stopping => return Ok(()),
            Status::Running | Status::Paused => session.status = Status::Stopping,
        }
        self.shared.changed.notify_all();
        info!("Narration stop requested at entry {}", session.current_index);
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = self.shared.lock();
        Snapshot {
            status: session.status,
            current_word: session.current_index,
            total_words: session.total_words,
            started_at: session.started_at,
        }
    }

    /// A cheap handle reporting the index of the entry being narrated
    #[cfg(test)]
    pub fn progress(&self) -> impl Fn() -> usize + Send + 'static {
        let shared = self.shared.clone();
        move || shared.lock().current_index
    }

    /// Wait until no session is active. Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut session = self.shared.lock();
        while session.status != Status::Idle {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            session = self.shared.wait(session, deadline - now);
        }
        true
    }
}

fn narrate(
    shared: &Shared,
    factory: &dyn EngineFactory,
    pacing: &Pacing,
    words: &[String],
) -> Result<Outcome, SpeechError> {
    let mut engine = factory.create()?;
    let outcome = recite(shared, engine.as_mut(), pacing, words);
    engine.shutdown();
    outcome
}

fn recite(
    shared: &Shared,
    engine: &mut dyn SpeechEngine,
    pacing: &Pacing,
    words: &[String],
) -> Result<Outcome, SpeechError> {
    let poll = pacing.poll_interval;

    for (i, word) in words.iter().enumerate() {
        shared.set_index(i);
        if !shared.proceed(poll) {
            return Ok(Outcome::Stopped);
        }

        info!("Pronouncing: {} (1st time)", word);
        engine.say(word)?;
        if !shared.proceed(poll) || !shared.rest(pacing.repeat_gap, poll) {
            return Ok(Outcome::Stopped);
        }

        info!("Pronouncing: {} (2nd time)", word);
        engine.say(word)?;
        if !shared.proceed(poll) || !shared.rest(pacing.gap_after(word), poll) {
            return Ok(Outcome::Stopped);
        }
    }

    Ok(Outcome::Finished)
}
