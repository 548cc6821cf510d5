use std::thread;
use std::time::Duration;
use log::{debug, warn};
use tts::Tts;
use crate::errors::SpeechError;

/// A blocking text-to-speech voice owned by one narration session
pub trait SpeechEngine {
    /// Speak `text` and return once the utterance has finished
    fn say(&mut self, text: &str) -> Result<(), SpeechError>;

    /// Release the engine at the end of a session
    fn shutdown(&mut self);
}

/// Creates a fresh engine for each session, on the worker thread
pub trait EngineFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn SpeechEngine>, SpeechError>;
}

#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub voice_index: usize,
    /// Fraction of the backend's normal rate
    pub rate: f32,
    /// 0.0 (silent) to 1.0 (loudest)
    pub volume: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            voice_index: 1,
            rate: 0.5,
            volume: 1.0,
        }
    }
}

/// Factory for the platform speech backend
pub struct TtsFactory {
    settings: VoiceSettings,
}

impl TtsFactory {
    pub fn new(settings: VoiceSettings) -> Self {
        TtsFactory { settings }
    }
}

impl EngineFactory for TtsFactory {
    fn create(&self) -> Result<Box<dyn SpeechEngine>, SpeechError> {
        let mut tts = Tts::default().map_err(|e| SpeechError::Init(e.to_string()))?;
        let features = tts.supported_features();

        if features.rate {
            let rate = (tts.normal_rate() * self.settings.rate).clamp(tts.min_rate(), tts.max_rate());
            tts.set_rate(rate).map_err(|e| SpeechError::Init(e.to_string()))?;
        }

        if features.volume {
            let span = tts.max_volume() - tts.min_volume();
            let volume = tts.min_volume() + span * self.settings.volume.clamp(0.0, 1.0);
            tts.set_volume(volume).map_err(|e| SpeechError::Init(e.to_string()))?;
        }

        if features.voice {
            let voices = tts.voices().map_err(|e| SpeechError::Init(e.to_string()))?;
            let voice = voices.get(self.settings.voice_index).ok_or(SpeechError::NoVoice {
                wanted: self.settings.voice_index,
                available: voices.len(),
            })?;
            debug!("Using voice {} ({})", voice.name(), voice.id());
            tts.set_voice(voice).map_err(|e| SpeechError::Init(e.to_string()))?;
        } else {
            warn!("Speech backend cannot select voices; using its default voice");
        }

        Ok(Box::new(TtsEngine {
            tts,
            track_speaking: features.is_speaking,
        }))
    }
}

struct TtsEngine {
    tts: Tts,
    track_speaking: bool,
}

const SPEAKING_POLL: Duration = Duration::from_millis(50);

impl SpeechEngine for TtsEngine {
    fn say(&mut self, text: &str) -> Result<(), SpeechError> {
        self.tts
            .speak(text, false)
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        if !self.track_speaking {
            return Ok(());
        }

        // Give the backend a moment to register the utterance
        thread::sleep(SPEAKING_POLL);
        while self
            .tts
            .is_speaking()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?
        {
            thread::sleep(SPEAKING_POLL);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Err(e) = self.tts.stop() {
            warn!("Failed to stop speech engine: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Condvar, Mutex, PoisonError};
    use std::time::Instant;

    /// Shared record of what a scripted engine was asked to say.
    /// While `hold` is set every utterance blocks until `release` is called.
    #[derive(Default)]
    pub struct Script {
        pub spoken: Mutex<Vec<(String, usize)>>,
        pub shutdowns: AtomicUsize,
        held: Mutex<bool>,
        released: Condvar,
        fail_on: Mutex<Option<String>>,
        panic_on: Mutex<Option<String>>,
        fail_create: Mutex<bool>,
        progress: Mutex<Option<Box<dyn Fn() -> usize + Send>>>,
    }

    impl Script {
        pub fn new() -> Arc<Self> {
            Arc::new(Script::default())
        }

        pub fn hold(&self) {
            *self.held.lock().unwrap() = true;
        }

        pub fn release(&self) {
            *self.held.lock().unwrap() = false;
            self.released.notify_all();
        }

        pub fn fail_on(&self, word: &str) {
            *self.fail_on.lock().unwrap() = Some(word.to_string());
        }

        /// Make the engine panic mid-session when asked to say `word`
        pub fn panic_on(&self, word: &str) {
            *self.panic_on.lock().unwrap() = Some(word.to_string());
        }

        pub fn fail_create(&self) {
            *self.fail_create.lock().unwrap() = true;
        }

        /// Record the narrator's current index alongside each utterance
        pub fn observe<F: Fn() -> usize + Send + 'static>(&self, probe: F) {
            *self.progress.lock().unwrap() = Some(Box::new(probe));
        }

        pub fn spoken(&self) -> Vec<(String, usize)> {
            self.spoken.lock().unwrap().clone()
        }

        pub fn words(&self) -> Vec<String> {
            self.spoken().into_iter().map(|(w, _)| w).collect()
        }

        pub fn wait_for_utterances(&self, count: usize) {
            let deadline = Instant::now() + Duration::from_secs(5);
            while self.spoken.lock().unwrap().len() < count {
                assert!(Instant::now() < deadline, "engine never reached {} utterances", count);
                thread::sleep(Duration::from_millis(2));
            }
        }
    }

    pub struct ScriptedFactory(pub Arc<Script>);

    impl EngineFactory for ScriptedFactory {
        fn create(&self) -> Result<Box<dyn SpeechEngine>, SpeechError> {
            if *self.0.fail_create.lock().unwrap() {
                return Err(SpeechError::NoVoice { wanted: 1, available: 1 });
            }
            Ok(Box::new(ScriptedEngine(self.0.clone())))
        }
    }

    struct ScriptedEngine(Arc<Script>);

    impl SpeechEngine for ScriptedEngine {
        fn say(&mut self, text: &str) -> Result<(), SpeechError> {
            let index = self.0.progress.lock().unwrap().as_ref().map(|p| p()).unwrap_or(0);
            self.0.spoken.lock().unwrap().push((text.to_string(), index));

            if self.0.fail_on.lock().unwrap().as_deref() == Some(text) {
                return Err(SpeechError::Synthesis(format!("cannot say {}", text)));
            }

            let panics = self.0.panic_on.lock().unwrap().as_deref() == Some(text);
            if panics {
                panic!("speech backend crashed on {}", text);
            }

            let mut held = self.0.held.lock().unwrap_or_else(PoisonError::into_inner);
            while *held {
                held = self.0.released.wait(held).unwrap_or_else(PoisonError::into_inner);
            }
            Ok(())
        }

        fn shutdown(&mut self) {
            self.0.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }
}
