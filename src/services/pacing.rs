use std::time::Duration;
use crate::utils::word_count;

/// Seconds of silence after an entry of `words` words
pub fn word_gap_secs(words: usize) -> u64 {
    match words {
        0 | 1 => 2,
        2 => 3,
        3 => 5,
        _ => 9,
    }
}

/// Timing of a narration session
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Silence between the two readings of an entry
    pub repeat_gap: Duration,
    /// How often a paused worker re-checks for stop
    pub poll_interval: Duration,
    /// Multiplier applied to the per-entry gap
    pub gap_scale: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing {
            repeat_gap: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
            gap_scale: 1.0,
        }
    }
}

impl Pacing {
    /// No pauses at all, for driving the narrator in tests
    #[cfg(test)]
    pub fn immediate() -> Self {
        Pacing {
            repeat_gap: Duration::ZERO,
            poll_interval: Duration::from_millis(5),
            gap_scale: 0.0,
        }
    }

    pub fn gap_after(&self, text: &str) -> Duration {
        Duration::from_secs(word_gap_secs(word_count(text))).mul_f64(self.gap_scale)
    }
}
