// Speech synthesis seam for name announcements
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::error::SpeechError;

/// Fire-and-forget announcer. Completion is never reported back.
pub trait SpeechSynth: Send + Sync + 'static {
    fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// Cut off anything being spoken. Harmless when silent.
    fn cancel(&self);
}

/// Headless announcer: writes each utterance to the log.
#[derive(Debug, Default)]
pub struct LogSpeech {
    speaking: AtomicBool,
}

impl LogSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }
}

impl SpeechSynth for LogSpeech {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::Failed("nothing to say".to_string()));
        }
        self.speaking.store(true, Ordering::Release);
        info!(utterance = text, "Announcing");
        Ok(())
    }

    fn cancel(&self) {
        if self.speaking.swap(false, Ordering::AcqRel) {
            debug!("Speech cancelled");
        }
    }
}

/// Stands in when the host has no text-to-speech at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSpeech;

impl SpeechSynth for NoSpeech {
    fn speak(&self, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn cancel(&self) {}
}
