// Headless media output
// Decodes songs to prove they play and paces end-of-media by their length,
// for hosts where the actual speakers belong to someone else.
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::decoder::AudioDecoder;
use super::output::{MediaEvent, MediaEventSender, MediaOutput, Ticket};
use crate::error::PlaybackError;

struct Loaded {
    ticket: Ticket,
    src: String,
    clock: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Element {
    // Latest start not yet settled; a stop or a newer load interrupts it.
    pending: Option<Ticket>,
    loaded: Option<Loaded>,
}

impl Element {
    fn halt_clock(&mut self) {
        if let Some(clock) = self.loaded.as_mut().and_then(|l| l.clock.take()) {
            clock.abort();
        }
    }
}

pub struct HeadlessOutput {
    media_root: PathBuf,
    events: MediaEventSender,
    element: Mutex<Element>,
}

impl HeadlessOutput {
    pub fn new(media_root: impl Into<PathBuf>, events: MediaEventSender) -> Self {
        Self {
            media_root: media_root.into(),
            events,
            element: Mutex::new(Element::default()),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }

    /// The source currently loaded, if any
    pub fn loaded_src(&self) -> Option<String> {
        self.element.lock().loaded.as_ref().map(|l| l.src.clone())
    }

    fn resolve(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.media_root.join(path)
        }
    }

    fn settle(
        &self,
        ticket: Ticket,
        src: &str,
        duration: Duration,
        muted: bool,
    ) -> Result<(), PlaybackError> {
        let mut element = self.element.lock();
        if element.pending != Some(ticket) {
            return Err(interrupted(ticket));
        }
        element.pending = None;

        let clock = if muted {
            None
        } else {
            let events = self.events.clone();
            Some(tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                let _ = events.send(MediaEvent::Ended { ticket });
            }))
        };
        element.halt_clock();
        element.loaded = Some(Loaded {
            ticket,
            src: src.to_string(),
            clock,
        });
        Ok(())
    }

    fn abandon(&self, ticket: Ticket) {
        let mut element = self.element.lock();
        if element.pending == Some(ticket) {
            element.pending = None;
        }
    }
}

fn interrupted(ticket: Ticket) -> PlaybackError {
    debug!(%ticket, "Start interrupted before it settled");
    PlaybackError::Rejected("the play request was interrupted".to_string())
}

impl MediaOutput for HeadlessOutput {
    fn begin(&self, ticket: Ticket) {
        let mut element = self.element.lock();
        element.halt_clock();
        element.pending = Some(ticket);
    }

    async fn play(&self, ticket: Ticket, src: &str, muted: bool) -> Result<(), PlaybackError> {
        if self.element.lock().pending != Some(ticket) {
            return Err(interrupted(ticket));
        }
        let path = self.resolve(src);
        debug!(%ticket, ?path, muted, "Loading song");

        let probed = tokio::task::spawn_blocking(move || AudioDecoder::open(&path)?.duration())
            .await
            .map_err(|e| PlaybackError::Rejected(format!("decoder task failed: {}", e)))
            .and_then(|r| r);
        let duration = match probed {
            Ok(duration) => duration,
            Err(e) => {
                self.abandon(ticket);
                return Err(e);
            }
        };

        self.settle(ticket, src, duration, muted)?;
        info!(%ticket, src, ?duration, muted, "Playback started");
        Ok(())
    }

    fn stop(&self) {
        let mut element = self.element.lock();
        element.pending = None;
        element.halt_clock();
        if let Some(loaded) = element.loaded.as_ref() {
            debug!(ticket = %loaded.ticket, "Stopped and rewound");
        }
    }
}
