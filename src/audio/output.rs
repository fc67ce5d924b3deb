// Media output seam
// The controller drives one logical audio element through this trait.
use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

use crate::error::PlaybackError;

/// Identifies one play request end to end, so late completions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Things the output reports without being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    /// The song loaded under `ticket` played to the end.
    Ended { ticket: Ticket },
}

pub type MediaEventSender = mpsc::UnboundedSender<MediaEvent>;
pub type MediaEventReceiver = mpsc::UnboundedReceiver<MediaEvent>;

pub fn media_event_channel() -> (MediaEventSender, MediaEventReceiver) {
    mpsc::unbounded_channel()
}

/// A single audio element: loading a new source replaces whatever was loaded.
pub trait MediaOutput: Send + Sync + 'static {
    /// Claim the element for `ticket`. Runs on the caller's task before `play` is polled,
    /// so a `stop` issued after this point interrupts that start.
    fn begin(&self, _ticket: Ticket) {}

    /// Load `src` and start it, muted or not.
    ///
    /// Resolves once playback has actually begun, or with the reason it was refused.
    /// A muted start is the unlock probe: it must not report [`MediaEvent::Ended`].
    fn play(
        &self,
        ticket: Ticket,
        src: &str,
        muted: bool,
    ) -> impl Future<Output = Result<(), PlaybackError>> + Send;

    /// Pause and rewind. Harmless when nothing is loaded.
    fn stop(&self);
}
