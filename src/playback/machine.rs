// Playback state machine
// Pure transitions: every event yields the effects to run, nothing is executed here.
//
// Each song request gets a fresh ticket. Async completions carry the ticket they
// were issued for, and only the completion matching the current state may move it.
use tracing::{debug, info, warn};

use crate::audio::output::Ticket;
use crate::error::PlaybackError;
use crate::render::Activity;
use crate::roster::models::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Muted trial play in flight; the real start follows whatever it returns.
    Unlocking {
        id: PlayerId,
        ticket: Ticket,
        src: String,
    },
    /// Real play attempt in flight.
    Starting { id: PlayerId, ticket: Ticket },
    Playing { id: PlayerId, ticket: Ticket },
    Announcing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// `song` is `None` when the player has nothing playable.
    PlayRequested {
        id: PlayerId,
        song: Option<String>,
    },
    StopRequested,
    AnnounceRequested {
        text: String,
    },
    UnlockFinished {
        ticket: Ticket,
        outcome: Result<(), PlaybackError>,
    },
    PlayFinished {
        ticket: Ticket,
        outcome: Result<(), PlaybackError>,
    },
    MediaEnded {
        ticket: Ticket,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StopMedia,
    CancelSpeech,
    ProbeUnlock { ticket: Ticket, src: String },
    StartPlayback { ticket: Ticket, src: String },
    Speak { text: String },
    RecordAtBat { id: PlayerId },
    ReportFailure { id: PlayerId, error: PlaybackError },
    ReportNoSong { id: PlayerId },
}

#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    state: PlaybackState,
    unlocked: bool,
    last_ticket: Ticket,
}

impl PlaybackMachine {
    /// With `unlock_probe` off, audio counts as unlocked from the start.
    pub fn new(unlock_probe: bool) -> Self {
        Self {
            state: PlaybackState::Idle,
            unlocked: !unlock_probe,
            last_ticket: Ticket::new(0),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn currently_playing(&self) -> Option<PlayerId> {
        match self.state {
            PlaybackState::Playing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn activity(&self) -> Activity {
        match self.state {
            PlaybackState::Idle => Activity::Idle,
            PlaybackState::Unlocking { id, .. } => Activity::Unlocking(id),
            PlaybackState::Starting { id, .. } => Activity::Starting(id),
            PlaybackState::Playing { id, .. } => Activity::Playing(id),
            PlaybackState::Announcing => Activity::Announcing,
        }
    }

    pub fn handle(&mut self, event: PlaybackEvent) -> Vec<Effect> {
        match event {
            PlaybackEvent::PlayRequested { id, song } => self.on_play_requested(id, song),
            PlaybackEvent::StopRequested => self.stop_all(),
            PlaybackEvent::AnnounceRequested { text } => {
                let mut effects = self.stop_all();
                self.state = PlaybackState::Announcing;
                effects.push(Effect::Speak { text });
                effects
            }
            PlaybackEvent::UnlockFinished { ticket, outcome } => {
                self.on_unlock_finished(ticket, outcome)
            }
            PlaybackEvent::PlayFinished { ticket, outcome } => {
                self.on_play_finished(ticket, outcome)
            }
            PlaybackEvent::MediaEnded { ticket } => {
                if matches!(self.state, PlaybackState::Playing { ticket: t, .. } if t == ticket) {
                    info!(%ticket, "Audio playback ended naturally");
                    self.state = PlaybackState::Idle;
                } else {
                    debug!(%ticket, "Ignoring end of media for a song no longer playing");
                }
                Vec::new()
            }
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.last_ticket = self.last_ticket.next();
        self.last_ticket
    }

    fn stop_all(&mut self) -> Vec<Effect> {
        if self.state != PlaybackState::Idle {
            debug!(state = ?self.state, "Stopping all audio");
        }
        self.state = PlaybackState::Idle;
        vec![Effect::StopMedia, Effect::CancelSpeech]
    }

    fn on_play_requested(&mut self, id: PlayerId, song: Option<String>) -> Vec<Effect> {
        if self.currently_playing() == Some(id) {
            info!(id, "Play pressed on the playing song, stopping");
            return self.stop_all();
        }

        let Some(src) = song else {
            warn!(id, "No song file specified");
            return vec![Effect::ReportNoSong { id }];
        };

        let mut effects = self.stop_all();
        let ticket = self.issue_ticket();

        if self.unlocked {
            debug!(id, %ticket, src = %src, "Audio already unlocked, starting playback");
            self.state = PlaybackState::Starting { id, ticket };
            effects.push(Effect::StartPlayback { ticket, src });
        } else {
            debug!(id, %ticket, src = %src, "Unlocking audio with a muted play");
            self.state = PlaybackState::Unlocking {
                id,
                ticket,
                src: src.clone(),
            };
            effects.push(Effect::ProbeUnlock { ticket, src });
        }
        effects
    }

    fn on_unlock_finished(
        &mut self,
        ticket: Ticket,
        outcome: Result<(), PlaybackError>,
    ) -> Vec<Effect> {
        // The probe is one-shot and best effort: either outcome unlocks.
        match &outcome {
            Ok(()) => info!(%ticket, "Audio unlock succeeded"),
            Err(e) => warn!(%ticket, "Audio unlock failed, continuing anyway: {}", e),
        }
        self.unlocked = true;

        let (id, src) = match &self.state {
            PlaybackState::Unlocking {
                id,
                ticket: current,
                src,
            } if *current == ticket => (*id, src.clone()),
            _ => {
                debug!(%ticket, "Discarding unlock result for a superseded request");
                return Vec::new();
            }
        };

        self.state = PlaybackState::Starting { id, ticket };
        vec![Effect::StopMedia, Effect::StartPlayback { ticket, src }]
    }

    fn on_play_finished(
        &mut self,
        ticket: Ticket,
        outcome: Result<(), PlaybackError>,
    ) -> Vec<Effect> {
        let id = match self.state {
            PlaybackState::Starting { id, ticket: current } if current == ticket => id,
            _ => {
                debug!(%ticket, ?outcome, "Discarding play result for a superseded request");
                return Vec::new();
            }
        };

        match outcome {
            Ok(()) => {
                self.state = PlaybackState::Playing { id, ticket };
                vec![Effect::RecordAtBat { id }]
            }
            Err(error) => {
                self.state = PlaybackState::Idle;
                vec![Effect::ReportFailure { id, error }]
            }
        }
    }
}
