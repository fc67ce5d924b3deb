// Lineup session
// The one owner of every piece of mutable state: the roster, the playback
// machine, the saved order, and the notices waiting to be shown.
use tracing::{error, info, warn};

use crate::error::{LoadError, PlaybackError};
use crate::persistence::OrderGateway;
use crate::playback::machine::{Effect, PlaybackEvent, PlaybackMachine};
use crate::render::{Notice, RosterSnapshot};
use crate::roster::models::{playable_reference, AtBatAdjustment, PlayerId, PlayerRecord};
use crate::roster::{RosterProvider, RosterStore};
use crate::settings::ResetMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub unlock_probe: bool,
    pub reset_mode: ResetMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            unlock_probe: true,
            reset_mode: ResetMode::CountersAndOrder,
        }
    }
}

pub struct Session {
    store: RosterStore,
    machine: PlaybackMachine,
    gateway: OrderGateway,
    provider: Box<dyn RosterProvider>,
    reset_mode: ResetMode,
    notices: Vec<Notice>,
}

impl Session {
    /// Fetch the roster and lay it out in the saved order.
    ///
    /// A fetch failure leaves the roster empty and queues a notice; it is never fatal.
    pub fn load(
        provider: Box<dyn RosterProvider>,
        gateway: OrderGateway,
        options: SessionOptions,
    ) -> Self {
        let mut session = Self {
            store: RosterStore::new(),
            machine: PlaybackMachine::new(options.unlock_probe),
            gateway,
            provider,
            reset_mode: options.reset_mode,
            notices: Vec::new(),
        };

        match session.provider.fetch() {
            Ok(records) => {
                let saved = session.gateway.load();
                session.store = RosterStore::initialize(records, saved.as_deref());
                info!(players = session.store.len(), "Roster loaded");
            }
            Err(e) => session.fail_load(e),
        }
        session
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn machine(&self) -> &PlaybackMachine {
        &self.machine
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            players: self.store.players().to_vec(),
            currently_playing_id: self.machine.currently_playing(),
            activity: self.machine.activity(),
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn playback(&mut self, event: PlaybackEvent) -> Vec<Effect> {
        self.machine.handle(event)
    }

    /// Play button for `id`. `song` overrides the player's own song reference.
    pub fn request_play(&mut self, id: PlayerId, song: Option<&str>) -> Vec<Effect> {
        // Pressing play on the playing song stops it, whatever its reference says now.
        if self.machine.currently_playing() == Some(id) {
            return self.machine.handle(PlaybackEvent::PlayRequested { id, song: None });
        }

        let Ok(player) = self.store.find_by_id(id) else {
            return Vec::new();
        };
        let song = match song {
            Some(src) => playable_reference(src),
            None => player.playable_song(),
        }
        .map(String::from);

        self.machine.handle(PlaybackEvent::PlayRequested { id, song })
    }

    pub fn request_announce_player(&mut self, id: PlayerId) -> Vec<Effect> {
        let Ok(player) = self.store.find_by_id(id) else {
            return Vec::new();
        };
        let text = player.spoken_name().to_string();
        self.machine.handle(PlaybackEvent::AnnounceRequested { text })
    }

    pub fn adjust_at_bats(&mut self, id: PlayerId, direction: AtBatAdjustment) -> bool {
        self.store.adjust_at_bats(id, direction).unwrap_or(false)
    }

    /// Drop-reorder from the lineup list. A real move is written back to storage.
    pub fn apply_reorder(&mut self, from: usize, to: usize) -> bool {
        match self.store.reorder(from, to) {
            Ok(true) => {
                self.gateway.save(&self.store.ordered_ids());
                true
            }
            Ok(false) | Err(_) => false,
        }
    }

    /// Zero every counter; order is kept. Stops whatever is playing.
    pub fn reset_at_bats(&mut self) -> Vec<Effect> {
        let effects = self.machine.handle(PlaybackEvent::StopRequested);
        self.store.reset_at_bats();
        effects
    }

    /// The reset button, following the configured [`ResetMode`].
    pub fn reset(&mut self) -> Vec<Effect> {
        match self.reset_mode {
            ResetMode::CountersOnly => self.reset_at_bats(),
            ResetMode::CountersAndOrder => {
                let effects = self.machine.handle(PlaybackEvent::StopRequested);
                self.gateway.clear();
                self.reload_fresh();
                effects
            }
        }
    }

    fn reload_fresh(&mut self) {
        info!("Reloading players to reset order to default");
        match self.provider.fetch() {
            Ok(records) => {
                let records = records
                    .into_iter()
                    .map(|player| PlayerRecord {
                        times_batted: 0,
                        ..player
                    })
                    .collect();
                self.store = RosterStore::initialize(records, None);
                info!("At-bat counts and player order have been reset");
            }
            Err(e) => self.fail_load(e),
        }
    }

    fn fail_load(&mut self, e: LoadError) {
        error!("Could not load player data: {}", e);
        self.store = RosterStore::new();
        self.notices.push(Notice::LoadFailed(e.to_string()));
    }

    pub fn record_at_bat(&mut self, id: PlayerId) {
        // The player may have vanished in a reload while the song was starting.
        let _ = self.store.record_at_bat(id);
    }

    pub fn report_playback_failure(&mut self, id: PlayerId, error: &PlaybackError) {
        let name = self.player_name(id);
        error!(id, "Audio playback failed for {}: {}", name, error);
        self.notices.push(Notice::PlaybackFailed(format!(
            "Could not play the song for {}: {}",
            name, error
        )));
    }

    pub fn report_no_song(&mut self, id: PlayerId) {
        let name = self.player_name(id);
        self.notices
            .push(Notice::NoSong(format!("No song file specified for {}.", name)));
    }

    pub fn report_speech_unavailable(&mut self) {
        warn!("Speech synthesis not available");
        self.notices.push(Notice::SpeechUnavailable(
            "Sorry, text-to-speech is not available.".to_string(),
        ));
    }

    fn player_name(&self, id: PlayerId) -> String {
        self.store
            .players()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("player {}", id))
    }
}
