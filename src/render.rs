// Render trigger boundary
// The session hands a read-only snapshot to whoever draws the lineup.
use serde::Serialize;
use tokio::sync::watch;

use crate::roster::models::{PlayerId, PlayerRecord};

/// What the single audio element / announcer is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "playerId", rename_all = "camelCase")]
pub enum Activity {
    #[default]
    Idle,
    Unlocking(PlayerId),
    Starting(PlayerId),
    Playing(PlayerId),
    Announcing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub players: Vec<PlayerRecord>,
    pub currently_playing_id: Option<PlayerId>,
    pub activity: Activity,
}

impl RosterSnapshot {
    pub fn ordered_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// User-visible messages that are not part of the lineup itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "camelCase")]
pub enum Notice {
    LoadFailed(String),
    PlaybackFailed(String),
    NoSong(String),
    SpeechUnavailable(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::LoadFailed(m)
            | Self::PlaybackFailed(m)
            | Self::NoSong(m)
            | Self::SpeechUnavailable(m) => m,
        }
    }
}

pub trait RenderSink: Send + 'static {
    fn render(&mut self, snapshot: &RosterSnapshot);

    fn notify(&mut self, _notice: &Notice) {}
}

/// Publishes every snapshot on a watch channel.
impl RenderSink for watch::Sender<RosterSnapshot> {
    fn render(&mut self, snapshot: &RosterSnapshot) {
        self.send_replace(snapshot.clone());
    }
}

impl<T: RenderSink + ?Sized> RenderSink for Box<T> {
    fn render(&mut self, snapshot: &RosterSnapshot) {
        (**self).render(snapshot)
    }

    fn notify(&mut self, notice: &Notice) {
        (**self).notify(notice)
    }
}
