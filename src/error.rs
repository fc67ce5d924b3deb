// Error taxonomy
// None of these terminate the session; each one degrades to the last valid state.
use thiserror::Error;

use crate::roster::models::PlayerId;

/// The initial roster could not be fetched or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not read {source_name}: {reason}")]
    Unreadable { source_name: String, reason: String },

    #[error("Data from {source_name} is not an array.")]
    NotAnArray { source_name: String },

    #[error("could not parse {source_name}: {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("{source_name} lists player id {id} more than once")]
    DuplicateId { source_name: String, id: PlayerId },
}

/// A media start (or the unlock probe) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("song not found: {0}")]
    Missing(String),

    #[error("could not decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("playback rejected: {0}")]
    Rejected(String),
}

/// Durable storage failed. Always swallowed by the gateway.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage document is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sqlite storage failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// An operation referenced something that is not in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("no player with id {0}")]
    Player(PlayerId),

    #[error("index {index} is out of range for a roster of {len}")]
    Index { index: usize, len: usize },
}

/// Speech synthesis could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("text-to-speech is not available")]
    Unavailable,

    #[error("speech synthesis failed: {0}")]
    Failed(String),
}

/// The session actor is gone; nothing will process the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the lineup session has shut down")]
pub struct SessionClosed;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Speech(#[from] SpeechError),

    #[error(transparent)]
    Closed(#[from] SessionClosed),
}
