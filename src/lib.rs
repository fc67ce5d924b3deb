// Walk-up - lineup and walk-up song announcer
// Module declarations
pub mod audio;
pub mod commands;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod playback;
pub mod render;
pub mod roster;
pub mod session;
pub mod settings;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use error::{Error, SessionClosed};
pub use playback::{Controller, ControllerHandle};
pub use render::{Activity, Notice, RenderSink, RosterSnapshot};
pub use roster::{PlayerId, PlayerRecord};
pub use session::{Session, SessionOptions};
