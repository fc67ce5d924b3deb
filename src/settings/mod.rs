// Settings module
// Application settings stored as JSON next to the app data

pub mod settings;

pub use settings::{
    AppSettings, LoggingSettings, PlaybackSettings, ResetMode, RosterSettings, SpeechSettings,
    StorageBackend, StorageSettings,
};
