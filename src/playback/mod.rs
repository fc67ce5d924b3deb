// Playback module
// The transition table and the task that owns the session

pub mod controller;
pub mod machine;

pub use controller::{Command, Controller, ControllerHandle};
pub use machine::{Effect, PlaybackEvent, PlaybackMachine, PlaybackState};
