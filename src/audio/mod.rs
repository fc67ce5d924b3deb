// Audio module
// Song output and name announcements. Uses Symphonia to probe songs.

pub mod decoder;
pub mod headless;
pub mod output;
pub mod speech;

pub use headless::HeadlessOutput;
pub use output::{media_event_channel, MediaEvent, MediaOutput, Ticket};
pub use speech::{LogSpeech, NoSpeech, SpeechSynth};
