// Test fixtures and stand-ins for the output seams
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::audio::{MediaOutput, SpeechSynth, Ticket};
use crate::error::{LoadError, PlaybackError, SpeechError};
use crate::render::{Notice, RenderSink, RosterSnapshot};
use crate::roster::{PlayerRecord, RosterProvider};

/// A mono 16-bit PCM WAV of `frames` silent samples.
pub fn silent_wav(frames: u32, sample_rate: u32) -> Vec<u8> {
    let data_len = frames * 2;
    let mut wav = Vec::with_capacity(44 + data_len as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_len).to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    wav.extend_from_slice(&2u16.to_le_bytes());
    wav.extend_from_slice(&16u16.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.resize(44 + data_len as usize, 0);
    wav
}

/// Ava and Ben have songs; Cy does not.
pub fn lineup() -> Vec<PlayerRecord> {
    vec![
        PlayerRecord::new(1, "7", "Ava").with_song("songs/ava.mp3"),
        PlayerRecord::new(2, "12", "Ben")
            .with_announcement("Benjamin")
            .with_song("songs/ben.mp3"),
        PlayerRecord::new(3, "3", "Cy"),
    ]
}

pub struct FailingProvider;

impl RosterProvider for FailingProvider {
    fn fetch(&self) -> Result<Vec<PlayerRecord>, LoadError> {
        Err(LoadError::Unreadable {
            source_name: "players.json".to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

type Gate = oneshot::Sender<(Result<(), PlaybackError>, oneshot::Sender<()>)>;

/// One call to [`GatedMedia::play`], held until the test decides how it ends.
pub struct PendingStart {
    pub ticket: Ticket,
    pub src: String,
    pub muted: bool,
    gate: Gate,
}

impl PendingStart {
    /// Settle the start and wait until `play` has returned.
    pub async fn resolve(self, outcome: Result<(), PlaybackError>) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.gate.send((outcome, done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

/// Media output whose starts only finish when the test says so.
pub struct GatedMedia {
    starts_tx: mpsc::UnboundedSender<PendingStart>,
    starts_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<PendingStart>>,
    stops: AtomicUsize,
}

impl GatedMedia {
    pub fn new() -> Arc<Self> {
        let (starts_tx, starts_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            starts_tx,
            starts_rx: tokio::sync::Mutex::new(starts_rx),
            stops: AtomicUsize::new(0),
        })
    }

    pub async fn next_start(&self) -> PendingStart {
        let next = self.starts_rx.lock().await.recv().await;
        match next {
            Some(start) => start,
            None => panic!("media output dropped"),
        }
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl MediaOutput for GatedMedia {
    async fn play(&self, ticket: Ticket, src: &str, muted: bool) -> Result<(), PlaybackError> {
        let (gate, rx) = oneshot::channel();
        let _ = self.starts_tx.send(PendingStart {
            ticket,
            src: src.to_string(),
            muted,
            gate,
        });
        match rx.await {
            Ok((outcome, done)) => {
                let _ = done.send(());
                outcome
            }
            Err(_) => Err(PlaybackError::Rejected("gate dropped".to_string())),
        }
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Speech synth that keeps what it was asked to say.
#[derive(Clone, Default)]
pub struct RecordingSpeech {
    spoken: Arc<Mutex<Vec<String>>>,
    cancels: Arc<AtomicUsize>,
}

impl RecordingSpeech {
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

impl SpeechSynth for RecordingSpeech {
    fn speak(&self, text: &str) -> Result<(), SpeechError> {
        self.spoken.lock().push(text.to_string());
        Ok(())
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Render sink that keeps every frame and notice.
#[derive(Clone, Default)]
pub struct RecordingSink {
    frames: Arc<Mutex<Vec<RosterSnapshot>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingSink {
    pub fn frames(&self) -> Vec<RosterSnapshot> {
        self.frames.lock().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }
}

impl RenderSink for RecordingSink {
    fn render(&mut self, snapshot: &RosterSnapshot) {
        self.frames.lock().push(snapshot.clone());
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.lock().push(notice.clone());
    }
}
