// Playback controller
// Owns the session on one task and turns machine effects into media, speech and render calls.
// Every input, including media completions, is funnelled through the same loop.
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::machine::{Effect, PlaybackEvent};
use crate::audio::output::{MediaEvent, MediaEventReceiver, MediaOutput, Ticket};
use crate::audio::speech::SpeechSynth;
use crate::error::{SessionClosed, SpeechError};
use crate::render::{RenderSink, RosterSnapshot};
use crate::roster::models::{AtBatAdjustment, PlayerId};
use crate::session::Session;

const COMMAND_BUFFER: usize = 64;

/// Everything a user (or the shell) can ask of the lineup.
#[derive(Debug)]
pub enum Command {
    /// Play button. `song` overrides the player's own reference.
    Play {
        id: PlayerId,
        song: Option<String>,
    },
    Stop,
    Announce {
        text: String,
    },
    AnnouncePlayer {
        id: PlayerId,
    },
    AdjustAtBats {
        id: PlayerId,
        direction: AtBatAdjustment,
        reply: oneshot::Sender<bool>,
    },
    Reorder {
        from: usize,
        to: usize,
        reply: oneshot::Sender<bool>,
    },
    ResetAtBats,
    Reset,
    Snapshot {
        reply: oneshot::Sender<RosterSnapshot>,
    },
    Shutdown,
}

pub struct Controller<M: MediaOutput> {
    session: Session,
    media: Arc<M>,
    speech: Box<dyn SpeechSynth>,
    sink: Box<dyn RenderSink>,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<PlaybackEvent>,
    completions: mpsc::UnboundedReceiver<PlaybackEvent>,
    media_events: MediaEventReceiver,
    published: watch::Sender<RosterSnapshot>,
    last_rendered: Option<RosterSnapshot>,
}

impl<M: MediaOutput> Controller<M> {
    pub fn new(
        session: Session,
        media: Arc<M>,
        media_events: MediaEventReceiver,
        speech: Box<dyn SpeechSynth>,
        sink: Box<dyn RenderSink>,
    ) -> (Self, ControllerHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let (published, snapshots) = watch::channel(session.snapshot());

        let controller = Self {
            session,
            media,
            speech,
            sink,
            commands,
            completions_tx,
            completions,
            media_events,
            published,
            last_rendered: None,
        };
        let handle = ControllerHandle {
            commands: commands_tx,
            snapshots,
        };
        (controller, handle)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process inputs until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Lineup controller started");
        self.publish();

        loop {
            tokio::select! {
                // Completions drain before commands.
                biased;

                Some(event) = self.completions.recv() => {
                    let effects = self.session.playback(event);
                    self.run_effects(effects);
                }
                Some(MediaEvent::Ended { ticket }) = self.media_events.recv() => {
                    let effects = self.session.playback(PlaybackEvent::MediaEnded { ticket });
                    self.run_effects(effects);
                }
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.execute(command),
                },
            }
            self.publish();
        }

        self.media.stop();
        self.speech.cancel();
        info!("Lineup controller stopped");
    }

    fn execute(&mut self, command: Command) {
        debug!(?command, "Command");
        match command {
            Command::Play { id, song } => {
                let effects = self.session.request_play(id, song.as_deref());
                self.run_effects(effects);
            }
            Command::Stop => {
                let effects = self.session.playback(PlaybackEvent::StopRequested);
                self.run_effects(effects);
            }
            Command::Announce { text } => {
                let effects = self
                    .session
                    .playback(PlaybackEvent::AnnounceRequested { text });
                self.run_effects(effects);
            }
            Command::AnnouncePlayer { id } => {
                let effects = self.session.request_announce_player(id);
                self.run_effects(effects);
            }
            Command::AdjustAtBats {
                id,
                direction,
                reply,
            } => {
                let _ = reply.send(self.session.adjust_at_bats(id, direction));
            }
            Command::Reorder { from, to, reply } => {
                let _ = reply.send(self.session.apply_reorder(from, to));
            }
            Command::ResetAtBats => {
                let effects = self.session.reset_at_bats();
                self.run_effects(effects);
            }
            Command::Reset => {
                let effects = self.session.reset();
                self.run_effects(effects);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Shutdown => {}
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StopMedia => self.media.stop(),
                Effect::CancelSpeech => self.speech.cancel(),
                Effect::ProbeUnlock { ticket, src } => self.start_media(ticket, src, true),
                Effect::StartPlayback { ticket, src } => self.start_media(ticket, src, false),
                Effect::Speak { text } => self.speak(&text),
                Effect::RecordAtBat { id } => self.session.record_at_bat(id),
                Effect::ReportFailure { id, error } => {
                    self.session.report_playback_failure(id, &error)
                }
                Effect::ReportNoSong { id } => self.session.report_no_song(id),
            }
        }
    }

    /// Start media off the loop; the outcome comes back as a completion.
    fn start_media(&self, ticket: Ticket, src: String, muted: bool) {
        self.media.begin(ticket);
        let media = Arc::clone(&self.media);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = media.play(ticket, &src, muted).await;
            let event = if muted {
                PlaybackEvent::UnlockFinished { ticket, outcome }
            } else {
                PlaybackEvent::PlayFinished { ticket, outcome }
            };
            // The loop may already be gone at shutdown.
            let _ = completions.send(event);
        });
    }

    fn speak(&mut self, text: &str) {
        let Err(e) = self.speech.speak(text) else {
            return;
        };
        match e {
            SpeechError::Unavailable => self.session.report_speech_unavailable(),
            e => warn!("Announcement failed: {}", e),
        }
        // Nothing is being said, so nothing is announcing.
        let effects = self.session.playback(PlaybackEvent::StopRequested);
        self.run_effects(effects);
    }

    fn publish(&mut self) {
        let snapshot = self.session.snapshot();
        if self.last_rendered.as_ref() != Some(&snapshot) {
            self.sink.render(&snapshot);
            self.published.send_replace(snapshot.clone());
            self.last_rendered = Some(snapshot);
        }
        for notice in self.session.take_notices() {
            self.sink.notify(&notice);
        }
    }
}

/// Cloneable front door to a running [`Controller`].
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<RosterSnapshot>,
}

impl ControllerHandle {
    async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.commands.send(command).await.map_err(|_| SessionClosed)
    }

    async fn ask<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(command(reply)).await?;
        rx.await.map_err(|_| SessionClosed)
    }

    pub async fn play(&self, id: PlayerId) -> Result<(), SessionClosed> {
        self.send(Command::Play { id, song: None }).await
    }

    pub async fn play_song(&self, id: PlayerId, song: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Command::Play {
            id,
            song: Some(song.into()),
        })
        .await
    }

    pub async fn stop(&self) -> Result<(), SessionClosed> {
        self.send(Command::Stop).await
    }

    pub async fn announce(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Command::Announce { text: text.into() }).await
    }

    pub async fn announce_player(&self, id: PlayerId) -> Result<(), SessionClosed> {
        self.send(Command::AnnouncePlayer { id }).await
    }

    /// Returns whether the counter changed.
    pub async fn adjust_at_bats(
        &self,
        id: PlayerId,
        direction: AtBatAdjustment,
    ) -> Result<bool, SessionClosed> {
        self.ask(|reply| Command::AdjustAtBats {
            id,
            direction,
            reply,
        })
        .await
    }

    /// Returns whether the lineup moved.
    pub async fn reorder(&self, from: usize, to: usize) -> Result<bool, SessionClosed> {
        self.ask(|reply| Command::Reorder { from, to, reply }).await
    }

    pub async fn reset_at_bats(&self) -> Result<(), SessionClosed> {
        self.send(Command::ResetAtBats).await
    }

    pub async fn reset(&self) -> Result<(), SessionClosed> {
        self.send(Command::Reset).await
    }

    /// The lineup after every command sent before this one has been applied.
    pub async fn snapshot(&self) -> Result<RosterSnapshot, SessionClosed> {
        self.ask(|reply| Command::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(Command::Shutdown).await
    }

    /// Follow every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<RosterSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `pred`.
    pub async fn wait_for(
        &self,
        pred: impl FnMut(&RosterSnapshot) -> bool,
    ) -> Result<RosterSnapshot, SessionClosed> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots.wait_for(pred).await.map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }
}
