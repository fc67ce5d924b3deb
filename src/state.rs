// Application state management
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audio::{media_event_channel, HeadlessOutput, LogSpeech, NoSpeech, SpeechSynth};
use crate::persistence::{JsonFileStore, KeyValueStore, MemoryStore, OrderGateway, SqliteStore};
use crate::playback::{Controller, ControllerHandle};
use crate::render::RenderSink;
use crate::roster::JsonFileProvider;
use crate::session::{Session, SessionOptions};
use crate::settings::{AppSettings, StorageBackend};

pub struct AppState {
    pub controller: ControllerHandle,
    pub media: Arc<HeadlessOutput>,
    pub settings: AppSettings,
    pub app_dir: PathBuf,
    task: JoinHandle<()>,
}

impl AppState {
    /// Wire provider, storage, media and speech into a running controller.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(settings: AppSettings, app_dir: PathBuf, sink: Box<dyn RenderSink>) -> Self {
        let gateway = OrderGateway::new(
            open_store(&settings, &app_dir),
            settings.storage.order_key.clone(),
        );
        let provider = JsonFileProvider::new(settings.roster_path(&app_dir));
        let session = Session::load(
            Box::new(provider),
            gateway,
            SessionOptions {
                unlock_probe: settings.playback.unlock_probe,
                reset_mode: settings.playback.reset_mode,
            },
        );

        let (events, media_events) = media_event_channel();
        let media = Arc::new(HeadlessOutput::new(settings.media_root(&app_dir), events));
        let speech: Box<dyn SpeechSynth> = if settings.speech.enabled {
            Box::new(LogSpeech::new())
        } else {
            Box::new(NoSpeech)
        };

        let (controller, handle) =
            Controller::new(session, Arc::clone(&media), media_events, speech, sink);
        let task = controller.spawn();
        info!(?app_dir, "Lineup ready");

        Self {
            controller: handle,
            media,
            settings,
            app_dir,
            task,
        }
    }

    /// Stop the controller and wait for it to finish.
    pub async fn shutdown(self) {
        let _ = self.controller.shutdown().await;
        if let Err(e) = self.task.await {
            warn!("Controller task ended abnormally: {}", e);
        }
    }
}

fn open_store(settings: &AppSettings, app_dir: &Path) -> Box<dyn KeyValueStore> {
    let path = settings.storage_path(app_dir);
    match settings.storage.backend {
        StorageBackend::JsonFile => Box::new(JsonFileStore::new(path)),
        StorageBackend::Sqlite => match SqliteStore::open(&path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                // The order just won't survive a restart.
                warn!(?path, "Could not open order database, keeping order in memory: {}", e);
                Box::new(MemoryStore::new())
            }
        },
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingSink;
    use tempfile::tempdir;

    const PLAYERS: &str = r#"[
        {"id": 1, "number": 7, "name": "Ava", "song": "ava.wav"},
        {"id": 2, "number": "12", "name": "Ben", "announcementName": "Benjamin"}
    ]"#;

    fn write_roster(app_dir: &Path) {
        let data = app_dir.join("data");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(data.join("players.json"), PLAYERS).unwrap();
    }

    #[tokio::test]
    async fn test_bootstrap_loads_roster() {
        let dir = tempdir().unwrap();
        write_roster(dir.path());
        let sink = RecordingSink::default();
        let state = AppState::new(
            AppSettings::default(),
            dir.path().to_path_buf(),
            Box::new(sink.clone()),
        );

        let snapshot = state.controller.snapshot().await.unwrap();
        assert_eq!(snapshot.ordered_ids(), vec![1, 2]);
        assert_eq!(snapshot.player(1).unwrap().number, "7");
        assert!(sink.notices().is_empty());
        state.shutdown().await;
    }

    #[tokio::test]
    async fn test_order_survives_restart() {
        let dir = tempdir().unwrap();
        write_roster(dir.path());
        for backend in [StorageBackend::JsonFile, StorageBackend::Sqlite] {
            let mut settings = AppSettings::default();
            settings.storage.backend = backend;

            let state = AppState::new(
                settings.clone(),
                dir.path().to_path_buf(),
                Box::new(RecordingSink::default()),
            );
            assert!(state.controller.reorder(1, 0).await.unwrap());
            state.shutdown().await;

            let state = AppState::new(
                settings,
                dir.path().to_path_buf(),
                Box::new(RecordingSink::default()),
            );
            let snapshot = state.controller.snapshot().await.unwrap();
            assert_eq!(snapshot.ordered_ids(), vec![2, 1], "{:?}", backend);
            state.controller.reset().await.unwrap();
            state.shutdown().await;
        }
    }

    #[tokio::test]
    async fn test_missing_roster_is_a_notice() {
        let dir = tempdir().unwrap();
        let sink = RecordingSink::default();
        let state = AppState::new(
            AppSettings::default(),
            dir.path().to_path_buf(),
            Box::new(sink.clone()),
        );

        assert!(state.controller.snapshot().await.unwrap().players.is_empty());
        assert_eq!(sink.notices().len(), 1);
        state.shutdown().await;
    }
}
