// End-to-end lineup scenarios through the public API
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::tempdir;

use walkup_lib::audio::{media_event_channel, MediaEvent, MediaOutput, NoSpeech, Ticket};
use walkup_lib::error::PlaybackError;
use walkup_lib::persistence::{
    JsonFileStore, KeyValueStore, MemoryStore, OrderGateway, DEFAULT_ORDER_KEY,
};
use walkup_lib::roster::{JsonFileProvider, StaticProvider};
use walkup_lib::{
    Activity, Controller, ControllerHandle, Notice, PlayerRecord, RenderSink, RosterSnapshot,
    Session, SessionOptions,
};

/// Starts everything immediately and remembers what it was asked to play.
#[derive(Default)]
struct InstantMedia {
    plays: Mutex<Vec<(Ticket, String, bool)>>,
}

impl MediaOutput for InstantMedia {
    async fn play(&self, ticket: Ticket, src: &str, muted: bool) -> Result<(), PlaybackError> {
        self.plays.lock().push((ticket, src.to_string(), muted));
        Ok(())
    }

    fn stop(&self) {}
}

#[derive(Clone, Default)]
struct Notices(Arc<Mutex<Vec<Notice>>>);

impl RenderSink for Notices {
    fn render(&mut self, _snapshot: &RosterSnapshot) {}

    fn notify(&mut self, notice: &Notice) {
        self.0.lock().push(notice.clone());
    }
}

fn start(session: Session) -> (ControllerHandle, Arc<InstantMedia>, Notices) {
    let media = Arc::new(InstantMedia::default());
    let (_events, media_rx) = media_event_channel();
    let notices = Notices::default();
    let (controller, handle) = Controller::new(
        session,
        Arc::clone(&media),
        media_rx,
        Box::new(NoSpeech),
        Box::new(notices.clone()),
    );
    controller.spawn();
    (handle, media, notices)
}

fn two_players() -> Vec<PlayerRecord> {
    vec![
        PlayerRecord::new(1, "1", "One").with_song("a.mp3"),
        PlayerRecord::new(2, "2", "Two").with_song("b.mp3"),
    ]
}

fn batted(snapshot: &RosterSnapshot, id: i64) -> u32 {
    snapshot.player(id).map(|p| p.times_batted).unwrap_or_default()
}

#[tokio::test]
async fn test_example_scenario() {
    let store = MemoryStore::new();
    store.set(DEFAULT_ORDER_KEY, "[2,1]").unwrap();
    let session = Session::load(
        Box::new(StaticProvider::new(two_players())),
        OrderGateway::new(Box::new(store.clone()), DEFAULT_ORDER_KEY),
        SessionOptions::default(),
    );
    let (handle, media, _notices) = start(session);

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.ordered_ids(), vec![2, 1]);

    handle.play_song(1, "a.mp3").await.unwrap();
    let snapshot = handle
        .wait_for(|s| s.activity == Activity::Playing(1))
        .await
        .unwrap();
    assert_eq!(snapshot.currently_playing_id, Some(1));
    assert_eq!(batted(&snapshot, 1), 1);

    // The first play went through the muted unlock probe.
    let plays = media.plays.lock().clone();
    assert_eq!(plays.len(), 2);
    assert!(plays[0].2);
    assert_eq!((plays[1].1.as_str(), plays[1].2), ("a.mp3", false));

    handle.play_song(1, "a.mp3").await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.activity, Activity::Idle);
    assert_eq!(batted(&snapshot, 1), 1);

    assert!(handle.reorder(0, 1).await.unwrap());
    assert_eq!(handle.snapshot().await.unwrap().ordered_ids(), vec![1, 2]);
    let reloaded = OrderGateway::new(Box::new(store.clone()), DEFAULT_ORDER_KEY);
    assert_eq!(reloaded.load(), Some(vec![1, 2]));

    handle.reset_at_bats().await.unwrap();
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.players.iter().all(|p| p.times_batted == 0));
    assert_eq!(snapshot.currently_playing_id, None);
    assert_eq!(snapshot.ordered_ids(), vec![1, 2]);
}

#[tokio::test]
async fn test_reset_restores_file_order_across_restart() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("players.json");
    std::fs::write(
        &roster,
        r#"[{"id":1,"number":"1","name":"One","song":"a.mp3"},
            {"id":2,"number":2,"name":"Two","song":"undefined"},
            {"id":3,"number":"3","name":"Three"}]"#,
    )
    .unwrap();
    let storage = dir.path().join("local_storage.json");
    let load = || {
        Session::load(
            Box::new(JsonFileProvider::new(&roster)),
            OrderGateway::new(Box::new(JsonFileStore::new(&storage)), DEFAULT_ORDER_KEY),
            SessionOptions::default(),
        )
    };

    let (handle, _media, notices) = start(load());
    assert!(handle.reorder(2, 0).await.unwrap());
    handle.play(2).await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().activity, Activity::Idle);
    assert_eq!(
        notices.0.lock().clone(),
        vec![Notice::NoSong("No song file specified for Two.".to_string())]
    );
    handle.shutdown().await.unwrap();

    let (handle, _media, _notices) = start(load());
    assert_eq!(handle.snapshot().await.unwrap().ordered_ids(), vec![3, 1, 2]);

    handle.reset().await.unwrap();
    assert_eq!(handle.snapshot().await.unwrap().ordered_ids(), vec![1, 2, 3]);
    let raw = JsonFileStore::new(&storage).get(DEFAULT_ORDER_KEY).unwrap();
    assert_eq!(raw, None);
}

#[tokio::test]
async fn test_non_array_roster_starts_empty() {
    let dir = tempdir().unwrap();
    let roster = dir.path().join("players.json");
    std::fs::write(&roster, r#"{"players": []}"#).unwrap();

    let session = Session::load(
        Box::new(JsonFileProvider::new(&roster)),
        OrderGateway::new(Box::new(MemoryStore::new()), DEFAULT_ORDER_KEY),
        SessionOptions::default(),
    );
    let (handle, _media, notices) = start(session);

    assert!(handle.snapshot().await.unwrap().players.is_empty());
    assert_eq!(
        notices.0.lock().clone(),
        vec![Notice::LoadFailed(
            "Data from players.json is not an array.".to_string()
        )]
    );
}

#[tokio::test]
async fn test_end_of_song_returns_to_idle() {
    let session = Session::load(
        Box::new(StaticProvider::new(two_players())),
        OrderGateway::new(Box::new(MemoryStore::new()), DEFAULT_ORDER_KEY),
        SessionOptions {
            unlock_probe: false,
            ..SessionOptions::default()
        },
    );
    let media = Arc::new(InstantMedia::default());
    let (events, media_rx) = media_event_channel();
    let (controller, handle) = Controller::new(
        session,
        Arc::clone(&media),
        media_rx,
        Box::new(NoSpeech),
        Box::new(Notices::default()),
    );
    controller.spawn();

    handle.play(2).await.unwrap();
    handle
        .wait_for(|s| s.currently_playing_id == Some(2))
        .await
        .unwrap();
    let ticket = media.plays.lock()[0].0;
    events.send(MediaEvent::Ended { ticket }).unwrap();

    let snapshot = handle.wait_for(|s| s.activity == Activity::Idle).await.unwrap();
    assert_eq!(snapshot.currently_playing_id, None);
    assert_eq!(batted(&snapshot, 2), 1);
}
