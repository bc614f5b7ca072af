/*!
 * Unit tests for session state and the keyed store
 */

use std::path::PathBuf;

use veditai::overlay::{OverlayKind, OverlayPayload, OverlayWindows};
use veditai::session::models::{Session, StylePatch};
use veditai::session::store::{InMemorySessionStore, SessionStore, SqliteSessionStore};

use crate::common::{create_temp_dir, sample_transcript};

fn populated_session(id: &str) -> Session {
    let transcript = sample_transcript();
    let mut session = Session::new(id, PathBuf::from("/tmp/video.mp4"), transcript.clone());

    session.duration = Some(12.0);
    session.style.apply(&StylePatch {
        font_color: Some("yellow".to_string()),
        ..Default::default()
    });
    session.overlays.append(
        OverlayPayload::Hud {
            title: "Title".to_string(),
            content: "Body".to_string(),
        },
        "hello",
        &transcript,
        &OverlayWindows::default(),
    );

    session
}

#[test]
fn test_sqliteStore_populatedSession_shouldRoundTripExactly() {
    let store = SqliteSessionStore::new_in_memory().expect("Failed to create store");
    let session = populated_session("full");

    store.put(&session).unwrap();
    let loaded = store.get("full").unwrap().expect("session should exist");

    assert_eq!(loaded, session);
    assert_eq!(loaded.overlays.list(OverlayKind::Hud).len(), 1);
    assert_eq!(loaded.style.font_color, "yellow");
}

#[test]
fn test_sqliteStore_onDisk_shouldPersistAcrossReopen() {
    let dir = create_temp_dir().unwrap();
    let db_path = dir.path().join("sessions.db");

    {
        let store = SqliteSessionStore::new(&db_path).unwrap();
        store.put(&populated_session("durable")).unwrap();
    }

    let reopened = SqliteSessionStore::new(&db_path).unwrap();
    let loaded = reopened.get("durable").unwrap();

    assert!(loaded.is_some());
    assert_eq!(loaded.unwrap().id, "durable");
}

#[test]
fn test_sqliteStore_remove_shouldDeleteRow() {
    let store = SqliteSessionStore::new_in_memory().unwrap();
    store.put(&populated_session("gone")).unwrap();

    assert!(store.remove("gone").unwrap());
    assert!(store.get("gone").unwrap().is_none());
    assert!(!store.remove("gone").unwrap());
}

#[test]
fn test_inMemoryStore_isolatedSessions_shouldNotInterfere() {
    let store = InMemorySessionStore::new();
    let a = populated_session("a");
    let mut b = populated_session("b");
    b.style.font_color = "red".to_string();

    store.put(&a).unwrap();
    store.put(&b).unwrap();

    assert_eq!(store.get("a").unwrap().unwrap().style.font_color, "yellow");
    assert_eq!(store.get("b").unwrap().unwrap().style.font_color, "red");
}

#[test]
fn test_session_jsonShape_shouldUseDocumentedFieldNames() {
    let session = populated_session("shape");

    let json = serde_json::to_string(&session).unwrap();

    assert!(json.contains("\"video_path\""));
    assert!(json.contains("\"transcript\""));
    assert!(json.contains("\"overlays\""));
    assert!(json.contains("\"font_color\""));
}
