//! Samples written by one run are visible to the next.

use hostcheck_state::{SnapshotStore, StateError};

#[test]
fn samples_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpu.redb");

    {
        let store = SnapshotStore::open(&path).unwrap();
        store.set("1700000000", r#"{"user":10.0}"#).unwrap();
        store.set("1700000300", r#"{"user":20.0}"#).unwrap();
    }

    let store = SnapshotStore::open(&path).unwrap();
    assert_eq!(
        store.get("1700000000").unwrap().as_deref(),
        Some(r#"{"user":10.0}"#)
    );
    assert_eq!(store.delete_many(["1700000000"]).unwrap(), 1);
    assert_eq!(store.keys().unwrap(), vec!["1700000300".to_string()]);
}

#[test]
fn open_fails_on_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(SnapshotStore::open(dir.path()).is_err());
}

#[test]
fn second_open_while_held_is_busy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cpu.redb");
    let _held = SnapshotStore::open(&path).unwrap();

    let err = SnapshotStore::open(&path).unwrap_err();
    assert!(matches!(err, StateError::Busy(_)), "got {err}");
}
