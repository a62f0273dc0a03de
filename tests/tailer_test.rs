//! Tailer tests - a real file grows, rotates and disappears while followed

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tot_solver::{CardCatalog, OfferingSnapshot, Tailer, TailerEvent, TailerEvents, TailerOptions};

fn catalog() -> Arc<CardCatalog> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/cards.json");
    Arc::new(CardCatalog::load(path).unwrap())
}

fn fast_tailer(max_read_failures: u32) -> Tailer {
    Tailer::with_options(
        catalog(),
        TailerOptions {
            poll_interval: Duration::from_millis(10),
            max_read_failures,
        },
    )
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

async fn next_event(events: &mut TailerEvents) -> TailerEvent {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for tailer event")
        .expect("tailer channel closed")
}

async fn next_offerings(events: &mut TailerEvents) -> OfferingSnapshot {
    loop {
        if let TailerEvent::OfferingsChanged { snapshot } = next_event(events).await {
            return snapshot;
        }
    }
}

#[tokio::test]
async fn test_follows_only_new_content() {
    // Given: a log that already holds an offering from an earlier game
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "[id=99 cardId=C3 name=Baz]\n").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    assert!(tailer.is_following());
    assert!(matches!(next_event(&mut events).await, TailerEvent::Attached { .. }));

    // When: new lines are appended
    append(&path, "[id=5 cardId=C1 name=Foo]\n");

    // Then: only the new entity is offered
    let snapshot = next_offerings(&mut events).await;
    let ids: Vec<u64> = snapshot.offerings.iter().map(|o| o.entity_id).collect();
    assert_eq!(ids, vec![5]);

    tailer.stop();
    assert!(!tailer.is_following());
}

#[tokio::test]
async fn test_events_arrive_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(
        &path,
        "[id=5 cardId=C1 name=Foo]\n\
         [id=5 cardId=C1] tag=COST value=3 DEF CHANGE\n\
         [entityName=Player id=2] tag=RESOURCES value=4\n\
         [id=7 cardId=C2 name=Bar]\n",
    );

    let first = next_offerings(&mut events).await;
    assert_eq!(first.offerings[0].cost, Some(4));

    let corrected = next_offerings(&mut events).await;
    assert_eq!(corrected.offerings[0].cost, Some(3));

    match next_event(&mut events).await {
        TailerEvent::TagHistoryChanged { history } => {
            assert_eq!(history, vec!["Player id=2 | RESOURCES (4)".to_string()]);
        }
        other => panic!("Expected TagHistoryChanged, got {:?}", other),
    }

    let last = next_offerings(&mut events).await;
    let ids: Vec<u64> = last.offerings.iter().map(|o| o.entity_id).collect();
    assert_eq!(ids, vec![7, 5]);
    assert_eq!(last.recommended, Some(7));

    tailer.stop();
}

#[tokio::test]
async fn test_partial_line_waits_for_terminator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(&path, "[id=5 cardId=C1 na");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(events.try_recv().is_err());

    append(&path, "me=Foo]\n");
    let snapshot = next_offerings(&mut events).await;
    assert_eq!(snapshot.offerings[0].name, "Foo");

    tailer.stop();
}

#[tokio::test]
async fn test_truncation_resets_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(&path, "[id=50 cardId=C3 name=Baz]\n");
    next_offerings(&mut events).await;

    // When: the client starts a new log in place
    OpenOptions::new().write(true).truncate(true).open(&path).unwrap();

    // Then: rotation is reported and empty snapshots follow
    assert!(matches!(next_event(&mut events).await, TailerEvent::Rotated { .. }));
    match next_event(&mut events).await {
        TailerEvent::TagHistoryChanged { history } => assert!(history.is_empty()),
        other => panic!("Expected TagHistoryChanged, got {:?}", other),
    }
    assert!(next_offerings(&mut events).await.offerings.is_empty());

    // And: entity ids from the new run start from scratch
    append(&path, "[id=4 cardId=C1 name=Foo]\n");
    let snapshot = next_offerings(&mut events).await;
    let ids: Vec<u64> = snapshot.offerings.iter().map(|o| o.entity_id).collect();
    assert_eq!(ids, vec![4]);

    tailer.stop();
}

fn entity_ids(snapshot: &OfferingSnapshot) -> Vec<u64> {
    snapshot.offerings.iter().map(|o| o.entity_id).collect()
}

/// Skip events until `Rotated`, then expect the empty session snapshots
async fn expect_rotation_reset(events: &mut TailerEvents) {
    loop {
        match next_event(events).await {
            TailerEvent::Rotated { .. } => break,
            TailerEvent::OfferingsChanged { .. } | TailerEvent::TagHistoryChanged { .. } => {}
            other => panic!("Expected Rotated, got {:?}", other),
        }
    }
    match next_event(events).await {
        TailerEvent::TagHistoryChanged { history } => assert!(history.is_empty()),
        other => panic!("Expected TagHistoryChanged, got {:?}", other),
    }
    assert!(next_offerings(events).await.offerings.is_empty());
}

#[tokio::test]
async fn test_rewrite_past_old_offset_starts_new_session() {
    // Given: a slow poll so the rewrite lands between two cycles
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = Tailer::with_options(
        catalog(),
        TailerOptions {
            poll_interval: Duration::from_millis(300),
            max_read_failures: 3,
        },
    );
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(&path, "[id=80 cardId=C1 name=Foo]\n[id=81 cardId=C2 name=Bar]\n");
    while entity_ids(&next_offerings(&mut events).await) != vec![81, 80] {}

    // When: the client truncates in place and writes more than before
    fs::write(
        &path,
        "D 00:00:01.0000000 new game started\n\
         [id=4 cardId=C1 name=Foo]\n\
         [id=5 cardId=C2 name=Bar]\n",
    )
    .unwrap();

    // Then: the old entities are gone and the new run is read in full
    expect_rotation_reset(&mut events).await;
    assert_eq!(entity_ids(&next_offerings(&mut events).await), vec![4]);
    assert_eq!(entity_ids(&next_offerings(&mut events).await), vec![5, 4]);

    tailer.stop();
}

#[cfg(unix)]
#[tokio::test]
async fn test_recreated_file_starts_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(1000);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(&path, "[id=80 cardId=C1 name=Foo]\n[id=81 cardId=C2 name=Bar]\n");
    while entity_ids(&next_offerings(&mut events).await) != vec![81, 80] {}

    // When: the client deletes the log and starts a new one
    fs::remove_file(&path).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&path, "").unwrap();
    append(&path, "[id=4 cardId=C1 name=Foo]\n[id=5 cardId=C2 name=Bar]\n");

    // Then: a rotation resets the session and entity ids start over
    expect_rotation_reset(&mut events).await;
    assert_eq!(entity_ids(&next_offerings(&mut events).await), vec![4]);
    assert_eq!(entity_ids(&next_offerings(&mut events).await), vec![5, 4]);

    tailer.stop();
}

#[cfg(unix)]
#[tokio::test]
async fn test_transient_failure_resumes_without_loss_or_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    let moved = dir.path().join("Zone.log.moved");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(1000);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    append(&path, "[id=5 cardId=C1 name=Foo]\n[id=5 cardId=C1] tag=COST val");
    assert_eq!(entity_ids(&next_offerings(&mut events).await), vec![5]);

    // When: the path disappears for a while and the same file comes back
    fs::rename(&path, &moved).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    append(&moved, "ue=3 DEF CHANGE\n[id=7 cardId=C2 name=Bar]\n");
    fs::rename(&moved, &path).unwrap();

    // Then: reading picks up exactly where it stopped, in the same session
    let corrected = next_offerings(&mut events).await;
    assert_eq!(entity_ids(&corrected), vec![5]);
    assert_eq!(corrected.offerings[0].cost, Some(3));

    match next_event(&mut events).await {
        TailerEvent::OfferingsChanged { snapshot } => {
            assert_eq!(entity_ids(&snapshot), vec![7, 5]);
            assert_eq!(snapshot.offerings[1].cost, Some(3));
        }
        other => panic!("Expected OfferingsChanged, got {:?}", other),
    }
    assert!(tailer.is_following());

    tailer.stop();
}

#[cfg(unix)]
#[tokio::test]
async fn test_deleted_file_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    fs::remove_file(&path).unwrap();

    match next_event(&mut events).await {
        TailerEvent::Failed { error } => assert!(error.contains("Zone.log")),
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_stop_emits_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Zone.log");
    fs::write(&path, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut events = tailer.attach(&path).unwrap();
    next_event(&mut events).await;

    tailer.stop();

    assert_eq!(next_event(&mut events).await, TailerEvent::Stopped);
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_reattach_starts_fresh_session() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.log");
    let second = dir.path().join("second.log");
    fs::write(&first, "").unwrap();
    fs::write(&second, "").unwrap();

    let mut tailer = fast_tailer(3);
    let mut old_events = tailer.attach(&first).unwrap();
    next_event(&mut old_events).await;
    append(&first, "[id=5 cardId=C1 name=Foo]\n");
    next_offerings(&mut old_events).await;

    // When: a different log is attached
    let mut events = tailer.attach(&second).unwrap();

    // Then: the old worker stopped and the new one knows nothing of entity 5
    assert_eq!(next_event(&mut old_events).await, TailerEvent::Stopped);
    assert_eq!(tailer.path(), Some(second.as_path()));
    assert!(matches!(next_event(&mut events).await, TailerEvent::Attached { .. }));

    append(&second, "[id=3 cardId=C2 name=Bar]\n");
    let snapshot = next_offerings(&mut events).await;
    let ids: Vec<u64> = snapshot.offerings.iter().map(|o| o.entity_id).collect();
    assert_eq!(ids, vec![3]);

    tailer.stop();
}

#[test]
fn test_attach_missing_file_is_error() {
    let mut tailer = fast_tailer(3);
    assert!(tailer.attach("/no/such/dir/Zone.log").is_err());
    assert!(!tailer.is_following());
}
