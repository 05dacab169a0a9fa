use std::sync::Arc;

use data_grove::graph::RecordingObserver;
use data_grove::prelude::*;
use parking_lot::Mutex;

fn recording() -> (SharedObserver, Arc<Mutex<RecordingObserver>>) {
    let rec = Arc::new(Mutex::new(RecordingObserver::default()));
    let slot: SharedObserver = rec.clone();
    (slot, rec)
}

#[test]
fn events_arrive_in_mutation_order() {
    let mut ds = DataStructure::new();
    let (slot, rec) = recording();
    ds.register_observer(slot);

    let a = ds.create_group("a", None).unwrap();
    let b = ds.create_group("b", Some(a)).unwrap();
    ds.rename(b, "renamed").unwrap();
    let c = ds.create_group("c", None).unwrap();
    ds.set_additional_parent(c, a).unwrap();
    ds.remove_data(c).unwrap();

    let events = rec.lock().events.clone();
    let types: Vec<MsgType> = events.iter().map(DataEvent::msg_type).collect();
    assert_eq!(
        types,
        vec![
            MsgType::Added,
            MsgType::Added,
            MsgType::Renamed,
            MsgType::Added,
            MsgType::Reparented,
            MsgType::Removed,
        ]
    );
    assert_eq!(events[2].target(), b);
    assert_eq!(events[5].target(), c);
}

#[test]
fn cascade_emits_one_removed_per_deleted_object() {
    let mut ds = DataStructure::new();
    let a = ds.create_group("a", None).unwrap();
    let b = ds.create_group("b", Some(a)).unwrap();
    ds.create_group("c", Some(b)).unwrap();
    // shared survives the cascade below: it keeps a second live path
    let keep = ds.create_group("keep", None).unwrap();
    let shared = ds.create_group("shared", Some(b)).unwrap();
    ds.set_additional_parent(shared, keep).unwrap();

    let (slot, rec) = recording();
    ds.register_observer(slot);
    ds.remove_data(a).unwrap();

    let events = rec.lock().events.clone();
    // a, b, c die; shared does not
    let removed: Vec<ObjectId> = events
        .iter()
        .filter(|e| e.msg_type() == MsgType::Removed)
        .map(DataEvent::target)
        .collect();
    assert_eq!(removed.len(), 3);
    assert_eq!(removed[0], a);
    assert!(!removed.contains(&shared));
    assert!(ds.contains(shared));
}

#[test]
fn unregistered_observers_stop_receiving() {
    let mut ds = DataStructure::new();
    let (slot, rec) = recording();
    ds.register_observer(slot.clone());
    ds.create_group("one", None).unwrap();
    ds.unregister_observer(&slot);
    ds.create_group("two", None).unwrap();
    assert_eq!(rec.lock().events.len(), 1);
}

#[test]
fn every_registered_observer_sees_every_event() {
    let mut ds = DataStructure::new();
    let (slot1, rec1) = recording();
    let (slot2, rec2) = recording();
    ds.register_observer(slot1);
    ds.register_observer(slot2);

    ds.create_group("x", None).unwrap();
    let id = ds.create_group("y", None).unwrap();
    ds.rename(id, "z").unwrap();

    assert_eq!(rec1.lock().events, rec2.lock().events);
    assert_eq!(rec1.lock().events.len(), 3);
}

#[test]
fn failed_mutations_emit_nothing() {
    let mut ds = DataStructure::new();
    ds.create_group("dup", None).unwrap();
    let (slot, rec) = recording();
    ds.register_observer(slot);

    assert!(ds.create_group("dup", None).is_err());
    let missing = ObjectId::try_new(9999).unwrap();
    assert!(ds.remove_data(missing).is_err());
    assert!(rec.lock().events.is_empty());
}
