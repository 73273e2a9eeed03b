use std::sync::Arc;

use monitor::Monitor;
use osd::{Osd, OsdState};
use rados::{RadosError, Rados};

fn five_osd_cluster() -> (Arc<Monitor>, Rados) {
    let monitor = Arc::new(Monitor::new());
    let racks = ["r1", "r1", "r2", "r2", "r3"];
    for (id, rack) in racks.iter().enumerate() {
        monitor.add_osd(Arc::new(Osd::new(id as u64, format!("./data/osd.{id}"), 1.0, *rack)));
    }
    let rados = Rados::new(monitor.clone());
    (monitor, rados)
}

#[test]
fn replicated_round_trip_with_known_checksum() {
    let (_monitor, rados) = five_osd_cluster();
    rados.monitor().create_pool("default", 3, 8, None).unwrap();

    let result = rados.put_object("default", "hello", b"world".to_vec()).unwrap();
    assert_eq!(result.size_bytes, 5);
    assert_eq!(result.replicas.len(), 3);

    let (bytes, metadata) = rados.get_object("default", "hello").unwrap();
    assert_eq!(bytes, b"world");
    assert_eq!(
        metadata.checksum,
        "486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7"
    );
}

#[test]
fn min_size_violation_rejects_the_write() {
    let (monitor, rados) = five_osd_cluster();
    monitor.create_pool("quorum", 3, 8, Some(3)).unwrap();
    monitor.set_osd_state(0, OsdState::Down).unwrap();
    monitor.set_osd_state(2, OsdState::Down).unwrap();
    monitor.set_osd_state(4, OsdState::Down).unwrap();

    let err = rados.put_object("quorum", "x", b"data".to_vec()).unwrap_err();
    match err {
        RadosError::ReplicationBelowMin { required, got } => {
            assert_eq!(required, 3);
            assert!(got < 3);
        }
        other => panic!("expected ReplicationBelowMin, got {other:?}"),
    }
    assert!(rados.get_object("quorum", "x").is_none());
    assert!(rados.list_objects("quorum").unwrap().is_empty());
}

#[test]
fn placement_is_deterministic_and_rack_diverse() {
    let monitor = Arc::new(Monitor::new());
    for id in 0..4u64 {
        monitor.add_osd(Arc::new(Osd::new(id, format!("./data/osd.{id}"), 1.0, "single-rack")));
    }
    monitor.create_pool("spread", 3, 16, None).unwrap();

    let pg_a = monitor.pg("0.3").unwrap();
    let pg_a_again = monitor.pg("0.3").unwrap();
    assert_eq!(pg_a.acting_set(), pg_a_again.acting_set());
    assert_eq!(pg_a.acting_set().len(), 3);
}

#[test]
fn read_fails_over_past_a_corrupted_replica() {
    let (monitor, rados) = five_osd_cluster();
    monitor.create_pool("default", 3, 8, None).unwrap();
    let result = rados.put_object("default", "doc", b"important".to_vec()).unwrap();

    let primary = monitor.osd(result.replicas[0]).unwrap();
    // Simulate bit rot out from under the metadata: same key, wrong bytes.
    let (_, mut metadata) = primary.retrieve_object(0, "doc").unwrap();
    metadata.checksum = "0".repeat(64);
    primary.store_object(0, "doc", b"corrupted".to_vec(), metadata).unwrap();

    let (bytes, _) = rados.get_object("default", "doc").unwrap();
    assert_eq!(bytes, b"important");
}

#[test]
fn pg_degrades_but_stays_active_when_one_osd_goes_down() {
    let (monitor, rados) = five_osd_cluster();
    monitor.create_pool("default", 3, 8, None).unwrap();
    let result = rados.put_object("default", "x", b"y".to_vec()).unwrap();

    let victim = result.replicas[0];
    monitor.set_osd_state(victim, OsdState::Down).unwrap();

    let pg = monitor.pg(&result.pg_id).unwrap();
    assert_ne!(pg.state, pool::PgState::Inactive);
    assert!(!pg.acting_set().contains(&victim));

    // The object is still readable from the remaining up replicas.
    assert!(rados.get_object("default", "x").is_some());
}

#[test]
fn delete_is_idempotent_and_does_not_move_the_epoch() {
    let (monitor, rados) = five_osd_cluster();
    monitor.create_pool("default", 3, 8, None).unwrap();
    rados.put_object("default", "x", b"y".to_vec()).unwrap();

    let epoch_before = monitor.cluster_status().epoch;
    assert!(rados.delete_object("default", "x"));
    assert!(!rados.delete_object("default", "x"));
    assert_eq!(monitor.cluster_status().epoch, epoch_before);
    assert!(rados.get_object("default", "x").is_none());
}
