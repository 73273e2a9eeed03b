use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::{OsdError, Result};
use crate::types::{HeartbeatStatus, ObjectMetadata, OsdState};

#[derive(Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    metadata: ObjectMetadata,
}

/// A simulated Object Storage Daemon.
///
/// Owns byte storage keyed by `(pool_id, object_id)` plus the sibling
/// metadata blob, and reports its own up/down/out state. The contract
/// is that `store_object` and `retrieve_object` round-trip data and
/// metadata atomically -- both present or neither.
///
/// All mutable state lives behind `Mutex` so `Osd` can be shared as
/// `Arc<Osd>` across the monitor's OSD map and concurrent RADOS
/// replica writes without an outer lock.
pub struct Osd {
    osd_id: u64,
    data_path: String,
    weight: f64,
    rack: String,
    state: Mutex<OsdState>,
    last_heartbeat: Mutex<SystemTime>,
    pg_assignments: Mutex<HashSet<String>>,
    objects: Mutex<HashMap<(u64, String), StoredObject>>,
}

impl Osd {
    pub fn new(osd_id: u64, data_path: impl Into<String>, weight: f64, rack: impl Into<String>) -> Self {
        Self {
            osd_id,
            data_path: data_path.into(),
            weight,
            rack: rack.into(),
            state: Mutex::new(OsdState::Up),
            last_heartbeat: Mutex::new(SystemTime::now()),
            pg_assignments: Mutex::new(HashSet::new()),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn osd_id(&self) -> u64 {
        self.osd_id
    }

    pub fn data_path(&self) -> &str {
        &self.data_path
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn rack(&self) -> &str {
        &self.rack
    }

    pub fn state(&self) -> OsdState {
        *self.state.lock().unwrap()
    }

    pub fn set_state(&self, state: OsdState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn pg_assignments(&self) -> HashSet<String> {
        self.pg_assignments.lock().unwrap().clone()
    }

    /// Replace the set of PGs this OSD is assigned to. Called only by
    /// the monitor while it holds the monitor lock, after recomputing
    /// placement for the whole cluster.
    pub fn set_pg_assignments(&self, pgs: HashSet<String>) {
        *self.pg_assignments.lock().unwrap() = pgs;
    }

    /// Store object bytes plus metadata. Fails with `NotUp` if this OSD
    /// isn't currently `up`. Never fails with an I/O error in this
    /// in-memory implementation, but the error variant is kept so
    /// callers already handle the case a real backing store can hit.
    pub fn store_object(
        &self,
        pool_id: u64,
        object_id: &str,
        bytes: Vec<u8>,
        metadata: ObjectMetadata,
    ) -> Result<()> {
        if self.state() != OsdState::Up {
            return Err(OsdError::NotUp(self.osd_id));
        }
        self.objects.lock().unwrap().insert(
            (pool_id, object_id.to_string()),
            StoredObject { bytes, metadata },
        );
        debug!(osd_id = self.osd_id, pool_id, object_id, "stored object");
        Ok(())
    }

    /// Retrieve object bytes plus metadata. Returns `None` (never
    /// propagates an error) when the OSD is not `up`, the object is
    /// absent, or the backing store reports an error -- the caller is
    /// expected to fail over to the next replica in the acting set.
    pub fn retrieve_object(&self, pool_id: u64, object_id: &str) -> Option<(Vec<u8>, ObjectMetadata)> {
        if self.state() != OsdState::Up {
            return None;
        }
        let found = self
            .objects
            .lock()
            .unwrap()
            .get(&(pool_id, object_id.to_string()))
            .map(|stored| (stored.bytes.clone(), stored.metadata.clone()));
        if found.is_none() {
            warn!(osd_id = self.osd_id, pool_id, object_id, "object not found");
        }
        found
    }

    /// Idempotent delete: removing a missing object still returns true.
    pub fn delete_object(&self, pool_id: u64, object_id: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .remove(&(pool_id, object_id.to_string()));
        true
    }

    pub fn heartbeat(&self) -> HeartbeatStatus {
        let now = SystemTime::now();
        *self.last_heartbeat.lock().unwrap() = now;
        HeartbeatStatus {
            osd_id: self.osd_id,
            state: self.state(),
            rack: self.rack.clone(),
            weight: self.weight,
            timestamp: now,
        }
    }

    pub fn last_heartbeat(&self) -> SystemTime {
        *self.last_heartbeat.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(object_id: &str) -> ObjectMetadata {
        ObjectMetadata {
            object_id: object_id.to_string(),
            pool_id: 0,
            size_bytes: 5,
            checksum: "deadbeef".to_string(),
            upload_time: "2026-01-01T00:00:00Z".to_string(),
            pg_id: "0.0".to_string(),
        }
    }

    #[test]
    fn store_then_retrieve_round_trips() {
        let osd = Osd::new(0, "./data/osd.0", 1.0, "r1");
        osd.store_object(0, "hello", b"world".to_vec(), meta("hello")).unwrap();
        let (bytes, metadata) = osd.retrieve_object(0, "hello").unwrap();
        assert_eq!(bytes, b"world");
        assert_eq!(metadata.object_id, "hello");
    }

    #[test]
    fn store_fails_when_not_up() {
        let osd = Osd::new(0, "./data/osd.0", 1.0, "r1");
        osd.set_state(OsdState::Down);
        assert!(osd.store_object(0, "x", vec![], meta("x")).is_err());
    }

    #[test]
    fn retrieve_returns_none_when_not_up() {
        let osd = Osd::new(0, "./data/osd.0", 1.0, "r1");
        osd.store_object(0, "x", b"y".to_vec(), meta("x")).unwrap();
        osd.set_state(OsdState::Down);
        assert!(osd.retrieve_object(0, "x").is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let osd = Osd::new(0, "./data/osd.0", 1.0, "r1");
        assert!(osd.delete_object(0, "missing"));
        osd.store_object(0, "x", b"y".to_vec(), meta("x")).unwrap();
        assert!(osd.delete_object(0, "x"));
        assert!(osd.delete_object(0, "x"));
        assert!(osd.retrieve_object(0, "x").is_none());
    }
}
