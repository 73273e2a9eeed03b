use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use monitor::Monitor;
use osd::{ObjectMetadata, OsdState};
use pool::PgState;

use crate::error::{RadosError, Result};
use crate::types::{ObjectSummary, PutResult};

pub fn checksum_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// The replication protocol: routes object operations through pool ->
/// PG -> acting set, coordinating replicated writes, reads with
/// checksum-verified failover, and deletes.
///
/// `write_lock` is held for the duration of any
/// `put_object`/`delete_object` call, serializing mutations of a
/// pool's object table. Reads proceed without it, observing an atomic
/// snapshot via the monitor's own lock. Lock order is fixed: every
/// monitor call made while `write_lock` is held acquires and releases
/// the monitor's internal lock on its own, never the other way around,
/// so the two locks can never deadlock against each other.
pub struct Rados {
    monitor: Arc<Monitor>,
    write_lock: Mutex<()>,
}

impl Rados {
    pub fn new(monitor: Arc<Monitor>) -> Self {
        Self {
            monitor,
            write_lock: Mutex::new(()),
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn put_object(&self, pool_name: &str, object_id: &str, bytes: Vec<u8>) -> Result<PutResult> {
        let _guard = self.write_lock.lock().unwrap();

        let pool = self
            .monitor
            .pool_by_name(pool_name)
            .ok_or_else(|| RadosError::PoolNotFound(pool_name.to_string()))?;

        let pg_id = pool.pgid_for(object_id);
        let pg = self
            .monitor
            .pg(&pg_id)
            .ok_or_else(|| RadosError::PgMissing(pg_id.clone()))?;

        if pg.state == PgState::Inactive {
            return Err(RadosError::PgInactive(pg_id));
        }

        let metadata = ObjectMetadata {
            object_id: object_id.to_string(),
            pool_id: pool.pool_id,
            size_bytes: bytes.len() as u64,
            checksum: checksum_hex(&bytes),
            upload_time: chrono::Utc::now().to_rfc3339(),
            pg_id: pg_id.clone(),
        };

        let acting_set = pg.acting_set();
        debug!(pg_id, ?acting_set, "routing put");

        // Write replicas in parallel and gather every outcome before
        // checking min_size, so a slow OSD can't bias which replicas
        // get counted.
        let mut successes: Vec<u64> = std::thread::scope(|scope| {
            let handles: Vec<_> = acting_set
                .iter()
                .map(|&osd_id| {
                    let bytes = bytes.clone();
                    let metadata = metadata.clone();
                    let osd = self.monitor.osd(osd_id);
                    scope.spawn(move || match osd {
                        Some(osd) => match osd.store_object(pool.pool_id, object_id, bytes, metadata) {
                            Ok(()) => Some(osd_id),
                            Err(e) => {
                                warn!(osd_id, error = %e, "replica write failed");
                                None
                            }
                        },
                        None => {
                            warn!(osd_id, "acting set references unknown osd");
                            None
                        }
                    })
                })
                .collect();
            handles.into_iter().filter_map(|h| h.join().unwrap()).collect()
        });

        // Preserve acting-set order in the reported replica list, since
        // thread completion order isn't deterministic.
        successes.sort_by_key(|id| acting_set.iter().position(|x| x == id).unwrap());

        if successes.len() < pool.min_size as usize {
            // A write that doesn't reach min_size must not leave bytes
            // behind that a later read could stumble into, so clean up
            // every replica that did succeed before reporting failure.
            for &osd_id in &successes {
                if let Some(osd) = self.monitor.osd(osd_id) {
                    osd.delete_object(pool.pool_id, object_id);
                }
            }
            return Err(RadosError::ReplicationBelowMin {
                required: pool.min_size as usize,
                got: successes.len(),
            });
        }

        self.monitor
            .record_object(pool.pool_id, object_id.to_string(), metadata)?;

        Ok(PutResult {
            object_id: object_id.to_string(),
            pool: pool_name.to_string(),
            pg_id,
            replicas: successes,
            size_bytes: bytes.len() as u64,
        })
    }

    /// Read an object. Iterates the acting set in order, failing over
    /// to the next replica on a missing read or a checksum mismatch;
    /// returns the first replica whose bytes hash to the stored
    /// checksum. Absence is a result, not an error -- a missing object
    /// is a normal outcome callers branch on, not a failure.
    pub fn get_object(&self, pool_name: &str, object_id: &str) -> Option<(Vec<u8>, ObjectMetadata)> {
        let pool = self.monitor.pool_by_name(pool_name)?;
        let stored_metadata = self.monitor.object_metadata(pool.pool_id, object_id)?;

        let pg_id = pool.pgid_for(object_id);
        if pg_id != stored_metadata.pg_id {
            warn!(
                object_id,
                computed_pg = pg_id,
                stored_pg = stored_metadata.pg_id,
                "pg_id mismatch between placement and stored metadata"
            );
        }
        let pg = self.monitor.pg(&stored_metadata.pg_id)?;

        for osd_id in pg.acting_set() {
            let Some(osd) = self.monitor.osd(osd_id) else {
                continue;
            };
            let Some((bytes, metadata)) = osd.retrieve_object(pool.pool_id, object_id) else {
                continue;
            };
            if checksum_hex(&bytes) == metadata.checksum {
                return Some((bytes, metadata));
            }
            warn!(osd_id, object_id, "checksum mismatch on read, failing over");
        }
        None
    }

    /// Idempotent delete: deleting an object that doesn't exist (or a
    /// nonexistent pool) returns `false`.
    pub fn delete_object(&self, pool_name: &str, object_id: &str) -> bool {
        let _guard = self.write_lock.lock().unwrap();

        let Some(pool) = self.monitor.pool_by_name(pool_name) else {
            return false;
        };
        if self.monitor.object_metadata(pool.pool_id, object_id).is_none() {
            return false;
        }

        let pg_id = pool.pgid_for(object_id);
        if let Some(pg) = self.monitor.pg(&pg_id) {
            for osd_id in pg.acting_set() {
                if let Some(osd) = self.monitor.osd(osd_id) {
                    osd.delete_object(pool.pool_id, object_id);
                }
            }
        }

        self.monitor.remove_object(pool.pool_id, object_id)
    }

    pub fn list_objects(&self, pool_name: &str) -> Result<Vec<ObjectSummary>> {
        let pool = self
            .monitor
            .pool_by_name(pool_name)
            .ok_or_else(|| RadosError::PoolNotFound(pool_name.to_string()))?;

        let objects = self.monitor.list_pool_objects(pool.pool_id).unwrap_or_default();
        let mut summaries: Vec<ObjectSummary> = objects
            .into_iter()
            .map(|(_, metadata)| {
                let (healthy, total) = match self.monitor.pg(&metadata.pg_id) {
                    Some(pg) => {
                        let acting = pg.acting_set();
                        let healthy = acting
                            .iter()
                            .filter(|&&id| {
                                self.monitor
                                    .osd(id)
                                    .map(|o| o.state() == OsdState::Up)
                                    .unwrap_or(false)
                            })
                            .count();
                        (healthy, acting.len())
                    }
                    None => (0, 0),
                };
                ObjectSummary::from_metadata(&metadata, healthy, total)
            })
            .collect();
        summaries.sort_by(|a, b| a.object_id.cmp(&b.object_id));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cluster(racks: &[&str]) -> (Arc<Monitor>, Rados) {
        let monitor = Arc::new(Monitor::new());
        for (id, rack) in racks.iter().enumerate() {
            monitor.add_osd(Arc::new(osd::Osd::new(id as u64, format!("./data/osd.{id}"), 1.0, *rack)));
        }
        let rados = Rados::new(monitor.clone());
        (monitor, rados)
    }

    #[test]
    fn replicated_round_trip() {
        let (monitor, rados) = cluster(&["r1", "r1", "r2", "r2", "r3"]);
        monitor.create_pool("default", 3, 4, None).unwrap();

        let result = rados.put_object("default", "hello", b"world".to_vec()).unwrap();
        assert_eq!(result.replicas.len(), 3);

        let (bytes, metadata) = rados.get_object("default", "hello").unwrap();
        assert_eq!(bytes, b"world");
        assert_eq!(
            metadata.checksum,
            "486ea46224d1bb4fb680f34f7c9ad96a8f24ec88be73ea8e5a6c65260e9cb8a7"
        );
    }

    #[test]
    fn min_size_failure_leaves_pool_untouched() {
        let (monitor, rados) = cluster(&["r1", "r1", "r2", "r2", "r3"]);
        monitor.set_osd_state(0, OsdState::Down).unwrap();
        monitor.set_osd_state(2, OsdState::Down).unwrap();
        monitor.set_osd_state(4, OsdState::Down).unwrap();
        monitor.create_pool("tight", 3, 4, Some(3)).unwrap();

        let err = rados.put_object("tight", "x", b"y".to_vec()).unwrap_err();
        assert!(matches!(err, RadosError::ReplicationBelowMin { .. }));
        assert!(rados.get_object("tight", "x").is_none());
    }

    #[test]
    fn failover_read_on_corrupted_primary() {
        let (monitor, rados) = cluster(&["r1", "r1", "r2", "r2", "r3"]);
        monitor.create_pool("default", 3, 4, None).unwrap();
        let result = rados.put_object("default", "obj", b"payload".to_vec()).unwrap();

        let primary = result.replicas[0];
        let osd = monitor.osd(primary).unwrap();
        let corrupt_metadata = ObjectMetadata {
            object_id: "obj".to_string(),
            pool_id: 0,
            size_bytes: 4,
            checksum: "deadbeef".to_string(),
            upload_time: "now".to_string(),
            pg_id: result.pg_id.clone(),
        };
        osd.store_object(0, "obj", b"bad!".to_vec(), corrupt_metadata).unwrap();

        let (bytes, _) = rados.get_object("default", "obj").unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[test]
    fn delete_is_idempotent_and_object_is_gone() {
        let (monitor, rados) = cluster(&["r1", "r2", "r3"]);
        monitor.create_pool("default", 3, 4, None).unwrap();
        assert!(!rados.delete_object("default", "nope"));

        rados.put_object("default", "x", b"y".to_vec()).unwrap();
        assert!(rados.delete_object("default", "x"));
        assert!(rados.get_object("default", "x").is_none());
        assert!(!rados.delete_object("default", "x"));
    }

    #[test]
    fn list_objects_reports_replica_health() {
        let (monitor, rados) = cluster(&["r1", "r1", "r2", "r2", "r3"]);
        monitor.create_pool("default", 3, 4, None).unwrap();
        rados.put_object("default", "x", b"data".to_vec()).unwrap();

        let summaries = rados.list_objects("default").unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].total_replicas, 3);
        assert_eq!(summaries[0].healthy_replicas, 3);
    }

    #[test]
    fn put_fails_on_unknown_pool() {
        let (_monitor, rados) = cluster(&["r1"]);
        assert!(matches!(
            rados.put_object("ghost", "x", b"y".to_vec()),
            Err(RadosError::PoolNotFound(_))
        ));
    }
}
