use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use tracing::info;

use crush::{select_osds, OsdCandidate};
use osd::{HeartbeatStatus, ObjectMetadata, Osd, OsdState};
use pool::{PlacementGroup, Pool};

use crate::error::{MonitorError, Result};
use crate::types::{ClusterConfig, ClusterStatus, DetailedStatus, OsdSummary, PoolSummary};

/// Everything the monitor lock protects. A single `RwLock` around this
/// struct is the whole of that lock: any topology-changing call takes
/// a write guard for its entire duration, so the map update and the
/// epoch bump are never observable apart -- a reader never sees a new
/// epoch with a stale placement, or vice versa.
struct ClusterMap {
    osds: HashMap<u64, Arc<Osd>>,
    pools: HashMap<u64, Pool>,
    pool_ids_by_name: HashMap<String, u64>,
    pgs: HashMap<String, PlacementGroup>,
    epoch: u64,
    next_pool_id: u64,
}

impl ClusterMap {
    fn new() -> Self {
        Self {
            osds: HashMap::new(),
            pools: HashMap::new(),
            pool_ids_by_name: HashMap::new(),
            pgs: HashMap::new(),
            epoch: 0,
            next_pool_id: 0,
        }
    }
}

/// Sole owner of the cluster map: OSDs, pools, PGs, and the map epoch.
/// Every mutator recomputes PG -> OSD placement synchronously before
/// returning.
pub struct Monitor {
    inner: RwLock<ClusterMap>,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ClusterMap::new()),
        }
    }

    /// Materialize a `Monitor` from a construction-time topology: add
    /// every seeded OSD, then create every seeded pool, in the order
    /// given. Used by operator surfaces (e.g. `radosd`) instead of
    /// hand-rolling the add_osd/create_pool calls.
    pub fn bootstrap(config: ClusterConfig) -> Result<Self> {
        let monitor = Self::new();
        for seed in &config.osds {
            monitor.add_osd(Arc::new(seed.build()));
        }
        for seed in &config.pools {
            monitor.create_pool(&seed.name, seed.size, seed.pg_num, seed.min_size)?;
        }
        Ok(monitor)
    }

    pub fn add_osd(&self, osd: Arc<Osd>) {
        let mut map = self.inner.write().unwrap();
        map.osds.insert(osd.osd_id(), osd);
        recompute_pg_mappings(&mut map);
        map.epoch += 1;
        info!(epoch = map.epoch, "osd added");
    }

    pub fn remove_osd(&self, osd_id: u64) -> Result<()> {
        let mut map = self.inner.write().unwrap();
        let osd = map
            .osds
            .get(&osd_id)
            .cloned()
            .ok_or(MonitorError::OsdNotFound(osd_id))?;
        osd.set_state(OsdState::Out);
        recompute_pg_mappings(&mut map);
        map.epoch += 1;
        info!(osd_id, epoch = map.epoch, "osd removed (set out)");
        Ok(())
    }

    pub fn set_osd_state(&self, osd_id: u64, state: OsdState) -> Result<()> {
        let mut map = self.inner.write().unwrap();
        let osd = map
            .osds
            .get(&osd_id)
            .cloned()
            .ok_or(MonitorError::OsdNotFound(osd_id))?;
        osd.set_state(state);
        recompute_pg_mappings(&mut map);
        map.epoch += 1;
        info!(osd_id, %state, epoch = map.epoch, "osd state changed");
        Ok(())
    }

    /// Create a pool and materialize its `pg_num` PGs. `min_size`
    /// defaults to `min(2, size)` when not given; pass an explicit
    /// value to require a different minimum (e.g. a pool that refuses
    /// to write below full replication).
    pub fn create_pool(
        &self,
        name: &str,
        size: u32,
        pg_num: u32,
        min_size: Option<u32>,
    ) -> Result<u64> {
        let mut map = self.inner.write().unwrap();
        if map.pool_ids_by_name.contains_key(name) {
            return Err(MonitorError::DuplicatePool(name.to_string()));
        }
        let min_size = min_size.unwrap_or_else(|| size.min(2));
        let pool_id = map.next_pool_id;
        let pool = Pool::new(pool_id, name, size, min_size, pg_num)?;
        map.next_pool_id += 1;
        map.pool_ids_by_name.insert(name.to_string(), pool_id);
        map.pools.insert(pool_id, pool);
        for idx in 0..pg_num {
            let pgid = format!("{pool_id}.{idx}");
            map.pgs.insert(pgid.clone(), PlacementGroup::new(pgid, pool_id));
        }
        recompute_pg_mappings(&mut map);
        map.epoch += 1;
        info!(pool_id, name, epoch = map.epoch, "pool created");
        Ok(pool_id)
    }

    pub fn process_heartbeat(&self, osd_id: u64) -> Option<HeartbeatStatus> {
        let map = self.inner.read().unwrap();
        map.osds.get(&osd_id).map(|o| o.heartbeat())
    }

    pub fn cluster_status(&self) -> ClusterStatus {
        let map = self.inner.read().unwrap();
        build_cluster_status(&map)
    }

    pub fn detailed_status(&self) -> DetailedStatus {
        let map = self.inner.read().unwrap();
        let status = build_cluster_status(&map);

        let mut pools: Vec<PoolSummary> = map
            .pools
            .values()
            .map(|p| PoolSummary {
                id: p.pool_id,
                name: p.name.clone(),
                size: p.size,
                min_size: p.min_size,
                pg_num: p.pg_num,
                objects: p.objects.len(),
            })
            .collect();
        pools.sort_by_key(|p| p.id);

        let mut osds: Vec<OsdSummary> = map
            .osds
            .values()
            .map(|o| OsdSummary {
                id: o.osd_id(),
                state: o.state().to_string(),
                rack: o.rack().to_string(),
                weight: o.weight(),
                pgs: o.pg_assignments().len(),
            })
            .collect();
        osds.sort_by_key(|o| o.id);

        let mut pg_states: HashMap<String, usize> = HashMap::new();
        for pg in map.pgs.values() {
            *pg_states.entry(pg.state.to_string()).or_insert(0) += 1;
        }

        DetailedStatus {
            status,
            pools,
            osds,
            pg_states,
        }
    }

    pub fn pool_by_name(&self, name: &str) -> Option<Pool> {
        let map = self.inner.read().unwrap();
        let id = map.pool_ids_by_name.get(name)?;
        map.pools.get(id).cloned()
    }

    pub fn pg(&self, pgid: &str) -> Option<PlacementGroup> {
        self.inner.read().unwrap().pgs.get(pgid).cloned()
    }

    pub fn osd(&self, osd_id: u64) -> Option<Arc<Osd>> {
        self.inner.read().unwrap().osds.get(&osd_id).cloned()
    }

    /// Record a successfully-replicated object in pool and PG bookkeeping.
    /// Does not bump the epoch: object operations don't change topology.
    pub fn record_object(&self, pool_id: u64, object_id: String, metadata: ObjectMetadata) -> Result<()> {
        let mut map = self.inner.write().unwrap();
        let pgid = map
            .pools
            .get(&pool_id)
            .ok_or(MonitorError::PoolNotFound(pool_id))?
            .pgid_for(&object_id);
        map.pools
            .get_mut(&pool_id)
            .ok_or(MonitorError::PoolNotFound(pool_id))?
            .objects
            .insert(object_id.clone(), metadata);
        if let Some(pg) = map.pgs.get_mut(&pgid) {
            pg.objects.insert(object_id);
        }
        Ok(())
    }

    /// Remove an object's bookkeeping. Returns `false` if the pool or
    /// the object within it doesn't exist.
    pub fn remove_object(&self, pool_id: u64, object_id: &str) -> bool {
        let mut map = self.inner.write().unwrap();
        let pgid = match map.pools.get(&pool_id) {
            Some(pool) if pool.objects.contains_key(object_id) => pool.pgid_for(object_id),
            _ => return false,
        };
        map.pools.get_mut(&pool_id).unwrap().objects.remove(object_id);
        if let Some(pg) = map.pgs.get_mut(&pgid) {
            pg.objects.remove(object_id);
        }
        true
    }

    pub fn object_metadata(&self, pool_id: u64, object_id: &str) -> Option<ObjectMetadata> {
        let map = self.inner.read().unwrap();
        map.pools.get(&pool_id)?.objects.get(object_id).cloned()
    }

    pub fn list_pool_objects(&self, pool_id: u64) -> Option<Vec<(String, ObjectMetadata)>> {
        let map = self.inner.read().unwrap();
        let pool = map.pools.get(&pool_id)?;
        Some(pool.objects.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

fn build_cluster_status(map: &ClusterMap) -> ClusterStatus {
    let osds_total = map.osds.len();
    let osds_up = map.osds.values().filter(|o| o.state() == OsdState::Up).count();
    let pgs_total = map.pgs.len();
    let pgs_active_clean = map
        .pgs
        .values()
        .filter(|pg| pg.state == pool::PgState::ActiveClean)
        .count();
    let pgs_degraded = map
        .pgs
        .values()
        .filter(|pg| pg.state == pool::PgState::ActiveDegraded)
        .count();

    let health = if pgs_active_clean == pgs_total && osds_up == osds_total {
        "HEALTH_OK"
    } else {
        "HEALTH_WARN"
    };

    ClusterStatus {
        health,
        osds_up,
        osds_total,
        pgs_total,
        pgs_active_clean,
        pgs_degraded,
        pools: map.pools.len(),
        epoch: map.epoch,
    }
}

/// Recompute every PG's acting set from the current `up` OSD snapshot,
/// then update every OSD's `pg_assignments` to match. Placement only
/// ever draws from OSDs already filtered to `up`, so a
/// freshly-recomputed acting set can never contain a down or out OSD
/// by construction.
fn recompute_pg_mappings(map: &mut ClusterMap) {
    let up_osds: Vec<OsdCandidate> = map
        .osds
        .values()
        .filter(|o| o.state() == OsdState::Up)
        .map(|o| OsdCandidate::new(o.osd_id(), o.rack()))
        .collect();

    let mut assignments: HashMap<u64, HashSet<String>> = HashMap::new();

    for pg in map.pgs.values_mut() {
        let Some(pool) = map.pools.get(&pg.pool_id) else {
            continue;
        };
        let selected = select_osds(&pg.pgid, pool.size as usize, &up_osds).unwrap_or_default();
        for osd_id in &selected {
            assignments.entry(*osd_id).or_default().insert(pg.pgid.clone());
        }
        pg.apply_acting_set(selected, pool.size, true);
    }

    for osd in map.osds.values() {
        let pgs = assignments.remove(&osd.osd_id()).unwrap_or_default();
        osd.set_pg_assignments(pgs);
    }
}
