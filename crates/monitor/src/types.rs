use std::collections::HashMap;

use osd::OsdSeed;
use serde::Serialize;

/// Aggregated cluster health, as returned by `Monitor::cluster_status`.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStatus {
    pub health: &'static str,
    pub osds_up: usize,
    pub osds_total: usize,
    pub pgs_total: usize,
    pub pgs_active_clean: usize,
    pub pgs_degraded: usize,
    pub pools: usize,
    pub epoch: u64,
}

/// Per-pool row in `DetailedStatus`.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub id: u64,
    pub name: String,
    pub size: u32,
    pub min_size: u32,
    pub pg_num: u32,
    pub objects: usize,
}

/// Per-OSD row in `DetailedStatus`.
#[derive(Debug, Clone, Serialize)]
pub struct OsdSummary {
    pub id: u64,
    pub state: String,
    pub rack: String,
    pub weight: f64,
    pub pgs: usize,
}

/// Extended status record: aggregated health plus pools, OSDs, and a
/// histogram of PG states.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedStatus {
    pub status: ClusterStatus,
    pub pools: Vec<PoolSummary>,
    pub osds: Vec<OsdSummary>,
    pub pg_states: HashMap<String, usize>,
}

/// Construction-time seed for one bootstrap pool.
#[derive(Debug, Clone)]
pub struct PoolSeed {
    pub name: String,
    pub size: u32,
    pub min_size: Option<u32>,
    pub pg_num: u32,
}

impl PoolSeed {
    pub fn new(name: impl Into<String>, size: u32, pg_num: u32) -> Self {
        Self {
            name: name.into(),
            size,
            min_size: None,
            pg_num,
        }
    }

    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = Some(min_size);
        self
    }
}

/// Construction-time cluster topology: a plain struct an operator
/// surface (e.g. `radosd`) assembles from CLI flags or defaults and
/// feeds to `Monitor::bootstrap`.
#[derive(Debug, Clone, Default)]
pub struct ClusterConfig {
    pub osds: Vec<OsdSeed>,
    pub pools: Vec<PoolSeed>,
}
