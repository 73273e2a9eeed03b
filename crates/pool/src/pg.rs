use std::collections::HashSet;

use serde::Serialize;

/// Derived PG state. `Recovering` is reserved -- placement never
/// assigns it, but the variant exists so downstream consumers (and
/// future recovery work) have somewhere to put it without a breaking
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PgState {
    Inactive,
    ActiveClean,
    ActiveDegraded,
    Recovering,
}

impl PgState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PgState::Inactive => "inactive",
            PgState::ActiveClean => "active+clean",
            PgState::ActiveDegraded => "active+degraded",
            PgState::Recovering => "recovering",
        }
    }
}

impl std::fmt::Display for PgState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A placement group: the unit of placement, owned and re-mapped by the
/// monitor, consulted by RADOS to find the acting set for an object.
/// A PG never executes operations itself.
#[derive(Debug, Clone)]
pub struct PlacementGroup {
    pub pgid: String,
    pub pool_id: u64,
    pub primary_osd: Option<u64>,
    pub replica_osds: Vec<u64>,
    pub state: PgState,
    pub objects: HashSet<String>,
}

impl PlacementGroup {
    pub fn new(pgid: impl Into<String>, pool_id: u64) -> Self {
        Self {
            pgid: pgid.into(),
            pool_id,
            primary_osd: None,
            replica_osds: Vec::new(),
            state: PgState::Inactive,
            objects: HashSet::new(),
        }
    }

    /// `[primary] ++ replicas`, or empty if no primary is assigned.
    pub fn acting_set(&self) -> Vec<u64> {
        match self.primary_osd {
            Some(primary) => {
                let mut set = Vec::with_capacity(1 + self.replica_osds.len());
                set.push(primary);
                set.extend(self.replica_osds.iter().copied());
                set
            }
            None => Vec::new(),
        }
    }

    /// Apply a freshly-computed acting set (ordered, primary first) and
    /// derive `state` from it. `pool_size` is the owning pool's
    /// declared replica count; `all_up` tells us whether every member
    /// of `acting` is currently `up` (callers compute this from the
    /// same OSD map snapshot used to produce `acting`).
    pub fn apply_acting_set(&mut self, acting: Vec<u64>, pool_size: u32, all_up: bool) {
        self.state = if acting.is_empty() {
            PgState::Inactive
        } else if acting.len() as u32 == pool_size && all_up {
            PgState::ActiveClean
        } else {
            PgState::ActiveDegraded
        };
        self.primary_osd = acting.first().copied();
        self.replica_osds = acting.into_iter().skip(1).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acting_set_empty_without_primary() {
        let pg = PlacementGroup::new("0.0", 0);
        assert!(pg.acting_set().is_empty());
    }

    #[test]
    fn acting_set_orders_primary_first() {
        let mut pg = PlacementGroup::new("0.0", 0);
        pg.apply_acting_set(vec![2, 0, 1], 3, true);
        assert_eq!(pg.acting_set(), vec![2, 0, 1]);
        assert_eq!(pg.state, PgState::ActiveClean);
    }

    #[test]
    fn degraded_when_short_or_not_all_up() {
        let mut pg = PlacementGroup::new("0.0", 0);
        pg.apply_acting_set(vec![0, 1], 3, true);
        assert_eq!(pg.state, PgState::ActiveDegraded);

        let mut pg2 = PlacementGroup::new("0.1", 0);
        pg2.apply_acting_set(vec![0, 1, 2], 3, false);
        assert_eq!(pg2.state, PgState::ActiveDegraded);
    }

    #[test]
    fn inactive_when_empty() {
        let mut pg = PlacementGroup::new("0.0", 0);
        pg.apply_acting_set(vec![], 3, true);
        assert_eq!(pg.state, PgState::Inactive);
    }
}
