//! CRUSH-lite: a deterministic, rack-aware placement function.
//!
//! `select_osds` is a pure function: given a pgid and the current
//! snapshot of `up` OSDs, it returns an ordered OSD list of length <=
//! `replicas`, preferring one OSD per distinct rack before falling
//! back to any remaining `up` OSD.
//!
//! Determinism is load-bearing: the same `(pgid, replicas, up_osds)`
//! triple must always produce the same output, on any platform, in
//! any process -- two monitors independently recomputing placement
//! for the same map have to agree without talking to each other. We
//! get there by never touching the thread-local or process-global
//! RNG -- every call constructs its own `StdRng` seeded from
//! [`crate::hash::stable_hash64`] -- and by never iterating a `HashMap`
//! directly: racks and within-rack OSD ids are sorted before the seeded
//! shuffle runs, so the result doesn't depend on the order the caller
//! happened to list OSDs in.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{CrushError, Result};
use crate::hash::stable_hash64;
use crate::types::OsdCandidate;

/// Select up to `replicas` OSDs for `pgid` from the given snapshot of
/// `up` OSDs. The first `min(replicas, distinct_racks)` entries are
/// guaranteed to come from distinct racks. Returns fewer than
/// `replicas` entries if there are not enough distinct `up` OSDs.
pub fn select_osds(pgid: &str, replicas: usize, up_osds: &[OsdCandidate]) -> Result<Vec<u64>> {
    if replicas == 0 {
        return Err(CrushError::InvalidReplicaCount(replicas));
    }
    if up_osds.is_empty() {
        return Ok(Vec::new());
    }

    let mut rng = StdRng::seed_from_u64(stable_hash64(pgid));

    let mut by_rack: BTreeMap<&str, Vec<u64>> = BTreeMap::new();
    for osd in up_osds {
        by_rack.entry(osd.rack.as_str()).or_default().push(osd.osd_id);
    }
    for ids in by_rack.values_mut() {
        ids.sort_unstable();
    }

    let mut rack_order: Vec<&str> = by_rack.keys().copied().collect();
    rack_order.shuffle(&mut rng);

    let mut selected: Vec<u64> = Vec::with_capacity(replicas);
    for rack in rack_order {
        if selected.len() >= replicas {
            break;
        }
        let candidates = &by_rack[rack];
        if let Some(&osd_id) = candidates.choose(&mut rng) {
            selected.push(osd_id);
        }
    }

    if selected.len() < replicas {
        let mut remaining: Vec<u64> = up_osds
            .iter()
            .map(|o| o.osd_id)
            .filter(|id| !selected.contains(id))
            .collect();
        remaining.sort_unstable();
        remaining.shuffle(&mut rng);
        let needed = replicas - selected.len();
        selected.extend(remaining.into_iter().take(needed));
    }

    selected.truncate(replicas);
    Ok(selected)
}
