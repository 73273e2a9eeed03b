use std::collections::HashMap;

use osd::ObjectMetadata;

use crate::error::{PoolError, Result};

/// A named namespace with its own replication policy and set of PGs.
/// The monitor owns the canonical `Pool` instance; RADOS consults it
/// by name to route object operations.
#[derive(Debug, Clone)]
pub struct Pool {
    pub pool_id: u64,
    pub name: String,
    pub size: u32,
    pub min_size: u32,
    pub pg_num: u32,
    pub objects: HashMap<String, ObjectMetadata>,
}

impl Pool {
    pub fn new(pool_id: u64, name: impl Into<String>, size: u32, min_size: u32, pg_num: u32) -> Result<Self> {
        if min_size < 1 || min_size > size {
            return Err(PoolError::InvalidSize { size, min_size });
        }
        Ok(Self {
            pool_id,
            name: name.into(),
            size,
            min_size,
            pg_num,
            objects: HashMap::new(),
        })
    }

    /// `pg_index(object_id) = stable_hash(object_id) mod pg_num`. Uses
    /// the same canonical hash as placement so an object's PG never
    /// moves across a restart.
    pub fn pg_index(&self, object_id: &str) -> u32 {
        (crush::stable_hash64(object_id) % self.pg_num as u64) as u32
    }

    pub fn pgid_for(&self, object_id: &str) -> String {
        format!("{}.{}", self.pool_id, self.pg_index(object_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_min_size_above_size() {
        assert!(Pool::new(0, "p", 3, 4, 8).is_err());
    }

    #[test]
    fn rejects_min_size_zero() {
        assert!(Pool::new(0, "p", 3, 0, 8).is_err());
    }

    #[test]
    fn accepts_min_size_equal_to_size() {
        assert!(Pool::new(0, "p", 3, 3, 8).is_ok());
    }

    #[test]
    fn pg_index_is_stable() {
        let pool = Pool::new(0, "p", 3, 2, 64).unwrap();
        assert_eq!(pool.pg_index("hello"), pool.pg_index("hello"));
        assert!(pool.pg_index("hello") < 64);
    }
}
