use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// OSD admin/operational state.
///
/// Closed, tagged variant rather than a stringly-typed field; the
/// `Display`/`FromStr` impls give callers a deterministic string
/// projection for the external interface without leaking the enum's
/// shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsdState {
    Up,
    Down,
    Out,
}

impl OsdState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsdState::Up => "up",
            OsdState::Down => "down",
            OsdState::Out => "out",
        }
    }
}

impl std::fmt::Display for OsdState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OsdState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "up" => Ok(OsdState::Up),
            "down" => Ok(OsdState::Down),
            "out" => Ok(OsdState::Out),
            other => Err(format!("invalid OSD state: {other}")),
        }
    }
}

/// On-disk (here: in-memory) object metadata: field names and
/// SHA-256 hex encoding match what's persisted alongside the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub object_id: String,
    pub pool_id: u64,
    pub size_bytes: u64,
    pub checksum: String,
    pub upload_time: String,
    pub pg_id: String,
}

/// Snapshot returned by `Osd::heartbeat`.
#[derive(Debug, Clone, Serialize)]
pub struct HeartbeatStatus {
    pub osd_id: u64,
    pub state: OsdState,
    pub rack: String,
    pub weight: f64,
    #[serde(skip)]
    pub timestamp: SystemTime,
}

/// Construction-time seed for one bootstrap OSD. This is plain
/// configuration, not a running daemon -- `build()` turns it into the
/// `Osd` the monitor will actually track.
#[derive(Debug, Clone)]
pub struct OsdSeed {
    pub osd_id: u64,
    pub rack: String,
    pub weight: f64,
    pub data_path: String,
}

impl OsdSeed {
    pub fn new(osd_id: u64, rack: impl Into<String>) -> Self {
        let rack = rack.into();
        Self {
            data_path: format!("./data/osd.{osd_id}"),
            osd_id,
            rack,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn build(&self) -> crate::store::Osd {
        crate::store::Osd::new(self.osd_id, self.data_path.clone(), self.weight, self.rack.clone())
    }
}
