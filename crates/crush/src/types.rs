/// A placement candidate: an OSD the placement function is allowed to
/// choose from. Callers build this snapshot from the monitor's OSD map,
/// already filtered to OSDs in the `up` state -- `down`/`out` OSDs must
/// never appear here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsdCandidate {
    pub osd_id: u64,
    pub rack: String,
}

impl OsdCandidate {
    pub fn new(osd_id: u64, rack: impl Into<String>) -> Self {
        Self {
            osd_id,
            rack: rack.into(),
        }
    }
}
