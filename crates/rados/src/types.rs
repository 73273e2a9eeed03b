use osd::ObjectMetadata;
use serde::Serialize;

/// Result of a successful `put_object`.
#[derive(Debug, Clone, Serialize)]
pub struct PutResult {
    pub object_id: String,
    pub pool: String,
    pub pg_id: String,
    pub replicas: Vec<u64>,
    pub size_bytes: u64,
}

/// One row of `list_objects`.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    pub object_id: String,
    pub size_bytes: u64,
    pub upload_time: String,
    pub pg_id: String,
    pub healthy_replicas: usize,
    pub total_replicas: usize,
}

impl ObjectSummary {
    pub(crate) fn from_metadata(metadata: &ObjectMetadata, healthy_replicas: usize, total_replicas: usize) -> Self {
        Self {
            object_id: metadata.object_id.clone(),
            size_bytes: metadata.size_bytes,
            upload_time: metadata.upload_time.clone(),
            pg_id: metadata.pg_id.clone(),
            healthy_replicas,
            total_replicas,
        }
    }
}
