use crate::ids::RequestId;

/// Options carried by a `getmetadatarequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMetadataOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    pub entry_path: String,
}

impl GetMetadataOptions {
    pub fn new(
        file_system_id: impl Into<String>,
        request_id: RequestId,
        entry_path: impl Into<String>,
    ) -> Self {
        Self { file_system_id: file_system_id.into(), request_id, entry_path: entry_path.into() }
    }
}
