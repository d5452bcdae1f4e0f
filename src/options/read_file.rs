use crate::ids::RequestId;

/// Options carried by a `readfilerequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFileOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    /// The request ID returned by a prior `OpenFile`.
    pub open_request_id: RequestId,
    pub offset: u64,
    pub length: u64,
}

impl ReadFileOptions {
    pub fn new(
        file_system_id: impl Into<String>,
        request_id: RequestId,
        open_request_id: RequestId,
        offset: u64,
        length: u64,
    ) -> Self {
        Self {
            file_system_id: file_system_id.into(),
            request_id,
            open_request_id,
            offset,
            length,
        }
    }
}
