use crate::ids::RequestId;

/// Options carried by a `closefilerequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFileOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    /// The request ID returned by a prior `OpenFile`.
    pub open_request_id: RequestId,
}

impl CloseFileOptions {
    pub fn new(file_system_id: impl Into<String>, request_id: RequestId, open_request_id: RequestId) -> Self {
        Self { file_system_id: file_system_id.into(), request_id, open_request_id }
    }
}
