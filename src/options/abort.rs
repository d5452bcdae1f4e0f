use crate::ids::RequestId;

/// Options carried by an `abortrequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    /// The ID of the in-flight request this abort targets.
    pub operation_request_id: RequestId,
}

impl AbortOptions {
    pub fn new(
        file_system_id: impl Into<String>,
        request_id: RequestId,
        operation_request_id: RequestId,
    ) -> Self {
        Self { file_system_id: file_system_id.into(), request_id, operation_request_id }
    }
}
