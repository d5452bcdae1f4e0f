use crate::ids::RequestId;

/// Options carried by a `readdirectoryrequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadDirectoryOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    pub directory_path: String,
}

impl ReadDirectoryOptions {
    pub fn new(
        file_system_id: impl Into<String>,
        request_id: RequestId,
        directory_path: impl Into<String>,
    ) -> Self {
        Self {
            file_system_id: file_system_id.into(),
            request_id,
            directory_path: directory_path.into(),
        }
    }
}
