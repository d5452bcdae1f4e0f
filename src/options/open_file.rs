use crate::ids::RequestId;

/// The two modes a `Provider` can be asked to open a file in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpenMode {
    Read,
    Write,
}

/// Options carried by an `openfilerequested` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFileOptions {
    pub file_system_id: String,
    pub request_id: RequestId,
    pub file_path: String,
    pub mode: OpenMode,
}

impl OpenFileOptions {
    pub fn new(
        file_system_id: impl Into<String>,
        request_id: RequestId,
        file_path: impl Into<String>,
        mode: OpenMode,
    ) -> Self {
        Self { file_system_id: file_system_id.into(), request_id, file_path: file_path.into(), mode }
    }
}
