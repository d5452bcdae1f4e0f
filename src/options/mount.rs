use crate::ids::RequestId;

/// Options for a `mount` call. Handled directly by the provider facade and the
/// native service; never dispatched as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountOptions {
    pub file_system_id: String,
    pub display_name: String,
    pub writable: bool,
    /// `0` means no explicit limit.
    pub opened_files_limit: u32,
    pub request_id: RequestId,
}

impl MountOptions {
    /// Builds options with the defaults the source applies when a field is omitted:
    /// not writable, no opened-files limit.
    pub fn new(
        file_system_id: impl Into<String>,
        display_name: impl Into<String>,
        request_id: RequestId,
    ) -> Self {
        Self {
            file_system_id: file_system_id.into(),
            display_name: display_name.into(),
            writable: false,
            opened_files_limit: 0,
            request_id,
        }
    }
}
