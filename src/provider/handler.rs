use crate::dispatch::{
    AbortRequestedEvent, CloseFileRequestedEvent, GetMetadataRequestedEvent,
    OpenFileRequestedEvent, ReadDirectoryRequestedEvent, ReadFileRequestedEvent,
    UnmountRequestedEvent,
};

/// The scripted consumer's event surface: one method per non-`Mount` request kind,
/// mirroring the host's one-slot-per-event-name contract as a single trait object
/// rather than seven separately registered callbacks.
pub trait FileSystemProviderHandler: Send + Sync {
    fn on_unmount_requested(&self, event: UnmountRequestedEvent);
    fn on_get_metadata_requested(&self, event: GetMetadataRequestedEvent);
    fn on_read_directory_requested(&self, event: ReadDirectoryRequestedEvent);
    fn on_open_file_requested(&self, event: OpenFileRequestedEvent);
    fn on_close_file_requested(&self, event: CloseFileRequestedEvent);
    fn on_read_file_requested(&self, event: ReadFileRequestedEvent);
    fn on_abort_requested(&self, event: AbortRequestedEvent);
}
