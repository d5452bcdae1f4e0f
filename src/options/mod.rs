//! Typed, kind-tagged input payloads — one variant per request kind.
//!
//! Each variant extends a common base of `file_system_id`/`request_id`. Options are
//! built field-by-field by the native service and become logically immutable once
//! handed to [`crate::dispatch::EventDispatcher::fire`].

mod abort;
mod close_file;
mod get_metadata;
mod mount;
mod open_file;
mod read_directory;
mod read_file;
mod unmount;

pub use abort::AbortOptions;
pub use close_file::CloseFileOptions;
pub use get_metadata::GetMetadataOptions;
pub use mount::MountOptions;
pub use open_file::{OpenFileOptions, OpenMode};
pub use read_directory::ReadDirectoryOptions;
pub use read_file::ReadFileOptions;
pub use unmount::UnmountOptions;

use crate::ids::RequestId;
use crate::kind::RequestKind;

/// The closed union of per-kind request option payloads.
///
/// `Mount` is intentionally absent: mounting is handled directly by the provider
/// facade and never flows through [`crate::manager::RequestManager`] (see §4.5 of
/// the design).
#[derive(Debug, Clone, PartialEq)]
pub enum RequestedOptions {
    Unmount(UnmountOptions),
    GetMetadata(GetMetadataOptions),
    ReadDirectory(ReadDirectoryOptions),
    OpenFile(OpenFileOptions),
    CloseFile(CloseFileOptions),
    ReadFile(ReadFileOptions),
    Abort(AbortOptions),
}

impl RequestedOptions {
    /// The request kind this payload was built for.
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestedOptions::Unmount(_) => RequestKind::Unmount,
            RequestedOptions::GetMetadata(_) => RequestKind::GetMetadata,
            RequestedOptions::ReadDirectory(_) => RequestKind::ReadDirectory,
            RequestedOptions::OpenFile(_) => RequestKind::OpenFile,
            RequestedOptions::CloseFile(_) => RequestKind::CloseFile,
            RequestedOptions::ReadFile(_) => RequestKind::ReadFile,
            RequestedOptions::Abort(_) => RequestKind::Abort,
        }
    }

    /// The filesystem this request targets.
    pub fn file_system_id(&self) -> &str {
        match self {
            RequestedOptions::Unmount(o) => &o.file_system_id,
            RequestedOptions::GetMetadata(o) => &o.file_system_id,
            RequestedOptions::ReadDirectory(o) => &o.file_system_id,
            RequestedOptions::OpenFile(o) => &o.file_system_id,
            RequestedOptions::CloseFile(o) => &o.file_system_id,
            RequestedOptions::ReadFile(o) => &o.file_system_id,
            RequestedOptions::Abort(o) => &o.file_system_id,
        }
    }

    /// The request ID this payload is bound to.
    pub fn request_id(&self) -> RequestId {
        match self {
            RequestedOptions::Unmount(o) => o.request_id,
            RequestedOptions::GetMetadata(o) => o.request_id,
            RequestedOptions::ReadDirectory(o) => o.request_id,
            RequestedOptions::OpenFile(o) => o.request_id,
            RequestedOptions::CloseFile(o) => o.request_id,
            RequestedOptions::ReadFile(o) => o.request_id,
            RequestedOptions::Abort(o) => o.request_id,
        }
    }

    /// Overwrites the bound request ID. `RequestManager::create_request` is the
    /// sole authority on a request's own ID, so it calls this to stamp the
    /// freshly-allocated ID onto the options before they're stored or dispatched —
    /// callers need not predict the manager's counter themselves.
    pub(crate) fn with_request_id(self, id: RequestId) -> Self {
        match self {
            RequestedOptions::Unmount(mut o) => {
                o.request_id = id;
                RequestedOptions::Unmount(o)
            }
            RequestedOptions::GetMetadata(mut o) => {
                o.request_id = id;
                RequestedOptions::GetMetadata(o)
            }
            RequestedOptions::ReadDirectory(mut o) => {
                o.request_id = id;
                RequestedOptions::ReadDirectory(o)
            }
            RequestedOptions::OpenFile(mut o) => {
                o.request_id = id;
                RequestedOptions::OpenFile(o)
            }
            RequestedOptions::CloseFile(mut o) => {
                o.request_id = id;
                RequestedOptions::CloseFile(o)
            }
            RequestedOptions::ReadFile(mut o) => {
                o.request_id = id;
                RequestedOptions::ReadFile(o)
            }
            RequestedOptions::Abort(mut o) => {
                o.request_id = id;
                RequestedOptions::Abort(o)
            }
        }
    }
}
