//! Translates accepted requests into the typed events fired at the scripted
//! consumer, and back again.

mod events;

pub use events::{
    AbortRequestedEvent, CloseFileRequestedEvent, GetMetadataRequestedEvent,
    OpenFileRequestedEvent, ReadDirectoryRequestedEvent, ReadFileRequestedEvent,
    UnmountRequestedEvent,
};

use crate::error::Error;
use crate::kind::RequestKind;
use crate::manager::Responder;
use crate::options::RequestedOptions;

/// Implemented by whatever owns the scripted consumer's event surface (the
/// provider facade, in practice). [`crate::manager::RequestManager`] holds this
/// only as a `Weak<dyn EventDispatcher>`, never a strong reference — see the
/// design's resolution of the provider/manager reference cycle.
pub trait EventDispatcher: Send + Sync {
    /// Fires the event matching `kind`/`options` at the consumer, handing it
    /// `responder` so the consumer can report back the outcome.
    ///
    /// Returning `Err` rejects the request immediately with that error, without
    /// ever reaching the consumer.
    fn fire(&self, kind: RequestKind, options: RequestedOptions, responder: Responder) -> Result<(), Error>;
}
