//! Virtual file system provider — the asynchronous request coordinator that sits
//! between a native virtual file system service and a scripted, single-threaded
//! provider running in a page context.
//!
//! The [`manager`] module holds the hard part: [`manager::RequestManager`] assigns
//! monotonic request IDs, dispatches them to the scripted consumer as typed events,
//! accumulates streamed partial results, and completes the original native caller in
//! strict submission order even when the consumer finishes requests out of order.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod ids;
pub mod kind;
pub mod manager;
pub mod metadata;
pub mod options;
pub mod provider;
pub mod value;

pub use config::Config;
pub use dispatch::EventDispatcher;
pub use error::{Error, ErrorKind};
pub use ids::RequestId;
pub use kind::RequestKind;
pub use manager::{RequestManager, RequestOutcome, Responder, TaskLoop, TokioTaskLoop};
pub use metadata::EntryMetadata;
pub use provider::{Deferred, FileSystemProviderHandler, Provider, VirtualFileSystemService};
pub use value::RequestValue;
