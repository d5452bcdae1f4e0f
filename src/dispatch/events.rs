//! The seven typed events a dispatcher fires at the scripted consumer, one per
//! non-`Mount` [`crate::kind::RequestKind`].

use crate::manager::Responder;
use crate::options::{
    AbortOptions, CloseFileOptions, GetMetadataOptions, OpenFileOptions, ReadDirectoryOptions,
    ReadFileOptions, UnmountOptions,
};

macro_rules! event {
    ($name:ident, $options:ty) => {
        /// Carries its typed options plus the [`Responder`] used to report the
        /// eventual outcome back to the request manager.
        pub struct $name {
            pub options: $options,
            pub responder: Responder,
        }

        impl $name {
            pub fn new(options: $options, responder: Responder) -> Self {
                Self { options, responder }
            }
        }
    };
}

event!(UnmountRequestedEvent, UnmountOptions);
event!(GetMetadataRequestedEvent, GetMetadataOptions);
event!(ReadDirectoryRequestedEvent, ReadDirectoryOptions);
event!(OpenFileRequestedEvent, OpenFileOptions);
event!(CloseFileRequestedEvent, CloseFileOptions);
event!(ReadFileRequestedEvent, ReadFileOptions);
event!(AbortRequestedEvent, AbortOptions);
