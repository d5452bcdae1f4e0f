use std::sync::{Arc, Weak};

use async_trait::async_trait;

use crate::ids::RequestId;
use crate::manager::RequestManager;
use crate::options::{MountOptions, UnmountOptions};

use super::Provider;

/// The native virtual file system service consumed by the provider facade.
/// Modeled as an async trait so a test double can simulate the native side
/// without any real I/O — there is none at this layer regardless.
///
/// Both methods are asynchronous and complete by calling back into
/// [`Provider::on_success`]/[`Provider::on_error`] on `provider` with `request_id`,
/// rather than through their own return value — mirroring the pending-promise map
/// the design is built around.
#[async_trait]
pub trait VirtualFileSystemService: Send + Sync {
    async fn mount(
        &self,
        request_id: RequestId,
        options: MountOptions,
        manager: Arc<RequestManager>,
        provider: Weak<Provider>,
    );

    async fn unmount(&self, request_id: RequestId, options: UnmountOptions, provider: Weak<Provider>);
}
