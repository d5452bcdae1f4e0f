//! The provider facade: the public entry point a native virtual file system
//! service uses to mount/unmount scripted file systems and route their requests.

mod deferred;
mod handler;
mod service;

pub use deferred::Deferred;
pub use handler::FileSystemProviderHandler;
pub use service::VirtualFileSystemService;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, warn};

use deferred::Settle;

use crate::dispatch::{
    AbortRequestedEvent, CloseFileRequestedEvent, EventDispatcher, GetMetadataRequestedEvent,
    OpenFileRequestedEvent, ReadDirectoryRequestedEvent, ReadFileRequestedEvent,
    UnmountRequestedEvent,
};
use crate::config::Config;
use crate::error::{Error, ErrorKind};
use crate::ids::{IdCounter, RequestId};
use crate::kind::RequestKind;
use crate::manager::{RequestManager, Responder, TaskLoop, TokioTaskLoop};
use crate::options::{MountOptions, RequestedOptions, UnmountOptions};

enum PendingLifecycle {
    Mount { file_system_id: String, manager: Arc<RequestManager>, settle: Settle },
    Unmount { file_system_id: String, settle: Settle },
}

struct ProviderState {
    mounted: HashMap<String, Arc<RequestManager>>,
    pending_lifecycle: HashMap<RequestId, PendingLifecycle>,
    lifecycle_ids: IdCounter,
}

/// Coordinates every scripted file system mounted under this service: owns a
/// [`RequestManager`] per mounted `file_system_id`, routes their events to the
/// registered [`FileSystemProviderHandler`], and forwards `mount`/`unmount` to the
/// native [`VirtualFileSystemService`].
pub struct Provider {
    state: Mutex<ProviderState>,
    handler: Mutex<Option<Arc<dyn FileSystemProviderHandler>>>,
    service: Arc<dyn VirtualFileSystemService>,
    task_loop: Arc<dyn TaskLoop>,
    config: Config,
}

impl Provider {
    /// Builds a provider backed by the default [`TokioTaskLoop`] and default
    /// configuration.
    pub fn new(service: Arc<dyn VirtualFileSystemService>) -> Arc<Self> {
        Self::with_task_loop(service, Arc::new(TokioTaskLoop), Config::default())
    }

    /// Builds a provider scheduling its service calls and per-filesystem managers
    /// on `task_loop`, applying `config` to every [`RequestManager`] it creates.
    ///
    /// Returned as `Arc<Self>` via [`Arc::new_cyclic`] so the `Weak<dyn
    /// EventDispatcher>` handed to each mounted filesystem's manager resolves back
    /// to this provider without a strong reference cycle between them.
    pub fn with_task_loop(service: Arc<dyn VirtualFileSystemService>, task_loop: Arc<dyn TaskLoop>, config: Config) -> Arc<Self> {
        Arc::new_cyclic(|_weak: &Weak<Provider>| Provider {
            state: Mutex::new(ProviderState {
                mounted: HashMap::new(),
                pending_lifecycle: HashMap::new(),
                lifecycle_ids: IdCounter::new(),
            }),
            handler: Mutex::new(None),
            service,
            task_loop,
            config,
        })
    }

    /// Registers the handler that receives every dispatched event across every
    /// filesystem mounted on this provider. Replaces any previously set handler.
    pub fn set_handler(&self, handler: Arc<dyn FileSystemProviderHandler>) {
        *self.handler.lock().unwrap() = Some(handler);
    }

    /// Mounts a scripted file system: creates its [`RequestManager`], wires this
    /// provider as its (weak) event dispatcher, and hands both to the native
    /// service. The returned [`Deferred`] settles once the service calls back via
    /// [`Provider::on_success`]/[`Provider::on_error`].
    pub fn mount(self: &Arc<Self>, mut options: MountOptions) -> Deferred {
        if options.opened_files_limit == 0 {
            options.opened_files_limit = self.config.default_opened_files_limit;
        }
        let file_system_id = options.file_system_id.clone();
        if self.state.lock().unwrap().mounted.contains_key(&file_system_id) {
            return Deferred::rejected(Error::with_context(
                ErrorKind::InvalidArgument,
                format!("{file_system_id} already mounted"),
            ));
        }

        let manager = Arc::new(RequestManager::with_config(Arc::clone(&self.task_loop), self.config.clone()));
        let dispatcher: Weak<dyn EventDispatcher> = Arc::downgrade(self) as Weak<dyn EventDispatcher>;
        manager.set_dispatcher(dispatcher);

        let (deferred, settle) = Deferred::pending();
        let id = {
            let mut state = self.state.lock().unwrap();
            let id = state.lifecycle_ids.next();
            state.pending_lifecycle.insert(
                id,
                PendingLifecycle::Mount { file_system_id: file_system_id.clone(), manager: Arc::clone(&manager), settle },
            );
            id
        };

        let service = Arc::clone(&self.service);
        let provider = Arc::downgrade(self);
        let scheduled = self.task_loop.schedule(Box::pin(async move {
            service.mount(id, options, manager, provider).await;
        }));
        if let Err(err) = scheduled {
            if let Some(PendingLifecycle::Mount { settle, .. }) = self.state.lock().unwrap().pending_lifecycle.remove(&id) {
                settle.reject(err);
            }
        }
        deferred
    }

    /// Unmounts a scripted file system, forwarding to the native service. The
    /// mounted manager is removed only once the service confirms success; any
    /// requests still pending on it are then simply dropped, never completed.
    pub fn unmount(self: &Arc<Self>, options: UnmountOptions) -> Deferred {
        let file_system_id = options.file_system_id.clone();
        if !self.state.lock().unwrap().mounted.contains_key(&file_system_id) {
            return Deferred::rejected(Error::with_context(
                ErrorKind::NotFound,
                format!("{file_system_id} not mounted"),
            ));
        }

        let (deferred, settle) = Deferred::pending();
        let id = {
            let mut state = self.state.lock().unwrap();
            let id = state.lifecycle_ids.next();
            state.pending_lifecycle.insert(id, PendingLifecycle::Unmount { file_system_id: file_system_id.clone(), settle });
            id
        };

        let service = Arc::clone(&self.service);
        let provider = Arc::downgrade(self);
        let scheduled = self.task_loop.schedule(Box::pin(async move {
            service.unmount(id, options, provider).await;
        }));
        if let Err(err) = scheduled {
            if let Some(PendingLifecycle::Unmount { settle, .. }) = self.state.lock().unwrap().pending_lifecycle.remove(&id) {
                settle.reject(err);
            }
        }
        deferred
    }

    /// Reserved for a future synchronous-style read API. Always returns an
    /// already-rejected [`Deferred`] carrying [`ErrorKind::NotImplemented`] —
    /// Rust has no analogue of a null future to return in its place, and an
    /// explicit terminal error is strictly more useful to a caller than a handle
    /// that can never settle.
    pub fn get(&self, _file_system_id: &str, _entry_path: &str) -> Deferred {
        Deferred::rejected(Error::new(ErrorKind::NotImplemented))
    }

    /// Looks up the [`RequestManager`] for a mounted filesystem, for native
    /// request producers issuing `GetMetadata`/`ReadDirectory`/`OpenFile`/
    /// `CloseFile`/`ReadFile`/`Abort` requests.
    pub fn requests(&self, file_system_id: &str) -> Result<Arc<RequestManager>, Error> {
        self.state
            .lock()
            .unwrap()
            .mounted
            .get(file_system_id)
            .cloned()
            .ok_or_else(|| Error::with_context(ErrorKind::NotFound, file_system_id.to_string()))
    }

    /// Called by the native service once a `mount`/`unmount` it was handed
    /// completes successfully.
    pub fn on_success(&self, request_id: RequestId) {
        let pending = self.state.lock().unwrap().pending_lifecycle.remove(&request_id);
        match pending {
            Some(PendingLifecycle::Mount { file_system_id, manager, settle }) => {
                self.state.lock().unwrap().mounted.insert(file_system_id.clone(), manager);
                debug!(file_system_id = %file_system_id, "mounted");
                settle.resolve();
            }
            Some(PendingLifecycle::Unmount { file_system_id, settle }) => {
                self.state.lock().unwrap().mounted.remove(&file_system_id);
                debug!(file_system_id = %file_system_id, "unmounted");
                settle.resolve();
            }
            None => warn!(request_id = %request_id, "on_success for unknown lifecycle request"),
        }
    }

    /// Called by the native service once a `mount`/`unmount` it was handed fails.
    pub fn on_error(&self, request_id: RequestId, error: Error) {
        let pending = self.state.lock().unwrap().pending_lifecycle.remove(&request_id);
        match pending {
            Some(PendingLifecycle::Mount { settle, .. }) => settle.reject(error),
            Some(PendingLifecycle::Unmount { settle, .. }) => settle.reject(error),
            None => warn!(request_id = %request_id, error = %error, "on_error for unknown lifecycle request"),
        }
    }
}

impl EventDispatcher for Provider {
    fn fire(&self, kind: RequestKind, options: RequestedOptions, responder: Responder) -> Result<(), Error> {
        let handler = self.handler.lock().unwrap().clone().ok_or(Error::new(ErrorKind::NotInitialized))?;
        match (kind, options) {
            (RequestKind::Unmount, RequestedOptions::Unmount(o)) => {
                handler.on_unmount_requested(UnmountRequestedEvent::new(o, responder));
            }
            (RequestKind::GetMetadata, RequestedOptions::GetMetadata(o)) => {
                handler.on_get_metadata_requested(GetMetadataRequestedEvent::new(o, responder));
            }
            (RequestKind::ReadDirectory, RequestedOptions::ReadDirectory(o)) => {
                handler.on_read_directory_requested(ReadDirectoryRequestedEvent::new(o, responder));
            }
            (RequestKind::OpenFile, RequestedOptions::OpenFile(o)) => {
                handler.on_open_file_requested(OpenFileRequestedEvent::new(o, responder));
            }
            (RequestKind::CloseFile, RequestedOptions::CloseFile(o)) => {
                handler.on_close_file_requested(CloseFileRequestedEvent::new(o, responder));
            }
            (RequestKind::ReadFile, RequestedOptions::ReadFile(o)) => {
                handler.on_read_file_requested(ReadFileRequestedEvent::new(o, responder));
            }
            (RequestKind::Abort, RequestedOptions::Abort(o)) => {
                handler.on_abort_requested(AbortRequestedEvent::new(o, responder));
            }
            (kind, options) => {
                warn!(kind = ?kind, options_kind = ?options.kind(), "dispatch table mismatch");
                return Err(Error::new(ErrorKind::TypeMismatch));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::RequestKind;
    use crate::options::ReadFileOptions;

    struct StubService;

    #[async_trait::async_trait]
    impl VirtualFileSystemService for StubService {
        async fn mount(&self, request_id: RequestId, _options: MountOptions, _manager: Arc<RequestManager>, provider: Weak<Provider>) {
            if let Some(provider) = provider.upgrade() {
                provider.on_success(request_id);
            }
        }

        async fn unmount(&self, request_id: RequestId, _options: UnmountOptions, provider: Weak<Provider>) {
            if let Some(provider) = provider.upgrade() {
                provider.on_success(request_id);
            }
        }
    }

    struct FailingService;

    #[async_trait::async_trait]
    impl VirtualFileSystemService for FailingService {
        async fn mount(&self, request_id: RequestId, _options: MountOptions, _manager: Arc<RequestManager>, provider: Weak<Provider>) {
            if let Some(provider) = provider.upgrade() {
                provider.on_error(request_id, Error::new(ErrorKind::InvalidArgument));
            }
        }

        async fn unmount(&self, _request_id: RequestId, _options: UnmountOptions, _provider: Weak<Provider>) {
            unreachable!("not exercised by these tests")
        }
    }

    struct NoopHandler;

    impl FileSystemProviderHandler for NoopHandler {
        fn on_unmount_requested(&self, _event: UnmountRequestedEvent) {}
        fn on_get_metadata_requested(&self, _event: GetMetadataRequestedEvent) {}
        fn on_read_directory_requested(&self, _event: ReadDirectoryRequestedEvent) {}
        fn on_open_file_requested(&self, _event: OpenFileRequestedEvent) {}
        fn on_close_file_requested(&self, _event: CloseFileRequestedEvent) {}
        fn on_read_file_requested(&self, _event: ReadFileRequestedEvent) {}
        fn on_abort_requested(&self, _event: AbortRequestedEvent) {}
    }

    #[tokio::test]
    async fn mount_then_unmount_round_trip() {
        let provider = Provider::new(Arc::new(StubService));
        let mount_options = MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0));

        provider.mount(mount_options).await.unwrap();
        assert!(provider.requests("fs1").is_ok());

        let unmount_options = UnmountOptions::new("fs1", RequestId::from_raw(0));
        provider.unmount(unmount_options).await.unwrap();
        assert_eq!(provider.requests("fs1").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn mount_failure_surfaces_service_error() {
        let provider = Provider::new(Arc::new(FailingService));
        let err = provider
            .mount(MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(provider.requests("fs1").is_err());
    }

    #[tokio::test]
    async fn mount_rejects_duplicate_file_system_id_synchronously() {
        let provider = Provider::new(Arc::new(StubService));
        provider.mount(MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0))).await.unwrap();

        let err = provider
            .mount(MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn unmount_rejects_unknown_file_system_id_synchronously() {
        let provider = Provider::new(Arc::new(StubService));
        let err = provider.unmount(UnmountOptions::new("missing", RequestId::from_raw(0))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn get_is_not_implemented() {
        let provider = Provider::new(Arc::new(StubService));
        let err = provider.get("fs1", "/path").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[tokio::test]
    async fn requests_then_dispatch_reaches_the_registered_handler() {
        let provider = Provider::new(Arc::new(StubService));
        provider.set_handler(Arc::new(NoopHandler));
        provider.mount(MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0))).await.unwrap();

        let manager = provider.requests("fs1").unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let id = manager
            .create_request(
                RequestKind::GetMetadata,
                RequestedOptions::GetMetadata(crate::options::GetMetadataOptions::new(
                    "fs1",
                    RequestId::from_raw(0),
                    "/a",
                )),
                Box::new(move |id, outcome| {
                    let _ = tx.send((id, outcome));
                }),
            )
            .unwrap();

        manager.reject(id, 1).unwrap();
        let (delivered, _) = rx.recv().await.unwrap();
        assert_eq!(delivered, id);
    }

    #[tokio::test]
    async fn on_settle_runs_callback_without_awaiting() {
        let provider = Provider::new(Arc::new(StubService));
        let (tx, rx) = tokio::sync::oneshot::channel();
        provider
            .mount(MountOptions::new("fs1", "Scripted FS", RequestId::from_raw(0)))
            .on_settle(move |result| {
                let _ = tx.send(result);
            });
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn fire_rejects_when_kind_and_options_disagree() {
        let provider = Provider::new(Arc::new(StubService));
        provider.set_handler(Arc::new(NoopHandler));
        let manager = RequestManager::with_tokio();
        let responder = Responder::for_test(RequestId::from_raw(1), manager);

        let mismatched = RequestedOptions::ReadFile(ReadFileOptions::new(
            "fs1",
            RequestId::from_raw(1),
            RequestId::from_raw(0),
            0,
            0,
        ));
        let err = provider.fire(RequestKind::GetMetadata, mismatched, responder).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }
}
