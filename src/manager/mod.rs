//! The request coordinator: accepts requests from the native producer, dispatches
//! them to the scripted consumer as events, accumulates streamed partial results,
//! and completes the original caller in strict submission order.

mod pending;
mod task_loop;

pub use task_loop::{TaskLoop, TokioTaskLoop};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Weak};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::dispatch::EventDispatcher;
use crate::error::{Error, ErrorKind};
use crate::ids::{IdCounter, RequestId};
use crate::kind::RequestKind;
use crate::options::RequestedOptions;
use crate::value::RequestValue;
use pending::PendingRequest;

/// The terminal outcome delivered to a native caller's completion, exactly once per
/// accepted request.
#[derive(Debug)]
pub enum RequestOutcome {
    /// `has_more` has already been flattened away by the manager by the time this
    /// reaches a completion callback — it is always the final value.
    Success(RequestValue),
    /// An opaque, producer/consumer-defined error code.
    Error(u32),
}

/// What a native request producer supplies to `create_request` to be notified of
/// the eventual outcome. Exactly one of success/error ever fires, which is why this
/// is a single `FnOnce` rather than a two-method trait.
pub type Completion = Box<dyn FnOnce(RequestId, RequestOutcome) + Send>;

struct ManagerState {
    requests: HashMap<RequestId, PendingRequest>,
    queue: VecDeque<RequestId>,
    ids: IdCounter,
}

struct Inner {
    state: Mutex<ManagerState>,
    dispatcher: Mutex<Option<Weak<dyn EventDispatcher>>>,
    task_loop: Arc<dyn TaskLoop>,
    config: Config,
}

/// Per-provider request coordinator. Cheaply `Clone`-able (an `Arc` around shared
/// state); every clone refers to the same queue, map, and counter.
#[derive(Clone)]
pub struct RequestManager {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RequestManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestManager").finish_non_exhaustive()
    }
}

/// Handed to a dispatched event so its `success`/`error` callbacks can report back
/// to the manager that produced them, without the event needing to know anything
/// about the manager's internals.
#[derive(Clone)]
pub struct Responder {
    request_id: RequestId,
    manager: RequestManager,
}

impl Responder {
    /// Reports a (possibly partial) success. See [`RequestManager::fulfill`].
    pub fn success(&self, value: RequestValue, has_more: bool) {
        if let Err(err) = self.manager.fulfill(self.request_id, value, has_more) {
            warn!(request_id = %self.request_id, error = %err, "fulfill rejected by manager");
        }
    }

    /// Reports a terminal error. See [`RequestManager::reject`].
    pub fn error(&self, error_code: u32) {
        if let Err(err) = self.manager.reject(self.request_id, error_code) {
            warn!(request_id = %self.request_id, error = %err, "reject rejected by manager");
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Builds a `Responder` directly, bypassing `create_request`, for exercising
    /// an `EventDispatcher::fire` implementation in isolation.
    #[cfg(test)]
    pub(crate) fn for_test(request_id: RequestId, manager: RequestManager) -> Self {
        Self { request_id, manager }
    }
}

impl RequestManager {
    /// Builds a manager that schedules its dispatch/completion work on `task_loop`,
    /// with default configuration (no pending-request cap).
    pub fn new(task_loop: Arc<dyn TaskLoop>) -> Self {
        Self::with_config(task_loop, Config::default())
    }

    /// Builds a manager backed by the default [`TokioTaskLoop`].
    pub fn with_tokio() -> Self {
        Self::new(Arc::new(TokioTaskLoop))
    }

    /// Builds a manager honoring `config.max_pending_requests`.
    pub fn with_config(task_loop: Arc<dyn TaskLoop>, config: Config) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ManagerState {
                    requests: HashMap::new(),
                    queue: VecDeque::new(),
                    ids: IdCounter::new(),
                }),
                dispatcher: Mutex::new(None),
                task_loop,
                config,
            }),
        }
    }

    /// One-time configuration of the event dispatcher this manager fires events
    /// through. A `Weak` reference, per the design's resolution of the
    /// provider/manager reference cycle (§9): if the dispatcher's owner is gone by
    /// the time a scheduled dispatch task runs, the task is a no-op.
    pub fn set_dispatcher(&self, dispatcher: Weak<dyn EventDispatcher>) {
        *self.inner.dispatcher.lock().unwrap() = Some(dispatcher);
    }

    /// Accepts a new request, assigns it the next ID, and schedules its dispatch.
    /// Never invokes `completion` inline — always asynchronously, later.
    pub fn create_request(
        &self,
        kind: RequestKind,
        options: RequestedOptions,
        completion: Completion,
    ) -> Result<RequestId, Error> {
        if kind == RequestKind::Unknown {
            return Err(Error::new(ErrorKind::InvalidArgument));
        }
        if options.kind() != kind {
            return Err(Error::with_context(
                ErrorKind::TypeMismatch,
                format!("options are {:?}, expected {:?}", options.kind(), kind),
            ));
        }
        if self.inner.dispatcher.lock().unwrap().is_none() {
            return Err(Error::new(ErrorKind::NotInitialized));
        }

        // ID allocation, the cap check, and the map/queue insert all happen under one
        // lock acquisition: splitting them lets two concurrent producers interleave
        // between "take an id" and "publish it," inverting creation order relative
        // to queue order, and lets the cap be read-then-exceeded by a racing insert.
        let (id, options) = {
            let mut state = self.inner.state.lock().unwrap();
            let cap = self.inner.config.max_pending_requests as usize;
            if cap != 0 && state.requests.len() >= cap {
                return Err(Error::with_context(ErrorKind::InvalidArgument, "max_pending_requests reached"));
            }
            let id = state.ids.next();
            let options = options.with_request_id(id);
            state.requests.insert(id, PendingRequest::new(kind, id, options.clone(), completion));
            state.queue.push_back(id);
            (id, options)
        };

        let manager = self.clone();
        let dispatched_options = options;
        let scheduled = self.inner.task_loop.schedule(Box::pin(async move {
            manager.dispatch(id, kind, dispatched_options);
        }));

        if let Err(err) = scheduled {
            let mut state = self.inner.state.lock().unwrap();
            destroy_request(&mut state, id);
            return Err(err);
        }

        trace!(request_id = %id, kind = ?kind, "request created");
        Ok(id)
    }

    fn dispatch(&self, id: RequestId, kind: RequestKind, options: RequestedOptions) {
        let dispatcher = match self.inner.dispatcher.lock().unwrap().clone() {
            Some(weak) => weak,
            None => return,
        };
        let Some(dispatcher) = dispatcher.upgrade() else {
            debug!(request_id = %id, "dispatcher gone before dispatch ran; no-op");
            return;
        };
        let responder = Responder { request_id: id, manager: self.clone() };
        if let Err(err) = dispatcher.fire(kind, options, responder) {
            warn!(request_id = %id, error = %err, "event dispatch failed, rejecting request");
            let code = match err.kind() {
                ErrorKind::InvalidArgument => 1,
                _ => 0,
            };
            let _ = self.reject(id, code);
        }
    }

    /// Reports a (possibly partial) fulfillment. See the design's §4.3 for the
    /// full streaming/drain semantics.
    pub fn fulfill(&self, id: RequestId, value: RequestValue, has_more: bool) -> Result<(), Error> {
        let mut state = self.inner.state.lock().unwrap();
        let request = state.requests.get_mut(&id).ok_or_else(|| Error::new(ErrorKind::NotFound))?;
        if request.completed {
            return Err(Error::new(ErrorKind::NotFound));
        }
        if !value.matches_kind(request.kind) {
            return Err(Error::new(ErrorKind::TypeMismatch));
        }

        match &mut request.accumulated {
            Some(existing) => existing.concat(value)?,
            None => request.accumulated = Some(value),
        }

        if has_more {
            trace!(request_id = %id, "partial fulfillment accumulated");
            return Ok(());
        }

        request.completed = true;
        drop(state);
        self.drain();
        Ok(())
    }

    /// Rejects a request, bypassing the FIFO drain loop entirely (§9: this is the
    /// one intentional asymmetry with `fulfill` — errors are not held behind
    /// earlier, still-pending successes).
    pub fn reject(&self, id: RequestId, error_code: u32) -> Result<(), Error> {
        let mut state = self.inner.state.lock().unwrap();
        let mut request = state.requests.remove(&id).ok_or_else(|| Error::new(ErrorKind::NotFound))?;
        state.queue.retain(|queued| *queued != id);
        drop(state);

        let completion = request.completion.take().expect("completion taken exactly once");
        let scheduled = self.inner.task_loop.schedule(Box::pin(async move {
            completion(id, RequestOutcome::Error(error_code));
        }));
        if let Err(err) = scheduled {
            warn!(request_id = %id, error = %err, "failed to schedule reject completion");
        }

        // Removing `id` may have exposed an already-completed successor at the
        // queue's new head; a reject never drains its own slot but must not leave
        // the rest of the queue stuck behind it.
        self.drain();
        Ok(())
    }

    /// Walks the FIFO queue from the head, draining every contiguously-completed
    /// run of requests to their callers in submission order, and stopping at the
    /// first request that is not yet completed.
    fn drain(&self) {
        loop {
            let drained = {
                let mut state = self.inner.state.lock().unwrap();
                let Some(&head) = state.queue.front() else { break };
                let is_completed = state
                    .requests
                    .get(&head)
                    .expect("queue entry always backed by a map entry")
                    .completed;
                if !is_completed {
                    break;
                }
                state.queue.pop_front();
                state.requests.remove(&head).expect("just checked it exists")
            };
            self.complete_success(drained);
        }
    }

    fn complete_success(&self, mut request: PendingRequest) {
        let id = request.id;
        let value = request.accumulated.take().unwrap_or(RequestValue::Unit);
        let completion = request.completion.take().expect("completion taken exactly once");
        let scheduled = self.inner.task_loop.schedule(Box::pin(async move {
            completion(id, RequestOutcome::Success(value));
        }));
        if let Err(err) = scheduled {
            warn!(request_id = %id, error = %err, "failed to schedule success completion");
        } else {
            trace!(request_id = %id, "drained to caller");
        }
    }

    /// Number of requests currently pending (for tests/observability only).
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().unwrap().requests.len()
    }

    /// Convenience wrapper around `create_request` for producers that prefer
    /// `.await`ing the outcome over supplying a completion closure. The oneshot
    /// sender backing the returned receiver is the completion; dropping the
    /// manager-side task without sending just drops the receiver's `Err` side,
    /// which callers see as a closed channel.
    pub fn create_request_owned(
        &self,
        kind: RequestKind,
        options: RequestedOptions,
    ) -> Result<(RequestId, tokio::sync::oneshot::Receiver<RequestOutcome>), Error> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let completion: Completion = Box::new(move |_id, outcome| {
            let _ = tx.send(outcome);
        });
        let id = self.create_request(kind, options, completion)?;
        Ok((id, rx))
    }
}

fn destroy_request(state: &mut ManagerState, id: RequestId) {
    state.requests.remove(&id);
    state.queue.retain(|queued| *queued != id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::EntryMetadata;
    use crate::options::GetMetadataOptions;
    use crate::value::{MetadataValue, ReadFileValue};
    use tokio::sync::mpsc;

    struct NoopDispatcher;

    impl EventDispatcher for NoopDispatcher {
        fn fire(&self, _kind: RequestKind, _options: RequestedOptions, _responder: Responder) -> Result<(), Error> {
            Ok(())
        }
    }

    fn manager_with_dispatcher() -> (RequestManager, Arc<NoopDispatcher>) {
        let manager = RequestManager::with_tokio();
        let dispatcher = Arc::new(NoopDispatcher);
        manager.set_dispatcher(Arc::downgrade(&dispatcher) as Weak<dyn EventDispatcher>);
        (manager, dispatcher)
    }

    fn get_metadata_options() -> RequestedOptions {
        RequestedOptions::GetMetadata(GetMetadataOptions::new("fs", RequestId::from_raw(0), "/path"))
    }

    fn metadata_value() -> RequestValue {
        RequestValue::Metadata(MetadataValue { metadata: EntryMetadata::file("a", 1, 0) })
    }

    fn completion(tx: mpsc::UnboundedSender<(RequestId, RequestOutcome)>) -> Completion {
        Box::new(move |id, outcome| {
            let _ = tx.send((id, outcome));
        })
    }

    #[tokio::test]
    async fn assigned_ids_are_monotonic() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let first = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx.clone())).unwrap();
        let second = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();
        assert_eq!(first.get() + 1, second.get());
    }

    #[tokio::test]
    async fn success_delivered_in_submission_order_despite_out_of_order_fulfillment() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx.clone())).unwrap();
        let second = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();

        manager.fulfill(second, metadata_value(), false).unwrap();
        assert!(rx.try_recv().is_err(), "second must wait behind first in the queue");

        manager.fulfill(first, metadata_value(), false).unwrap();
        let (delivered_first, _) = rx.recv().await.unwrap();
        let (delivered_second, _) = rx.recv().await.unwrap();
        assert_eq!(delivered_first, first);
        assert_eq!(delivered_second, second);
    }

    #[tokio::test]
    async fn reject_completes_immediately_bypassing_queue_order() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx.clone())).unwrap();
        let second = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();

        manager.reject(second, 7).unwrap();
        let (id, outcome) = rx.recv().await.unwrap();
        assert_eq!(id, second);
        assert!(matches!(outcome, RequestOutcome::Error(7)));
        assert_eq!(manager.pending_count(), 1, "first is untouched by the reject");

        let _ = first;
    }

    #[tokio::test]
    async fn rejecting_the_head_drains_an_already_completed_successor() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx.clone())).unwrap();
        let second = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();

        // Second finishes first but sits behind the still-pending head.
        manager.fulfill(second, metadata_value(), false).unwrap();
        assert!(rx.try_recv().is_err());

        // Rejecting the head must not strand the already-completed successor behind it.
        manager.reject(first, 1).unwrap();
        let (delivered_first, outcome_first) = rx.recv().await.unwrap();
        assert_eq!(delivered_first, first);
        assert!(matches!(outcome_first, RequestOutcome::Error(1)));

        let (delivered_second, _) = rx.recv().await.unwrap();
        assert_eq!(delivered_second, second);
    }

    #[tokio::test]
    async fn fulfill_unknown_id_is_not_found() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let err = manager.fulfill(RequestId::from_raw(999), RequestValue::Unit, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn fulfill_after_terminal_is_not_found() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();
        manager.fulfill(id, metadata_value(), false).unwrap();
        rx.recv().await.unwrap();
        let err = manager.fulfill(id, metadata_value(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn fulfill_wrong_variant_is_type_mismatch() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx)).unwrap();
        let err = manager.fulfill(id, RequestValue::ReadFile(ReadFileValue::new(vec![1])), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn create_request_requires_matching_kind() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = manager
            .create_request(RequestKind::ReadFile, get_metadata_options(), completion(tx))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn create_request_without_dispatcher_fails() {
        let manager = RequestManager::with_tokio();
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = manager
            .create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInitialized);
    }

    #[tokio::test]
    async fn max_pending_requests_caps_creation() {
        let mut config = Config::default();
        config.max_pending_requests = 1;
        let manager = RequestManager::with_config(Arc::new(TokioTaskLoop), config);
        let dispatcher = Arc::new(NoopDispatcher);
        manager.set_dispatcher(Arc::downgrade(&dispatcher) as Weak<dyn EventDispatcher>);

        let (tx, _rx) = mpsc::unbounded_channel();
        manager.create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx.clone())).unwrap();
        let err = manager
            .create_request(RequestKind::GetMetadata, get_metadata_options(), completion(tx))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn create_request_owned_resolves_via_await() {
        let (manager, _dispatcher) = manager_with_dispatcher();
        let (id, rx) = manager
            .create_request_owned(RequestKind::GetMetadata, get_metadata_options())
            .unwrap();
        manager.fulfill(id, metadata_value(), false).unwrap();
        let outcome = rx.await.unwrap();
        assert!(matches!(outcome, RequestOutcome::Success(_)));
    }
}
