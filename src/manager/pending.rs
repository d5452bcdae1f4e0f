use crate::ids::RequestId;
use crate::kind::RequestKind;
use crate::manager::Completion;
use crate::options::RequestedOptions;
use crate::value::RequestValue;

/// A request accepted by [`super::RequestManager`] but not yet drained to its
/// caller. Created in `create_request`, mutated only by `fulfill`/`reject`,
/// destroyed once its completion has been scheduled and it has reached the head of
/// the FIFO queue (or immediately, on reject).
pub(super) struct PendingRequest {
    pub kind: RequestKind,
    pub id: RequestId,
    #[allow(dead_code)] // retained for observability/tracing; not read by the drain loop.
    pub options: RequestedOptions,
    pub completion: Option<Completion>,
    pub completed: bool,
    pub accumulated: Option<RequestValue>,
}

impl PendingRequest {
    pub fn new(kind: RequestKind, id: RequestId, options: RequestedOptions, completion: Completion) -> Self {
        Self { kind, id, options, completion: Some(completion), completed: false, accumulated: None }
    }
}
