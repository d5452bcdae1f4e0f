use futures::future::BoxFuture;

use crate::error::{Error, ErrorKind};

/// Abstraction over "enqueue on the consumer's task loop" (§5.1 of the design). The
/// manager never spawns work directly; it always goes through a `TaskLoop` so a host
/// embedding this crate in its own event loop (a browser's, a single-threaded
/// scheduler, a message-passing channel) can supply its own scheduling primitive.
pub trait TaskLoop: Send + Sync + 'static {
    /// Schedules `task` to run later on the consumer's loop. Returning `Err` means
    /// the task was not scheduled and will never run.
    fn schedule(&self, task: BoxFuture<'static, ()>) -> Result<(), Error>;
}

/// The default [`TaskLoop`], spawning onto whichever `tokio` runtime is current.
///
/// Scheduling fails with [`ErrorKind::SchedulingFailed`] if there is no ambient
/// runtime, which is the realistic way "the consumer event loop refused a task"
/// manifests for a `tokio`-backed consumer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTaskLoop;

impl TaskLoop for TokioTaskLoop {
    fn schedule(&self, task: BoxFuture<'static, ()>) -> Result<(), Error> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| Error::with_context(ErrorKind::SchedulingFailed, "no tokio runtime"))?;
        handle.spawn(task);
        Ok(())
    }
}
