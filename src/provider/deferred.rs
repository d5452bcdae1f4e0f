use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{Error, ErrorKind};

/// A deferred-completion handle returned by [`super::Provider::mount`] and
/// [`super::Provider::unmount`]. Resolves with `Ok(())` once the underlying
/// native service call succeeds, or `Err` on failure.
pub struct Deferred {
    receiver: oneshot::Receiver<Result<(), Error>>,
}

/// The write side of a [`Deferred`], held privately by the provider until the
/// native service reports back via `on_success`/`on_error`.
pub(crate) struct Settle(oneshot::Sender<Result<(), Error>>);

impl Settle {
    pub fn resolve(self) {
        let _ = self.0.send(Ok(()));
    }

    pub fn reject(self, error: Error) {
        let _ = self.0.send(Err(error));
    }
}

impl Deferred {
    pub(crate) fn pending() -> (Self, Settle) {
        let (sender, receiver) = oneshot::channel();
        (Deferred { receiver }, Settle(sender))
    }

    /// Builds a handle that is already rejected with `error`.
    pub(crate) fn rejected(error: Error) -> Self {
        let (deferred, settle) = Self::pending();
        settle.reject(error);
        deferred
    }
}

impl Deferred {
    /// Registers a callback to run when this handle settles, for callers that
    /// don't want to `.await` it directly. Spawns onto the ambient tokio runtime.
    pub fn on_settle<F>(self, callback: F)
    where
        F: FnOnce(Result<(), Error>) + Send + 'static,
    {
        tokio::spawn(async move {
            callback(self.await);
        });
    }
}

impl Future for Deferred {
    type Output = Result<(), Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            // The settling side was dropped without resolving — treat as cancelled.
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::new(ErrorKind::Cancelled))),
            Poll::Pending => Poll::Pending,
        }
    }
}
