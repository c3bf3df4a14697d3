//! The patch channel between the outside world and the scheduler.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::patch::Patch;

/// Render lane a patch is queued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Rendered on the next frame
    Sync,
    /// Rendered inside a page transition, one after another
    Async,
}

#[derive(Debug)]
pub(crate) enum Message {
    Patch(Patch, Lane),
    /// An effect task finished
    Settled,
}

/// Cloneable handle that submits patches to an app.
///
/// Submissions are queued and picked up in order the next time the app
/// runs ([`App::run_until_stalled`](crate::App::run_until_stalled)); they
/// never touch the state directly. This is what listeners, lifecycle hooks
/// and effect tasks use, so a render never observes a half-applied patch.
#[derive(Debug, Clone)]
pub struct Dispatch {
    tx: UnboundedSender<Message>,
}

impl Dispatch {
    pub(crate) fn channel() -> (Dispatch, UnboundedReceiver<Message>) {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        (Dispatch { tx }, rx)
    }

    /// Submit a patch to the immediate lane.
    pub fn patch(&self, patch: impl Into<Patch>) {
        self.submit(patch.into(), Lane::Sync);
    }

    /// Submit a patch to the animated lane.
    pub fn patch_async(&self, patch: impl Into<Patch>) {
        self.submit(patch.into(), Lane::Async);
    }

    /// Whether the app behind this handle was defused or dropped.
    /// Submissions to a closed handle are discarded.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub(crate) fn submit(&self, patch: Patch, lane: Lane) {
        if patch.is_ignored() {
            return;
        }
        if self.tx.unbounded_send(Message::Patch(patch, lane)).is_err() {
            tracing::trace!("dispatch after app was defused or dropped");
        }
    }

    pub(crate) fn settled(&self) {
        let _ = self.tx.unbounded_send(Message::Settled);
    }
}

/// Emits intermediate patches from a [`Patch::task`].
#[derive(Debug, Clone)]
pub struct Yielder {
    dispatch: Dispatch,
    lane: Lane,
}

impl Yielder {
    pub(crate) fn new(dispatch: Dispatch, lane: Lane) -> Self {
        Self { dispatch, lane }
    }

    /// Submit a patch to the task's lane and suspend until the scheduler
    /// resumes the task.
    pub async fn emit(&self, patch: impl Into<Patch>) {
        self.dispatch.submit(patch.into(), self.lane);
        YieldNow { yielded: false }.await;
    }
}

/// Completes on its second poll.
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
