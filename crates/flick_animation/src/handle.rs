//! Animation completion handles
//!
//! An [`AnimationHandle`] is a future resolving when the animation it
//! observes settles or is superseded. Handles can be joined: the joined
//! handle resolves only when every component has resolved, while each
//! component can still be interrupted independently.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use smallvec::SmallVec;

/// How an animation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    /// The animation ran to its natural end
    Completed,
    /// The animation was superseded or torn down before finishing
    Interrupted,
}

/// Completion side of an [`AnimationHandle`]
///
/// Dropping a completer without calling [`complete`](Self::complete)
/// resolves the handle as `Interrupted`.
pub struct AnimationCompleter {
    tx: oneshot::Sender<AnimationStatus>,
}

impl AnimationCompleter {
    pub fn complete(self, status: AnimationStatus) {
        // The handle may have been dropped; nothing to signal then.
        let _ = self.tx.send(status);
    }
}

enum Part {
    Pending(oneshot::Receiver<AnimationStatus>),
    Done(AnimationStatus),
}

/// Future resolving when an animation (or a joined set) finishes
///
/// Resolves `Completed` only if every observed animation completed;
/// any interruption makes the aggregate `Interrupted`.
pub struct AnimationHandle {
    parts: SmallVec<[Part; 2]>,
}

impl AnimationHandle {
    /// A handle/completer pair for one animation
    pub fn pending() -> (AnimationCompleter, AnimationHandle) {
        let (tx, rx) = oneshot::channel();
        (
            AnimationCompleter { tx },
            AnimationHandle {
                parts: SmallVec::from_iter([Part::Pending(rx)]),
            },
        )
    }

    /// A handle that is already resolved
    pub fn resolved(status: AnimationStatus) -> AnimationHandle {
        AnimationHandle {
            parts: SmallVec::from_iter([Part::Done(status)]),
        }
    }

    /// Join several handles into one that waits for all of them
    ///
    /// Components resolve independently; the join only aggregates their
    /// outcomes once every one has finished.
    pub fn join(handles: impl IntoIterator<Item = AnimationHandle>) -> AnimationHandle {
        let mut parts = SmallVec::new();
        for handle in handles {
            parts.extend(handle.parts);
        }
        if parts.is_empty() {
            return AnimationHandle::resolved(AnimationStatus::Completed);
        }
        AnimationHandle { parts }
    }

    /// Non-blocking completion probe
    ///
    /// Returns the aggregate status once every component has resolved,
    /// `None` while any is still running.
    pub fn try_status(&mut self) -> Option<AnimationStatus> {
        let mut all_done = true;
        for part in self.parts.iter_mut() {
            if let Part::Pending(rx) = part {
                match rx.try_recv() {
                    Ok(Some(status)) => *part = Part::Done(status),
                    Ok(None) => all_done = false,
                    Err(oneshot::Canceled) => *part = Part::Done(AnimationStatus::Interrupted),
                }
            }
        }
        if all_done {
            Some(self.aggregate())
        } else {
            None
        }
    }

    fn aggregate(&self) -> AnimationStatus {
        let interrupted = self
            .parts
            .iter()
            .any(|part| matches!(part, Part::Done(AnimationStatus::Interrupted)));
        if interrupted {
            AnimationStatus::Interrupted
        } else {
            AnimationStatus::Completed
        }
    }
}

impl Future for AnimationHandle {
    type Output = AnimationStatus;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut all_done = true;
        for part in self.parts.iter_mut() {
            if let Part::Pending(rx) = part {
                match Pin::new(rx).poll(cx) {
                    Poll::Ready(Ok(status)) => *part = Part::Done(status),
                    Poll::Ready(Err(oneshot::Canceled)) => {
                        *part = Part::Done(AnimationStatus::Interrupted)
                    }
                    Poll::Pending => all_done = false,
                }
            }
        }
        if all_done {
            Poll::Ready(self.aggregate())
        } else {
            Poll::Pending
        }
    }
}
