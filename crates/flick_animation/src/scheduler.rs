//! Frame scheduling
//!
//! The shared per-frame ticker plus a deferred microtask queue. The
//! embedding frame loop calls [`FrameScheduler::tick`] once per frame;
//! registered tickers advance their animations, then pending microtasks
//! run. Microtasks scheduled mid-frame therefore execute after the current
//! synchronous callback chain and strictly before the next frame's tickers,
//! which is what deferred disposal relies on.

use std::sync::{Arc, Mutex, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Unique identifier for a registered ticker
    pub struct TickerId;
}

/// Per-frame callback; return false to unregister
pub type TickerCallback = Box<dyn FnMut(f64) -> bool + Send>;

/// A deferred one-shot task
pub type Microtask = Box<dyn FnOnce() + Send>;

struct SchedulerInner {
    // Slots hold None while their ticker runs this frame, so a running
    // ticker may re-enter the scheduler (register, remove, schedule).
    tickers: SlotMap<TickerId, Option<TickerCallback>>,
    microtasks: Vec<Microtask>,
}

/// The frame scheduler handle
///
/// Cheap to clone; all clones share one scheduler. Hold a [`WeakScheduler`]
/// from long-lived animation state to avoid keeping the scheduler alive
/// from its own tickers.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SchedulerInner {
                tickers: SlotMap::with_key(),
                microtasks: Vec::new(),
            })),
        }
    }

    /// Downgrade to a weak handle
    pub fn downgrade(&self) -> WeakScheduler {
        WeakScheduler {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Register a per-frame ticker
    pub fn add_ticker(&self, callback: TickerCallback) -> TickerId {
        self.inner.lock().unwrap().tickers.insert(Some(callback))
    }

    /// Remove a ticker; a no-op if it already unregistered itself
    pub fn remove_ticker(&self, id: TickerId) {
        self.inner.lock().unwrap().tickers.remove(id);
    }

    /// Queue a task to run after the current callback chain, before the
    /// next frame's tickers
    pub fn schedule_microtask(&self, task: Microtask) {
        self.inner.lock().unwrap().microtasks.push(task);
    }

    /// Advance one frame: run tickers with `dt` seconds, then drain
    /// microtasks
    pub fn tick(&self, dt: f64) {
        // Take the callbacks out of their slots so they run without the
        // scheduler lock held.
        let mut running: Vec<(TickerId, TickerCallback)> = Vec::new();
        {
            let mut inner = self.inner.lock().unwrap();
            let ids: Vec<TickerId> = inner.tickers.keys().collect();
            for id in ids {
                if let Some(slot) = inner.tickers.get_mut(id) {
                    if let Some(callback) = slot.take() {
                        running.push((id, callback));
                    }
                }
            }
        }

        let mut finished: Vec<TickerId> = Vec::new();
        let mut keep: Vec<(TickerId, TickerCallback)> = Vec::new();
        for (id, mut callback) in running {
            if callback(dt) {
                keep.push((id, callback));
            } else {
                finished.push(id);
            }
        }

        {
            let mut inner = self.inner.lock().unwrap();
            for id in finished {
                inner.tickers.remove(id);
            }
            for (id, callback) in keep {
                // The ticker may have been removed while running; drop it then.
                if let Some(slot) = inner.tickers.get_mut(id) {
                    *slot = Some(callback);
                }
            }
        }

        self.flush_microtasks();
    }

    /// Drain the microtask queue, including tasks queued by other
    /// microtasks
    pub fn flush_microtasks(&self) {
        loop {
            let batch = std::mem::take(&mut self.inner.lock().unwrap().microtasks);
            if batch.is_empty() {
                return;
            }
            tracing::trace!(count = batch.len(), "flushing microtasks");
            for task in batch {
                task();
            }
        }
    }

    /// Whether any tickers are registered
    pub fn has_active_tickers(&self) -> bool {
        !self.inner.lock().unwrap().tickers.is_empty()
    }

    /// Number of queued microtasks
    pub fn pending_microtasks(&self) -> usize {
        self.inner.lock().unwrap().microtasks.len()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to a [`FrameScheduler`]
#[derive(Clone)]
pub struct WeakScheduler {
    inner: Weak<Mutex<SchedulerInner>>,
}

impl WeakScheduler {
    /// A weak handle that never upgrades, for detached state
    pub fn unattached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn upgrade(&self) -> Option<FrameScheduler> {
        self.inner.upgrade().map(|inner| FrameScheduler { inner })
    }
}
