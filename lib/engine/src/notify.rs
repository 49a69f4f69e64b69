use parking_lot::Mutex;
use siftx_core::RankedView;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Handle returned by a subscription, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<R> = Arc<dyn Fn(Arc<RankedView<R>>) + Send + Sync>;

/// Ranking-changed subscribers.
///
/// Remembers the last view it delivered and stays silent until a view with
/// a different record order comes along.
pub(crate) struct Listeners<R: ?Sized> {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(SubscriptionId, Callback<R>)>>,
    last_delivered: Mutex<Arc<RankedView<R>>>,
}

impl<R: ?Sized + 'static> Listeners<R> {
    pub(crate) fn new(initial: Arc<RankedView<R>>) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            callbacks: Mutex::new(Vec::new()),
            last_delivered: Mutex::new(initial),
        }
    }

    pub(crate) fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(Arc<RankedView<R>>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.lock().push((id, Arc::new(callback)));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut callbacks = self.callbacks.lock();
        let before = callbacks.len();
        callbacks.retain(|(other, _)| *other != id);
        callbacks.len() != before
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Hand `current` to every subscriber if its order differs from the last
    /// delivered view. Returns whether anything was delivered.
    ///
    /// Callbacks run without any lock held, so they may call back into the
    /// model. A panicking callback is logged and does not stop the others.
    pub(crate) fn deliver(&self, current: Arc<RankedView<R>>) -> bool {
        {
            let mut last = self.last_delivered.lock();
            if last.same_order(&current) {
                return false;
            }
            *last = current.clone();
        }

        let callbacks: Vec<Callback<R>> = self
            .callbacks
            .lock()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in callbacks {
            let view = current.clone();
            if catch_unwind(AssertUnwindSafe(|| callback(view))).is_err() {
                warn!(generation = %current.generation(), "ranking-changed callback panicked");
            }
        }
        true
    }
}
