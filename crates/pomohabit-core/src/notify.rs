//! Coalesced change notifications.
//!
//! Observers get a `watch` receiver over a version counter. The counter moves
//! once per logical operation: nested notifications raised while a
//! [`NotifyBatch`] is alive collapse into a single bump when the outermost
//! batch drops.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    tx: watch::Sender<u64>,
    depth: AtomicUsize,
    pending: AtomicBool,
}

/// Shared "something changed" signal. Clones refer to the same channel.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    inner: Arc<Inner>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                tx,
                depth: AtomicUsize::new(0),
                pending: AtomicBool::new(false),
            }),
        }
    }

    /// Register an observer. The receiver sees the latest version only.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.tx.subscribe()
    }

    /// Number of notifications emitted so far.
    pub fn version(&self) -> u64 {
        *self.inner.tx.borrow()
    }

    /// Signal a change, or defer it to the enclosing batch.
    pub fn notify(&self) {
        if self.inner.depth.load(Ordering::SeqCst) > 0 {
            self.inner.pending.store(true, Ordering::SeqCst);
        } else {
            self.bump();
        }
    }

    /// Open a batch. Notifications until the guard drops are folded into one.
    pub fn batch(&self) -> NotifyBatch {
        self.inner.depth.fetch_add(1, Ordering::SeqCst);
        NotifyBatch {
            notifier: self.clone(),
        }
    }

    fn bump(&self) {
        self.inner.tx.send_modify(|version| *version += 1);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard returned by [`ChangeNotifier::batch`].
#[must_use = "dropping the batch immediately flushes it"]
#[derive(Debug)]
pub struct NotifyBatch {
    notifier: ChangeNotifier,
}

impl Drop for NotifyBatch {
    fn drop(&mut self) {
        let inner = &self.notifier.inner;
        if inner.depth.fetch_sub(1, Ordering::SeqCst) == 1
            && inner.pending.swap(false, Ordering::SeqCst)
        {
            self.notifier.bump();
        }
    }
}
