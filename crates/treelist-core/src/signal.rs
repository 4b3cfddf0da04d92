//! Change broadcasting for list engines.
//!
//! A list engine keeps one [`Signal`] per kind of notification (sections to
//! refresh, rows that moved, a full reload) and emits the payload after each
//! mutation. Views subscribe with [`Signal::connect`] and keep the returned
//! [`ConnectionId`], or hold a [`ConnectionGuard`] that unsubscribes on drop.
//!
//! Slots run on the emitting thread, in the order they were connected. The
//! slot table is unlocked while they run, so a slot can subscribe or
//! unsubscribe (itself included). Such edits apply from the next emit on.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use treelist_core::Signal;
//!
//! // Indices of sections a view must re-read.
//! let sections_changed = Signal::<Vec<usize>>::new();
//! let stale = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&stale);
//! let id = sections_changed.connect(move |sections| {
//!     sink.lock().unwrap().extend_from_slice(sections);
//! });
//!
//! sections_changed.emit(vec![0, 2]);
//! sections_changed.disconnect(id);
//! sections_changed.emit(vec![1]);
//! assert_eq!(*stale.lock().unwrap(), vec![0, 2]);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// Handle to one subscription, accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;
type ConnectionTable<Args> = Mutex<SlotMap<ConnectionId, Slot<Args>>>;

/// Broadcasts `Args` to every subscribed slot.
///
/// Slots receive the payload by reference. `()` suits bare notifications;
/// a tuple such as `(usize, usize)` carries a section and row.
pub struct Signal<Args> {
    /// Guards reach this through a `Weak`.
    connections: Arc<ConnectionTable<Args>>,
    blocked: AtomicBool,
    /// Unblocked emits only.
    emission_count: AtomicU64,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal with no subscribers.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(SlotMap::with_key())),
            blocked: AtomicBool::new(false),
            emission_count: AtomicU64::new(0),
        }
    }

    /// Subscribes `slot`. It stays connected until [`disconnect`](Self::disconnect)
    /// or [`disconnect_all`](Self::disconnect_all).
    ///
    /// ```
    /// use treelist_core::Signal;
    ///
    /// // (section, row) of a row that was refreshed.
    /// let row_refreshed = Signal::<(usize, usize)>::new();
    /// let id = row_refreshed.connect(|&(section, row)| {
    ///     assert!(row < 10, "section {section} has ten rows");
    /// });
    /// row_refreshed.emit((0, 3));
    /// assert!(row_refreshed.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Like [`connect`](Self::connect), but the subscription ends when the
    /// returned guard is dropped. A guard that outlives the signal drops
    /// without effect.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use treelist_core::Signal;
    ///
    /// let reloaded = Signal::<()>::new();
    /// let reloads = Arc::new(AtomicUsize::new(0));
    ///
    /// let view = {
    ///     let reloads = Arc::clone(&reloads);
    ///     reloaded.connect_scoped(move |_| {
    ///         reloads.fetch_add(1, Ordering::Relaxed);
    ///     })
    /// };
    /// reloaded.emit(());
    /// drop(view);
    /// reloaded.emit(());
    ///
    /// assert_eq!(reloads.load(Ordering::Relaxed), 1);
    /// assert_eq!(reloaded.connection_count(), 0);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            connections: Arc::downgrade(&self.connections),
            id,
        }
    }

    /// Removes one subscription. `false` if `id` was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// [`disconnect`](Self::disconnect), with an unknown `id` as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }

    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Number of live subscriptions.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// While blocked, [`emit`](Self::emit) drops its payload unseen.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emits that reached the slots, counting those with no subscribers.
    pub fn emission_count(&self) -> u64 {
        self.emission_count.load(Ordering::Relaxed)
    }

    /// Hands `args` to each slot in connection order, unless blocked.
    #[tracing::instrument(skip_all, target = "treelist_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }
        self.emission_count.fetch_add(1, Ordering::Relaxed);

        // Slots run on a snapshot, outside the lock.
        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// Ends a subscription on drop. See [`Signal::connect_scoped`].
pub struct ConnectionGuard<Args> {
    connections: Weak<ConnectionTable<Args>>,
    id: ConnectionId,
}

impl<Args> ConnectionGuard<Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Keeps the subscription alive past the guard.
    pub fn detach(mut self) -> ConnectionId {
        self.connections = Weak::new();
        self.id
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(connections) = self.connections.upgrade() {
            connections.lock().remove(self.id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<()>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    /// Subscribes a slot that records every payload it sees.
    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> (ConnectionId, Arc<Mutex<Vec<T>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = signal.connect(move |value: &T| sink.lock().push(value.clone()));
        (id, seen)
    }

    #[test]
    fn test_payloads_arrive_in_emit_order() {
        let sections_changed = Signal::<Vec<usize>>::new();
        let (_, seen) = recorder(&sections_changed);

        sections_changed.emit(vec![2]);
        sections_changed.emit(vec![0, 1]);

        assert_eq!(*seen.lock(), vec![vec![2], vec![0, 1]]);
        assert_eq!(sections_changed.emission_count(), 2);
    }

    #[test]
    fn test_slots_run_in_connection_order() {
        let row_refreshed = Signal::<(usize, usize)>::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for view in ["outline", "detail", "status"] {
            let log = Arc::clone(&log);
            row_refreshed.connect(move |&(section, row)| log.lock().push(format!("{view}:{section}.{row}")));
        }

        row_refreshed.emit((1, 4));

        assert_eq!(row_refreshed.connection_count(), 3);
        assert_eq!(*log.lock(), vec!["outline:1.4", "detail:1.4", "status:1.4"]);
    }

    #[test]
    fn test_unsubscribed_slot_misses_later_emits() {
        let sections_changed = Signal::<Vec<usize>>::new();
        let (id, seen) = recorder(&sections_changed);
        let (_, other) = recorder(&sections_changed);

        sections_changed.emit(vec![0]);
        assert!(sections_changed.disconnect(id));
        sections_changed.emit(vec![3]);

        assert_eq!(*seen.lock(), vec![vec![0]]);
        assert_eq!(*other.lock(), vec![vec![0], vec![3]]);
        assert!(!sections_changed.disconnect(id));
        assert_eq!(sections_changed.try_disconnect(id), Err(SignalError::InvalidConnection));
    }

    #[test]
    fn test_blocked_emits_are_dropped_not_queued() {
        let row_refreshed = Signal::<(usize, usize)>::new();
        let (_, seen) = recorder(&row_refreshed);

        row_refreshed.set_blocked(true);
        row_refreshed.emit((0, 0));
        row_refreshed.emit((0, 1));
        assert!(row_refreshed.is_blocked());
        row_refreshed.set_blocked(false);
        row_refreshed.emit((0, 2));

        assert_eq!(*seen.lock(), vec![(0, 2)]);
        assert_eq!(row_refreshed.emission_count(), 1);
    }

    #[test]
    fn test_disconnect_all_empties_table() {
        let reloaded = Signal::<()>::new();
        let (_, seen) = recorder(&reloaded);
        reloaded.connect(|_| {});

        reloaded.disconnect_all();
        reloaded.emit(());

        assert_eq!(reloaded.connection_count(), 0);
        assert!(seen.lock().is_empty());
    }

    #[test]
    fn test_guard_drop_unsubscribes() {
        let reloaded = Signal::<()>::new();
        let seen = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&seen);
        let guard = reloaded.connect_scoped(move |_| *sink.lock() += 1);
        let id = guard.id();
        reloaded.emit(());
        drop(guard);
        reloaded.emit(());

        assert_eq!(*seen.lock(), 1);
        assert!(!reloaded.disconnect(id));
    }

    #[test]
    fn test_guard_may_outlive_signal() {
        let guard = Signal::<Vec<usize>>::new().connect_scoped(|_| {});
        drop(guard);
    }

    #[test]
    fn test_detach_keeps_subscription() {
        let reloaded = Signal::<()>::new();
        let id = reloaded.connect_scoped(|_| {}).detach();

        assert_eq!(reloaded.connection_count(), 1);
        assert!(reloaded.disconnect(id));
    }

    #[test]
    fn test_one_shot_slot_removes_itself() {
        let sections_changed = Arc::new(Signal::<Vec<usize>>::new());
        let first = Arc::new(Mutex::new(None));
        let slot_id = Arc::new(Mutex::new(None::<ConnectionId>));

        let signal = Arc::clone(&sections_changed);
        let sink = Arc::clone(&first);
        let own = Arc::clone(&slot_id);
        let id = sections_changed.connect(move |sections: &Vec<usize>| {
            sink.lock().get_or_insert_with(|| sections.clone());
            if let Some(id) = own.lock().take() {
                signal.disconnect(id);
            }
        });
        *slot_id.lock() = Some(id);

        sections_changed.emit(vec![1]);
        sections_changed.emit(vec![2]);

        assert_eq!(*first.lock(), Some(vec![1]));
        assert_eq!(sections_changed.connection_count(), 0);
    }
}
