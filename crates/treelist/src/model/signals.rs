//! Notification signals of a tree list.

use treelist_core::Signal;

use super::change::{MoveSet, RowChanges, TreeChange};

/// Signals emitted by a [`TreeList`](crate::model::TreeList).
///
/// Every notification is delivered twice: once on `changed` as a
/// [`TreeChange`], and once on the matching fine-grained signal. Connect to
/// whichever is more convenient.
///
/// # Example
///
/// ```
/// use treelist::model::{BasicGroup, TreeChange, TreeList};
///
/// let mut list = TreeList::<BasicGroup>::new();
/// list.signals().changed.connect(|change| {
///     if let TreeChange::Rows(rows) = change {
///         println!("{} rows added", rows.added.len());
///     }
/// });
/// list.reload(Vec::new());
/// ```
pub struct TreeListSignals {
    /// Every notification.
    pub changed: Signal<TreeChange>,

    /// Emitted after a full reload.
    pub reloaded: Signal<()>,

    /// Emitted when whole sections must be re-read.
    /// Args: section numbers
    pub sections_changed: Signal<Vec<usize>>,

    /// Emitted after row-level edits in an expanded section.
    pub rows_changed: Signal<RowChanges>,

    /// Emitted after rows changed position.
    pub rows_moved: Signal<MoveSet>,
}

impl Default for TreeListSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeListSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeListSignals")
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

impl TreeListSignals {
    /// Creates a new set of signals.
    pub fn new() -> Self {
        Self {
            changed: Signal::new(),
            reloaded: Signal::new(),
            sections_changed: Signal::new(),
            rows_changed: Signal::new(),
            rows_moved: Signal::new(),
        }
    }

    /// Delivers `change` on the fine-grained signal, then on `changed`.
    pub fn emit(&self, change: &TreeChange) {
        match change {
            TreeChange::Reloaded => self.reloaded.emit(()),
            TreeChange::SectionsChanged(sections) => self.sections_changed.emit(sections.clone()),
            TreeChange::Rows(rows) => self.rows_changed.emit(rows.clone()),
            TreeChange::Moved(moves) => self.rows_moved.emit(moves.clone()),
        }
        self.changed.emit(change.clone());
    }

    /// Blocks or unblocks every signal.
    pub fn set_blocked(&self, blocked: bool) {
        self.changed.set_blocked(blocked);
        self.reloaded.set_blocked(blocked);
        self.sections_changed.set_blocked(blocked);
        self.rows_changed.set_blocked(blocked);
        self.rows_moved.set_blocked(blocked);
    }

    /// Disconnects every slot from every signal.
    pub fn disconnect_all(&self) {
        self.changed.disconnect_all();
        self.reloaded.disconnect_all();
        self.sections_changed.disconnect_all();
        self.rows_changed.disconnect_all();
        self.rows_moved.disconnect_all();
    }
}

static_assertions::assert_impl_all!(TreeListSignals: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::model::IndexPath;

    #[test]
    fn test_emit_reaches_both_signals() {
        let signals = TreeListSignals::new();
        let all = Arc::new(Mutex::new(Vec::new()));
        let rows = Arc::new(Mutex::new(Vec::new()));

        let all_clone = all.clone();
        signals.changed.connect(move |change| all_clone.lock().push(change.clone()));
        let rows_clone = rows.clone();
        signals.rows_changed.connect(move |r| rows_clone.lock().push(r.clone()));

        let change = TreeChange::Rows(RowChanges::added(vec![IndexPath::new(0, 1)]));
        signals.emit(&change);
        signals.emit(&TreeChange::Reloaded);

        assert_eq!(*all.lock(), vec![change, TreeChange::Reloaded]);
        assert_eq!(rows.lock().len(), 1);
    }

    #[test]
    fn test_blocked_signals_stay_quiet() {
        let signals = TreeListSignals::new();
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        signals.changed.connect(move |_| *hits_clone.lock() += 1);

        signals.set_blocked(true);
        signals.emit(&TreeChange::Reloaded);
        signals.set_blocked(false);
        signals.emit(&TreeChange::Reloaded);

        assert_eq!(*hits.lock(), 1);
    }
}
