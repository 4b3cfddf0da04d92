//! Change notifications emitted by the engine.
//!
//! Every mutation produces exactly one [`TreeChange`]. A consumer applies it
//! to its own flat list:
//!
//! - `Reloaded`: drop everything and re-read.
//! - `SectionsChanged`: re-read whole sections (used for collapsed sections).
//! - `Rows`: delete `removed` and refresh `updated` (both pre-operation
//!   positions), and insert `added` (post-operation positions), as one batch.
//! - `Moved`: move each `from[i]` to `to[i]`, in [`MoveSet::apply_order`].

use serde::{Deserialize, Serialize};

use super::index::IndexPath;

/// Kind of incremental mutation, as delivered by a host's change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Items were added.
    Add,
    /// Items were removed.
    Remove,
    /// Items changed in place (possibly changing their sort position).
    Change,
}

/// Row-level edits within expanded sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChanges {
    /// Positions in the list before the operation.
    pub removed: Vec<IndexPath>,
    /// Positions in the list after the operation, ascending.
    pub added: Vec<IndexPath>,
    /// Positions in the list before the operation of rows whose content
    /// changed without moving.
    pub updated: Vec<IndexPath>,
}

impl RowChanges {
    /// Only removals.
    pub fn removed(removed: Vec<IndexPath>) -> Self {
        Self { removed, ..Default::default() }
    }

    /// Only additions.
    pub fn added(added: Vec<IndexPath>) -> Self {
        Self { added, ..Default::default() }
    }

    /// Only in-place updates.
    pub fn updated(updated: Vec<IndexPath>) -> Self {
        Self { updated, ..Default::default() }
    }

    /// Returns `true` if no row is touched.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty() && self.updated.is_empty()
    }
}

/// Paired row moves: `from[i]` moved to `to[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSet {
    /// Positions before the operation.
    pub from: Vec<IndexPath>,
    /// Positions after the operation.
    pub to: Vec<IndexPath>,
}

impl MoveSet {
    /// Number of moved rows.
    pub fn len(&self) -> usize {
        self.from.len()
    }

    /// Returns `true` if nothing moved.
    pub fn is_empty(&self) -> bool {
        self.from.is_empty()
    }

    /// `(from, to)` pairs in emission order.
    pub fn pairs(&self) -> impl Iterator<Item = (IndexPath, IndexPath)> + '_ {
        self.from.iter().copied().zip(self.to.iter().copied())
    }

    /// Pairs in the order a list widget should apply single-row moves.
    ///
    /// Downward moves are applied bottom row first and upward moves top row
    /// first, so earlier moves do not shift the source of later ones. The
    /// direction is taken from the first pair only: a set that moves some
    /// rows up and others down (for example two updated items trading
    /// places) has no single safe order and should be applied as one batch
    /// move instead of one row at a time.
    pub fn apply_order(&self) -> Vec<(IndexPath, IndexPath)> {
        let mut pairs: Vec<_> = self.pairs().collect();
        let moving_down = pairs.first().is_some_and(|(from, to)| from < to);
        if moving_down {
            pairs.sort_by(|a, b| b.0.cmp(&a.0));
        } else {
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
        }
        pairs
    }
}

/// One change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeChange {
    /// The whole list was rebuilt.
    Reloaded,
    /// These sections must be re-read in full.
    SectionsChanged(Vec<usize>),
    /// Row-level edits.
    Rows(RowChanges),
    /// Rows moved to new positions.
    Moved(MoveSet),
}

impl TreeChange {
    /// Returns `true` if the notification carries no work for a consumer.
    ///
    /// `Reloaded` is never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            TreeChange::Reloaded => false,
            TreeChange::SectionsChanged(sections) => sections.is_empty(),
            TreeChange::Rows(rows) => rows.is_empty(),
            TreeChange::Moved(moves) => moves.is_empty(),
        }
    }

    /// Row edits, if this is a `Rows` notification.
    pub fn as_rows(&self) -> Option<&RowChanges> {
        match self {
            TreeChange::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Moves, if this is a `Moved` notification.
    pub fn as_moves(&self) -> Option<&MoveSet> {
        match self {
            TreeChange::Moved(moves) => Some(moves),
            _ => None,
        }
    }
}
