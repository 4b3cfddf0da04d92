//! Rows: one item plus its position in the hierarchy.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use slotmap::new_key_type;

use super::item::TreeItem;

new_key_type! {
    /// Arena key of a row inside its section.
    ///
    /// Keys stay valid while the row exists, across insertions and removals
    /// of other rows. A row removed and re-inserted (for example by a
    /// position-changing update) gets a new key.
    pub struct RowKey;
}

/// A tree node bound to one domain item.
///
/// Rows are compared by identity: two rows are equal when they wrap items
/// with the same id under the same parent id. Children are not part of
/// equality, and are not stored on the row at all; the owning section
/// derives them from its flat pre-order sequence.
///
/// Ordering follows the hierarchy first: a row sorts before its own children
/// and after its own parent. Unrelated rows are ordered by the item
/// comparator, with the item id breaking ties so distinct siblings never
/// compare equal. Placeholder rows sort after every real row.
#[derive(Debug, Clone)]
pub struct Row<I> {
    item: I,
    parent_id: Option<String>,
    row_identifier: String,
    pub(crate) depth: usize,
    pub(crate) parent: Option<RowKey>,
    pub(crate) descendants: usize,
}

impl<I: TreeItem> Row<I> {
    /// Creates a row for `item` under the parent with `parent_id`.
    pub fn new(item: I, parent_id: Option<String>) -> Self {
        let row_identifier = parent_id
            .clone()
            .unwrap_or_else(|| item.id().to_owned());
        Self {
            item,
            parent_id,
            row_identifier,
            depth: 0,
            parent: None,
            descendants: 0,
        }
    }

    /// Creates a root row (no parent id).
    pub fn root(item: I) -> Self {
        Self::new(item, None)
    }

    /// The wrapped domain item.
    pub fn item(&self) -> &I {
        &self.item
    }

    /// The wrapped item's id.
    pub fn id(&self) -> &str {
        self.item.id()
    }

    /// Id of the owning parent item, absent for root rows.
    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Reuse hint for the presentation layer: the parent id if present,
    /// otherwise the item id. Not used for equality.
    pub fn row_identifier(&self) -> &str {
        &self.row_identifier
    }

    /// Nesting depth inside the section (0 for top-level rows).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of rows in this row's subtree, excluding the row itself.
    pub fn descendant_count(&self) -> usize {
        self.descendants
    }

    /// Returns `true` if the row has a non-empty parent id.
    pub fn is_child(&self) -> bool {
        self.parent_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Returns `true` if the row renders the "no results" sentinel.
    pub fn is_placeholder(&self) -> bool {
        self.item.is_placeholder()
    }

    /// Ids selected when this row is picked: its own id followed by the ids
    /// of the item's direct children.
    pub fn selection_ids(&self) -> Vec<String> {
        std::iter::once(self.item.id())
            .chain(self.item.child_items().iter().map(TreeItem::id))
            .map(str::to_owned)
            .collect()
    }

    /// Returns `true` if `self` sorts strictly before `other`.
    pub fn is_ordered_before(&self, other: &Self) -> bool {
        if self.is_placeholder() {
            return false;
        }
        if other.is_placeholder() {
            return true;
        }
        if other.parent_id() == Some(self.id()) {
            return true;
        }
        if self.parent_id() == Some(other.id()) {
            return false;
        }
        if self.item.is_ordered_before(&other.item) {
            return true;
        }
        if other.item.is_ordered_before(&self.item) {
            return false;
        }
        self.id() < other.id()
    }

    /// Total-order view of [`is_ordered_before`](Self::is_ordered_before), for sorting.
    pub fn ordering(&self, other: &Self) -> Ordering {
        if self.is_ordered_before(other) {
            Ordering::Less
        } else if other.is_ordered_before(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Rows for the item's children, parented to this row and sorted.
    pub(crate) fn child_rows(&self) -> Vec<Row<I>> {
        let mut children: Vec<Row<I>> = self
            .item
            .child_items()
            .iter()
            .cloned()
            .map(|child| Row::new(child, Some(self.id().to_owned())))
            .collect();
        children.sort_by(|a, b| a.ordering(b));
        children
    }

    /// Swaps in a new version of the item, keeping identity and position.
    pub(crate) fn replace_item(&mut self, item: I) -> I {
        std::mem::replace(&mut self.item, item)
    }

    /// Identity pair used to pair removed and re-inserted rows.
    pub(crate) fn identity(&self) -> (String, Option<String>) {
        (self.id().to_owned(), self.parent_id.clone())
    }
}

impl<I: TreeItem> PartialEq for Row<I> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.parent_id == other.parent_id
    }
}

impl<I: TreeItem> Eq for Row<I> {}

impl<I: TreeItem> Hash for Row<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
        self.parent_id.hash(state);
    }
}

impl<I: TreeItem> PartialOrd for Row<I> {
    /// Equal rows compare `Equal`; otherwise the structural order applies.
    /// Rows that neither precede nor follow each other (placeholders) are
    /// incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        match self.ordering(other) {
            Ordering::Equal => None,
            ordering => Some(ordering),
        }
    }
}
