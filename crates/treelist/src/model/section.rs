//! Sections: one group's rows, flattened in pre-order.
//!
//! A section keeps its rows in a [`SlotMap`] arena and a single `Vec` of
//! keys in depth-first pre-order. The flat order is the only structural
//! record: a row's children and subtree span are derived from it, and each
//! row caches its depth, parent key and descendant count, which the section
//! keeps in step on every insertion and removal.

use std::collections::{HashMap, HashSet};

use slotmap::SlotMap;

use treelist_core::logging::targets;

use super::item::TreeGroup;
use super::row::{Row, RowKey};
use crate::error::{Result, TreeListError};

/// An ordered, flattened view of one top-level group, plus its
/// expand/collapse state.
pub struct Section<G: TreeGroup> {
    title: String,
    group: G,
    rows: SlotMap<RowKey, Row<G::Item>>,
    order: Vec<RowKey>,
    expand: bool,
}

impl<G: TreeGroup> std::fmt::Debug for Section<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Section")
            .field("title", &self.title)
            .field("rows", &self.order.len())
            .field("expand", &self.expand)
            .finish()
    }
}

impl<G: TreeGroup> Section<G> {
    /// Builds a section from `group`, flattening its item trees in pre-order
    /// with siblings in ascending order.
    pub fn from_group(group: G, expand: bool) -> Self {
        let mut roots = group.rows();
        roots.sort_by(|a, b| a.ordering(b));

        let mut section = Self {
            title: group.display_name().to_owned(),
            group,
            rows: SlotMap::with_key(),
            order: Vec::new(),
            expand,
        };
        for row in roots {
            section.push_subtree(row, None);
        }
        section
    }

    fn push_subtree(&mut self, row: Row<G::Item>, parent: Option<RowKey>) {
        let children = row.child_rows();
        let index = self.order.len();
        let key = self.attach(index, row, parent);
        for child in children {
            self.push_subtree(child, Some(key));
        }
    }

    /// Section title (the group's display name).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The group this section was built from.
    pub fn group(&self) -> &G {
        &self.group
    }

    /// Whether the section's rows are visible.
    pub fn is_expanded(&self) -> bool {
        self.expand
    }

    /// Expands or collapses the section.
    pub fn set_expanded(&mut self, expand: bool) {
        self.expand = expand;
    }

    /// Total number of rows, visible or not.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the section has no rows.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of rows a list should display: 0 while collapsed.
    pub fn visible_len(&self) -> usize {
        if self.expand { self.order.len() } else { 0 }
    }

    /// Row at flat position `index`.
    pub fn row_at(&self, index: usize) -> Option<&Row<G::Item>> {
        self.order.get(index).map(|&key| &self.rows[key])
    }

    /// Arena key of the row at flat position `index`.
    pub fn key_at(&self, index: usize) -> Option<RowKey> {
        self.order.get(index).copied()
    }

    /// Row by arena key.
    pub fn row_by_key(&self, key: RowKey) -> Option<&Row<G::Item>> {
        self.rows.get(key)
    }

    /// All rows in flat order.
    pub fn rows(&self) -> impl Iterator<Item = &Row<G::Item>> + '_ {
        self.order.iter().map(move |&key| &self.rows[key])
    }

    /// Flat position of the row with arena key `key`.
    pub fn position_of(&self, key: RowKey) -> Option<usize> {
        self.order.iter().position(|&k| k == key)
    }

    /// Flat position of the row matching `(id, parent_id)` exactly.
    ///
    /// Empty ids never match, and an absent parent id only matches an
    /// absent parent id.
    pub fn find_row(&self, id: &str, parent_id: Option<&str>) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.rows()
            .position(|row| row.id() == id && row.parent_id() == parent_id)
    }

    /// Flat position of the first row whose item id is `parent_id`.
    pub fn find_parent(&self, parent_id: Option<&str>) -> Option<usize> {
        let parent_id = parent_id.filter(|id| !id.is_empty())?;
        self.rows().position(|row| row.id() == parent_id)
    }

    /// Number of rows in the subtree below `index`.
    pub fn descendant_count(&self, index: usize) -> usize {
        self.row_at(index).map_or(0, Row::descendant_count)
    }

    /// One past the last flat position of the subtree rooted at `index`.
    pub fn subtree_end(&self, index: usize) -> usize {
        index + 1 + self.descendant_count(index)
    }

    /// Flat position of the parent row of the row at `index`.
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        let parent = self.row_at(index)?.parent?;
        self.order[..index].iter().rposition(|&k| k == parent)
    }

    /// Flat positions of the direct children of the row at `index`.
    pub fn child_positions(&self, index: usize) -> Vec<usize> {
        let mut children = Vec::new();
        if index >= self.order.len() {
            return children;
        }
        let end = self.subtree_end(index);
        let mut child = index + 1;
        while child < end {
            children.push(child);
            child = self.subtree_end(child);
        }
        children
    }

    /// The direct children of the row at `index`, in order.
    pub fn children(&self, index: usize) -> Vec<&Row<G::Item>> {
        self.child_positions(index)
            .into_iter()
            .filter_map(|position| self.row_at(position))
            .collect()
    }

    /// Flat position at which `candidate` would be inserted.
    ///
    /// Scans the parent's subtree (or the whole section for roots), treating
    /// each sibling plus its descendants as one block, and stops at the first
    /// sibling that does not sort before `candidate`.
    pub fn insertion_point(&self, candidate: &Row<G::Item>, parent: Option<usize>) -> usize {
        let (mut index, end) = match parent {
            Some(parent) => (parent + 1, self.subtree_end(parent)),
            None => (0, self.order.len()),
        };
        while index < end {
            let existing = &self.rows[self.order[index]];
            if !existing.is_ordered_before(candidate) {
                break;
            }
            index = self.subtree_end(index);
        }
        tracing::trace!(
            target: targets::SECTION,
            id = candidate.id(),
            ?parent,
            index,
            "insertion point"
        );
        index
    }

    /// Inserts `row` at flat position `index` as a child of the row at
    /// `parent` (or as a root), returning its arena key.
    pub(crate) fn insert_at(
        &mut self,
        index: usize,
        row: Row<G::Item>,
        parent: Option<usize>,
    ) -> RowKey {
        let parent_key = parent.and_then(|position| self.key_at(position));
        self.attach(index, row, parent_key)
    }

    fn attach(&mut self, index: usize, mut row: Row<G::Item>, parent: Option<RowKey>) -> RowKey {
        row.parent = parent;
        row.depth = parent.map_or(0, |key| self.rows[key].depth + 1);
        row.descendants = 0;
        let key = self.rows.insert(row);
        self.order.insert(index, key);

        let mut ancestor = parent;
        while let Some(key) = ancestor {
            let row = &mut self.rows[key];
            row.descendants += 1;
            ancestor = row.parent;
        }
        key
    }

    /// Replaces the item of the row at `index`, keeping its position.
    pub(crate) fn replace_item(&mut self, index: usize, item: G::Item) -> Option<G::Item> {
        let key = self.key_at(index)?;
        Some(self.rows[key].replace_item(item))
    }

    /// Removes every row in `keys`. Each removed row's subtree must be
    /// contained in `keys`.
    pub(crate) fn remove_keys(&mut self, keys: &HashSet<RowKey>) -> Vec<Row<G::Item>> {
        for &key in keys {
            let mut ancestor = self.rows.get(key).and_then(|row| row.parent);
            while let Some(ancestor_key) = ancestor {
                let row = &mut self.rows[ancestor_key];
                if !keys.contains(&ancestor_key) {
                    row.descendants -= 1;
                }
                ancestor = row.parent;
            }
        }
        self.order.retain(|key| !keys.contains(key));
        keys.iter().filter_map(|&key| self.rows.remove(key)).collect()
    }

    /// Flat positions of `keys`, in the same order as `keys`. Keys no longer
    /// present are skipped.
    pub(crate) fn positions_of(&self, keys: &[RowKey]) -> Vec<usize> {
        let positions: HashMap<RowKey, usize> = self
            .order
            .iter()
            .enumerate()
            .map(|(position, &key)| (key, position))
            .collect();
        keys.iter()
            .filter_map(|key| positions.get(key).copied())
            .collect()
    }

    /// Checks the pre-order and sibling-ordering invariants.
    ///
    /// `section` is only used to label the error.
    pub fn check_invariants(&self, section: usize) -> Result<()> {
        let violation = |row: usize, message: String| TreeListError::InvariantViolation {
            section,
            row,
            message,
        };

        let mut stack: Vec<(RowKey, usize)> = Vec::new();
        for (index, &key) in self.order.iter().enumerate() {
            while stack.last().is_some_and(|&(_, end)| end <= index) {
                stack.pop();
            }

            let row = &self.rows[key];
            let expected_parent = stack.last().map(|&(parent, _)| parent);
            if row.parent != expected_parent {
                return Err(violation(index, "row is not inside its parent's subtree".into()));
            }
            if row.depth != stack.len() {
                return Err(violation(
                    index,
                    format!("depth {} but nested {} levels deep", row.depth, stack.len()),
                ));
            }
            if let Some(parent) = expected_parent {
                if row.parent_id() != Some(self.rows[parent].id()) {
                    return Err(violation(index, "parent id does not match parent row".into()));
                }
            }

            let end = index + 1 + row.descendants;
            if end > self.order.len() {
                return Err(violation(index, "subtree runs past the end of the section".into()));
            }
            if let Some(&(_, parent_end)) = stack.last() {
                if end > parent_end {
                    return Err(violation(index, "subtree overlaps its parent's end".into()));
                }
            }

            if end < stack.last().map_or(self.order.len(), |&(_, parent_end)| parent_end) {
                let next = &self.rows[self.order[end]];
                if next.parent == row.parent && next.is_ordered_before(row) {
                    return Err(violation(
                        end,
                        format!("'{}' sorts before its previous sibling '{}'", next.id(), row.id()),
                    ));
                }
            }

            stack.push((key, end));
        }

        tracing::trace!(target: targets::SECTION, section, rows = self.order.len(), "invariants hold");
        Ok(())
    }
}
