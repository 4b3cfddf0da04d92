//! The reconciliation engine.
//!
//! [`TreeList`] owns one [`Section`] per group and applies incremental
//! mutations to them, reporting each as a single [`TreeChange`]. Sections are
//! resolved through a caller-supplied matcher over the group, so event
//! producers never need to track section numbers.

use std::collections::{BTreeSet, HashMap, HashSet};

use treelist_core::logging::targets;

use super::change::{ChangeKind, MoveSet, RowChanges, TreeChange};
use super::index::IndexPath;
use super::item::{TreeGroup, TreeItem};
use super::row::{Row, RowKey};
use super::section::Section;
use super::signals::TreeListSignals;
use crate::config::TreeListConfig;
use crate::error::{Result, TreeListError};

type Identity = (String, Option<String>);

/// A list of sections, each a pre-order flattened forest of rows.
///
/// All mutations take `&mut self`; the engine does no internal locking and
/// expects a single owner to serialize calls. Signals are delivered
/// synchronously before the mutating call returns.
///
/// # Example
///
/// ```
/// use treelist::model::{BasicGroup, BasicItem, TreeChange, TreeList};
///
/// let mut list = TreeList::new();
/// list.reload(vec![BasicGroup::new(
///     "Team",
///     vec![BasicItem::new("1", "Bob"), BasicItem::new("2", "Alice")],
/// )]);
/// assert_eq!(list.row_at(0, 0).map(|row| row.id()), Some("2"));
///
/// let change = list.insert(
///     vec![BasicItem::new("3", "Carol")],
///     None,
///     |group: &BasicGroup| group.display_name == "Team",
/// );
/// assert!(matches!(change, Some(TreeChange::Rows(_))));
/// ```
pub struct TreeList<G: TreeGroup> {
    sections: Vec<Section<G>>,
    config: TreeListConfig,
    signals: TreeListSignals,
}

impl<G: TreeGroup> Default for TreeList<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: TreeGroup> std::fmt::Debug for TreeList<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeList")
            .field("sections", &self.sections)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<G: TreeGroup> TreeList<G> {
    /// Creates an empty list with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeListConfig::default())
    }

    /// Creates an empty list with `config`.
    pub fn with_config(config: TreeListConfig) -> Self {
        Self {
            sections: Vec::new(),
            config,
            signals: TreeListSignals::new(),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &TreeListConfig {
        &self.config
    }

    /// Notification signals.
    pub fn signals(&self) -> &TreeListSignals {
        &self.signals
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replaces every section with one built from each of `groups`.
    ///
    /// An empty `groups` leaves the list without sections. Always emits
    /// [`TreeChange::Reloaded`].
    #[tracing::instrument(skip_all, target = "treelist::engine", level = "debug")]
    pub fn reload(&mut self, groups: impl IntoIterator<Item = G>) -> TreeChange {
        let expand = self.config.default_expanded;
        self.sections = groups
            .into_iter()
            .map(|group| Section::from_group(group, expand))
            .collect();
        tracing::debug!(
            target: targets::ENGINE,
            sections = self.sections.len(),
            rows = self.sections.iter().map(Section::len).sum::<usize>(),
            "reloaded"
        );

        let change = TreeChange::Reloaded;
        self.signals.emit(&change);
        change
    }

    /// Inserts `items` under the row whose id is `parent_id`, together with
    /// their child items.
    ///
    /// Items already present under the same parent id are skipped. When no
    /// row has id `parent_id`, the items become top-level rows that keep
    /// `parent_id`. Reported paths are post-insertion positions, ascending.
    ///
    /// Returns `None`, emitting nothing, when no section matches.
    #[tracing::instrument(skip_all, target = "treelist::engine", level = "debug", fields(parent_id = ?parent_id))]
    pub fn insert(
        &mut self,
        items: impl IntoIterator<Item = G::Item>,
        parent_id: Option<&str>,
        matcher: impl Fn(&G) -> bool,
    ) -> Option<TreeChange> {
        let index = self.find_section(&matcher)?;
        let section = &mut self.sections[index];

        let inserted = insert_items(section, items, parent_id);
        let mut positions = section.positions_of(&inserted);
        positions.sort_unstable();
        tracing::debug!(target: targets::ENGINE, section = index, rows = positions.len(), "inserted");

        let added = to_paths(index, positions);
        Some(self.notify(index, TreeChange::Rows(RowChanges::added(added))))
    }

    /// Removes `items` (matched by id under `parent_id`) and their subtrees.
    ///
    /// Reported paths are pre-removal positions; each item's subtree is
    /// listed bottom row first, ending with the item itself. Placeholders
    /// and unknown items are ignored.
    ///
    /// Returns `None`, emitting nothing, when no section matches.
    #[tracing::instrument(skip_all, target = "treelist::engine", level = "debug", fields(parent_id = ?parent_id))]
    pub fn remove(
        &mut self,
        items: impl IntoIterator<Item = G::Item>,
        parent_id: Option<&str>,
        matcher: impl Fn(&G) -> bool,
    ) -> Option<TreeChange> {
        let index = self.find_section(&matcher)?;
        let section = &mut self.sections[index];

        let items: Vec<G::Item> = items.into_iter().collect();
        let removed = remove_items(section, &items, parent_id);
        tracing::debug!(target: targets::ENGINE, section = index, rows = removed.len(), "removed");

        let removed = to_paths(index, removed.into_iter().map(|(position, _)| position));
        Some(self.notify(index, TreeChange::Rows(RowChanges::removed(removed))))
    }

    /// Replaces `items` (matched by id under `parent_id`) with new versions.
    ///
    /// When every item would land where it already is, the rows are
    /// replaced in place and reported as updated. Child rows are brought in
    /// line with the new items' child items: rows for dropped children are
    /// removed with their subtrees, rows for new children are added, and
    /// kept children are left as they are. Otherwise each item is removed
    /// with its subtree and inserted again with its new children, and the
    /// result is reported as updated rows (same positions), moves (same
    /// rows, new positions), or removals plus additions (subtree shape
    /// changed).
    ///
    /// Returns `None`, emitting nothing, when no section matches.
    #[tracing::instrument(skip_all, target = "treelist::engine", level = "debug", fields(parent_id = ?parent_id))]
    pub fn update(
        &mut self,
        items: impl IntoIterator<Item = G::Item>,
        parent_id: Option<&str>,
        matcher: impl Fn(&G) -> bool,
    ) -> Option<TreeChange> {
        let index = self.find_section(&matcher)?;
        let section = &mut self.sections[index];

        let items: Vec<G::Item> = items
            .into_iter()
            .filter(|item| !item.is_placeholder())
            .collect();

        let old: Vec<usize> = items
            .iter()
            .filter_map(|item| section.find_row(item.id(), parent_id))
            .collect();
        let parent = section.find_parent(parent_id);
        let new: Vec<usize> = items
            .iter()
            .map(|item| {
                let candidate = Row::new(item.clone(), parent_id.map(str::to_owned));
                section.insertion_point(&candidate, parent)
            })
            .collect();

        if old == new {
            let keys: Vec<RowKey> = old
                .iter()
                .filter_map(|&position| section.key_at(position))
                .collect();
            for (item, &position) in items.into_iter().zip(&old) {
                section.replace_item(position, item);
            }
            let (removed, added) = sync_children(section, &keys);
            tracing::debug!(
                target: targets::ENGINE,
                section = index,
                rows = old.len(),
                removed = removed.len(),
                added = added.len(),
                "updated in place"
            );
            let change = RowChanges {
                removed: to_paths(index, removed),
                added: to_paths(index, added),
                updated: to_paths(index, old),
            };
            return Some(self.notify(index, TreeChange::Rows(change)));
        }

        let removed = remove_items(section, &items, parent_id);
        let inserted = insert_items(section, items, parent_id);
        let added = section.positions_of(&inserted);

        let removed_set: BTreeSet<usize> = removed.iter().map(|(position, _)| *position).collect();
        let added_set: BTreeSet<usize> = added.iter().copied().collect();

        let change = if removed_set == added_set {
            tracing::debug!(target: targets::ENGINE, section = index, "update kept the same positions");
            TreeChange::Rows(RowChanges::updated(to_paths(index, removed_set)))
        } else if let Some(from) = pair_moves(section, &removed, &inserted) {
            tracing::debug!(target: targets::ENGINE, section = index, rows = from.len(), "rows moved");
            TreeChange::Moved(MoveSet {
                from: to_paths(index, from),
                to: to_paths(index, added),
            })
        } else {
            tracing::debug!(target: targets::ENGINE, section = index, "update changed subtree shape");
            let mut added = added;
            added.sort_unstable();
            TreeChange::Rows(RowChanges {
                removed: to_paths(index, removed.into_iter().map(|(position, _)| position)),
                added: to_paths(index, added),
                updated: Vec::new(),
            })
        };
        Some(self.notify(index, change))
    }

    /// Dispatches to [`insert`](Self::insert), [`remove`](Self::remove) or
    /// [`update`](Self::update).
    pub fn apply(
        &mut self,
        kind: ChangeKind,
        items: impl IntoIterator<Item = G::Item>,
        parent_id: Option<&str>,
        matcher: impl Fn(&G) -> bool,
    ) -> Option<TreeChange> {
        match kind {
            ChangeKind::Add => self.insert(items, parent_id, matcher),
            ChangeKind::Remove => self.remove(items, parent_id, matcher),
            ChangeKind::Change => self.update(items, parent_id, matcher),
        }
    }

    /// Expands or collapses section `section`, emitting
    /// [`TreeChange::SectionsChanged`]. Returns `None` if out of range.
    pub fn set_expanded(&mut self, section: usize, expanded: bool) -> Option<TreeChange> {
        self.sections.get_mut(section)?.set_expanded(expanded);
        tracing::debug!(target: targets::ENGINE, section, expanded, "section toggled");
        let change = TreeChange::SectionsChanged(vec![section]);
        self.signals.emit(&change);
        Some(change)
    }

    /// Flips the expand state of section `section`.
    pub fn toggle_section(&mut self, section: usize) -> Option<TreeChange> {
        let expanded = self.sections.get(section)?.is_expanded();
        self.set_expanded(section, !expanded)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Number of visible rows in `section`: 0 when collapsed or out of range.
    pub fn row_count(&self, section: usize) -> usize {
        self.sections.get(section).map_or(0, Section::visible_len)
    }

    /// Row at `index` in `section`, whether or not the section is expanded.
    pub fn row_at(&self, section: usize, index: usize) -> Option<&Row<G::Item>> {
        self.sections.get(section)?.row_at(index)
    }

    /// Row at `path`.
    pub fn row(&self, path: IndexPath) -> Option<&Row<G::Item>> {
        self.row_at(path.section, path.row)
    }

    /// All rows of `section` in flat order. Empty when out of range.
    pub fn rows(&self, section: usize) -> impl Iterator<Item = &Row<G::Item>> + '_ {
        self.sections.get(section).into_iter().flat_map(|s| s.rows())
    }

    /// Title of `section`.
    pub fn section_title(&self, section: usize) -> Option<&str> {
        self.sections.get(section).map(Section::title)
    }

    /// Section by number.
    pub fn section(&self, section: usize) -> Option<&Section<G>> {
        self.sections.get(section)
    }

    /// Mutable section handle, for expand/collapse without a notification.
    pub fn section_mut(&mut self, section: usize) -> Option<&mut Section<G>> {
        self.sections.get_mut(section)
    }

    /// All sections in order.
    pub fn sections(&self) -> &[Section<G>] {
        &self.sections
    }

    /// Number of the first section whose group satisfies `matcher`.
    pub fn section_index(&self, matcher: impl Fn(&G) -> bool) -> Result<usize> {
        self.sections
            .iter()
            .position(|section| matcher(section.group()))
            .ok_or(TreeListError::UnknownSection)
    }

    /// Index path of the row with id `id` under `parent_id` in `section`.
    pub fn locate(&self, section: usize, id: &str, parent_id: Option<&str>) -> Result<IndexPath> {
        let count = self.sections.len();
        let rows = self
            .sections
            .get(section)
            .ok_or(TreeListError::SectionOutOfRange { index: section, count })?;
        let row = rows
            .find_row(id, parent_id)
            .ok_or_else(|| TreeListError::unknown_row(id, parent_id))?;
        Ok(IndexPath::new(section, row))
    }

    /// Checks the pre-order and sibling-ordering invariants of every section.
    pub fn check_invariants(&self) -> Result<()> {
        self.sections
            .iter()
            .enumerate()
            .try_for_each(|(index, section)| section.check_invariants(index))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn find_section(&self, matcher: &impl Fn(&G) -> bool) -> Option<usize> {
        let index = self.section_index(matcher);
        if index.is_err() {
            tracing::debug!(target: targets::ENGINE, "no section matches, ignoring");
        }
        index.ok()
    }

    /// Emits `change` for an expanded section, or a section refresh for a
    /// collapsed one.
    fn notify(&mut self, index: usize, change: TreeChange) -> TreeChange {
        let section = &mut self.sections[index];
        let change = if section.is_expanded() {
            change
        } else {
            if self.config.reexpand_on_section_change {
                section.set_expanded(true);
            }
            TreeChange::SectionsChanged(vec![index])
        };
        self.signals.emit(&change);
        change
    }
}

fn to_paths(section: usize, rows: impl IntoIterator<Item = usize>) -> Vec<IndexPath> {
    rows.into_iter()
        .map(|row| IndexPath::new(section, row))
        .collect()
}

/// Inserts `items` and their descendants, returning the new rows' keys in
/// insertion order.
fn insert_items<G: TreeGroup>(
    section: &mut Section<G>,
    items: impl IntoIterator<Item = G::Item>,
    parent_id: Option<&str>,
) -> Vec<RowKey> {
    let mut inserted = Vec::new();
    for item in items {
        let row = Row::new(item, parent_id.map(str::to_owned));
        if section.find_row(row.id(), row.parent_id()).is_some() {
            tracing::trace!(target: targets::ENGINE, id = row.id(), "already present, skipping");
            continue;
        }
        let parent = section.find_parent(parent_id);
        if parent.is_none() && row.is_child() {
            tracing::debug!(
                target: targets::ENGINE,
                id = row.id(),
                parent_id = row.parent_id(),
                "parent not found, inserting at top level"
            );
        }
        insert_subtree(section, row, parent, &mut inserted);
    }
    inserted
}

fn insert_subtree<G: TreeGroup>(
    section: &mut Section<G>,
    row: Row<G::Item>,
    parent: Option<usize>,
    inserted: &mut Vec<RowKey>,
) {
    let children = row.child_rows();
    let index = section.insertion_point(&row, parent);
    inserted.push(section.insert_at(index, row, parent));
    insert_children(section, index, children, inserted);
}

/// Inserts each of `children` under the row at `parent` unless a row with
/// the same identity is already there.
fn insert_children<G: TreeGroup>(
    section: &mut Section<G>,
    parent: usize,
    children: Vec<Row<G::Item>>,
    inserted: &mut Vec<RowKey>,
) {
    for child in children {
        if section.children(parent).into_iter().any(|existing| *existing == child) {
            continue;
        }
        insert_subtree(section, child, Some(parent), inserted);
    }
}

/// Makes the child rows of each row in `keys` match its item's child items.
///
/// Returns the pre-removal positions of dropped rows (each dropped subtree
/// bottom row first) and the final positions of added rows, ascending.
fn sync_children<G: TreeGroup>(section: &mut Section<G>, keys: &[RowKey]) -> (Vec<usize>, Vec<usize>) {
    let mut stale = HashSet::new();
    let mut removed = Vec::new();
    for &key in keys {
        let (Some(position), Some(row)) = (section.position_of(key), section.row_by_key(key)) else {
            continue;
        };
        let wanted: HashSet<&str> = row.item().child_items().iter().map(TreeItem::id).collect();
        for child in section.child_positions(position).into_iter().rev() {
            if section.row_at(child).is_some_and(|row| wanted.contains(row.id())) {
                continue;
            }
            for stale_position in (child..section.subtree_end(child)).rev() {
                if let Some(stale_key) = section.key_at(stale_position) {
                    if stale.insert(stale_key) {
                        removed.push(stale_position);
                    }
                }
            }
        }
    }
    section.remove_keys(&stale);

    let mut inserted = Vec::new();
    for &key in keys {
        let Some(position) = section.position_of(key) else {
            continue;
        };
        let Some(children) = section.row_by_key(key).map(Row::child_rows) else {
            continue;
        };
        insert_children(section, position, children, &mut inserted);
    }
    let mut added = section.positions_of(&inserted);
    added.sort_unstable();
    (removed, added)
}

/// Removes `items` and their subtrees, returning each removed row's
/// pre-removal position and identity. Each item's subtree is listed in
/// reverse pre-order.
fn remove_items<G: TreeGroup>(
    section: &mut Section<G>,
    items: &[G::Item],
    parent_id: Option<&str>,
) -> Vec<(usize, Identity)> {
    let mut keys = HashSet::new();
    let mut removed = Vec::new();
    for item in items.iter().filter(|item| !item.is_placeholder()) {
        let Some(index) = section.find_row(item.id(), parent_id) else {
            tracing::debug!(target: targets::ENGINE, id = item.id(), ?parent_id, "row not found, skipping");
            continue;
        };
        for position in (index..section.subtree_end(index)).rev() {
            let Some(key) = section.key_at(position) else {
                continue;
            };
            if keys.insert(key) {
                if let Some(row) = section.row_by_key(key) {
                    removed.push((position, row.identity()));
                }
            }
        }
    }
    section.remove_keys(&keys);
    removed
}

/// Pairs every inserted row with a removed row of the same identity.
///
/// Returns the removed positions in the order of `inserted`, or `None` when
/// the two sets of rows differ.
fn pair_moves<G: TreeGroup>(
    section: &Section<G>,
    removed: &[(usize, Identity)],
    inserted: &[RowKey],
) -> Option<Vec<usize>> {
    if removed.len() != inserted.len() {
        return None;
    }
    let mut by_identity: HashMap<&Identity, Vec<usize>> = HashMap::new();
    for (position, identity) in removed {
        by_identity.entry(identity).or_default().push(*position);
    }
    inserted
        .iter()
        .map(|&key| {
            let identity = section.row_by_key(key)?.identity();
            by_identity.get_mut(&identity)?.pop()
        })
        .collect()
}

static_assertions::assert_impl_all!(TreeList<crate::model::BasicGroup>: Send, Sync);

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::model::{BasicGroup, BasicItem};

    fn team(list: &mut TreeList<BasicGroup>) {
        list.reload(vec![BasicGroup::new(
            "Team",
            vec![
                BasicItem::new("1", "Peter").with_children(vec![BasicItem::new("1.1", "Bob")]),
                BasicItem::new("2", "Fluk"),
            ],
        )]);
    }

    fn is_team(group: &BasicGroup) -> bool {
        group.display_name == "Team"
    }

    fn ids(list: &TreeList<BasicGroup>) -> Vec<&str> {
        list.rows(0).map(Row::id).collect()
    }

    #[test]
    fn test_reload_emits_once() {
        let mut list = TreeList::new();
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        list.signals()
            .changed
            .connect(move |change| changes_clone.lock().push(change.clone()));

        team(&mut list);
        assert_eq!(*changes.lock(), vec![TreeChange::Reloaded]);
        assert_eq!(ids(&list), vec!["2", "1", "1.1"]);
    }

    #[test]
    fn test_unmatched_section_is_noop() {
        let mut list = TreeList::new();
        team(&mut list);
        let change = list.insert(vec![BasicItem::new("9", "Zed")], None, |g: &BasicGroup| {
            g.display_name == "Nobody"
        });
        assert!(change.is_none());
        assert_eq!(list.section(0).map(Section::len), Some(3));
    }

    #[test]
    fn test_insert_with_missing_parent_goes_top_level() {
        let mut list = TreeList::new();
        team(&mut list);
        list.insert(vec![BasicItem::new("7", "Abe")], Some("404"), is_team);
        assert_eq!(ids(&list), vec!["7", "2", "1", "1.1"]);
        let row = list.row_at(0, 0).expect("abe");
        assert_eq!(row.parent_id(), Some("404"));
        assert_eq!(row.depth(), 0);
        list.check_invariants().expect("valid");
    }

    #[test]
    fn test_insert_brings_children() {
        let mut list = TreeList::new();
        team(&mut list);
        let change = list.insert(
            vec![BasicItem::new("3", "Gina").with_children(vec![
                BasicItem::new("3.2", "Zack"),
                BasicItem::new("3.1", "Amy"),
            ])],
            None,
            is_team,
        );
        assert_eq!(ids(&list), vec!["2", "3", "3.1", "3.2", "1", "1.1"]);
        assert_eq!(
            change,
            Some(TreeChange::Rows(RowChanges::added(to_paths(0, [1, 2, 3]))))
        );
    }

    #[test]
    fn test_placeholder_insert_and_remove() {
        let mut list = TreeList::new();
        team(&mut list);
        list.insert(vec![BasicItem::placeholder()], None, is_team);
        assert_eq!(list.rows(0).last().map(Row::is_placeholder), Some(true));

        let change = list.remove(vec![BasicItem::placeholder()], None, is_team);
        assert_eq!(change, Some(TreeChange::Rows(RowChanges::default())));
        assert_eq!(list.section(0).map(Section::len), Some(4));
    }

    #[test]
    fn test_collapsed_section_reports_section_change() {
        let mut list = TreeList::with_config(
            TreeListConfig::builder().reexpand_on_section_change(false).build(),
        );
        team(&mut list);
        list.set_expanded(0, false);

        let change = list.insert(vec![BasicItem::new("3", "Gina")], None, is_team);
        assert_eq!(change, Some(TreeChange::SectionsChanged(vec![0])));
        assert_eq!(list.row_count(0), 0);
    }

    #[test]
    fn test_collapsed_section_reexpands_by_default() {
        let mut list = TreeList::new();
        team(&mut list);
        list.toggle_section(0);
        assert_eq!(list.row_count(0), 0);

        list.remove(vec![BasicItem::new("2", "Fluk")], None, is_team);
        assert_eq!(list.row_count(0), 2);
    }

    #[test]
    fn test_locate() {
        let mut list = TreeList::new();
        team(&mut list);
        assert_eq!(list.locate(0, "1.1", Some("1")), Ok(IndexPath::new(0, 2)));
        assert_eq!(
            list.locate(0, "1.1", None),
            Err(TreeListError::unknown_row("1.1", None))
        );
        assert_eq!(
            list.locate(3, "1", None),
            Err(TreeListError::SectionOutOfRange { index: 3, count: 1 })
        );
    }

    #[test]
    fn test_apply_dispatches() {
        let mut list = TreeList::new();
        team(&mut list);
        list.apply(ChangeKind::Add, vec![BasicItem::new("3", "Gina")], None, is_team);
        assert_eq!(list.section(0).map(Section::len), Some(4));
        list.apply(ChangeKind::Remove, vec![BasicItem::new("3", "Gina")], None, is_team);
        assert_eq!(list.section(0).map(Section::len), Some(3));
        let change = list.apply(ChangeKind::Change, vec![BasicItem::new("2", "Fluk")], None, is_team);
        assert_eq!(change, Some(TreeChange::Rows(RowChanges::updated(to_paths(0, [0])))));
    }
}
