//! Capability traits for the domain data a tree list displays.
//!
//! The engine is generic over a [`TreeGroup`] and its [`TreeItem`] type.
//! Hosts implement these for their own types; [`BasicItem`] and
//! [`BasicGroup`] are ready-made implementations ordered by display name.

use serde::{Deserialize, Serialize};

use super::row::Row;

/// A domain item that can appear as a row in a tree list.
///
/// Implement this trait for types that should be directly usable as rows.
/// An item with an empty [`id`](TreeItem::id) is a placeholder: it renders
/// as a "no results" sentinel and never matches identity lookups.
///
/// # Example
///
/// ```
/// use treelist::model::TreeItem;
///
/// #[derive(Clone)]
/// struct Channel {
///     id: String,
///     name: String,
///     members: Vec<Channel>,
/// }
///
/// impl TreeItem for Channel {
///     fn id(&self) -> &str {
///         &self.id
///     }
///
///     fn display_name(&self) -> &str {
///         &self.name
///     }
///
///     fn child_items(&self) -> &[Self] {
///         &self.members
///     }
///
///     fn is_ordered_before(&self, other: &Self) -> bool {
///         self.name < other.name
///     }
/// }
/// ```
pub trait TreeItem: Clone {
    /// Stable identity of the item. Empty for placeholder items.
    fn id(&self) -> &str;

    /// Primary display text.
    fn display_name(&self) -> &str;

    /// Secondary display text.
    fn sub_name(&self) -> &str {
        ""
    }

    /// The item's direct children, in any order.
    fn child_items(&self) -> &[Self];

    /// Returns `true` if `self` sorts strictly before `other` among siblings.
    fn is_ordered_before(&self, other: &Self) -> bool;

    /// Returns `true` for the "no results" sentinel.
    fn is_placeholder(&self) -> bool {
        self.id().is_empty()
    }
}

/// A named collection of top-level items; one group becomes one section.
pub trait TreeGroup {
    /// The item type stored in this group.
    type Item: TreeItem;

    /// Section title.
    fn display_name(&self) -> &str;

    /// The group's top-level items.
    fn items(&self) -> &[Self::Item];

    /// The group's items converted into root rows.
    fn rows(&self) -> Vec<Row<Self::Item>> {
        self.items().iter().cloned().map(Row::root).collect()
    }
}

/// A general-purpose item ordered by display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicItem {
    /// Item identity.
    pub id: String,
    /// Primary display text, also the sort key.
    pub display_name: String,
    /// Secondary display text.
    #[serde(default)]
    pub sub_name: String,
    /// Child items.
    #[serde(default)]
    pub children: Vec<BasicItem>,
}

impl BasicItem {
    /// Creates a leaf item.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    /// Creates the "no results" placeholder item.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Sets the secondary display text.
    pub fn with_sub_name(mut self, sub_name: impl Into<String>) -> Self {
        self.sub_name = sub_name.into();
        self
    }

    /// Sets the child items.
    pub fn with_children(mut self, children: Vec<BasicItem>) -> Self {
        self.children = children;
        self
    }
}

impl TreeItem for BasicItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn sub_name(&self) -> &str {
        &self.sub_name
    }

    fn child_items(&self) -> &[Self] {
        &self.children
    }

    fn is_ordered_before(&self, other: &Self) -> bool {
        self.display_name < other.display_name
    }
}

/// A named list of [`BasicItem`]s.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BasicGroup {
    /// Section title.
    pub display_name: String,
    /// Top-level items.
    #[serde(default)]
    pub items: Vec<BasicItem>,
}

impl BasicGroup {
    /// Creates a group with the given title and top-level items.
    pub fn new(display_name: impl Into<String>, items: Vec<BasicItem>) -> Self {
        Self {
            display_name: display_name.into(),
            items,
        }
    }
}

impl TreeGroup for BasicGroup {
    type Item = BasicItem;

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn items(&self) -> &[BasicItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_item_ordering() {
        let alice = BasicItem::new("2", "Alice");
        let bob = BasicItem::new("1", "Bob");
        assert!(alice.is_ordered_before(&bob));
        assert!(!bob.is_ordered_before(&alice));
        assert!(!alice.is_ordered_before(&alice));
    }

    #[test]
    fn test_placeholder() {
        assert!(BasicItem::placeholder().is_placeholder());
        assert!(!BasicItem::new("1", "Peter").is_placeholder());
    }

    #[test]
    fn test_group_rows_are_roots() {
        let group = BasicGroup::new(
            "Team",
            vec![
                BasicItem::new("1", "Peter").with_children(vec![BasicItem::new("1.1", "Bob")]),
                BasicItem::new("2", "Fluk"),
            ],
        );
        let rows = group.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.parent_id().is_none()));
        assert_eq!(rows[0].item().child_items().len(), 1);
    }

    #[test]
    fn test_basic_group_from_json() {
        let json = r#"{
            "display_name": "Team",
            "items": [
                { "id": "1", "display_name": "Peter",
                  "children": [{ "id": "1.1", "display_name": "Bob" }] }
            ]
        }"#;
        let group: BasicGroup = serde_json::from_str(json).expect("valid group json");
        assert_eq!(group.items[0].children[0].display_name, "Bob");
        assert_eq!(group.items[0].sub_name, "");
    }
}
