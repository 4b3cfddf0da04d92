//! Tree dumps of sections for diagnostics.
//!
//! ```
//! use treelist::debug::SectionTreeDebug;
//! use treelist::model::{BasicGroup, BasicItem, TreeList};
//! use treelist::{TreeFormatOptions, TreeStyle};
//!
//! let mut list = TreeList::new();
//! list.reload(vec![BasicGroup::new(
//!     "Team",
//!     vec![BasicItem::new("1", "Peter").with_children(vec![BasicItem::new("1.1", "Bob")])],
//! )]);
//!
//! let options = TreeFormatOptions { style: TreeStyle::Ascii, ..Default::default() };
//! if let Some(section) = list.section(0) {
//!     println!("{}", SectionTreeDebug::with_options(section, options));
//! }
//! ```

use std::fmt;

use treelist_core::TreeFormatOptions;

use crate::model::{Row, Section, TreeGroup, TreeItem, TreeList};

/// Renders one section's rows as an indented tree.
pub struct SectionTreeDebug<'a, G: TreeGroup> {
    section: &'a Section<G>,
    options: TreeFormatOptions,
}

impl<'a, G: TreeGroup> SectionTreeDebug<'a, G> {
    /// Create a visualizer with default options.
    pub fn new(section: &'a Section<G>) -> Self {
        Self::with_options(section, TreeFormatOptions::default())
    }

    /// Create a visualizer with custom options.
    pub fn with_options(section: &'a Section<G>, options: TreeFormatOptions) -> Self {
        Self { section, options }
    }

    fn is_last_sibling(&self, index: usize) -> bool {
        let scope_end = self
            .section
            .parent_of(index)
            .map_or(self.section.len(), |parent| self.section.subtree_end(parent));
        self.section.subtree_end(index) >= scope_end
    }

    fn write_row(&self, f: &mut fmt::Formatter<'_>, index: usize, row: &Row<G::Item>) -> fmt::Result {
        if self.options.show_positions {
            write!(f, "{index:>3} ")?;
        }
        f.write_str(&self.options.prefix(row.depth(), self.is_last_sibling(index)))?;

        if row.is_placeholder() {
            return writeln!(f, "(no results)");
        }
        f.write_str(row.item().display_name())?;
        if self.options.show_ids {
            write!(f, " [{}]", row.id())?;
        }
        if self.options.show_parent_ids {
            if let Some(parent_id) = row.parent_id() {
                write!(f, " (parent: {parent_id})")?;
            }
        }
        writeln!(f)
    }
}

impl<G: TreeGroup> fmt::Display for SectionTreeDebug<'_, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.section.is_expanded() { "" } else { ", collapsed" };
        writeln!(f, "{} ({} rows{state}):", self.section.title(), self.section.len())?;

        if self.section.is_empty() {
            return writeln!(f, "  (empty)");
        }
        for (index, row) in self.section.rows().enumerate() {
            if self.options.max_depth.is_some_and(|max| row.depth() > max) {
                continue;
            }
            self.write_row(f, index, row)?;
        }
        Ok(())
    }
}

/// Renders every section of `list`, one tree after another.
pub fn format_tree_list<G: TreeGroup>(list: &TreeList<G>, options: &TreeFormatOptions) -> String {
    let mut output = String::new();
    for section in list.sections() {
        output.push_str(&SectionTreeDebug::with_options(section, options.clone()).to_string());
    }
    output
}

#[cfg(test)]
mod tests {
    use treelist_core::TreeStyle;

    use super::*;
    use crate::model::{BasicGroup, BasicItem};

    fn section() -> Section<BasicGroup> {
        Section::from_group(
            BasicGroup::new(
                "Team",
                vec![
                    BasicItem::new("1", "Peter").with_children(vec![
                        BasicItem::new("1.1", "Bob"),
                        BasicItem::new("1.2", "Alice"),
                    ]),
                    BasicItem::new("2", "Quinn"),
                ],
            ),
            true,
        )
    }

    #[test]
    fn test_ascii_tree() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        let section = section();
        let output = SectionTreeDebug::with_options(&section, options).to_string();
        assert_eq!(
            output,
            "Team (4 rows):\nPeter [1]\n+-- Alice [1.2]\n`-- Bob [1.1]\nQuinn [2]\n"
        );
    }

    #[test]
    fn test_minimal_with_max_depth() {
        let options = TreeFormatOptions {
            max_depth: Some(0),
            ..TreeFormatOptions::minimal()
        };
        let section = section();
        let output = SectionTreeDebug::with_options(&section, options).to_string();
        assert_eq!(output, "Team (4 rows):\nPeter\nQuinn\n");
    }

    #[test]
    fn test_detailed_shows_parents_and_positions() {
        let section = section();
        let output =
            SectionTreeDebug::with_options(&section, TreeFormatOptions::detailed()).to_string();
        assert!(output.contains("  1 "));
        assert!(output.contains("Alice [1.2] (parent: 1)"));
    }

    #[test]
    fn test_format_tree_list_covers_every_section() {
        let mut list = TreeList::new();
        list.reload(vec![
            BasicGroup::new("Team", vec![BasicItem::new("1", "Peter")]),
            BasicGroup::new("Guests", vec![]),
        ]);
        let output = format_tree_list(&list, &TreeFormatOptions::minimal());
        assert_eq!(output, "Team (1 rows):\nPeter\nGuests (0 rows):\n  (empty)\n");
    }

    #[test]
    fn test_empty_and_collapsed() {
        let mut section = Section::from_group(BasicGroup::new("Empty", vec![]), true);
        section.set_expanded(false);
        assert_eq!(
            SectionTreeDebug::new(&section).to_string(),
            "Empty (0 rows, collapsed):\n  (empty)\n"
        );
    }
}
