//! Logging and debugging facilities for treelist.
//!
//! treelist uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the host application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("treelist=debug")
//!     .init();
//! ```
//!
//! The constants in [`targets`] name the subsystems so they can be filtered
//! individually. [`TreeFormatOptions`] configures the
//! indented tree dumps produced by the engine crate's debug helpers.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "treelist_core::signal";
    /// Reconciliation engine target.
    pub const ENGINE: &str = "treelist::engine";
    /// Section storage and position scans.
    pub const SECTION: &str = "treelist::section";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only, no branch glyphs.
    Compact,
}

impl TreeStyle {
    /// Returns `(branch, tee, corner)` glyphs for this style.
    pub fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "", ""),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show item IDs.
    pub show_ids: bool,
    /// Whether to show parent IDs next to child rows.
    pub show_parent_ids: bool,
    /// Whether to prefix each line with its flat row index.
    pub show_positions: bool,
    /// Maximum depth to print (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: true,
            show_parent_ids: false,
            show_positions: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_parent_ids: true,
            show_positions: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output: names only, plain indentation.
    pub fn minimal() -> Self {
        Self {
            style: TreeStyle::Compact,
            show_ids: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a node at `depth`.
    pub fn prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = self.style.glyphs();
        let mut prefix = String::new();

        if self.style == TreeStyle::Compact {
            for _ in 0..depth * self.indent_size {
                prefix.push(' ');
            }
            return prefix;
        }

        for _ in 0..(depth - 1) {
            prefix.push_str(branch);
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}
