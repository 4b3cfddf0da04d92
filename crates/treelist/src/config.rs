//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`TreeList`](crate::model::TreeList).
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use treelist::TreeListConfig;
///
/// let config = TreeListConfig::builder()
///     .default_expanded(false)
///     .build();
/// assert!(!config.default_expanded);
/// assert!(config.reexpand_on_section_change);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeListConfig {
    /// Whether sections built by a reload start expanded.
    pub default_expanded: bool,
    /// Whether a collapsed section is expanded again after an insert,
    /// remove or update touches it.
    pub reexpand_on_section_change: bool,
}

impl Default for TreeListConfig {
    fn default() -> Self {
        Self {
            default_expanded: true,
            reexpand_on_section_change: true,
        }
    }
}

impl TreeListConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> TreeListConfigBuilder {
        TreeListConfigBuilder::new()
    }
}

/// Builder for [`TreeListConfig`].
#[derive(Debug, Default)]
pub struct TreeListConfigBuilder {
    config: TreeListConfig,
}

impl TreeListConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether reloaded sections start expanded.
    pub fn default_expanded(mut self, expanded: bool) -> Self {
        self.config.default_expanded = expanded;
        self
    }

    /// Set whether a collapsed section re-expands after a mutation.
    pub fn reexpand_on_section_change(mut self, reexpand: bool) -> Self {
        self.config.reexpand_on_section_change = reexpand;
        self
    }

    /// Finish building.
    pub fn build(self) -> TreeListConfig {
        self.config
    }
}
