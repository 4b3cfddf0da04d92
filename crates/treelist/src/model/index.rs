//! Row addressing within a tree list.

use serde::{Deserialize, Serialize};

/// Position of a row: section number and flat row number within it.
///
/// Index paths order by section first, then row. Like any positional
/// address they go stale after a mutation; re-resolve rows through
/// [`TreeList::locate`](crate::model::TreeList::locate) when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    /// Section number.
    pub section: usize,
    /// Flat row number within the section.
    pub row: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl std::fmt::Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, row): (usize, usize)) -> Self {
        Self::new(section, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_section_major() {
        let mut paths = vec![
            IndexPath::new(1, 0),
            IndexPath::new(0, 5),
            IndexPath::new(0, 2),
        ];
        paths.sort();
        assert_eq!(
            paths,
            vec![IndexPath::new(0, 2), IndexPath::new(0, 5), IndexPath::new(1, 0)]
        );
    }

    #[test]
    fn test_display_and_from() {
        let path: IndexPath = (2, 7).into();
        assert_eq!(path.to_string(), "[2, 7]");
    }
}
