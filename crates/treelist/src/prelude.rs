//! Prelude module for treelist.
//!
//! ```ignore
//! use treelist::prelude::*;
//! ```

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    BasicGroup, BasicItem, ChangeKind, IndexPath, MoveSet, Row, RowChanges, Section, TreeChange,
    TreeGroup, TreeItem, TreeList, TreeListSignals,
};

// ============================================================================
// Configuration and Errors
// ============================================================================

pub use crate::config::TreeListConfig;
pub use crate::error::TreeListError;

// ============================================================================
// Signals
// ============================================================================

pub use treelist_core::{ConnectionGuard, ConnectionId, Signal};
