//! Treelist - incremental reconciliation of item trees into sectioned flat lists.
//!
//! Feed a [`TreeList`](model::TreeList) groups of hierarchical items and it
//! keeps a pre-order flattened, sorted row list per group. Inserts, removals
//! and updates are applied incrementally and reported as minimal row diffs.
//!
//! # Example
//!
//! ```
//! use treelist::prelude::*;
//!
//! let mut list = TreeList::new();
//! list.reload(vec![BasicGroup::new(
//!     "Team",
//!     vec![BasicItem::new("1", "Peter").with_children(vec![
//!         BasicItem::new("1.1", "Bob"),
//!         BasicItem::new("1.2", "Alice"),
//!     ])],
//! )]);
//!
//! list.signals().changed.connect(|change| println!("{:?}", change));
//!
//! let change = list.insert(
//!     vec![BasicItem::new("1.3", "Charlie")],
//!     Some("1"),
//!     |group: &BasicGroup| group.display_name == "Team",
//! );
//! assert_eq!(
//!     change,
//!     Some(TreeChange::Rows(RowChanges::added(vec![IndexPath::new(0, 3)])))
//! );
//! ```

pub use treelist_core::{ConnectionGuard, ConnectionId, Signal, SignalError, TreeFormatOptions, TreeStyle};

pub mod config;
pub mod debug;
mod error;
pub mod model;
pub mod prelude;

pub use config::{TreeListConfig, TreeListConfigBuilder};
pub use error::{Result, TreeListError};
