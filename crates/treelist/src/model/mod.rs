//! Tree list model: items, rows, sections and the reconciliation engine.
//!
//! Hosts describe their data through the [`TreeItem`] and [`TreeGroup`]
//! traits. A [`TreeList`] turns each group into a [`Section`]: a flat,
//! depth-first pre-order list of [`Row`]s with siblings in item order. The
//! list then absorbs incremental changes (insert, remove, update) and
//! reports each one as a [`TreeChange`] that a list widget can apply
//! without reloading.
//!
//! # Core Types
//!
//! - [`TreeItem`] / [`TreeGroup`]: capability traits for domain data
//! - [`Row`]: one item plus its place in the hierarchy
//! - [`Section`]: one group's flattened rows and expand state
//! - [`IndexPath`]: `(section, row)` address
//! - [`TreeChange`]: the notification for one mutation
//! - [`TreeListSignals`]: where notifications are delivered
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐  insert/remove/update  ┌──────────────┐   TreeChange   ┌────────────┐
//! │ change feed  │───────────────────────>│   TreeList   │───────────────>│    view    │
//! └──────────────┘                        │  (sections)  │    signals     │            │
//!                                         └──────────────┘<───────────────└────────────┘
//!                                                row_count / row_at
//! ```

mod change;
mod engine;
mod index;
mod item;
mod row;
mod section;
mod signals;

pub use change::{ChangeKind, MoveSet, RowChanges, TreeChange};
pub use engine::TreeList;
pub use index::IndexPath;
pub use item::{BasicGroup, BasicItem, TreeGroup, TreeItem};
pub use row::{Row, RowKey};
pub use section::Section;
pub use signals::TreeListSignals;
