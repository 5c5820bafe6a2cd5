//! Pipeline stages for catalog watching.
//!
//! - `refresh`: Fetch the catalog document and skip unchanged bodies
//! - `diff`: Detect items, effects and paint kits added between snapshots
//! - `dispatch`: Deliver change notifications one at a time
//! - `watch`: Tie the stages together on a refresh interval

pub mod diff;
pub mod dispatch;
pub mod refresh;
pub mod watch;

pub use diff::{CatalogDiffer, CatalogKeys};
pub use dispatch::{DispatchSettings, DispatchState, DispatchStats, DispatcherHandle, NotificationDispatcher};
pub use refresh::CatalogRefresher;
pub use watch::{SnapshotReceiver, TickOutcome, WatchPipeline};
