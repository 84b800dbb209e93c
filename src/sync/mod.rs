pub mod batch;
mod error;
pub mod export;
pub mod paginate;
pub mod reconcile;
mod resolver;
#[cfg(test)]
pub mod testing;
mod types;

pub use error::{Phase, Result, SyncError};
pub use reconcile::{PreparedSync, Reconciler, SyncPlan};
pub use resolver::TrackResolver;
pub use types::*;
