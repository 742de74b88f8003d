//! Workspace member directory
//!
//! The `Directory` trait is the contract the lookup pipeline needs from the
//! chat platform: a point lookup by ID and a full member listing. Both are
//! network calls and may fail. `LookupCache` memoizes their outcomes for a
//! fixed TTL.

mod cache;
mod types;

pub use cache::{CacheEntry, CacheStats, DEFAULT_TTL, LookupCache, user_key, username_key};
pub use types::UserRecord;

use crate::error::Result;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fetch a single member by user ID; `Ok(None)` when no such member exists
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Fetch every member of the workspace, in directory order
    async fn list_all_users(&self) -> Result<Vec<UserRecord>>;
}
