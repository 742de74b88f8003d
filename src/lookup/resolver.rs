//! Identity resolution against the workspace directory

use crate::directory::{Directory, LookupCache, UserRecord, user_key, username_key};
use crate::error::{EmailBotError, Result};
use crate::lookup::Identifier;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default upper bound for a single directory call
pub const DEFAULT_DIRECTORY_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns an [`Identifier`] into a directory record
///
/// `Ok(None)` means nobody matched. `Err` is reserved for transport
/// failures and timeouts.
pub struct Resolver {
    directory: Arc<dyn Directory>,
    cache: Option<Arc<LookupCache>>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self {
            directory,
            cache: None,
            timeout: DEFAULT_DIRECTORY_TIMEOUT,
        }
    }

    pub fn with_cache(mut self, cache: Arc<LookupCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn resolve(&self, identifier: &Identifier) -> Result<Option<UserRecord>> {
        match identifier {
            Identifier::Mention(user_id) => {
                self.cached(user_key(user_id), self.user_by_id(user_id))
                    .await
            }
            Identifier::UsernameText(username) => {
                self.cached(username_key(username), self.user_by_name(username))
                    .await
            }
            Identifier::NameFragment(fragment) => self.user_by_fragment(fragment).await,
        }
    }

    async fn cached(
        &self,
        key: String,
        fetch: impl Future<Output = Result<Option<UserRecord>>>,
    ) -> Result<Option<UserRecord>> {
        let Some(cache) = &self.cache else {
            return fetch.await;
        };

        if let Some(entry) = cache.get(&key).await {
            return Ok(entry.value);
        }

        let value = fetch.await?;
        cache.put(key, value.clone()).await;
        Ok(value)
    }

    async fn user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>> {
        self.bounded("users.info", self.directory.get_user_by_id(user_id))
            .await
    }

    async fn user_by_name(&self, username: &str) -> Result<Option<UserRecord>> {
        let target = username.to_lowercase();
        let members = self
            .bounded("users.list", self.directory.list_all_users())
            .await?;

        Ok(members
            .into_iter()
            .find(|u| u.is_active_human() && u.matches_name(&target)))
    }

    async fn user_by_fragment(&self, fragment: &str) -> Result<Option<UserRecord>> {
        let fragment = fragment.to_lowercase();
        let members = self
            .bounded("users.list", self.directory.list_all_users())
            .await?;

        // First hit in directory order; several members may contain the fragment
        Ok(members
            .into_iter()
            .find(|u| !u.is_deleted && u.real_name_contains(&fragment)))
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                EmailBotError::Timeout(format!(
                    "{operation} exceeded {}ms",
                    self.timeout.as_millis()
                ))
            })?
    }
}
