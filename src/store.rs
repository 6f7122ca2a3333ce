//! Store client seam between the discovery core and Redis.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::config::ConnectionOptions;
use crate::error::BoardResult;

/// Pattern lookup over the shared key-value store.
///
/// This is the single capability the scanner depends on; connection
/// management, TLS, and failover all live behind it.
#[async_trait]
pub trait KeyLookup: Send + Sync {
    /// Return all keys matching the given glob pattern.
    async fn keys(&self, pattern: &str) -> BoardResult<Vec<String>>;
}

/// Full store surface consumed by the dashboard core: pattern lookup
/// for discovery plus the two count shapes handle introspection needs.
#[async_trait]
pub trait StoreClient: KeyLookup {
    /// Length of a list-shaped state key. Missing keys count as zero.
    async fn list_len(&self, key: &str) -> BoardResult<u64>;

    /// Cardinality of a sorted-set-shaped state key. Missing keys count as zero.
    async fn sorted_set_len(&self, key: &str) -> BoardResult<u64>;
}

/// Redis-backed store client over a multiplexed connection manager.
///
/// Cloning is cheap; all clones share one underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Establish the shared store connection.
    pub async fn connect(options: &ConnectionOptions) -> BoardResult<Self> {
        let client = redis::Client::open(options.url())?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KeyLookup for RedisStore {
    async fn keys(&self, pattern: &str) -> BoardResult<Vec<String>> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn list_len(&self, key: &str) -> BoardResult<u64> {
        let mut conn = self.manager.clone();
        let len: u64 = conn.llen(key).await?;
        Ok(len)
    }

    async fn sorted_set_len(&self, key: &str) -> BoardResult<u64> {
        let mut conn = self.manager.clone();
        let len: u64 = conn.zcard(key).await?;
        Ok(len)
    }
}
