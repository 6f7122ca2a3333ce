//! # queue-board: Queue Discovery for Redis-Backed Job Dashboards
//!
//! **Finds every job queue in a shared Redis and wraps it for display**
//!
//! queue-board is the discovery core of an operational dashboard: it
//! scans a shared key-value store for queue namespaces, deduplicates
//! them across prefixes, and builds protocol-aware display adapters the
//! rendering layer can query for job counts.
//!
//! ## 🎯 What It Does
//!
//! - **Namespace scanning**: walks one or more configured key prefixes
//!   and extracts queue names from `<prefix>:<queue>:<suffix>` keys
//! - **Deterministic dedup**: first-scanned prefix wins when two
//!   prefixes host a queue with the same name
//! - **Dual wire protocols**: builds legacy (`redis`-shaped) or modern
//!   (`connection`-shaped) queue settings behind one adapter surface
//! - **Bounded retry**: exponential backoff without jitter, with an
//!   attempt budget; exhaustion degrades to an empty dashboard instead
//!   of killing the host process
//! - **Atomic publication**: the handle registry is replaced wholesale,
//!   so readers never observe a partially updated queue list
//!
//! ## 🚀 Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use queue_board::prelude::*;
//!
//! # async fn demo() -> queue_board::BoardResult<()> {
//! let config = BoardConfig::load()?;
//! let store = Arc::new(RedisStore::connect(&config.connection).await?);
//! let registry = Arc::new(HandleRegistry::new());
//!
//! let discovery = DiscoveryService::new(store, registry.clone(), &config);
//! discovery.run().await;
//!
//! for queue in registry.snapshot().iter() {
//!     let counts = queue.job_counts().await?;
//!     println!("{}: {} waiting", queue.name(), counts.waiting);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod scanner;
pub mod adapter;
pub mod registry;
pub mod discovery;

// Core API exports
pub use adapter::{AdapterFactory, JobCounts, ProtocolVersion, QueueHandle, QueueSettings};
pub use config::{BoardConfig, ConnectionOptions};
pub use discovery::{BackoffPolicy, DiscoveryService};
pub use error::{BoardError, BoardResult};
pub use registry::HandleRegistry;
pub use scanner::QueueScanner;
pub use store::{KeyLookup, RedisStore, StoreClient};

/// Everything a dashboard host needs to wire up discovery
pub mod prelude {
    pub use crate::{
        AdapterFactory, BackoffPolicy, BoardConfig, BoardError, BoardResult, ConnectionOptions,
        DiscoveryService, HandleRegistry, JobCounts, KeyLookup, ProtocolVersion, QueueHandle,
        QueueScanner, QueueSettings, RedisStore, StoreClient,
    };

    pub use async_trait::async_trait;
}
