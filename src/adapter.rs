use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::config::ConnectionOptions;
use crate::error::{BoardError, BoardResult};
use crate::store::StoreClient;

/// Wire protocol spoken by the queue library that owns a namespace.
///
/// The two protocols expect incompatible connection shapes, so the
/// selector is fixed for the whole process lifetime via configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    /// Connection options embedded inline under a `redis` field.
    Legacy,
    /// Separate connection object under a `connection` field.
    Modern,
}

impl ProtocolVersion {
    fn protocol(self) -> &'static dyn WireProtocol {
        match self {
            Self::Legacy => &LegacyProtocol,
            Self::Modern => &ModernProtocol,
        }
    }
}

impl FromStr for ProtocolVersion {
    type Err = BoardError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "modern" => Ok(Self::Modern),
            other => Err(BoardError::InvalidConfig(format!(
                "unknown protocol version: {other}"
            ))),
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Modern => write!(f, "modern"),
        }
    }
}

/// Connection settings for one constructed queue, in the exact shape
/// the owning queue library expects.
///
/// Exactly one of `connection`/`redis` is present, selected by protocol.
/// The `prefix` field is omitted entirely when the owning prefix is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    connection: Option<ConnectionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    redis: Option<ConnectionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
}

impl QueueSettings {
    /// Connection options in the modern shape, if this queue uses it.
    pub fn connection(&self) -> Option<&ConnectionOptions> {
        self.connection.as_ref()
    }

    /// Connection options in the legacy shape, if this queue uses it.
    pub fn redis(&self) -> Option<&ConnectionOptions> {
        self.redis.as_ref()
    }

    /// Namespace prefix, when one is configured.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}

/// Seam between the factory and the two incompatible queue-library
/// connection shapes. Construction dispatches through this trait rather
/// than branching inside the factory.
pub trait WireProtocol: Send + Sync {
    /// Protocol this implementation speaks.
    fn version(&self) -> ProtocolVersion;

    /// Build queue settings in this protocol's connection shape.
    fn queue_settings(
        &self,
        options: &ConnectionOptions,
        prefix: Option<&str>,
    ) -> QueueSettings;
}

/// Modern protocol: separate connection object.
pub struct ModernProtocol;

impl WireProtocol for ModernProtocol {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Modern
    }

    fn queue_settings(
        &self,
        options: &ConnectionOptions,
        prefix: Option<&str>,
    ) -> QueueSettings {
        QueueSettings {
            connection: Some(options.clone()),
            redis: None,
            prefix: prefix.map(str::to_string),
        }
    }
}

/// Legacy protocol: connection options embedded inline.
pub struct LegacyProtocol;

impl WireProtocol for LegacyProtocol {
    fn version(&self) -> ProtocolVersion {
        ProtocolVersion::Legacy
    }

    fn queue_settings(
        &self,
        options: &ConnectionOptions,
        prefix: Option<&str>,
    ) -> QueueSettings {
        QueueSettings {
            connection: None,
            redis: Some(options.clone()),
            prefix: prefix.map(str::to_string),
        }
    }
}

/// Per-state job counts for one queue, as the rendering layer displays them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub waiting: u64,
    pub active: u64,
    pub delayed: u64,
    pub completed: u64,
    pub failed: u64,
    pub paused: u64,
}

impl JobCounts {
    /// Total jobs across all states.
    pub fn total(&self) -> u64 {
        self.waiting + self.active + self.delayed + self.completed + self.failed + self.paused
    }
}

/// Uniform display adapter around one discovered queue.
///
/// Wraps the protocol-specific queue settings together with the shared
/// store client and enough metadata for the rendering layer to query
/// job counts and state.
#[derive(Clone)]
pub struct QueueHandle {
    name: String,
    prefix: String,
    version: ProtocolVersion,
    settings: QueueSettings,
    store: Arc<dyn StoreClient>,
}

impl QueueHandle {
    /// Logical queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prefix under which this queue was discovered (verbatim, may be empty).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Wire protocol this handle was constructed for.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Connection settings in the owning library's shape.
    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Query current per-state job counts through the shared store client.
    pub async fn job_counts(&self) -> BoardResult<JobCounts> {
        Ok(JobCounts {
            waiting: self.store.list_len(&self.state_key("wait")).await?,
            active: self.store.list_len(&self.state_key("active")).await?,
            paused: self.store.list_len(&self.state_key("paused")).await?,
            delayed: self.store.sorted_set_len(&self.state_key("delayed")).await?,
            completed: self
                .store
                .sorted_set_len(&self.state_key("completed"))
                .await?,
            failed: self.store.sorted_set_len(&self.state_key("failed")).await?,
        })
    }

    /// Store key holding one of this queue's per-state structures.
    fn state_key(&self, state: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}:{}", self.name, state)
        } else {
            format!("{}:{}:{}", self.prefix, self.name, state)
        }
    }
}

impl fmt::Debug for QueueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueHandle")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Builds uniform queue handles for discovered entries.
pub struct AdapterFactory {
    version: ProtocolVersion,
    options: ConnectionOptions,
    store: Arc<dyn StoreClient>,
}

impl AdapterFactory {
    /// Create a factory for the configured protocol and connection options.
    pub fn new(
        version: ProtocolVersion,
        options: ConnectionOptions,
        store: Arc<dyn StoreClient>,
    ) -> Self {
        Self {
            version,
            options,
            store,
        }
    }

    /// Construct one handle per entry, in the entries' insertion order.
    ///
    /// An empty entry set fails with `NoQueuesFound`: the orchestrator
    /// should never reach this state, but the factory must not hand the
    /// rendering layer an empty, seemingly-valid handle list.
    pub fn build(&self, entries: &IndexMap<String, String>) -> BoardResult<Vec<QueueHandle>> {
        if entries.is_empty() {
            return Err(BoardError::NoQueuesFound);
        }

        let protocol = self.version.protocol();
        let mut handles = Vec::with_capacity(entries.len());
        for (name, prefix) in entries {
            let effective_prefix = Some(prefix.as_str()).filter(|p| !p.is_empty());
            let settings = protocol.queue_settings(&self.options, effective_prefix);
            debug!(queue = %name, prefix = %prefix, version = %self.version, "built queue handle");
            handles.push(QueueHandle {
                name: name.clone(),
                prefix: prefix.clone(),
                version: self.version,
                settings,
                store: self.store.clone(),
            });
        }
        Ok(handles)
    }
}
