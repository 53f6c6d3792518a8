//! Client options and resource properties.
//!
//! Connection and consistency settings are handed to the store as-is; the
//! local store records them but does not change behavior on them.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Throughput reserved for a newly created container, in request units per second.
pub const DEFAULT_THROUGHPUT: u32 = 400;

/// Smallest throughput a container may reserve.
pub const MIN_THROUGHPUT: u32 = 400;

/// Largest throughput a container may reserve.
pub const MAX_THROUGHPUT: u32 = 1_000_000;

/// Throughput must be a multiple of this step.
pub const THROUGHPUT_STEP: u32 = 100;

/// Transport settings for a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionPolicy {
    /// Timeout applied to each request.
    pub request_timeout: Duration,
    /// Retries the transport may make on throttled requests.
    pub max_retry_attempts_on_throttled: u32,
    /// Upper bound on total wait across those retries.
    pub max_retry_wait: Duration,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            max_retry_attempts_on_throttled: 9,
            max_retry_wait: Duration::from_secs(30),
        }
    }
}

/// Read consistency requested for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    /// Reads see the latest committed write.
    Strong,
    /// Reads lag writes by a bounded amount.
    BoundedStaleness,
    /// Read-your-writes within a session.
    #[default]
    Session,
    /// Reads never see writes out of order.
    ConsistentPrefix,
    /// No ordering guarantee.
    Eventual,
}

impl ConsistencyLevel {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::BoundedStaleness => "bounded-staleness",
            Self::Session => "session",
            Self::ConsistentPrefix => "consistent-prefix",
            Self::Eventual => "eventual",
        }
    }
}

impl fmt::Display for ConsistencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsistencyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "strong" => Ok(Self::Strong),
            "bounded-staleness" | "boundedstaleness" => Ok(Self::BoundedStaleness),
            "session" => Ok(Self::Session),
            "consistent-prefix" | "consistentprefix" => Ok(Self::ConsistentPrefix),
            "eventual" => Ok(Self::Eventual),
            _ => Err(Error::invalid_arg(
                "consistency",
                format!("unknown consistency level '{}'", s),
            )),
        }
    }
}

/// Value type an index applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// JSON strings.
    String,
    /// JSON numbers.
    Number,
}

/// How an index organizes values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexKind {
    /// Supports equality and range comparisons.
    Range,
    /// Supports equality only.
    Hash,
}

/// One index definition within an indexing policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    /// Index structure.
    pub kind: IndexKind,
    /// Values the index covers.
    pub data_type: DataType,
    /// Index precision in bytes; `-1` means maximum precision.
    pub precision: i32,
}

impl Index {
    /// Range index over a data type at maximum precision.
    pub fn range(data_type: DataType) -> Self {
        Self {
            kind: IndexKind::Range,
            data_type,
            precision: -1,
        }
    }

    /// Hash index over a data type at maximum precision.
    pub fn hash(data_type: DataType) -> Self {
        Self {
            kind: IndexKind::Hash,
            data_type,
            precision: -1,
        }
    }

    /// Set the precision.
    pub fn with_precision(mut self, precision: i32) -> Self {
        self.precision = precision;
        self
    }
}

/// When indexes are updated relative to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    /// Updated with each write.
    #[default]
    Consistent,
    /// Updated in the background.
    Lazy,
    /// No index.
    None,
}

/// A path and the indexes applied beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedPath {
    /// Document path, e.g. `/*`.
    pub path: String,
    /// Indexes for values under `path`.
    #[serde(default)]
    pub indexes: Vec<Index>,
}

/// Declarative description of what a container indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexingPolicy {
    /// Index every document without opting in.
    pub automatic: bool,
    /// When the index is updated.
    pub indexing_mode: IndexingMode,
    /// Indexed paths.
    pub included_paths: Vec<IncludedPath>,
}

impl IndexingPolicy {
    /// Policy applying `indexes` to every path in the document.
    pub fn new(indexes: impl IntoIterator<Item = Index>) -> Self {
        Self {
            automatic: true,
            indexing_mode: IndexingMode::Consistent,
            included_paths: vec![IncludedPath {
                path: "/*".to_string(),
                indexes: indexes.into_iter().collect(),
            }],
        }
    }

    /// Range index over strings at maximum precision, for string range queries.
    pub fn string_range() -> Self {
        Self::new([Index::range(DataType::String).with_precision(-1)])
    }
}

impl Default for IndexingPolicy {
    fn default() -> Self {
        Self::new([])
    }
}

/// Partition key paths of a container, e.g. `["/lastName"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionKeyDefinition {
    /// JSON paths, e.g. `/lastName`.
    pub paths: Vec<String>,
}

impl PartitionKeyDefinition {
    /// Single-path partition key.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }

    /// The partition key path in dotted form (`/address/state` → `address.state`).
    pub fn field(&self) -> Option<String> {
        self.paths
            .first()
            .map(|p| p.trim_start_matches('/').replace('/', "."))
    }
}

/// A database resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProperties {
    /// Database id.
    pub id: String,
    /// Version tag assigned by the store.
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl DatabaseProperties {
    /// Properties for a new database.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            etag: None,
        }
    }
}

/// A container resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerProperties {
    /// Container id.
    pub id: String,
    /// What the container indexes.
    #[serde(default)]
    pub indexing_policy: IndexingPolicy,
    /// Partition key; `None` for an unpartitioned container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<PartitionKeyDefinition>,
    /// Version tag assigned by the store.
    #[serde(rename = "_etag", default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl ContainerProperties {
    /// Properties for a new, unpartitioned container.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            indexing_policy: IndexingPolicy::default(),
            partition_key: None,
            etag: None,
        }
    }

    /// Set the indexing policy.
    pub fn with_indexing_policy(mut self, policy: IndexingPolicy) -> Self {
        self.indexing_policy = policy;
        self
    }

    /// Partition the container by a single path.
    pub fn with_partition_key(mut self, path: impl Into<String>) -> Self {
        self.partition_key = Some(PartitionKeyDefinition::new(path));
        self
    }
}

/// Per-request options for create calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Throughput to reserve, in request units per second.
    pub offer_throughput: Option<u32>,
}

impl RequestOptions {
    /// Reserve the given throughput.
    pub fn with_offer_throughput(mut self, throughput: u32) -> Self {
        self.offer_throughput = Some(throughput);
        self
    }
}

/// Options for a query feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOptions {
    /// Documents per page; zero or negative means one unbounded page.
    pub page_size: i32,
    /// Allow the query to fan out across partitions.
    pub enable_cross_partition_query: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: 100,
            enable_cross_partition_query: false,
        }
    }
}

impl FeedOptions {
    /// Default options: 100 documents per page, single partition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Enable or disable cross-partition fan-out.
    pub fn enable_cross_partition_query(mut self, enable: bool) -> Self {
        self.enable_cross_partition_query = enable;
        self
    }

    /// Effective page limit, `None` when unbounded.
    pub fn page_limit(&self) -> Option<usize> {
        usize::try_from(self.page_size).ok().filter(|&n| n > 0)
    }
}
