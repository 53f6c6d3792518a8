//! The document-store client interface.
//!
//! [`DocumentStore`] is the narrow surface the provisioning workflow needs
//! from a database service. Every method is a single blocking request; a
//! failure is reported as [`Error`] carrying the service's status code
//! where one applies. Implementations may retry internally, callers do not.

use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::link::ResourceLink;
use crate::local::LocalStore;
use crate::options::{
    ConnectionPolicy, ConsistencyLevel, ContainerProperties, DatabaseProperties, FeedOptions,
    RequestOptions,
};
use serde_json::Value;
use std::path::PathBuf;

/// Placeholder shipped in the sample configuration.
pub const PLACEHOLDER: &str = "FILLME";

/// Operations a document-store client exposes.
pub trait DocumentStore {
    /// Read a database. 404 if it does not exist.
    fn read_database(&self, link: &ResourceLink) -> Result<DatabaseProperties>;

    /// Create a database. 409 if it already exists.
    fn create_database(&self, properties: DatabaseProperties) -> Result<DatabaseProperties>;

    /// Delete a database and everything in it.
    fn delete_database(&self, link: &ResourceLink) -> Result<()>;

    /// Read a container.
    fn read_container(&self, link: &ResourceLink) -> Result<ContainerProperties>;

    /// Create a container inside `database`, reserving throughput per `options`.
    fn create_container(
        &self,
        database: &ResourceLink,
        properties: ContainerProperties,
        options: &RequestOptions,
    ) -> Result<ContainerProperties>;

    /// Read a document.
    fn read_item(&self, link: &ResourceLink) -> Result<Value>;

    /// Create a document in `container`. With `upsert`, an existing document
    /// with the same id is replaced instead of failing with 409.
    fn create_item(&self, container: &ResourceLink, item: Value, upsert: bool) -> Result<Value>;

    /// Replace an existing document.
    fn replace_item(&self, link: &ResourceLink, item: Value) -> Result<Value>;

    /// Delete a document.
    fn delete_item(&self, link: &ResourceLink) -> Result<()>;

    /// Run a query against `container`.
    fn query_items(&self, container: &ResourceLink, query: &str, options: &FeedOptions) -> Result<Feed>;
}

macro_rules! forward_document_store {
    ($($ty:ty),*) => {$(
        impl<S: DocumentStore + ?Sized> DocumentStore for $ty {
            fn read_database(&self, link: &ResourceLink) -> Result<DatabaseProperties> {
                (**self).read_database(link)
            }
            fn create_database(&self, properties: DatabaseProperties) -> Result<DatabaseProperties> {
                (**self).create_database(properties)
            }
            fn delete_database(&self, link: &ResourceLink) -> Result<()> {
                (**self).delete_database(link)
            }
            fn read_container(&self, link: &ResourceLink) -> Result<ContainerProperties> {
                (**self).read_container(link)
            }
            fn create_container(
                &self,
                database: &ResourceLink,
                properties: ContainerProperties,
                options: &RequestOptions,
            ) -> Result<ContainerProperties> {
                (**self).create_container(database, properties, options)
            }
            fn read_item(&self, link: &ResourceLink) -> Result<Value> {
                (**self).read_item(link)
            }
            fn create_item(&self, container: &ResourceLink, item: Value, upsert: bool) -> Result<Value> {
                (**self).create_item(container, item, upsert)
            }
            fn replace_item(&self, link: &ResourceLink, item: Value) -> Result<Value> {
                (**self).replace_item(link, item)
            }
            fn delete_item(&self, link: &ResourceLink) -> Result<()> {
                (**self).delete_item(link)
            }
            fn query_items(&self, container: &ResourceLink, query: &str, options: &FeedOptions) -> Result<Feed> {
                (**self).query_items(container, query, options)
            }
        }
    )*};
}

forward_document_store!(&S, Box<S>, std::sync::Arc<S>);

/// Where a connection points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `memory:`: a store that lives as long as the handle.
    Memory,
    /// `file://<path>` or a bare path: a store persisted in a directory.
    Directory(PathBuf),
}

impl Endpoint {
    /// Classify an endpoint string.
    pub fn parse(endpoint: &str) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.contains(PLACEHOLDER) {
            return Err(Error::Network {
                endpoint: endpoint.to_string(),
                reason: "endpoint is still the sample placeholder; supply a real endpoint".into(),
            });
        }
        if endpoint == "memory:" || endpoint == "memory://" {
            return Ok(Self::Memory);
        }
        if let Some(path) = endpoint.strip_prefix("file://") {
            if path.is_empty() {
                return Err(Error::invalid_arg("endpoint", "file:// endpoint needs a path"));
            }
            return Ok(Self::Directory(PathBuf::from(path)));
        }
        if endpoint.contains("://") {
            return Err(Error::Network {
                endpoint: endpoint.to_string(),
                reason: "only memory: and file:// endpoints are available in this build".into(),
            });
        }
        if endpoint.is_empty() {
            return Err(Error::invalid_arg("endpoint", "endpoint must not be empty"));
        }
        Ok(Self::Directory(PathBuf::from(endpoint)))
    }
}

/// Open a connection to a store.
///
/// Fails with [`Error::Auth`] on an empty or placeholder key and with
/// [`Error::Network`] on a placeholder or unsupported endpoint.
pub fn connect(
    endpoint: &str,
    key: &str,
    policy: ConnectionPolicy,
    consistency: ConsistencyLevel,
) -> Result<LocalStore> {
    let target = Endpoint::parse(endpoint).map_err(|e| {
        tracing::warn!(endpoint, error = %e, "rejected endpoint");
        e
    })?;

    let key = key.trim();
    if key.is_empty() || key == PLACEHOLDER {
        tracing::warn!(endpoint, "rejected placeholder credential");
        return Err(Error::Auth {
            reason: "access key is empty or still the sample placeholder".into(),
        });
    }

    tracing::debug!(
        endpoint,
        %consistency,
        timeout_ms = policy.request_timeout.as_millis() as u64,
        "connecting"
    );

    match target {
        Endpoint::Memory => Ok(LocalStore::in_memory(key, policy, consistency)),
        Endpoint::Directory(path) => LocalStore::open(path, key, policy, consistency),
    }
}
