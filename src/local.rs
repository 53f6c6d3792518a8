//! In-process document store.
//!
//! [`LocalStore`] implements [`DocumentStore`] with the service's observable
//! contract: 404 for missing resources (including missing parents), 409 on
//! duplicate creates, 400 on malformed ids, throughput outside the allowed
//! range, query syntax errors and disallowed cross-partition queries.
//!
//! A store opened on a directory persists a [`Snapshot`] after every
//! mutation and holds a [`StoreLock`] on that directory while it is open.

use crate::error::{Error, Result};
use crate::feed::Feed;
use crate::link::ResourceLink;
use crate::lock::StoreLock;
use crate::options::{
    ConnectionPolicy, ConsistencyLevel, ContainerProperties, DatabaseProperties, FeedOptions,
    RequestOptions, DEFAULT_THROUGHPUT, MAX_THROUGHPUT, MIN_THROUGHPUT, THROUGHPUT_STEP,
};
use crate::query::Query;
use crate::snapshot::{Snapshot, SNAPSHOT_FILE_NAME};
use crate::store::DocumentStore;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// System properties the store stamps onto documents.
const SYSTEM_PROPERTIES: [&str; 4] = ["_etag", "_ts", "_rid", "_self"];

/// A store request, for statistics and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Operation {
    ReadDatabase,
    CreateDatabase,
    DeleteDatabase,
    ReadContainer,
    CreateContainer,
    ReadItem,
    CreateItem,
    ReplaceItem,
    DeleteItem,
    QueryItems,
}

/// Request counters, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Database, container and document reads.
    pub reads: u64,
    /// Database, container and document creates (upserts included).
    pub creates: u64,
    /// Document replaces.
    pub replaces: u64,
    /// Database and document deletes.
    pub deletes: u64,
    /// Queries issued.
    pub queries: u64,
}

impl StoreStats {
    /// Requests that may have changed state.
    pub fn mutations(&self) -> u64 {
        self.creates + self.replaces + self.deletes
    }

    fn record(&mut self, op: Operation) {
        let counter = match op {
            Operation::ReadDatabase | Operation::ReadContainer | Operation::ReadItem => &mut self.reads,
            Operation::CreateDatabase | Operation::CreateContainer | Operation::CreateItem => {
                &mut self.creates
            }
            Operation::ReplaceItem => &mut self.replaces,
            Operation::DeleteDatabase | Operation::DeleteItem => &mut self.deletes,
            Operation::QueryItems => &mut self.queries,
        };
        *counter += 1;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    databases: BTreeMap<String, DatabaseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DatabaseEntry {
    properties: DatabaseProperties,
    containers: BTreeMap<String, ContainerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContainerEntry {
    properties: ContainerProperties,
    throughput: u32,
    items: BTreeMap<String, Value>,
}

impl StoreState {
    fn database(&self, db: &str) -> Result<&DatabaseEntry> {
        self.databases
            .get(db)
            .ok_or_else(|| Error::not_found(ResourceLink::database(db).to_string()))
    }

    fn database_mut(&mut self, db: &str) -> Result<&mut DatabaseEntry> {
        self.databases
            .get_mut(db)
            .ok_or_else(|| Error::not_found(ResourceLink::database(db).to_string()))
    }

    fn container(&self, db: &str, coll: &str) -> Result<&ContainerEntry> {
        self.database(db)?
            .containers
            .get(coll)
            .ok_or_else(|| Error::not_found(ResourceLink::container(db, coll).to_string()))
    }

    fn container_mut(&mut self, db: &str, coll: &str) -> Result<&mut ContainerEntry> {
        self.database_mut(db)?
            .containers
            .get_mut(coll)
            .ok_or_else(|| Error::not_found(ResourceLink::container(db, coll).to_string()))
    }
}

/// Directory backing a persisted store.
struct Persistence {
    dir: PathBuf,
    snapshot_path: PathBuf,
    _lock: StoreLock,
}

/// An in-process document store, optionally persisted to a directory.
pub struct LocalStore {
    state: RwLock<StoreState>,
    key_digest: String,
    persistence: Option<Persistence>,
    stats: Mutex<StoreStats>,
    faults: Mutex<HashMap<Operation, VecDeque<u16>>>,
    policy: ConnectionPolicy,
    consistency: ConsistencyLevel,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("path", &self.path())
            .field("consistency", &self.consistency)
            .field("databases", &self.state.read().databases.len())
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// A store that lives only as long as this handle.
    pub fn in_memory(key: &str, policy: ConnectionPolicy, consistency: ConsistencyLevel) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            key_digest: key_digest(key),
            persistence: None,
            stats: Mutex::new(StoreStats::default()),
            faults: Mutex::new(HashMap::new()),
            policy,
            consistency,
        }
    }

    /// Open or create a store persisted in `path`.
    ///
    /// The first open binds the directory to `key`; later opens with a
    /// different key fail with [`Error::Auth`]. Only one handle may have a
    /// directory open at a time.
    pub fn open(
        path: impl AsRef<Path>,
        key: &str,
        policy: ConnectionPolicy,
        consistency: ConsistencyLevel,
    ) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();

        fs::create_dir_all(&dir).map_err(Error::io_err(&dir, "failed to create store directory"))?;

        let lock = StoreLock::acquire(&dir)?;
        let snapshot_path = dir.join(SNAPSHOT_FILE_NAME);
        let digest = key_digest(key);

        let state = match Snapshot::<StoreState>::load(&snapshot_path)? {
            Some(snapshot) if snapshot.key_digest != digest => {
                return Err(Error::Auth {
                    reason: format!("access key does not match the store at {}", dir.display()),
                });
            }
            Some(snapshot) => snapshot.state,
            None => {
                let state = StoreState::default();
                Snapshot::new(digest.clone(), &state).save(&snapshot_path)?;
                state
            }
        };

        tracing::info!(
            path = %dir.display(),
            databases = state.databases.len(),
            "opened local store"
        );

        Ok(Self {
            state: RwLock::new(state),
            key_digest: digest,
            persistence: Some(Persistence {
                dir,
                snapshot_path,
                _lock: lock,
            }),
            stats: Mutex::new(StoreStats::default()),
            faults: Mutex::new(HashMap::new()),
            policy,
            consistency,
        })
    }

    /// Directory backing this store, if persisted.
    pub fn path(&self) -> Option<&Path> {
        self.persistence.as_ref().map(|p| p.dir.as_path())
    }

    /// Consistency level requested at connect time.
    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    /// Connection policy requested at connect time.
    pub fn policy(&self) -> &ConnectionPolicy {
        &self.policy
    }

    /// Requests served so far by this handle.
    pub fn stats(&self) -> StoreStats {
        *self.stats.lock()
    }

    /// Make the next `op` request fail with `status` before it touches state.
    ///
    /// Calls queue up: two calls fail the next two requests of that kind.
    pub fn fail_next(&self, op: Operation, status: u16) {
        self.faults.lock().entry(op).or_default().push_back(status);
    }

    /// Database ids, sorted.
    pub fn database_ids(&self) -> Vec<String> {
        self.state.read().databases.keys().cloned().collect()
    }

    /// Throughput reserved by a container.
    pub fn throughput(&self, container: &ResourceLink) -> Result<u32> {
        let (db, coll) = container_ids(container)?;
        Ok(self.state.read().container(db, coll)?.throughput)
    }

    /// Number of documents in a container.
    pub fn item_count(&self, container: &ResourceLink) -> Result<usize> {
        let (db, coll) = container_ids(container)?;
        Ok(self.state.read().container(db, coll)?.items.len())
    }

    /// Count the request and apply any injected failure.
    fn begin(&self, op: Operation, link: &ResourceLink) -> Result<()> {
        self.stats.lock().record(op);

        let injected = self.faults.lock().get_mut(&op).and_then(VecDeque::pop_front);
        if let Some(code) = injected {
            tracing::warn!(?op, %link, code, "injected failure");
            return Err(Error::status(code, link.to_string(), "injected failure"));
        }
        Ok(())
    }

    /// Apply `f` to a copy of the state, persist it, then publish it.
    ///
    /// Nothing is published if `f` or the snapshot write fails.
    fn mutate<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut guard = self.state.write();
        let mut next = guard.clone();
        let out = f(&mut next)?;

        if let Some(persistence) = &self.persistence {
            Snapshot::new(self.key_digest.clone(), &next).save(&persistence.snapshot_path)?;
        }

        *guard = next;
        Ok(out)
    }
}

impl DocumentStore for LocalStore {
    fn read_database(&self, link: &ResourceLink) -> Result<DatabaseProperties> {
        self.begin(Operation::ReadDatabase, link)?;
        let db = database_id(link)?;
        let properties = self.state.read().database(db)?.properties.clone();
        tracing::debug!(%link, "read database");
        Ok(properties)
    }

    fn create_database(&self, mut properties: DatabaseProperties) -> Result<DatabaseProperties> {
        let link = ResourceLink::database(properties.id.clone());
        self.begin(Operation::CreateDatabase, &link)?;
        link.validate()?;

        properties.etag = Some(etag(properties.id.as_bytes()));
        let created = self.mutate(|state| {
            if state.databases.contains_key(&properties.id) {
                return Err(Error::conflict(link.to_string()));
            }
            state.databases.insert(
                properties.id.clone(),
                DatabaseEntry {
                    properties: properties.clone(),
                    containers: BTreeMap::new(),
                },
            );
            Ok(properties)
        })?;

        tracing::info!(%link, "created database");
        Ok(created)
    }

    fn delete_database(&self, link: &ResourceLink) -> Result<()> {
        self.begin(Operation::DeleteDatabase, link)?;
        let db = database_id(link)?;

        let removed = self.mutate(|state| {
            state
                .databases
                .remove(db)
                .ok_or_else(|| Error::not_found(link.to_string()))
        })?;

        tracing::info!(
            %link,
            containers = removed.containers.len(),
            "deleted database"
        );
        Ok(())
    }

    fn read_container(&self, link: &ResourceLink) -> Result<ContainerProperties> {
        self.begin(Operation::ReadContainer, link)?;
        let (db, coll) = container_ids(link)?;
        let properties = self.state.read().container(db, coll)?.properties.clone();
        tracing::debug!(%link, "read container");
        Ok(properties)
    }

    fn create_container(
        &self,
        database: &ResourceLink,
        mut properties: ContainerProperties,
        options: &RequestOptions,
    ) -> Result<ContainerProperties> {
        let db = database_id(database)?;
        let link = ResourceLink::container(db, properties.id.clone());
        self.begin(Operation::CreateContainer, &link)?;
        link.validate()?;

        let throughput = options.offer_throughput.unwrap_or(DEFAULT_THROUGHPUT);
        if !(MIN_THROUGHPUT..=MAX_THROUGHPUT).contains(&throughput) || throughput % THROUGHPUT_STEP != 0 {
            return Err(Error::bad_request(
                link.to_string(),
                format!(
                    "throughput {} must be a multiple of {} between {} and {}",
                    throughput, THROUGHPUT_STEP, MIN_THROUGHPUT, MAX_THROUGHPUT
                ),
            ));
        }

        let body = serde_json::to_vec(&properties)
            .map_err(|e| Error::Serialization(format!("failed to serialize container: {}", e)))?;
        properties.etag = Some(etag(&body));

        let created = self.mutate(|state| {
            let database = state.database_mut(db)?;
            if database.containers.contains_key(&properties.id) {
                return Err(Error::conflict(link.to_string()));
            }
            database.containers.insert(
                properties.id.clone(),
                ContainerEntry {
                    properties: properties.clone(),
                    throughput,
                    items: BTreeMap::new(),
                },
            );
            Ok(properties)
        })?;

        tracing::info!(%link, throughput, "created container");
        Ok(created)
    }

    fn read_item(&self, link: &ResourceLink) -> Result<Value> {
        self.begin(Operation::ReadItem, link)?;
        let (db, coll, id) = document_ids(link)?;
        let item = self
            .state
            .read()
            .container(db, coll)?
            .items
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(link.to_string()))?;
        tracing::debug!(%link, "read document");
        Ok(item)
    }

    fn create_item(&self, container: &ResourceLink, item: Value, upsert: bool) -> Result<Value> {
        self.begin(Operation::CreateItem, container)?;
        let (db, coll) = container_ids(container)?;
        let id = document_id(container, &item)?;
        let link = ResourceLink::document(db, coll, id.clone());
        link.validate()?;

        let stored = stamp(item)?;
        let created = self.mutate(|state| {
            let entry = state.container_mut(db, coll)?;
            if !upsert && entry.items.contains_key(&id) {
                return Err(Error::conflict(link.to_string()));
            }
            entry.items.insert(id, stored.clone());
            Ok(stored)
        })?;

        tracing::info!(%link, upsert, "created document");
        Ok(created)
    }

    fn replace_item(&self, link: &ResourceLink, item: Value) -> Result<Value> {
        self.begin(Operation::ReplaceItem, link)?;
        let (db, coll, id) = document_ids(link)?;
        if document_id(link, &item)? != id {
            return Err(Error::bad_request(
                link.to_string(),
                "document id does not match the link",
            ));
        }

        let stored = stamp(item)?;
        let replaced = self.mutate(|state| {
            let slot = state
                .container_mut(db, coll)?
                .items
                .get_mut(id)
                .ok_or_else(|| Error::not_found(link.to_string()))?;
            *slot = stored.clone();
            Ok(stored)
        })?;

        tracing::info!(%link, "replaced document");
        Ok(replaced)
    }

    fn delete_item(&self, link: &ResourceLink) -> Result<()> {
        self.begin(Operation::DeleteItem, link)?;
        let (db, coll, id) = document_ids(link)?;

        self.mutate(|state| {
            state
                .container_mut(db, coll)?
                .items
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| Error::not_found(link.to_string()))
        })?;

        tracing::info!(%link, "deleted document");
        Ok(())
    }

    fn query_items(&self, container: &ResourceLink, query: &str, options: &FeedOptions) -> Result<Feed> {
        self.begin(Operation::QueryItems, container)?;
        let (db, coll) = container_ids(container)?;
        let parsed = Query::parse(query)?;

        let state = self.state.read();
        let entry = state.container(db, coll)?;

        if !options.enable_cross_partition_query {
            if let Some(field) = entry.properties.partition_key.as_ref().and_then(|pk| pk.field()) {
                let pinned = parsed
                    .filter
                    .as_ref()
                    .and_then(|f| f.pinned_value(&field))
                    .is_some();
                if !pinned {
                    return Err(Error::bad_request(
                        container.to_string(),
                        "query spans partitions but cross-partition queries are disabled",
                    ));
                }
            }
        }

        let matches: Vec<Value> = entry
            .items
            .values()
            .filter(|item| parsed.matches(item))
            .cloned()
            .collect();
        drop(state);

        tracing::debug!(%container, query, results = matches.len(), "query executed");
        Ok(Feed::paged(matches, options.page_limit()))
    }
}

fn wrong_kind(link: &ResourceLink, expected: &str) -> Error {
    Error::bad_request(link.to_string(), format!("expected a {} link", expected))
}

fn database_id(link: &ResourceLink) -> Result<&str> {
    link.validate()?;
    match link {
        ResourceLink::Database { db } => Ok(db),
        _ => Err(wrong_kind(link, "database")),
    }
}

fn container_ids(link: &ResourceLink) -> Result<(&str, &str)> {
    link.validate()?;
    match link {
        ResourceLink::Container { db, coll } => Ok((db, coll)),
        _ => Err(wrong_kind(link, "container")),
    }
}

fn document_ids(link: &ResourceLink) -> Result<(&str, &str, &str)> {
    link.validate()?;
    match link {
        ResourceLink::Document { db, coll, id } => Ok((db, coll, id)),
        _ => Err(wrong_kind(link, "document")),
    }
}

/// The `id` property of a document body.
fn document_id(link: &ResourceLink, item: &Value) -> Result<String> {
    match item.get("id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(_) => Err(Error::bad_request(link.to_string(), "document id must be a string")),
        None => Err(Error::bad_request(link.to_string(), "document has no id")),
    }
}

/// Replace client-supplied system properties with fresh `_etag` and `_ts`.
fn stamp(item: Value) -> Result<Value> {
    let Value::Object(mut map) = item else {
        return Err(Error::invalid_arg("item", "document must be a JSON object"));
    };
    for key in SYSTEM_PROPERTIES {
        map.remove(key);
    }

    let body = serde_json::to_vec(&map)
        .map_err(|e| Error::Serialization(format!("failed to serialize document: {}", e)))?;
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();

    map.insert("_etag".to_string(), Value::String(etag(&body)));
    map.insert("_ts".to_string(), Value::from(ts));
    Ok(Value::Object(map))
}

fn etag(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes).to_hex();
    format!("\"{}\"", &hash[..16])
}

fn key_digest(key: &str) -> String {
    blake3::hash(key.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::status;
    use crate::options::IndexingPolicy;
    use serde_json::json;

    fn store() -> LocalStore {
        LocalStore::in_memory("key", ConnectionPolicy::default(), ConsistencyLevel::Session)
    }

    fn store_with_container() -> (LocalStore, ResourceLink) {
        let store = store();
        store.create_database(DatabaseProperties::new("db")).unwrap();
        store
            .create_container(
                &ResourceLink::database("db"),
                ContainerProperties::new("coll"),
                &RequestOptions::default(),
            )
            .unwrap();
        (store, ResourceLink::container("db", "coll"))
    }

    #[test]
    fn test_database_lifecycle() {
        let store = store();
        let link = ResourceLink::database("db");

        assert!(store.read_database(&link).unwrap_err().is_not_found());
        let created = store.create_database(DatabaseProperties::new("db")).unwrap();
        assert!(created.etag.is_some());
        assert_eq!(store.read_database(&link).unwrap().id, "db");

        let err = store.create_database(DatabaseProperties::new("db")).unwrap_err();
        assert_eq!(err.status_code(), Some(status::CONFLICT));

        store.delete_database(&link).unwrap();
        assert!(store.read_database(&link).unwrap_err().is_not_found());
        assert!(store.delete_database(&link).unwrap_err().is_not_found());
    }

    #[test]
    fn test_container_requires_database() {
        let store = store();
        let err = store
            .create_container(
                &ResourceLink::database("missing"),
                ContainerProperties::new("coll"),
                &RequestOptions::default(),
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store
            .read_container(&ResourceLink::container("missing", "coll"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_container_properties_and_throughput() {
        let store = store();
        store.create_database(DatabaseProperties::new("db")).unwrap();
        let properties =
            ContainerProperties::new("coll").with_indexing_policy(IndexingPolicy::string_range());
        store
            .create_container(
                &ResourceLink::database("db"),
                properties.clone(),
                &RequestOptions::default().with_offer_throughput(1000),
            )
            .unwrap();

        let link = ResourceLink::container("db", "coll");
        let read = store.read_container(&link).unwrap();
        assert_eq!(read.indexing_policy, properties.indexing_policy);
        assert_eq!(store.throughput(&link).unwrap(), 1000);
    }

    #[test]
    fn test_invalid_throughput() {
        let store = store();
        store.create_database(DatabaseProperties::new("db")).unwrap();
        for throughput in [0, 300, 450, 1_000_100] {
            let err = store
                .create_container(
                    &ResourceLink::database("db"),
                    ContainerProperties::new("coll"),
                    &RequestOptions::default().with_offer_throughput(throughput),
                )
                .unwrap_err();
            assert_eq!(err.status_code(), Some(status::BAD_REQUEST), "{}", throughput);
        }
    }

    #[test]
    fn test_item_create_conflict_and_upsert() {
        let (store, coll) = store_with_container();

        store.create_item(&coll, json!({"id": "a", "n": 1}), false).unwrap();
        let err = store.create_item(&coll, json!({"id": "a", "n": 2}), false).unwrap_err();
        assert_eq!(err.status_code(), Some(status::CONFLICT));

        store.create_item(&coll, json!({"id": "a", "n": 3}), true).unwrap();
        let read = store.read_item(&ResourceLink::document("db", "coll", "a")).unwrap();
        assert_eq!(read["n"], json!(3));
        assert!(read["_etag"].is_string());
        assert!(read["_ts"].is_u64());
    }

    #[test]
    fn test_item_id_validation() {
        let (store, coll) = store_with_container();
        for item in [json!({"n": 1}), json!({"id": 7}), json!({"id": ""}), json!({"id": "a/b"})] {
            let err = store.create_item(&coll, item.clone(), true).unwrap_err();
            assert_eq!(err.status_code(), Some(status::BAD_REQUEST), "{}", item);
        }
        let err = store.create_item(&coll, json!("id"), true).unwrap_err();
        assert_eq!(err.status_code(), Some(status::BAD_REQUEST));
    }

    #[test]
    fn test_replace_and_delete_item() {
        let (store, coll) = store_with_container();
        let link = ResourceLink::document("db", "coll", "a");

        assert!(store.replace_item(&link, json!({"id": "a"})).unwrap_err().is_not_found());
        store.create_item(&coll, json!({"id": "a", "n": 1}), false).unwrap();

        let err = store.replace_item(&link, json!({"id": "b"})).unwrap_err();
        assert_eq!(err.status_code(), Some(status::BAD_REQUEST));

        store.replace_item(&link, json!({"id": "a", "n": 2})).unwrap();
        assert_eq!(store.read_item(&link).unwrap()["n"], json!(2));

        store.delete_item(&link).unwrap();
        assert!(store.read_item(&link).unwrap_err().is_not_found());
        assert!(store.delete_item(&link).unwrap_err().is_not_found());
    }

    #[test]
    fn test_client_system_properties_replaced() {
        let (store, coll) = store_with_container();
        let stored = store
            .create_item(&coll, json!({"id": "a", "_etag": "mine", "_rid": "x"}), false)
            .unwrap();
        assert_ne!(stored["_etag"], json!("mine"));
        assert!(stored.get("_rid").is_none());
    }

    #[test]
    fn test_wrong_link_kind() {
        let store = store();
        let err = store
            .read_database(&ResourceLink::container("db", "coll"))
            .unwrap_err();
        assert_eq!(err.status_code(), Some(status::BAD_REQUEST));
    }

    #[test]
    fn test_delete_database_cascades() {
        let (store, coll) = store_with_container();
        store.create_item(&coll, json!({"id": "a"}), false).unwrap();

        store.delete_database(&ResourceLink::database("db")).unwrap();
        store.create_database(DatabaseProperties::new("db")).unwrap();

        assert!(store.read_container(&coll).unwrap_err().is_not_found());
        assert!(store
            .read_item(&ResourceLink::document("db", "coll", "a"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let store = store();
        let link = ResourceLink::database("db");
        store.fail_next(Operation::ReadDatabase, status::TOO_MANY_REQUESTS);

        let err = store.read_database(&link).unwrap_err();
        assert_eq!(err.status_code(), Some(status::TOO_MANY_REQUESTS));
        assert!(store.read_database(&link).unwrap_err().is_not_found());
    }

    #[test]
    fn test_failed_mutation_leaves_state() {
        let (store, coll) = store_with_container();
        store.fail_next(Operation::CreateItem, status::INTERNAL_SERVER_ERROR);
        assert!(store.create_item(&coll, json!({"id": "a"}), true).is_err());
        assert_eq!(store.item_count(&coll).unwrap(), 0);
    }

    #[test]
    fn test_stats() {
        let (store, coll) = store_with_container();
        store.read_container(&coll).unwrap();
        store.query_items(&coll, "SELECT * FROM c", &FeedOptions::new()).unwrap();

        let stats = store.stats();
        assert_eq!(stats.creates, 2);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.queries, 1);
        assert_eq!(stats.mutations(), 2);
    }
}
