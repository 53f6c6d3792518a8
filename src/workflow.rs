//! Idempotent provisioning of the sample database.
//!
//! Every `ensure_*` operation has the same shape: read the resource; if the
//! read fails with 404, create it; any other failure is returned untouched
//! and nothing is created. Running the workflow against a store that already
//! holds the resources therefore issues reads only.
//!
//! ```
//! use getstarted::{connect, ConnectionPolicy, ConsistencyLevel, Recorder, Workflow};
//!
//! # fn main() -> getstarted::Result<()> {
//! let store = connect("memory:", "key", ConnectionPolicy::default(), ConsistencyLevel::Session)?;
//! let mut workflow = Workflow::new(&store, Recorder::new());
//!
//! assert!(workflow.ensure_database("FamilyDB").is_created());
//! assert!(workflow.ensure_database("FamilyDB").is_found());
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use crate::fixtures;
use crate::link::ResourceLink;
use crate::model::Family;
use crate::notifier::StepNotifier;
use crate::options::{
    ContainerProperties, DatabaseProperties, FeedOptions, IndexingPolicy, RequestOptions,
    DEFAULT_THROUGHPUT,
};
use crate::query::quote_literal;
use crate::store::DocumentStore;
use serde_json::Value;

/// Database provisioned by the sample.
pub const DEFAULT_DATABASE: &str = "FamilyDB";

/// Container provisioned by the sample.
pub const DEFAULT_CONTAINER: &str = "FamilyContainer";

/// Surname the sample query filters on.
pub const DEFAULT_QUERY_LAST_NAME: &str = "Andersen";

/// Printed before query results.
pub const QUERY_BANNER: &str = "Running SQL query...";

/// Outcome of a check-then-create step.
#[derive(Debug)]
#[must_use]
pub enum Provisioned<T> {
    /// The resource already existed; nothing was written.
    Found(T),
    /// The read returned 404 and the resource was created.
    Created(T),
    /// The read failed with something other than 404, or the create failed.
    Failed(Error),
}

impl<T> Provisioned<T> {
    /// `Found`/`Created` → `Ok`, `Failed` → `Err`.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Found(value) | Self::Created(value) => Ok(value),
            Self::Failed(err) => Err(err),
        }
    }

    /// Whether the resource already existed.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Whether the resource was created by this call.
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    /// Whether the step failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The resource, unless the step failed.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Found(value) | Self::Created(value) => Some(value),
            Self::Failed(_) => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Convert the resource, keeping the tag. A conversion error fails the step.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Result<U>) -> Provisioned<U> {
        match self {
            Self::Found(value) => f(value).map_or_else(Provisioned::Failed, Provisioned::Found),
            Self::Created(value) => f(value).map_or_else(Provisioned::Failed, Provisioned::Created),
            Self::Failed(err) => Provisioned::Failed(err),
        }
    }
}

/// Read, and create only if the read reports 404.
///
/// `create` is never called when `read` succeeds or fails with any other
/// status.
pub fn provision<T>(
    read: impl FnOnce() -> Result<T>,
    create: impl FnOnce() -> Result<T>,
) -> Provisioned<T> {
    match read() {
        Ok(value) => Provisioned::Found(value),
        Err(err) if err.is_not_found() => match create() {
            Ok(value) => Provisioned::Created(value),
            Err(err) => Provisioned::Failed(err),
        },
        Err(err) => Provisioned::Failed(err),
    }
}

/// What to provision in a full run.
#[derive(Debug, Clone)]
pub struct SamplePlan {
    /// Database id.
    pub database: String,
    /// Container id.
    pub container: String,
    /// Documents to ensure, in order.
    pub families: Vec<Family>,
    /// Surname the query filters on.
    pub query_last_name: String,
    /// Delete the database at the end.
    pub teardown: bool,
}

impl Default for SamplePlan {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            container: DEFAULT_CONTAINER.to_string(),
            families: fixtures::sample_families(),
            query_last_name: DEFAULT_QUERY_LAST_NAME.to_string(),
            teardown: true,
        }
    }
}

/// What a full run did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// The database did not exist and was created.
    pub database_created: bool,
    /// The container did not exist and was created.
    pub container_created: bool,
    /// Ids of documents created by this run.
    pub families_created: Vec<String>,
    /// Documents returned by the query.
    pub query_results: Vec<Value>,
    /// The database was deleted at the end.
    pub torn_down: bool,
}

/// Drives a [`DocumentStore`] through the sample, reporting to a [`StepNotifier`].
#[derive(Debug)]
pub struct Workflow<S, N> {
    store: S,
    notifier: N,
    indexing_policy: IndexingPolicy,
    throughput: u32,
}

impl<S: DocumentStore, N: StepNotifier> Workflow<S, N> {
    /// New containers get a string range index and [`DEFAULT_THROUGHPUT`].
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            store,
            notifier,
            indexing_policy: IndexingPolicy::string_range(),
            throughput: DEFAULT_THROUGHPUT,
        }
    }

    /// Throughput reserved for containers this workflow creates.
    pub fn with_throughput(mut self, throughput: u32) -> Self {
        self.throughput = throughput;
        self
    }

    /// Indexing policy for containers this workflow creates.
    pub fn with_indexing_policy(mut self, policy: IndexingPolicy) -> Self {
        self.indexing_policy = policy;
        self
    }

    /// The store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Give back the store and notifier.
    pub fn into_parts(self) -> (S, N) {
        (self.store, self.notifier)
    }

    /// Make sure database `name` exists.
    pub fn ensure_database(&mut self, name: &str) -> Provisioned<DatabaseProperties> {
        let link = ResourceLink::database(name);
        let store = &self.store;
        let outcome = provision(
            || store.read_database(&link),
            || store.create_database(DatabaseProperties::new(name)),
        );
        self.announce(outcome, &link, Some(format!("Found {}", name)), format!("Created {}", name))
    }

    /// Make sure container `container` exists in `database`.
    ///
    /// A new container gets this workflow's indexing policy and throughput.
    pub fn ensure_container(&mut self, database: &str, container: &str) -> Provisioned<ContainerProperties> {
        let database_link = ResourceLink::database(database);
        let link = ResourceLink::container(database, container);
        let properties =
            ContainerProperties::new(container).with_indexing_policy(self.indexing_policy.clone());
        let options = RequestOptions::default().with_offer_throughput(self.throughput);

        let store = &self.store;
        let outcome = provision(
            || store.read_container(&link),
            || store.create_container(&database_link, properties, &options),
        );
        self.announce(
            outcome,
            &link,
            Some(format!("Found {}", container)),
            format!("Created {}", container),
        )
    }

    /// Make sure `family` exists in the container, keyed by its id.
    ///
    /// An existing document is returned as stored and left as is, whatever
    /// its contents.
    pub fn ensure_family(&mut self, database: &str, container: &str, family: &Family) -> Provisioned<Value> {
        let container_link = ResourceLink::container(database, container);
        let link = ResourceLink::document(database, container, family.id.clone());

        let store = &self.store;
        let outcome = provision(
            || store.read_item(&link),
            || store.create_item(&container_link, to_document(family)?, true),
        );
        self.announce(outcome, &link, None, format!("Created Family {}", family.id))
    }

    /// Run a query and return every matching document.
    pub fn query(
        &mut self,
        database: &str,
        container: &str,
        query: &str,
        options: &FeedOptions,
    ) -> Result<Vec<Value>> {
        let link = ResourceLink::container(database, container);
        let feed = self.store.query_items(&link, query, options)?;

        self.notifier.line(QUERY_BANNER)?;
        let mut results = Vec::new();
        for doc in feed {
            self.notifier.line(&format!("\tRead {}", doc))?;
            results.push(doc);
        }

        tracing::debug!(%link, query, results = results.len(), "query finished");
        Ok(results)
    }

    /// Query every family with the given surname, across partitions, in one page.
    pub fn run_sample_query(&mut self, database: &str, container: &str, last_name: &str) -> Result<Vec<Value>> {
        let query = format!(
            "SELECT * FROM Family WHERE Family.lastName = {}",
            quote_literal(last_name)
        );
        let options = FeedOptions::new()
            .page_size(-1)
            .enable_cross_partition_query(true);
        self.query(database, container, &query, &options)
    }

    /// Delete the database and everything in it.
    pub fn teardown(&mut self, database: &str) -> Result<()> {
        let link = ResourceLink::database(database);
        self.store.delete_database(&link)?;
        tracing::info!(%link, "database torn down");
        Ok(())
    }

    /// Replace a family document by id.
    pub fn replace_family(&mut self, database: &str, container: &str, family: &Family) -> Result<Family> {
        let link = ResourceLink::document(database, container, family.id.clone());
        let replaced = from_document(self.store.replace_item(&link, to_document(family)?)?)?;
        self.notifier.step(&format!("Replaced Family {}", family.id))?;
        Ok(replaced)
    }

    /// Delete a family document by id.
    pub fn delete_family(&mut self, database: &str, container: &str, id: &str) -> Result<()> {
        let link = ResourceLink::document(database, container, id);
        self.store.delete_item(&link)?;
        self.notifier.step(&format!("Deleted Family {}", id))
    }

    /// The whole walkthrough: database, container, documents, query, teardown.
    ///
    /// Stops at the first failure. Resources created before it are left in place.
    pub fn run(&mut self, plan: &SamplePlan) -> Result<RunReport> {
        let mut report = RunReport {
            database_created: self.ensure_database(&plan.database).into_result_tagged()?,
            container_created: self
                .ensure_container(&plan.database, &plan.container)
                .into_result_tagged()?,
            ..RunReport::default()
        };

        for family in &plan.families {
            if self
                .ensure_family(&plan.database, &plan.container, family)
                .into_result_tagged()?
            {
                report.families_created.push(family.id.clone());
            }
        }

        report.query_results =
            self.run_sample_query(&plan.database, &plan.container, &plan.query_last_name)?;

        if plan.teardown {
            self.teardown(&plan.database)?;
            report.torn_down = true;
        }

        Ok(report)
    }

    fn announce<T>(
        &mut self,
        outcome: Provisioned<T>,
        link: &ResourceLink,
        found: Option<String>,
        created: String,
    ) -> Provisioned<T> {
        let message = match &outcome {
            Provisioned::Found(_) => {
                tracing::debug!(%link, "already present");
                found
            }
            Provisioned::Created(_) => {
                tracing::info!(%link, "provisioned");
                Some(created)
            }
            Provisioned::Failed(err) => {
                tracing::debug!(%link, error = %err, "provisioning failed");
                None
            }
        };

        match message {
            Some(message) => match self.notifier.step(&message) {
                Ok(()) => outcome,
                Err(err) => Provisioned::Failed(err),
            },
            None => outcome,
        }
    }
}

impl<T> Provisioned<T> {
    /// `Ok(true)` if created, `Ok(false)` if found.
    fn into_result_tagged(self) -> Result<bool> {
        let created = self.is_created();
        self.into_result().map(|_| created)
    }
}

fn to_document(family: &Family) -> Result<Value> {
    serde_json::to_value(family)
        .map_err(|e| Error::Serialization(format!("failed to serialize family {}: {}", family.id, e)))
}

fn from_document(doc: Value) -> Result<Family> {
    serde_json::from_value(doc).map_err(|e| Error::Serialization(format!("not a family document: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::status;

    #[test]
    fn test_provision_found_skips_create() {
        let mut created = false;
        let outcome = provision(|| Ok(1), || {
            created = true;
            Ok(2)
        });
        assert!(outcome.is_found());
        assert_eq!(outcome.value(), Some(&1));
        assert!(!created);
    }

    #[test]
    fn test_provision_not_found_creates() {
        let outcome = provision(|| Err(Error::not_found("/dbs/a")), || Ok(2));
        assert!(outcome.is_created());
        assert_eq!(outcome.into_result().unwrap(), 2);
    }

    #[test]
    fn test_provision_other_status_fails_without_create() {
        for code in [status::UNAUTHORIZED, status::TOO_MANY_REQUESTS, status::INTERNAL_SERVER_ERROR] {
            let mut created = false;
            let outcome: Provisioned<i32> = provision(
                || Err(Error::status(code, "/dbs/a", "nope")),
                || {
                    created = true;
                    Ok(2)
                },
            );
            assert!(outcome.is_failed());
            assert_eq!(outcome.error().and_then(Error::status_code), Some(code));
            assert!(!created);
        }
    }

    #[test]
    fn test_provision_create_failure() {
        let outcome: Provisioned<i32> = provision(
            || Err(Error::not_found("/dbs/a")),
            || Err(Error::conflict("/dbs/a")),
        );
        assert_eq!(outcome.into_result().unwrap_err().status_code(), Some(status::CONFLICT));
    }

    #[test]
    fn test_and_then_keeps_tag() {
        let found: Provisioned<i32> = Provisioned::Found(1);
        assert!(found.and_then(|v| Ok(v + 1)).is_found());

        let created: Provisioned<i32> = Provisioned::Created(1);
        let failed = created.and_then(|_| -> Result<i32> { Err(Error::Serialization("x".into())) });
        assert!(failed.is_failed());
    }
}
