//! getstarted - Provision and query a family document database
//!
//! A walkthrough of a document-database client: make sure a database, a
//! container and two family documents exist, query them back by surname,
//! then delete the database.
//!
//! # Core Ideas
//!
//! - **Idempotent provisioning**: every step reads first and creates only on 404
//! - **Narrow client surface**: the workflow depends on the [`DocumentStore`] trait only
//! - **Fatal by default**: anything other than 404 stops the run unchanged
//! - **Offline-capable**: [`LocalStore`] serves the same contract in-process or from a directory
//!
//! # Example
//!
//! ```
//! use getstarted::{connect, ConnectionPolicy, ConsistencyLevel, Recorder, SamplePlan, Workflow};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = connect("memory:", "secret", ConnectionPolicy::default(), ConsistencyLevel::Session)?;
//! let mut workflow = Workflow::new(&store, Recorder::new());
//!
//! let report = workflow.run(&SamplePlan::default())?;
//! assert_eq!(report.families_created, ["Andersen.1", "Wakefield.7"]);
//! assert_eq!(report.query_results.len(), 1);
//! assert!(store.database_ids().is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod error;
pub mod feed;
pub mod filter;
pub mod fixtures;
pub mod link;
pub mod local;
pub mod lock;
pub mod model;
pub mod notifier;
pub mod options;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
pub use feed::{Feed, FeedPage};
pub use filter::{CompareOp, Filter};
pub use link::ResourceLink;
pub use local::{LocalStore, Operation, StoreStats};
pub use lock::StoreLock;
pub use model::{Address, Child, Family, Parent, Pet};
pub use notifier::{ConsolePrompt, Recorder, Silent, StepNotifier, CONTINUE_PROMPT};
pub use options::{
    ConnectionPolicy, ConsistencyLevel, ContainerProperties, DatabaseProperties, FeedOptions,
    IndexingPolicy, PartitionKeyDefinition, RequestOptions, DEFAULT_THROUGHPUT,
};
pub use query::Query;
pub use snapshot::Snapshot;
pub use store::{connect, DocumentStore, Endpoint};
pub use workflow::{provision, Provisioned, RunReport, SamplePlan, Workflow};
