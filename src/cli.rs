//! Command-line arguments for the `getstarted` binary.

use crate::options::{ConnectionPolicy, ConsistencyLevel, DEFAULT_THROUGHPUT};
use crate::store::PLACEHOLDER;
use crate::workflow::{SamplePlan, DEFAULT_CONTAINER, DEFAULT_DATABASE};
use clap::Parser;
use std::fmt;
use std::time::Duration;

/// Endpoint shipped in the sample configuration.
pub const DEFAULT_ENDPOINT: &str = "https://FILLME.documents.azure.com";

/// Printed once the walkthrough has finished.
pub const DEMO_COMPLETE: &str = "Demo complete, please hold while resources are deleted";

/// Line reported for a failed run, with the full cause chain of `err`.
pub fn failure_message(err: &dyn fmt::Display) -> String {
    format!("Cosmos DB GetStarted failed with {:#}", err)
}

/// Provision a family database, query it, and tear it down.
#[derive(Parser, Debug, Clone)]
#[command(name = "getstarted")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Store endpoint: `memory:`, `file://<dir>` or a directory path.
    #[arg(long, env = "GETSTARTED_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Access key.
    #[arg(long, env = "GETSTARTED_KEY", default_value = PLACEHOLDER, hide_env_values = true)]
    pub key: String,

    /// Database to provision.
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Container to provision.
    #[arg(long, default_value = DEFAULT_CONTAINER)]
    pub container: String,

    /// Consistency level for the connection.
    #[arg(long, default_value = "session")]
    pub consistency: ConsistencyLevel,

    /// Throughput reserved for a newly created container.
    #[arg(long, default_value_t = DEFAULT_THROUGHPUT)]
    pub throughput: u32,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,

    /// Don't wait for a key press after each step.
    #[arg(long)]
    pub no_prompt: bool,

    /// Leave the database in place at the end.
    #[arg(long)]
    pub keep: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Connection policy derived from the flags.
    pub fn connection_policy(&self) -> ConnectionPolicy {
        ConnectionPolicy {
            request_timeout: Duration::from_secs(self.timeout),
            ..ConnectionPolicy::default()
        }
    }

    /// What a run should provision.
    pub fn plan(&self) -> SamplePlan {
        SamplePlan {
            database: self.database.clone(),
            container: self.container.clone(),
            teardown: !self.keep,
            ..SamplePlan::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["getstarted"]).unwrap();
        assert_eq!(args.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(args.key, "FILLME");
        assert_eq!(args.database, "FamilyDB");
        assert_eq!(args.container, "FamilyContainer");
        assert_eq!(args.consistency, ConsistencyLevel::Session);
        assert_eq!(args.throughput, 400);
        assert!(!args.no_prompt && !args.keep && !args.verbose);

        let plan = args.plan();
        assert!(plan.teardown);
        assert_eq!(plan.families.len(), 2);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "getstarted",
            "--endpoint",
            "memory:",
            "--key",
            "secret",
            "--consistency",
            "eventual",
            "--timeout",
            "5",
            "--no-prompt",
            "--keep",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.endpoint, "memory:");
        assert_eq!(args.consistency, ConsistencyLevel::Eventual);
        assert_eq!(args.connection_policy().request_timeout, Duration::from_secs(5));
        assert!(args.no_prompt && args.verbose);
        assert!(!args.plan().teardown);
    }

    #[test]
    fn test_console_messages() {
        let err = crate::Error::Auth {
            reason: "placeholder".into(),
        };
        assert_eq!(
            failure_message(&err),
            "Cosmos DB GetStarted failed with authorization failed: placeholder"
        );
        assert_eq!(DEMO_COMPLETE, "Demo complete, please hold while resources are deleted");
    }

    #[test]
    fn test_rejects_unknown_consistency() {
        assert!(Args::try_parse_from(["getstarted", "--consistency", "linearizable"]).is_err());
    }
}
