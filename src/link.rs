//! Resource links.
//!
//! Every resource in the store is addressed by a path-like link:
//!
//! - database: `/dbs/{db}`
//! - container: `/dbs/{db}/colls/{coll}`
//! - document: `/dbs/{db}/colls/{coll}/docs/{id}`

use crate::error::{Error, Result};
use std::fmt;

/// Characters a resource id may not contain.
const FORBIDDEN_CHARS: [char; 4] = ['/', '\\', '?', '#'];

/// A parsed resource link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceLink {
    /// `/dbs/{db}`
    Database { db: String },
    /// `/dbs/{db}/colls/{coll}`
    Container { db: String, coll: String },
    /// `/dbs/{db}/colls/{coll}/docs/{id}`
    Document { db: String, coll: String, id: String },
}

impl ResourceLink {
    /// Link to a database.
    pub fn database(db: impl Into<String>) -> Self {
        Self::Database { db: db.into() }
    }

    /// Link to a container.
    pub fn container(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self::Container {
            db: db.into(),
            coll: coll.into(),
        }
    }

    /// Link to a document.
    pub fn document(db: impl Into<String>, coll: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Document {
            db: db.into(),
            coll: coll.into(),
            id: id.into(),
        }
    }

    /// Parse a link string. Leading and trailing slashes are optional.
    pub fn parse(link: &str) -> Result<Self> {
        let parts: Vec<&str> = link.trim_matches('/').split('/').collect();
        let parsed = match parts.as_slice() {
            ["dbs", db] => Self::database(*db),
            ["dbs", db, "colls", coll] => Self::container(*db, *coll),
            ["dbs", db, "colls", coll, "docs", id] => Self::document(*db, *coll, *id),
            _ => return Err(Error::bad_request(link, "malformed resource link")),
        };
        parsed.validate()?;
        Ok(parsed)
    }

    /// Check every id segment.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Database { db } => validate_id(self, db),
            Self::Container { db, coll } => {
                validate_id(self, db)?;
                validate_id(self, coll)
            }
            Self::Document { db, coll, id } => {
                validate_id(self, db)?;
                validate_id(self, coll)?;
                validate_id(self, id)
            }
        }
    }

    /// The database this link lives under.
    pub fn database_id(&self) -> &str {
        match self {
            Self::Database { db } | Self::Container { db, .. } | Self::Document { db, .. } => db,
        }
    }

    /// The link of the parent resource, if any.
    pub fn parent(&self) -> Option<ResourceLink> {
        match self {
            Self::Database { .. } => None,
            Self::Container { db, .. } => Some(Self::database(db.clone())),
            Self::Document { db, coll, .. } => Some(Self::container(db.clone(), coll.clone())),
        }
    }

    /// The last id segment.
    pub fn id(&self) -> &str {
        match self {
            Self::Database { db } => db,
            Self::Container { coll, .. } => coll,
            Self::Document { id, .. } => id,
        }
    }
}

impl fmt::Display for ResourceLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database { db } => write!(f, "/dbs/{}", db),
            Self::Container { db, coll } => write!(f, "/dbs/{}/colls/{}", db, coll),
            Self::Document { db, coll, id } => write!(f, "/dbs/{}/colls/{}/docs/{}", db, coll, id),
        }
    }
}

fn validate_id(link: &ResourceLink, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::bad_request(link.to_string(), "resource id must not be empty"));
    }
    if id.contains(FORBIDDEN_CHARS) {
        return Err(Error::bad_request(
            link.to_string(),
            format!("resource id '{}' contains one of / \\ ? #", id),
        ));
    }
    Ok(())
}
