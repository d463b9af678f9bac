//! Configuration-time enumeration of classification buckets.

use serde::{Deserialize, Serialize};

use ordertally_core::{DomainError, DomainResult};

/// Ordered set of bucket names tracked per ledger row.
///
/// The first name is the *intake* bucket: units enter the ledger there, and
/// [`crate::Classification::remove`] keeps it at least as large as every
/// other bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    names: Vec<String>,
}

impl BucketSet {
    /// Build a bucket set from ordered names; the first is the intake bucket.
    pub fn new<I, S>(names: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(DomainError::validation("bucket set cannot be empty"));
        }
        for name in &names {
            if name.trim().is_empty() {
                return Err(DomainError::validation("bucket name cannot be blank"));
            }
        }
        Ok(Self { names })
    }

    /// Two-tier reference deployment: `received` / `used`.
    pub fn received_used() -> Self {
        Self {
            names: vec!["received".to_string(), "used".to_string()],
        }
    }

    /// Five-tier deployment variant.
    pub fn five_tier() -> Self {
        Self {
            names: ["received", "lower", "inter", "high", "academia"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Name of the intake bucket (always the first configured name).
    pub fn intake(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
