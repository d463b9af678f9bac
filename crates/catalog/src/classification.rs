//! Per-product classification state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::bucket::BucketSet;

/// Mapping from bucket name to the set of scanned unit numbers.
///
/// Buckets are sets, not counters: recording the same unit twice collapses
/// to a single membership, so a double scan can never double-count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    buckets: BTreeMap<String, BTreeSet<u32>>,
}

impl Classification {
    /// Empty classification holding one set per configured bucket.
    pub fn empty(buckets: &BucketSet) -> Self {
        Self {
            buckets: buckets
                .names()
                .map(|name| (name.to_string(), BTreeSet::new()))
                .collect(),
        }
    }

    /// Record `unit` in `bucket`.
    ///
    /// Returns `true` when the unit was newly recorded; `false` when it was
    /// already present (idempotent re-scan) or the bucket is not configured.
    pub fn insert(&mut self, bucket: &str, unit: u32) -> bool {
        match self.buckets.get_mut(bucket) {
            Some(set) => set.insert(unit),
            None => false,
        }
    }

    /// Remove `unit` from `bucket` (the "unscan" operation).
    ///
    /// Guard: the intake bucket may not shrink below the size of the largest
    /// other bucket — every unit recorded downstream must stay accounted for
    /// at intake. Other buckets have no floor beyond emptiness.
    pub fn remove(&mut self, buckets: &BucketSet, bucket: &str, unit: u32) -> bool {
        if bucket == buckets.intake() {
            let floor = buckets
                .names()
                .filter(|name| *name != bucket)
                .map(|name| self.size(name))
                .max()
                .unwrap_or(0);
            if self.size(bucket) <= floor {
                return false;
            }
        }
        match self.buckets.get_mut(bucket) {
            Some(set) => set.remove(&unit),
            None => false,
        }
    }

    /// Number of units recorded in `bucket` (0 for unknown buckets).
    pub fn size(&self, bucket: &str) -> usize {
        self.buckets.get(bucket).map_or(0, BTreeSet::len)
    }

    /// Units recorded in `bucket`, sorted ascending.
    pub fn units(&self, bucket: &str) -> Option<&BTreeSet<u32>> {
        self.buckets.get(bucket)
    }

    /// All buckets with their unit sets, in name order.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &BTreeSet<u32>)> {
        self.buckets.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Union another classification's units into this one, bucket by bucket.
    ///
    /// Only buckets configured here receive units; bucket names unknown to
    /// this classification are ignored.
    pub fn union_with(&mut self, other: &Classification) {
        for (name, set) in &other.buckets {
            if let Some(mine) = self.buckets.get_mut(name) {
                mine.extend(set.iter().copied());
            }
        }
    }

    /// True when every configured bucket accounts for exactly `total` units.
    pub fn is_closed(&self, total: i64) -> bool {
        self.buckets.values().all(|set| set.len() as i64 == total)
    }
}
