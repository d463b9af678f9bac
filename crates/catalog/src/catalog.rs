//! The per-product ledger and its merge rules.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};

use ordertally_core::{OrderId, ProductId};

use crate::bucket::BucketSet;
use crate::classification::Classification;

/// Static, CSV-derived fields of a ledger row.
///
/// `total` is the expected unit count for the order line and is the
/// authoritative upper bound used by closure detection. `date` is carried as
/// an opaque ISO string; the persistence boundary stores text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub distributor: i64,
    pub date: String,
    pub order: OrderId,
    pub description: String,
    pub total: i64,
    pub price: f64,
}

/// A ledger row: order-line fields plus classification state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub line: OrderLine,
    pub classification: Classification,
}

impl Row {
    /// Fresh row with empty classification buckets.
    pub fn new(line: OrderLine, buckets: &BucketSet) -> Self {
        Self {
            line,
            classification: Classification::empty(buckets),
        }
    }

    /// True when every tracked bucket accounts for exactly `total` units.
    ///
    /// Recomputed on every read; closure is never cached.
    pub fn is_closed(&self) -> bool {
        self.classification.is_closed(self.line.total)
    }
}

/// Result of recording a scan against the ledger.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Unit newly recorded in the target bucket.
    Recorded,
    /// Unit was already present; buckets are sets, so nothing changed.
    AlreadyRecorded,
    /// No row exists for the scanned product; the scan is dropped.
    UnknownProduct,
    /// The target bucket is not part of the configured set.
    UnknownBucket,
}

/// Result of retracting a scan ("unscan").
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RetractOutcome {
    /// Unit removed from the target bucket.
    Removed,
    /// Nothing removed: unit absent, or the intake floor refused the removal.
    Refused,
    /// No row exists for the scanned product.
    UnknownProduct,
    /// The target bucket is not part of the configured set.
    UnknownBucket,
}

/// The full per-product ledger, keyed by product id.
///
/// Rows are created by CSV import only; scans and persisted-load merges can
/// annotate existing rows but never create one. Rows are never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    buckets: BucketSet,
    rows: BTreeMap<ProductId, Row>,
}

impl Catalog {
    /// Empty catalog tracking the given bucket set.
    pub fn new(buckets: BucketSet) -> Self {
        Self {
            buckets,
            rows: BTreeMap::new(),
        }
    }

    pub fn buckets(&self) -> &BucketSet {
        &self.buckets
    }

    pub fn get(&self, product: ProductId) -> Option<&Row> {
        self.rows.get(&product)
    }

    pub fn rows(&self) -> impl Iterator<Item = (ProductId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert a fully-formed row, replacing any existing one.
    ///
    /// This is the reconstruction entry point for the persistence gateway;
    /// reconciliation paths go through [`Catalog::bulk_insert`] and
    /// [`Catalog::merge_loaded`] instead.
    pub fn insert_row(&mut self, product: ProductId, row: Row) {
        self.rows.insert(product, row);
    }

    /// Fold a parsed CSV batch into the ledger.
    ///
    /// Union that prefers existing rows on key collision: a re-import never
    /// resets classification work already recorded against a product. Returns
    /// the number of newly created rows.
    pub fn bulk_insert<I>(&mut self, parsed: I) -> usize
    where
        I: IntoIterator<Item = (ProductId, OrderLine)>,
    {
        let mut added = 0;
        for (product, line) in parsed {
            if let Entry::Vacant(slot) = self.rows.entry(product) {
                slot.insert(Row::new(line, &self.buckets));
                added += 1;
            }
        }
        added
    }

    /// Record a scanned unit in `bucket` on the row for `product`.
    pub fn apply_scan(&mut self, bucket: &str, product: ProductId, unit: u32) -> ScanOutcome {
        if !self.buckets.contains(bucket) {
            return ScanOutcome::UnknownBucket;
        }
        match self.rows.get_mut(&product) {
            Some(row) => {
                if row.classification.insert(bucket, unit) {
                    ScanOutcome::Recorded
                } else {
                    ScanOutcome::AlreadyRecorded
                }
            }
            None => ScanOutcome::UnknownProduct,
        }
    }

    /// Retract a previously scanned unit from `bucket` on the row for
    /// `product`, subject to the intake floor guard.
    pub fn retract_scan(&mut self, bucket: &str, product: ProductId, unit: u32) -> RetractOutcome {
        if !self.buckets.contains(bucket) {
            return RetractOutcome::UnknownBucket;
        }
        match self.rows.get_mut(&product) {
            Some(row) => {
                if row.classification.remove(&self.buckets, bucket, unit) {
                    RetractOutcome::Removed
                } else {
                    RetractOutcome::Refused
                }
            }
            None => RetractOutcome::UnknownProduct,
        }
    }

    /// Fold a loaded persisted snapshot into the ledger.
    ///
    /// Bucket-level union onto existing rows: loaded unit sets are added to
    /// the local sets, local order-line fields win, and loaded rows for
    /// products unknown locally are dropped. Returns the number of rows that
    /// received loaded units.
    pub fn merge_loaded(&mut self, loaded: Catalog) -> usize {
        let mut merged = 0;
        for (product, row) in loaded.rows {
            if let Some(local) = self.rows.get_mut(&product) {
                local.classification.union_with(&row.classification);
                merged += 1;
            }
        }
        merged
    }
}
