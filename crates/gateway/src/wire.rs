//! Wire encode/decode for persisted catalog snapshots.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::warn;

use ordertally_catalog::{BucketSet, Catalog, OrderLine, Row};
use ordertally_core::ProductId;

/// Integrity problems observed while decoding a persisted snapshot.
///
/// Decode never fails outright: the affected field or row degrades (empty
/// bucket, skipped row) and the problem is reported here, since it points at
/// corrupted persisted state rather than ordinary input noise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireDiagnostic {
    #[error("bucket `{bucket}` of product {product} holds unparseable text {raw:?}; decoded as empty")]
    CorruptBucket {
        product: ProductId,
        bucket: String,
        raw: String,
    },

    #[error("snapshot row `{key}` is malformed: {reason}")]
    MalformedRow { key: String, reason: String },

    #[error("snapshot is not an object (found {found})")]
    MalformedSnapshot { found: String },
}

/// Per-row wire shape: order-line fields verbatim, plus one string field per
/// bucket holding the JSON array text of its unit numbers.
#[derive(Debug, Clone, Deserialize)]
struct WireRow {
    #[serde(flatten)]
    line: OrderLine,
    #[serde(flatten)]
    buckets: BTreeMap<String, String>,
}

/// Encode a catalog into the wire value accepted by the persistence boundary:
/// an object keyed by the string form of each product id.
pub fn encode(catalog: &Catalog) -> JsonValue {
    let mut snapshot = Map::new();
    for (product, row) in catalog.rows() {
        snapshot.insert(product.to_string(), encode_row(row, catalog.buckets()));
    }
    JsonValue::Object(snapshot)
}

fn encode_row(row: &Row, buckets: &BucketSet) -> JsonValue {
    let mut object = Map::new();
    object.insert("distributor".to_string(), row.line.distributor.into());
    object.insert("date".to_string(), JsonValue::String(row.line.date.clone()));
    object.insert("order".to_string(), row.line.order.value().into());
    object.insert(
        "description".to_string(),
        JsonValue::String(row.line.description.clone()),
    );
    object.insert("total".to_string(), row.line.total.into());
    object.insert("price".to_string(), row.line.price.into());

    for name in buckets.names() {
        let text = match row.classification.units(name) {
            Some(units) => encode_units(units),
            None => "[]".to_string(),
        };
        object.insert(name.to_string(), JsonValue::String(text));
    }

    JsonValue::Object(object)
}

fn encode_units(units: &BTreeSet<u32>) -> String {
    let items: Vec<String> = units.iter().map(|unit| unit.to_string()).collect();
    format!("[{}]", items.join(","))
}

/// Decode a persisted wire value back into a catalog.
///
/// Inverse of [`encode`]. A bucket string that fails to parse as an integer
/// list decodes to the empty set; a row whose key or order-line fields do not
/// deserialize is skipped. Both are reported as diagnostics and logged.
pub fn decode(wire: &JsonValue, buckets: &BucketSet) -> (Catalog, Vec<WireDiagnostic>) {
    let mut catalog = Catalog::new(buckets.clone());
    let mut diagnostics = Vec::new();

    let Some(snapshot) = wire.as_object() else {
        let diagnostic = WireDiagnostic::MalformedSnapshot {
            found: type_name(wire).to_string(),
        };
        warn!(%diagnostic, "discarding persisted snapshot");
        diagnostics.push(diagnostic);
        return (catalog, diagnostics);
    };

    for (key, value) in snapshot {
        let Ok(product) = key.parse::<ProductId>() else {
            let diagnostic = WireDiagnostic::MalformedRow {
                key: key.clone(),
                reason: "row key is not an integer product id".to_string(),
            };
            warn!(%diagnostic, "skipping persisted row");
            diagnostics.push(diagnostic);
            continue;
        };

        let wire_row: WireRow = match serde_json::from_value(value.clone()) {
            Ok(wire_row) => wire_row,
            Err(err) => {
                let diagnostic = WireDiagnostic::MalformedRow {
                    key: key.clone(),
                    reason: err.to_string(),
                };
                warn!(%diagnostic, "skipping persisted row");
                diagnostics.push(diagnostic);
                continue;
            }
        };

        let mut row = Row::new(wire_row.line, buckets);
        for name in buckets.names() {
            let Some(text) = wire_row.buckets.get(name) else {
                // Absent bucket field: nothing was persisted, empty set.
                continue;
            };
            match serde_json::from_str::<Vec<u32>>(text) {
                Ok(units) => {
                    for unit in units {
                        row.classification.insert(name, unit);
                    }
                }
                Err(_) => {
                    let diagnostic = WireDiagnostic::CorruptBucket {
                        product,
                        bucket: name.to_string(),
                        raw: text.clone(),
                    };
                    warn!(%diagnostic, "bucket degraded to empty set");
                    diagnostics.push(diagnostic);
                }
            }
        }

        catalog.insert_row(product, row);
    }

    (catalog, diagnostics)
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
