//! Event dispatch and the import/load request cycle.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use ordertally_catalog::{BucketSet, Catalog, OrderLine};
use ordertally_codec::{barcode, CsvFile};
use ordertally_core::{OrderId, ProductId};
use ordertally_gateway as gateway;

/// Where the controller stands in the import/load request cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    AwaitingCsvParse,
    AwaitingPersistedLoad { order: OrderId },
}

/// Discrete inputs admitted to the controller, one at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Files were submitted for import.
    ImportRequested { files: Vec<CsvFile> },
    /// The asynchronous parse of an import batch completed.
    CsvParsed { records: Vec<(ProductId, OrderLine)> },
    /// The persistence boundary answered a fetch request.
    PersistedLoadArrived { snapshot: JsonValue },
    /// The scan field was submitted (line-terminator keystroke).
    ScanSubmitted { raw: String },
    /// A scan retraction was submitted ("unscan").
    ScanRetracted { raw: String },
    /// The operator switched the bucket that subsequent scans target.
    ModeChanged { bucket: String },
    /// Persist the current ledger.
    CommitRequested,
    /// Fire the print/export signal.
    PrintRequested,
}

/// Requests issued to external collaborators.
///
/// Fire-and-forget from the core's perspective; completions come back as
/// events ([`ControllerEvent::CsvParsed`],
/// [`ControllerEvent::PersistedLoadArrived`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Parse all submitted files, then deliver `CsvParsed`.
    ParseCsvFiles { files: Vec<CsvFile> },
    /// Load persisted rows for `order`, then deliver `PersistedLoadArrived`.
    FetchPersisted { order: OrderId },
    /// Write the encoded ledger to the persistence boundary.
    Persist { snapshot: JsonValue },
    /// Clear the scan input field.
    ClearScanInput,
    /// Trigger print/export; no payload, no acknowledgment expected.
    TriggerPrint,
}

/// The reconciliation controller.
///
/// Owns the catalog exclusively; collaborators never mutate it directly,
/// they only supply inputs that `handle` folds in, one event to completion
/// before the next is admitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    catalog: Catalog,
    phase: Phase,
    mode: String,
}

impl Controller {
    /// Controller over an empty catalog; scans initially target the intake
    /// bucket.
    pub fn new(buckets: BucketSet) -> Self {
        let mode = buckets.intake().to_string();
        Self {
            catalog: Catalog::new(buckets),
            phase: Phase::Idle,
            mode,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bucket that subsequent scans target.
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Process one event to completion and return the follow-up requests.
    pub fn handle(&mut self, event: ControllerEvent) -> Vec<Effect> {
        match event {
            ControllerEvent::ImportRequested { files } => self.on_import_requested(files),
            ControllerEvent::CsvParsed { records } => self.on_csv_parsed(records),
            ControllerEvent::PersistedLoadArrived { snapshot } => self.on_persisted_load(&snapshot),
            ControllerEvent::ScanSubmitted { raw } => self.on_scan_submitted(&raw),
            ControllerEvent::ScanRetracted { raw } => self.on_scan_retracted(&raw),
            ControllerEvent::ModeChanged { bucket } => self.on_mode_changed(bucket),
            ControllerEvent::CommitRequested => {
                vec![Effect::Persist {
                    snapshot: gateway::encode(&self.catalog),
                }]
            }
            ControllerEvent::PrintRequested => vec![Effect::TriggerPrint],
        }
    }

    fn on_import_requested(&mut self, files: Vec<CsvFile>) -> Vec<Effect> {
        if self.phase != Phase::Idle {
            warn!(phase = ?self.phase, "dropping import request outside idle");
            return Vec::new();
        }
        self.phase = Phase::AwaitingCsvParse;
        vec![Effect::ParseCsvFiles { files }]
    }

    fn on_csv_parsed(&mut self, records: Vec<(ProductId, OrderLine)>) -> Vec<Effect> {
        if self.phase != Phase::AwaitingCsvParse {
            warn!(phase = ?self.phase, "dropping parse completion without a pending import");
            return Vec::new();
        }

        // One import batch belongs to one order; its id is the request token
        // for the follow-up load.
        let Some(order) = records.first().map(|(_, line)| line.order) else {
            self.phase = Phase::Idle;
            return Vec::new();
        };

        let added = self.catalog.bulk_insert(records);
        debug!(added, %order, "import batch folded into catalog");
        self.phase = Phase::AwaitingPersistedLoad { order };
        vec![Effect::FetchPersisted { order }]
    }

    fn on_persisted_load(&mut self, snapshot: &JsonValue) -> Vec<Effect> {
        let Phase::AwaitingPersistedLoad { order } = self.phase else {
            warn!(phase = ?self.phase, "dropping persisted load without a pending fetch");
            return Vec::new();
        };

        let (loaded, diagnostics) = gateway::decode(snapshot, self.catalog.buckets());
        if !diagnostics.is_empty() {
            warn!(%order, count = diagnostics.len(), "persisted snapshot carried integrity problems");
        }

        let loaded_rows = loaded.len();
        let merged = self.catalog.merge_loaded(loaded);
        if merged < loaded_rows {
            debug!(%order, dropped = loaded_rows - merged, "loaded rows for unknown products dropped");
        }

        self.phase = Phase::Idle;
        Vec::new()
    }

    fn on_scan_submitted(&mut self, raw: &str) -> Vec<Effect> {
        match barcode::decode(raw) {
            Some(code) => {
                let outcome = self.catalog.apply_scan(&self.mode, code.product, code.unit);
                debug!(scan = %barcode::encode(&code), bucket = %self.mode, ?outcome, "scan processed");
            }
            None => {
                debug!(len = raw.len(), "undecodable scan ignored");
            }
        }
        // The input field clears whether or not the scan decoded.
        vec![Effect::ClearScanInput]
    }

    fn on_scan_retracted(&mut self, raw: &str) -> Vec<Effect> {
        match barcode::decode(raw) {
            Some(code) => {
                let outcome = self.catalog.retract_scan(&self.mode, code.product, code.unit);
                debug!(scan = %barcode::encode(&code), bucket = %self.mode, ?outcome, "scan retracted");
            }
            None => {
                debug!(len = raw.len(), "undecodable retraction ignored");
            }
        }
        vec![Effect::ClearScanInput]
    }

    fn on_mode_changed(&mut self, bucket: String) -> Vec<Effect> {
        if self.catalog.buckets().contains(&bucket) {
            self.mode = bucket;
        } else {
            warn!(%bucket, "ignoring switch to unconfigured bucket");
        }
        Vec::new()
    }
}
