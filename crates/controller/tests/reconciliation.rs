//! Black-box test of the full reconciliation cycle: import, persisted load,
//! scanning to closure, commit.

use serde_json::{json, Value as JsonValue};

use ordertally_catalog::BucketSet;
use ordertally_codec::{parse_files, CsvFile};
use ordertally_controller::{Controller, ControllerEvent, Effect, Phase};
use ordertally_core::{OrderId, ProductId};

const WIDGET_CSV: &str =
    "C1,D1,Dept,2024-01-01,PO1,1001,CP1,Widget,BrandX,12ct,10.0,1.0,3,36,1.25,500";

/// Scan raw for product 1001: 6 filler chars, the 7-digit product window,
/// then a 2-digit unit suffix.
fn scan_raw(unit: u32) -> String {
    format!("LOT1230001001{unit:02}")
}

/// Play the collaborator: execute the parse effect and answer with the
/// completion event.
fn complete_parse(controller: &mut Controller, effects: Vec<Effect>) -> Vec<Effect> {
    let [Effect::ParseCsvFiles { files }] = effects.as_slice() else {
        panic!("expected a parse request, got {effects:?}");
    };
    let records = parse_files(files);
    controller.handle(ControllerEvent::CsvParsed { records })
}

#[test]
fn import_scan_and_commit_close_an_order_line() {
    let mut controller = Controller::new(BucketSet::received_used());
    let product = ProductId::new(1001);

    // Import one uploaded file.
    let effects = controller.handle(ControllerEvent::ImportRequested {
        files: vec![CsvFile::new("order-500.csv", WIDGET_CSV)],
    });
    let effects = complete_parse(&mut controller, effects);

    // The parsed batch triggers a persisted-row fetch for its order.
    assert_eq!(
        effects,
        vec![Effect::FetchPersisted {
            order: OrderId::new(500),
        }]
    );

    let row = controller.catalog().get(product).expect("imported row");
    assert_eq!(row.line.total, 3);
    assert_eq!(row.line.description, "Widget, BrandX, 12ct");
    assert_eq!(row.line.price, 1.25);
    assert_eq!(row.classification.size("received"), 0);
    assert_eq!(row.classification.size("used"), 0);

    // The persistence boundary answers with a snapshot holding one scan
    // from a previous session.
    let snapshot = json!({
        "1001": {
            "distributor": 0,
            "date": "2024-01-01",
            "order": 500,
            "description": "Widget, BrandX, 12ct",
            "total": 3,
            "price": 1.25,
            "received": "[1]",
            "used": "[]"
        }
    });
    let effects = controller.handle(ControllerEvent::PersistedLoadArrived { snapshot });
    assert!(effects.is_empty());
    assert_eq!(controller.phase(), Phase::Idle);

    let row = controller.catalog().get(product).unwrap();
    assert_eq!(row.classification.size("received"), 1);
    assert!(!row.is_closed());

    // Re-scanning the restored unit is a no-op; units 2 and 3 fill intake.
    for unit in [1, 1, 2, 3] {
        let effects = controller.handle(ControllerEvent::ScanSubmitted {
            raw: scan_raw(unit),
        });
        assert_eq!(effects, vec![Effect::ClearScanInput]);
    }
    let row = controller.catalog().get(product).unwrap();
    assert_eq!(row.classification.size("received"), 3);
    assert!(!row.is_closed());

    // Switch buckets and account for usage of all three units.
    controller.handle(ControllerEvent::ModeChanged {
        bucket: "used".to_string(),
    });
    for unit in [1, 2, 3] {
        controller.handle(ControllerEvent::ScanSubmitted {
            raw: scan_raw(unit),
        });
    }
    assert!(controller.catalog().get(product).unwrap().is_closed());

    // Commit: the persisted snapshot carries the double-encoded buckets.
    let effects = controller.handle(ControllerEvent::CommitRequested);
    let [Effect::Persist { snapshot }] = effects.as_slice() else {
        panic!("expected a persist effect, got {effects:?}");
    };
    assert_eq!(snapshot["1001"]["received"], json!("[1,2,3]"));
    assert_eq!(snapshot["1001"]["used"], json!("[1,2,3]"));
    assert_eq!(snapshot["1001"]["total"], json!(3));

    // Print trigger is fire-and-forget.
    let effects = controller.handle(ControllerEvent::PrintRequested);
    assert_eq!(effects, vec![Effect::TriggerPrint]);
}

#[test]
fn scans_for_unlisted_products_never_create_rows() {
    let mut controller = Controller::new(BucketSet::received_used());
    let effects = controller.handle(ControllerEvent::ImportRequested {
        files: vec![CsvFile::new("order-500.csv", WIDGET_CSV)],
    });
    complete_parse(&mut controller, effects);

    // Product 4242 is not part of the imported order.
    controller.handle(ControllerEvent::ScanSubmitted {
        raw: "LOT123000424201".to_string(),
    });
    assert_eq!(controller.catalog().len(), 1);
    assert!(controller.catalog().get(ProductId::new(4242)).is_none());

    // Neither is a persisted row for it.
    let snapshot: JsonValue = json!({
        "4242": {
            "distributor": 0,
            "date": "2024-01-01",
            "order": 500,
            "description": "Ghost, BrandZ, 1ct",
            "total": 2,
            "price": 0.5,
            "received": "[1]",
            "used": "[]"
        }
    });
    controller.handle(ControllerEvent::PersistedLoadArrived { snapshot });
    assert_eq!(controller.catalog().len(), 1);
    assert!(controller.catalog().get(ProductId::new(4242)).is_none());
}
