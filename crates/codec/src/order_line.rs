//! Order-line CSV record parsing.

use ordertally_catalog::OrderLine;
use ordertally_core::{OrderId, ProductId};

/// Required field arity of an order-line record.
///
/// Positions are fixed by the upstream export format: customer, distributor,
/// department, date, PO number, product id, customer product id, description,
/// brand, pack size, case price, each price, case count, each count,
/// extended price, order number.
const FIELD_COUNT: usize = 16;

const F_DISTRIBUTOR: usize = 1;
const F_DATE: usize = 3;
const F_PRODUCT: usize = 5;
const F_DESCRIPTION: usize = 7;
const F_BRAND: usize = 8;
const F_PACK_SIZE: usize = 9;
const F_CASE_COUNT: usize = 12;
const F_EXTENDED_PRICE: usize = 14;
const F_ORDER: usize = 15;

/// Parse one positional record into a product id and its order line.
///
/// Only an arity mismatch fails the record, with no partial result. Numeric
/// fields are lenient: a malformed integer becomes 0 and a malformed float
/// 0.0. The description is synthesized as `"<desc>, <brand>, <pack size>"`.
pub fn parse_order_line(fields: &[String]) -> Option<(ProductId, OrderLine)> {
    if fields.len() != FIELD_COUNT {
        return None;
    }

    let product = ProductId::new(lenient_int(&fields[F_PRODUCT]));
    let line = OrderLine {
        distributor: lenient_int(&fields[F_DISTRIBUTOR]),
        date: fields[F_DATE].trim().to_string(),
        order: OrderId::new(lenient_int(&fields[F_ORDER])),
        description: format!(
            "{}, {}, {}",
            fields[F_DESCRIPTION].trim(),
            fields[F_BRAND].trim(),
            fields[F_PACK_SIZE].trim()
        ),
        total: lenient_int(&fields[F_CASE_COUNT]),
        price: lenient_float(&fields[F_EXTENDED_PRICE]),
    };

    Some((product, line))
}

fn lenient_int(field: &str) -> i64 {
    field.trim().parse().unwrap_or(0)
}

fn lenient_float(field: &str) -> f64 {
    field.trim().parse().unwrap_or(0.0)
}
