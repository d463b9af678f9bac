//! Barcode codec.

use serde::{Deserialize, Serialize};

use ordertally_core::ProductId;

/// Byte window of the raw scan holding the product id (characters 6..=12).
const PRODUCT_WINDOW: core::ops::Range<usize> = 6..13;

/// Number of trailing characters holding the unit sequence number.
const UNIT_SUFFIX_LEN: usize = 2;

/// A decoded scan: which product, and which physical unit of it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barcode {
    pub product: ProductId,
    pub unit: u32,
}

/// Decode a raw scan string.
///
/// The product id is read from a fixed character window and must parse as an
/// integer, otherwise the whole decode fails. The unit number is read from
/// the last two characters and falls back to 0 when non-numeric; that
/// sub-extraction never fails a scan on its own.
pub fn decode(raw: &str) -> Option<Barcode> {
    let product = raw
        .get(PRODUCT_WINDOW)?
        .trim()
        .parse::<i64>()
        .map(ProductId::new)
        .ok()?;

    let unit = raw
        .get(raw.len().saturating_sub(UNIT_SUFFIX_LEN)..)
        .and_then(|tail| tail.parse::<u32>().ok())
        .unwrap_or(0);

    Some(Barcode { product, unit })
}

/// Display form of a decoded scan, for logs and labels.
///
/// Not guaranteed to reconstruct the original raw scan byte-for-byte.
pub fn encode(barcode: &Barcode) -> String {
    format!("{} #{}", barcode.product, barcode.unit)
}
