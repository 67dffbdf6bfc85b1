use serde::{Deserialize, Serialize};

use crate::models::ReceiptId;
use crate::normalize::{normalize_size_value, NormalizedKeys, SizeValue};

/// One row of the purchase-order register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    /// Zero-based data row in the register.
    pub row: usize,
    pub brand: String,
    pub product: String,
    pub color: String,
    pub size: String,
    pub quantity: u32,
    pub matched: bool,
    pub matched_receipt_id: Option<ReceiptId>,
    /// Copied from the matched receipt line (back-ordered).
    pub not_sent: bool,
    pub normalized: NormalizedKeys,
}

impl OrderLine {
    pub fn new(
        row: usize,
        brand: impl Into<String>,
        product: impl Into<String>,
        color: impl Into<String>,
        size: impl Into<String>,
        quantity: u32,
    ) -> Self {
        let (brand, product, color, size) = (brand.into(), product.into(), color.into(), size.into());
        let normalized = NormalizedKeys::derive(&brand, &product, &color, &size);
        Self {
            row,
            brand,
            product,
            color,
            size,
            quantity,
            matched: false,
            matched_receipt_id: None,
            not_sent: false,
            normalized,
        }
    }
}

/// Register row as submitted over the API.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub brand: String,
    pub product: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub size: Option<SizeValue>,
    #[serde(default)]
    pub quantity: u32,
}

impl OrderInput {
    pub fn into_order_line(self, row: usize) -> OrderLine {
        let mut line = OrderLine::new(row, self.brand, self.product, self.color, "", self.quantity);
        if let Some(size) = &self.size {
            line.size = size.to_string();
        }
        line.normalized.size = normalize_size_value(self.size.as_ref());
        line
    }
}

/// Per-line result returned over the API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderOutcome {
    pub row: usize,
    pub matched: bool,
    pub matched_receipt_id: Option<ReceiptId>,
    pub not_sent: bool,
    pub normalized: NormalizedKeys,
}

impl From<&OrderLine> for OrderOutcome {
    fn from(line: &OrderLine) -> Self {
        Self {
            row: line.row,
            matched: line.matched,
            matched_receipt_id: line.matched_receipt_id.clone(),
            not_sent: line.not_sent,
            normalized: line.normalized.clone(),
        }
    }
}
