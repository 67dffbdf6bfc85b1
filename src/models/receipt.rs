use std::fmt;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{parse_decimal, parse_quantity, SkipReason, SkippedReceipt};
use crate::normalize::{normalize_brand, NormalizedKeys};

/// Stable receipt line identity: `<receipt name>#<row>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub String);

impl ReceiptId {
    pub fn new(receipt: &str, index: usize) -> Self {
        Self(format!("{receipt}#{index}"))
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numeric receipt cell: JSON clients may send `9000` or `"9,000"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumericCell {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match NumericCell::deserialize(deserializer)? {
        NumericCell::Text(s) => s,
        NumericCell::Integer(n) => n.to_string(),
        NumericCell::Decimal(n) => n.to_string(),
    })
}

/// A receipt row as produced by the OCR/LLM collaborator
/// (품명,색상,사이즈,단가,수량,금액,미송여부). Fields stay textual until
/// converted into a [`ReceiptLine`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    #[serde(rename = "품명", alias = "product", default)]
    pub product: String,
    #[serde(rename = "색상", alias = "color", default)]
    pub color: String,
    #[serde(rename = "사이즈", alias = "size", default)]
    pub size: String,
    #[serde(rename = "단가", alias = "unit_price", default, deserialize_with = "text_or_number")]
    pub unit_price: String,
    #[serde(rename = "수량", alias = "quantity", default, deserialize_with = "text_or_number")]
    pub quantity: String,
    #[serde(rename = "금액", alias = "amount", default, deserialize_with = "text_or_number")]
    pub amount: String,
    #[serde(rename = "미송여부", alias = "not_sent", default)]
    pub not_sent: String,
}

/// All records read from one receipt file; `name` is the file stem.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceiptSource {
    pub name: String,
    #[serde(default)]
    pub records: Vec<ReceiptRecord>,
}

/// One line item of a supplier receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptLine {
    pub id: ReceiptId,
    /// Load order across all receipts.
    pub seq: usize,
    pub receipt: String,
    pub brand: String,
    pub product: String,
    pub color: String,
    pub size: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
    pub amount: BigDecimal,
    pub not_sent: bool,
    /// Ordered quantity credited by matched order lines so far.
    pub found_count: u64,
    pub normalized: NormalizedKeys,
}

impl ReceiptLine {
    pub fn is_matched(&self) -> bool {
        self.found_count > 0
    }

    pub fn is_over_consumed(&self) -> bool {
        self.found_count > u64::from(self.quantity)
    }
}

/// "ABC3" -> "ABC": receipts of one supplier are numbered by suffix.
pub fn brand_from_receipt_name(name: &str) -> String {
    name.trim().trim_end_matches(|c: char| c.is_ascii_digit()).to_string()
}

fn convert(source: &ReceiptSource, brand: &str, index: usize, seq: usize) -> ReceiptLine {
    let record = &source.records[index];
    let id = ReceiptId::new(&source.name, index);

    let quantity = parse_quantity(&record.quantity).unwrap_or_else(|| {
        tracing::warn!("{}: unreadable quantity '{}', using 0", id, record.quantity);
        0
    });
    let unit_price = parse_decimal(&record.unit_price).unwrap_or_else(|| {
        tracing::warn!("{}: unreadable unit price '{}', using 0", id, record.unit_price);
        BigDecimal::zero()
    });
    let amount = parse_decimal(&record.amount).unwrap_or_else(|| {
        tracing::warn!("{}: unreadable amount '{}', using 0", id, record.amount);
        BigDecimal::zero()
    });

    ReceiptLine {
        normalized: NormalizedKeys::derive(brand, &record.product, &record.color, &record.size),
        id,
        seq,
        receipt: source.name.clone(),
        brand: brand.to_string(),
        product: record.product.clone(),
        color: record.color.clone(),
        size: record.size.clone(),
        unit_price,
        quantity,
        amount,
        not_sent: record.not_sent.trim().eq_ignore_ascii_case("Y"),
        found_count: 0,
    }
}

/// Flatten receipt sources into receipt lines in source order.
///
/// Sources whose name has no brand left after stripping the numeric suffix,
/// or that carry no records, are skipped and reported.
pub fn build_receipt_lines(sources: &[ReceiptSource]) -> (Vec<ReceiptLine>, Vec<SkippedReceipt>) {
    let mut lines = Vec::new();
    let mut skipped = Vec::new();

    for source in sources {
        let brand = normalize_brand(&brand_from_receipt_name(&source.name));
        if brand.is_empty() {
            tracing::warn!("Receipt '{}' has no brand name, skipping", source.name);
            skipped.push(SkippedReceipt::new(&source.name, SkipReason::MalformedName));
            continue;
        }
        if source.records.is_empty() {
            tracing::warn!("Receipt '{}' has no records, skipping", source.name);
            skipped.push(SkippedReceipt::new(&source.name, SkipReason::Empty));
            continue;
        }

        for index in 0..source.records.len() {
            let seq = lines.len();
            lines.push(convert(source, &brand, index, seq));
        }
        tracing::info!("Receipt '{}' loaded: brand {}, {} lines", source.name, brand, source.records.len());
    }

    (lines, skipped)
}
