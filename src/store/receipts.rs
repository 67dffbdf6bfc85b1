use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ReconError, Result};
use crate::models::{ReceiptRecord, ReceiptSource};

/// Column headers of a receipt CSV, in canonical export order.
pub const RECEIPT_HEADERS: [&str; 7] = ["품명", "색상", "사이즈", "단가", "수량", "금액", "미송여부"];

/// Position of each receipt column; missing columns read as blank.
struct ReceiptColumns([Option<usize>; 7]);

impl ReceiptColumns {
    fn from_headers(headers: &StringRecord) -> Self {
        let names: Vec<String> = headers.iter().map(|h| h.trim().nfc().collect()).collect();
        let mut positions = [None; 7];
        for (slot, expected) in positions.iter_mut().zip(RECEIPT_HEADERS) {
            *slot = names.iter().position(|n| n == expected);
        }
        Self(positions)
    }

    fn record(&self, row: &StringRecord) -> ReceiptRecord {
        let cell = |i: usize| {
            self.0[i]
                .and_then(|pos| row.get(pos))
                .unwrap_or_default()
                .to_string()
        };
        ReceiptRecord {
            product: cell(0),
            color: cell(1),
            size: cell(2),
            unit_price: cell(3),
            quantity: cell(4),
            amount: cell(5),
            not_sent: cell(6),
        }
    }
}

pub fn read_receipt_records<R: io::Read>(reader: R) -> csv::Result<Vec<ReceiptRecord>> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns = ReceiptColumns::from_headers(rdr.headers()?);

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(columns.record(&row));
    }
    Ok(records)
}

/// Read one receipt file; its file stem is the receipt name.
pub fn load_receipt_file(path: &Path) -> Result<ReceiptSource> {
    let name: String = path
        .file_stem()
        .map(|s| s.to_string_lossy().nfc().collect())
        .unwrap_or_default();
    tracing::info!("Loading receipt file: {}", path.display());

    let file = File::open(path).map_err(|e| ReconError::io(path, e))?;
    let records = read_receipt_records(file).map_err(|e| ReconError::csv(path, e))?;
    Ok(ReceiptSource { name, records })
}

fn is_csv(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

/// Every `*.csv` in `dir`, ordered by file name.
pub fn load_receipt_dir(dir: &Path) -> Result<Vec<ReceiptSource>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| ReconError::io(dir, e))? {
        let path = entry.map_err(|e| ReconError::io(dir, e))?.path();
        if is_csv(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    tracing::info!("Found {} receipt files in {}", paths.len(), dir.display());
    paths.iter().map(|p| load_receipt_file(p)).collect()
}
