use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::error::{ReconError, Result};
use crate::models::ReceiptLine;
use crate::service::Reconciliation;

pub const EXPORT_HEADERS: [&str; 15] = [
    "브랜드",
    "영수증",
    "품명",
    "색상",
    "사이즈",
    "단가",
    "수량",
    "금액",
    "미송여부",
    "Nor상품명",
    "Nor색상",
    "Nor사이즈",
    "매칭수량",
    "매칭여부",
    "ID",
];

/// `dir/name.csv` + `_matched` -> `dir/name_matched.csv`.
pub fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    path.with_file_name(name)
}

fn receipt_row(line: &ReceiptLine) -> [String; 15] {
    [
        line.brand.clone(),
        line.receipt.clone(),
        line.product.clone(),
        line.color.clone(),
        line.size.clone(),
        line.unit_price.to_string(),
        line.quantity.to_string(),
        line.amount.to_string(),
        if line.not_sent { "Y" } else { "N" }.to_string(),
        line.normalized.product.clone(),
        line.normalized.color.clone(),
        line.normalized.size.clone(),
        line.found_count.to_string(),
        line.is_matched().to_string(),
        line.id.to_string(),
    ]
}

pub fn write_receipt_rows<'a, W, I>(writer: W, lines: I) -> csv::Result<()>
where
    W: io::Write,
    I: IntoIterator<Item = &'a ReceiptLine>,
{
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;
    for line in lines {
        wtr.write_record(receipt_row(line))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Consolidated receipt sheet: matched lines first, then unmatched.
pub fn write_receipt_export(path: &Path, reconciliation: &Reconciliation) -> Result<()> {
    let file = File::create(path).map_err(|e| ReconError::io(path, e))?;
    let lines = reconciliation
        .matched_receipts()
        .chain(reconciliation.unmatched_receipts());
    write_receipt_rows(file, lines).map_err(|e| ReconError::csv(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchingConfig;
    use crate::models::{OrderLine, ReceiptRecord, ReceiptSource};
    use crate::service::Reconciler;

    #[test]
    fn suffix_goes_before_extension() {
        assert_eq!(
            suffixed_path(Path::new("/data/발주.csv"), "_matched"),
            PathBuf::from("/data/발주_matched.csv")
        );
        assert_eq!(
            suffixed_path(Path::new("register"), "_receipt"),
            PathBuf::from("register_receipt")
        );
    }

    #[test]
    fn export_lists_matched_first() {
        let orders = vec![OrderLine::new(0, "ABC", "맨투맨", "블랙", "L", 2)];
        let sources = vec![ReceiptSource {
            name: "ABC".into(),
            records: vec![
                ReceiptRecord {
                    product: "후드".into(),
                    quantity: "1".into(),
                    ..Default::default()
                },
                ReceiptRecord {
                    product: "맨투맨".into(),
                    color: "검정".into(),
                    size: "L".into(),
                    unit_price: "12,000".into(),
                    quantity: "3".into(),
                    amount: "36000".into(),
                    not_sent: "Y".into(),
                },
            ],
        }];
        let rec = Reconciler::new(MatchingConfig::default()).reconcile(orders, &sources);

        let mut out = Vec::new();
        write_receipt_rows(&mut out, rec.matched_receipts().chain(rec.unmatched_receipts())).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], EXPORT_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "ABC,ABC,맨투맨,검정,L,12000,3,36000,Y,맨투맨,블랙,L,2,true,ABC#1"
        );
        assert!(lines[2].starts_with("ABC,ABC,후드,"));
        assert!(lines[2].ends_with(",0,false,ABC#0"));
    }
}
