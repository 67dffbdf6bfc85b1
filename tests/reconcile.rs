use std::fs;
use std::path::Path;

use apparel_recon::{MatchingConfig, ReconError, Reconciler};
use tempfile::TempDir;

const REGISTER: &str = "\
브랜드,상품명,색상,사이즈,수량
ABC,23SS맨투맨,블랙,L,3
ABC,맨투맨,블랙,L,4
XYZ,기모PT,회색,M,1
NOPE,후드,,,1
";

fn write(path: &Path, contents: &str) {
    fs::write(path, contents).unwrap();
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let receipts = dir.path().join("receipts");
    fs::create_dir(&receipts).unwrap();

    write(&dir.path().join("register.csv"), REGISTER);
    write(
        &receipts.join("ABC1.csv"),
        "품명,색상,사이즈,단가,수량,금액,미송여부\n맨투맨,검정,L,\"12,000\",5,\"60,000\",N\n자켓,,,,1,,N\n",
    );
    write(
        &receipts.join("XYZ.csv"),
        "품명,색상,사이즈,단가,수량,금액,미송여부\n기모팬츠,회,M,9000,2,18000,Y\n",
    );
    write(&receipts.join("7.csv"), "품명,수량\n티셔츠,1\n");
    write(&receipts.join("notes.txt"), "not a receipt");
    dir
}

#[test]
fn run_files_writes_annotated_register_and_receipt_export() {
    let dir = workspace();
    let register = dir.path().join("register.csv");
    let output = Reconciler::new(MatchingConfig::default())
        .run_files(&dir.path().join("receipts"), &register)
        .unwrap();

    assert_eq!(output.register_path, dir.path().join("register_matched.csv"));
    assert_eq!(output.receipt_path, dir.path().join("register_receipt.csv"));

    let report = &output.report;
    assert_eq!(report.total_orders, 4);
    assert_eq!(report.matched_orders, 3);
    assert_eq!(report.total_receipts, 3);
    assert_eq!(report.matched_receipts, 2);
    assert_eq!(report.unmatched_receipts, 1);
    assert_eq!(report.skipped_receipts.len(), 1);
    assert_eq!(report.skipped_receipts[0].receipt, "7");

    // the second ABC order pushes the shared receipt line past its quantity
    assert_eq!(report.over_consumed.len(), 1);
    assert_eq!(report.over_consumed[0].order_row, 1);
    assert_eq!(report.over_consumed[0].found_after(), 7);

    let annotated = fs::read_to_string(&output.register_path).unwrap();
    let lines: Vec<&str> = annotated.lines().collect();
    assert_eq!(
        lines[0],
        "브랜드,상품명,색상,사이즈,수량,매칭여부,미송여부,Nor상품명,Nor색상,Nor사이즈,매치ID"
    );
    assert_eq!(lines[1], "ABC,23SS맨투맨,블랙,L,3,true,false,맨투맨,블랙,L,ABC1#0");
    assert_eq!(lines[2], "ABC,맨투맨,블랙,L,4,true,false,맨투맨,블랙,L,ABC1#0");
    assert_eq!(lines[3], "XYZ,기모PT,회색,M,1,true,true,기모팬츠,그레이,M,XYZ#0");
    assert_eq!(lines[4], "NOPE,후드,,,1,false,,후드,,,");

    let export = fs::read_to_string(&output.receipt_path).unwrap();
    let rows: Vec<&str> = export.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("ABC,ABC1,맨투맨,검정,L,12000,5,60000,N,"));
    assert!(rows[1].ends_with(",7,true,ABC1#0"));
    assert!(rows[2].ends_with(",1,true,XYZ#0"));
    assert!(rows[3].ends_with(",0,false,ABC1#1"));
}

#[test]
fn missing_register_writes_nothing() {
    let dir = workspace();
    let register = dir.path().join("absent.csv");
    let err = Reconciler::new(MatchingConfig::default())
        .run_files(&dir.path().join("receipts"), &register)
        .unwrap_err();

    assert!(matches!(err, ReconError::Io { .. }));
    assert!(!dir.path().join("absent_matched.csv").exists());
    assert!(!dir.path().join("absent_receipt.csv").exists());
}

#[test]
fn missing_receipt_dir_is_an_error() {
    let dir = workspace();
    let err = Reconciler::new(MatchingConfig::default())
        .run_files(&dir.path().join("nowhere"), &dir.path().join("register.csv"))
        .unwrap_err();
    assert!(matches!(err, ReconError::Io { .. }));
}
