//! CSV persistence: the purchase-order register, receipt files and the
//! consolidated receipt export.

pub mod export;
pub mod receipts;
pub mod register;

pub use export::{suffixed_path, write_receipt_export, write_receipt_rows};
pub use receipts::{load_receipt_dir, load_receipt_file, read_receipt_records};
pub use register::{load_register, Register, RegisterSchema};
