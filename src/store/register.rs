use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ReconError, Result};
use crate::models::{parse_quantity, OrderLine};

pub const BRAND: &str = "브랜드";
pub const PRODUCT: &str = "상품명";
pub const COLOR: &str = "색상";
pub const SIZE: &str = "사이즈";
pub const QUANTITY: &str = "수량";

pub const MATCHED: &str = "매칭여부";
pub const NOT_SENT: &str = "미송여부";
pub const NOR_PRODUCT: &str = "Nor상품명";
pub const NOR_COLOR: &str = "Nor색상";
pub const NOR_SIZE: &str = "Nor사이즈";
pub const MATCH_ID: &str = "매치ID";

const REQUIRED: [&str; 5] = [BRAND, PRODUCT, COLOR, SIZE, QUANTITY];

/// Column positions of the register, resolved once at load time. Expected
/// columns missing from the file are appended to the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterSchema {
    headers: Vec<String>,
    added: Vec<String>,
    pub brand: usize,
    pub product: usize,
    pub color: usize,
    pub size: usize,
    pub quantity: usize,
    pub matched: usize,
    pub not_sent: usize,
    pub nor_product: usize,
    pub nor_color: usize,
    pub nor_size: usize,
    pub match_id: usize,
}

struct SchemaBuilder {
    headers: Vec<String>,
    added: Vec<String>,
}

impl SchemaBuilder {
    fn find_or_add(&mut self, name: &str) -> usize {
        if let Some(idx) = self.headers.iter().position(|h| h == name) {
            return idx;
        }
        self.headers.push(name.to_string());
        self.added.push(name.to_string());
        self.headers.len() - 1
    }
}

impl RegisterSchema {
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut b = SchemaBuilder {
            headers: headers
                .into_iter()
                .map(|h| h.as_ref().trim().nfc().collect())
                .collect(),
            added: Vec::new(),
        };

        let schema = Self {
            brand: b.find_or_add(BRAND),
            product: b.find_or_add(PRODUCT),
            color: b.find_or_add(COLOR),
            size: b.find_or_add(SIZE),
            quantity: b.find_or_add(QUANTITY),
            matched: b.find_or_add(MATCHED),
            not_sent: b.find_or_add(NOT_SENT),
            nor_product: b.find_or_add(NOR_PRODUCT),
            nor_color: b.find_or_add(NOR_COLOR),
            nor_size: b.find_or_add(NOR_SIZE),
            match_id: b.find_or_add(MATCH_ID),
            headers: b.headers,
            added: b.added,
        };

        for column in &schema.added {
            if REQUIRED.contains(&column.as_str()) {
                tracing::warn!("Register has no '{}' column, added empty", column);
            } else {
                tracing::info!("Register column '{}' added", column);
            }
        }
        schema
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Columns appended because the register lacked them.
    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

/// The purchase-order register: every original cell is kept and written
/// back, only the extension columns change.
#[derive(Debug, Clone)]
pub struct Register {
    schema: RegisterSchema,
    rows: Vec<Vec<String>>,
}

pub fn load_register(path: &Path) -> Result<Register> {
    let file = File::open(path).map_err(|e| ReconError::io(path, e))?;
    let register = Register::from_reader(file).map_err(|e| ReconError::csv(path, e))?;
    tracing::info!("Loaded register: {} ({} rows)", path.display(), register.rows.len());
    Ok(register)
}

impl Register {
    pub fn from_reader<R: io::Read>(reader: R) -> csv::Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let schema = RegisterSchema::from_headers(rdr.headers()?.iter());
        let width = schema.width();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let mut row: Vec<String> = record?.iter().map(str::to_string).collect();
            if row.len() < width {
                row.resize(width, String::new());
            }
            rows.push(row);
        }

        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &RegisterSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn order_lines(&self) -> Vec<OrderLine> {
        let s = &self.schema;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let raw_qty = &cells[s.quantity];
                let quantity = parse_quantity(raw_qty).unwrap_or_else(|| {
                    tracing::warn!("Register row {}: unreadable quantity '{}', using 0", row + 2, raw_qty);
                    0
                });
                OrderLine::new(
                    row,
                    cells[s.brand].as_str(),
                    cells[s.product].as_str(),
                    cells[s.color].as_str(),
                    cells[s.size].as_str(),
                    quantity,
                )
            })
            .collect()
    }

    /// Write match results into the extension columns. The not-sent cell is
    /// only touched on matched rows.
    pub fn annotate(&mut self, orders: &[OrderLine]) {
        let s = self.schema.clone();
        for order in orders {
            let Some(cells) = self.rows.get_mut(order.row) else {
                tracing::warn!("Order line for unknown register row {}", order.row);
                continue;
            };
            cells[s.matched] = order.matched.to_string();
            if order.matched {
                cells[s.not_sent] = order.not_sent.to_string();
            }
            cells[s.nor_product] = order.normalized.product.clone();
            cells[s.nor_color] = order.normalized.color.clone();
            cells[s.nor_size] = order.normalized.size.clone();
            cells[s.match_id] = order
                .matched_receipt_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
        }
    }

    pub fn write_to<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(&self.schema.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| ReconError::io(path, e))?;
        self.write_to(file).map_err(|e| ReconError::csv(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReceiptId;

    const REGISTER: &str = "\
브랜드,상품명,색상,사이즈,수량,비고
ABC,23SS맨투맨,블랙,L,2,첫줄
ABC,기모PT,회색,M,x,
";

    #[test]
    fn schema_appends_missing_columns_in_order() {
        let schema = RegisterSchema::from_headers(["브랜드", "상품명", "색상", "사이즈", "수량", "비고"]);
        assert_eq!(
            schema.added(),
            &[MATCHED, NOT_SENT, NOR_PRODUCT, NOR_COLOR, NOR_SIZE, MATCH_ID]
        );
        assert_eq!(schema.matched, 6);
        assert_eq!(schema.match_id, 11);
        assert_eq!(schema.width(), 12);
    }

    #[test]
    fn schema_reuses_existing_columns() {
        let schema = RegisterSchema::from_headers([" 수량", "매칭여부", "브랜드"]);
        assert_eq!(schema.quantity, 0);
        assert_eq!(schema.matched, 1);
        assert_eq!(schema.brand, 2);
        assert!(!schema.added().iter().any(|c| c == MATCHED));
        assert!(schema.added().iter().any(|c| c == PRODUCT));
    }

    #[test]
    fn reads_order_lines() {
        let register = Register::from_reader(REGISTER.as_bytes()).unwrap();
        let lines = register.order_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].normalized.product, "맨투맨");
        assert_eq!(lines[1].row, 1);
        assert_eq!(lines[1].quantity, 0);
        assert_eq!(register.rows()[0].len(), 12);
    }

    #[test]
    fn annotate_and_write_back() {
        let mut register = Register::from_reader(REGISTER.as_bytes()).unwrap();
        let mut lines = register.order_lines();
        lines[0].matched = true;
        lines[0].not_sent = true;
        lines[0].matched_receipt_id = Some(ReceiptId("ABC1#0".into()));
        register.annotate(&lines);

        let mut out = Vec::new();
        register.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut it = text.lines();
        assert_eq!(
            it.next(),
            Some("브랜드,상품명,색상,사이즈,수량,비고,매칭여부,미송여부,Nor상품명,Nor색상,Nor사이즈,매치ID")
        );
        assert_eq!(it.next(), Some("ABC,23SS맨투맨,블랙,L,2,첫줄,true,true,맨투맨,블랙,L,ABC1#0"));
        assert_eq!(it.next(), Some("ABC,기모PT,회색,M,x,,false,,기모팬츠,그레이,M,"));
    }
}
