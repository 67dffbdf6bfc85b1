//! Canonical comparison keys for brand, product, color and size fields.
//!
//! Every normalizer is total and idempotent: feeding its output back in
//! returns the same string.

pub mod dictionary;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use self::dictionary::{
    longest_first, lookup_exact, replace_all, COLOR_EXACT, COLOR_SYNONYMS, PRODUCT_SYNONYMS,
    SIZE_EXACT,
};

static LEADING_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^()]*\)").expect("leading tag pattern"));
static SEASON_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(?:FW|SS|S|F|W)").expect("season code pattern"));
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*\)").expect("parenthetical pattern"));

static PRODUCT_TABLE: LazyLock<Vec<(&'static str, &'static str)>> =
    LazyLock::new(|| longest_first(PRODUCT_SYNONYMS));
static COLOR_TABLE: LazyLock<Vec<(&'static str, &'static str)>> =
    LazyLock::new(|| longest_first(COLOR_SYNONYMS));

fn compose(s: &str) -> String {
    s.nfc().collect()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

fn is_kept(c: &char) -> bool {
    c.is_ascii_alphanumeric() || is_hangul_syllable(*c)
}

/// Uppercase and keep only ASCII alphanumerics and Hangul syllables.
fn clean(s: &str) -> String {
    s.to_uppercase().chars().filter(is_kept).collect()
}

pub fn normalize_brand(raw: &str) -> String {
    compose(raw).trim().to_string()
}

/// e.g. "01.기획)23SS 공룡 MTM" -> "공룡맨투맨"
pub fn normalize_product(raw: &str) -> String {
    let upper = compose(raw).to_uppercase();
    let untagged = LEADING_TAG.replace(&upper, "");
    let cleaned = clean(&untagged);

    let unseasoned = SEASON_CODE.replace(&cleaned, "");
    let name = unseasoned.trim_start_matches(|c: char| c.is_ascii_digit());

    let mut name = replace_all(&PRODUCT_TABLE, name.to_string());
    if name.ends_with('티') {
        name.push_str("셔츠");
    }
    name
}

pub fn normalize_color(raw: &str) -> String {
    let cleaned = clean(&compose(raw));
    match lookup_exact(COLOR_EXACT, &cleaned) {
        Some(exact) => exact.to_string(),
        None => replace_all(&COLOR_TABLE, cleaned),
    }
}

pub fn normalize_size(raw: &str) -> String {
    // Uppercasing may decompose ("ΐ"), so compose again afterwards.
    let compact: String = compose(&compose(raw).to_uppercase())
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    // Innermost groups first, until no "(...)" annotation is left.
    let mut size = compact;
    while PARENTHETICAL.is_match(&size) {
        size = PARENTHETICAL.replace_all(&size, "").into_owned();
    }

    // Removed groups can leave a combining mark next to a new base.
    let size = compose(&size);
    let size = size.trim_end_matches('호');
    lookup_exact(SIZE_EXACT, size)
        .map(str::to_string)
        .unwrap_or_else(|| size.to_string())
}

/// A size cell as it arrives from a register or request: text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SizeValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for SizeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// Absent sizes normalize to "", numbers to their decimal text.
pub fn normalize_size_value(raw: Option<&SizeValue>) -> String {
    match raw {
        None => String::new(),
        Some(value) => normalize_size(&value.to_string()),
    }
}

/// Comparison keys derived once per record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedKeys {
    pub brand: String,
    pub product: String,
    pub color: String,
    pub size: String,
}

impl NormalizedKeys {
    pub fn derive(brand: &str, product: &str, color: &str, size: &str) -> Self {
        Self {
            brand: normalize_brand(brand),
            product: normalize_product(product),
            color: normalize_color(color),
            size: normalize_size(size),
        }
    }
}
