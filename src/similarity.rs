//! Jamo-aware weighted edit distance between normalized product names.
//!
//! Hangul syllables are split into their initial, vowel and optional final
//! jamo before comparison, so a changed final consonant costs one jamo edit
//! rather than a whole-syllable substitution.

use serde::{Deserialize, Serialize};

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const VOWEL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ',
    'ㅍ', 'ㅎ',
];

const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ', 'ㅟ',
    'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

// Index 0 of the final-consonant slot means "no final"; this table starts at 1.
const FINALS: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ', 'ㅁ', 'ㅂ',
    'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Per-operation edit costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditCosts {
    pub delete: f64,
    pub insert: f64,
    pub substitute: f64,
}

impl EditCosts {
    /// Plain Levenshtein costs.
    pub const UNIT: Self = Self {
        delete: 1.0,
        insert: 1.0,
        substitute: 1.0,
    };

    /// Costs used for similarity ratios: insertions and deletions are half
    /// the price of a substitution.
    pub const RATIO: Self = Self {
        delete: 0.5,
        insert: 0.5,
        substitute: 1.0,
    };

    pub fn max(&self) -> f64 {
        self.delete.max(self.insert).max(self.substitute)
    }
}

impl Default for EditCosts {
    fn default() -> Self {
        Self::UNIT
    }
}

fn push_jamo(c: char, out: &mut Vec<char>) {
    let code = c as u32;
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        out.push(c);
        return;
    }
    let index = code - SYLLABLE_BASE;
    let initial = index / (VOWEL_COUNT * FINAL_COUNT);
    let vowel = (index % (VOWEL_COUNT * FINAL_COUNT)) / FINAL_COUNT;
    let last = index % FINAL_COUNT;

    out.push(INITIALS[initial as usize]);
    out.push(VOWELS[vowel as usize]);
    if last != 0 {
        out.push(FINALS[last as usize - 1]);
    }
}

fn jamo_chars(s: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(s.len());
    for c in s.chars() {
        push_jamo(c, &mut out);
    }
    out
}

/// Split every Hangul syllable into compatibility jamo; other characters
/// pass through unchanged.
pub fn decompose_jamo(s: &str) -> String {
    jamo_chars(s).into_iter().collect()
}

fn edit_distance(a: &[char], b: &[char], costs: &EditCosts) -> f64 {
    if a.is_empty() {
        return b.len() as f64 * costs.insert;
    }
    if b.is_empty() {
        return a.len() as f64 * costs.delete;
    }

    let mut prev: Vec<f64> = (0..=b.len()).map(|j| j as f64 * costs.insert).collect();
    let mut curr = vec![0.0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = (i + 1) as f64 * costs.delete;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                (prev[j + 1] + costs.delete)
                    .min(curr[j] + costs.insert)
                    .min(prev[j] + costs.substitute)
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Weighted edit distance between the jamo decompositions of `a` and `b`.
pub fn weighted_levenshtein_distance(a: &str, b: &str, costs: &EditCosts) -> f64 {
    edit_distance(&jamo_chars(a), &jamo_chars(b), costs)
}

/// Similarity in [0, 1]: `1 - distance / (max_len * max_cost)`, lengths
/// measured in jamo. Two empty strings are identical.
pub fn weighted_levenshtein_ratio(a: &str, b: &str, costs: &EditCosts) -> f64 {
    let a = jamo_chars(a);
    let b = jamo_chars(b);
    let max_len = a.len().max(b.len());
    let max_cost = costs.max();
    if max_len == 0 || max_cost <= 0.0 {
        return 1.0;
    }

    let distance = edit_distance(&a, &b, costs);
    (1.0 - distance / (max_len as f64 * max_cost)).clamp(0.0, 1.0)
}
