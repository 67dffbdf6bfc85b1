//! Replacement tables used by the normalizers.
//!
//! Substring tables are applied longest key first; exact tables only fire
//! when the key is the whole value. Replacement values never contain a key
//! of the same table, which keeps the normalizers idempotent.

/// Product suffix synonyms (catalog abbreviations to Korean item names).
pub const PRODUCT_SYNONYMS: &[(&str, &str)] = &[
    ("MTM", "맨투맨"),
    ("TEE", "티셔츠"),
    ("PT", "팬츠"),
    ("JP", "점퍼"),
    ("JK", "자켓"),
    ("T", "티셔츠"),
    ("P", "팬츠"),
];

/// Whole-value color abbreviations. Single syllables like "회" are only
/// rewritten when they are the entire value.
pub const COLOR_EXACT: &[(&str, &str)] = &[
    ("아이", "아이보리"),
    ("회", "그레이"),
    ("검", "블랙"),
    ("흰", "화이트"),
    ("곤", "네이비"),
    ("베", "베이지"),
    ("먹", "차콜"),
];

pub const COLOR_SYNONYMS: &[(&str, &str)] = &[
    ("검정색", "블랙"),
    ("검은색", "블랙"),
    ("검정", "블랙"),
    ("블렉", "블랙"),
    ("흰색", "화이트"),
    ("하얀색", "화이트"),
    ("연회색", "라이트그레이"),
    ("진회색", "다크그레이"),
    ("회색", "그레이"),
    ("곤색", "네이비"),
    ("남색", "네이비"),
    ("베이지색", "베이지"),
    ("아이보리색", "아이보리"),
    ("먹색", "차콜"),
    ("챠콜", "차콜"),
    ("BLACK", "블랙"),
    ("WHITE", "화이트"),
    ("GREY", "그레이"),
    ("GRAY", "그레이"),
    ("NAVY", "네이비"),
    ("IVORY", "아이보리"),
    ("BEIGE", "베이지"),
];

/// Whole-value size aliases for free-size items.
pub const SIZE_EXACT: &[(&str, &str)] = &[
    ("ONESIZE", "ONE"),
    ("SET", "ONE"),
    ("FREE", "ONE"),
    ("F", "ONE"),
    ("프리", "ONE"),
    ("원사이즈", "ONE"),
];

/// Sort substring table keys longest first so a short key never pre-empts a
/// longer, more specific one. Equal lengths keep table order.
pub fn longest_first(table: &'static [(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
    let mut sorted = table.to_vec();
    sorted.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    sorted
}

pub fn lookup_exact(table: &[(&str, &'static str)], value: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, replacement)| *replacement)
}

pub fn replace_all(table: &[(&str, &str)], value: String) -> String {
    table.iter().fold(value, |acc, (key, replacement)| {
        if acc.contains(key) {
            acc.replace(key, replacement)
        } else {
            acc
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_key_sorted_first() {
        let sorted = longest_first(PRODUCT_SYNONYMS);
        assert_eq!(sorted[0].0, "MTM");
        assert_eq!(sorted.last().map(|e| e.0), Some("P"));
        let colors = longest_first(COLOR_SYNONYMS);
        let pos = |k: &str| colors.iter().position(|e| e.0 == k).unwrap();
        assert!(pos("연회색") < pos("회색"));
        assert!(pos("검정색") < pos("검정"));
    }

    #[test]
    fn replacements_never_reintroduce_keys() {
        for table in [PRODUCT_SYNONYMS, COLOR_SYNONYMS] {
            for (_, value) in table {
                for (key, _) in table {
                    assert!(!value.contains(key), "{value} contains {key}");
                }
            }
        }
        for table in [COLOR_EXACT, SIZE_EXACT] {
            for (_, value) in table {
                assert!(lookup_exact(table, value).is_none());
            }
        }
    }
}
