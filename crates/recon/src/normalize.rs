//! Text canonicalization for comparison.
//!
//! Spreadsheet-entered text is mostly halfwidth ASCII; OCR output is mostly
//! fullwidth with stray whitespace. Both are folded to the same form here.

use crate::model::FieldValue;

const ASCII_SPACE: char = '\u{0020}';
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// Distance between a printable ASCII char and its fullwidth form.
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

/// Remove ASCII and ideographic spaces, then widen printable ASCII
/// (`!`..=`~`) to the fullwidth block. Everything else passes through.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(|&c| c != ASCII_SPACE && c != IDEOGRAPHIC_SPACE)
        .map(to_fullwidth)
        .collect()
}

/// Normalize a record value, coercing numbers to text first.
pub fn normalize_value(value: &FieldValue) -> String {
    normalize(&value.comparable_text())
}

fn to_fullwidth(c: char) -> char {
    let code = c as u32;
    if (0x21..=0x7E).contains(&code) {
        // 0xFF01..=0xFF5E are all assigned scalar values
        char::from_u32(code + FULLWIDTH_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widens_ascii() {
        assert_eq!(normalize("101"), "１０１");
        assert_eq!(normalize("AbZ"), "ＡｂＺ");
        assert_eq!(normalize("!~"), "！～");
    }

    #[test]
    fn strips_both_space_kinds() {
        assert_eq!(normalize("A B\u{3000}C"), normalize("ABC"));
        assert_eq!(normalize("山田 工務店\u{3000}"), "山田工務店");
    }

    #[test]
    fn leaves_other_text_alone() {
        assert_eq!(normalize("サンビル"), "サンビル");
        assert_eq!(normalize("１０１"), "１０１");
        // tab and newline are below 0x21 and are not spaces we strip
        assert_eq!(normalize("a\tb"), "ａ\tｂ");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \u{3000}"), "");
        assert_eq!(normalize_value(&FieldValue::Empty), "");
    }

    #[test]
    fn numbers_are_coerced_before_widening() {
        assert_eq!(normalize_value(&FieldValue::from(50000)), "５００００");
        assert_eq!(normalize_value(&FieldValue::from("50000")), "５００００");
    }

    #[test]
    fn idempotent_on_mixed_text() {
        let once = normalize("ﾊﾟｰｸ Hills 3F-201");
        assert_eq!(normalize(&once), once);
    }
}
