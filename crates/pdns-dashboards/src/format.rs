// Numan Thabit 2025
use crate::error::DashboardError;

/// Maximum number of targets a single graph can carry (`A` through `Z`).
pub const MAX_TARGETS: usize = 26;

/// Collapse an indented multi-line query into one line.
///
/// Every line is trimmed, the lines are joined with single spaces and the
/// result is trimmed again, so blank leading/trailing lines disappear.
pub fn compact(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Reference letter for the target at `index` within its panel.
pub fn ref_id(index: usize) -> Result<String, DashboardError> {
    if index >= MAX_TARGETS {
        return Err(DashboardError::RefIdOutOfRange { index });
    }
    Ok(char::from(b'A' + index as u8).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_trims_and_joins_lines() {
        assert_eq!(compact("  a(\n    b,\n    c\n  )\n  "), "a( b, c )");
    }

    #[test]
    fn compact_keeps_inner_blank_lines_as_spaces() {
        assert_eq!(compact("a\n\nb"), "a  b");
        assert_eq!(compact("single"), "single");
        assert_eq!(compact(""), "");
    }

    #[test]
    fn ref_ids_follow_the_alphabet() {
        let letters: Vec<String> = (0..MAX_TARGETS).map(|i| ref_id(i).unwrap()).collect();
        assert_eq!(letters.first().map(String::as_str), Some("A"));
        assert_eq!(letters.get(1).map(String::as_str), Some("B"));
        assert_eq!(letters.last().map(String::as_str), Some("Z"));
        assert_eq!(letters.concat(), "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    }

    #[test]
    fn ref_id_rejects_index_past_z() {
        let err = ref_id(26).unwrap_err();
        assert!(matches!(err, DashboardError::RefIdOutOfRange { index: 26 }));
    }
}
