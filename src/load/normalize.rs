//! Cell-level normalization shared by loading and rendering.

/// Tokens meaning "no value" (compared trimmed and lowercase).
const PLACEHOLDERS: &[&str] = &["", "nan", "k.a.", "k.a", "ka", "n/a", "n.a.", "none"];

/// Whether a cell value means "no value": blank, `k.A.`, `n/a`, `none` and the like.
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    PLACEHOLDERS.contains(&value.as_str())
}

/// Parse a number that may use a comma as decimal separator.
/// Only finite results are returned.
pub fn parse_decimal(value: &str) -> Option<f64> {
    value.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Normalize a measure cell: missing, placeholder, malformed, negative or
/// non-finite input becomes `0.0`. Never fails.
pub fn to_number(value: Option<&str>) -> f64 {
    match value {
        Some(s) if !is_placeholder(s) => parse_decimal(s).filter(|v| *v > 0.0).unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_decimals_agree() {
        assert_eq!(to_number(Some("1,5")), 1.5);
        assert_eq!(to_number(Some("1.5")), 1.5);
        assert_eq!(to_number(Some(" 12,25 ")), 12.25);
        assert_eq!(to_number(Some("3")), 3.0);
    }

    #[test]
    fn malformed_values_are_zero() {
        for raw in ["", "   ", "k.A.", "K.A", "ka", "n/a", "N.A.", "none", "None", "nan", "abc", "1,2,3", "inf", "-NaN"] {
            assert_eq!(to_number(Some(raw)), 0.0, "input {raw:?}");
        }
        assert_eq!(to_number(None), 0.0);
    }

    #[test]
    fn negative_values_are_zero() {
        assert_eq!(to_number(Some("-4,5")), 0.0);
        assert_eq!(to_number(Some("-0")), 0.0);
        assert!(to_number(Some("-0")).is_sign_positive());
    }

    #[test]
    fn placeholders_ignore_case_and_padding() {
        assert!(is_placeholder(" K.A. "));
        assert!(is_placeholder("NONE"));
        assert!(!is_placeholder("München"));
        assert!(!is_placeholder("0"));
    }

    #[test]
    fn coordinates_keep_their_sign() {
        assert_eq!(parse_decimal("-3,25"), Some(-3.25));
        assert_eq!(parse_decimal("x"), None);
    }
}
