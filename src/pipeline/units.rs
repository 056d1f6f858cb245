//! Pay-unit annualization.
//!
//! Disclosure rows quote prevailing wages per year, hour, week, and so on.
//! Everything downstream works on annual figures, so each wage is multiplied
//! by a fixed per-unit factor. A wage that cannot be parsed, or a unit that
//! is not in the table, yields `None`: absence, never zero.

/// Annualization factor for a pay-period token. Tokens are matched after
/// trimming and lowercasing.
pub fn unit_multiplier(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().as_str() {
        "year" | "yr" => Some(1.0),
        "hour" | "hr" => Some(2080.0),
        "week" | "wk" => Some(52.0),
        "bi-weekly" => Some(26.0),
        "month" => Some(12.0),
        "day" => Some(260.0),
        _ => None,
    }
}

/// Parses a raw wage figure, tolerating `$` and thousands separators.
/// Empty or malformed input is absence, not an error.
pub fn parse_wage(value: &str) -> Option<f64> {
    let cleaned: String = value.replace(['$', ','], "");
    cleaned.trim().parse::<f64>().ok()
}

/// Converts a parsed wage into an annual figure. `None` in, or an
/// unrecognized unit, means `None` out. The result is unrounded; rounding
/// only happens when summaries are emitted.
pub fn annualize(wage: Option<f64>, unit: &str) -> Option<f64> {
    Some(wage? * unit_multiplier(unit)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_multipliers() {
        assert_eq!(unit_multiplier("year"), Some(1.0));
        assert_eq!(unit_multiplier("yr"), Some(1.0));
        assert_eq!(unit_multiplier("hour"), Some(2080.0));
        assert_eq!(unit_multiplier("hr"), Some(2080.0));
        assert_eq!(unit_multiplier("week"), Some(52.0));
        assert_eq!(unit_multiplier("wk"), Some(52.0));
        assert_eq!(unit_multiplier("bi-weekly"), Some(26.0));
        assert_eq!(unit_multiplier("month"), Some(12.0));
        assert_eq!(unit_multiplier("day"), Some(260.0));
    }

    #[test]
    fn test_unit_case_and_whitespace_variants() {
        assert_eq!(unit_multiplier("Year"), Some(1.0));
        assert_eq!(unit_multiplier("  HOUR "), Some(2080.0));
        assert_eq!(unit_multiplier("Bi-Weekly"), Some(26.0));
    }

    #[test]
    fn test_unknown_unit_is_absent_not_zero() {
        assert_eq!(unit_multiplier("fortnight"), None);
        assert_eq!(unit_multiplier(""), None);
        assert_eq!(annualize(Some(50000.0), "fortnight"), None);
        assert_eq!(annualize(Some(50000.0), ""), None);
    }

    #[test]
    fn test_parse_wage_formats() {
        assert_eq!(parse_wage("85000"), Some(85000.0));
        assert_eq!(parse_wage("$85,000.00"), Some(85000.0));
        assert_eq!(parse_wage(" $1,234,567 "), Some(1234567.0));
        assert_eq!(parse_wage("52.05"), Some(52.05));
    }

    #[test]
    fn test_parse_wage_absent_or_malformed() {
        assert_eq!(parse_wage(""), None);
        assert_eq!(parse_wage("   "), None);
        assert_eq!(parse_wage("n/a"), None);
        assert_eq!(parse_wage("$"), None);
    }

    #[test]
    fn test_annualize_applies_multiplier() {
        assert_eq!(annualize(Some(50.0), "hour"), Some(104000.0));
        assert_eq!(annualize(Some(2000.0), "week"), Some(104000.0));
        assert_eq!(annualize(Some(4000.0), "Bi-Weekly"), Some(104000.0));
        assert_eq!(annualize(Some(10000.0), "month"), Some(120000.0));
        assert_eq!(annualize(Some(400.0), "day"), Some(104000.0));
        assert_eq!(annualize(Some(120000.0), "year"), Some(120000.0));
    }

    #[test]
    fn test_annualize_missing_wage() {
        assert_eq!(annualize(None, "year"), None);
        assert_eq!(annualize(parse_wage(""), "hour"), None);
    }
}
