use regex::Regex;

/// Strips everything outside printable ASCII (which covers the zero-width
/// and no-break characters government pages embed), collapses whitespace
/// runs and trims.
pub fn normalize(text: &str) -> String {
    let ascii: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .filter(|c| (' '..='~').contains(c))
        .collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First decimal token in a cell, e.g. "7.5 (will mature in 115 months)"
/// yields 7.5. Rupee separators are not handled; source cells never carry
/// grouped digits.
pub fn first_decimal(text: &str) -> Option<f64> {
    let pattern = Regex::new(r"\d+(?:\.\d+)?").expect("decimal token regex must be valid");
    pattern.find(text)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_non_ascii_and_collapses_whitespace() {
        assert_eq!(
            normalize("  Senior\u{a0}Citizen \u{200b} Savings\n\tScheme  "),
            "SeniorCitizen Savings Scheme"
        );
        assert_eq!(normalize("Rate of\u{2009}Interest"), "Rate ofInterest");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalize_is_stable_on_plain_text() {
        assert_eq!(normalize("Interest rates (New)"), "Interest rates (New)");
    }

    #[test]
    fn first_decimal_takes_leading_token() {
        assert_eq!(first_decimal("7.5 (will mature in 115 months)"), Some(7.5));
        assert_eq!(first_decimal("Rs. 62000"), Some(62000.0));
        assert_eq!(first_decimal("-"), None);
        assert_eq!(first_decimal(""), None);
    }
}
