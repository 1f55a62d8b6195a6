use crate::model::Compounding;
use crate::schemes::PenaltyDeduction;
use crate::text;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRate {
    pub rate: f64,
    /// From the "(will mature in N months)" label some rows carry.
    pub matures_in_years: Option<f64>,
}

/// First decimal token is the nominal rate; a cell without one is a row
/// anomaly, not a failure.
pub fn parse_interest_rate(cell: &str) -> Option<ParsedRate> {
    let rate = text::first_decimal(cell)?;
    let maturity = Regex::new(r"(?i)will\s+mature\s+in\s+(\d+)\s+months?")
        .expect("maturity regex must be valid");
    let matures_in_years = maturity
        .captures(cell)
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|months| round2(months / 12.0));
    Some(ParsedRate {
        rate,
        matures_in_years,
    })
}

/// "Quarterly and Paid" means interest is paid out quarterly instead of
/// compounding; the marker is stripped from the frequency text.
pub fn parse_compounding(cell: &str) -> Compounding {
    let normalized = text::normalize(cell);
    let payout = normalized.to_lowercase().contains("and paid");
    let marker = Regex::new(r"(?i)\s*and\s+paid").expect("payout marker regex must be valid");
    let frequency = marker.replace_all(&normalized, "").trim().to_string();
    let frequency_per_year = frequency_per_year(&frequency);
    Compounding {
        payout,
        frequency,
        frequency_per_year,
    }
}

fn frequency_per_year(frequency: &str) -> u32 {
    let lower = frequency.to_lowercase();
    if lower.contains("month") {
        12
    } else if lower.contains("quarter") {
        4
    } else if lower.contains("half") {
        2
    } else if lower.contains("annual") || lower.contains("year") {
        1
    } else {
        0
    }
}

/// Compound growth over the full holding at the published nominal rate,
/// as a percentage to two decimals. Paid-out interest never compounds, so
/// payout schemes keep their nominal rate; a zero frequency or tenure
/// means there is nothing to compound over.
pub fn effective_yield(rate: f64, frequency_per_year: u32, tenure_years: f64, payout: bool) -> f64 {
    if payout || frequency_per_year == 0 || tenure_years <= 0.0 {
        return rate;
    }
    let periods = f64::from(frequency_per_year) * tenure_years;
    round2(((1.0 + rate / 100.0 / periods).powf(periods) - 1.0) * 100.0)
}

/// None signals the caller to substitute the batch's savings-account rate.
pub fn resolve_penalty_rate(base_rate: f64, deduction: PenaltyDeduction) -> Option<f64> {
    match deduction {
        PenaltyDeduction::SavingsRate => None,
        PenaltyDeduction::NoInterest => Some(0.0),
        PenaltyDeduction::Percent(percent) => Some(round1((base_rate - percent).max(0.0))),
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rate_cell_parses_without_maturity() {
        assert_eq!(
            parse_interest_rate("7.1"),
            Some(ParsedRate {
                rate: 7.1,
                matures_in_years: None
            })
        );
        assert_eq!(parse_interest_rate("-"), None);
    }

    #[test]
    fn maturity_label_converts_months_to_years() {
        let parsed = parse_interest_rate("7.5 (will mature in 115 months)").unwrap();
        assert_eq!(parsed.rate, 7.5);
        assert_eq!(parsed.matures_in_years, Some(9.58));
    }

    #[test]
    fn compounding_marks_and_strips_payout() {
        let quarterly = parse_compounding("Quarterly");
        assert!(!quarterly.payout);
        assert_eq!(quarterly.frequency, "Quarterly");
        assert_eq!(quarterly.frequency_per_year, 4);

        let monthly = parse_compounding("Monthly and Paid");
        assert!(monthly.payout);
        assert_eq!(monthly.frequency, "Monthly");
        assert_eq!(monthly.frequency_per_year, 12);

        let annually = parse_compounding("Annually");
        assert_eq!(annually.frequency_per_year, 1);

        let unknown = parse_compounding("At maturity");
        assert_eq!(unknown.frequency_per_year, 0);
    }

    #[test]
    fn effective_yield_compounds_unless_paid_out() {
        assert_eq!(effective_yield(7.0, 4, 5.0, false), 7.24);
        assert_eq!(effective_yield(7.0, 4, 5.0, true), 7.0);
        assert_eq!(effective_yield(4.0, 1, 0.0, false), 4.0);
        assert_eq!(effective_yield(7.5, 0, 2.0, false), 7.5);
    }

    #[test]
    fn penalty_resolution_matches_deduction_kind() {
        assert_eq!(
            resolve_penalty_rate(7.0, PenaltyDeduction::Percent(2.0)),
            Some(5.0)
        );
        assert_eq!(
            resolve_penalty_rate(7.0, PenaltyDeduction::NoInterest),
            Some(0.0)
        );
        assert_eq!(resolve_penalty_rate(7.0, PenaltyDeduction::SavingsRate), None);
        assert_eq!(
            resolve_penalty_rate(1.5, PenaltyDeduction::Percent(2.0)),
            Some(0.0)
        );
    }
}
