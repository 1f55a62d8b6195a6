use crate::dates;
use crate::error::ExtractError;
use crate::model::{
    Compounding, CurrentRateRecord, EffectiveRange, Extraction, HistoricDocument, HistoricRate,
    HistoricRateEntry, PenaltyBand, SchemesDocument, TenureRate,
};
use crate::rates::{self, ParsedRate};
use crate::schemes::{self, PenaltyDeduction, SchemeKind};
use crate::table;
use crate::text;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use tracing::{debug, warn};

pub const SOURCE_URL: &str =
    "https://www.indiapost.gov.in/Financial/Pages/Content/Post-Office-Saving-Schemes.aspx";

const CURRENT_TABLE_SCOPE: &str = ".annual_property_list table.static_table";
const CURRENT_CAPTION: &str = "interest rates (new)";
const HISTORIC_ANCHOR: &str = "#past-interest-rates";

/// The page publishes one row per instrument; fewer means the layout
/// changed and nothing may be published.
pub const EXPECTED_SCHEME_ROWS: usize = 13;

const DISCONTINUED_PREFIXES: &[&str] = &["national savings scheme", "indira vikas patra"];

pub fn extract_current(
    html: &str,
    now_ms: i64,
) -> Result<Extraction<SchemesDocument>, ExtractError> {
    let document = Html::parse_document(html);
    let current = table::table_by_caption(&document, CURRENT_TABLE_SCOPE, CURRENT_CAPTION)?;
    let headers = table::header_texts(current)?;
    let instruments = table::required_column(&headers, "instruments", "current rates")?;
    let interest = table::required_column(&headers, "rate of interest", "current rates")?;
    let compounding = table::required_column(&headers, "compounding frequency", "current rates")?;
    let effective = effective_range(&headers[interest])?;

    let width = instruments.max(interest).max(compounding);
    let mut anomalies = 0usize;
    let mut classified: Vec<(SchemeKind, ParsedRate, Compounding)> = Vec::new();

    for row in table::body_rows(current)? {
        let cells = table::cell_texts(row);
        if cells.len() <= width {
            continue;
        }
        let Some(kind) = schemes::classify_kind(&cells[instruments]) else {
            warn!(instrument = %cells[instruments], "unrecognized instrument row");
            anomalies += 1;
            continue;
        };
        let Some(parsed) = rates::parse_interest_rate(&cells[interest]) else {
            warn!(
                instrument = %cells[instruments],
                cell = %cells[interest],
                "rate cell has no numeric token"
            );
            anomalies += 1;
            continue;
        };
        classified.push((kind, parsed, rates::parse_compounding(&cells[compounding])));
    }

    if classified.len() != EXPECTED_SCHEME_ROWS {
        return Err(ExtractError::structure(format!(
            "expected {EXPECTED_SCHEME_ROWS} scheme rows, classified {}",
            classified.len()
        )));
    }

    let savings_rate = classified
        .iter()
        .find(|(kind, ..)| *kind == SchemeKind::SavingsAccount)
        .map(|(_, parsed, _)| parsed.rate)
        .ok_or_else(|| {
            ExtractError::structure("savings account row missing; cannot resolve penalty bands")
        })?;

    let schemes: Vec<CurrentRateRecord> = classified
        .into_iter()
        .map(|(kind, parsed, compounding)| build_record(kind, parsed, compounding, savings_rate))
        .collect();
    let rows = schemes.len();

    Ok(Extraction {
        document: SchemesDocument {
            last_updated: now_ms,
            effective,
            schemes,
        },
        rows,
        anomalies,
    })
}

fn build_record(
    kind: SchemeKind,
    parsed: ParsedRate,
    compounding: Compounding,
    savings_rate: f64,
) -> CurrentRateRecord {
    let scheme = kind.definition();
    let tenure_years = if scheme.maturity_tenure_years > 0 {
        f64::from(scheme.maturity_tenure_years)
    } else {
        parsed.matures_in_years.unwrap_or(0.0)
    };
    let effective_yield = rates::effective_yield(
        parsed.rate,
        compounding.frequency_per_year,
        tenure_years,
        compounding.payout,
    );

    let pre_maturity_penalty = schemes::penalty_schedule(kind)
        .iter()
        .map(|band| PenaltyBand {
            from_day: band.from_day,
            to_day: band.to_day,
            interest_deduction_percent: match band.deduction {
                PenaltyDeduction::SavingsRate => None,
                PenaltyDeduction::NoInterest => Some(-1.0),
                PenaltyDeduction::Percent(percent) => Some(percent),
            },
            resulting_interest_rate: rates::resolve_penalty_rate(parsed.rate, band.deduction)
                .unwrap_or_else(|| rates::round1(savings_rate)),
        })
        .collect();

    CurrentRateRecord {
        scheme,
        interest_rate: parsed.rate,
        effective_yield,
        matures_in_years: parsed.matures_in_years,
        compounding,
        pre_maturity_penalty,
    }
}

fn effective_range(header: &str) -> Result<EffectiveRange, ExtractError> {
    let pattern = Regex::new(
        r"(?i)w\.?e\.?f\.?\s+(\d{1,2}[.\-/]\d{1,2}[.\-/]\d{4})\s+to\s+(\d{1,2}[.\-/]\d{1,2}[.\-/]\d{4})",
    )
    .expect("effective range regex must be valid");
    let caps = pattern.captures(header).ok_or_else(|| {
        ExtractError::structure(format!("rate header carries no effective range: {header:?}"))
    })?;
    let from = dates::day_month_year_epoch_ms(&caps[1], dates::INDIA);
    let to = dates::day_month_year_epoch_ms(&caps[2], dates::INDIA);
    match (from, to) {
        (Some(from), Some(to)) => Ok(EffectiveRange { from, to }),
        _ => Err(ExtractError::structure(format!(
            "unparseable effective range in {header:?}"
        ))),
    }
}

/// The historic section interleaves caption paragraphs and tables; each
/// table belongs to the nearest preceding caption.
pub fn extract_historic(
    html: &str,
    now_ms: i64,
) -> Result<Extraction<HistoricDocument>, ExtractError> {
    let document = Html::parse_document(html);
    let container = table::select_first(&document, HISTORIC_ANCHOR)?.ok_or_else(|| {
        ExtractError::structure(format!("historic rates section {HISTORIC_ANCHOR} not found"))
    })?;

    let mut history: BTreeMap<String, Vec<HistoricRateEntry>> = BTreeMap::new();
    let mut rows = 0usize;
    let mut anomalies = 0usize;
    let mut caption: Option<String> = None;

    for child in container.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };
        match element.value().name() {
            "p" | "h2" | "h3" | "h4" => {
                let title = table::element_text(element);
                if !title.is_empty() {
                    caption = Some(title);
                }
            }
            "table" => {
                let Some(name) = caption.as_deref() else {
                    warn!("historic table without a preceding caption; skipped");
                    anomalies += 1;
                    continue;
                };
                if is_discontinued(name) {
                    debug!(caption = %name, "skipping discontinued scheme");
                    continue;
                }
                let Some(kind) = schemes::classify_kind(name) else {
                    warn!(caption = %name, "historic caption matches no scheme");
                    anomalies += 1;
                    continue;
                };
                let parsed = parse_historic_table(element, kind)?;
                rows += parsed.entries.len();
                anomalies += parsed.anomalies;
                history
                    .entry(kind.family_code())
                    .or_default()
                    .extend(parsed.entries);
            }
            _ => {}
        }
    }

    if history.is_empty() {
        return Err(ExtractError::EmptyResult(
            "no historic rate tables parsed".to_string(),
        ));
    }

    Ok(Extraction {
        document: HistoricDocument {
            last_updated: now_ms,
            history,
        },
        rows,
        anomalies,
    })
}

struct ParsedTable {
    entries: Vec<HistoricRateEntry>,
    anomalies: usize,
}

fn parse_historic_table(
    table_el: ElementRef<'_>,
    kind: SchemeKind,
) -> Result<ParsedTable, ExtractError> {
    match kind {
        SchemeKind::TimeDeposit { .. } => parse_tenure_columns(table_el),
        SchemeKind::KisanVikasPatra => parse_maturity_derived(table_el),
        SchemeKind::SeniorCitizenSavings => parse_combined_range(table_el),
        _ => parse_flat(table_el),
    }
}

fn parse_flat(table_el: ElementRef<'_>) -> Result<ParsedTable, ExtractError> {
    let headers = table::header_texts(table_el)?;
    let from = table::required_column(&headers, "from", "historic")?;
    let to = table::required_column(&headers, "to", "historic")?;
    let rate = table::required_column(&headers, "rate", "historic")?;
    let limit = table::column_index(&headers, "maximum deposit");

    let mut entries = Vec::new();
    let mut anomalies = 0usize;

    for row in table::body_rows(table_el)? {
        let cells = table::cell_texts(row);
        let period = parse_period(&cells, from, to);
        let rate_value = cells.get(rate).and_then(|cell| text::first_decimal(cell));
        let (Some((from_ms, to_ms)), Some(rate_value)) = (period, rate_value) else {
            warn!(cells = ?cells, "unusable historic row");
            anomalies += 1;
            continue;
        };
        entries.push(HistoricRateEntry {
            from: from_ms,
            to: to_ms,
            interest_rate: HistoricRate::Flat(rate_value),
            deposit_limit: limit
                .and_then(|index| cells.get(index))
                .and_then(|cell| rupee_amount(cell)),
        });
    }

    Ok(ParsedTable { entries, anomalies })
}

fn parse_tenure_columns(table_el: ElementRef<'_>) -> Result<ParsedTable, ExtractError> {
    let headers = table::header_texts(table_el)?;
    let from = table::required_column(&headers, "from", "time deposit historic")?;
    let to = table::required_column(&headers, "to", "time deposit historic")?;

    let tenure = Regex::new(r"(\d+)\s*year").expect("tenure header regex must be valid");
    let tenure_columns: Vec<(usize, u32)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            tenure
                .captures(&header.to_lowercase())
                .and_then(|caps| caps[1].parse().ok())
                .map(|years| (index, years))
        })
        .collect();
    if tenure_columns.is_empty() {
        return Err(ExtractError::structure(
            "time deposit historic table has no tenure columns",
        ));
    }

    let mut entries = Vec::new();
    let mut anomalies = 0usize;

    for row in table::body_rows(table_el)? {
        let cells = table::cell_texts(row);
        let Some((from_ms, to_ms)) = parse_period(&cells, from, to) else {
            warn!(cells = ?cells, "unusable time deposit historic row");
            anomalies += 1;
            continue;
        };
        let tiers: Vec<TenureRate> = tenure_columns
            .iter()
            .filter_map(|(index, years)| {
                cells
                    .get(*index)
                    .and_then(|cell| text::first_decimal(cell))
                    .map(|rate| TenureRate {
                        tenure: *years,
                        rate,
                    })
            })
            .collect();
        if tiers.is_empty() {
            warn!(cells = ?cells, "time deposit historic row has no rates");
            anomalies += 1;
            continue;
        }
        entries.push(HistoricRateEntry {
            from: from_ms,
            to: to_ms,
            interest_rate: HistoricRate::ByTenure(tiers),
            deposit_limit: None,
        });
    }

    Ok(ParsedTable { entries, anomalies })
}

/// The senior-citizen table writes the whole period into one cell, newest
/// date first; the pair is reordered chronologically.
fn parse_combined_range(table_el: ElementRef<'_>) -> Result<ParsedTable, ExtractError> {
    let headers = table::header_texts(table_el)?;
    let period = table::required_column(&headers, "period", "senior citizen historic")?;
    let rate = table::required_column(&headers, "rate", "senior citizen historic")?;

    let mut entries = Vec::new();
    let mut anomalies = 0usize;

    for row in table::body_rows(table_el)? {
        let cells = table::cell_texts(row);
        let range = cells.get(period).and_then(|cell| split_range(cell));
        let rate_value = cells.get(rate).and_then(|cell| text::first_decimal(cell));
        let (Some((from_ms, to_ms)), Some(rate_value)) = (range, rate_value) else {
            warn!(cells = ?cells, "unusable senior citizen historic row");
            anomalies += 1;
            continue;
        };
        entries.push(HistoricRateEntry {
            from: from_ms,
            to: to_ms,
            interest_rate: HistoricRate::Flat(rate_value),
            deposit_limit: None,
        });
    }

    Ok(ParsedTable { entries, anomalies })
}

/// Doubling certificates publish a maturity period instead of a rate; the
/// implied rate solves maturity = principal * (1 + r)^years with maturity
/// at twice the principal.
fn parse_maturity_derived(table_el: ElementRef<'_>) -> Result<ParsedTable, ExtractError> {
    let headers = table::header_texts(table_el)?;
    let from = table::required_column(&headers, "from", "certificate historic")?;
    let to = table::required_column(&headers, "to", "certificate historic")?;
    let maturity = table::required_column(&headers, "maturity", "certificate historic")?;

    let mut entries = Vec::new();
    let mut anomalies = 0usize;

    for row in table::body_rows(table_el)? {
        let cells = table::cell_texts(row);
        let period = parse_period(&cells, from, to);
        let years = cells
            .get(maturity)
            .and_then(|cell| maturity_period_years(cell))
            .filter(|years| *years > 0.0);
        let (Some((from_ms, to_ms)), Some(years)) = (period, years) else {
            warn!(cells = ?cells, "unusable certificate historic row");
            anomalies += 1;
            continue;
        };
        entries.push(HistoricRateEntry {
            from: from_ms,
            to: to_ms,
            interest_rate: HistoricRate::Flat(doubling_rate(years)),
            deposit_limit: None,
        });
    }

    Ok(ParsedTable { entries, anomalies })
}

fn parse_period(cells: &[String], from: usize, to: usize) -> Option<(i64, i64)> {
    let from_ms = cells
        .get(from)
        .and_then(|cell| dates::day_month_year_epoch_ms(cell, dates::INDIA))?;
    let to_ms = cells
        .get(to)
        .and_then(|cell| dates::day_month_year_epoch_ms(cell, dates::INDIA))?;
    Some((from_ms, to_ms))
}

fn split_range(cell: &str) -> Option<(i64, i64)> {
    let pattern = Regex::new(
        r"(?i)(\d{1,2}[.\-/]\d{1,2}[.\-/]\d{4})\s+to\s+(\d{1,2}[.\-/]\d{1,2}[.\-/]\d{4})",
    )
    .expect("period range regex must be valid");
    let caps = pattern.captures(cell)?;
    let first = dates::day_month_year_epoch_ms(&caps[1], dates::INDIA)?;
    let second = dates::day_month_year_epoch_ms(&caps[2], dates::INDIA)?;
    Some((first.min(second), first.max(second)))
}

fn maturity_period_years(cell: &str) -> Option<f64> {
    let with_years = Regex::new(r"(?i)(\d+)\s*years?(?:\s*(?:and\s*)?(\d+)\s*months?)?")
        .expect("maturity period regex must compile");
    if let Some(caps) = with_years.captures(cell) {
        let years: f64 = caps[1].parse().ok()?;
        let months: f64 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0.0);
        return Some(years + months / 12.0);
    }
    let months_only =
        Regex::new(r"(?i)(\d+)\s*months?").expect("months only regex must compile");
    let caps = months_only.captures(cell)?;
    let months: f64 = caps[1].parse().ok()?;
    Some(months / 12.0)
}

fn doubling_rate(years: f64) -> f64 {
    rates::round2((2f64.powf(1.0 / years) - 1.0) * 100.0)
}

fn rupee_amount(cell: &str) -> Option<u64> {
    let digits: String = cell.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn is_discontinued(name: &str) -> bool {
    let lower = text::normalize(name).to_lowercase();
    DISCONTINUED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}
