use crate::dates;
use crate::error::ExtractError;
use crate::model::{Extraction, GoldDocument, GoldRateRecord, SessionRate};
use crate::table;
use crate::text;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::collections::BTreeMap;
use tracing::warn;

pub const SOURCE_URL: &str = "https://ibjarates.com";

/// The page renders three tables under this class: an update banner, the
/// forenoon session and the afternoon session, in that order.
const SESSION_TABLES: &str = ".rates-tbl";

pub fn extract(html: &str) -> Result<Extraction<GoldDocument>, ExtractError> {
    let document = Html::parse_document(html);
    let tables = table::select_all(&document, SESSION_TABLES)?;
    let [banner, forenoon, afternoon, ..] = tables.as_slice() else {
        return Err(ExtractError::structure(format!(
            "expected a banner and two session tables, found {}",
            tables.len()
        )));
    };

    let last_updated = banner_stamp(*banner)?;
    let (morning, mut anomalies) = session_cells(*forenoon)?;
    let (evening, evening_anomalies) = session_cells(*afternoon)?;
    anomalies += evening_anomalies;

    let mut afternoon_index: BTreeMap<(i64, String), Option<f64>> = evening
        .into_iter()
        .map(|cell| ((cell.date, cell.label), cell.value))
        .collect();

    let mut rates = Vec::new();
    for cell in morning {
        let afternoon_value = afternoon_index
            .remove(&(cell.date, cell.label.clone()))
            .flatten();
        match build_record(
            cell.date,
            &cell.label,
            SessionRate {
                forenoon: cell.value,
                afternoon: afternoon_value,
            },
        ) {
            Some(record) => rates.push(record),
            None => anomalies += 1,
        }
    }
    // Afternoon rows with no forenoon counterpart still publish, half empty.
    for ((date, label), value) in afternoon_index {
        match build_record(
            date,
            &label,
            SessionRate {
                forenoon: None,
                afternoon: value,
            },
        ) {
            Some(record) => rates.push(record),
            None => anomalies += 1,
        }
    }

    if rates.is_empty() {
        return Err(ExtractError::EmptyResult(
            "no session rates on the page".to_string(),
        ));
    }

    let rows = rates.len();
    Ok(Extraction {
        document: GoldDocument {
            last_updated,
            rates,
        },
        rows,
        anomalies,
    })
}

fn banner_stamp(banner: ElementRef<'_>) -> Result<i64, ExtractError> {
    let banner_text = table::element_text(banner);
    let pattern =
        Regex::new(r"(?i)last\s+updated\s+time\s*:\s*(.+)").expect("banner regex must be valid");
    let stamp = pattern
        .captures(&banner_text)
        .map(|caps| caps[1].trim().to_string())
        .ok_or_else(|| {
            ExtractError::structure(format!("no update stamp in banner {banner_text:?}"))
        })?;
    dates::session_stamp_epoch_ms(&stamp, dates::INDIA)
        .ok_or_else(|| ExtractError::structure(format!("unparseable update stamp {stamp:?}")))
}

struct SessionCell {
    date: i64,
    label: String,
    value: Option<f64>,
}

/// Every data row leads with a date cell; the remaining cells carry their
/// instrument as a data-label attribute. A blank value cell is kept as None
/// so the sibling session can still fill the record.
fn session_cells(table_el: ElementRef<'_>) -> Result<(Vec<SessionCell>, usize), ExtractError> {
    let mut cells = Vec::new();
    let mut anomalies = 0usize;

    for row in table::rows(table_el, "tr")? {
        let labeled = table::labeled_cells(row);
        let Some(((_, date_text), rest)) = labeled.split_first() else {
            continue;
        };
        let Some(date) = dates::day_month_year_epoch_ms(date_text, dates::INDIA) else {
            warn!(cell = %date_text, "session row without a parseable date");
            anomalies += 1;
            continue;
        };
        for (label, value_text) in rest {
            cells.push(SessionCell {
                date,
                label: label.clone(),
                value: text::first_decimal(value_text),
            });
        }
    }

    Ok((cells, anomalies))
}

fn build_record(date: i64, label: &str, rate: SessionRate) -> Option<GoldRateRecord> {
    let Some((metal, purity)) = decode_label(label) else {
        warn!(label = %label, "undecodable instrument label");
        return None;
    };
    let quantity_grams = quantity_for(&metal);
    Some(GoldRateRecord {
        date,
        metal,
        purity,
        quantity_grams,
        rate,
    })
}

fn decode_label(label: &str) -> Option<(String, u32)> {
    let mut parts = label.split_whitespace();
    let metal = parts.next()?.to_string();
    let purity = parts.next()?.parse().ok()?;
    Some((metal, purity))
}

fn quantity_for(metal: &str) -> Option<u32> {
    match metal.to_lowercase().as_str() {
        "gold" => Some(10),
        "silver" => Some(1000),
        _ => None,
    }
}
