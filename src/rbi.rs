use crate::dates;
use crate::error::ExtractError;
use crate::model::{Extraction, PolicyDocument, PolicyRateEntry};
use crate::table;
use crate::text;
use scraper::Html;
use tracing::warn;

pub const SOURCE_URL: &str = "https://website.rbi.org.in/web/rbi/policy-rate-archive";

const ARCHIVE_TABLE: &str = "#_com_rbi_policy_rate_archive_RBIPolicyRateArchivePortlet_INSTANCE_uwbl_myContainerSearchContainer table";

/// The archive duplicates every row for its mobile layout and hides one
/// copy with d-none.
const VISIBLE_ROWS: &str = "tr:not(.d-none)";

pub fn extract(html: &str, now_ms: i64) -> Result<Extraction<PolicyDocument>, ExtractError> {
    let document = Html::parse_document(html);
    let archive = table::select_first(&document, ARCHIVE_TABLE)?
        .ok_or_else(|| ExtractError::structure("policy rate archive table not found"))?;

    let mut entries = Vec::new();
    let mut anomalies = 0usize;

    for row in table::rows(archive, VISIBLE_ROWS)?.into_iter().skip(1) {
        let cells = table::cell_texts(row);
        if cells.len() < 6 {
            warn!(cells = ?cells, "short policy rate row");
            anomalies += 1;
            continue;
        }
        let Some(effective_date) = dates::month_name_date_epoch_ms(&cells[0], dates::INDIA) else {
            warn!(cell = %cells[0], "unparseable effective date");
            anomalies += 1;
            continue;
        };
        entries.push(PolicyRateEntry {
            effective_date,
            policy_repo_rate: text::first_decimal(&cells[1]),
            standing_deposit_facility_rate: text::first_decimal(&cells[2]),
            marginal_standing_facility_rate: text::first_decimal(&cells[3]),
            bank_rate: text::first_decimal(&cells[4]),
            fixed_reverse_repo_rate: text::first_decimal(&cells[5]),
        });
    }

    if entries.is_empty() {
        return Err(ExtractError::EmptyResult(
            "policy rate archive has no data rows".to_string(),
        ));
    }

    let rows = entries.len();
    Ok(Extraction {
        document: PolicyDocument {
            last_updated: now_ms,
            rbi_policy_rates: entries,
        },
        rows,
        anomalies,
    })
}
