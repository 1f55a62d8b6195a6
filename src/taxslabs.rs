use crate::error::ExtractError;
use crate::model::{Extraction, TaxSlabsDocument};
use crate::table;
use scraper::Html;
use std::collections::BTreeMap;

/// The tax portal wraps rendered slab tables in a JSON envelope; each table
/// flattens to header-keyed row maps, one vector per table.
pub fn extract(payload: &str, now_ms: i64) -> Result<Extraction<TaxSlabsDocument>, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|err| ExtractError::structure(format!("tax slab payload is not JSON: {err}")))?;
    let html = value
        .get("HtmlContent")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ExtractError::structure("tax slab payload has no HtmlContent field"))?;

    let fragment = Html::parse_fragment(html);
    let mut tables = Vec::new();
    let mut rows = 0usize;

    for table_el in table::select_all(&fragment, "table")? {
        let headers = table::header_texts(table_el)?;
        let mut slabs: Vec<BTreeMap<String, String>> = Vec::new();
        for row in table::body_rows(table_el)? {
            let slab: BTreeMap<String, String> = headers
                .iter()
                .cloned()
                .zip(table::cell_texts(row))
                .collect();
            if !slab.is_empty() {
                slabs.push(slab);
            }
        }
        rows += slabs.len();
        tables.push(slabs);
    }

    if rows == 0 {
        return Err(ExtractError::EmptyResult(
            "no slab rows in the payload".to_string(),
        ));
    }

    Ok(Extraction {
        document: TaxSlabsDocument {
            last_updated: now_ms,
            tables,
        },
        rows,
        anomalies: 0,
    })
}
