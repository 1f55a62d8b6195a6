use crate::error::ExtractError;
use crate::model::{CurrencyDocument, Extraction};

/// The currency search API nests its hits under "searchresult"; the entries
/// pass through untouched.
pub fn extract(payload: &str, now_ms: i64) -> Result<Extraction<CurrencyDocument>, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|err| ExtractError::structure(format!("currency payload is not JSON: {err}")))?;
    let currencies = value
        .get("searchresult")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| ExtractError::structure("currency payload has no searchresult array"))?
        .clone();

    if currencies.is_empty() {
        return Err(ExtractError::EmptyResult(
            "currency search returned nothing".to_string(),
        ));
    }

    let rows = currencies.len();
    Ok(Extraction {
        document: CurrencyDocument {
            last_updated: now_ms,
            currencies,
        },
        rows,
        anomalies: 0,
    })
}
