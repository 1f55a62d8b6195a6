use crate::error::ExtractError;
use crate::text;
use scraper::{ElementRef, Html, Selector};

pub fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css)
        .map_err(|err| ExtractError::structure(format!("invalid selector {css}: {err:?}")))
}

pub fn element_text(element: ElementRef<'_>) -> String {
    text::normalize(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn select_first<'a>(
    document: &'a Html,
    css: &str,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let selector = parse_selector(css)?;
    Ok(document.select(&selector).next())
}

pub fn select_all<'a>(document: &'a Html, css: &str) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let selector = parse_selector(css)?;
    Ok(document.select(&selector).collect())
}

/// First table under `scope` whose caption text contains `fragment` after
/// normalization and lowercasing. Pages keep superseded tables around
/// ("Interest rates (Old)"), so the fragment has to carry the qualifier.
pub fn table_by_caption<'a>(
    document: &'a Html,
    scope: &str,
    fragment: &str,
) -> Result<ElementRef<'a>, ExtractError> {
    let tables = parse_selector(scope)?;
    let captions = parse_selector("caption")?;
    let needle = fragment.to_lowercase();

    for table in document.select(&tables) {
        if let Some(caption) = table.select(&captions).next()
            && element_text(caption).to_lowercase().contains(&needle)
        {
            return Ok(table);
        }
    }

    Err(ExtractError::structure(format!(
        "no table with caption containing {fragment:?} under {scope}"
    )))
}

pub fn header_texts(table: ElementRef<'_>) -> Result<Vec<String>, ExtractError> {
    let headers = parse_selector("th")?;
    Ok(table.select(&headers).map(element_text).collect())
}

/// Headers are matched by substring, order-independent, so serial-number
/// and other extra columns never shift the mapping.
pub fn column_index(headers: &[String], role: &str) -> Option<usize> {
    let needle = role.to_lowercase();
    headers
        .iter()
        .position(|header| header.to_lowercase().contains(&needle))
}

pub fn required_column(
    headers: &[String],
    role: &str,
    table_name: &str,
) -> Result<usize, ExtractError> {
    column_index(headers, role).ok_or_else(|| {
        ExtractError::structure(format!(
            "missing required column {role:?} in {table_name} table"
        ))
    })
}

pub fn rows<'a>(
    table: ElementRef<'a>,
    row_selector: &str,
) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    let selector = parse_selector(row_selector)?;
    Ok(table.select(&selector).collect())
}

pub fn body_rows<'a>(table: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>, ExtractError> {
    rows(table, "tbody tr")
}

/// Direct td/th children only; nested tables never leak cells into the row.
pub fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
        .map(element_text)
        .collect()
}

/// (data-label, text) pairs for the session tables whose cells carry their
/// column identity as an attribute.
pub fn labeled_cells(row: ElementRef<'_>) -> Vec<(String, String)> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .filter_map(|el| {
            el.value()
                .attr("data-label")
                .map(|label| (text::normalize(label), element_text(el)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_CAPTIONS: &str = r#"
        <div class="wrap">
          <table class="static_table">
            <caption>Interest rates (Old)</caption>
            <tbody><tr><td>stale</td></tr></tbody>
          </table>
          <table class="static_table">
            <caption> Interest  rates (New) </caption>
            <tbody><tr><td>fresh</td></tr></tbody>
          </table>
        </div>
    "#;

    #[test]
    fn caption_fragment_selects_the_qualified_table() {
        let document = Html::parse_document(TWO_CAPTIONS);
        let scope = ".wrap table.static_table";

        let new = table_by_caption(&document, scope, "interest rates (new)").unwrap();
        let row = body_rows(new).unwrap().remove(0);
        assert_eq!(cell_texts(row), vec!["fresh".to_string()]);

        let old = table_by_caption(&document, scope, "interest rates (old)").unwrap();
        let row = body_rows(old).unwrap().remove(0);
        assert_eq!(cell_texts(row), vec!["stale".to_string()]);
    }

    #[test]
    fn missing_caption_is_structural() {
        let document = Html::parse_document(TWO_CAPTIONS);
        let err = table_by_caption(&document, ".wrap table", "interest rates (2099)").unwrap_err();
        assert!(matches!(err, ExtractError::Structure(_)));
    }

    #[test]
    fn column_mapping_is_substring_based_and_tolerant_of_extras() {
        let headers = vec![
            "Sl. No.".to_string(),
            "Instruments".to_string(),
            "Rate of interest w.e.f 01.01.2024 to 31.03.2024".to_string(),
            "Compounding Frequency".to_string(),
        ];
        assert_eq!(column_index(&headers, "instruments"), Some(1));
        assert_eq!(column_index(&headers, "rate of interest"), Some(2));
        assert_eq!(column_index(&headers, "compounding frequency"), Some(3));
        assert!(required_column(&headers, "maturity period", "schemes").is_err());
    }

    #[test]
    fn labeled_cells_pair_attribute_with_text() {
        let html = r#"<table><tbody><tr>
            <td data-label="Date">05/08/2024</td>
            <td data-label="Gold 999">62000</td>
            <td>ignored</td>
        </tr></tbody></table>"#;
        let document = Html::parse_document(html);
        let table = select_first(&document, "table").unwrap().unwrap();
        let row = body_rows(table).unwrap().remove(0);
        assert_eq!(
            labeled_cells(row),
            vec![
                ("Date".to_string(), "05/08/2024".to_string()),
                ("Gold 999".to_string(), "62000".to_string()),
            ]
        );
    }
}
