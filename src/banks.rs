use crate::error::ExtractError;
use crate::model::{BankEntry, BankGroup, BanksDocument, Extraction};
use crate::table;
use scraper::{ElementRef, Html};

/// Every group heading on the directory page shares this id; the element
/// right after it holds the group's anchor list.
const GROUP_HEADINGS: &str = "#Accordionheading";

pub fn extract(html: &str, now_ms: i64) -> Result<Extraction<BanksDocument>, ExtractError> {
    let document = Html::parse_document(html);
    let anchors = table::parse_selector("a")?;

    let mut banks = Vec::new();
    for heading in table::select_all(&document, GROUP_HEADINGS)? {
        let group_type = table::element_text(heading).replace('+', "");
        let group_type = group_type.trim().to_string();

        let list: Vec<BankEntry> = heading
            .next_siblings()
            .find_map(ElementRef::wrap)
            .map(|sibling| {
                sibling
                    .select(&anchors)
                    .map(|anchor| BankEntry {
                        name: table::element_text(anchor).replace('%', "").trim().to_string(),
                        website: anchor.value().attr("href").map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        banks.push(BankGroup { group_type, list });
    }

    // Fail closed: a heading with no banks under it means the accordion
    // markup changed, and publishing a hollow directory helps nobody.
    if banks.is_empty() {
        return Err(ExtractError::structure("no bank group headings found"));
    }
    if let Some(empty) = banks.iter().find(|group| group.list.is_empty()) {
        return Err(ExtractError::structure(format!(
            "bank group {:?} has an empty list",
            empty.group_type
        )));
    }

    let rows = banks.iter().map(|group| group.list.len()).sum();
    Ok(Extraction {
        document: BanksDocument {
            last_updated: now_ms,
            banks,
        },
        rows,
        anomalies: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <h3 id="Accordionheading">+ Public Sector Banks</h3>
        <div class="panel">
          <ul>
            <li><a href="https://sbi.example">State Bank of India %</a></li>
            <li><a href="https://bob.example">Bank of Baroda</a></li>
          </ul>
        </div>
        <h3 id="Accordionheading">+ Private Sector Banks</h3>
        <div class="panel">
          <ul>
            <li><a>HDFC Bank</a></li>
          </ul>
        </div>
    "#;

    #[test]
    fn groups_pair_headings_with_their_anchor_lists() {
        let extraction = extract(PAGE, 7).unwrap();
        let document = extraction.document;
        assert_eq!(document.last_updated, 7);
        assert_eq!(document.banks.len(), 2);
        assert_eq!(extraction.rows, 3);

        let public = &document.banks[0];
        assert_eq!(public.group_type, "Public Sector Banks");
        assert_eq!(public.list[0].name, "State Bank of India");
        assert_eq!(public.list[0].website.as_deref(), Some("https://sbi.example"));

        // Anchors without an href still name the bank.
        assert_eq!(document.banks[1].list[0].website, None);
    }

    #[test]
    fn empty_groups_fail_closed() {
        let page = r#"
            <h3 id="Accordionheading">+ Foreign Banks</h3>
            <div class="panel"></div>
        "#;
        let err = extract(page, 0).unwrap_err();
        assert!(matches!(err, ExtractError::Structure(_)));
    }

    #[test]
    fn missing_headings_fail_closed() {
        let err = extract("<div>no accordion here</div>", 0).unwrap_err();
        assert!(matches!(err, ExtractError::Structure(_)));
    }
}
