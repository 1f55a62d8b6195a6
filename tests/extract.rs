use anyhow::Result;
use chrono::TimeZone;
use paisa::error::ExtractError;
use paisa::model::{CurrentRateRecord, HistoricRate, SchemesDocument, TenureRate};
use paisa::{banks, currency, dates, gold, postoffice, rbi, taxslabs};
use std::fs;
use std::path::Path;

fn fixture(name: &str) -> Result<String> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    Ok(fs::read_to_string(path)?)
}

fn ist_ms(year: i32, month: u32, day: u32) -> i64 {
    dates::INDIA
        .with_ymd_and_hms(year, month, day, 0, 0, 0)
        .unwrap()
        .timestamp_millis()
}

fn scheme<'a>(document: &'a SchemesDocument, code: &str) -> &'a CurrentRateRecord {
    document
        .schemes
        .iter()
        .find(|record| record.scheme.code == code)
        .unwrap_or_else(|| panic!("scheme {code} must be present"))
}

#[test]
fn current_rates_classify_all_thirteen_schemes() -> Result<()> {
    let html = fixture("post_office.html")?;
    let extraction = postoffice::extract_current(&html, 1_000)?;
    let document = &extraction.document;

    assert_eq!(extraction.rows, 13);
    assert_eq!(extraction.anomalies, 0);
    assert_eq!(document.last_updated, 1_000);
    assert_eq!(document.effective.from, ist_ms(2024, 1, 1));
    assert_eq!(document.effective.to, ist_ms(2024, 3, 31));

    let savings = scheme(document, "SB");
    assert_eq!(savings.interest_rate, 4.0);
    assert_eq!(savings.effective_yield, 4.0);
    assert!(savings.pre_maturity_penalty.is_empty());

    let five_year = scheme(document, "TD-5Y");
    assert_eq!(five_year.scheme.maturity_tenure_years, 5);
    assert_eq!(five_year.scheme.tax_exemption.principal_cap_amount, 150_000);
    assert_eq!(five_year.interest_rate, 7.5);
    assert_eq!(five_year.effective_yield, 7.77);

    let two_year = scheme(document, "TD-2Y");
    assert_eq!(two_year.scheme.tax_exemption.principal_cap_amount, 0);

    let recurring = scheme(document, "RD");
    assert!(recurring.scheme.recurring);
    assert_eq!(recurring.scheme.deposit_tenure_years, 5);
    assert_eq!(recurring.scheme.tax_exemption.principal_cap_amount, 0);

    Ok(())
}

#[test]
fn payout_schemes_publish_the_nominal_rate_as_yield() -> Result<()> {
    let html = fixture("post_office.html")?;
    let document = postoffice::extract_current(&html, 0)?.document;

    let senior = scheme(&document, "SCSS");
    assert!(senior.compounding.payout);
    assert_eq!(senior.compounding.frequency_per_year, 4);
    assert_eq!(senior.effective_yield, senior.interest_rate);

    let monthly = scheme(&document, "MIS");
    assert!(monthly.compounding.payout);
    assert_eq!(monthly.compounding.frequency_per_year, 12);
    assert_eq!(monthly.effective_yield, 7.4);

    Ok(())
}

#[test]
fn penalty_bands_substitute_the_savings_rate() -> Result<()> {
    let html = fixture("post_office.html")?;
    let document = postoffice::extract_current(&html, 0)?.document;

    // Early closure of a one-year deposit forfeits interest; after day 180
    // the savings-account rate of the same batch applies.
    let one_year = scheme(&document, "TD-1Y");
    let bands = &one_year.pre_maturity_penalty;
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0].from_day, 0);
    assert_eq!(bands[0].to_day, 180);
    assert_eq!(bands[0].interest_deduction_percent, Some(-1.0));
    assert_eq!(bands[0].resulting_interest_rate, 0.0);
    assert_eq!(bands[1].from_day, 181);
    assert_eq!(bands[1].to_day, 0);
    assert_eq!(bands[1].interest_deduction_percent, None);
    assert_eq!(bands[1].resulting_interest_rate, 4.0);

    let senior = scheme(&document, "SCSS");
    let bands = &senior.pre_maturity_penalty;
    assert_eq!(bands.len(), 3);
    assert_eq!(bands[1].interest_deduction_percent, Some(1.5));
    assert_eq!(bands[1].resulting_interest_rate, 6.7);
    assert_eq!(bands[2].resulting_interest_rate, 7.2);

    let mahila = scheme(&document, "MSSC");
    let bands = &mahila.pre_maturity_penalty;
    assert_eq!(bands[1].interest_deduction_percent, Some(2.0));
    assert_eq!(bands[1].resulting_interest_rate, 5.5);

    Ok(())
}

#[test]
fn maturity_labels_surface_as_matures_in_years() -> Result<()> {
    let html = fixture("post_office.html")?;
    let document = postoffice::extract_current(&html, 0)?.document;

    let kisan = scheme(&document, "KVP");
    assert_eq!(kisan.matures_in_years, Some(9.58));

    // Only the doubling certificate carries the label.
    assert_eq!(scheme(&document, "SB").matures_in_years, None);

    let value = serde_json::to_value(&document)?;
    let records = value["schemes"].as_array().unwrap();
    let kisan_json = records
        .iter()
        .find(|record| record["code"] == "KVP")
        .unwrap();
    assert_eq!(kisan_json["maturesInYears"], serde_json::json!(9.58));
    assert_eq!(kisan_json["compounding"]["frequencyPerYear"], 1);
    assert!(
        records
            .iter()
            .find(|record| record["code"] == "SB")
            .is_some_and(|record| record.get("maturesInYears").is_none())
    );

    Ok(())
}

#[test]
fn unclassifiable_rows_break_the_scheme_count_invariant() -> Result<()> {
    let html = fixture("post_office.html")?.replace("Kisan Vikas Patra", "Mystery Instrument");
    let err = postoffice::extract_current(&html, 0).unwrap_err();
    assert!(matches!(err, ExtractError::Structure(_)));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[test]
fn missing_effective_range_is_structural() -> Result<()> {
    let html = fixture("post_office.html")?.replace("w.e.f", "effective");
    let err = postoffice::extract_current(&html, 0).unwrap_err();
    assert!(matches!(err, ExtractError::Structure(_)));
    Ok(())
}

#[test]
fn historic_tables_group_by_family_code() -> Result<()> {
    let html = fixture("post_office.html")?;
    let extraction = postoffice::extract_historic(&html, 5)?;
    let history = &extraction.document.history;

    let keys: Vec<&str> = history.keys().map(String::as_str).collect();
    assert_eq!(keys, ["KVP", "NSC", "PPF", "SB", "SCSS", "TD"]);
    assert_eq!(extraction.rows, 13);
    assert_eq!(extraction.anomalies, 0);

    let savings = &history["SB"];
    assert_eq!(savings.len(), 2);
    assert_eq!(savings[0].from, ist_ms(2022, 4, 1));
    assert_eq!(savings[0].to, ist_ms(2023, 3, 31));
    assert_eq!(savings[0].interest_rate, HistoricRate::Flat(4.0));
    assert_eq!(savings[0].deposit_limit, None);

    let deposits = &history["TD"];
    assert_eq!(
        deposits[0].interest_rate,
        HistoricRate::ByTenure(vec![
            TenureRate {
                tenure: 1,
                rate: 6.9
            },
            TenureRate {
                tenure: 2,
                rate: 7.0
            },
            TenureRate {
                tenure: 3,
                rate: 7.1
            },
            TenureRate {
                tenure: 5,
                rate: 7.5
            },
        ])
    );

    Ok(())
}

#[test]
fn reversed_senior_citizen_periods_reorder() -> Result<()> {
    let html = fixture("post_office.html")?;
    let history = postoffice::extract_historic(&html, 0)?.document.history;

    let senior = &history["SCSS"];
    assert_eq!(senior[0].from, ist_ms(2023, 1, 1));
    assert_eq!(senior[0].to, ist_ms(2023, 3, 31));
    assert_eq!(senior[0].interest_rate, HistoricRate::Flat(8.0));
    assert_eq!(senior[1].from, ist_ms(2022, 10, 1));
    assert_eq!(senior[1].to, ist_ms(2022, 12, 31));

    Ok(())
}

#[test]
fn certificate_rates_derive_from_maturity_periods() -> Result<()> {
    let html = fixture("post_office.html")?;
    let history = postoffice::extract_historic(&html, 0)?.document.history;

    // 115 months doubles money at 7.5%; ten years at 7.18%.
    let kisan = &history["KVP"];
    assert_eq!(kisan[0].interest_rate, HistoricRate::Flat(7.5));
    assert_eq!(kisan[1].interest_rate, HistoricRate::Flat(7.18));

    Ok(())
}

#[test]
fn issue_variants_concatenate_and_discontinued_schemes_drop() -> Result<()> {
    let html = fixture("post_office.html")?;
    let history = postoffice::extract_historic(&html, 0)?.document.history;

    let certificates = &history["NSC"];
    assert_eq!(certificates.len(), 3);
    assert_eq!(certificates[0].interest_rate, HistoricRate::Flat(7.7));
    assert_eq!(certificates[2].interest_rate, HistoricRate::Flat(8.9));

    assert!(!history.keys().any(|key| key.contains("national")));

    let fund = &history["PPF"];
    assert_eq!(fund[0].deposit_limit, Some(150_000));

    Ok(())
}

#[test]
fn historic_section_with_no_tables_is_an_empty_run() {
    let err = postoffice::extract_historic(
        r#"<div id="past-interest-rates"><p>nothing here yet</p></div>"#,
        0,
    )
    .unwrap_err();
    assert!(matches!(err, ExtractError::EmptyResult(_)));
    assert_eq!(err.exit_code(), 0);
}

#[test]
fn gold_sessions_join_and_publish_partials() -> Result<()> {
    let html = fixture("gold_rates.html")?;
    let extraction = gold::extract(&html)?;
    let document = &extraction.document;

    let stamp = dates::INDIA
        .with_ymd_and_hms(2026, 8, 21, 14, 30, 0)
        .unwrap()
        .timestamp_millis();
    assert_eq!(document.last_updated, stamp);
    assert_eq!(extraction.rows, 5);
    assert_eq!(extraction.anomalies, 0);

    let fine_gold = &document.rates[0];
    assert_eq!(fine_gold.metal, "Gold");
    assert_eq!(fine_gold.purity, 999);
    assert_eq!(fine_gold.quantity_grams, Some(10));
    assert_eq!(fine_gold.date, ist_ms(2026, 8, 21));
    assert_eq!(fine_gold.rate.forenoon, Some(62000.0));
    assert_eq!(fine_gold.rate.afternoon, Some(62500.0));

    // The silver cell is blank in the afternoon session.
    let silver = &document.rates[3];
    assert_eq!(silver.metal, "Silver");
    assert_eq!(silver.quantity_grams, Some(1000));
    assert_eq!(silver.rate.forenoon, Some(74500.0));
    assert_eq!(silver.rate.afternoon, None);

    // A date present only in the afternoon still publishes.
    let stale = &document.rates[4];
    assert_eq!(stale.date, ist_ms(2026, 8, 20));
    assert_eq!(stale.rate.forenoon, None);
    assert_eq!(stale.rate.afternoon, Some(61800.0));

    Ok(())
}

#[test]
fn policy_rate_rows_parse_with_null_dashes() -> Result<()> {
    let html = fixture("policy_rates.html")?;
    let extraction = rbi::extract(&html, 77)?;
    let entries = &extraction.document.rbi_policy_rates;

    assert_eq!(extraction.rows, 3);
    assert_eq!(extraction.document.last_updated, 77);
    assert_eq!(entries[0].effective_date, ist_ms(2025, 2, 7));
    assert_eq!(entries[0].policy_repo_rate, Some(6.25));
    assert_eq!(entries[0].standing_deposit_facility_rate, Some(6.0));
    assert_eq!(entries[1].fixed_reverse_repo_rate, None);
    assert_eq!(entries[2].effective_date, ist_ms(2023, 2, 8));

    Ok(())
}

#[test]
fn bank_groups_keep_their_heading_order() -> Result<()> {
    let html = fixture("banks.html")?;
    let extraction = banks::extract(&html, 3)?;
    let groups = &extraction.document.banks;

    assert_eq!(extraction.rows, 7);
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].group_type, "Public Sector Banks");
    assert_eq!(groups[0].list.len(), 3);
    assert_eq!(groups[0].list[0].name, "State Bank of India");
    assert_eq!(groups[0].list[0].website.as_deref(), Some("https://sbi.co.in"));
    assert_eq!(groups[1].list[1].name, "ICICI Bank");
    assert_eq!(groups[1].list[1].website, None);
    assert_eq!(groups[2].group_type, "Foreign Banks");

    let value = serde_json::to_value(&extraction.document)?;
    assert_eq!(value["banks"][0]["type"], "Public Sector Banks");
    assert!(value["banks"][1]["list"][1].get("website").is_none());

    Ok(())
}

#[test]
fn currency_payload_passes_through() -> Result<()> {
    let payload = fixture("currency_list.json")?;
    let extraction = currency::extract(&payload, 11)?;

    assert_eq!(extraction.rows, 3);
    assert_eq!(extraction.document.currencies[0]["code"], "INR");
    assert_eq!(extraction.document.currencies[0]["symbol"], "₹");

    Ok(())
}

#[test]
fn tax_slab_tables_flatten_to_keyed_rows() -> Result<()> {
    let payload = fixture("tax_slabs.json")?;
    let extraction = taxslabs::extract(&payload, 13)?;
    let tables = &extraction.document.tables;

    assert_eq!(extraction.rows, 6);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0][0]["Income Slab"], "Up to Rs 3,00,000");
    assert_eq!(tables[0][0]["Tax Rate"], "Nil");
    assert_eq!(tables[1][1]["Surcharge"], "15%");

    Ok(())
}
