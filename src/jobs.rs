use crate::config::{self, AppConfig};
use crate::error::ExtractError;
use crate::fetch;
use crate::model::Extraction;
use crate::publish::{self, PublishOutcome};
use crate::{banks, currency, gold, postoffice, rbi, taxslabs};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    CurrencyList,
    BanksInIndia,
    IncomeTaxSlabs,
    PolicyRates,
    GoldRates,
    PostOfficeSchemes,
    PostOfficeHistoricRates,
}

impl Job {
    pub fn key(self) -> &'static str {
        match self {
            Job::CurrencyList => "currency-list",
            Job::BanksInIndia => "banks-in-india",
            Job::IncomeTaxSlabs => "income-tax-slabs",
            Job::PolicyRates => "policy-rates",
            Job::GoldRates => "gold-rates",
            Job::PostOfficeSchemes => "post-office-schemes",
            Job::PostOfficeHistoricRates => "post-office-historic-rates",
        }
    }

    fn url_env(self) -> &'static str {
        match self {
            Job::CurrencyList => "CURRENCY_LIST_DATA_SOURCE_URL",
            Job::BanksInIndia => "BANKS_IN_INDIA_DATA_SOURCE_URL",
            Job::IncomeTaxSlabs => "INCOME_TAX_SLABS_DATA_SOURCE_URL",
            Job::PolicyRates => "RBI_POLICY_RATES_DATA_SOURCE_URL",
            Job::GoldRates => "IBJA_GOLD_RATES_DATA_SOURCE_URL",
            Job::PostOfficeSchemes => "POST_OFFICE_SAVINGS_SCHEMES_DATA_SOURCE_URL",
            Job::PostOfficeHistoricRates => "POST_OFFICE_HISTORIC_RATES_DATA_SOURCE_URL",
        }
    }

    fn blob_env(self) -> &'static str {
        match self {
            Job::CurrencyList => "CURRENCY_LIST_JSON_BLOB",
            Job::BanksInIndia => "BANKS_IN_INDIA_JSON_BLOB",
            Job::IncomeTaxSlabs => "INCOME_TAX_SLABS_JSON_BLOB",
            Job::PolicyRates => "RBI_POLICY_RATES_JSON_BLOB",
            Job::GoldRates => "IBJA_GOLD_RATES_JSON_BLOB",
            Job::PostOfficeSchemes => "POST_OFFICE_SAVINGS_SCHEMES_JSON_BLOB",
            Job::PostOfficeHistoricRates => "POST_OFFICE_HISTORIC_RATES_JSON_BLOB",
        }
    }

    /// Jobs on stable public pages carry their URL; the rest must be
    /// configured.
    fn default_url(self) -> Option<&'static str> {
        match self {
            Job::PolicyRates => Some(rbi::SOURCE_URL),
            Job::GoldRates => Some(gold::SOURCE_URL),
            Job::PostOfficeSchemes | Job::PostOfficeHistoricRates => Some(postoffice::SOURCE_URL),
            Job::CurrencyList | Job::BanksInIndia | Job::IncomeTaxSlabs => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub save: bool,
    pub from_file: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: Job,
    pub rows: usize,
    pub anomalies: usize,
    /// None when the run was report-only (no --save).
    pub published: Option<PublishOutcome>,
}

pub fn run_job(
    job: Job,
    config: &AppConfig,
    options: &RunOptions,
) -> Result<JobReport, ExtractError> {
    let client = fetch::build_client(&config.fetch)?;

    let payload = match &options.from_file {
        Some(path) => fs::read_to_string(path).map_err(|err| {
            ExtractError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?,
        None => {
            let url = config::source_url(job.url_env(), job.default_url())?;
            info!(job = job.key(), %url, "fetching source");
            fetch::fetch_text(&client, &config.fetch, &url)?
        }
    };

    let now_ms = Utc::now().timestamp_millis();
    let (document, rows, anomalies) = match job {
        Job::CurrencyList => to_parts(currency::extract(&payload, now_ms)?)?,
        Job::BanksInIndia => to_parts(banks::extract(&payload, now_ms)?)?,
        Job::IncomeTaxSlabs => to_parts(taxslabs::extract(&payload, now_ms)?)?,
        Job::PolicyRates => to_parts(rbi::extract(&payload, now_ms)?)?,
        Job::GoldRates => to_parts(gold::extract(&payload)?)?,
        Job::PostOfficeSchemes => to_parts(postoffice::extract_current(&payload, now_ms)?)?,
        Job::PostOfficeHistoricRates => to_parts(postoffice::extract_historic(&payload, now_ms)?)?,
    };

    let rendered = serde_json::to_string_pretty(&document).map_err(|err| {
        ExtractError::structure(format!("document failed to render: {err}"))
    })?;
    println!("{rendered}");

    if let Some(path) = &options.out {
        fs::write(path, &rendered).map_err(|err| {
            ExtractError::Configuration(format!("cannot write {}: {err}", path.display()))
        })?;
        info!(job = job.key(), out = %path.display(), "wrote document");
    }

    let published = if options.save {
        let document_id = config::document_id(job.blob_env());
        Some(publish::publish_document(
            &client,
            &config.fetch,
            &config.publish_endpoint,
            document_id.as_deref(),
            &document,
        )?)
    } else {
        None
    };

    Ok(JobReport {
        job,
        rows,
        anomalies,
        published,
    })
}

fn to_parts<T: Serialize>(
    extraction: Extraction<T>,
) -> Result<(Value, usize, usize), ExtractError> {
    let value = serde_json::to_value(&extraction.document).map_err(|err| {
        ExtractError::structure(format!("document failed to serialize: {err}"))
    })?;
    Ok((value, extraction.rows, extraction.anomalies))
}
