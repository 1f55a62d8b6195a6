use serde::Serialize;
use std::collections::BTreeMap;

/// Static facts about one savings instrument. The zero-valued default is
/// the degenerate definition returned for unrecognized instrument text.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemeDefinition {
    pub code: String,
    pub name: String,
    pub recurring: bool,
    pub deposit_tenure_years: u32,
    pub maturity_tenure_years: u32,
    /// 0 = interest compounds to maturity instead of being paid out.
    pub interest_payout_frequency_per_year: u32,
    pub fixed_interest_rate: bool,
    pub tax_exemption: TaxExemption,
    pub deposit_limit: DepositLimit,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaxExemption {
    pub principal_cap_amount: u64,
    pub interest_exempt_amount: u64,
}

/// Rupee amounts; 0 = no statutory bound.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepositLimit {
    pub min: u64,
    pub max_individual: u64,
    pub max_joint: u64,
    pub multiples: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Compounding {
    pub payout: bool,
    pub frequency: String,
    pub frequency_per_year: u32,
}

/// One premature-closure band. The published deduction keeps the legacy
/// encoding: null substitutes the savings-account rate, -1 means no
/// interest is payable, anything else is a percentage-point deduction.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyBand {
    pub from_day: u32,
    /// 0 = unbounded.
    pub to_day: u32,
    pub interest_deduction_percent: Option<f64>,
    pub resulting_interest_rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRateRecord {
    #[serde(flatten)]
    pub scheme: SchemeDefinition,
    pub interest_rate: f64,
    pub effective_yield: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matures_in_years: Option<f64>,
    pub compounding: Compounding,
    pub pre_maturity_penalty: Vec<PenaltyBand>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemesDocument {
    pub last_updated: i64,
    pub effective: EffectiveRange,
    pub schemes: Vec<CurrentRateRecord>,
}

/// Most schemes publish one historic rate per period; the time-deposit
/// family publishes one per tenure.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HistoricRate {
    Flat(f64),
    ByTenure(Vec<TenureRate>),
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TenureRate {
    pub tenure: u32,
    pub rate: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricRateEntry {
    pub from: i64,
    pub to: i64,
    pub interest_rate: HistoricRate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deposit_limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricDocument {
    pub last_updated: i64,
    pub history: BTreeMap<String, Vec<HistoricRateEntry>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoldRateRecord {
    pub date: i64,
    pub metal: String,
    pub purity: u32,
    /// 10 for gold, 1000 for silver, null for anything else.
    pub quantity_grams: Option<u32>,
    pub rate: SessionRate,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRate {
    pub forenoon: Option<f64>,
    pub afternoon: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoldDocument {
    pub last_updated: i64,
    pub rates: Vec<GoldRateRecord>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRateEntry {
    pub effective_date: i64,
    pub policy_repo_rate: Option<f64>,
    pub standing_deposit_facility_rate: Option<f64>,
    pub marginal_standing_facility_rate: Option<f64>,
    pub bank_rate: Option<f64>,
    pub fixed_reverse_repo_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    pub last_updated: i64,
    pub rbi_policy_rates: Vec<PolicyRateEntry>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankGroup {
    #[serde(rename = "type")]
    pub group_type: String,
    pub list: Vec<BankEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanksDocument {
    pub last_updated: i64,
    pub banks: Vec<BankGroup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyDocument {
    pub last_updated: i64,
    pub currencies: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSlabsDocument {
    pub last_updated: i64,
    pub tables: Vec<Vec<BTreeMap<String, String>>>,
}

/// An extractor's result, with row and anomaly counts for the run report.
#[derive(Debug, Clone)]
pub struct Extraction<T> {
    pub document: T,
    pub rows: usize,
    pub anomalies: usize,
}
