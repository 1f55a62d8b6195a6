use crate::model::{DepositLimit, SchemeDefinition, TaxExemption};
use crate::text;
use regex::Regex;

/// Closed set of small-savings instruments India Post publishes rates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    SavingsAccount,
    TimeDeposit { years: u32 },
    RecurringDeposit,
    SeniorCitizenSavings,
    MonthlyIncome,
    NationalSavingsCertificate,
    PublicProvidentFund,
    KisanVikasPatra,
    MahilaSammanSavings,
    SukanyaSamriddhi,
}

type KindRule = fn(&str) -> Option<SchemeKind>;

/// Ordered: the deposit rules run before the certificate rules, and the
/// bare savings-account rule runs last so it cannot shadow anything.
const KIND_RULES: &[KindRule] = &[
    time_deposit_rule,
    recurring_deposit_rule,
    |t| contains(t, "national savings certificate", SchemeKind::NationalSavingsCertificate),
    |t| contains(t, "mahila samman", SchemeKind::MahilaSammanSavings),
    |t| contains(t, "sukanya samriddhi", SchemeKind::SukanyaSamriddhi),
    |t| contains(t, "public provident fund", SchemeKind::PublicProvidentFund),
    |t| contains(t, "senior citizen", SchemeKind::SeniorCitizenSavings),
    |t| contains(t, "monthly income", SchemeKind::MonthlyIncome),
    |t| contains(t, "kisan vikas patra", SchemeKind::KisanVikasPatra),
    |t| contains(t, "savings account", SchemeKind::SavingsAccount),
];

fn contains(text: &str, needle: &str, kind: SchemeKind) -> Option<SchemeKind> {
    text.contains(needle).then_some(kind)
}

fn time_deposit_rule(text: &str) -> Option<SchemeKind> {
    if !text.contains("time deposit") {
        return None;
    }
    let tenure = Regex::new(r"(\d+)\s*year\s*time\s*deposit").expect("tenure regex must be valid");
    let years = tenure
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0);
    Some(SchemeKind::TimeDeposit { years })
}

fn recurring_deposit_rule(text: &str) -> Option<SchemeKind> {
    text.contains("recurring deposit")
        .then_some(SchemeKind::RecurringDeposit)
}

pub fn classify_kind(instrument_text: &str) -> Option<SchemeKind> {
    let normalized = text::normalize(instrument_text).to_lowercase();
    KIND_RULES.iter().find_map(|rule| rule(&normalized))
}

/// Unrecognized text yields the degenerate zero-valued definition, never an
/// error; callers filter on a non-empty code.
pub fn classify(instrument_text: &str) -> SchemeDefinition {
    match classify_kind(instrument_text) {
        Some(kind) => kind.definition(),
        None => SchemeDefinition::default(),
    }
}

impl SchemeKind {
    /// Regulatory constants per instrument: tenures, payout frequency,
    /// section 80C / interest exemptions and deposit limits, as published
    /// by India Post. A payout frequency of 0 means interest compounds to
    /// maturity instead of being paid out.
    pub fn definition(self) -> SchemeDefinition {
        match self {
            SchemeKind::SavingsAccount => SchemeDefinition {
                code: "SB".to_string(),
                name: "Post Office Savings Account".to_string(),
                recurring: false,
                deposit_tenure_years: 0,
                maturity_tenure_years: 0,
                interest_payout_frequency_per_year: 1,
                fixed_interest_rate: false,
                tax_exemption: exemption(0, 3_500),
                deposit_limit: limit(500, 0, 0, 1),
            },
            SchemeKind::TimeDeposit { years } => SchemeDefinition {
                code: if years == 0 {
                    "TD".to_string()
                } else {
                    format!("TD-{years}Y")
                },
                name: "Time Deposit".to_string(),
                recurring: false,
                deposit_tenure_years: years,
                maturity_tenure_years: years,
                interest_payout_frequency_per_year: 1,
                fixed_interest_rate: true,
                tax_exemption: if years == 5 {
                    exemption(150_000, 0)
                } else {
                    exemption(0, 0)
                },
                deposit_limit: limit(1_000, 0, 0, 100),
            },
            SchemeKind::RecurringDeposit => SchemeDefinition {
                code: "RD".to_string(),
                name: "Recurring Deposit".to_string(),
                recurring: true,
                deposit_tenure_years: 5,
                maturity_tenure_years: 5,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: true,
                tax_exemption: exemption(0, 0),
                deposit_limit: limit(100, 0, 0, 10),
            },
            SchemeKind::SeniorCitizenSavings => SchemeDefinition {
                code: "SCSS".to_string(),
                name: "Senior Citizen Savings Scheme".to_string(),
                recurring: false,
                deposit_tenure_years: 5,
                maturity_tenure_years: 5,
                interest_payout_frequency_per_year: 4,
                fixed_interest_rate: true,
                tax_exemption: exemption(150_000, 50_000),
                deposit_limit: limit(1_000, 3_000_000, 3_000_000, 1_000),
            },
            SchemeKind::MonthlyIncome => SchemeDefinition {
                code: "MIS".to_string(),
                name: "Monthly Income Account".to_string(),
                recurring: false,
                deposit_tenure_years: 5,
                maturity_tenure_years: 5,
                interest_payout_frequency_per_year: 12,
                fixed_interest_rate: true,
                tax_exemption: exemption(0, 0),
                deposit_limit: limit(1_000, 900_000, 1_500_000, 1_000),
            },
            SchemeKind::NationalSavingsCertificate => SchemeDefinition {
                code: "NSC".to_string(),
                name: "National Savings Certificate (VIII Issue)".to_string(),
                recurring: false,
                deposit_tenure_years: 5,
                maturity_tenure_years: 5,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: true,
                tax_exemption: exemption(150_000, 0),
                deposit_limit: limit(1_000, 0, 0, 100),
            },
            SchemeKind::PublicProvidentFund => SchemeDefinition {
                code: "PPF".to_string(),
                name: "Public Provident Fund".to_string(),
                recurring: false,
                deposit_tenure_years: 15,
                maturity_tenure_years: 15,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: false,
                tax_exemption: exemption(150_000, 0),
                deposit_limit: limit(500, 150_000, 0, 50),
            },
            SchemeKind::KisanVikasPatra => SchemeDefinition {
                code: "KVP".to_string(),
                name: "Kisan Vikas Patra".to_string(),
                recurring: false,
                // maturity comes from the published rate row, which labels
                // the doubling period in months
                deposit_tenure_years: 0,
                maturity_tenure_years: 0,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: true,
                tax_exemption: exemption(0, 0),
                deposit_limit: limit(1_000, 0, 0, 100),
            },
            SchemeKind::MahilaSammanSavings => SchemeDefinition {
                code: "MSSC".to_string(),
                name: "Mahila Samman Savings Certificate".to_string(),
                recurring: false,
                deposit_tenure_years: 2,
                maturity_tenure_years: 2,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: true,
                tax_exemption: exemption(0, 0),
                deposit_limit: limit(1_000, 200_000, 0, 100),
            },
            SchemeKind::SukanyaSamriddhi => SchemeDefinition {
                code: "SSA".to_string(),
                name: "Sukanya Samriddhi Account".to_string(),
                recurring: false,
                deposit_tenure_years: 15,
                maturity_tenure_years: 21,
                interest_payout_frequency_per_year: 0,
                fixed_interest_rate: false,
                tax_exemption: exemption(150_000, 0),
                deposit_limit: limit(250, 150_000, 0, 50),
            },
        }
    }

    /// Historic tables carry one table for the whole time-deposit family.
    pub fn family_code(self) -> String {
        match self {
            SchemeKind::TimeDeposit { .. } => "TD".to_string(),
            other => other.definition().code,
        }
    }
}

fn exemption(principal_cap_amount: u64, interest_exempt_amount: u64) -> TaxExemption {
    TaxExemption {
        principal_cap_amount,
        interest_exempt_amount,
    }
}

fn limit(min: u64, max_individual: u64, max_joint: u64, multiples: u64) -> DepositLimit {
    DepositLimit {
        min,
        max_individual,
        max_joint,
        multiples,
    }
}

/// What a closed band deducts from the scheme rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PenaltyDeduction {
    /// The savings-account rate of the same batch applies instead.
    SavingsRate,
    /// No interest is payable at all.
    NoInterest,
    /// Flat percentage-point deduction from the scheme rate.
    Percent(f64),
}

#[derive(Debug, Clone, Copy)]
pub struct PenaltyBandSpec {
    pub from_day: u32,
    /// 0 = unbounded.
    pub to_day: u32,
    pub deduction: PenaltyDeduction,
}

const TD_ONE_YEAR: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 180,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 181,
        to_day: 0,
        deduction: PenaltyDeduction::SavingsRate,
    },
];

const TD_MULTI_YEAR: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 180,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 181,
        to_day: 365,
        deduction: PenaltyDeduction::SavingsRate,
    },
    PenaltyBandSpec {
        from_day: 366,
        to_day: 0,
        deduction: PenaltyDeduction::Percent(2.0),
    },
];

const RECURRING: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 1_095,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 1_096,
        to_day: 0,
        deduction: PenaltyDeduction::SavingsRate,
    },
];

const SENIOR_CITIZEN: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 365,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 366,
        to_day: 730,
        deduction: PenaltyDeduction::Percent(1.5),
    },
    PenaltyBandSpec {
        from_day: 731,
        to_day: 0,
        deduction: PenaltyDeduction::Percent(1.0),
    },
];

const MONTHLY_INCOME: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 365,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 366,
        to_day: 1_095,
        deduction: PenaltyDeduction::Percent(2.0),
    },
    PenaltyBandSpec {
        from_day: 1_096,
        to_day: 0,
        deduction: PenaltyDeduction::Percent(1.0),
    },
];

const MAHILA_SAMMAN: &[PenaltyBandSpec] = &[
    PenaltyBandSpec {
        from_day: 0,
        to_day: 180,
        deduction: PenaltyDeduction::NoInterest,
    },
    PenaltyBandSpec {
        from_day: 181,
        to_day: 0,
        deduction: PenaltyDeduction::Percent(2.0),
    },
];

/// Premature-closure schedule per instrument. Certificates and the
/// girl-child account settle by their own closure rules rather than a rate
/// deduction, so they carry no bands.
pub fn penalty_schedule(kind: SchemeKind) -> &'static [PenaltyBandSpec] {
    match kind {
        SchemeKind::TimeDeposit { years } if years <= 1 => TD_ONE_YEAR,
        SchemeKind::TimeDeposit { .. } => TD_MULTI_YEAR,
        SchemeKind::RecurringDeposit => RECURRING,
        SchemeKind::SeniorCitizenSavings => SENIOR_CITIZEN,
        SchemeKind::MonthlyIncome => MONTHLY_INCOME,
        SchemeKind::MahilaSammanSavings => MAHILA_SAMMAN,
        SchemeKind::SavingsAccount
        | SchemeKind::NationalSavingsCertificate
        | SchemeKind::PublicProvidentFund
        | SchemeKind::KisanVikasPatra
        | SchemeKind::SukanyaSamriddhi => &[],
    }
}
