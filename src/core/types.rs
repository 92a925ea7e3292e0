use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const SALARY_TIER_STEP: f64 = 20_000.0;
pub const RENT_TO_INCOME_RATIO: f64 = 0.3;
pub const DEFAULT_DOWN_PAYMENT_FRACTION: f64 = 0.09;
pub const DEFAULT_LOAN_FRACTION: f64 = 0.91;
pub const DEFAULT_MORTGAGE_ANNUAL_RATE: f64 = 0.05;
pub const DEFAULT_MORTGAGE_TERM_YEARS: u32 = 30;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpendingPolicy {
    Eager,
    Conservative,
}

impl SpendingPolicy {
    pub fn spending_fraction(self) -> f64 {
        match self {
            SpendingPolicy::Eager => 0.5,
            SpendingPolicy::Conservative => 0.4,
        }
    }

    /// Home value as a multiple of salary, selecting the home-value lookup column.
    pub fn home_value_multiple(self) -> f64 {
        match self {
            SpendingPolicy::Eager => 3.0,
            SpendingPolicy::Conservative => 2.5,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskProfile {
    Low,
    Medium,
    High,
}

impl RiskProfile {
    pub fn return_distribution(self) -> (f64, f64) {
        match self {
            RiskProfile::Low => (0.04, 0.07),
            RiskProfile::Medium => (0.06, 0.12),
            RiskProfile::High => (0.08, 0.18),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub lower_bound: f64,
    pub marginal_rate: f64,
}

impl TaxBracket {
    pub fn new(lower_bound: f64, marginal_rate: f64) -> Self {
        Self {
            lower_bound,
            marginal_rate,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeValueTable {
    eager: BTreeMap<u64, f64>,
    conservative: BTreeMap<u64, f64>,
}

impl HomeValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds both columns from salary tiers using each policy's home-value multiple.
    pub fn from_tiers(tiers: impl IntoIterator<Item = u64> + Clone) -> Self {
        [SpendingPolicy::Eager, SpendingPolicy::Conservative]
            .into_iter()
            .fold(Self::new(), |table, policy| {
                table.with_column(policy, policy.home_value_multiple(), tiers.clone())
            })
    }

    pub fn with_column(
        mut self,
        policy: SpendingPolicy,
        hv_to_salary_ratio: f64,
        tiers: impl IntoIterator<Item = u64>,
    ) -> Self {
        for tier in tiers {
            self.insert(policy, tier, tier as f64 * hv_to_salary_ratio);
        }
        self
    }

    pub fn insert(&mut self, policy: SpendingPolicy, tier: u64, home_value: f64) {
        self.column_mut(policy).insert(tier, home_value);
    }

    pub fn column(&self, policy: SpendingPolicy) -> &BTreeMap<u64, f64> {
        match policy {
            SpendingPolicy::Eager => &self.eager,
            SpendingPolicy::Conservative => &self.conservative,
        }
    }

    fn column_mut(&mut self, policy: SpendingPolicy) -> &mut BTreeMap<u64, f64> {
        match policy {
            SpendingPolicy::Eager => &mut self.eager,
            SpendingPolicy::Conservative => &mut self.conservative,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentPlan {
    pub return_mean: f64,
    pub return_stdev: f64,
    pub retirement_start: f64,
    pub taxable_start: f64,
    pub retirement_contribution_rate: f64,
    pub taxable_sweep_rate: f64,
}

impl InvestmentPlan {
    pub fn for_risk(profile: RiskProfile) -> Self {
        let (return_mean, return_stdev) = profile.return_distribution();
        Self {
            return_mean,
            return_stdev,
            retirement_start: 0.0,
            taxable_start: 0.0,
            retirement_contribution_rate: 0.0,
            taxable_sweep_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParameters {
    pub starting_salary: f64,
    pub salary_growth_mean: f64,
    pub salary_growth_stdev: f64,
    pub home_growth_rate: f64,
    pub salary_to_buy_house: f64,
    /// Multiple of the salary tier that prices each home in `home_value_lookup`.
    pub hv_to_salary_ratio: f64,
    pub down_payment_fraction: f64,
    pub loan_fraction: f64,
    pub mortgage_annual_rate: f64,
    pub mortgage_term_years: u32,
    pub annual_child_cost: f64,
    pub num_children: u32,
    /// Number of leading years that carry child costs; `None` charges every year.
    pub child_years: Option<u32>,
    pub spending_policy: SpendingPolicy,
    pub tax_bracket_table: Vec<TaxBracket>,
    pub home_value_lookup: HomeValueTable,
    pub investments: Option<InvestmentPlan>,
    pub years: u32,
    pub num_samples: u32,
    pub random_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub mean_net_worth: f64,
    pub stdev_net_worth: f64,
    pub standard_error: f64,
    pub sample_count: usize,
    pub min_net_worth: f64,
    pub max_net_worth: f64,
    pub percentiles: Vec<PercentileValue>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunDiagnostics {
    pub samples: u32,
    pub purchases: u32,
    /// Purchases whose salary tier was missing from the lookup and fell back.
    pub data_gaps: u32,
    pub base_seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub net_worths: Vec<f64>,
    pub diagnostics: RunDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTraceRow {
    pub year: u32,
    pub median_salary: f64,
    pub median_tax: f64,
    pub median_housing_outflow: f64,
    pub median_spending: f64,
    pub median_child_cost: f64,
    pub median_cash_delta: f64,
    pub median_net_worth: f64,
    pub owning_fraction: f64,
}
