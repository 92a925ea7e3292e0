//! In-memory career and location tables that turn a household description
//! into fully-resolved [`SimulationParameters`].

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::{
    DEFAULT_DOWN_PAYMENT_FRACTION, DEFAULT_LOAN_FRACTION, DEFAULT_MORTGAGE_ANNUAL_RATE,
    DEFAULT_MORTGAGE_TERM_YEARS, HomeValueTable, InvestmentPlan, RiskProfile,
    SimulationParameters, SpendingPolicy, TaxBracket,
};

const HOME_VALUE_TIERS: std::ops::RangeInclusive<u64> = 1..=20;
const TIER_STEP_DOLLARS: u64 = 20_000;
const DEFAULT_RETIREMENT_CONTRIBUTION_RATE: f64 = 0.06;
const DEFAULT_TAXABLE_SWEEP_RATE: f64 = 0.5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown career '{0}'")]
    UnknownCareer(String),
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdProfile {
    pub career_id: String,
    pub location: String,
    pub spending_policy: SpendingPolicy,
    pub num_children: u32,
    pub child_years: Option<u32>,
    pub years: u32,
    pub num_samples: u32,
    pub random_seed: Option<u64>,
    pub risk_profile: Option<RiskProfile>,
}

pub trait ParameterResolver {
    fn resolve(&self, profile: &HouseholdProfile) -> Result<SimulationParameters, ResolveError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerProfile {
    pub id: String,
    pub title: String,
    pub category: String,
    pub starting_salary: f64,
    pub salary_growth_mean: f64,
    pub salary_growth_stdev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationProfile {
    pub id: String,
    pub tax_brackets: Vec<TaxBracket>,
    pub home_growth_rate: f64,
    pub salary_to_buy_house: f64,
    pub annual_child_cost: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    careers: BTreeMap<String, CareerProfile>,
    locations: BTreeMap<String, LocationProfile>,
    salary_tiers: Vec<u64>,
}

impl Catalog {
    pub fn new(salary_tiers: impl IntoIterator<Item = u64>) -> Self {
        Self {
            careers: BTreeMap::new(),
            locations: BTreeMap::new(),
            salary_tiers: salary_tiers.into_iter().collect(),
        }
    }

    pub fn add_career(&mut self, career: CareerProfile) {
        self.careers.insert(career.id.clone(), career);
    }

    pub fn add_location(&mut self, location: LocationProfile) {
        self.locations.insert(location.id.clone(), location);
    }

    pub fn careers(&self) -> impl Iterator<Item = &CareerProfile> {
        self.careers.values()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new(HOME_VALUE_TIERS.map(|tier| tier * TIER_STEP_DOLLARS));

        for (id, title, category, starting_salary, growth_mean, growth_stdev) in [
            ("software_engineer", "Software Engineer", "math_computers", 110_000.0, 0.045, 0.03),
            ("registered_nurse", "Registered Nurse", "healthcare", 77_000.0, 0.03, 0.02),
            ("elementary_teacher", "Elementary School Teacher", "education", 48_000.0, 0.025, 0.015),
            ("accountant", "Accountant", "business_finance", 62_000.0, 0.035, 0.025),
            ("electrician", "Electrician", "construction", 52_000.0, 0.03, 0.02),
            ("civil_engineer", "Civil Engineer", "architecture_engineering", 72_000.0, 0.035, 0.02),
        ] {
            catalog.add_career(CareerProfile {
                id: id.to_string(),
                title: title.to_string(),
                category: category.to_string(),
                starting_salary,
                salary_growth_mean: growth_mean,
                salary_growth_stdev: growth_stdev,
            });
        }

        for (id, surcharge, home_growth_rate, salary_to_buy_house, annual_child_cost) in [
            ("washington_dc", 0.06, 0.035, 120_000.0, 18_000.0),
            ("austin_tx", 0.0, 0.04, 90_000.0, 14_000.0),
            ("chicago_il", 0.0495, 0.03, 100_000.0, 15_500.0),
            ("seattle_wa", 0.0, 0.045, 130_000.0, 17_000.0),
        ] {
            catalog.add_location(LocationProfile {
                id: id.to_string(),
                tax_brackets: federal_brackets(surcharge),
                home_growth_rate,
                salary_to_buy_house,
                annual_child_cost,
            });
        }

        catalog
    }
}

/// Federal single-filer schedule with a flat local rate layered on every bracket.
fn federal_brackets(local_rate: f64) -> Vec<TaxBracket> {
    [
        (0.0, 0.10),
        (11_000.0, 0.12),
        (44_725.0, 0.22),
        (95_375.0, 0.24),
        (182_100.0, 0.32),
        (231_250.0, 0.35),
        (578_125.0, 0.37),
    ]
    .into_iter()
    .map(|(lower_bound, rate)| TaxBracket::new(lower_bound, rate + local_rate))
    .collect()
}

impl ParameterResolver for Catalog {
    fn resolve(&self, profile: &HouseholdProfile) -> Result<SimulationParameters, ResolveError> {
        let career = self
            .careers
            .get(&profile.career_id)
            .ok_or_else(|| ResolveError::UnknownCareer(profile.career_id.clone()))?;
        let location = self
            .locations
            .get(&profile.location)
            .ok_or_else(|| ResolveError::UnknownLocation(profile.location.clone()))?;

        let hv_to_salary_ratio = profile.spending_policy.home_value_multiple();
        let home_value_lookup = HomeValueTable::new().with_column(
            profile.spending_policy,
            hv_to_salary_ratio,
            self.salary_tiers.iter().copied(),
        );
        let investments = profile.risk_profile.map(|risk| InvestmentPlan {
            retirement_contribution_rate: DEFAULT_RETIREMENT_CONTRIBUTION_RATE,
            taxable_sweep_rate: DEFAULT_TAXABLE_SWEEP_RATE,
            ..InvestmentPlan::for_risk(risk)
        });

        Ok(SimulationParameters {
            starting_salary: career.starting_salary,
            salary_growth_mean: career.salary_growth_mean,
            salary_growth_stdev: career.salary_growth_stdev,
            home_growth_rate: location.home_growth_rate,
            salary_to_buy_house: location.salary_to_buy_house,
            hv_to_salary_ratio,
            down_payment_fraction: DEFAULT_DOWN_PAYMENT_FRACTION,
            loan_fraction: DEFAULT_LOAN_FRACTION,
            mortgage_annual_rate: DEFAULT_MORTGAGE_ANNUAL_RATE,
            mortgage_term_years: DEFAULT_MORTGAGE_TERM_YEARS,
            annual_child_cost: location.annual_child_cost,
            num_children: profile.num_children,
            child_years: profile.child_years,
            spending_policy: profile.spending_policy,
            tax_bracket_table: location.tax_brackets.clone(),
            home_value_lookup,
            investments,
            years: profile.years,
            num_samples: profile.num_samples,
            random_seed: profile.random_seed,
        })
    }
}
