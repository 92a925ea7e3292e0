use super::mortgage::{apply_payment, level_payment};
use super::types::{
    HomeValueTable, RENT_TO_INCOME_RATIO, SALARY_TIER_STEP, SimulationParameters, SpendingPolicy,
};

/// A purchase whose salary tier had no home-value entry and fell back to the lowest tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataGap {
    pub requested_tier: u64,
    pub fallback_tier: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeValueLookup {
    pub home_value: f64,
    pub gap: Option<DataGap>,
}

pub fn salary_tier(salary: f64) -> u64 {
    ((salary.max(0.0) / SALARY_TIER_STEP).round() * SALARY_TIER_STEP) as u64
}

/// Returns `None` only when the policy column is empty.
pub fn lookup_home_value(
    table: &HomeValueTable,
    policy: SpendingPolicy,
    salary: f64,
) -> Option<HomeValueLookup> {
    let column = table.column(policy);
    let requested_tier = salary_tier(salary);
    if let Some(&home_value) = column.get(&requested_tier) {
        return Some(HomeValueLookup {
            home_value,
            gap: None,
        });
    }

    column
        .iter()
        .next()
        .map(|(&fallback_tier, &home_value)| HomeValueLookup {
            home_value,
            gap: Some(DataGap {
                requested_tier,
                fallback_tier,
            }),
        })
}

#[derive(Debug, Clone, Copy)]
pub struct HousingTerms<'a> {
    pub salary_to_buy_house: f64,
    pub home_growth_rate: f64,
    pub down_payment_fraction: f64,
    pub loan_fraction: f64,
    pub mortgage_annual_rate: f64,
    pub mortgage_term_years: u32,
    pub spending_policy: SpendingPolicy,
    pub home_value_lookup: &'a HomeValueTable,
}

impl<'a> HousingTerms<'a> {
    pub fn from_params(params: &'a SimulationParameters) -> Self {
        Self {
            salary_to_buy_house: params.salary_to_buy_house,
            home_growth_rate: params.home_growth_rate,
            down_payment_fraction: params.down_payment_fraction,
            loan_fraction: params.loan_fraction,
            mortgage_annual_rate: params.mortgage_annual_rate,
            mortgage_term_years: params.mortgage_term_years,
            spending_policy: params.spending_policy,
            home_value_lookup: &params.home_value_lookup,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HousingYear {
    pub cash_outflow: f64,
    pub purchased: bool,
    pub data_gap: Option<DataGap>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HousingState {
    Renting,
    Owning {
        home_value: f64,
        mortgage_balance: f64,
        annual_payment: f64,
    },
}

impl HousingState {
    /// Moves the household through one year at the given (already grown) salary.
    pub fn advance(&mut self, salary: f64, terms: &HousingTerms<'_>) -> HousingYear {
        match *self {
            HousingState::Renting => self.advance_renting(salary, terms),
            HousingState::Owning {
                home_value,
                mortgage_balance,
                annual_payment,
            } => {
                let home_value = home_value * (1.0 + terms.home_growth_rate);
                let split = apply_payment(
                    mortgage_balance,
                    terms.mortgage_annual_rate,
                    annual_payment,
                );
                *self = HousingState::Owning {
                    home_value,
                    mortgage_balance: split.new_balance,
                    annual_payment,
                };
                HousingYear {
                    cash_outflow: split.effective_payment,
                    purchased: false,
                    data_gap: None,
                }
            }
        }
    }

    fn advance_renting(&mut self, salary: f64, terms: &HousingTerms<'_>) -> HousingYear {
        let rent = HousingYear {
            cash_outflow: RENT_TO_INCOME_RATIO * salary,
            purchased: false,
            data_gap: None,
        };
        if salary < terms.salary_to_buy_house {
            return rent;
        }

        let Some(lookup) = lookup_home_value(terms.home_value_lookup, terms.spending_policy, salary)
        else {
            return rent;
        };

        let mortgage_balance = terms.loan_fraction * lookup.home_value;
        *self = HousingState::Owning {
            home_value: lookup.home_value,
            mortgage_balance,
            annual_payment: level_payment(
                mortgage_balance,
                terms.mortgage_annual_rate,
                terms.mortgage_term_years,
            ),
        };
        HousingYear {
            cash_outflow: terms.down_payment_fraction * lookup.home_value,
            purchased: true,
            data_gap: lookup.gap,
        }
    }

    pub fn is_owning(&self) -> bool {
        matches!(self, HousingState::Owning { .. })
    }

    pub fn home_value(&self) -> f64 {
        match self {
            HousingState::Renting => 0.0,
            HousingState::Owning { home_value, .. } => *home_value,
        }
    }

    pub fn mortgage_balance(&self) -> f64 {
        match self {
            HousingState::Renting => 0.0,
            HousingState::Owning {
                mortgage_balance, ..
            } => *mortgage_balance,
        }
    }

    pub fn equity(&self) -> f64 {
        self.home_value() - self.mortgage_balance()
    }
}
