mod engine;
mod error;
mod housing;
mod mortgage;
mod summary;
mod tax;
mod types;

pub use engine::{RunOptions, run, run_with_options, run_yearly_trace};
pub use error::{SimulationError, SimulationResult};
pub use housing::{
    DataGap, HomeValueLookup, HousingState, HousingTerms, HousingYear, lookup_home_value,
    salary_tier,
};
pub use mortgage::{PaymentSplit, apply_payment, level_payment};
pub use summary::{DEFAULT_PERCENTILES, summarize, summarize_with_percentiles};
pub use tax::{TaxSchedule, compute_tax};
pub use types::{
    DEFAULT_DOWN_PAYMENT_FRACTION, DEFAULT_LOAN_FRACTION, DEFAULT_MORTGAGE_ANNUAL_RATE,
    DEFAULT_MORTGAGE_TERM_YEARS, HomeValueTable, InvestmentPlan, PercentileValue,
    RENT_TO_INCOME_RATIO, RiskProfile, RunDiagnostics, SALARY_TIER_STEP, SimulationParameters,
    SimulationRun, SimulationSummary, SpendingPolicy, TaxBracket, YearTraceRow,
};
