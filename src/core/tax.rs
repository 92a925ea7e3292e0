use super::error::{SimulationError, SimulationResult};
use super::types::TaxBracket;

/// Progressive bracket schedule whose lower bounds are known to be sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxSchedule {
    brackets: Vec<TaxBracket>,
}

impl TaxSchedule {
    pub fn new(brackets: &[TaxBracket]) -> SimulationResult<Self> {
        validate_brackets(brackets)?;
        Ok(Self {
            brackets: brackets.to_vec(),
        })
    }

    /// Tax owed on `income`, each dollar taxed once at the rate of its own bracket.
    pub fn tax_on(&self, income: f64) -> f64 {
        if income <= 0.0 {
            return 0.0;
        }

        let mut remaining_income = income;
        let mut tax = 0.0;
        for bracket in self.brackets.iter().rev() {
            if bracket.lower_bound >= remaining_income {
                continue;
            }
            tax += (remaining_income - bracket.lower_bound) * bracket.marginal_rate;
            remaining_income = bracket.lower_bound;
        }
        tax
    }
}

pub fn compute_tax(brackets: &[TaxBracket], income: f64) -> SimulationResult<f64> {
    Ok(TaxSchedule::new(brackets)?.tax_on(income))
}

fn validate_brackets(brackets: &[TaxBracket]) -> SimulationResult<()> {
    for (idx, bracket) in brackets.iter().enumerate() {
        if !bracket.lower_bound.is_finite() || bracket.lower_bound < 0.0 {
            return Err(SimulationError::InvalidInput(format!(
                "bracket {idx} lower bound must be a finite value >= 0"
            )));
        }
        if !(0.0..=1.0).contains(&bracket.marginal_rate) {
            return Err(SimulationError::InvalidInput(format!(
                "bracket {idx} marginal rate must be between 0 and 1"
            )));
        }
    }

    if brackets
        .windows(2)
        .any(|pair| pair[1].lower_bound < pair[0].lower_bound)
    {
        return Err(SimulationError::InvalidInput(
            "bracket lower bounds must be sorted ascending".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn federal_style() -> Vec<TaxBracket> {
        vec![
            TaxBracket::new(0.0, 0.10),
            TaxBracket::new(11_000.0, 0.12),
            TaxBracket::new(44_725.0, 0.22),
            TaxBracket::new(95_375.0, 0.24),
        ]
    }

    #[test]
    fn progressive_brackets_tax_each_slice_once() {
        let tax = compute_tax(&federal_style(), 60_000.0).expect("sorted table");
        // 11_000 * 0.10 + 33_725 * 0.12 + 15_275 * 0.22
        assert_approx(tax, 1_100.0 + 4_047.0 + 3_360.5);
    }

    #[test]
    fn income_on_bracket_boundary_uses_lower_brackets_only() {
        let tax = compute_tax(&federal_style(), 11_000.0).expect("sorted table");
        assert_approx(tax, 1_100.0);
    }

    #[test]
    fn top_bracket_is_open_ended() {
        let brackets = vec![TaxBracket::new(0.0, 0.0), TaxBracket::new(100.0, 0.5)];
        let tax = compute_tax(&brackets, 1_000_100.0).expect("sorted table");
        assert_approx(tax, 500_000.0);
    }

    #[test]
    fn zero_and_negative_income_owe_nothing() {
        assert_approx(compute_tax(&federal_style(), 0.0).unwrap(), 0.0);
        assert_approx(compute_tax(&federal_style(), -5_000.0).unwrap(), 0.0);
    }

    #[test]
    fn empty_table_means_zero_tax() {
        assert_approx(compute_tax(&[], 250_000.0).unwrap(), 0.0);
    }

    #[test]
    fn income_below_lowest_bound_owes_nothing() {
        let brackets = vec![TaxBracket::new(12_000.0, 0.2)];
        assert_approx(compute_tax(&brackets, 9_000.0).unwrap(), 0.0);
        assert_approx(compute_tax(&brackets, 12_000.0).unwrap(), 0.0);
    }

    #[test]
    fn unsorted_table_is_rejected() {
        let brackets = vec![TaxBracket::new(50_000.0, 0.3), TaxBracket::new(0.0, 0.1)];
        let err = compute_tax(&brackets, 10_000.0).expect_err("must reject unsorted table");
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let brackets = vec![TaxBracket::new(0.0, 1.5)];
        assert!(TaxSchedule::new(&brackets).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_flat_bracket_is_proportional(income in 0u32..2_000_000, rate_bp in 0u32..10_001) {
            let rate = rate_bp as f64 / 10_000.0;
            let tax = compute_tax(&[TaxBracket::new(0.0, rate)], income as f64).unwrap();
            prop_assert!((tax - income as f64 * rate).abs() <= 1e-6);
        }

        #[test]
        fn prop_tax_is_non_negative_and_monotonic(
            widths in proptest::collection::vec(1u32..80_000, 0..6),
            rates_bp in proptest::collection::vec(0u32..10_001, 7),
            income in 0u32..1_000_000,
            raise in 0u32..200_000
        ) {
            let mut lower = 0.0;
            let mut brackets = vec![TaxBracket::new(0.0, rates_bp[0] as f64 / 10_000.0)];
            for (idx, width) in widths.iter().enumerate() {
                lower += *width as f64;
                brackets.push(TaxBracket::new(lower, rates_bp[idx + 1] as f64 / 10_000.0));
            }
            let schedule = TaxSchedule::new(&brackets).unwrap();

            let low = schedule.tax_on(income as f64);
            let high = schedule.tax_on(income as f64 + raise as f64);
            prop_assert!(low >= 0.0);
            prop_assert!(high + 1e-9 >= low);
            prop_assert!(low <= income as f64 + 1e-9);
        }

        #[test]
        fn prop_tax_is_sum_of_clipped_slices(
            first_width in 1u32..60_000,
            second_width in 1u32..60_000,
            income in 0u32..400_000
        ) {
            let b1 = first_width as f64;
            let b2 = b1 + second_width as f64;
            let brackets = vec![
                TaxBracket::new(0.0, 0.1),
                TaxBracket::new(b1, 0.2),
                TaxBracket::new(b2, 0.3),
            ];
            let income = income as f64;
            let expected = income.min(b1) * 0.1
                + (income.min(b2) - b1).max(0.0) * 0.2
                + (income - b2).max(0.0) * 0.3;
            let tax = compute_tax(&brackets, income).unwrap();
            prop_assert!((tax - expected).abs() <= 1e-6);
        }
    }
}
