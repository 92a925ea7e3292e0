use super::error::{SimulationError, SimulationResult};
use super::types::{PercentileValue, SimulationSummary};

pub const DEFAULT_PERCENTILES: [f64; 3] = [10.0, 50.0, 90.0];

/// Mean and population standard deviation of terminal net worth.
pub fn summarize(net_worths: &[f64]) -> SimulationResult<SimulationSummary> {
    summarize_with_percentiles(net_worths, &[])
}

pub fn summarize_with_percentiles(
    net_worths: &[f64],
    percentiles: &[f64],
) -> SimulationResult<SimulationSummary> {
    if net_worths.is_empty() {
        return Err(SimulationError::InvalidInput(
            "cannot summarize an empty sample set".to_string(),
        ));
    }
    if let Some(p) = percentiles.iter().find(|p| !(0.0..=100.0).contains(*p)) {
        return Err(SimulationError::InvalidInput(format!(
            "percentile {p} must be between 0 and 100"
        )));
    }

    let n = net_worths.len() as f64;
    let mean = net_worths.iter().sum::<f64>() / n;
    let variance = net_worths
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / n;
    let stdev = variance.sqrt();

    let mut sorted = net_worths.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(SimulationSummary {
        mean_net_worth: mean,
        stdev_net_worth: stdev,
        standard_error: stdev / n.sqrt(),
        sample_count: net_worths.len(),
        min_net_worth: sorted[0],
        max_net_worth: sorted[sorted.len() - 1],
        percentiles: percentiles
            .iter()
            .map(|&p| PercentileValue {
                percentile: p,
                value: percentile_of_sorted(&sorted, p),
            })
            .collect(),
    })
}

pub(crate) fn percentile(values: &mut [f64], p: f64) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    percentile_of_sorted(values, p)
}

fn percentile_of_sorted(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}
