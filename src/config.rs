use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, ValueEnum};
use thiserror::Error;

use crate::core::{RiskProfile, SpendingPolicy};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAX_SAMPLES: u32 = 100_000;
pub const DEFAULT_MAX_YEARS: u32 = 60;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--{0} must be > 0")]
    NonPositive(&'static str),
}

#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    #[arg(long, env = "NETWORTH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    #[arg(
        long,
        env = "NETWORTH_MAX_SAMPLES",
        default_value_t = DEFAULT_MAX_SAMPLES,
        help = "Largest sample count a single request may ask for"
    )]
    pub max_samples: u32,
    #[arg(
        long,
        env = "NETWORTH_MAX_YEARS",
        default_value_t = DEFAULT_MAX_YEARS,
        help = "Longest horizon a single request may ask for"
    )]
    pub max_years: u32,
    #[arg(
        long,
        env = "NETWORTH_REQUEST_TIMEOUT_MS",
        default_value_t = DEFAULT_REQUEST_TIMEOUT_MS,
        help = "Wall-clock budget per simulation; the run is cancelled when exceeded"
    )]
    pub request_timeout_ms: u64,
    #[arg(long, help = "Run trials on one thread instead of the worker pool")]
    pub sequential: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_samples: DEFAULT_MAX_SAMPLES,
            max_years: DEFAULT_MAX_YEARS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            sequential: false,
        }
    }
}

impl ServeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_samples == 0 {
            return Err(ConfigError::NonPositive("max-samples"));
        }
        if self.max_years == 0 {
            return Err(ConfigError::NonPositive("max-years"));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::NonPositive("request-timeout-ms"));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliSpendingPolicy {
    Eager,
    Conservative,
}

impl From<CliSpendingPolicy> for SpendingPolicy {
    fn from(value: CliSpendingPolicy) -> Self {
        match value {
            CliSpendingPolicy::Eager => SpendingPolicy::Eager,
            CliSpendingPolicy::Conservative => SpendingPolicy::Conservative,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliRiskProfile {
    Low,
    Medium,
    High,
}

impl From<CliRiskProfile> for RiskProfile {
    fn from(value: CliRiskProfile) -> Self {
        match value {
            CliRiskProfile::Low => RiskProfile::Low,
            CliRiskProfile::Medium => RiskProfile::Medium,
            CliRiskProfile::High => RiskProfile::High,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    #[arg(long, default_value = "software_engineer")]
    pub career: String,
    #[arg(long, default_value = "washington_dc")]
    pub location: String,
    #[arg(long, value_enum, default_value_t = CliSpendingPolicy::Conservative)]
    pub spending_policy: CliSpendingPolicy,
    #[arg(long, default_value_t = 0)]
    pub children: u32,
    #[arg(long, help = "Years that carry child costs; defaults to every simulated year")]
    pub child_years: Option<u32>,
    #[arg(long, default_value_t = 10)]
    pub years: u32,
    #[arg(long, default_value_t = 10_000)]
    pub samples: u32,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, value_enum, help = "Adds retirement and taxable accounts at this risk level")]
    pub risk_profile: Option<CliRiskProfile>,
    #[arg(long, value_delimiter = ',', default_values_t = [10.0, 50.0, 90.0])]
    pub percentiles: Vec<f64>,
    #[arg(long, help = "Include per-year medians in the output")]
    pub trace: bool,
    #[arg(long)]
    pub sequential: bool,
}
