//! Payroll policy configuration loaded from payroll.toml
//!
//! One deployment runs one deduction scheme and one meal allowance formula. The
//! file selects them, sets the penalty rates and carries the probation salary
//! matrix. Every section is optional; anything left out keeps the documented
//! default below.
//!
//! ```toml
//! cutoff_day = 25
//!
//! [penalties]
//! sick = 50000
//! permission = 50000
//! absent = 50000
//! saturday_off = 10000
//! late_present = 0
//!
//! [meal_allowance]
//! mode = "per_day_present"
//!
//! [[probation_rates]]
//! experience = "experienced"
//! outlet = "dine_in"
//! month = 1
//! rate = 2000000
//! ```

use crate::core::attendance::{MealAllowancePolicy, PenaltyRates};
use crate::core::wage::ProbationMatrix;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Day of month used as the reference date for tenure counting
pub const DEFAULT_CUTOFF_DAY: u32 = 25;

/// Payroll policy for one deployment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Day of the period's end month at which tenure months are counted
    pub cutoff_day: u32,
    /// Flat per-occurrence attendance penalties
    pub penalties: PenaltyRates,
    /// Which meal allowance formula this deployment uses
    pub meal_allowance: MealAllowancePolicy,
    /// Salary overrides for the first three months of tenure
    pub probation_rates: ProbationMatrix,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            cutoff_day: DEFAULT_CUTOFF_DAY,
            penalties: PenaltyRates::default(),
            meal_allowance: MealAllowancePolicy::default(),
            probation_rates: ProbationMatrix::default(),
        }
    }
}

impl PayrollConfig {
    fn validate(self) -> Result<Self> {
        if !(1..=31).contains(&self.cutoff_day) {
            return Err(Error::Config {
                message: format!("cutoff_day must be between 1 and 31, got {}", self.cutoff_day),
            });
        }
        self.penalties.validate()?;
        self.meal_allowance.validate()?;
        Ok(self)
    }
}

/// Parses payroll configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML is malformed or a value is out of range.
pub fn parse_config(contents: &str) -> Result<PayrollConfig> {
    let config: PayrollConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse payroll config: {e}"),
    })?;
    config.validate()
}

/// Loads payroll configuration from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A rate, cutoff day or probation month is out of range
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PayrollConfig> {
    let path_ref = path.as_ref();
    debug!("Loading payroll configuration from {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)?;
    parse_config(&contents)
}

/// Loads payroll configuration, falling back to the defaults when the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<PayrollConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        info!(
            "No payroll config at {}, using built-in defaults",
            path_ref.display()
        );
        Ok(PayrollConfig::default())
    }
}
