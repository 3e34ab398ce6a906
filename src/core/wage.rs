//! Wage rate resolution.
//!
//! Confirmed staff are paid the contract's nominal rate. During the first three
//! months of tenure the rate comes from the probation salary matrix instead,
//! keyed by experience level, outlet type and tenure month.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of tenure months covered by the probation matrix
pub const PROBATION_MONTHS: u32 = 3;

/// Whether the employee had restaurant experience when hired
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    /// Hired with prior experience
    Experienced,
    /// Hired without prior experience
    #[serde(alias = "non_experienced")]
    Inexperienced,
}

impl ExperienceLevel {
    /// Parses the value stored on a contract. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "experienced" => Some(Self::Experienced),
            "inexperienced" | "non_experienced" | "non-experienced" => Some(Self::Inexperienced),
            _ => None,
        }
    }
}

/// Service format of the outlet the employee works at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutletType {
    /// Full-service dine-in outlet
    #[serde(alias = "dine-in")]
    DineIn,
    /// Express / takeaway outlet
    Express,
}

impl OutletType {
    /// Parses the value stored on a contract. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dine_in" | "dine-in" | "dinein" => Some(Self::DineIn),
            "express" => Some(Self::Express),
            _ => None,
        }
    }
}

/// The (experience, outlet) pair that selects a row of the probation matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WageTier {
    /// Experience level at hire
    pub experience: ExperienceLevel,
    /// Outlet format
    pub outlet: OutletType,
}

impl WageTier {
    /// Tier used when a contract carries an unrecognised experience or outlet value.
    pub const DEFAULT: Self = Self {
        experience: ExperienceLevel::Inexperienced,
        outlet: OutletType::DineIn,
    };

    /// Builds the tier from contract text, substituting the default for unknown parts.
    #[must_use]
    pub fn from_contract(experience_level: &str, outlet_type: &str) -> Self {
        Self {
            experience: ExperienceLevel::parse(experience_level)
                .unwrap_or(Self::DEFAULT.experience),
            outlet: OutletType::parse(outlet_type).unwrap_or(Self::DEFAULT.outlet),
        }
    }
}

impl Default for WageTier {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let experience = match self.experience {
            ExperienceLevel::Experienced => "experienced",
            ExperienceLevel::Inexperienced => "inexperienced",
        };
        let outlet = match self.outlet {
            OutletType::DineIn => "dine-in",
            OutletType::Express => "express",
        };
        write!(f, "{experience}/{outlet}")
    }
}

/// One row of the probation matrix as written in payroll.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ProbationRateEntry {
    /// Experience level the rate applies to
    pub experience: ExperienceLevel,
    /// Outlet type the rate applies to
    pub outlet: OutletType,
    /// Tenure month, 1 to 3
    pub month: u32,
    /// Monthly rate paid in that tenure month
    pub rate: i64,
}

/// Probation salary matrix: experience × outlet × tenure month → monthly rate.
///
/// A key with no entry means the contract's nominal rate applies for that month.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<ProbationRateEntry>")]
pub struct ProbationMatrix {
    rates: BTreeMap<(WageTier, u32), i64>,
}

impl ProbationMatrix {
    /// A matrix with no entries; every employee is paid the nominal rate.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
        }
    }

    /// Returns the matrix with `rate` set for `tier` in tenure `month`.
    #[must_use]
    pub fn with_rate(mut self, tier: WageTier, month: u32, rate: i64) -> Self {
        self.rates.insert((tier, month), rate);
        self
    }

    /// Looks up the probation rate for a tier and tenure month.
    #[must_use]
    pub fn rate_for(&self, tier: WageTier, month: u32) -> Option<i64> {
        self.rates.get(&(tier, month)).copied()
    }

    /// Number of configured entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether no entries are configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// The standard matrix used when payroll.toml does not provide one.
///
/// | tier                    | month 1   | month 2   | month 3   |
/// |-------------------------|-----------|-----------|-----------|
/// | experienced / dine-in   | 2,000,000 | 2,200,000 | 2,400,000 |
/// | experienced / express   | 1,900,000 | 2,100,000 | 2,300,000 |
/// | inexperienced / dine-in | 1,700,000 | 1,900,000 | 2,100,000 |
/// | inexperienced / express | 1,600,000 | 1,800,000 | 2,000,000 |
impl Default for ProbationMatrix {
    fn default() -> Self {
        use ExperienceLevel::{Experienced, Inexperienced};
        use OutletType::{DineIn, Express};

        let table: [(ExperienceLevel, OutletType, [i64; 3]); 4] = [
            (Experienced, DineIn, [2_000_000, 2_200_000, 2_400_000]),
            (Experienced, Express, [1_900_000, 2_100_000, 2_300_000]),
            (Inexperienced, DineIn, [1_700_000, 1_900_000, 2_100_000]),
            (Inexperienced, Express, [1_600_000, 1_800_000, 2_000_000]),
        ];

        table
            .into_iter()
            .flat_map(|(experience, outlet, rates)| {
                let tier = WageTier { experience, outlet };
                (1..=PROBATION_MONTHS)
                    .zip(rates)
                    .map(move |(month, rate)| (tier, month, rate))
            })
            .fold(Self::empty(), |matrix, (tier, month, rate)| {
                matrix.with_rate(tier, month, rate)
            })
    }
}

impl TryFrom<Vec<ProbationRateEntry>> for ProbationMatrix {
    type Error = String;

    fn try_from(entries: Vec<ProbationRateEntry>) -> Result<Self, Self::Error> {
        let mut matrix = Self::empty();
        for entry in entries {
            if !(1..=PROBATION_MONTHS).contains(&entry.month) {
                return Err(format!(
                    "probation month must be between 1 and {PROBATION_MONTHS}, got {}",
                    entry.month
                ));
            }
            if entry.rate < 0 {
                return Err(format!("probation rate cannot be negative, got {}", entry.rate));
            }
            let tier = WageTier {
                experience: entry.experience,
                outlet: entry.outlet,
            };
            if matrix.rate_for(tier, entry.month).is_some() {
                return Err(format!(
                    "duplicate probation rate for {tier} month {}",
                    entry.month
                ));
            }
            matrix = matrix.with_rate(tier, entry.month, entry.rate);
        }
        Ok(matrix)
    }
}

/// Outcome of resolving an employee's rate for a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWage {
    /// Monthly rate before proration
    pub rate: i64,
    /// Tenure month at the period reference date, starting at 1
    pub month_index: u32,
    /// Tier used for the matrix lookup
    pub tier: WageTier,
    /// Whether the rate came from the probation matrix
    pub from_matrix: bool,
}

/// Counts tenure months at `reference`: the joining month is month 1.
///
/// Floored at 1 so a join date after the reference date still counts as the first month.
#[must_use]
pub fn tenure_month_index(join_date: NaiveDate, reference: NaiveDate) -> u32 {
    let months = (i64::from(reference.year()) - i64::from(join_date.year())) * 12
        + (i64::from(reference.month()) - i64::from(join_date.month()))
        + 1;
    u32::try_from(months.max(1)).unwrap_or(u32::MAX)
}

/// Resolves the monthly rate for one employee and period.
#[must_use]
pub fn resolve_wage_rate(
    nominal_rate: i64,
    tier: WageTier,
    join_date: NaiveDate,
    reference: NaiveDate,
    matrix: &ProbationMatrix,
) -> ResolvedWage {
    let month_index = tenure_month_index(join_date, reference);
    let probation_rate = if month_index <= PROBATION_MONTHS {
        matrix.rate_for(tier, month_index)
    } else {
        None
    };

    ResolvedWage {
        rate: probation_rate.unwrap_or(nominal_rate),
        month_index,
        tier,
        from_matrix: probation_rate.is_some(),
    }
}
