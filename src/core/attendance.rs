//! Attendance adjustments - meal allowance and attendance deductions.
//!
//! Sick, permission and absent days each cost a flat penalty, as does every
//! rostered Saturday taken off. Late presence (HT) is tracked for review and only
//! costs money when the deployment configures a late penalty.
//!
//! Summaries are written by the attendance import via
//! [`record_attendance_summary`] and read back per period by draft generation.

use crate::{
    core::proration::STANDARD_WORK_DAYS,
    entities::{AttendanceSummary, attendance_summary},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Attendance counters for one employee in one period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceCounts {
    /// Days present on time
    pub present: i32,
    /// Days present but late (HT)
    pub late_present: i32,
    /// Sick days
    pub sick: i32,
    /// Days off with permission
    pub permission: i32,
    /// Unexcused absences
    pub absent: i32,
    /// Rostered Saturdays taken off
    pub saturday_off: i32,
    /// Whether a medical note backs the sick days
    pub has_sick_letter: bool,
}

impl AttendanceCounts {
    /// Days the employee showed up, late or not
    #[must_use]
    pub fn days_present(&self) -> i64 {
        count(self.present) + count(self.late_present)
    }
}

impl From<&attendance_summary::Model> for AttendanceCounts {
    fn from(row: &attendance_summary::Model) -> Self {
        Self {
            present: row.present,
            late_present: row.late_present,
            sick: row.sick,
            permission: row.permission,
            absent: row.absent,
            saturday_off: row.saturday_off,
            has_sick_letter: row.has_sick_letter,
        }
    }
}

fn count(value: i32) -> i64 {
    i64::from(value.max(0))
}

/// Flat per-occurrence attendance penalties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PenaltyRates {
    /// Per sick day
    pub sick: i64,
    /// Per permission day
    pub permission: i64,
    /// Per unexcused absence
    pub absent: i64,
    /// Per rostered Saturday taken off
    pub saturday_off: i64,
    /// Per late arrival; zero unless the deployment penalises lateness
    pub late_present: i64,
}

impl Default for PenaltyRates {
    fn default() -> Self {
        Self {
            sick: 50_000,
            permission: 50_000,
            absent: 50_000,
            saturday_off: 10_000,
            late_present: 0,
        }
    }
}

impl PenaltyRates {
    pub(crate) fn validate(&self) -> Result<()> {
        let rates = [
            ("sick", self.sick),
            ("permission", self.permission),
            ("absent", self.absent),
            ("saturday_off", self.saturday_off),
            ("late_present", self.late_present),
        ];
        match rates.iter().find(|(_, rate)| *rate < 0) {
            Some((name, rate)) => Err(Error::Config {
                message: format!("penalty rate {name} cannot be negative, got {rate}"),
            }),
            None => Ok(()),
        }
    }
}

/// How the meal allowance is computed in this deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MealAllowancePolicy {
    /// Contract daily meal rate × days present (including late days)
    #[default]
    PerDayPresent,
    /// Flat monthly allowance reduced for every Saturday taken off
    Fixed {
        /// Allowance before reductions
        base_allowance: i64,
        /// Reduction per Saturday taken off
        saturday_reduction: i64,
    },
}

impl MealAllowancePolicy {
    pub(crate) fn validate(&self) -> Result<()> {
        match *self {
            Self::Fixed {
                base_allowance,
                saturday_reduction,
            } if base_allowance < 0 || saturday_reduction < 0 => Err(Error::Config {
                message: "fixed meal allowance amounts cannot be negative".to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Meal allowance for the period, never negative.
    ///
    /// Without attendance data the employee receives the full allowance.
    #[must_use]
    pub fn meal_allowance(&self, attendance: Option<&AttendanceCounts>, daily_meal_rate: i64) -> i64 {
        let allowance = match *self {
            Self::PerDayPresent => {
                let days = attendance.map_or(STANDARD_WORK_DAYS, AttendanceCounts::days_present);
                days.saturating_mul(daily_meal_rate)
            }
            Self::Fixed {
                base_allowance,
                saturday_reduction,
            } => {
                let saturdays = attendance.map_or(0, |a| count(a.saturday_off));
                base_allowance.saturating_sub(saturdays.saturating_mul(saturday_reduction))
            }
        };
        allowance.max(0)
    }
}

/// Meal allowance and deductions derived from one employee's attendance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceAdjustment {
    /// Meal allowance to add to gross pay
    pub meal_allowance: i64,
    /// Sick-day penalty sub-total
    pub deduction_sick: i64,
    /// Permission penalty sub-total
    pub deduction_permission: i64,
    /// Absence penalty sub-total
    pub deduction_absent: i64,
    /// Saturday-off penalty sub-total
    pub deduction_saturday: i64,
    /// Late-presence penalty sub-total
    pub deduction_late: i64,
}

impl AttendanceAdjustment {
    /// Total attendance deduction
    #[must_use]
    pub const fn total_deduction(&self) -> i64 {
        self.deduction_sick
            + self.deduction_permission
            + self.deduction_absent
            + self.deduction_saturday
            + self.deduction_late
    }
}

/// Converts attendance counters into a meal allowance and deductions.
///
/// A missing attendance row means zero counts: no deductions, full meal allowance.
#[must_use]
pub fn calculate_attendance_adjustment(
    attendance: Option<&AttendanceCounts>,
    daily_meal_rate: i64,
    rates: &PenaltyRates,
    policy: &MealAllowancePolicy,
) -> AttendanceAdjustment {
    let counts = attendance.copied().unwrap_or_default();
    AttendanceAdjustment {
        meal_allowance: policy.meal_allowance(attendance, daily_meal_rate),
        deduction_sick: count(counts.sick) * rates.sick,
        deduction_permission: count(counts.permission) * rates.permission,
        deduction_absent: count(counts.absent) * rates.absent,
        deduction_saturday: count(counts.saturday_off) * rates.saturday_off,
        deduction_late: count(counts.late_present) * rates.late_present,
    }
}

/// Stores the attendance summary for an employee and period, replacing any earlier import.
#[instrument(skip(db, counts))]
pub async fn record_attendance_summary<C>(
    db: &C,
    period_id: i64,
    employee_id: i64,
    counts: &AttendanceCounts,
) -> Result<attendance_summary::Model>
where
    C: ConnectionTrait,
{
    let existing = AttendanceSummary::find()
        .filter(attendance_summary::Column::PeriodId.eq(period_id))
        .filter(attendance_summary::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await?;

    let saved = if let Some(row) = existing {
        let mut active_model: attendance_summary::ActiveModel = row.into();
        set_counts(&mut active_model, counts);
        active_model.update(db).await?
    } else {
        let mut active_model = attendance_summary::ActiveModel {
            period_id: Set(period_id),
            employee_id: Set(employee_id),
            ..Default::default()
        };
        set_counts(&mut active_model, counts);
        active_model.insert(db).await?
    };

    debug!(
        "Recorded attendance summary {} for employee {}",
        saved.id, employee_id
    );
    Ok(saved)
}

fn set_counts(active_model: &mut attendance_summary::ActiveModel, counts: &AttendanceCounts) {
    active_model.present = Set(counts.present);
    active_model.late_present = Set(counts.late_present);
    active_model.sick = Set(counts.sick);
    active_model.permission = Set(counts.permission);
    active_model.absent = Set(counts.absent);
    active_model.saturday_off = Set(counts.saturday_off);
    active_model.has_sick_letter = Set(counts.has_sick_letter);
}

/// Loads every attendance summary of a period, keyed by employee id.
pub async fn get_attendance_for_period<C>(
    db: &C,
    period_id: i64,
) -> Result<HashMap<i64, AttendanceCounts>>
where
    C: ConnectionTrait,
{
    let rows = AttendanceSummary::find()
        .filter(attendance_summary::Column::PeriodId.eq(period_id))
        .all(db)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.employee_id, AttendanceCounts::from(row)))
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_flat_penalty_scenario() {
        let counts = AttendanceCounts {
            sick: 2,
            permission: 1,
            absent: 0,
            saturday_off: 1,
            ..AttendanceCounts::default()
        };
        let adjustment = calculate_attendance_adjustment(
            Some(&counts),
            0,
            &PenaltyRates::default(),
            &MealAllowancePolicy::PerDayPresent,
        );
        assert_eq!(adjustment.deduction_sick, 100_000);
        assert_eq!(adjustment.deduction_permission, 50_000);
        assert_eq!(adjustment.deduction_absent, 0);
        assert_eq!(adjustment.deduction_saturday, 10_000);
        assert_eq!(adjustment.total_deduction(), 160_000);
    }

    #[test]
    fn test_meal_allowance_per_day_counts_late_days() {
        let counts = AttendanceCounts {
            present: 20,
            late_present: 2,
            ..AttendanceCounts::default()
        };
        let adjustment = calculate_attendance_adjustment(
            Some(&counts),
            15_000,
            &PenaltyRates::default(),
            &MealAllowancePolicy::PerDayPresent,
        );
        assert_eq!(adjustment.meal_allowance, 330_000);
    }

    #[test]
    fn test_late_presence_is_free_by_default() {
        let counts = AttendanceCounts {
            present: 20,
            late_present: 5,
            ..AttendanceCounts::default()
        };
        let adjustment = calculate_attendance_adjustment(
            Some(&counts),
            0,
            &PenaltyRates::default(),
            &MealAllowancePolicy::PerDayPresent,
        );
        assert_eq!(adjustment.deduction_late, 0);
        assert_eq!(adjustment.total_deduction(), 0);
    }

    #[test]
    fn test_late_penalty_when_configured() {
        let counts = AttendanceCounts {
            late_present: 3,
            ..AttendanceCounts::default()
        };
        let rates = PenaltyRates {
            late_present: 20_000,
            ..PenaltyRates::default()
        };
        let adjustment = calculate_attendance_adjustment(
            Some(&counts),
            0,
            &rates,
            &MealAllowancePolicy::PerDayPresent,
        );
        assert_eq!(adjustment.deduction_late, 60_000);
        assert_eq!(adjustment.total_deduction(), 60_000);
    }

    #[test]
    fn test_fixed_meal_allowance_floored_at_zero() {
        let policy = MealAllowancePolicy::Fixed {
            base_allowance: 40_000,
            saturday_reduction: 15_000,
        };
        let counts = AttendanceCounts {
            saturday_off: 2,
            ..AttendanceCounts::default()
        };
        assert_eq!(policy.meal_allowance(Some(&counts), 0), 10_000);

        let counts = AttendanceCounts {
            saturday_off: 4,
            ..AttendanceCounts::default()
        };
        assert_eq!(policy.meal_allowance(Some(&counts), 0), 0);
    }

    #[test]
    fn test_missing_attendance_means_no_deduction_and_full_meal() {
        let adjustment = calculate_attendance_adjustment(
            None,
            10_000,
            &PenaltyRates::default(),
            &MealAllowancePolicy::PerDayPresent,
        );
        assert_eq!(adjustment.total_deduction(), 0);
        assert_eq!(adjustment.meal_allowance, 260_000);

        let fixed = MealAllowancePolicy::Fixed {
            base_allowance: 300_000,
            saturday_reduction: 10_000,
        };
        assert_eq!(fixed.meal_allowance(None, 0), 300_000);
    }

    #[tokio::test]
    async fn test_record_attendance_summary_replaces_previous_import() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db).await?;
        let employee = create_test_employee(&db, "Sari").await?;

        let first = AttendanceCounts {
            present: 20,
            sick: 1,
            ..AttendanceCounts::default()
        };
        record_attendance_summary(&db, period.id, employee.id, &first).await?;

        let second = AttendanceCounts {
            present: 22,
            has_sick_letter: true,
            ..AttendanceCounts::default()
        };
        record_attendance_summary(&db, period.id, employee.id, &second).await?;

        let all = AttendanceSummary::find().all(&db).await?;
        assert_eq!(all.len(), 1);

        let loaded = get_attendance_for_period(&db, period.id).await?;
        assert_eq!(loaded.get(&employee.id), Some(&second));
        Ok(())
    }
}
