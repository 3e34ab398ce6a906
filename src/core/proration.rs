//! Proration of the monthly rate for partial-period tenure.
//!
//! New joiners and leavers are paid for the days they actually worked against a
//! fixed divisor of [`STANDARD_WORK_DAYS`]. Worked days above the divisor are not
//! capped, so someone who worked extra rostered days can earn more than the rate.

use crate::core::attendance::AttendanceCounts;
use chrono::NaiveDate;

/// Divisor used to turn a monthly rate into a daily rate
pub const STANDARD_WORK_DAYS: i64 = 26;

const _: () = assert!(STANDARD_WORK_DAYS > 0);

/// Base salary for the period after proration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProratedSalary {
    /// Base salary to pay
    pub base_salary: i64,
    /// Whether proration was applied
    pub is_prorated: bool,
    /// Worked days the salary was computed from
    pub worked_days: i64,
}

/// Days the employee worked in the period.
///
/// Present plus late-present days, or the full standard count while attendance
/// has not been synced for the employee.
#[must_use]
pub fn actual_worked_days(attendance: Option<&AttendanceCounts>) -> i64 {
    attendance.map_or(STANDARD_WORK_DAYS, AttendanceCounts::days_present)
}

/// Whether the employee's tenure covers only part of the period.
///
/// True when they joined after the period started, resigned before it ended, or
/// the period is their first month of tenure.
#[must_use]
pub fn needs_proration(
    join_date: NaiveDate,
    resign_date: Option<NaiveDate>,
    period_start: NaiveDate,
    period_end: NaiveDate,
    month_index: u32,
) -> bool {
    let joined_mid_period = join_date > period_start;
    let left_mid_period = resign_date.is_some_and(|resigned| resigned < period_end);
    joined_mid_period || left_mid_period || month_index == 1
}

/// `floor(rate / STANDARD_WORK_DAYS × worked_days)`, computed in integers.
#[must_use]
pub fn prorate(rate: i64, worked_days: i64) -> i64 {
    rate.saturating_mul(worked_days).div_euclid(STANDARD_WORK_DAYS)
}

/// Computes the period base salary from a resolved rate.
#[must_use]
pub fn compute_base_salary(rate: i64, worked_days: i64, prorated: bool) -> ProratedSalary {
    let base_salary = if prorated {
        prorate(rate, worked_days)
    } else {
        rate
    };
    ProratedSalary {
        base_salary,
        is_prorated: prorated,
        worked_days,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_half_month_joiner() {
        let salary = compute_base_salary(2_000_000, 13, true);
        assert_eq!(salary.base_salary, 1_000_000);
        assert!(salary.is_prorated);
    }

    #[test]
    fn test_full_tenure_keeps_rate() {
        let prorated = needs_proration(
            date(2023, 5, 1),
            None,
            date(2025, 1, 1),
            date(2025, 1, 31),
            21,
        );
        assert!(!prorated);

        let salary = compute_base_salary(2_750_000, 20, prorated);
        assert_eq!(salary.base_salary, 2_750_000);
    }

    #[test]
    fn test_proration_floors() {
        // 1,999,999 × 7 / 26 = 538,461.26...
        assert_eq!(prorate(1_999_999, 7), 538_461);
    }

    #[test]
    fn test_proration_monotonic_in_worked_days() {
        let rate = 2_345_678;
        let mut previous = prorate(rate, 0);
        assert_eq!(previous, 0);
        for days in 1..=31 {
            let current = prorate(rate, days);
            assert!(current >= previous, "day {days}: {current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_worked_days_above_standard_not_capped() {
        assert_eq!(prorate(2_600_000, 28), 2_800_000);
    }

    #[test]
    fn test_joined_mid_period_triggers_proration() {
        assert!(needs_proration(
            date(2025, 1, 15),
            None,
            date(2025, 1, 1),
            date(2025, 1, 31),
            1,
        ));
    }

    #[test]
    fn test_first_tenure_month_triggers_proration_even_when_joined_on_start() {
        assert!(needs_proration(
            date(2025, 1, 1),
            None,
            date(2025, 1, 1),
            date(2025, 1, 31),
            1,
        ));
        assert!(!needs_proration(
            date(2025, 1, 1),
            None,
            date(2025, 2, 1),
            date(2025, 2, 28),
            2,
        ));
    }

    #[test]
    fn test_resignation_before_period_end_triggers_proration() {
        assert!(needs_proration(
            date(2022, 1, 1),
            Some(date(2025, 1, 20)),
            date(2025, 1, 1),
            date(2025, 1, 31),
            37,
        ));
        assert!(!needs_proration(
            date(2022, 1, 1),
            Some(date(2025, 1, 31)),
            date(2025, 1, 1),
            date(2025, 1, 31),
            37,
        ));
    }

    #[test]
    fn test_worked_days_without_attendance_is_standard() {
        assert_eq!(actual_worked_days(None), STANDARD_WORK_DAYS);

        let counts = AttendanceCounts {
            present: 10,
            late_present: 3,
            ..AttendanceCounts::default()
        };
        assert_eq!(actual_worked_days(Some(&counts)), 13);
    }
}
