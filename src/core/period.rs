//! Payroll period business logic.

use crate::{
    entities::{PayrollPeriod, payroll_period},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Opens a new payroll period covering `start_date..=end_date`.
pub async fn create_period(
    db: &DatabaseConnection,
    name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<payroll_period::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Period name cannot be empty".to_string(),
        });
    }
    if end_date < start_date {
        return Err(Error::InvalidInput {
            message: format!("Period ends ({end_date}) before it starts ({start_date})"),
        });
    }

    let period = payroll_period::ActiveModel {
        name: Set(name.trim().to_string()),
        start_date: Set(start_date),
        end_date: Set(end_date),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(period.insert(db).await?)
}

/// Gets a period by id.
///
/// # Errors
/// Returns `Error::PeriodNotFound` if no such period exists.
pub async fn get_period<C>(db: &C, period_id: i64) -> Result<payroll_period::Model>
where
    C: ConnectionTrait,
{
    PayrollPeriod::find_by_id(period_id)
        .one(db)
        .await?
        .ok_or(Error::PeriodNotFound { period_id })
}

/// Lists all periods, most recent first.
pub async fn list_periods(db: &DatabaseConnection) -> Result<Vec<payroll_period::Model>> {
    PayrollPeriod::find()
        .order_by_desc(payroll_period::Column::StartDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Whether `date` falls inside the period (both ends inclusive).
#[must_use]
pub fn contains(period: &payroll_period::Model, date: NaiveDate) -> bool {
    period.start_date <= date && date <= period.end_date
}

/// Date at which tenure months are counted for the period.
///
/// The cutoff day of the period's end month, clamped to the month length and
/// into the period itself.
#[must_use]
pub fn reference_date(period: &payroll_period::Model, cutoff_day: u32) -> NaiveDate {
    let end = period.end_date;
    let cutoff = (1..=cutoff_day.min(31))
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(end.year(), end.month(), day))
        .unwrap_or(end);
    cutoff.max(period.start_date).min(end)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate) -> payroll_period::Model {
        payroll_period::Model {
            id: 1,
            name: "test".to_string(),
            start_date: start,
            end_date: end,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_reference_date_is_cutoff_of_end_month() {
        let p = period(date(2025, 1, 1), date(2025, 1, 31));
        assert_eq!(reference_date(&p, 25), date(2025, 1, 25));

        let p = period(date(2024, 12, 26), date(2025, 1, 25));
        assert_eq!(reference_date(&p, 25), date(2025, 1, 25));
    }

    #[test]
    fn test_reference_date_clamped() {
        // Cutoff after the period end
        let p = period(date(2025, 1, 1), date(2025, 1, 20));
        assert_eq!(reference_date(&p, 25), date(2025, 1, 20));

        // Cutoff past the month length
        let p = period(date(2025, 2, 1), date(2025, 2, 28));
        assert_eq!(reference_date(&p, 31), date(2025, 2, 28));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let p = period(date(2025, 1, 1), date(2025, 1, 31));
        assert!(contains(&p, date(2025, 1, 1)));
        assert!(contains(&p, date(2025, 1, 31)));
        assert!(!contains(&p, date(2025, 2, 1)));
    }

    #[tokio::test]
    async fn test_create_and_get_period() -> Result<()> {
        let db = setup_test_db().await?;
        let created =
            create_period(&db, " January 2025 ".to_string(), date(2025, 1, 1), date(2025, 1, 31))
                .await?;
        assert_eq!(created.name, "January 2025");

        let loaded = get_period(&db, created.id).await?;
        assert_eq!(loaded, created);

        let missing = get_period(&db, 999).await;
        assert!(matches!(
            missing,
            Err(Error::PeriodNotFound { period_id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_period_rejects_inverted_range() -> Result<()> {
        let db = setup_test_db().await?;
        let result =
            create_period(&db, "Bad".to_string(), date(2025, 2, 1), date(2025, 1, 1)).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));

        let result =
            create_period(&db, " ".to_string(), date(2025, 1, 1), date(2025, 1, 31)).await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }
}
