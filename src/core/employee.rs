//! Roster business logic - employee records and draft eligibility.
//!
//! The roster is maintained by HR administration; the payroll engine needs to
//! add employees (for imports and tests), record resignations and decide who is
//! paid in a period.

use crate::{
    core::period,
    entities::{Employee, employee, payroll_period},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::info;

/// Fields needed to add an employee to the roster
#[derive(Debug, Clone)]
pub struct NewEmployee {
    /// Full legal name
    pub full_name: String,
    /// Outlet the employee is posted to
    pub outlet_name: String,
    /// First day of employment
    pub join_date: NaiveDate,
    /// Bank used for payout
    pub bank_name: Option<String>,
    /// Account number for payout
    pub bank_account_number: Option<String>,
}

/// Adds an active employee to the roster.
pub async fn create_employee(
    db: &DatabaseConnection,
    args: NewEmployee,
) -> Result<employee::Model> {
    if args.full_name.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "Employee name cannot be empty".to_string(),
        });
    }

    let employee = employee::ActiveModel {
        full_name: Set(args.full_name.trim().to_string()),
        outlet_name: Set(args.outlet_name),
        join_date: Set(args.join_date),
        resign_date: Set(None),
        is_active: Set(true),
        bank_name: Set(args.bank_name),
        bank_account_number: Set(args.bank_account_number),
        ..Default::default()
    };
    Ok(employee.insert(db).await?)
}

/// Records a resignation: the employee leaves the active roster as of `resign_date`.
pub async fn resign_employee(
    db: &DatabaseConnection,
    employee_id: i64,
    resign_date: NaiveDate,
) -> Result<employee::Model> {
    let employee = Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or(Error::EmployeeNotFound { employee_id })?;

    let mut active_model: employee::ActiveModel = employee.into();
    active_model.resign_date = Set(Some(resign_date));
    active_model.is_active = Set(false);
    let updated = active_model.update(db).await?;

    info!("Employee {} resigned on {}", employee_id, resign_date);
    Ok(updated)
}

/// Whether an employee is paid in `period`.
///
/// Active employees always are; inactive ones only when they resigned inside the
/// period, so leavers receive their final partial month.
#[must_use]
pub fn is_eligible(employee: &employee::Model, period: &payroll_period::Model) -> bool {
    employee.is_active
        || employee
            .resign_date
            .is_some_and(|resigned| period::contains(period, resigned))
}

/// Loads every employee paid in `period`, ordered by name.
pub async fn get_eligible_employees<C>(
    db: &C,
    period: &payroll_period::Model,
) -> Result<Vec<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find()
        .filter(
            Condition::any()
                .add(employee::Column::IsActive.eq(true))
                .add(employee::Column::ResignDate.between(period.start_date, period.end_date)),
        )
        .order_by_asc(employee::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_eligibility_includes_leavers_within_period_only() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db).await?; // January 2025

        let active = create_test_employee(&db, "Active").await?;
        let leaver = create_test_employee(&db, "Leaver").await?;
        let gone = create_test_employee(&db, "Gone").await?;

        resign_employee(&db, leaver.id, date(2025, 1, 15)).await?;
        resign_employee(&db, gone.id, date(2024, 12, 20)).await?;

        let eligible = get_eligible_employees(&db, &period).await?;
        let ids: Vec<i64> = eligible.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![active.id, leaver.id]);

        for employee in &eligible {
            assert!(is_eligible(employee, &period));
        }
        let gone = Employee::find_by_id(gone.id).one(&db).await?.unwrap();
        assert!(!is_eligible(&gone, &period));
        Ok(())
    }

    #[tokio::test]
    async fn test_resign_unknown_employee() -> Result<()> {
        let db = setup_test_db().await?;
        let result = resign_employee(&db, 42, date(2025, 1, 1)).await;
        assert!(matches!(
            result,
            Err(Error::EmployeeNotFound { employee_id: 42 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_employee_rejects_blank_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_employee(
            &db,
            NewEmployee {
                full_name: "  ".to_string(),
                outlet_name: "Central".to_string(),
                join_date: date(2024, 1, 1),
                bank_name: None,
                bank_account_number: None,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        Ok(())
    }
}
