//! Contract business logic - at most one active contract per employee.

use crate::{
    entities::{Contract, Employee, contract},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Terms of a new contract
#[derive(Debug, Clone)]
pub struct NewContract {
    /// Employee the contract is for
    pub employee_id: i64,
    /// Monthly base salary for confirmed staff
    pub nominal_rate: i64,
    /// `"experienced"` or `"inexperienced"`
    pub experience_level: String,
    /// `"dine_in"` or `"express"`
    pub outlet_type: String,
    /// Meal allowance per day present
    pub daily_meal_rate: i64,
    /// Contract kind, e.g. `"probation"`
    pub contract_type: String,
    /// First day the contract applies
    pub start_date: NaiveDate,
    /// Last day the contract applies
    pub end_date: Option<NaiveDate>,
}

/// Stores a contract as the employee's active one, deactivating any previous contract.
#[instrument(skip(db, args), fields(employee_id = args.employee_id))]
pub async fn activate_contract(
    db: &DatabaseConnection,
    args: NewContract,
) -> Result<contract::Model> {
    if args.nominal_rate < 0 {
        return Err(Error::InvalidAmount {
            amount: args.nominal_rate,
        });
    }
    if args.daily_meal_rate < 0 {
        return Err(Error::InvalidAmount {
            amount: args.daily_meal_rate,
        });
    }

    let txn = db.begin().await?;

    Employee::find_by_id(args.employee_id)
        .one(&txn)
        .await?
        .ok_or(Error::EmployeeNotFound {
            employee_id: args.employee_id,
        })?;

    let deactivated = Contract::update_many()
        .col_expr(contract::Column::IsActive, Expr::value(false))
        .filter(contract::Column::EmployeeId.eq(args.employee_id))
        .filter(contract::Column::IsActive.eq(true))
        .exec(&txn)
        .await?;

    let contract = contract::ActiveModel {
        employee_id: Set(args.employee_id),
        nominal_rate: Set(args.nominal_rate),
        experience_level: Set(args.experience_level),
        outlet_type: Set(args.outlet_type),
        daily_meal_rate: Set(args.daily_meal_rate),
        contract_type: Set(args.contract_type),
        start_date: Set(args.start_date),
        end_date: Set(args.end_date),
        is_active: Set(true),
        ..Default::default()
    };
    let result = contract.insert(&txn).await?;

    txn.commit().await?;
    info!(
        "Activated contract {} (replaced {} earlier)",
        result.id, deactivated.rows_affected
    );
    Ok(result)
}

/// Gets the employee's active contract, if any.
pub async fn get_active_contract<C>(db: &C, employee_id: i64) -> Result<Option<contract::Model>>
where
    C: ConnectionTrait,
{
    Contract::find()
        .filter(contract::Column::EmployeeId.eq(employee_id))
        .filter(contract::Column::IsActive.eq(true))
        .order_by_desc(contract::Column::Id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads every active contract, keyed by employee id.
///
/// Should the data ever hold two active contracts for one employee, the newest wins.
pub async fn get_active_contracts<C>(db: &C) -> Result<HashMap<i64, contract::Model>>
where
    C: ConnectionTrait,
{
    let rows = Contract::find()
        .filter(contract::Column::IsActive.eq(true))
        .order_by_asc(contract::Column::Id)
        .all(db)
        .await?;

    let mut contracts = HashMap::new();
    for row in rows {
        if let Some(previous) = contracts.insert(row.employee_id, row) {
            warn!(
                "Employee {} has more than one active contract; ignoring contract {}",
                previous.employee_id, previous.id
            );
        }
    }
    Ok(contracts)
}
