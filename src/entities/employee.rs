//! Employee entity - The crew roster as maintained by HR administration.
//!
//! The payroll engine only reads this table: tenure dates drive proration and
//! probation tiers, the active flag and resignation date drive draft eligibility.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full legal name, used on payslips
    pub full_name: String,
    /// Outlet the employee is posted to
    pub outlet_name: String,
    /// First day of employment
    pub join_date: Date,
    /// Last day of employment, if the employee has resigned
    pub resign_date: Option<Date>,
    /// Whether the employee is currently on the active roster
    pub is_active: bool,
    /// Bank used for salary payout
    pub bank_name: Option<String>,
    /// Account number for salary payout
    pub bank_account_number: Option<String>,
}

/// Employees are referenced by the other tables; the relations live on the child side
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
