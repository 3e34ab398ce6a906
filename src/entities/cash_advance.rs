//! Cash advance entity - An employee loan (kasbon) repaid by payroll installments.
//!
//! `outstanding_balance` only ever moves down as periods are finalized and never
//! drops below zero. An advance whose balance reaches zero is marked paid off.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a cash advance request
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum CashAdvanceStatus {
    /// Requested, awaiting a decision
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved for the requested amount
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Approved with a different principal or installment than requested
    #[sea_orm(string_value = "adjusted")]
    Adjusted,
    /// Rejected; never amortized
    #[sea_orm(string_value = "declined")]
    Declined,
    /// Balance fully repaid
    #[sea_orm(string_value = "paid_off")]
    PaidOff,
}

impl CashAdvanceStatus {
    /// Whether an advance in this status is repaid through payroll
    #[must_use]
    pub const fn is_repayable(self) -> bool {
        matches!(self, Self::Approved | Self::Adjusted)
    }
}

impl fmt::Display for CashAdvanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Adjusted => "adjusted",
            Self::Declined => "declined",
            Self::PaidOff => "paid off",
        };
        f.write_str(label)
    }
}

/// Cash advance database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_advances")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Borrowing employee
    pub employee_id: i64,
    /// Amount the employee asked for
    pub requested_amount: i64,
    /// Amount actually lent
    pub approved_principal: i64,
    /// Installment deducted each period until repaid
    pub agreed_installment: i64,
    /// Amount still owed
    pub outstanding_balance: i64,
    /// Current lifecycle status
    pub status: CashAdvanceStatus,
    /// Reason given by the employee
    pub reason: Option<String>,
    /// When the advance was requested
    pub requested_at: DateTimeUtc,
    /// When the advance was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CashAdvance` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each advance belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// One advance has many repayments
    #[sea_orm(has_many = "super::loan_repayment::Entity")]
    LoanRepayments,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::loan_repayment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoanRepayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
