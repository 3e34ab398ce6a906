//! Loan repayment entity - The amount a finalized period took off one cash advance.
//!
//! (`period_id`, `cash_advance_id`) is unique. Keeping the per-period amounts lets a
//! period be finalized again without deducting the same installment twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Loan repayment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loan_repayments")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Period whose payroll made the repayment
    pub period_id: i64,
    /// Advance that was repaid
    pub cash_advance_id: i64,
    /// Employee who repaid
    pub employee_id: i64,
    /// Amount taken off the outstanding balance
    pub amount: i64,
    /// When the repayment was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `LoanRepayment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each repayment belongs to one cash advance
    #[sea_orm(
        belongs_to = "super::cash_advance::Entity",
        from = "Column::CashAdvanceId",
        to = "super::cash_advance::Column::Id"
    )]
    CashAdvance,
}

impl Related<super::cash_advance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashAdvance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
