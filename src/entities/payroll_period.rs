//! Payroll period entity - One payroll cycle, typically a calendar month.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payroll period database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payroll_periods")]
pub struct Model {
    /// Unique identifier for the period
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "January 2025")
    pub name: String,
    /// First day covered by the period (inclusive)
    pub start_date: Date,
    /// Last day covered by the period (inclusive)
    pub end_date: Date,
    /// When the period was opened
    pub created_at: DateTimeUtc,
}

/// `PayrollPeriod` relations live on the child side
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
