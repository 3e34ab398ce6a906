//! Monthly ranking entity - Rank position an employee earned in a period.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Monthly ranking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_rankings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Period the rank was earned in
    pub period_id: i64,
    /// Ranked employee
    pub employee_id: i64,
    /// Rank position (1 = top performer)
    pub rank: i32,
}

/// Defines relationships between `MonthlyRanking` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ranking belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Each ranking belongs to one period
    #[sea_orm(
        belongs_to = "super::payroll_period::Entity",
        from = "Column::PeriodId",
        to = "super::payroll_period::Column::Id"
    )]
    PayrollPeriod,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::payroll_period::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PayrollPeriod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
