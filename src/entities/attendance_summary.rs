//! Attendance summary entity - Per-period attendance counters for one employee.
//!
//! Rows are produced by the attendance import and are immutable input to the
//! payroll engine within a period. (`period_id`, `employee_id`) is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance summary database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance_summaries")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Period the counters belong to
    pub period_id: i64,
    /// Employee the counters belong to
    pub employee_id: i64,
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

/// Defines relationships between `AttendanceSummary` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each summary belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Each summary belongs to one period
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
