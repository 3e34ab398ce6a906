//! Payroll entity - The finalized, immutable payroll record of one employee for one period.
//!
//! (`period_id`, `employee_id`) is unique; finalizing a period again overwrites the
//! existing row instead of adding a second one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payroll record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payrolls")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Period this record settles
    pub period_id: i64,
    /// Employee being paid
    pub employee_id: i64,
    /// Base salary after probation tier and proration
    pub base_salary: i64,
    /// Sales commission
    pub commission: i64,
    /// Meal allowance
    pub meal_allowance: i64,
    /// Part of the bonus paid for the monthly ranking
    pub incentive_bonus: i64,
    /// Remainder of the bonus added manually
    pub other_bonus: i64,
    /// Other allowances
    pub allowance_other: i64,
    /// Sick-day sub-total as computed from attendance
    pub deduction_sick: i64,
    /// Permission sub-total as computed from attendance
    pub deduction_permission: i64,
    /// Absence sub-total as computed from attendance
    pub deduction_absent: i64,
    /// Saturday-off sub-total as computed from attendance
    pub deduction_saturday: i64,
    /// Late-presence sub-total as computed from attendance
    pub deduction_late: i64,
    /// Attendance deduction actually applied (may be an operator override)
    pub attendance_deduction: i64,
    /// Cash advance installment deducted this period
    pub kasbon_deduction: i64,
    /// Cash advance balance left after this period
    pub remaining_loan: i64,
    /// Gross earnings
    pub gross_total: i64,
    /// Attendance plus kasbon deductions
    pub total_deduction: i64,
    /// Take-home pay
    pub net_total: i64,
    /// Days counted as worked
    pub worked_days: i32,
    /// Whether the base salary was prorated
    pub is_prorated: bool,
    /// Rank position held this period, if any
    pub rank: Option<i32>,
    /// Human-readable summary of proration, rank and attendance flags
    pub notes: String,
    /// Record status, always `"finalized"` once written
    pub status: String,
    /// When the record was (last) finalized
    pub finalized_at: DateTimeUtc,
}

/// Defines relationships between Payroll and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each record belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
    /// Each record belongs to one period
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
