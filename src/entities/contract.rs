//! Contract entity - Employment terms that drive the wage rate.
//!
//! `experience_level` and `outlet_type` are stored as free text so that
//! unrecognised values resolve to the default wage tier instead of failing to load.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contract database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contracts")]
pub struct Model {
    /// Unique identifier for the contract
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Employee this contract belongs to
    pub employee_id: i64,
    /// Monthly base salary for confirmed staff
    pub nominal_rate: i64,
    /// `"experienced"` or `"inexperienced"`
    pub experience_level: String,
    /// `"dine_in"` or `"express"`
    pub outlet_type: String,
    /// Meal allowance paid per day present
    pub daily_meal_rate: i64,
    /// Contract kind (e.g., `"probation"`, `"permanent"`)
    pub contract_type: String,
    /// First day the contract applies
    pub start_date: Date,
    /// Last day the contract applies, open-ended if absent
    pub end_date: Option<Date>,
    /// Only one contract per employee may be active at a time
    pub is_active: bool,
}

/// Defines relationships between Contract and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each contract belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
