//! Incentive rule entity - Maps a monthly rank position to a bonus amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Incentive rule database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "incentive_rules")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Rank position this rule pays out for (1 = top performer)
    #[sea_orm(unique)]
    pub rank_position: i32,
    /// Bonus paid to the employee holding this rank
    pub bonus_amount: i64,
    /// Optional label shown to administrators
    pub description: Option<String>,
}

/// `IncentiveRule` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
