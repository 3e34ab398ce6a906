//! Incentive business logic - Monthly ranking bonuses.
//!
//! The incentive rule table maps a rank position to a bonus amount, at most one
//! rule per position. An employee ranked for a period receives the bonus of the
//! matching rule; unranked employees and ranks without a rule receive nothing.

use crate::{
    entities::{IncentiveRule, MonthlyRanking, incentive_rule, monthly_ranking},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Looks up the bonus for `rank` in the rule table.
///
/// Returns 0 when the employee is unranked or no rule is configured for the rank.
#[must_use]
pub fn resolve_incentive(rank: Option<i32>, rules: &[incentive_rule::Model]) -> i64 {
    rank.and_then(|position| rules.iter().find(|rule| rule.rank_position == position))
        .map_or(0, |rule| rule.bonus_amount)
}

fn validate_rule(rank_position: i32, bonus_amount: i64) -> Result<()> {
    if rank_position < 1 {
        return Err(Error::InvalidRankPosition { rank_position });
    }
    if bonus_amount < 0 {
        return Err(Error::InvalidAmount {
            amount: bonus_amount,
        });
    }
    Ok(())
}

/// Adds a rule to the incentive table.
///
/// # Errors
/// Returns `Error::DuplicateIncentiveRank` if a rule for the rank already exists;
/// an existing rule is never overwritten.
#[instrument(skip(db))]
pub async fn create_incentive_rule(
    db: &DatabaseConnection,
    rank_position: i32,
    bonus_amount: i64,
    description: Option<String>,
) -> Result<incentive_rule::Model> {
    validate_rule(rank_position, bonus_amount)?;

    let txn = db.begin().await?;

    let existing = IncentiveRule::find()
        .filter(incentive_rule::Column::RankPosition.eq(rank_position))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(Error::DuplicateIncentiveRank { rank_position });
    }

    let rule = incentive_rule::ActiveModel {
        rank_position: Set(rank_position),
        bonus_amount: Set(bonus_amount),
        description: Set(description),
        ..Default::default()
    };

    // The unique column still guards against a concurrent insert of the same rank
    let result = rule.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            Error::DuplicateIncentiveRank { rank_position }
        }
        _ => Error::from(e),
    })?;

    txn.commit().await?;
    info!(
        "Added incentive rule: rank {} pays {}",
        rank_position, bonus_amount
    );
    Ok(result)
}

/// Returns the whole rule table ordered by rank position.
pub async fn list_incentive_rules<C>(db: &C) -> Result<Vec<incentive_rule::Model>>
where
    C: ConnectionTrait,
{
    IncentiveRule::find()
        .order_by_asc(incentive_rule::Column::RankPosition)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes the bonus paid for an existing rank.
///
/// Returns `None` if no rule exists for the rank.
pub async fn update_incentive_bonus(
    db: &DatabaseConnection,
    rank_position: i32,
    bonus_amount: i64,
) -> Result<Option<incentive_rule::Model>> {
    validate_rule(rank_position, bonus_amount)?;

    let Some(rule) = IncentiveRule::find()
        .filter(incentive_rule::Column::RankPosition.eq(rank_position))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let mut active_model: incentive_rule::ActiveModel = rule.into();
    active_model.bonus_amount = Set(bonus_amount);
    Ok(Some(active_model.update(db).await?))
}

/// Removes the rule for a rank. Returns whether a rule was removed.
pub async fn delete_incentive_rule(db: &DatabaseConnection, rank_position: i32) -> Result<bool> {
    let result = IncentiveRule::delete_many()
        .filter(incentive_rule::Column::RankPosition.eq(rank_position))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Records the rank an employee earned in a period, replacing any earlier ranking.
#[instrument(skip(db))]
pub async fn assign_rank(
    db: &DatabaseConnection,
    period_id: i64,
    employee_id: i64,
    rank: i32,
) -> Result<monthly_ranking::Model> {
    if rank < 1 {
        return Err(Error::InvalidRankPosition {
            rank_position: rank,
        });
    }

    let existing = MonthlyRanking::find()
        .filter(monthly_ranking::Column::PeriodId.eq(period_id))
        .filter(monthly_ranking::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await?;

    let result = if let Some(ranking) = existing {
        let mut active_model: monthly_ranking::ActiveModel = ranking.into();
        active_model.rank = Set(rank);
        active_model.update(db).await?
    } else {
        monthly_ranking::ActiveModel {
            period_id: Set(period_id),
            employee_id: Set(employee_id),
            rank: Set(rank),
            ..Default::default()
        }
        .insert(db)
        .await?
    };
    Ok(result)
}

/// Loads every rank assigned in a period, keyed by employee id.
pub async fn get_ranks_for_period<C>(db: &C, period_id: i64) -> Result<HashMap<i64, i32>>
where
    C: ConnectionTrait,
{
    let rows = MonthlyRanking::find()
        .filter(monthly_ranking::Column::PeriodId.eq(period_id))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.employee_id, row.rank))
        .collect())
}
