//! Kasbon (cash advance) business logic - loan lifecycle and amortization.
//!
//! An approved advance is repaid through payroll: each period deducts the smaller
//! of its outstanding balance and its agreed installment, so the balance reduces
//! towards zero and never below it. When a period is finalized the deducted
//! amount is spread over the employee's advances and written as repayments; a
//! second finalization of the same period first reverses the earlier repayments,
//! so an installment is never taken twice.

use crate::{
    core::period,
    entities::{
        CashAdvance, CashAdvanceStatus, Employee, LoanRepayment, PayrollPeriod, cash_advance,
        loan_repayment, payroll_period,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// An advance as seen by one period's payroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPosition {
    /// Advance being repaid
    pub cash_advance_id: i64,
    /// Balance owed before this period's deduction
    pub outstanding_before: i64,
    /// Installment agreed at approval
    pub agreed_installment: i64,
}

impl LoanPosition {
    /// This period's installment: the agreed amount, capped at what is still owed
    #[must_use]
    pub fn installment_due(&self) -> i64 {
        self.outstanding_before.min(self.agreed_installment).max(0)
    }
}

/// Combined kasbon figures for one employee and period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KasbonSummary {
    /// Total deducted this period
    pub deduction: i64,
    /// Total owed before the deduction
    pub outstanding_before: i64,
    /// Total owed after the deduction
    pub remaining: i64,
}

/// Part of a period deduction credited to one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanAllocation {
    /// Advance credited
    pub cash_advance_id: i64,
    /// Amount taken off its balance
    pub amount: i64,
}

/// Balance left after deducting `deduction`, never negative.
#[must_use]
pub fn remaining_balance(outstanding_before: i64, deduction: i64) -> i64 {
    outstanding_before.saturating_sub(deduction).max(0)
}

/// Accumulates the installments due across all of an employee's advances.
#[must_use]
pub fn summarize_loans(positions: &[LoanPosition]) -> KasbonSummary {
    let deduction: i64 = positions.iter().map(LoanPosition::installment_due).sum();
    let outstanding_before: i64 = positions.iter().map(|p| p.outstanding_before.max(0)).sum();
    KasbonSummary {
        deduction,
        outstanding_before,
        remaining: remaining_balance(outstanding_before, deduction),
    }
}

/// Spreads a deduction over the advances in `positions` (oldest first).
///
/// Each advance first receives up to its installment due; anything left over is
/// applied oldest-first up to each balance. Amounts beyond the total balance are
/// not allocated.
#[must_use]
pub fn allocate_deduction(positions: &[LoanPosition], deduction: i64) -> Vec<LoanAllocation> {
    let mut left = deduction.max(0);
    let mut applied = vec![0_i64; positions.len()];

    for (slot, position) in applied.iter_mut().zip(positions) {
        let take = position.installment_due().min(left);
        *slot += take;
        left -= take;
    }
    for (slot, position) in applied.iter_mut().zip(positions) {
        let room = (position.outstanding_before - *slot).max(0);
        let take = room.min(left);
        *slot += take;
        left -= take;
    }

    positions
        .iter()
        .zip(applied)
        .filter(|(_, amount)| *amount > 0)
        .map(|(position, amount)| LoanAllocation {
            cash_advance_id: position.cash_advance_id,
            amount,
        })
        .collect()
}

/// Gets a cash advance by id.
pub async fn get_cash_advance<C>(db: &C, cash_advance_id: i64) -> Result<cash_advance::Model>
where
    C: ConnectionTrait,
{
    CashAdvance::find_by_id(cash_advance_id)
        .one(db)
        .await?
        .ok_or(Error::CashAdvanceNotFound { cash_advance_id })
}

/// Lists an employee's advances, oldest first.
pub async fn get_cash_advances_for_employee<C>(
    db: &C,
    employee_id: i64,
) -> Result<Vec<cash_advance::Model>>
where
    C: ConnectionTrait,
{
    CashAdvance::find()
        .filter(cash_advance::Column::EmployeeId.eq(employee_id))
        .order_by_asc(cash_advance::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Files a new cash advance request, pending approval.
#[instrument(skip(db, reason))]
pub async fn request_cash_advance(
    db: &DatabaseConnection,
    employee_id: i64,
    amount: i64,
    reason: Option<String>,
) -> Result<cash_advance::Model> {
    if amount <= 0 {
        return Err(Error::InvalidAmount { amount });
    }
    Employee::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or(Error::EmployeeNotFound { employee_id })?;

    let now = Utc::now();
    let advance = cash_advance::ActiveModel {
        employee_id: Set(employee_id),
        requested_amount: Set(amount),
        approved_principal: Set(0),
        agreed_installment: Set(0),
        outstanding_balance: Set(0),
        status: Set(CashAdvanceStatus::Pending),
        reason: Set(reason),
        requested_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(advance.insert(db).await?)
}

/// Approves a pending request, setting the lent principal and the installment plan.
///
/// An approval for a different amount than requested is recorded as `Adjusted`.
#[instrument(skip(db))]
pub async fn approve_cash_advance(
    db: &DatabaseConnection,
    cash_advance_id: i64,
    approved_principal: i64,
    agreed_installment: i64,
) -> Result<cash_advance::Model> {
    if approved_principal <= 0 {
        return Err(Error::InvalidAmount {
            amount: approved_principal,
        });
    }
    if agreed_installment <= 0 {
        return Err(Error::InvalidAmount {
            amount: agreed_installment,
        });
    }

    let advance = get_cash_advance(db, cash_advance_id).await?;
    if advance.status != CashAdvanceStatus::Pending {
        return Err(Error::InvalidCashAdvanceStatus {
            cash_advance_id,
            status: advance.status.to_string(),
        });
    }

    let status = if approved_principal == advance.requested_amount {
        CashAdvanceStatus::Approved
    } else {
        CashAdvanceStatus::Adjusted
    };

    let mut active_model: cash_advance::ActiveModel = advance.into();
    active_model.approved_principal = Set(approved_principal);
    active_model.agreed_installment = Set(agreed_installment);
    active_model.outstanding_balance = Set(approved_principal);
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());
    let updated = active_model.update(db).await?;

    info!(
        "Cash advance {} {}: principal {}, installment {}",
        cash_advance_id, status, approved_principal, agreed_installment
    );
    Ok(updated)
}

/// Declines a pending request.
pub async fn decline_cash_advance(
    db: &DatabaseConnection,
    cash_advance_id: i64,
) -> Result<cash_advance::Model> {
    let advance = get_cash_advance(db, cash_advance_id).await?;
    if advance.status != CashAdvanceStatus::Pending {
        return Err(Error::InvalidCashAdvanceStatus {
            cash_advance_id,
            status: advance.status.to_string(),
        });
    }

    let mut active_model: cash_advance::ActiveModel = advance.into();
    active_model.status = Set(CashAdvanceStatus::Declined);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

/// Repayments booked by `period_id` or by any period starting on or after it.
async fn repayments_since_period<C>(db: &C, period_id: i64) -> Result<Vec<loan_repayment::Model>>
where
    C: ConnectionTrait,
{
    let period = period::get_period(db, period_id).await?;
    let period_ids: Vec<i64> = PayrollPeriod::find()
        .filter(payroll_period::Column::StartDate.gte(period.start_date))
        .all(db)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    LoanRepayment::find()
        .filter(loan_repayment::Column::PeriodId.is_in(period_ids))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads every employee's repayable advances for a period, keyed by employee id.
///
/// Balances are taken as they stood before the period: repayments booked by the
/// period itself and by every later period are added back, so regenerating an
/// older period after its successors were finalized sees the same balances it
/// saw the first time.
pub async fn load_loan_positions<C>(
    db: &C,
    period_id: i64,
) -> Result<HashMap<i64, Vec<LoanPosition>>>
where
    C: ConnectionTrait,
{
    let repaid: HashMap<i64, i64> = repayments_since_period(db, period_id)
        .await?
        .into_iter()
        .fold(HashMap::new(), |mut acc, repayment| {
            *acc.entry(repayment.cash_advance_id).or_insert(0) += repayment.amount;
            acc
        });

    let advances = CashAdvance::find()
        .filter(cash_advance::Column::Status.is_in([
            CashAdvanceStatus::Approved,
            CashAdvanceStatus::Adjusted,
            CashAdvanceStatus::PaidOff,
        ]))
        .order_by_asc(cash_advance::Column::Id)
        .all(db)
        .await?;

    let mut positions: HashMap<i64, Vec<LoanPosition>> = HashMap::new();
    for advance in advances {
        let repaid_since = repaid.get(&advance.id).copied().unwrap_or(0);
        let outstanding_before = advance.outstanding_balance + repaid_since;
        let counts = advance.status.is_repayable() || repaid_since > 0;
        if counts && outstanding_before > 0 {
            positions
                .entry(advance.employee_id)
                .or_default()
                .push(LoanPosition {
                    cash_advance_id: advance.id,
                    outstanding_before,
                    agreed_installment: advance.agreed_installment,
                });
        }
    }
    Ok(positions)
}

/// Puts back the repayments an earlier finalization of `period_id` made for the given employees.
///
/// Returns the number of repayments reversed.
pub(crate) async fn reverse_period_repayments<C>(
    db: &C,
    period_id: i64,
    employee_ids: &[i64],
) -> Result<usize>
where
    C: ConnectionTrait,
{
    let repayments = LoanRepayment::find()
        .filter(loan_repayment::Column::PeriodId.eq(period_id))
        .filter(loan_repayment::Column::EmployeeId.is_in(employee_ids.iter().copied()))
        .all(db)
        .await?;

    let reversed = repayments.len();
    for repayment in repayments {
        let advance = get_cash_advance(db, repayment.cash_advance_id).await?;
        let restored_balance = advance.outstanding_balance + repayment.amount;
        let restored_status = if advance.status == CashAdvanceStatus::PaidOff {
            if advance.approved_principal == advance.requested_amount {
                CashAdvanceStatus::Approved
            } else {
                CashAdvanceStatus::Adjusted
            }
        } else {
            advance.status
        };

        let mut active_model: cash_advance::ActiveModel = advance.into();
        active_model.outstanding_balance = Set(restored_balance);
        active_model.status = Set(restored_status);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await?;

        repayment.delete(db).await?;
    }

    if reversed > 0 {
        debug!(
            "Reversed {} earlier repayments for period {}",
            reversed, period_id
        );
    }
    Ok(reversed)
}

/// Takes `deduction` off the employee's repayable advances and records the repayments.
///
/// An advance whose balance reaches zero is marked paid off.
pub(crate) async fn apply_repayments<C>(
    db: &C,
    period_id: i64,
    employee_id: i64,
    deduction: i64,
) -> Result<Vec<LoanAllocation>>
where
    C: ConnectionTrait,
{
    if deduction <= 0 {
        return Ok(Vec::new());
    }

    let advances: Vec<cash_advance::Model> = get_cash_advances_for_employee(db, employee_id)
        .await?
        .into_iter()
        .filter(|a| a.status.is_repayable() && a.outstanding_balance > 0)
        .collect();
    let positions: Vec<LoanPosition> = advances
        .iter()
        .map(|a| LoanPosition {
            cash_advance_id: a.id,
            outstanding_before: a.outstanding_balance,
            agreed_installment: a.agreed_installment,
        })
        .collect();

    let allocations = allocate_deduction(&positions, deduction);
    let now = Utc::now();
    for allocation in &allocations {
        let Some(advance) = advances.iter().find(|a| a.id == allocation.cash_advance_id) else {
            continue;
        };
        let new_balance = remaining_balance(advance.outstanding_balance, allocation.amount);

        let mut active_model: cash_advance::ActiveModel = advance.clone().into();
        active_model.outstanding_balance = Set(new_balance);
        if new_balance == 0 {
            active_model.status = Set(CashAdvanceStatus::PaidOff);
        }
        active_model.updated_at = Set(now);
        active_model.update(db).await?;

        loan_repayment::ActiveModel {
            period_id: Set(period_id),
            cash_advance_id: Set(allocation.cash_advance_id),
            employee_id: Set(employee_id),
            amount: Set(allocation.amount),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(allocations)
}
