//! Finalization - seals a period's draft into payroll records.
//!
//! Every record and every loan repayment of the period is written in a single
//! transaction. Records are upserted on (`period_id`, `employee_id`), so
//! finalizing a period a second time overwrites the earlier records; the loan
//! repayments of the earlier run are reversed first so installments are not taken twice.

use crate::{
    core::{
        draft::PayrollDraft,
        kasbon::{apply_repayments, reverse_period_repayments},
        period,
        proration::STANDARD_WORK_DAYS,
        wage::PROBATION_MONTHS,
    },
    entities::{Payroll, payroll},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue::NotSet, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict,
};
use tracing::{info, instrument};

/// Status written on every finalized record
pub const STATUS_FINALIZED: &str = "finalized";

/// Outcome of a successful finalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalizeSummary {
    /// Period finalized
    pub period_id: i64,
    /// Records written
    pub records: usize,
    /// Loan repayments written
    pub repayments: usize,
    /// Repayments of an earlier finalization that were reversed
    pub reversed_repayments: usize,
    /// Sum of take-home pay
    pub total_net: i64,
}

/// Checks that a draft can be sealed.
///
/// # Errors
/// - `Error::EmptyDraft` if there are no rows
/// - `Error::NegativeNetSalary` listing every employee whose net is below zero
pub fn validate_drafts(rows: &[PayrollDraft]) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::EmptyDraft);
    }
    let employee_ids: Vec<i64> = rows
        .iter()
        .filter(|row| row.net_total < 0)
        .map(|row| row.employee_id)
        .collect();
    if employee_ids.is_empty() {
        Ok(())
    } else {
        Err(Error::NegativeNetSalary { employee_ids })
    }
}

/// Human-readable summary of proration, rank and attendance flags for a record.
#[must_use]
pub fn build_notes(row: &PayrollDraft) -> String {
    let mut notes = Vec::new();

    if row.joined_after_period {
        notes.push("Joined after period end".to_string());
    }
    if !row.has_contract {
        notes.push("No active contract".to_string());
    } else if row.month_index <= PROBATION_MONTHS {
        notes.push(format!("Probation month {}", row.month_index));
    }
    if row.is_prorated {
        notes.push(format!(
            "Prorated {}/{} days",
            row.worked_days, STANDARD_WORK_DAYS
        ));
    }
    if let Some(rank) = row.rank {
        notes.push(format!("Rank #{rank}"));
    }
    match &row.attendance {
        None => notes.push("Attendance not synced".to_string()),
        Some(counts) => {
            if counts.sick > 0 {
                notes.push(if counts.has_sick_letter {
                    "Medical note attached".to_string()
                } else {
                    "Sick without medical note".to_string()
                });
            }
            if counts.late_present > 0 {
                notes.push(format!("Late x{}", counts.late_present));
            }
        }
    }

    notes.join("; ")
}

fn to_active_model(
    period_id: i64,
    row: &PayrollDraft,
    finalized_at: DateTimeUtc,
) -> payroll::ActiveModel {
    let breakdown = &row.attendance_breakdown;
    payroll::ActiveModel {
        id: NotSet,
        period_id: Set(period_id),
        employee_id: Set(row.employee_id),
        base_salary: Set(row.base_salary),
        commission: Set(row.commission),
        meal_allowance: Set(row.meal_allowance),
        incentive_bonus: Set(row.incentive_bonus_paid()),
        other_bonus: Set(row.other_bonus()),
        allowance_other: Set(row.allowance_other),
        deduction_sick: Set(breakdown.deduction_sick),
        deduction_permission: Set(breakdown.deduction_permission),
        deduction_absent: Set(breakdown.deduction_absent),
        deduction_saturday: Set(breakdown.deduction_saturday),
        deduction_late: Set(breakdown.deduction_late),
        attendance_deduction: Set(row.attendance_deduction),
        kasbon_deduction: Set(row.kasbon_deduction),
        remaining_loan: Set(row.remaining_loan),
        gross_total: Set(row.gross_total),
        total_deduction: Set(row.total_deduction()),
        net_total: Set(row.net_total),
        worked_days: Set(i32::try_from(row.worked_days).unwrap_or(i32::MAX)),
        is_prorated: Set(row.is_prorated),
        rank: Set(row.rank),
        notes: Set(build_notes(row)),
        status: Set(STATUS_FINALIZED.to_string()),
        finalized_at: Set(finalized_at),
    }
}

/// Writes the draft rows as the period's payroll records and applies their kasbon deductions.
///
/// All-or-nothing: if any write fails the transaction is rolled back and neither
/// records nor loan balances change.
#[instrument(skip(db, rows), fields(rows = rows.len()))]
pub async fn finalize_drafts(
    db: &DatabaseConnection,
    period_id: i64,
    rows: &[PayrollDraft],
) -> Result<FinalizeSummary> {
    validate_drafts(rows)?;

    let txn = db.begin().await?;
    let period = period::get_period(&txn, period_id).await?;

    let employee_ids: Vec<i64> = rows.iter().map(|row| row.employee_id).collect();
    let reversed_repayments = reverse_period_repayments(&txn, period_id, &employee_ids).await?;

    let mut repayments = 0;
    for row in rows {
        let allocations =
            apply_repayments(&txn, period_id, row.employee_id, row.kasbon_deduction).await?;
        repayments += allocations.len();
    }

    let now = Utc::now();
    let models = rows.iter().map(|row| to_active_model(period_id, row, now));
    let on_conflict = OnConflict::columns([payroll::Column::PeriodId, payroll::Column::EmployeeId])
        .update_columns([
            payroll::Column::BaseSalary,
            payroll::Column::Commission,
            payroll::Column::MealAllowance,
            payroll::Column::IncentiveBonus,
            payroll::Column::OtherBonus,
            payroll::Column::AllowanceOther,
            payroll::Column::DeductionSick,
            payroll::Column::DeductionPermission,
            payroll::Column::DeductionAbsent,
            payroll::Column::DeductionSaturday,
            payroll::Column::DeductionLate,
            payroll::Column::AttendanceDeduction,
            payroll::Column::KasbonDeduction,
            payroll::Column::RemainingLoan,
            payroll::Column::GrossTotal,
            payroll::Column::TotalDeduction,
            payroll::Column::NetTotal,
            payroll::Column::WorkedDays,
            payroll::Column::IsProrated,
            payroll::Column::Rank,
            payroll::Column::Notes,
            payroll::Column::Status,
            payroll::Column::FinalizedAt,
        ])
        .to_owned();
    Payroll::insert_many(models)
        .on_conflict(on_conflict)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    let summary = FinalizeSummary {
        period_id,
        records: rows.len(),
        repayments,
        reversed_repayments,
        total_net: rows.iter().map(|row| row.net_total).sum(),
    };
    info!(
        "Finalized payroll for {}: {} records, {} loan repayments, net total {}",
        period.name, summary.records, summary.repayments, summary.total_net
    );
    Ok(summary)
}

/// Loads the finalized records of a period, ordered by employee id.
pub async fn get_payroll_records<C>(db: &C, period_id: i64) -> Result<Vec<payroll::Model>>
where
    C: ConnectionTrait,
{
    Payroll::find()
        .filter(payroll::Column::PeriodId.eq(period_id))
        .order_by_asc(payroll::Column::EmployeeId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads one employee's finalized record for a period.
pub async fn get_payroll_record<C>(
    db: &C,
    period_id: i64,
    employee_id: i64,
) -> Result<Option<payroll::Model>>
where
    C: ConnectionTrait,
{
    Payroll::find()
        .filter(payroll::Column::PeriodId.eq(period_id))
        .filter(payroll::Column::EmployeeId.eq(employee_id))
        .one(db)
        .await
        .map_err(Into::into)
}
