//! Payroll draft rows and the editing session that owns them.
//!
//! A [`PayrollDraft`] is one employee's computed pay for a period. Operators may
//! override individual amounts before finalizing; every override goes through
//! [`PayrollDraft::edit`], which returns a new row with gross, net and the
//! remaining loan balance recomputed, so the totals cannot drift from their inputs.
//!
//! A [`PayrollSession`] holds the draft rows of one period for one operator:
//!
//! ```text
//! uninitialized --generate--> generated --edit--> editing --finalize--> finalized
//!                                 |  ^              |  |
//!                                 |  +--generate----+  +--discard--> discarded
//!                                 +----------------discard---------> discarded
//! ```

use crate::{
    config::PayrollConfig,
    core::{
        attendance::{AttendanceAdjustment, AttendanceCounts},
        finalize::{self, FinalizeSummary},
        generate,
        kasbon::remaining_balance,
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// Draft amounts an operator may override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    /// Base salary after proration
    BaseSalary,
    /// Sales commission
    Commission,
    /// Total bonus, ranking incentive included
    Bonus,
    /// Meal allowance
    MealAllowance,
    /// Other allowances
    Allowance,
    /// Attendance deduction
    AttendanceDeduction,
    /// Cash advance installment
    KasbonDeduction,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaseSalary => "base salary",
            Self::Commission => "commission",
            Self::Bonus => "bonus",
            Self::MealAllowance => "meal allowance",
            Self::Allowance => "allowance",
            Self::AttendanceDeduction => "attendance deduction",
            Self::KasbonDeduction => "kasbon deduction",
        };
        f.write_str(name)
    }
}

/// Conditions an operator should look at before finalizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFlag {
    /// No active contract; base salary defaulted to zero
    MissingContract,
    /// No attendance summary imported for the period
    AttendanceNotSynced,
    /// Late arrivals (HT) recorded; no penalty unless configured
    LatePresence {
        /// Number of late days
        days: i32,
    },
    /// Sick days recorded without a medical note
    SickWithoutLetter,
    /// Kasbon deduction is larger than the outstanding balance
    KasbonExceedsBalance,
    /// Deductions exceed gross pay
    NegativeNet,
    /// Employee joined after the period ended
    JoinedAfterPeriod,
}

/// One employee's payroll for the period, as computed and possibly overridden
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollDraft {
    /// Employee being paid
    pub employee_id: i64,
    /// Employee name
    pub full_name: String,
    /// Outlet the employee works at
    pub outlet_name: String,
    /// Payout bank
    pub bank_name: Option<String>,
    /// Payout account
    pub bank_account_number: Option<String>,

    /// Whether an active contract was found
    pub has_contract: bool,
    /// Whether the join date falls after the period end
    pub joined_after_period: bool,
    /// Attendance counters, `None` when not yet imported
    pub attendance: Option<AttendanceCounts>,
    /// Tenure month at the period reference date
    pub month_index: u32,
    /// Days the base salary was computed from
    pub worked_days: i64,
    /// Whether the base salary was prorated
    pub is_prorated: bool,
    /// Rank position held this period
    pub rank: Option<i32>,

    /// Base salary
    pub base_salary: i64,
    /// Sales commission
    pub commission: i64,
    /// Meal allowance
    pub meal_allowance: i64,
    /// Total bonus, ranking incentive included
    pub bonus: i64,
    /// Ranking incentive resolved from the rule table
    pub incentive_bonus: i64,
    /// Other allowances
    pub allowance_other: i64,

    /// Attendance deductions as computed, by category
    pub attendance_breakdown: AttendanceAdjustment,
    /// Attendance deduction applied
    pub attendance_deduction: i64,
    /// Kasbon installment applied
    pub kasbon_deduction: i64,
    /// Kasbon owed before this period
    pub outstanding_before: i64,
    /// Kasbon owed after this period
    pub remaining_loan: i64,

    /// Gross earnings
    pub gross_total: i64,
    /// Take-home pay; negative when deductions exceed earnings
    pub net_total: i64,
}

/// Largest amount an operator may enter on a draft row (one trillion Rupiah)
pub const MAX_DRAFT_AMOUNT: i64 = 1_000_000_000_000;

impl PayrollDraft {
    /// Recomputes every derived amount from the row's inputs.
    #[must_use]
    pub fn recompute(mut self) -> Self {
        self.gross_total = [
            self.base_salary,
            self.commission,
            self.bonus,
            self.allowance_other,
            self.meal_allowance,
        ]
        .into_iter()
        .fold(0_i64, i64::saturating_add);
        self.net_total = self.gross_total.saturating_sub(self.total_deduction());
        self.remaining_loan = remaining_balance(self.outstanding_before, self.kasbon_deduction);
        self
    }

    /// Returns the row with `field` set to `value` and all totals recomputed.
    ///
    /// # Errors
    /// Returns `Error::InvalidAmount` for negative values and values above
    /// [`MAX_DRAFT_AMOUNT`].
    pub fn edit(mut self, field: DraftField, value: i64) -> Result<Self> {
        if !(0..=MAX_DRAFT_AMOUNT).contains(&value) {
            return Err(Error::InvalidAmount { amount: value });
        }

        let slot = match field {
            DraftField::BaseSalary => &mut self.base_salary,
            DraftField::Commission => &mut self.commission,
            DraftField::Bonus => &mut self.bonus,
            DraftField::MealAllowance => &mut self.meal_allowance,
            DraftField::Allowance => &mut self.allowance_other,
            DraftField::AttendanceDeduction => &mut self.attendance_deduction,
            DraftField::KasbonDeduction => &mut self.kasbon_deduction,
        };
        *slot = value;
        Ok(self.recompute())
    }

    /// Attendance plus kasbon deductions
    #[must_use]
    pub const fn total_deduction(&self) -> i64 {
        self.attendance_deduction.saturating_add(self.kasbon_deduction)
    }

    /// Part of the bonus that pays the ranking incentive.
    ///
    /// Capped at the bonus actually granted, so an operator cutting the bonus
    /// cuts the incentive first.
    #[must_use]
    pub fn incentive_bonus_paid(&self) -> i64 {
        self.incentive_bonus.min(self.bonus).max(0)
    }

    /// Part of the bonus granted on top of the ranking incentive
    #[must_use]
    pub fn other_bonus(&self) -> i64 {
        self.bonus - self.incentive_bonus_paid()
    }

    /// Conditions on this row that need an operator's attention.
    #[must_use]
    pub fn review_flags(&self) -> Vec<ReviewFlag> {
        let mut flags = Vec::new();
        if self.joined_after_period {
            flags.push(ReviewFlag::JoinedAfterPeriod);
        }
        if !self.has_contract {
            flags.push(ReviewFlag::MissingContract);
        }
        match &self.attendance {
            None => flags.push(ReviewFlag::AttendanceNotSynced),
            Some(counts) => {
                if counts.late_present > 0 {
                    flags.push(ReviewFlag::LatePresence {
                        days: counts.late_present,
                    });
                }
                if counts.sick > 0 && !counts.has_sick_letter {
                    flags.push(ReviewFlag::SickWithoutLetter);
                }
            }
        }
        if self.kasbon_deduction > self.outstanding_before {
            flags.push(ReviewFlag::KasbonExceedsBalance);
        }
        if self.net_total < 0 {
            flags.push(ReviewFlag::NegativeNet);
        }
        flags
    }
}

/// Where a payroll session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No draft generated yet
    Uninitialized,
    /// Draft generated, untouched
    Generated,
    /// Draft has operator overrides
    Editing,
    /// Draft persisted as payroll records
    Finalized,
    /// Draft thrown away
    Discarded,
}

impl SessionState {
    /// Whether the session accepts no further operations
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Discarded)
    }

    const fn has_draft(self) -> bool {
        matches!(self, Self::Generated | Self::Editing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Generated => "generated",
            Self::Editing => "editing",
            Self::Finalized => "finalized",
            Self::Discarded => "discarded",
        };
        f.write_str(name)
    }
}

/// Period-wide sums over a draft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DraftTotals {
    /// Number of rows
    pub employees: usize,
    /// Sum of gross pay
    pub gross_total: i64,
    /// Sum of deductions
    pub total_deduction: i64,
    /// Sum of take-home pay
    pub net_total: i64,
}

/// The draft set of one period, owned by the operator editing it
#[derive(Debug, Clone)]
pub struct PayrollSession {
    period_id: i64,
    state: SessionState,
    rows: Vec<PayrollDraft>,
}

impl PayrollSession {
    /// Starts an empty session for a period.
    #[must_use]
    pub const fn new(period_id: i64) -> Self {
        Self {
            period_id,
            state: SessionState::Uninitialized,
            rows: Vec::new(),
        }
    }

    /// Starts a session from rows built elsewhere, recomputing their totals.
    #[must_use]
    pub fn from_rows(period_id: i64, rows: Vec<PayrollDraft>) -> Self {
        Self {
            period_id,
            state: SessionState::Generated,
            rows: rows.into_iter().map(PayrollDraft::recompute).collect(),
        }
    }

    /// Period this session pays
    #[must_use]
    pub const fn period_id(&self) -> i64 {
        self.period_id
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Draft rows, ordered by employee name
    #[must_use]
    pub fn rows(&self) -> &[PayrollDraft] {
        &self.rows
    }

    /// The draft row of one employee
    #[must_use]
    pub fn row(&self, employee_id: i64) -> Option<&PayrollDraft> {
        self.rows.iter().find(|row| row.employee_id == employee_id)
    }

    /// Rows with at least one review flag
    pub fn flagged_rows(&self) -> impl Iterator<Item = &PayrollDraft> {
        self.rows
            .iter()
            .filter(|row| !row.review_flags().is_empty())
    }

    /// Sums over all rows
    #[must_use]
    pub fn totals(&self) -> DraftTotals {
        self.rows.iter().fold(
            DraftTotals {
                employees: self.rows.len(),
                ..DraftTotals::default()
            },
            |acc, row| DraftTotals {
                gross_total: acc.gross_total.saturating_add(row.gross_total),
                total_deduction: acc.total_deduction.saturating_add(row.total_deduction()),
                net_total: acc.net_total.saturating_add(row.net_total),
                ..acc
            },
        )
    }

    fn ensure(&self, action: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidSessionState {
                action,
                state: self.state,
            })
        }
    }

    /// Builds a fresh draft for the period from the current source records.
    ///
    /// Any overrides made so far are dropped. If reading the source records
    /// fails the session is left exactly as it was.
    #[instrument(skip(self, db, config), fields(period_id = self.period_id))]
    pub async fn generate(
        &mut self,
        db: &DatabaseConnection,
        config: &PayrollConfig,
    ) -> Result<&[PayrollDraft]> {
        self.ensure("generate", !self.state.is_terminal())?;
        if self.state == SessionState::Editing {
            warn!("Regenerating period {} discards operator edits", self.period_id);
        }

        let snapshot = generate::load_period_snapshot(db, self.period_id).await?;
        self.rows = generate::build_draft_rows(&snapshot, config);
        self.state = SessionState::Generated;

        info!(
            "Generated payroll draft for period {} with {} employees",
            self.period_id,
            self.rows.len()
        );
        Ok(&self.rows)
    }

    /// Overrides one amount on one employee's row and returns the recomputed row.
    ///
    /// # Errors
    /// - `Error::InvalidSessionState` if there is no draft to edit
    /// - `Error::DraftRowNotFound` if the employee has no row
    /// - `Error::InvalidAmount` for negative values or values above [`MAX_DRAFT_AMOUNT`]
    pub fn edit(
        &mut self,
        employee_id: i64,
        field: DraftField,
        value: i64,
    ) -> Result<&PayrollDraft> {
        self.ensure("edit", self.state.has_draft())?;

        let index = self
            .rows
            .iter()
            .position(|row| row.employee_id == employee_id)
            .ok_or(Error::DraftRowNotFound { employee_id })?;

        let updated = self.rows[index].clone().edit(field, value)?;
        debug!(
            "Employee {}: {} set to {}, net now {}",
            employee_id, field, value, updated.net_total
        );
        self.rows[index] = updated;
        self.state = SessionState::Editing;
        Ok(&self.rows[index])
    }

    /// Throws the draft away without touching persisted records.
    pub fn discard(&mut self) -> Result<()> {
        self.ensure("discard", !self.state.is_terminal())?;
        self.rows.clear();
        self.state = SessionState::Discarded;
        info!("Discarded payroll draft for period {}", self.period_id);
        Ok(())
    }

    /// Persists the draft as the period's payroll records.
    ///
    /// All records and loan repayments are written in one transaction; on failure
    /// nothing is written and the session keeps its draft so the operator can retry.
    pub async fn finalize(&mut self, db: &DatabaseConnection) -> Result<FinalizeSummary> {
        self.ensure("finalize", self.state.has_draft())?;
        let summary = finalize::finalize_drafts(db, self.period_id, &self.rows).await?;
        self.state = SessionState::Finalized;
        Ok(summary)
    }
}
