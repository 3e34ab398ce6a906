//! Unified error type for the payroll engine.

use crate::core::draft::SessionState;
use thiserror::Error;

/// Every failure the payroll engine can surface to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A caller-supplied value failed validation
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the value
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A monetary amount was rejected (negative or otherwise unusable)
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: i64,
    },

    /// Referenced employee does not exist
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// Requested employee id
        employee_id: i64,
    },

    /// Referenced payroll period does not exist
    #[error("Payroll period not found: {period_id}")]
    PeriodNotFound {
        /// Requested period id
        period_id: i64,
    },

    /// Referenced cash advance does not exist
    #[error("Cash advance not found: {cash_advance_id}")]
    CashAdvanceNotFound {
        /// Requested cash advance id
        cash_advance_id: i64,
    },

    /// Cash advance is not in a state that allows the requested change
    #[error("Cash advance {cash_advance_id} cannot be changed while {status}")]
    InvalidCashAdvanceStatus {
        /// Cash advance id
        cash_advance_id: i64,
        /// Current status
        status: String,
    },

    /// An incentive rule for this rank already exists
    #[error("An incentive rule for rank {rank_position} already exists")]
    DuplicateIncentiveRank {
        /// The conflicting rank position
        rank_position: i32,
    },

    /// Rank positions start at 1
    #[error("Invalid rank position: {rank_position}")]
    InvalidRankPosition {
        /// The rejected rank position
        rank_position: i32,
    },

    /// Session operation not allowed in the current state
    #[error("Cannot {action} a payroll session that is {state}")]
    InvalidSessionState {
        /// Attempted operation
        action: &'static str,
        /// Current session state
        state: SessionState,
    },

    /// Edit targeted an employee that has no row in the draft
    #[error("No draft row for employee {employee_id}")]
    DraftRowNotFound {
        /// Requested employee id
        employee_id: i64,
    },

    /// Finalize was called on a draft with no rows
    #[error("Draft has no rows to finalize")]
    EmptyDraft,

    /// One or more rows would be finalized with a negative take-home pay
    #[error("Net salary is negative for employees {employee_ids:?}")]
    NegativeNetSalary {
        /// Employees needing manual correction
        employee_ids: Vec<i64>,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
