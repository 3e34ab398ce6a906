//! Shared test utilities for the payroll engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        contract::{self, NewContract},
        employee::{self, NewEmployee},
        kasbon, period,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date; panics on an invalid date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates the January 2025 period (2025-01-01 to 2025-01-31).
pub async fn create_test_period(db: &DatabaseConnection) -> Result<entities::payroll_period::Model> {
    period::create_period(
        db,
        "January 2025".to_string(),
        date(2025, 1, 1),
        date(2025, 1, 31),
    )
    .await
}

/// Creates an active test employee with sensible defaults.
///
/// # Defaults
/// * `outlet_name`: "Central"
/// * `join_date`: 2023-01-01, so tenure is well past probation in 2025
/// * no bank details
pub async fn create_test_employee(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::employee::Model> {
    employee::create_employee(
        db,
        NewEmployee {
            full_name: name.to_string(),
            outlet_name: "Central".to_string(),
            join_date: date(2023, 1, 1),
            bank_name: None,
            bank_account_number: None,
        },
    )
    .await
}

/// Activates a permanent contract with the given nominal rate.
///
/// # Defaults
/// * experienced, dine-in
/// * `daily_meal_rate`: 10,000
pub async fn create_test_contract(
    db: &DatabaseConnection,
    employee_id: i64,
    nominal_rate: i64,
) -> Result<entities::contract::Model> {
    contract::activate_contract(
        db,
        NewContract {
            employee_id,
            nominal_rate,
            experience_level: "experienced".to_string(),
            outlet_type: "dine_in".to_string(),
            daily_meal_rate: 10_000,
            contract_type: "permanent".to_string(),
            start_date: date(2023, 1, 1),
            end_date: None,
        },
    )
    .await
}

/// Requests and approves a cash advance for exactly the requested amount.
pub async fn create_approved_advance(
    db: &DatabaseConnection,
    employee_id: i64,
    principal: i64,
    installment: i64,
) -> Result<entities::cash_advance::Model> {
    let request = kasbon::request_cash_advance(db, employee_id, principal, None).await?;
    kasbon::approve_cash_advance(db, request.id, principal, installment).await
}
