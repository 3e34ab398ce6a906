//! Database configuration module for the payroll engine.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust structs.
//! The per-period uniqueness rules (one attendance summary, one ranking and one
//! payroll record per employee per period, one repayment per advance per period)
//! are composite unique indexes created alongside the tables.

use crate::entities::{
    AttendanceSummary, AttendanceSummaryColumn, CashAdvance, Contract, Employee, IncentiveRule,
    LoanRepayment, LoanRepaymentColumn, MonthlyRanking, MonthlyRankingColumn, Payroll,
    PayrollColumn, PayrollPeriod,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement, TableCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/payroll.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
#[instrument]
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every payroll table and its unique indexes if they do not exist yet.
///
/// Parent tables are created before the tables holding foreign keys to them.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables: [TableCreateStatement; 9] = [
        schema.create_table_from_entity(Employee),
        schema.create_table_from_entity(PayrollPeriod),
        schema.create_table_from_entity(Contract),
        schema.create_table_from_entity(AttendanceSummary),
        schema.create_table_from_entity(IncentiveRule),
        schema.create_table_from_entity(MonthlyRanking),
        schema.create_table_from_entity(CashAdvance),
        schema.create_table_from_entity(LoanRepayment),
        schema.create_table_from_entity(Payroll),
    ];
    for mut table in tables {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Payroll tables and unique indexes ensured");
    Ok(())
}

fn unique_indexes() -> [IndexCreateStatement; 4] {
    [
        Index::create()
            .name("idx_attendance_period_employee")
            .table(AttendanceSummary)
            .col(AttendanceSummaryColumn::PeriodId)
            .col(AttendanceSummaryColumn::EmployeeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_ranking_period_employee")
            .table(MonthlyRanking)
            .col(MonthlyRankingColumn::PeriodId)
            .col(MonthlyRankingColumn::EmployeeId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_repayment_period_advance")
            .table(LoanRepayment)
            .col(LoanRepaymentColumn::PeriodId)
            .col(LoanRepaymentColumn::CashAdvanceId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_payroll_period_employee")
            .table(Payroll)
            .col(PayrollColumn::PeriodId)
            .col(PayrollColumn::EmployeeId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EmployeeModel, PayrollModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<EmployeeModel> = Employee::find().limit(1).all(&db).await?;
        let _: Vec<PayrollModel> = Payroll::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<EmployeeModel> = Employee::find().limit(1).all(&db).await?;
        Ok(())
    }
}
