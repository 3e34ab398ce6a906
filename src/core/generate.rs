//! Draft generation - combines every calculator into one row per eligible employee.
//!
//! Generation runs in two steps. [`load_period_snapshot`] reads everything the
//! period needs from the database; if any read fails nothing is returned. The
//! snapshot is then turned into draft rows by [`build_draft_rows`], which does
//! no I/O.

use crate::{
    config::PayrollConfig,
    core::{
        attendance::{self, AttendanceCounts, calculate_attendance_adjustment},
        contract, employee,
        draft::PayrollDraft,
        incentive::{self, resolve_incentive},
        kasbon::{self, LoanPosition, summarize_loans},
        period,
        proration::{actual_worked_days, compute_base_salary, needs_proration},
        wage::{WageTier, resolve_wage_rate, tenure_month_index},
    },
    entities::{contract as contract_entity, employee as employee_entity, incentive_rule, payroll_period},
    errors::Result,
};
use sea_orm::ConnectionTrait;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Everything draft generation reads for one period
#[derive(Debug, Clone)]
pub struct PeriodSnapshot {
    /// The period being paid
    pub period: payroll_period::Model,
    /// Eligible employees, ordered by name
    pub employees: Vec<employee_entity::Model>,
    /// Active contracts by employee id
    pub contracts: HashMap<i64, contract_entity::Model>,
    /// Attendance counters by employee id
    pub attendance: HashMap<i64, AttendanceCounts>,
    /// Rank positions by employee id
    pub ranks: HashMap<i64, i32>,
    /// Incentive rule table
    pub rules: Vec<incentive_rule::Model>,
    /// Repayable advances by employee id, oldest first
    pub loans: HashMap<i64, Vec<LoanPosition>>,
}

/// Reads the roster, contracts, attendance, ranks, rules and loans of a period.
#[instrument(skip(db))]
pub async fn load_period_snapshot<C>(db: &C, period_id: i64) -> Result<PeriodSnapshot>
where
    C: ConnectionTrait,
{
    let period = period::get_period(db, period_id).await?;
    let employees = employee::get_eligible_employees(db, &period).await?;
    let contracts = contract::get_active_contracts(db).await?;
    let attendance = attendance::get_attendance_for_period(db, period_id).await?;
    let ranks = incentive::get_ranks_for_period(db, period_id).await?;
    let rules = incentive::list_incentive_rules(db).await?;
    let loans = kasbon::load_loan_positions(db, period_id).await?;

    debug!(
        "Loaded period {}: {} employees, {} contracts, {} attendance summaries",
        period.name,
        employees.len(),
        contracts.len(),
        attendance.len()
    );

    Ok(PeriodSnapshot {
        period,
        employees,
        contracts,
        attendance,
        ranks,
        rules,
        loans,
    })
}

/// Builds the draft row of one employee from the period snapshot.
#[must_use]
pub fn build_draft_row(
    employee: &employee_entity::Model,
    snapshot: &PeriodSnapshot,
    config: &PayrollConfig,
) -> PayrollDraft {
    let period = &snapshot.period;
    let reference = period::reference_date(period, config.cutoff_day);
    let attendance = snapshot.attendance.get(&employee.id).copied();
    let contract = snapshot.contracts.get(&employee.id);

    // No contract means no rate to pay from, probation matrix included
    let (rate, month_index, daily_meal_rate) = match contract {
        Some(contract) => {
            let tier = WageTier::from_contract(&contract.experience_level, &contract.outlet_type);
            let wage = resolve_wage_rate(
                contract.nominal_rate,
                tier,
                employee.join_date,
                reference,
                &config.probation_rates,
            );
            (wage.rate, wage.month_index, contract.daily_meal_rate)
        }
        None => {
            warn!(
                "Employee {} ({}) has no active contract; base salary set to 0",
                employee.id, employee.full_name
            );
            (0, tenure_month_index(employee.join_date, reference), 0)
        }
    };

    let worked_days = actual_worked_days(attendance.as_ref());
    let prorated = needs_proration(
        employee.join_date,
        employee.resign_date,
        period.start_date,
        period.end_date,
        month_index,
    );
    let salary = compute_base_salary(rate, worked_days, prorated);

    let adjustment = calculate_attendance_adjustment(
        attendance.as_ref(),
        daily_meal_rate,
        &config.penalties,
        &config.meal_allowance,
    );

    let rank = snapshot.ranks.get(&employee.id).copied();
    let incentive_bonus = resolve_incentive(rank, &snapshot.rules);

    let loans = snapshot
        .loans
        .get(&employee.id)
        .map_or(&[][..], Vec::as_slice);
    let kasbon = summarize_loans(loans);

    PayrollDraft {
        employee_id: employee.id,
        full_name: employee.full_name.clone(),
        outlet_name: employee.outlet_name.clone(),
        bank_name: employee.bank_name.clone(),
        bank_account_number: employee.bank_account_number.clone(),
        has_contract: contract.is_some(),
        joined_after_period: employee.join_date > period.end_date,
        attendance,
        month_index,
        worked_days: salary.worked_days,
        is_prorated: salary.is_prorated,
        rank,
        base_salary: salary.base_salary,
        commission: 0,
        meal_allowance: adjustment.meal_allowance,
        bonus: incentive_bonus,
        incentive_bonus,
        allowance_other: 0,
        attendance_breakdown: adjustment,
        attendance_deduction: adjustment.total_deduction(),
        kasbon_deduction: kasbon.deduction,
        outstanding_before: kasbon.outstanding_before,
        remaining_loan: kasbon.remaining,
        gross_total: 0,
        net_total: 0,
    }
    .recompute()
}

/// Builds one draft row per eligible employee, in roster order.
#[must_use]
pub fn build_draft_rows(snapshot: &PeriodSnapshot, config: &PayrollConfig) -> Vec<PayrollDraft> {
    snapshot
        .employees
        .iter()
        .map(|employee| build_draft_row(employee, snapshot, config))
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{
            draft::{PayrollSession, ReviewFlag, SessionState},
            wage::ProbationMatrix,
        },
        errors::Error,
        test_utils::*,
    };
    use chrono::{NaiveDate, Utc};

    fn january() -> payroll_period::Model {
        payroll_period::Model {
            id: 1,
            name: "January 2025".to_string(),
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            created_at: Utc::now(),
        }
    }

    fn employee(id: i64, join_date: NaiveDate) -> employee_entity::Model {
        employee_entity::Model {
            id,
            full_name: format!("Crew {id}"),
            outlet_name: "Central".to_string(),
            join_date,
            resign_date: None,
            is_active: true,
            bank_name: Some("BCA".to_string()),
            bank_account_number: Some("1234567890".to_string()),
        }
    }

    fn contract(employee_id: i64, nominal_rate: i64, daily_meal_rate: i64) -> contract_entity::Model {
        contract_entity::Model {
            id: employee_id,
            employee_id,
            nominal_rate,
            experience_level: "experienced".to_string(),
            outlet_type: "dine_in".to_string(),
            daily_meal_rate,
            contract_type: "permanent".to_string(),
            start_date: date(2023, 1, 1),
            end_date: None,
            is_active: true,
        }
    }

    fn snapshot(employees: Vec<employee_entity::Model>) -> PeriodSnapshot {
        PeriodSnapshot {
            period: january(),
            employees,
            contracts: HashMap::new(),
            attendance: HashMap::new(),
            ranks: HashMap::new(),
            rules: Vec::new(),
            loans: HashMap::new(),
        }
    }

    fn config_without_matrix() -> PayrollConfig {
        PayrollConfig {
            probation_rates: ProbationMatrix::empty(),
            ..PayrollConfig::default()
        }
    }

    #[test]
    fn test_mid_period_joiner_is_prorated() {
        let mut snap = snapshot(vec![employee(1, date(2025, 1, 15))]);
        snap.contracts.insert(1, contract(1, 2_000_000, 0));
        snap.attendance.insert(
            1,
            AttendanceCounts {
                present: 13,
                ..AttendanceCounts::default()
            },
        );

        let rows = build_draft_rows(&snap, &config_without_matrix());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.month_index, 1);
        assert!(row.is_prorated);
        assert_eq!(row.worked_days, 13);
        assert_eq!(row.base_salary, 1_000_000);
        assert_eq!(row.gross_total, 1_000_000);
        assert_eq!(row.net_total, 1_000_000);
    }

    #[test]
    fn test_probation_rate_overrides_nominal() {
        let mut snap = snapshot(vec![employee(1, date(2024, 12, 1))]);
        snap.contracts.insert(1, contract(1, 3_000_000, 0));
        snap.attendance.insert(
            1,
            AttendanceCounts {
                present: 26,
                ..AttendanceCounts::default()
            },
        );

        let row = build_draft_row(&snap.employees[0], &snap, &PayrollConfig::default());
        assert_eq!(row.month_index, 2);
        assert!(!row.is_prorated);
        assert_eq!(row.base_salary, 2_200_000);
    }

    #[test]
    fn test_full_tenure_row() {
        let mut snap = snapshot(vec![employee(1, date(2023, 3, 1))]);
        snap.contracts.insert(1, contract(1, 2_750_000, 15_000));
        snap.attendance.insert(
            1,
            AttendanceCounts {
                present: 22,
                late_present: 1,
                sick: 2,
                permission: 1,
                saturday_off: 1,
                ..AttendanceCounts::default()
            },
        );
        snap.ranks.insert(1, 1);
        snap.rules.push(incentive_rule::Model {
            id: 1,
            rank_position: 1,
            bonus_amount: 500_000,
            description: None,
        });
        snap.loans.insert(
            1,
            vec![LoanPosition {
                cash_advance_id: 9,
                outstanding_before: 300_000,
                agreed_installment: 100_000,
            }],
        );

        let row = build_draft_row(&snap.employees[0], &snap, &PayrollConfig::default());
        assert!(!row.is_prorated);
        assert_eq!(row.base_salary, 2_750_000);
        assert_eq!(row.meal_allowance, 23 * 15_000);
        assert_eq!(row.attendance_deduction, 160_000);
        assert_eq!(row.attendance_breakdown.deduction_sick, 100_000);
        assert_eq!(row.bonus, 500_000);
        assert_eq!(row.incentive_bonus, 500_000);
        assert_eq!(row.kasbon_deduction, 100_000);
        assert_eq!(row.remaining_loan, 200_000);
        assert_eq!(row.gross_total, 2_750_000 + 345_000 + 500_000);
        assert_eq!(row.net_total, row.gross_total - 260_000);
        assert!(row.review_flags().contains(&ReviewFlag::LatePresence { days: 1 }));
    }

    #[test]
    fn test_missing_contract_still_gets_a_row() {
        let snap = snapshot(vec![employee(1, date(2025, 1, 1))]);
        let row = build_draft_row(&snap.employees[0], &snap, &PayrollConfig::default());

        // The probation matrix has a rate for month 1 but there is no contract to apply it to
        assert_eq!(row.base_salary, 0);
        assert!(!row.has_contract);
        assert!(row.review_flags().contains(&ReviewFlag::MissingContract));
    }

    #[test]
    fn test_missing_attendance_pays_full_period() {
        let mut snap = snapshot(vec![employee(1, date(2022, 1, 1))]);
        snap.contracts.insert(1, contract(1, 2_600_000, 10_000));

        let row = build_draft_row(&snap.employees[0], &snap, &PayrollConfig::default());
        assert_eq!(row.worked_days, 26);
        assert_eq!(row.base_salary, 2_600_000);
        assert_eq!(row.meal_allowance, 260_000);
        assert_eq!(row.attendance_deduction, 0);
        assert!(row.review_flags().contains(&ReviewFlag::AttendanceNotSynced));
    }

    #[test]
    fn test_joiner_after_period_end_is_flagged() {
        let mut snap = snapshot(vec![
            employee(1, date(2025, 2, 10)),
            employee(2, date(2025, 1, 31)),
        ]);
        snap.contracts.insert(1, contract(1, 2_600_000, 0));
        snap.contracts.insert(2, contract(2, 2_600_000, 0));

        let rows = build_draft_rows(&snap, &config_without_matrix());
        assert!(rows[0].joined_after_period);
        assert!(rows[0].review_flags().contains(&ReviewFlag::JoinedAfterPeriod));

        // Joining on the last day still belongs to the period
        assert!(!rows[1].joined_after_period);
        assert!(!rows[1].review_flags().contains(&ReviewFlag::JoinedAfterPeriod));
    }

    #[test]
    fn test_leaver_is_prorated() {
        let mut leaver = employee(1, date(2022, 1, 1));
        leaver.resign_date = Some(date(2025, 1, 14));
        leaver.is_active = false;
        let mut snap = snapshot(vec![leaver]);
        snap.contracts.insert(1, contract(1, 2_600_000, 0));
        snap.attendance.insert(
            1,
            AttendanceCounts {
                present: 10,
                ..AttendanceCounts::default()
            },
        );

        let row = build_draft_row(&snap.employees[0], &snap, &PayrollConfig::default());
        assert!(row.is_prorated);
        assert_eq!(row.base_salary, 1_000_000);
    }

    #[tokio::test]
    async fn test_session_generates_from_database() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db).await?;
        let budi = create_test_employee(&db, "Budi").await?;
        let sari = create_test_employee(&db, "Sari").await?;
        create_test_contract(&db, budi.id, 2_600_000).await?;

        attendance::record_attendance_summary(
            &db,
            period.id,
            budi.id,
            &AttendanceCounts {
                present: 24,
                sick: 2,
                ..AttendanceCounts::default()
            },
        )
        .await?;
        incentive::create_incentive_rule(&db, 1, 500_000, None).await?;
        incentive::assign_rank(&db, period.id, budi.id, 1).await?;
        create_approved_advance(&db, budi.id, 300_000, 100_000).await?;

        let mut session = PayrollSession::new(period.id);
        session.generate(&db, &PayrollConfig::default()).await?;
        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.rows().len(), 2);

        let row = session.row(budi.id).unwrap();
        assert_eq!(row.base_salary, 2_600_000);
        assert_eq!(row.attendance_deduction, 100_000);
        assert_eq!(row.bonus, 500_000);
        assert_eq!(row.kasbon_deduction, 100_000);
        assert_eq!(row.remaining_loan, 200_000);

        assert!(!session.row(sari.id).unwrap().has_contract);
        Ok(())
    }

    #[tokio::test]
    async fn test_regenerate_discards_edits() -> Result<()> {
        let db = setup_test_db().await?;
        let period = create_test_period(&db).await?;
        let employee = create_test_employee(&db, "Budi").await?;
        create_test_contract(&db, employee.id, 2_600_000).await?;

        let config = PayrollConfig::default();
        let mut session = PayrollSession::new(period.id);
        session.generate(&db, &config).await?;
        let generated = session.rows().to_vec();

        session.edit(employee.id, crate::core::draft::DraftField::Commission, 250_000)?;
        assert_eq!(session.state(), SessionState::Editing);

        session.generate(&db, &config).await?;
        assert_eq!(session.state(), SessionState::Generated);
        assert_eq!(session.rows(), generated.as_slice());
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_unknown_period_leaves_session_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let mut session = PayrollSession::new(42);

        let result = session.generate(&db, &PayrollConfig::default()).await;
        assert!(matches!(result, Err(Error::PeriodNotFound { period_id: 42 })));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.rows().is_empty());
        Ok(())
    }
}
