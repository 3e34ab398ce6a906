//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the payroll source records (roster, contracts,
//! attendance, rankings, incentive rules, cash advances) and the finalized
//! payroll records the engine produces.

pub mod attendance_summary;
pub mod cash_advance;
pub mod contract;
pub mod employee;
pub mod incentive_rule;
pub mod loan_repayment;
pub mod monthly_ranking;
pub mod payroll;
pub mod payroll_period;

// Re-export specific types to avoid conflicts
pub use attendance_summary::{
    Column as AttendanceSummaryColumn, Entity as AttendanceSummary,
    Model as AttendanceSummaryModel,
};
pub use cash_advance::{
    CashAdvanceStatus, Column as CashAdvanceColumn, Entity as CashAdvance,
    Model as CashAdvanceModel,
};
pub use contract::{Column as ContractColumn, Entity as Contract, Model as ContractModel};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use incentive_rule::{
    Column as IncentiveRuleColumn, Entity as IncentiveRule, Model as IncentiveRuleModel,
};
pub use loan_repayment::{
    Column as LoanRepaymentColumn, Entity as LoanRepayment, Model as LoanRepaymentModel,
};
pub use monthly_ranking::{
    Column as MonthlyRankingColumn, Entity as MonthlyRanking, Model as MonthlyRankingModel,
};
pub use payroll::{Column as PayrollColumn, Entity as Payroll, Model as PayrollModel};
pub use payroll_period::{
    Column as PayrollPeriodColumn, Entity as PayrollPeriod, Model as PayrollPeriodModel,
};
