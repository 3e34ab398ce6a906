//! Core business logic - framework-agnostic payroll computation.
//!
//! The calculators (`wage`, `proration`, `attendance`, `incentive`, `kasbon`) are
//! pure functions over fetched data. `generate` combines them into draft rows,
//! `draft` owns the editing session and `finalize` seals it.

pub mod attendance;
pub mod contract;
pub mod draft;
pub mod employee;
pub mod finalize;
pub mod generate;
pub mod incentive;
pub mod kasbon;
pub mod period;
pub mod proration;
pub mod report;
pub mod wage;
