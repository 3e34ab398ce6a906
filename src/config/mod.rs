/// Database configuration and connection management
pub mod database;

/// Payroll policy configuration loaded from payroll.toml
pub mod payroll;

pub use payroll::{PayrollConfig, load_config, load_config_or_default};
