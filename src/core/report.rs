//! Report formatting for payroll drafts and records.
//!
//! Plain-text output for operators reviewing a period: amounts are shown in
//! Rupiah with dot thousand separators.

use crate::core::draft::{PayrollDraft, PayrollSession, ReviewFlag};
use std::fmt;

impl fmt::Display for ReviewFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingContract => f.write_str("no active contract"),
            Self::AttendanceNotSynced => f.write_str("attendance not synced"),
            Self::LatePresence { days } => write!(f, "late {days}x"),
            Self::SickWithoutLetter => f.write_str("sick without medical note"),
            Self::KasbonExceedsBalance => f.write_str("kasbon above outstanding balance"),
            Self::NegativeNet => f.write_str("negative net salary"),
            Self::JoinedAfterPeriod => f.write_str("joined after period end"),
        }
    }
}

/// Formats an amount as Rupiah, e.g. `Rp 1.250.000` or `-Rp 50.000`.
#[must_use]
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if amount < 0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

/// One line per draft row: name, outlet, gross, deductions, net and any review flags.
#[must_use]
pub fn format_draft_row(row: &PayrollDraft) -> String {
    let mut line = format!(
        "{} ({}) | gross {} | deductions {} | net {}",
        row.full_name,
        row.outlet_name,
        format_rupiah(row.gross_total),
        format_rupiah(row.total_deduction()),
        format_rupiah(row.net_total),
    );

    let flags = row.review_flags();
    if !flags.is_empty() {
        let flags: Vec<String> = flags.iter().map(ToString::to_string).collect();
        line.push_str(" | review: ");
        line.push_str(&flags.join(", "));
    }
    line
}

/// Summarizes a whole session: one line per row followed by the period totals.
#[must_use]
pub fn format_draft_summary(session: &PayrollSession) -> String {
    let mut lines: Vec<String> = session.rows().iter().map(format_draft_row).collect();

    let totals = session.totals();
    let flagged = session.flagged_rows().count();
    lines.push(format!(
        "{} employees ({} flagged) | gross {} | deductions {} | net {}",
        totals.employees,
        flagged,
        format_rupiah(totals.gross_total),
        format_rupiah(totals.total_deduction),
        format_rupiah(totals.net_total),
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        attendance::{AttendanceAdjustment, AttendanceCounts},
        draft::DraftField,
    };

    fn row() -> PayrollDraft {
        PayrollDraft {
            employee_id: 1,
            full_name: "Budi".to_string(),
            outlet_name: "Central".to_string(),
            bank_name: None,
            bank_account_number: None,
            has_contract: true,
            joined_after_period: false,
            attendance: Some(AttendanceCounts::default()),
            month_index: 12,
            worked_days: 26,
            is_prorated: false,
            rank: None,
            base_salary: 2_500_000,
            commission: 0,
            meal_allowance: 0,
            bonus: 0,
            incentive_bonus: 0,
            allowance_other: 0,
            attendance_breakdown: AttendanceAdjustment::default(),
            attendance_deduction: 50_000,
            kasbon_deduction: 0,
            outstanding_before: 0,
            remaining_loan: 0,
            gross_total: 0,
            net_total: 0,
        }
        .recompute()
    }

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(950), "Rp 950");
        assert_eq!(format_rupiah(1_000), "Rp 1.000");
        assert_eq!(format_rupiah(1_250_000), "Rp 1.250.000");
        assert_eq!(format_rupiah(-50_000), "-Rp 50.000");
    }

    #[test]
    fn test_format_draft_row() {
        assert_eq!(
            format_draft_row(&row()),
            "Budi (Central) | gross Rp 2.500.000 | deductions Rp 50.000 | net Rp 2.450.000"
        );

        let mut flagged = row();
        flagged.has_contract = false;
        assert!(format_draft_row(&flagged).ends_with("| review: no active contract"));

        flagged.joined_after_period = true;
        assert!(format_draft_row(&flagged)
            .ends_with("| review: joined after period end, no active contract"));
    }

    #[test]
    fn test_format_draft_summary() {
        let mut session = PayrollSession::from_rows(1, vec![row()]);
        session
            .edit(1, DraftField::AttendanceDeduction, 3_000_000)
            .unwrap();

        let summary = format_draft_summary(&session);
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("review: negative net salary"));
        assert_eq!(
            lines[1],
            "1 employees (1 flagged) | gross Rp 2.500.000 | deductions Rp 3.000.000 | net -Rp 500.000"
        );
    }
}
