use slotdesk_core::{Availability, MaxSlots, Program, SchoolYear};
use std::fmt::Write as _;

const PROGRAM_WIDTH: usize = 48;

/// Slot summary table; rows with missing counts are marked with `*`
pub(crate) fn summary_table(rows: &[Availability]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<PROGRAM_WIDTH$} {:>9} {:>10} {:>9}  {}",
        "PROGRAM", "MAX SLOTS", "APPLICANTS", "REMAINING", "STATUS"
    );

    let mut incomplete = false;
    for a in rows {
        let count = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |n| n.to_string());
        let marker = if a.incomplete { "*" } else { "" };
        incomplete |= a.incomplete;
        let _ = writeln!(
            out,
            "{:<PROGRAM_WIDTH$} {:>9} {:>10} {:>9}  {}{}",
            truncate(&a.row.label(), PROGRAM_WIDTH),
            count(a.row.max_slots),
            count(a.row.total_applicants),
            a.remaining,
            a.status,
            marker
        );
    }

    if rows.is_empty() {
        out.push_str("(no programs)\n");
    }
    if incomplete {
        out.push_str("* missing counts were read as zero\n");
    }
    out
}

pub(crate) fn years_list(years: &[SchoolYear]) -> String {
    years
        .iter()
        .map(|y| format!("{:>5}  {}\n", y.year_id.0, y.label()))
        .collect()
}

pub(crate) fn programs_list(programs: &[Program]) -> String {
    programs
        .iter()
        .map(|p| format!("{:>5}  {}\n", p.program_id.0, p.label()))
        .collect()
}

pub(crate) fn presets_list(options: &[MaxSlots]) -> String {
    let values: Vec<String> = options.iter().map(ToString::to_string).collect();
    format!("{}\n", values.join(" "))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotdesk_core::SlotSummaryRow;

    #[test]
    fn table_shows_status_and_marks_incomplete() {
        let mut missing = SlotSummaryRow::new(12, "BSCS", "Computer Science", 0, 0);
        missing.total_applicants = None;
        let rows: Vec<_> = [
            SlotSummaryRow::new(10, "BSIT", "Information Technology", 50, 50),
            SlotSummaryRow::new(11, "BSED", "Secondary Education", 40, 12).with_major("Math"),
            missing,
        ]
        .iter()
        .map(Availability::derive)
        .collect();

        let table = summary_table(&rows);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("PROGRAM"));
        assert!(lines[1].contains("(BSIT) Information Technology"));
        assert!(lines[1].trim_end().ends_with("FULL"));
        assert!(lines[2].contains("(BSED) Secondary Education Math"));
        assert!(lines[2].contains("28"));
        assert!(lines[2].trim_end().ends_with("OPEN"));
        assert!(lines[3].trim_end().ends_with("FULL*"));
        assert_eq!(lines[4], "* missing counts were read as zero");
    }

    #[test]
    fn empty_table_says_so() {
        assert!(summary_table(&[]).contains("(no programs)"));
    }

    #[test]
    fn long_labels_are_cut() {
        let long = "x".repeat(60);
        let cut = truncate(&long, 10);
        assert_eq!(cut, "xxxxxxx...");
    }

    #[test]
    fn years_are_labelled() {
        let years = vec![SchoolYear::new(1, "2024-2025", 1), SchoolYear::new(2, "2025-2026", 0)];
        assert_eq!(years_list(&years), "    1  2024-2025 (ACTIVE)\n    2  2025-2026\n");
    }

    #[test]
    fn presets_on_one_line() {
        let options: Vec<_> = [10, 20, 30].into_iter().filter_map(MaxSlots::new).collect();
        assert_eq!(presets_list(&options), "10 20 30\n");
    }
}
