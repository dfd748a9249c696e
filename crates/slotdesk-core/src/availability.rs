//! Slot availability view-model
//!
//! Turns raw summary rows plus a free-text filter into the rows to display:
//! - `remaining = max_slots - total_applicants` (may be negative)
//! - `FULL` when `remaining <= 0`, else `OPEN`
//! - case-insensitive substring filter over code, description and major
//!
//! Gateway order is preserved; nothing is re-sorted or paginated.

use crate::error::GatewayError;
use crate::sequence::{RequestSequencer, RequestToken};
use crate::types::{ProgramId, SlotSummaryRow, YearId};
use serde::Serialize;

/// Capacity status of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlotStatus {
    /// Seats remain
    Open,
    /// No seats remain, or over-enrolled
    Full,
}

impl SlotStatus {
    /// Classify a remaining count
    #[inline]
    #[must_use]
    pub fn from_remaining(remaining: i64) -> Self {
        if remaining <= 0 {
            Self::Full
        } else {
            Self::Open
        }
    }

    /// Display text
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Full => "FULL",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary row annotated with derived capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    /// Source row
    #[serde(flatten)]
    pub row: SlotSummaryRow,
    /// Seats left, negative when over-enrolled
    pub remaining: i64,
    /// Derived status
    pub status: SlotStatus,
    /// A count was missing or non-numeric and was read as zero
    pub incomplete: bool,
}

impl Availability {
    /// Derive capacity for one row
    ///
    /// Missing counts are treated as zero and the result is flagged
    /// `incomplete`.
    #[must_use]
    pub fn derive(row: &SlotSummaryRow) -> Self {
        let incomplete = row.max_slots.is_none() || row.total_applicants.is_none();
        let max_slots = row.max_slots.unwrap_or(0);
        let applicants = row.total_applicants.unwrap_or(0);
        let remaining = max_slots.saturating_sub(applicants);

        Self {
            row: row.clone(),
            remaining,
            status: SlotStatus::from_remaining(remaining),
            incomplete,
        }
    }

    /// Check if the program is full
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.status == SlotStatus::Full
    }
}

/// Text searched by the filter: `code description major`
fn haystack(row: &SlotSummaryRow) -> String {
    format!(
        "{} {} {}",
        row.program_code,
        row.program_description,
        row.major.as_deref().unwrap_or("")
    )
    .to_lowercase()
}

/// Check if a row passes the filter
#[must_use]
pub fn matches_filter(row: &SlotSummaryRow, filter: &str) -> bool {
    filter.is_empty() || haystack(row).contains(&filter.to_lowercase())
}

/// Filter rows and derive capacity, preserving input order
#[must_use]
pub fn filter_rows(rows: &[SlotSummaryRow], filter: &str) -> Vec<Availability> {
    rows.iter()
        .filter(|row| matches_filter(row, filter))
        .map(Availability::derive)
        .collect()
}

/// An issued summary fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Sequencing token
    pub token: RequestToken,
    /// Year being fetched
    pub year_id: YearId,
}

/// What happened to a fetched summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Rows replaced
    Applied,
    /// Fetch failed; view switched to the error state
    Failed,
    /// A newer fetch was issued; response dropped
    Stale,
}

/// Summary state for the selected year
#[derive(Debug, Default)]
pub struct AvailabilityView {
    year_id: Option<YearId>,
    rows: Vec<SlotSummaryRow>,
    filter: String,
    error: Option<String>,
    sequencer: RequestSequencer,
}

impl AvailabilityView {
    /// Create empty view
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fetch for `year_id`, superseding any outstanding fetch
    pub fn begin_fetch(&mut self, year_id: YearId) -> SummaryRequest {
        let token = self.sequencer.issue();
        tracing::debug!(%year_id, %token, "summary fetch issued");
        SummaryRequest { token, year_id }
    }

    /// Apply a fetch result unless it has been superseded
    pub fn apply(
        &mut self,
        request: SummaryRequest,
        result: Result<Vec<SlotSummaryRow>, GatewayError>,
    ) -> ApplyOutcome {
        if !self.sequencer.is_current(request.token) {
            tracing::debug!(token = %request.token, "stale summary response dropped");
            return ApplyOutcome::Stale;
        }

        self.year_id = Some(request.year_id);
        match result {
            Ok(rows) => {
                tracing::debug!(year_id = %request.year_id, rows = rows.len(), "summary applied");
                self.rows = rows;
                self.error = None;
                ApplyOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(year_id = %request.year_id, error = %e, "summary fetch failed");
                self.rows.clear();
                self.error = Some(e.to_string());
                ApplyOutcome::Failed
            }
        }
    }

    /// Set the free-text filter
    #[inline]
    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Current filter text
    #[inline]
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Year of the rows currently held
    #[inline]
    #[must_use]
    pub fn year_id(&self) -> Option<YearId> {
        self.year_id
    }

    /// Unfiltered rows as received
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[SlotSummaryRow] {
        &self.rows
    }

    /// Last fetch error, if the view is in the error state
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Rows to display under the current filter
    #[must_use]
    pub fn visible(&self) -> Vec<Availability> {
        filter_rows(&self.rows, &self.filter)
    }

    /// Find a row by program
    #[must_use]
    pub fn row(&self, program_id: ProgramId) -> Option<&SlotSummaryRow> {
        self.rows.iter().find(|r| r.program_id == program_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn kept_ids(rows: &[SlotSummaryRow], filter: &str) -> Vec<ProgramId> {
        filter_rows(rows, filter)
            .into_iter()
            .map(|a| a.row.program_id)
            .collect()
    }

    fn sample_rows() -> Vec<SlotSummaryRow> {
        vec![
            SlotSummaryRow::new(10, "BSIT", "Information Technology", 50, 50),
            SlotSummaryRow::new(11, "BSED", "Secondary Education", 40, 12)
                .with_major("Mathematics"),
            SlotSummaryRow::new(12, "BSCS", "Computer Science", 30, 45),
        ]
    }

    #[test]
    fn derive_full_at_zero_remaining() {
        let a = Availability::derive(&SlotSummaryRow::new(10, "BSIT", "IT", 50, 50));
        assert_eq!(a.remaining, 0);
        assert_eq!(a.status, SlotStatus::Full);
        assert!(!a.incomplete);
    }

    #[test]
    fn derive_open_and_over_enrolled() {
        let open = Availability::derive(&SlotSummaryRow::new(10, "BSIT", "IT", 60, 50));
        assert_eq!(open.remaining, 10);
        assert_eq!(open.status, SlotStatus::Open);

        let over = Availability::derive(&SlotSummaryRow::new(12, "BSCS", "CS", 30, 45));
        assert_eq!(over.remaining, -15);
        assert!(over.is_full());
    }

    #[test]
    fn derive_missing_counts_as_zero() {
        let mut row = SlotSummaryRow::new(10, "BSIT", "IT", 0, 0);
        row.max_slots = None;
        row.total_applicants = Some(3);

        let a = Availability::derive(&row);
        assert_eq!(a.remaining, -3);
        assert_eq!(a.status, SlotStatus::Full);
        assert!(a.incomplete);
    }

    #[test]
    fn filter_is_case_insensitive_and_covers_major() {
        let rows = sample_rows();

        assert_eq!(kept_ids(&rows, "bsit"), vec![ProgramId(10)]);

        assert_eq!(kept_ids(&rows, "MATH"), vec![ProgramId(11)]);

        assert_eq!(kept_ids(&rows, "science"), vec![ProgramId(12)]);
    }

    #[test]
    fn empty_filter_keeps_order() {
        let rows = sample_rows();
        assert_eq!(
            kept_ids(&rows, ""),
            vec![ProgramId(10), ProgramId(11), ProgramId(12)]
        );
    }

    #[test]
    fn missing_major_is_not_searchable_text() {
        let rows = sample_rows();
        assert!(filter_rows(&rows, "undefined").is_empty());
        assert!(filter_rows(&rows, "null").is_empty());
    }

    #[test]
    fn view_drops_stale_responses() {
        let mut view = AvailabilityView::new();
        let first = view.begin_fetch(YearId(1));
        let second = view.begin_fetch(YearId(2));

        let newer = vec![SlotSummaryRow::new(10, "BSIT", "IT", 60, 50)];
        assert_eq!(view.apply(second, Ok(newer.clone())), ApplyOutcome::Applied);

        let older = sample_rows();
        assert_eq!(view.apply(first, Ok(older)), ApplyOutcome::Stale);

        assert_eq!(view.rows(), newer.as_slice());
        assert_eq!(view.year_id(), Some(YearId(2)));
    }

    #[test]
    fn view_enters_error_state() {
        let mut view = AvailabilityView::new();
        let req = view.begin_fetch(YearId(1));
        view.apply(req, Ok(sample_rows()));

        let req = view.begin_fetch(YearId(1));
        let refused = GatewayError::Transport("connection refused".to_string());
        let outcome = view.apply(req, Err(refused));

        assert_eq!(outcome, ApplyOutcome::Failed);
        assert!(view.rows().is_empty());
        assert!(view.error().unwrap().contains("connection refused"));

        let req = view.begin_fetch(YearId(1));
        view.apply(req, Ok(sample_rows()));
        assert_eq!(view.error(), None);
    }

    #[test]
    fn view_filter_applies_to_visible() {
        let mut view = AvailabilityView::new();
        let req = view.begin_fetch(YearId(1));
        view.apply(req, Ok(sample_rows()));

        view.set_filter("Education");
        let visible = view.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].row.program_code, "BSED");
        assert_eq!(visible[0].remaining, 28);
    }

    fn arb_row() -> impl Strategy<Value = SlotSummaryRow> {
        (
            0u64..1000,
            "[A-Za-z]{2,6}",
            "[A-Za-z ]{0,20}",
            proptest::option::of("[A-Za-z]{0,10}"),
            proptest::option::of(-1000i64..1000),
            proptest::option::of(-1000i64..1000),
        )
            .prop_map(|(id, code, desc, major, max_slots, applicants)| SlotSummaryRow {
                program_id: ProgramId(id),
                program_code: code,
                program_description: desc,
                major,
                max_slots,
                total_applicants: applicants,
            })
    }

    proptest! {
        #[test]
        fn remaining_and_status_follow_counts(row in arb_row()) {
            let a = Availability::derive(&row);
            let expected = row.max_slots.unwrap_or(0) - row.total_applicants.unwrap_or(0);
            prop_assert_eq!(a.remaining, expected);
            prop_assert_eq!(a.status == SlotStatus::Full, expected <= 0);
        }

        #[test]
        fn filter_is_exact_subsequence(
            rows in proptest::collection::vec(arb_row(), 0..20),
            filter in "[A-Za-z ]{0,4}",
        ) {
            let kept = filter_rows(&rows, &filter);
            let expected: Vec<_> = rows
                .iter()
                .filter(|r| {
                    let text = format!(
                        "{} {} {}",
                        r.program_code,
                        r.program_description,
                        r.major.clone().unwrap_or_default()
                    );
                    text.to_lowercase().contains(&filter.to_lowercase())
                })
                .cloned()
                .collect();
            let kept_rows: Vec<_> = kept.into_iter().map(|a| a.row).collect();
            prop_assert_eq!(kept_rows, expected);
        }

        #[test]
        fn empty_filter_is_identity(rows in proptest::collection::vec(arb_row(), 0..20)) {
            let kept: Vec<_> = filter_rows(&rows, "").into_iter().map(|a| a.row).collect();
            prop_assert_eq!(kept, rows);
        }
    }
}
