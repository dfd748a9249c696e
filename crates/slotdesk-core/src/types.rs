//! Core types for Slot Desk
//!
//! Defines the entities exchanged with the admissions service:
//! - School years and programs (read-only reference data)
//! - Slot summary rows (per-program availability snapshot)
//! - Slot limits (the write model) and the validated max-slots quantity

use crate::error::FormError;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// School year identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearId(pub u64);

impl std::fmt::Display for YearId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Program identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramId(pub u64);

impl std::fmt::Display for ProgramId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status value the service uses for the open school year
pub const ACTIVE_YEAR_STATUS: i64 = 1;

/// School year reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolYear {
    /// Year identifier
    pub year_id: YearId,
    /// Human-readable description, e.g. `2024-2025`
    pub year_description: String,
    /// Status flag, `1` when open for admission
    #[serde(default)]
    pub status: i64,
}

impl SchoolYear {
    /// Create new school year
    #[inline]
    #[must_use]
    pub fn new(year_id: u64, description: impl Into<String>, status: i64) -> Self {
        Self {
            year_id: YearId(year_id),
            year_description: description.into(),
            status,
        }
    }

    /// Check if this is the active year
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_YEAR_STATUS
    }

    /// Label shown in year pickers
    #[must_use]
    pub fn label(&self) -> String {
        if self.is_active() {
            format!("{} (ACTIVE)", self.year_description)
        } else {
            self.year_description.clone()
        }
    }
}

/// Find the year to auto-select on load
///
/// Returns the first active year, or `None` when no year is active.
#[must_use]
pub fn active_year(years: &[SchoolYear]) -> Option<&SchoolYear> {
    years.iter().find(|y| y.is_active())
}

/// Program reference data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Program identifier
    pub program_id: ProgramId,
    /// Short code, e.g. `BSIT`
    pub program_code: String,
    /// Full description
    pub program_description: String,
    /// Optional major qualifier
    #[serde(default)]
    pub program_major: Option<String>,
}

impl Program {
    /// Create new program without a major
    #[inline]
    #[must_use]
    pub fn new(program_id: u64, code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            program_id: ProgramId(program_id),
            program_code: code.into(),
            program_description: description.into(),
            program_major: None,
        }
    }

    /// With major qualifier
    #[inline]
    #[must_use]
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.program_major = Some(major.into());
        self
    }

    /// Label shown in program pickers: `(CODE) Description Major`
    #[must_use]
    pub fn label(&self) -> String {
        program_label(
            &self.program_code,
            &self.program_description,
            self.program_major.as_deref(),
        )
    }
}

pub(crate) fn program_label(code: &str, description: &str, major: Option<&str>) -> String {
    match major {
        Some(major) if !major.is_empty() => format!("({code}) {description} {major}"),
        _ => format!("({code}) {description}"),
    }
}

/// Per-program availability snapshot for one school year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSummaryRow {
    /// Program identifier
    pub program_id: ProgramId,
    /// Denormalized program code
    #[serde(default)]
    pub program_code: String,
    /// Denormalized program description
    #[serde(default)]
    pub program_description: String,
    /// Denormalized major qualifier
    #[serde(default)]
    pub major: Option<String>,
    /// Configured maximum slots, `None` when missing or non-numeric
    #[serde(default, deserialize_with = "lenient_count")]
    pub max_slots: Option<i64>,
    /// Current applicant count, `None` when missing or non-numeric
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_applicants: Option<i64>,
}

impl SlotSummaryRow {
    /// Create new summary row
    #[must_use]
    pub fn new(
        program_id: u64,
        code: impl Into<String>,
        description: impl Into<String>,
        max_slots: i64,
        total_applicants: i64,
    ) -> Self {
        Self {
            program_id: ProgramId(program_id),
            program_code: code.into(),
            program_description: description.into(),
            major: None,
            max_slots: Some(max_slots),
            total_applicants: Some(total_applicants),
        }
    }

    /// With major qualifier
    #[inline]
    #[must_use]
    pub fn with_major(mut self, major: impl Into<String>) -> Self {
        self.major = Some(major.into());
        self
    }

    /// Label shown in the summary table
    #[must_use]
    pub fn label(&self) -> String {
        program_label(
            &self.program_code,
            &self.program_description,
            self.major.as_deref(),
        )
    }
}

/// Accepts a JSON number, a numeric string or null.
///
/// Aggregates such as applicant counts are often serialized as strings by
/// the service's database driver.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Validated positive max-slots quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct MaxSlots(u32);

impl MaxSlots {
    /// Create from a positive count, `None` for zero
    #[inline]
    #[must_use]
    pub fn new(value: u32) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Parse free-text input
    ///
    /// # Errors
    /// - `FormError::InvalidQuantity` unless the trimmed input is an integer
    ///   greater than zero that fits in `u32`
    pub fn parse(input: &str) -> Result<Self, FormError> {
        let trimmed = input.trim();
        trimmed
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| FormError::InvalidQuantity(input.to_string()))
    }

    /// Get the numeric value
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl FromStr for MaxSlots {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<i64> for MaxSlots {
    type Error = FormError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| FormError::InvalidQuantity(value.to_string()))
    }
}

impl From<MaxSlots> for u32 {
    fn from(value: MaxSlots) -> Self {
        value.0
    }
}

impl std::fmt::Display for MaxSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot limit write model
///
/// Creation and update share one upsert operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLimit {
    /// Target school year
    pub year_id: YearId,
    /// Target program
    pub program_id: ProgramId,
    /// New maximum
    pub max_slots: MaxSlots,
}

impl SlotLimit {
    /// Create new slot limit
    #[inline]
    #[must_use]
    pub fn new(year_id: YearId, program_id: ProgramId, max_slots: MaxSlots) -> Self {
        Self {
            year_id,
            program_id,
            max_slots,
        }
    }
}

/// Page-access check response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageAccess {
    /// `1` grants access, anything else denies
    #[serde(default)]
    pub page_privilege: i64,
}

impl PageAccess {
    /// Check if the privilege grants access
    #[inline]
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.page_privilege == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn max_slots_parse() {
        assert_eq!(MaxSlots::parse("60").unwrap().get(), 60);
        assert_eq!(MaxSlots::parse(" 120 ").unwrap().get(), 120);
        assert_eq!(
            MaxSlots::parse("0"),
            Err(FormError::InvalidQuantity("0".to_string()))
        );
        assert!(MaxSlots::parse("-5").is_err());
        assert!(MaxSlots::parse("12.5").is_err());
        assert!(MaxSlots::parse("").is_err());
        assert!(MaxSlots::parse("NaN").is_err());
    }

    #[test]
    fn max_slots_rejects_non_positive_json() {
        assert!(serde_json::from_str::<MaxSlots>("0").is_err());
        assert!(serde_json::from_str::<MaxSlots>("-1").is_err());
        assert_eq!(serde_json::from_str::<MaxSlots>("50").unwrap().get(), 50);
    }

    #[test]
    fn slot_limit_wire_shape() {
        let limit = SlotLimit::new(YearId(1), ProgramId(10), MaxSlots::new(60).unwrap());
        let json = serde_json::to_value(limit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"year_id": 1, "program_id": 10, "max_slots": 60})
        );
    }

    #[test]
    fn summary_row_accepts_string_counts() {
        let row: SlotSummaryRow = serde_json::from_str(
            r#"{"program_id": 3, "program_code": "BSCS", "program_description": "Computer Science",
                "major": null, "max_slots": "40", "total_applicants": "12"}"#,
        )
        .unwrap();
        assert_eq!(row.max_slots, Some(40));
        assert_eq!(row.total_applicants, Some(12));
    }

    #[test]
    fn summary_row_tolerates_missing_counts() {
        let row: SlotSummaryRow = serde_json::from_str(
            r#"{"program_id": 3, "program_code": "BSCS", "program_description": "CS",
                "max_slots": "n/a"}"#,
        )
        .unwrap();
        assert_eq!(row.max_slots, None);
        assert_eq!(row.total_applicants, None);
    }

    #[test]
    fn year_label_and_active_pick() {
        let years = vec![
            SchoolYear::new(1, "2023-2024", 0),
            SchoolYear::new(2, "2024-2025", 1),
        ];
        assert_eq!(years[1].label(), "2024-2025 (ACTIVE)");
        assert_eq!(years[0].label(), "2023-2024");
        assert_eq!(active_year(&years).map(|y| y.year_id), Some(YearId(2)));
        assert_eq!(active_year(&years[..1]), None);
    }

    #[test]
    fn program_label() {
        let plain = Program::new(10, "BSIT", "Information Technology");
        assert_eq!(plain.label(), "(BSIT) Information Technology");

        let majored = Program::new(11, "BSED", "Secondary Education").with_major("Math");
        assert_eq!(majored.label(), "(BSED) Secondary Education Math");
    }

    #[test]
    fn page_access_grant() {
        let granted: PageAccess = serde_json::from_str(r#"{"page_privilege": 1}"#).unwrap();
        assert!(granted.is_granted());
        let denied: PageAccess = serde_json::from_str(r#"{"page_privilege": 0}"#).unwrap();
        assert!(!denied.is_granted());
        let missing: PageAccess = serde_json::from_str("{}").unwrap();
        assert!(!missing.is_granted());
    }
}
