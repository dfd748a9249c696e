//! Max-slots preset options offered next to the numeric entry

use crate::types::MaxSlots;
use serde::{Deserialize, Serialize};

/// Arithmetic range of preset max-slots values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotPresets {
    /// First option
    pub start: u32,
    /// Last option (inclusive)
    pub end: u32,
    /// Distance between options
    pub step: u32,
}

impl SlotPresets {
    /// Create preset range
    #[inline]
    #[must_use]
    pub fn new(start: u32, end: u32, step: u32) -> Self {
        Self { start, end, step }
    }

    /// Check the range yields at least one positive option
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start > 0 && self.step > 0 && self.start <= self.end
    }

    /// All options, ascending
    #[must_use]
    pub fn options(&self) -> Vec<MaxSlots> {
        if !self.is_valid() {
            return Vec::new();
        }
        (self.start..=self.end)
            .step_by(self.step as usize)
            .filter_map(MaxSlots::new)
            .collect()
    }

    /// Check if a value is one of the options
    #[must_use]
    pub fn contains(&self, value: MaxSlots) -> bool {
        let v = value.get();
        self.is_valid() && v >= self.start && v <= self.end && (v - self.start) % self.step == 0
    }
}

impl Default for SlotPresets {
    fn default() -> Self {
        Self {
            start: 10,
            end: 500,
            step: 10,
        }
    }
}
