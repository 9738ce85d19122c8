use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the last-resort pass may pick once the gap and capacity passes are exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Any active vendor not yet used this week
    #[default]
    UnusedActive,
    /// Any active vendor without an overlapping booking, even if already used this week
    NonConflicting,
    /// Skip the fallback pass; leftovers go straight to unassigned
    Disabled,
}

/// Which commits are written to rotation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryScope {
    #[default]
    AllNamed,
    PriorityOnly,
}

/// Tuning knobs for the weekly assignment passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub priority_fill_min_gap_weeks: u32,
    pub secondary_min_gap_weeks: u32,
    pub secondary_weekly_cap: u32,
    pub fallback: FallbackPolicy,
    pub record_history_for: HistoryScope,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority_fill_min_gap_weeks: 2,
            secondary_min_gap_weeks: 1,
            secondary_weekly_cap: 3,
            fallback: FallbackPolicy::UnusedActive,
            record_history_for: HistoryScope::AllNamed,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
