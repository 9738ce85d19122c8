use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{Assignment, House};
use crate::error::{Result, ScheduleError};

/// A same-week assignment that would collide with a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub vendor: String,
    pub conflicting_house: String,
    pub conflicting_time: String,
    pub message: String,
}

/// Answer to an interactive "can this vendor take this house" query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub date: NaiveDate,
    pub house: String,
    pub vendor: String,
    pub conflicts: Vec<Conflict>,
    pub can_assign: bool,
}

/// Detects a vendor being booked into two overlapping slots in the same week
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictChecker;

impl ConflictChecker {
    pub fn new() -> Self {
        Self
    }

    /// Every other house already holding `vendor` at a time overlapping `house`'s slot
    pub fn conflicts(&self, house: &House, vendor: &str, week_so_far: &[Assignment]) -> Vec<Conflict> {
        week_so_far
            .iter()
            .filter(|a| a.house != house.name && a.is_vendor(vendor))
            .filter(|a| a.time_slot.overlaps(&house.time_slot))
            .map(|a| Conflict {
                vendor: vendor.to_string(),
                conflicting_house: a.house.clone(),
                conflicting_time: a.time_slot.to_string(),
                message: format!(
                    "{} is already assigned to {} during overlapping time",
                    vendor, a.house
                ),
            })
            .collect()
    }

    pub fn would_conflict(&self, house: &House, vendor: &str, week_so_far: &[Assignment]) -> bool {
        week_so_far
            .iter()
            .any(|a| a.house != house.name && a.is_vendor(vendor) && a.time_slot.overlaps(&house.time_slot))
    }
}

/// Standalone conflict check for single-assignment edits, same rules as bulk generation
pub fn check_conflict(
    houses: &[House],
    date: NaiveDate,
    house_name: &str,
    vendor_name: &str,
    existing_week: &[Assignment],
) -> Result<ConflictReport> {
    let house = houses
        .iter()
        .find(|h| h.name == house_name)
        .ok_or_else(|| ScheduleError::UnknownHouse(house_name.to_string()))?;
    let conflicts = ConflictChecker::new().conflicts(house, vendor_name, existing_week);
    Ok(ConflictReport {
        date,
        house: house_name.to_string(),
        vendor: vendor_name.to_string(),
        can_assign: conflicts.is_empty(),
        conflicts,
    })
}
