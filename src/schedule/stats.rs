use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use super::generator::anchor_dates;
use super::rotation::build_rotation_matrix;
use super::types::{AssignmentKind, House, WeekSchedule};
use crate::error::Result;

/// Aggregate counts over a generated horizon
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleStats {
    pub total_weeks: usize,
    pub vendor_counts: BTreeMap<String, u32>,
    pub house_vendor_matrix: BTreeMap<String, BTreeMap<String, u32>>,
    pub kind_counts: BTreeMap<AssignmentKind, u32>,
    pub unassigned: u32,
}

impl ScheduleStats {
    pub fn from_schedules(schedules: &[WeekSchedule]) -> Self {
        let mut stats = Self {
            total_weeks: schedules.len(),
            ..Self::default()
        };
        for week in schedules {
            for assignment in &week.assignments {
                *stats.kind_counts.entry(assignment.kind).or_insert(0) += 1;
                let Some(vendor) = assignment.vendor.as_deref() else {
                    stats.unassigned += 1;
                    continue;
                };
                *stats.vendor_counts.entry(vendor.to_string()).or_insert(0) += 1;
                *stats
                    .house_vendor_matrix
                    .entry(assignment.house.clone())
                    .or_default()
                    .entry(vendor.to_string())
                    .or_insert(0) += 1;
            }
        }
        stats
    }

    pub fn pairings(&self, house: &str, vendor: &str) -> u32 {
        self.house_vendor_matrix
            .get(house)
            .and_then(|row| row.get(vendor))
            .copied()
            .unwrap_or(0)
    }
}

/// One week of the pure rotation matrix, vendors listed in house order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPlanRow {
    pub week_index: usize,
    pub date: NaiveDate,
    pub vendors: Vec<Option<String>>,
}

/// Preview of the rotation without capacity, conflicts or history
pub fn rotation_plan(
    houses: &[&str],
    priority_vendors: &[&str],
    start_date: NaiveDate,
    weeks: usize,
) -> Result<Vec<RotationPlanRow>> {
    let dates = anchor_dates(start_date, weeks)?;
    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(week_index, date)| {
            let matrix = build_rotation_matrix(houses, priority_vendors, week_index);
            RotationPlanRow {
                week_index,
                date,
                vendors: houses.iter().map(|h| matrix.get(*h).cloned()).collect(),
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RotationIssue {
    /// A priority vendor reached too few distinct houses over the horizon
    LowCoverage {
        vendor: String,
        houses_served: usize,
        total_houses: usize,
    },
    /// One vendor booked into overlapping slots the same week
    DoubleBooked {
        date: NaiveDate,
        vendor: String,
        houses: Vec<String>,
    },
}

/// Audits generated schedules for rotation spread and overlap double-booking
pub fn validate_rotation(
    schedules: &[WeekSchedule],
    houses: &[House],
    priority_vendors: &[&str],
    min_coverage: f64,
) -> Vec<RotationIssue> {
    let mut issues = Vec::new();

    for week in schedules {
        issues.extend(find_double_bookings(week));
    }

    let stats = ScheduleStats::from_schedules(schedules);
    let total_houses = houses.len();
    for vendor in priority_vendors {
        let houses_served = houses
            .iter()
            .filter(|h| stats.pairings(&h.name, vendor) > 0)
            .count();
        if (houses_served as f64) < total_houses as f64 * min_coverage {
            issues.push(RotationIssue::LowCoverage {
                vendor: vendor.to_string(),
                houses_served,
                total_houses,
            });
        }
    }

    issues
}

/// Groups of houses sharing a vendor at overlapping times within one week
pub fn find_double_bookings(week: &WeekSchedule) -> Vec<RotationIssue> {
    let mut by_vendor: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, assignment) in week.assignments.iter().enumerate() {
        if let Some(vendor) = assignment.vendor.as_deref() {
            by_vendor.entry(vendor).or_default().push(i);
        }
    }

    let mut issues = Vec::new();
    for (vendor, indices) in by_vendor {
        let mut clashing = BTreeSet::new();
        for (n, &i) in indices.iter().enumerate() {
            for &j in &indices[n + 1..] {
                let (a, b) = (&week.assignments[i], &week.assignments[j]);
                if a.time_slot.overlaps(&b.time_slot) {
                    clashing.insert(i);
                    clashing.insert(j);
                }
            }
        }
        if !clashing.is_empty() {
            issues.push(RotationIssue::DoubleBooked {
                date: week.date,
                vendor: vendor.to_string(),
                houses: clashing
                    .into_iter()
                    .map(|i| week.assignments[i].house.clone())
                    .collect(),
            });
        }
    }
    issues
}
