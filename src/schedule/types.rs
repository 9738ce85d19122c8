use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot_utils::TimeSlot;
use crate::error::{Result, ScheduleError};

/// Display label for a slot no vendor could fill
pub const UNASSIGNED: &str = "UNASSIGNED";

/// A residential program with one recurring weekly outing slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    pub name: String,
    pub time_slot: TimeSlot,
    pub color: String,
    pub priority: i32,
}

/// Contact and display fields carried through untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorContact {
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub maps_link: Option<String>,
    pub color: Option<String>,
}

/// An activity provider that can serve a house's slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub name: String,
    pub active: bool,
    pub is_priority_vendor: bool,
    pub max_slots_per_week: u32,
    #[serde(default)]
    pub details: VendorContact,
}

impl Vendor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            active: true,
            is_priority_vendor: false,
            max_slots_per_week: 0,
            details: VendorContact::default(),
        }
    }

    pub fn priority(name: &str, max_slots_per_week: u32) -> Self {
        Self {
            is_priority_vendor: true,
            max_slots_per_week,
            ..Self::new(name)
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn is_priority(&self) -> bool {
        self.active && self.is_priority_vendor
    }
}

/// Which pass of the weekly algorithm produced an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssignmentKind {
    PriorityRotation,
    PriorityFill,
    Secondary,
    Fallback,
    Unassigned,
}

impl AssignmentKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssignmentKind::PriorityRotation => "Priority Rotation",
            AssignmentKind::PriorityFill => "Priority Fill",
            AssignmentKind::Secondary => "Secondary",
            AssignmentKind::Fallback => "Fallback",
            AssignmentKind::Unassigned => "Unassigned",
        }
    }
}

/// Result for one (house, week) pair. `vendor` is `None` for the unassigned sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub house: String,
    pub vendor: Option<String>,
    pub time_slot: TimeSlot,
    pub kind: AssignmentKind,
}

impl Assignment {
    pub fn unassigned(house: &House) -> Self {
        Self {
            house: house.name.clone(),
            vendor: None,
            time_slot: house.time_slot,
            kind: AssignmentKind::Unassigned,
        }
    }

    pub fn vendor_label(&self) -> &str {
        self.vendor.as_deref().unwrap_or(UNASSIGNED)
    }

    pub fn is_vendor(&self, vendor: &str) -> bool {
        self.vendor.as_deref() == Some(vendor)
    }
}

/// Whether every house in a week received a vendor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Coverage {
    Full,
    Partial { unassigned_houses: Vec<String> },
}

/// One anchor date and exactly one assignment per configured house, in house order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    pub date: NaiveDate,
    pub week_index: usize,
    pub assignments: Vec<Assignment>,
}

impl WeekSchedule {
    pub fn assignment(&self, house: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.house == house)
    }

    pub fn vendor_for(&self, house: &str) -> Option<&str> {
        self.assignment(house).and_then(|a| a.vendor.as_deref())
    }

    pub fn unassigned_houses(&self) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|a| a.kind == AssignmentKind::Unassigned)
            .map(|a| a.house.clone())
            .collect()
    }

    pub fn coverage(&self) -> Coverage {
        let unassigned_houses = self.unassigned_houses();
        if unassigned_houses.is_empty() {
            Coverage::Full
        } else {
            Coverage::Partial { unassigned_houses }
        }
    }
}

/// Validated, read-only snapshot of houses and vendors for one generation run
#[derive(Debug, Clone)]
pub struct Roster {
    houses: Vec<House>,
    vendors: Vec<Vendor>,
}

impl Roster {
    pub fn new(houses: Vec<House>, vendors: Vec<Vendor>) -> Result<Self> {
        if houses.is_empty() {
            return Err(ScheduleError::NoHouses);
        }
        let mut seen = HashSet::new();
        for house in &houses {
            if !seen.insert(house.name.as_str()) {
                return Err(ScheduleError::DuplicateHouse(house.name.clone()));
            }
        }
        let mut seen = HashSet::new();
        for vendor in &vendors {
            if !seen.insert(vendor.name.as_str()) {
                return Err(ScheduleError::DuplicateVendor(vendor.name.clone()));
            }
        }
        if !vendors.iter().any(|v| v.active) {
            return Err(ScheduleError::NoActiveVendors);
        }
        Ok(Self { houses, vendors })
    }

    pub fn houses(&self) -> &[House] {
        &self.houses
    }

    pub fn house(&self, name: &str) -> Option<&House> {
        self.houses.iter().find(|h| h.name == name)
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn active_vendors(&self) -> impl Iterator<Item = &Vendor> {
        self.vendors.iter().filter(|v| v.active)
    }

    pub fn priority_vendors(&self) -> impl Iterator<Item = &Vendor> {
        self.vendors.iter().filter(|v| v.is_priority())
    }

    pub fn secondary_vendors(&self) -> impl Iterator<Item = &Vendor> {
        self.vendors.iter().filter(|v| v.active && !v.is_priority_vendor)
    }
}
