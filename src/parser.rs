use csv::{Reader, StringRecord};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, ScheduleError};
use crate::schedule::slot_utils::{parse_time, TimeSlot};
use crate::schedule::types::{House, Vendor, VendorContact};

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

/// Parses a number, returning 0 if empty or invalid
fn parse_number(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn parse_priority(value: &str) -> i32 {
    value.trim().parse().unwrap_or(0)
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Finds a column by any of its accepted header names
fn column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        names.iter().any(|n| h == *n)
    })
}

fn field<'r>(record: &'r StringRecord, col: Option<usize>) -> &'r str {
    col.and_then(|c| record.get(c)).unwrap_or("").trim()
}

/// Reads the house roster from CSV text
///
/// Columns: `name, time_slot_start, time_slot_end, color, priority`. The program table's
/// `house_name`, `start`/`tuesday_start` and `end`/`tuesday_end` headers are accepted too.
/// Houses come back ordered by priority then slot start; ties keep file order.
pub fn read_houses<R: std::io::Read>(input: R) -> Result<Vec<House>> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let name_col = column(&headers, &["name", "house", "house_name"]).or(Some(0));
    let start_col = column(&headers, &["time_slot_start", "start", "tuesday_start"]).or(Some(1));
    let end_col = column(&headers, &["time_slot_end", "end", "tuesday_end"]).or(Some(2));
    let color_col = column(&headers, &["color"]);
    let priority_col = column(&headers, &["priority"]);

    let mut houses = Vec::new();
    let mut seen = HashSet::new();
    for result in reader.records() {
        let record = result?;

        let name = field(&record, name_col).to_string();
        // Skip if essential fields are missing
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.clone()) {
            return Err(ScheduleError::DuplicateHouse(name));
        }

        let invalid = |source| ScheduleError::InvalidTime {
            house: name.clone(),
            source,
        };
        let start = parse_time(field(&record, start_col)).map_err(invalid)?;
        let end = parse_time(field(&record, end_col)).map_err(invalid)?;
        let time_slot = TimeSlot::new(start, end).map_err(invalid)?;

        let color = optional(field(&record, color_col)).unwrap_or_else(|| "#CCCCCC".to_string());
        let priority = parse_priority(field(&record, priority_col));

        houses.push(House {
            name,
            time_slot,
            color,
            priority,
        });
    }

    houses.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.time_slot.start.cmp(&b.time_slot.start))
    });
    Ok(houses)
}

/// Reads the vendor roster from CSV text
///
/// Columns: `name, active, is_priority_vendor, max_slots_per_week` followed by optional
/// contact fields. Inactive vendors are kept; the engine skips them.
pub fn read_vendors<R: std::io::Read>(input: R) -> Result<Vec<Vendor>> {
    let mut reader = Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let name_col = column(&headers, &["name", "vendor"]).or(Some(0));
    let active_col = column(&headers, &["active"]);
    let priority_col = column(&headers, &["is_priority_vendor", "priority", "is_rotation_vendor"]);
    let max_slots_col = column(&headers, &["max_slots_per_week", "slots_per_week"]);
    let contact_col = column(&headers, &["contact"]);
    let phone_col = column(&headers, &["phone"]);
    let email_col = column(&headers, &["email"]);
    let address_col = column(&headers, &["address"]);
    let maps_col = column(&headers, &["maps_link"]);
    let color_col = column(&headers, &["color"]);

    let mut vendors = Vec::new();
    let mut seen = HashSet::new();
    for result in reader.records() {
        let record = result?;

        let name = field(&record, name_col).to_string();
        if name.is_empty() {
            continue;
        }
        if !seen.insert(name.clone()) {
            return Err(ScheduleError::DuplicateVendor(name));
        }

        // A missing active column means every listed vendor is active
        let active = active_col.is_none() || parse_bool(field(&record, active_col));

        vendors.push(Vendor {
            name,
            active,
            is_priority_vendor: parse_bool(field(&record, priority_col)),
            max_slots_per_week: parse_number(field(&record, max_slots_col)),
            details: VendorContact {
                contact: optional(field(&record, contact_col)),
                phone: optional(field(&record, phone_col)),
                email: optional(field(&record, email_col)),
                address: optional(field(&record, address_col)),
                maps_link: optional(field(&record, maps_col)),
                color: optional(field(&record, color_col)),
            },
        });
    }

    Ok(vendors)
}

/// Loads houses from a CSV file
pub fn load_houses<P: AsRef<Path>>(csv_path: P) -> Result<Vec<House>> {
    let file = std::fs::File::open(csv_path)?;
    read_houses(file)
}

/// Loads vendors from a CSV file
pub fn load_vendors<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Vendor>> {
    let file = std::fs::File::open(csv_path)?;
    read_vendors(file)
}
