use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::schedule::{RotationIssue, RotationPlanRow, ScheduleStats, WeekSchedule, UNASSIGNED};

/// Formats one assignment line: `11 AM - 1 PM The Cove -> Surf Therapy [Secondary]`
pub fn format_assignment_line(time: &str, house: &str, vendor: &str, kind: &str) -> String {
    format!("{} {} -> {} [{}]", time, house, vendor, kind)
}

/// Writes every week to a text file, one header per week followed by its assignments
pub fn write_schedules_to_file<P: AsRef<Path>>(schedules: &[WeekSchedule], path: P) -> Result<()> {
    let mut file = File::create(path)?;

    for week in schedules {
        writeln!(file, "** Week {} ({}) **", week.week_index + 1, week.date.format("%Y-%m-%d"))?;
        for assignment in &week.assignments {
            let line = format_assignment_line(
                &assignment.time_slot.to_string(),
                &assignment.house,
                assignment.vendor_label(),
                assignment.kind.label(),
            );
            writeln!(file, "{}", line)?;
        }
    }

    Ok(())
}

/// Writes schedules as pretty JSON
pub fn write_schedules_json<P: AsRef<Path>>(schedules: &[WeekSchedule], path: P) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, schedules)?;
    Ok(())
}

/// Prints a week schedule in a readable format
pub fn print_week_schedule(week: &WeekSchedule) {
    println!("\n=== Week {} ({}) ===", week.week_index + 1, week.date.format("%a %b %-d, %Y"));

    let unassigned = week.unassigned_houses();
    if !unassigned.is_empty() {
        println!("⚠️  Unassigned houses ({}):", unassigned.len());
        for house in &unassigned {
            println!("  - {}", house);
        }
    }

    for assignment in &week.assignments {
        println!(
            "  {}",
            format_assignment_line(
                &assignment.time_slot.to_string(),
                &assignment.house,
                assignment.vendor_label(),
                assignment.kind.label(),
            )
        );
    }
}

pub fn print_stats(stats: &ScheduleStats) {
    println!("\n=== Schedule Statistics ===");
    println!("Total weeks: {}", stats.total_weeks);
    println!("Unassigned slots: {}", stats.unassigned);

    println!("\nAssignments by pass:");
    for (kind, count) in &stats.kind_counts {
        println!("  {}: {}", kind.label(), count);
    }

    println!("\nVendor usage:");
    for (vendor, count) in &stats.vendor_counts {
        println!("  {}: {}", vendor, count);
    }

    println!("\nHouse-vendor pairings:");
    for (house, row) in &stats.house_vendor_matrix {
        let cells: Vec<String> = row.iter().map(|(v, n)| format!("{} x{}", v, n)).collect();
        println!("  {}: {}", house, cells.join(", "));
    }
}

/// Prints the rotation plan as a table, one row per week
pub fn print_rotation_plan(houses: &[&str], plan: &[RotationPlanRow]) {
    println!("\n=== Priority Rotation Plan ===");
    println!("Week | Date       | {}", houses.join(" | "));
    for row in plan {
        let cells: Vec<&str> = row.vendors.iter().map(|v| v.as_deref().unwrap_or(UNASSIGNED)).collect();
        println!("{:>4} | {} | {}", row.week_index + 1, row.date.format("%Y-%m-%d"), cells.join(" | "));
    }
}

pub fn print_issues(issues: &[RotationIssue]) {
    if issues.is_empty() {
        println!("\n✅ Rotation validated: no issues found");
        return;
    }
    println!("\n⚠️  Rotation issues ({}):", issues.len());
    for issue in issues {
        match issue {
            RotationIssue::LowCoverage { vendor, houses_served, total_houses } => {
                println!("  - {} only reached {}/{} houses", vendor, houses_served, total_houses)
            }
            RotationIssue::DoubleBooked { date, vendor, houses } => {
                println!("  - {} double-booked on {}: {}", vendor, date, houses.join(", "))
            }
        }
    }
}
