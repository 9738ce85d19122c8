pub mod types;
pub mod slot_utils;
pub mod rotation;
pub mod capacity;
pub mod conflict;
pub mod history;
pub mod engine;
pub mod generator;
pub mod stats;

pub use types::{Assignment, AssignmentKind, Coverage, House, Roster, Vendor, VendorContact, WeekSchedule, UNASSIGNED};
pub use slot_utils::{format_range, overlaps, parse_time, TimeOfDay, TimeSlot};
pub use rotation::{build_rotation_matrix, fairness_horizon, RotationStrategy, RoundRobinRotation};
pub use capacity::CapacityGuard;
pub use conflict::{check_conflict, Conflict, ConflictChecker, ConflictReport};
pub use history::{CsvHistoryRepository, HistoryRepository, HistoryTracker, RotationHistoryEntry};
pub use engine::AssignmentEngine;
pub use generator::{anchor_dates, ScheduleGenerator};
pub use stats::{find_double_bookings, rotation_plan, validate_rotation, RotationIssue, RotationPlanRow, ScheduleStats};
