//! Weekly outing rotation: assigns vendors to houses week by week, rotating priority
//! vendors fairly, never double-booking a vendor into overlapping slots, and marking
//! anything it cannot fill as unassigned.

pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;

pub use config::{EngineConfig, FallbackPolicy, HistoryScope};
pub use error::{Result, ScheduleError, TimeError};
pub use schedule::*;
