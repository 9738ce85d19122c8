use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// A wall-clock time within a single day, minute resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeError> {
        if hour >= 24 || minute >= 60 {
            return Err(TimeError::OutOfRange(format!("{:02}:{:02}", hour, minute)));
        }
        Ok(Self { hour, minute })
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }
}

impl fmt::Display for TimeOfDay {
    /// "11 AM", "10:30 AM", "12 PM"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        if self.minute == 0 {
            write!(f, "{} {}", hour, suffix)
        } else {
            write!(f, "{}:{:02} {}", hour, self.minute, suffix)
        }
    }
}

/// The weekly outing window of a house
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSlot {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeError> {
        if end < start {
            return Err(TimeError::Inverted(format_range(start, end)));
        }
        Ok(Self { start, end })
    }

    /// Parses "11 AM - 1 PM" style ranges
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        let (start, end) = text
            .split_once('-')
            .ok_or_else(|| TimeError::Unparseable(text.to_string()))?;
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_range(self.start, self.end))
    }
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::\d{2})?\s*([AaPp])\.?\s*[Mm]?\.?$")
            .expect("time pattern is a valid regex")
    })
}

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})(?::(\d{2}))?(?::\d{2})?$")
            .expect("clock pattern is a valid regex")
    })
}

/// Parses "10:30 AM", "11 AM", "11am", "1:00 p.m." and 24-hour "13:45" / "9:05"
pub fn parse_time(text: &str) -> Result<TimeOfDay, TimeError> {
    let clean = text.trim();
    let unparseable = || TimeError::Unparseable(text.to_string());

    if let Some(caps) = time_pattern().captures(clean) {
        let hour: u8 = caps[1].parse().map_err(|_| unparseable())?;
        let minute: u8 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| unparseable())?,
            None => 0,
        };
        if hour == 0 || hour > 12 || minute >= 60 {
            return Err(TimeError::OutOfRange(text.to_string()));
        }
        let is_pm = caps[3].eq_ignore_ascii_case("p");
        let hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return TimeOfDay::new(hour, minute);
    }

    if let Some(caps) = clock_pattern().captures(clean) {
        let hour: u8 = caps[1].parse().map_err(|_| unparseable())?;
        let minute: u8 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| unparseable())?,
            None => 0,
        };
        return TimeOfDay::new(hour, minute).map_err(|_| TimeError::OutOfRange(text.to_string()));
    }

    Err(unparseable())
}

/// Renders "11 AM - 1 PM", minutes only when non-zero
pub fn format_range(start: TimeOfDay, end: TimeOfDay) -> String {
    format!("{} - {}", start, end)
}

/// Half-open interval overlap. Empty slots never overlap; touching ends don't either.
pub fn overlaps(start_a: TimeOfDay, end_a: TimeOfDay, start_b: TimeOfDay, end_b: TimeOfDay) -> bool {
    if start_a >= end_a || start_b >= end_b {
        return false;
    }
    start_a < end_b && start_b < end_a
}
