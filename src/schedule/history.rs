use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One past (house, vendor) pairing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationHistoryEntry {
    pub week: usize,
    pub house: String,
    pub vendor: String,
    pub date: NaiveDate,
}

/// Append-only memory of which vendor each house received and when
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryTracker {
    entries: Vec<RotationHistoryEntry>,
    by_house: HashMap<String, Vec<usize>>,
}

impl HistoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = RotationHistoryEntry>) -> Self {
        let mut tracker = Self::new();
        for entry in entries {
            tracker.push(entry);
        }
        tracker
    }

    fn push(&mut self, entry: RotationHistoryEntry) {
        self.by_house
            .entry(entry.house.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(entry);
    }

    /// Appends an entry. Callers record each commit once.
    pub fn record_assignment(&mut self, house: &str, vendor: &str, week: usize, date: NaiveDate) {
        self.push(RotationHistoryEntry {
            week,
            house: house.to_string(),
            vendor: vendor.to_string(),
            date,
        });
    }

    pub fn entries(&self) -> &[RotationHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for_house<'a>(&'a self, house: &str) -> impl Iterator<Item = &'a RotationHistoryEntry> + 'a {
        self.by_house
            .get(house)
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    /// Vendor of the most recently dated entry for `house`
    pub fn last_vendor_for_house(&self, house: &str) -> Option<&str> {
        self.entries_for_house(house)
            .max_by_key(|e| e.date)
            .map(|e| e.vendor.as_str())
    }

    /// Whole weeks between the latest `house`/`vendor` pairing and `as_of`; `None` if never paired.
    /// Entries dated after `as_of` count as zero weeks ago.
    pub fn weeks_since_last_assignment(&self, house: &str, vendor: &str, as_of: NaiveDate) -> Option<u32> {
        let last = self
            .entries_for_house(house)
            .filter(|e| e.vendor == vendor)
            .map(|e| e.date)
            .max()?;
        let days = (as_of - last).num_days().max(0);
        Some((days / 7) as u32)
    }

    /// Advisory gap rule: never paired, or paired at least `min_weeks_gap` weeks before `as_of`
    pub fn can_assign(&self, house: &str, vendor: &str, min_weeks_gap: u32, as_of: NaiveDate) -> bool {
        match self.weeks_since_last_assignment(house, vendor, as_of) {
            None => true,
            Some(weeks) => weeks >= min_weeks_gap,
        }
    }
}

/// Long-term storage for rotation history, owned by the caller
pub trait HistoryRepository {
    fn load_history(&self) -> Result<HistoryTracker>;
    fn save_history(&self, history: &HistoryTracker) -> Result<()>;
}

/// History kept as `week,house,vendor,date` rows in a CSV file
#[derive(Debug, Clone)]
pub struct CsvHistoryRepository {
    path: PathBuf,
}

impl CsvHistoryRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryRepository for CsvHistoryRepository {
    fn load_history(&self) -> Result<HistoryTracker> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "no history file found, starting fresh");
            return Ok(HistoryTracker::new());
        }
        let mut reader = ReaderBuilder::new().trim(csv::Trim::All).from_path(&self.path)?;
        let mut entries = Vec::new();
        for result in reader.deserialize() {
            let entry: RotationHistoryEntry = result?;
            entries.push(entry);
        }
        tracing::debug!(path = %self.path.display(), entries = entries.len(), "loaded rotation history");
        Ok(HistoryTracker::from_entries(entries))
    }

    fn save_history(&self, history: &HistoryTracker) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(true).from_path(&self.path)?;
        for entry in history.entries() {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        tracing::debug!(path = %self.path.display(), entries = history.len(), "saved rotation history");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_never_assigned_is_none() {
        let history = HistoryTracker::new();
        assert_eq!(history.weeks_since_last_assignment("The Cove", "Surf Therapy", date(2025, 1, 7)), None);
        assert!(history.can_assign("The Cove", "Surf Therapy", 2, date(2025, 1, 7)));
    }

    #[test]
    fn test_weeks_since_uses_most_recent_entry() {
        let mut history = HistoryTracker::new();
        history.record_assignment("The Cove", "Surf Therapy", 0, date(2025, 1, 7));
        history.record_assignment("The Cove", "Surf Therapy", 2, date(2025, 1, 21));
        history.record_assignment("The Nest", "Surf Therapy", 3, date(2025, 1, 28));

        assert_eq!(history.weeks_since_last_assignment("The Cove", "Surf Therapy", date(2025, 2, 4)), Some(2));
        // floor of partial weeks
        assert_eq!(history.weeks_since_last_assignment("The Cove", "Surf Therapy", date(2025, 2, 3)), Some(1));
        assert_eq!(history.weeks_since_last_assignment("The Nest", "Surf Therapy", date(2025, 1, 28)), Some(0));
        assert_eq!(history.weeks_since_last_assignment("The Nest", "Groovy Goat Farm", date(2025, 1, 28)), None);
    }

    #[test]
    fn test_gap_rule() {
        let mut history = HistoryTracker::new();
        history.record_assignment("The Haven", "Carlin Park Beach", 0, date(2025, 1, 7));

        assert!(!history.can_assign("The Haven", "Carlin Park Beach", 1, date(2025, 1, 7)));
        assert!(history.can_assign("The Haven", "Carlin Park Beach", 1, date(2025, 1, 14)));
        assert!(!history.can_assign("The Haven", "Carlin Park Beach", 2, date(2025, 1, 14)));
        assert!(history.can_assign("The Haven", "Carlin Park Beach", 2, date(2025, 1, 21)));
        assert!(history.can_assign("The Haven", "Carlin Park Beach", 0, date(2025, 1, 7)));
    }

    #[test]
    fn test_future_entry_counts_as_recent() {
        let mut history = HistoryTracker::new();
        history.record_assignment("The Lodge", "Surf Therapy", 5, date(2025, 3, 4));
        assert_eq!(history.weeks_since_last_assignment("The Lodge", "Surf Therapy", date(2025, 1, 7)), Some(0));
    }

    #[test]
    fn test_last_vendor_for_house() {
        let mut history = HistoryTracker::new();
        assert_eq!(history.last_vendor_for_house("The Oasis"), None);
        history.record_assignment("The Oasis", "Surf Therapy", 0, date(2025, 1, 7));
        history.record_assignment("The Oasis", "Groovy Goat Farm", 1, date(2025, 1, 14));
        assert_eq!(history.last_vendor_for_house("The Oasis"), Some("Groovy Goat Farm"));
        assert_eq!(history.entries_for_house("The Oasis").count(), 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_csv_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvHistoryRepository::new(dir.path().join("rotation_history.csv"));

        let empty = repo.load_history().unwrap();
        assert!(empty.is_empty());

        let mut history = HistoryTracker::new();
        history.record_assignment("The Cove", "Surf Therapy", 0, date(2025, 1, 7));
        history.record_assignment("The Estate", "Craft Haus:Pottery Painting", 1, date(2025, 1, 14));
        repo.save_history(&history).unwrap();

        let loaded = repo.load_history().unwrap();
        assert_eq!(loaded, history);
        assert_eq!(loaded.last_vendor_for_house("The Estate"), Some("Craft Haus:Pottery Painting"));
    }
}
