use chrono::{Days, NaiveDate};

use super::engine::AssignmentEngine;
use super::history::{HistoryRepository, HistoryTracker};
use super::rotation::{RotationStrategy, RoundRobinRotation};
use super::types::{AssignmentKind, House, Roster, Vendor, WeekSchedule};
use crate::config::EngineConfig;
use crate::error::{Result, ScheduleError};

/// `weeks` anchor dates, seven days apart, starting at `start`
pub fn anchor_dates(start: NaiveDate, weeks: usize) -> Result<Vec<NaiveDate>> {
    (0..weeks)
        .map(|week| {
            start
                .checked_add_days(Days::new(7 * week as u64))
                .ok_or_else(|| ScheduleError::InvalidDate(format!("{} + {} weeks", start, week)))
        })
        .collect()
}

/// Drives the engine week by week and owns the rotation history for the run
#[derive(Debug, Clone, Default)]
pub struct ScheduleGenerator<R: RotationStrategy = RoundRobinRotation> {
    engine: AssignmentEngine<R>,
    history: HistoryTracker,
}

impl ScheduleGenerator<RoundRobinRotation> {
    pub fn new(config: EngineConfig, history: HistoryTracker) -> Self {
        Self::with_engine(AssignmentEngine::new(config), history)
    }
}

impl<R: RotationStrategy> ScheduleGenerator<R> {
    pub fn with_engine(engine: AssignmentEngine<R>, history: HistoryTracker) -> Self {
        Self { engine, history }
    }

    pub fn engine(&self) -> &AssignmentEngine<R> {
        &self.engine
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn into_history(self) -> HistoryTracker {
        self.history
    }

    /// Validates the snapshot, then generates `weeks` consecutive week schedules
    pub fn generate(
        &mut self,
        houses: &[House],
        vendors: &[Vendor],
        start_date: NaiveDate,
        weeks: usize,
    ) -> Result<Vec<WeekSchedule>> {
        let roster = Roster::new(houses.to_vec(), vendors.to_vec())?;
        self.generate_for_roster(&roster, start_date, weeks)
    }

    /// Weeks run strictly in order; history is committed only once every week is done
    pub fn generate_for_roster(
        &mut self,
        roster: &Roster,
        start_date: NaiveDate,
        weeks: usize,
    ) -> Result<Vec<WeekSchedule>> {
        if weeks == 0 {
            return Err(ScheduleError::NoWeeks);
        }
        let dates = anchor_dates(start_date, weeks)?;

        tracing::info!(
            weeks,
            houses = roster.houses().len(),
            vendors = roster.active_vendors().count(),
            priority_vendors = roster.priority_vendors().count(),
            start = %start_date,
            "generating schedule"
        );

        let mut working = self.history.clone();
        let mut schedules = Vec::with_capacity(weeks);
        for (week_index, date) in dates.into_iter().enumerate() {
            schedules.push(self.engine.schedule_week(roster, week_index, date, &mut working));
        }
        self.history = working;

        let unassigned: usize = schedules
            .iter()
            .map(|w| w.assignments.iter().filter(|a| a.kind == AssignmentKind::Unassigned).count())
            .sum();
        if unassigned > 0 {
            tracing::warn!(unassigned, "schedule has unassigned slots");
        }
        tracing::info!(weeks = schedules.len(), unassigned, history = self.history.len(), "schedule generated");

        Ok(schedules)
    }

    /// Regenerates a single week against the current history
    pub fn refill_week(&mut self, roster: &Roster, date: NaiveDate, week_index: usize) -> WeekSchedule {
        tracing::info!(%date, week_index, "refilling week");
        self.engine.schedule_week(roster, week_index, date, &mut self.history)
    }

    /// Loads history, generates, and saves history back only if generation succeeded
    pub fn generate_with_repository<H: HistoryRepository>(
        &mut self,
        repository: &H,
        roster: &Roster,
        start_date: NaiveDate,
        weeks: usize,
    ) -> Result<Vec<WeekSchedule>> {
        self.history = repository.load_history()?;
        let schedules = self.generate_for_roster(roster, start_date, weeks)?;
        repository.save_history(&self.history)?;
        Ok(schedules)
    }
}
