use chrono::NaiveDate;

use super::capacity::CapacityGuard;
use super::conflict::ConflictChecker;
use super::history::HistoryTracker;
use super::rotation::{RotationStrategy, RoundRobinRotation};
use super::types::{Assignment, AssignmentKind, House, Roster, Vendor, WeekSchedule};
use crate::config::{EngineConfig, FallbackPolicy, HistoryScope};

/// Mutable bookkeeping for the week being assigned
struct WeekState {
    date: NaiveDate,
    week_index: usize,
    committed: Vec<Assignment>,
    guard: CapacityGuard,
}

impl WeekState {
    fn is_done(&self, house: &House) -> bool {
        self.committed.iter().any(|a| a.house == house.name)
    }

    fn uses_of(&self, vendor: &str) -> u32 {
        self.committed.iter().filter(|a| a.is_vendor(vendor)).count() as u32
    }
}

/// Runs the four weekly passes: priority rotation, priority fill, secondary, fallback
#[derive(Debug, Clone, Default)]
pub struct AssignmentEngine<R: RotationStrategy = RoundRobinRotation> {
    rotation: R,
    checker: ConflictChecker,
    config: EngineConfig,
}

impl AssignmentEngine<RoundRobinRotation> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rotation(RoundRobinRotation, config)
    }
}

impl<R: RotationStrategy> AssignmentEngine<R> {
    pub fn with_rotation(rotation: R, config: EngineConfig) -> Self {
        Self {
            rotation,
            checker: ConflictChecker::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assigns every house in `roster` for one week. Never fails; unfilled houses come back
    /// as `AssignmentKind::Unassigned`.
    pub fn schedule_week(
        &self,
        roster: &Roster,
        week_index: usize,
        date: NaiveDate,
        history: &mut HistoryTracker,
    ) -> WeekSchedule {
        let mut state = WeekState {
            date,
            week_index,
            committed: Vec::with_capacity(roster.houses().len()),
            guard: CapacityGuard::new(roster.priority_vendors()),
        };

        self.priority_rotation_pass(roster, &mut state, history);
        self.priority_fill_pass(roster, &mut state, history);
        self.secondary_pass(roster, &mut state, history);
        self.fallback_pass(roster, &mut state, history);

        // Present in configured house order, not commit order
        let mut committed = state.committed;
        let assignments = roster
            .houses()
            .iter()
            .map(|house| {
                let pos = committed.iter().position(|a| a.house == house.name);
                match pos {
                    Some(i) => committed.swap_remove(i),
                    None => Assignment::unassigned(house),
                }
            })
            .collect();

        WeekSchedule {
            date,
            week_index,
            assignments,
        }
    }

    fn priority_rotation_pass(&self, roster: &Roster, state: &mut WeekState, history: &mut HistoryTracker) {
        let house_names: Vec<&str> = roster.houses().iter().map(|h| h.name.as_str()).collect();
        let priority_names: Vec<&str> = roster.priority_vendors().map(|v| v.name.as_str()).collect();
        let matrix = self.rotation.designate(&house_names, &priority_names, state.week_index);
        if matrix.is_empty() {
            return;
        }

        for house in roster.houses() {
            let Some(vendor) = matrix.get(&house.name) else {
                continue;
            };
            if self.checker.would_conflict(house, vendor, &state.committed) {
                tracing::debug!(house = %house.name, vendor = %vendor, "designated vendor has an overlapping booking");
                continue;
            }
            if !state.guard.try_reserve(vendor) {
                tracing::debug!(house = %house.name, vendor = %vendor, "designated vendor is at weekly capacity");
                continue;
            }
            self.commit(state, history, house, vendor, AssignmentKind::PriorityRotation);
        }
    }

    fn priority_fill_pass(&self, roster: &Roster, state: &mut WeekState, history: &mut HistoryTracker) {
        let gap = self.config.priority_fill_min_gap_weeks;
        let priority: Vec<&Vendor> = roster.priority_vendors().collect();
        if priority.is_empty() {
            return;
        }

        for house in roster.houses() {
            if state.is_done(house) {
                continue;
            }
            let chosen = priority.iter().find(|v| {
                state.guard.has_capacity(&v.name)
                    && !self.checker.would_conflict(house, &v.name, &state.committed)
                    && history.can_assign(&house.name, &v.name, gap, state.date)
            });
            if let Some(vendor) = chosen {
                if state.guard.try_reserve(&vendor.name) {
                    self.commit(state, history, house, &vendor.name, AssignmentKind::PriorityFill);
                }
            }
        }
    }

    fn secondary_pass(&self, roster: &Roster, state: &mut WeekState, history: &mut HistoryTracker) {
        let gap = self.config.secondary_min_gap_weeks;
        let cap = self.config.secondary_weekly_cap;

        for house in roster.houses() {
            if state.is_done(house) {
                continue;
            }
            let pool: Vec<&Vendor> = roster
                .secondary_vendors()
                .filter(|v| state.uses_of(&v.name) < cap)
                .filter(|v| history.can_assign(&house.name, &v.name, gap, state.date))
                .filter(|v| !self.checker.would_conflict(house, &v.name, &state.committed))
                .collect();
            if pool.is_empty() {
                continue;
            }
            // Spread usage by indexing on how much of the week is already filled
            let vendor = pool[state.committed.len() % pool.len()];
            self.commit(state, history, house, &vendor.name, AssignmentKind::Secondary);
        }
    }

    fn fallback_pass(&self, roster: &Roster, state: &mut WeekState, history: &mut HistoryTracker) {
        for house in roster.houses() {
            if state.is_done(house) {
                continue;
            }
            let candidate = match self.config.fallback {
                FallbackPolicy::UnusedActive => roster
                    .active_vendors()
                    .find(|v| state.uses_of(&v.name) == 0 && self.fallback_capacity_ok(state, v)),
                FallbackPolicy::NonConflicting => roster.active_vendors().find(|v| {
                    !self.checker.would_conflict(house, &v.name, &state.committed)
                        && self.fallback_capacity_ok(state, v)
                }),
                FallbackPolicy::Disabled => None,
            };

            match candidate {
                Some(vendor) => {
                    if vendor.is_priority() {
                        state.guard.try_reserve(&vendor.name);
                    }
                    self.commit(state, history, house, &vendor.name, AssignmentKind::Fallback);
                }
                None => {
                    tracing::warn!(
                        house = %house.name,
                        date = %state.date,
                        "no eligible vendor left, slot stays unassigned"
                    );
                    state.committed.push(Assignment::unassigned(house));
                }
            }
        }
    }

    /// Priority vendors keep their hard weekly cap even in the fallback pass
    fn fallback_capacity_ok(&self, state: &WeekState, vendor: &Vendor) -> bool {
        !vendor.is_priority() || state.guard.has_capacity(&vendor.name)
    }

    fn commit(
        &self,
        state: &mut WeekState,
        history: &mut HistoryTracker,
        house: &House,
        vendor: &str,
        kind: AssignmentKind,
    ) {
        tracing::debug!(house = %house.name, vendor = %vendor, kind = kind.label(), date = %state.date, "assigned");
        state.committed.push(Assignment {
            house: house.name.clone(),
            vendor: Some(vendor.to_string()),
            time_slot: house.time_slot,
            kind,
        });
        let record = match self.config.record_history_for {
            HistoryScope::AllNamed => true,
            HistoryScope::PriorityOnly => kind == AssignmentKind::PriorityRotation,
        };
        if record {
            history.record_assignment(&house.name, vendor, state.week_index, state.date);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::schedule::slot_utils::TimeSlot;

    fn house(name: &str, slot: &str) -> House {
        House {
            name: name.to_string(),
            time_slot: TimeSlot::parse(slot).unwrap(),
            color: "#CCCCCC".to_string(),
            priority: 0,
        }
    }

    /// Back-to-back hourly slots so nothing overlaps
    fn staggered(names: &[&str]) -> Vec<House> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| house(name, &format!("{}:00 - {}:00", 8 + i, 9 + i)))
            .collect()
    }

    fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 7).unwrap()
    }

    fn run(roster: &Roster, config: EngineConfig) -> WeekSchedule {
        AssignmentEngine::new(config).schedule_week(roster, 0, tuesday(), &mut HistoryTracker::new())
    }

    fn kinds(week: &WeekSchedule) -> Vec<(String, AssignmentKind)> {
        week.assignments
            .iter()
            .map(|a| (a.vendor_label().to_string(), a.kind))
            .collect()
    }

    struct EveryoneGetsFirst;

    impl RotationStrategy for EveryoneGetsFirst {
        fn designate(&self, houses: &[&str], priority_vendors: &[&str], _week: usize) -> HashMap<String, String> {
            houses
                .iter()
                .map(|h| (h.to_string(), priority_vendors[0].to_string()))
                .collect()
        }
    }

    #[test]
    fn test_priority_rotation_follows_matrix() {
        let roster = Roster::new(
            staggered(&["A", "B", "C", "D", "E", "F"]),
            vec![
                Vendor::priority("V1", 6),
                Vendor::priority("V2", 6),
                Vendor::priority("V3", 6),
                Vendor::priority("V4", 6),
            ],
        )
        .unwrap();

        let week = run(&roster, EngineConfig::default());
        let vendors: Vec<&str> = week.assignments.iter().map(|a| a.vendor_label()).collect();
        assert_eq!(vendors, vec!["V1", "V2", "V3", "V4", "V1", "V2"]);
        assert!(week.assignments.iter().all(|a| a.kind == AssignmentKind::PriorityRotation));
    }

    #[test]
    fn test_overlap_falls_through_to_secondary() {
        let roster = Roster::new(
            vec![house("A", "10:00 - 11:00"), house("B", "10:30 - 11:30")],
            vec![Vendor::priority("V1", 6), Vendor::new("S1")],
        )
        .unwrap();

        let week = run(&roster, EngineConfig::default());
        assert_eq!(
            kinds(&week),
            vec![
                ("V1".to_string(), AssignmentKind::PriorityRotation),
                ("S1".to_string(), AssignmentKind::Secondary),
            ]
        );
    }

    #[test]
    fn test_overlap_falls_through_to_priority_fill() {
        let roster = Roster::new(
            vec![house("A", "10:00 - 11:00"), house("B", "10:30 - 11:30")],
            vec![Vendor::priority("V1", 6), Vendor::priority("V2", 6)],
        )
        .unwrap();

        let engine = AssignmentEngine::with_rotation(EveryoneGetsFirst, EngineConfig::default());
        let week = engine.schedule_week(&roster, 0, tuesday(), &mut HistoryTracker::new());
        assert_eq!(
            kinds(&week),
            vec![
                ("V1".to_string(), AssignmentKind::PriorityRotation),
                ("V2".to_string(), AssignmentKind::PriorityFill),
            ]
        );
    }

    #[test]
    fn test_capacity_spills_into_priority_fill() {
        let roster = Roster::new(
            staggered(&["A", "B", "C"]),
            vec![Vendor::priority("V1", 1), Vendor::priority("V2", 5)],
        )
        .unwrap();

        let week = run(&roster, EngineConfig::default());
        assert_eq!(
            kinds(&week),
            vec![
                ("V1".to_string(), AssignmentKind::PriorityRotation),
                ("V2".to_string(), AssignmentKind::PriorityRotation),
                ("V2".to_string(), AssignmentKind::PriorityFill),
            ]
        );
    }

    #[test]
    fn test_priority_fill_respects_gap_rule() {
        let roster = Roster::new(
            staggered(&["A", "B", "C"]),
            vec![Vendor::priority("V1", 1), Vendor::priority("V2", 5), Vendor::new("S1")],
        )
        .unwrap();
        let mut history = HistoryTracker::new();
        let last_week = tuesday() - chrono::Duration::days(7);
        history.record_assignment("C", "V2", 0, last_week);

        let week = AssignmentEngine::new(EngineConfig::default()).schedule_week(&roster, 0, tuesday(), &mut history);
        assert_eq!(week.assignment("C").unwrap().kind, AssignmentKind::Secondary);
        assert_eq!(week.vendor_for("C"), Some("S1"));
    }

    #[test]
    fn test_secondary_rotates_through_pool() {
        let roster = Roster::new(
            staggered(&["A", "B", "C"]),
            vec![Vendor::new("S1"), Vendor::new("S2"), Vendor::new("S3")],
        )
        .unwrap();

        let week = run(&roster, EngineConfig::default());
        let vendors: Vec<&str> = week.assignments.iter().map(|a| a.vendor_label()).collect();
        assert_eq!(vendors, vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_secondary_weekly_cap_then_fallback_policies() {
        let houses = staggered(&["A", "B", "C", "D"]);
        let roster = Roster::new(houses, vec![Vendor::new("S1")]).unwrap();

        let week = run(&roster, EngineConfig::default());
        assert_eq!(week.vendor_for("C"), Some("S1"));
        assert_eq!(week.assignment("D").unwrap().kind, AssignmentKind::Unassigned);

        let config = EngineConfig {
            fallback: FallbackPolicy::NonConflicting,
            ..EngineConfig::default()
        };
        let week = run(&roster, config);
        assert_eq!(week.assignment("D").unwrap().kind, AssignmentKind::Fallback);
        assert_eq!(week.vendor_for("D"), Some("S1"));
    }

    #[test]
    fn test_fallback_ignores_gap_rule() {
        let roster = Roster::new(staggered(&["A"]), vec![Vendor::new("S1")]).unwrap();
        let mut history = HistoryTracker::new();
        history.record_assignment("A", "S1", 0, tuesday());

        let week = AssignmentEngine::new(EngineConfig::default()).schedule_week(&roster, 1, tuesday(), &mut history);
        assert_eq!(kinds(&week), vec![("S1".to_string(), AssignmentKind::Fallback)]);
    }

    #[test]
    fn test_disabled_fallback_leaves_unassigned() {
        let roster = Roster::new(staggered(&["A"]), vec![Vendor::new("S1")]).unwrap();
        let mut history = HistoryTracker::new();
        history.record_assignment("A", "S1", 0, tuesday());
        let config = EngineConfig {
            fallback: FallbackPolicy::Disabled,
            ..EngineConfig::default()
        };

        let week = AssignmentEngine::new(config).schedule_week(&roster, 1, tuesday(), &mut history);
        assert_eq!(week.assignment("A").unwrap().kind, AssignmentKind::Unassigned);
        assert_eq!(week.assignment("A").unwrap().vendor, None);
    }

    #[test]
    fn test_fewer_vendors_than_houses_leaves_unassigned() {
        let roster = Roster::new(
            vec![
                house("A", "10 AM - 12 PM"),
                house("B", "10 AM - 12 PM"),
                house("C", "10 AM - 12 PM"),
            ],
            vec![Vendor::new("S1"), Vendor::new("Closed").inactive()],
        )
        .unwrap();

        let week = run(&roster, EngineConfig::default());
        assert_eq!(week.vendor_for("A"), Some("S1"));
        assert_eq!(week.unassigned_houses(), vec!["B".to_string(), "C".to_string()]);
        assert_eq!(week.assignments.len(), 3);
    }

    #[test]
    fn test_no_priority_vendors_resolve_via_secondary() {
        let roster = Roster::new(staggered(&["A", "B"]), vec![Vendor::new("S1"), Vendor::new("S2")]).unwrap();
        let week = run(&roster, EngineConfig::default());
        assert!(week.assignments.iter().all(|a| a.kind == AssignmentKind::Secondary));
    }

    #[test]
    fn test_fallback_respects_priority_cap() {
        let roster = Roster::new(
            staggered(&["A"]),
            vec![Vendor::priority("Full", 0), Vendor::new("S1")],
        )
        .unwrap();
        let mut history = HistoryTracker::new();
        history.record_assignment("A", "S1", 0, tuesday());

        let week = AssignmentEngine::new(EngineConfig::default()).schedule_week(&roster, 1, tuesday(), &mut history);
        assert_eq!(kinds(&week), vec![("S1".to_string(), AssignmentKind::Fallback)]);
    }

    #[test]
    fn test_history_scope() {
        let roster = Roster::new(
            staggered(&["A", "B"]),
            vec![Vendor::priority("V1", 1), Vendor::new("S1")],
        )
        .unwrap();

        let mut history = HistoryTracker::new();
        AssignmentEngine::new(EngineConfig::default()).schedule_week(&roster, 0, tuesday(), &mut history);
        assert_eq!(history.len(), 2);

        let config = EngineConfig {
            record_history_for: HistoryScope::PriorityOnly,
            ..EngineConfig::default()
        };
        let mut history = HistoryTracker::new();
        AssignmentEngine::new(config).schedule_week(&roster, 0, tuesday(), &mut history);
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].vendor, "V1");
    }
}
