#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory learner progress: experience points, badges and story unlocks.

use std::collections::BTreeSet;

use robo_trail_core::{Badge, LevelId, ProgressSink, RewardSignal, RewardSource};
use serde::Serialize;
use tracing::{debug, info};

/// Attempts and completion of one story level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LevelRecord {
    /// Number of runs started on the level.
    pub attempts: u32,
    /// Whether the level has been finished at least once.
    pub completed: bool,
}

/// Progress of one learner through the story campaign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressLedger {
    xp: u64,
    badges: BTreeSet<Badge>,
    levels: Vec<LevelRecord>,
    unlocked: usize,
}

impl ProgressLedger {
    /// Creates an empty ledger for a campaign of `level_count` levels.
    ///
    /// Only the first level starts unlocked.
    #[must_use]
    pub fn new(level_count: usize) -> Self {
        Self {
            xp: 0,
            badges: BTreeSet::new(),
            levels: vec![LevelRecord::default(); level_count],
            unlocked: 0,
        }
    }

    /// Total experience points.
    #[must_use]
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Badges earned so far, in catalogue order.
    pub fn badges(&self) -> impl Iterator<Item = Badge> + '_ {
        self.badges.iter().copied()
    }

    /// Reports whether the badge has been earned.
    #[must_use]
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Records a badge, returning `true` only the first time it is earned.
    pub fn award(&mut self, badge: Badge) -> bool {
        let fresh = self.badges.insert(badge);
        if fresh {
            info!(badge = badge.id(), "badge earned");
        }
        fresh
    }

    /// Attempts and completion for the level, if it belongs to the campaign.
    #[must_use]
    pub fn level(&self, level: LevelId) -> Option<LevelRecord> {
        self.levels.get(index(level)?).copied()
    }

    /// Highest level that may be played.
    #[must_use]
    pub fn unlocked(&self) -> LevelId {
        level_id(self.unlocked)
    }

    /// Resolves a requested level, clamping it to the highest unlocked one.
    #[must_use]
    pub fn select_level(&self, requested: usize) -> LevelId {
        let last = self.levels.len().saturating_sub(1);
        level_id(requested.min(self.unlocked).min(last))
    }

    /// Number of completed levels.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.levels.iter().filter(|record| record.completed).count()
    }

    /// Snapshot suitable for serialization.
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            xp: self.xp,
            badges: self.badges().map(Badge::id).collect(),
            completed: self.completed_count(),
            unlocked: self.unlocked + 1,
            levels: self.levels.clone(),
        }
    }
}

impl ProgressSink for ProgressLedger {
    fn attempt_started(&mut self, level: LevelId) {
        if let Some(record) = index(level).and_then(|index| self.levels.get_mut(index)) {
            record.attempts += 1;
        }
    }

    fn reward(&mut self, signal: RewardSignal, source: RewardSource) {
        self.xp += u64::from(signal.points);
        debug!(points = signal.points, ?source, total = self.xp, "reward recorded");
        if source == RewardSource::Bonus {
            let _ = self.award(Badge::BonusHunter);
        }
    }

    fn badge_earned(&mut self, badge: Badge) {
        let _ = self.award(badge);
    }

    fn level_completed(&mut self, level: LevelId) {
        let Some(position) = index(level) else {
            return;
        };
        let Some(record) = self.levels.get_mut(position) else {
            return;
        };
        record.completed = true;

        if position + 1 < self.levels.len() {
            self.unlocked = self.unlocked.max(position + 1);
        } else {
            let _ = self.award(Badge::StoryFinisher);
        }
        info!(level = %level, unlocked = self.unlocked + 1, "level completed");
    }
}

/// Serializable view of a [`ProgressLedger`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    /// Total experience points.
    pub xp: u64,
    /// Identifiers of earned badges.
    pub badges: Vec<&'static str>,
    /// Number of completed levels.
    pub completed: usize,
    /// One-based number of the highest unlocked level.
    pub unlocked: usize,
    /// Per-level records.
    pub levels: Vec<LevelRecord>,
}

fn index(level: LevelId) -> Option<usize> {
    usize::try_from(level.get()).ok()
}

fn level_id(index: usize) -> LevelId {
    LevelId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badges_are_awarded_once() {
        let mut ledger = ProgressLedger::new(10);
        assert!(ledger.award(Badge::FirstRun));
        assert!(!ledger.award(Badge::FirstRun));
        assert_eq!(ledger.badges().count(), 1);
    }

    #[test]
    fn bonus_rewards_grant_the_bonus_badge() {
        let mut ledger = ProgressLedger::new(10);
        ledger.reward(RewardSignal::new(63), RewardSource::Style);
        assert!(!ledger.has_badge(Badge::BonusHunter));
        ledger.reward(RewardSignal::new(10), RewardSource::Bonus);
        assert!(ledger.has_badge(Badge::BonusHunter));
        assert_eq!(ledger.xp(), 73);
    }

    #[test]
    fn unknown_levels_are_ignored() {
        let mut ledger = ProgressLedger::new(2);
        ledger.attempt_started(LevelId::new(5));
        ledger.level_completed(LevelId::new(5));
        assert_eq!(ledger.level(LevelId::new(5)), None);
        assert_eq!(ledger.unlocked(), LevelId::new(0));
    }
}
