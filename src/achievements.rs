//! Achievement ladder engine
//!
//! Four independent milestone ladders evaluated against a member's counters.
//! Each ladder is walked ascending: every threshold already reached is emitted
//! as earned, then exactly one pending entry (progress toward the next rung)
//! and the walk stops. Historical earn dates are not tracked, so earned
//! entries carry the evaluation timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::MemberStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementIcon {
  Dumbbell,
  Flame,
  Medal,
  Star,
  Target,
  Calendar,
}

/// A badge, either earned (has `earned_at`) or pending (has progress/target)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
  pub id: String,
  pub title: String,
  pub description: String,
  pub icon: AchievementIcon,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub earned_at: Option<DateTime<Utc>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub progress: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<i64>,
}

impl Achievement {
  pub fn is_earned(&self) -> bool {
    self.earned_at.is_some()
  }
}

/// One rung of a milestone ladder
struct Rung {
  threshold: i64,
  id: &'static str,
  title: &'static str,
  description: &'static str,
}

const WORKOUT_LADDER: &[Rung] = &[
  Rung { threshold: 1, id: "workouts_1", title: "First Steps", description: "Complete your first workout" },
  Rung { threshold: 10, id: "workouts_10", title: "Into the Groove", description: "Complete 10 workouts" },
  Rung { threshold: 25, id: "workouts_25", title: "Committed", description: "Complete 25 workouts" },
  Rung { threshold: 50, id: "workouts_50", title: "Dedicated", description: "Complete 50 workouts" },
  Rung { threshold: 100, id: "workouts_100", title: "Century Club", description: "Complete 100 workouts" },
  Rung { threshold: 250, id: "workouts_250", title: "Relentless", description: "Complete 250 workouts" },
  Rung { threshold: 500, id: "workouts_500", title: "Legend", description: "Complete 500 workouts" },
];

const STREAK_LADDER: &[Rung] = &[
  Rung { threshold: 3, id: "streak_3", title: "On a Roll", description: "Work out 3 days in a row" },
  Rung { threshold: 7, id: "streak_7", title: "Full Week", description: "Work out 7 days in a row" },
  Rung { threshold: 14, id: "streak_14", title: "Fortnight Fighter", description: "Work out 14 days in a row" },
  Rung { threshold: 30, id: "streak_30", title: "Monthly Machine", description: "Work out 30 days in a row" },
  Rung { threshold: 60, id: "streak_60", title: "Sixty Strong", description: "Work out 60 days in a row" },
  Rung { threshold: 100, id: "streak_100", title: "Unstoppable", description: "Work out 100 days in a row" },
];

const VOLUME_LADDER: &[Rung] = &[
  Rung { threshold: 10_000, id: "volume_10k", title: "Heavy Starter", description: "Lift 10,000 total" },
  Rung { threshold: 100_000, id: "volume_100k", title: "Six Figures", description: "Lift 100,000 total" },
  Rung { threshold: 500_000, id: "volume_500k", title: "Half-Million Club", description: "Lift 500,000 total" },
  Rung { threshold: 1_000_000, id: "volume_1m", title: "Million Mover", description: "Lift 1,000,000 total" },
];

const PR_LADDER: &[Rung] = &[
  Rung { threshold: 1, id: "pr_1", title: "Record Breaker", description: "Set your first personal record" },
  Rung { threshold: 10, id: "pr_10", title: "PR Machine", description: "Set 10 personal records" },
];

const GOAL_LADDER: &[Rung] = &[
  Rung { threshold: 1, id: "goal_1", title: "Goal Getter", description: "Complete your first goal" },
  Rung { threshold: 5, id: "goal_5", title: "Serial Achiever", description: "Complete 5 goals" },
];

const WEEKLY_LADDER: &[Rung] = &[
  Rung { threshold: 5, id: "week_5", title: "Week Warrior", description: "Complete 5 workouts in one week" },
];

/// Walk one ladder: earned entries for every rung at or below `value`, then a
/// single pending entry at the first rung not yet reached
fn walk_ladder(
  rungs: &[Rung],
  value: i64,
  icon: AchievementIcon,
  now: DateTime<Utc>,
  out: &mut Vec<Achievement>,
) {
  for rung in rungs {
    if value >= rung.threshold {
      out.push(Achievement {
        id: rung.id.to_string(),
        title: rung.title.to_string(),
        description: rung.description.to_string(),
        icon,
        earned_at: Some(now),
        progress: None,
        target: None,
      });
    } else {
      out.push(Achievement {
        id: rung.id.to_string(),
        title: rung.title.to_string(),
        description: rung.description.to_string(),
        icon,
        earned_at: None,
        progress: Some(value),
        target: Some(rung.threshold),
      });
      break;
    }
  }
}

/// Evaluate every ladder against the member's counters
pub fn build_achievements(stats: &MemberStats, now: DateTime<Utc>) -> Vec<Achievement> {
  let mut out = Vec::new();

  walk_ladder(WORKOUT_LADDER, stats.total_workouts, AchievementIcon::Dumbbell, now, &mut out);
  walk_ladder(STREAK_LADDER, stats.streak.longest as i64, AchievementIcon::Flame, now, &mut out);
  walk_ladder(VOLUME_LADDER, stats.total_volume as i64, AchievementIcon::Medal, now, &mut out);
  walk_ladder(PR_LADDER, stats.personal_records, AchievementIcon::Star, now, &mut out);
  walk_ladder(GOAL_LADDER, stats.completed_goals, AchievementIcon::Target, now, &mut out);
  walk_ladder(WEEKLY_LADDER, stats.workouts_this_week, AchievementIcon::Calendar, now, &mut out);

  out
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::streaks::StreakState;

  fn stats(total: i64, longest: u32, this_week: i64, volume: f64, prs: i64, goals: i64) -> MemberStats {
    MemberStats {
      total_workouts: total,
      workouts_this_week: this_week,
      workouts_this_month: this_week,
      total_volume: volume,
      personal_records: prs,
      completed_goals: goals,
      streak: StreakState { current: longest, longest },
    }
  }

  fn ladder<'a>(all: &'a [Achievement], prefix: &str) -> Vec<&'a Achievement> {
    all.iter().filter(|a| a.id.starts_with(prefix)).collect()
  }

  #[test]
  fn test_fresh_member_gets_only_pending_entries() {
    let all = build_achievements(&stats(0, 0, 0, 0.0, 0, 0), Utc::now());

    // Every ladder reports exactly its first rung, pending at progress 0
    assert!(all.iter().all(|a| !a.is_earned()));
    assert!(all.iter().all(|a| a.progress == Some(0)));
    assert_eq!(ladder(&all, "workouts_").len(), 1);
    assert_eq!(ladder(&all, "workouts_")[0].target, Some(1));
    assert_eq!(ladder(&all, "streak_")[0].target, Some(3));
  }

  #[test]
  fn test_earned_rungs_below_pending() {
    let all = build_achievements(&stats(30, 0, 0, 0.0, 0, 0), Utc::now());
    let workouts = ladder(&all, "workouts_");

    // 1, 10, 25 earned; 50 pending; nothing past it
    assert_eq!(workouts.len(), 4);
    assert!(workouts[0].is_earned());
    assert!(workouts[1].is_earned());
    assert!(workouts[2].is_earned());
    assert!(!workouts[3].is_earned());
    assert_eq!(workouts[3].progress, Some(30));
    assert_eq!(workouts[3].target, Some(50));
  }

  #[test]
  fn test_at_most_one_pending_per_ladder() {
    for total in [0, 1, 9, 10, 49, 100, 499, 500, 9999] {
      let all = build_achievements(&stats(total, 5, 2, 50_000.0, 3, 1), Utc::now());
      for prefix in ["workouts_", "streak_", "volume_", "pr_", "goal_", "week_"] {
        let pending = ladder(&all, prefix)
          .iter()
          .filter(|a| !a.is_earned())
          .count();
        assert!(pending <= 1, "{} pending entries for {}", pending, prefix);
      }
    }
  }

  #[test]
  fn test_fully_surpassed_ladder_has_no_pending() {
    let all = build_achievements(&stats(600, 0, 0, 0.0, 0, 0), Utc::now());
    let workouts = ladder(&all, "workouts_");

    assert_eq!(workouts.len(), 7);
    assert!(workouts.iter().all(|a| a.is_earned()));
  }

  #[test]
  fn test_exact_threshold_is_earned() {
    let all = build_achievements(&stats(10, 0, 0, 0.0, 0, 0), Utc::now());
    let workouts = ladder(&all, "workouts_");

    assert!(workouts[1].is_earned());
    assert_eq!(workouts[1].id, "workouts_10");
    // Next rung pending at current progress
    assert_eq!(workouts[2].progress, Some(10));
    assert_eq!(workouts[2].target, Some(25));
  }

  #[test]
  fn test_earned_and_pending_fields_are_exclusive() {
    let all = build_achievements(&stats(30, 5, 5, 20_000.0, 2, 1), Utc::now());
    for a in &all {
      if a.is_earned() {
        assert!(a.progress.is_none() && a.target.is_none(), "{}", a.id);
      } else {
        assert!(a.progress.is_some() && a.target.is_some(), "{}", a.id);
      }
    }
  }

  #[test]
  fn test_streak_ladder_uses_longest() {
    let mut s = stats(50, 0, 0, 0.0, 0, 0);
    s.streak = StreakState { current: 0, longest: 14 };

    let all = build_achievements(&s, Utc::now());
    let streaks = ladder(&all, "streak_");

    // 3, 7, 14 earned despite a broken current streak
    assert!(streaks[0].is_earned());
    assert!(streaks[1].is_earned());
    assert!(streaks[2].is_earned());
    assert_eq!(streaks[3].target, Some(30));
  }

  #[test]
  fn test_week_warrior() {
    let all = build_achievements(&stats(20, 2, 5, 0.0, 0, 0), Utc::now());
    let week = ladder(&all, "week_");
    assert_eq!(week.len(), 1);
    assert!(week[0].is_earned());
  }

  #[test]
  fn test_volume_ladder_progress() {
    let all = build_achievements(&stats(0, 0, 0, 250_000.0, 0, 0), Utc::now());
    let volume = ladder(&all, "volume_");

    assert!(volume[0].is_earned());
    assert!(volume[1].is_earned());
    assert_eq!(volume[2].progress, Some(250_000));
    assert_eq!(volume[2].target, Some(500_000));
  }
}
