//! Aggregate member counters feeding the achievement engine
//!
//! Weekly and monthly counts use raw session rows (two sessions on one day
//! count twice); only the streak calculation collapses same-day sessions.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::streaks::{compute_streak, StreakState};

/// Lifetime and windowed counters for a single member
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MemberStats {
  pub total_workouts: i64,
  pub workouts_this_week: i64,
  pub workouts_this_month: i64,
  /// Lifetime weight x reps across all sets
  pub total_volume: f64,
  pub personal_records: i64,
  pub completed_goals: i64,
  pub streak: StreakState,
}

/// First day (Monday) of the calendar week containing `today`
pub fn week_start(today: NaiveDate) -> NaiveDate {
  today.week(Weekday::Mon).first_day()
}

/// First day of the calendar month containing `today`
pub fn month_start(today: NaiveDate) -> NaiveDate {
  today.with_day(1).unwrap_or(today)
}

/// Build stats from already-fetched session data plus the goal counter
pub fn compute_member_stats(
  sessions: &[(DateTime<Utc>, f64, bool)],
  completed_goals: i64,
  today: NaiveDate,
) -> MemberStats {
  let week = week_start(today);
  let month = month_start(today);

  let mut stats = MemberStats {
    total_workouts: sessions.len() as i64,
    completed_goals,
    ..Default::default()
  };

  let mut dates = Vec::with_capacity(sessions.len());
  for (completed_at, volume, is_pr) in sessions {
    let day = completed_at.date_naive();
    dates.push(day);

    stats.total_volume += volume;
    if *is_pr {
      stats.personal_records += 1;
    }
    if day >= week && day <= today {
      stats.workouts_this_week += 1;
    }
    if day >= month && day <= today {
      stats.workouts_this_month += 1;
    }
  }

  stats.streak = compute_streak(&dates, today);
  stats
}

// ---------------------------------------------------------------------------
// Database Operations
// ---------------------------------------------------------------------------

/// Load a member's full session history and assemble their stats
pub async fn load_member_stats(
  pool: &SqlitePool,
  member_id: i64,
  today: NaiveDate,
) -> Result<MemberStats, String> {
  let sessions: Vec<(DateTime<Utc>, f64, bool)> = sqlx::query_as(
    r#"
    SELECT completed_at, total_volume, is_personal_record
    FROM workout_sessions
    WHERE member_id = ?1
    ORDER BY completed_at ASC
    "#,
  )
  .bind(member_id)
  .fetch_all(pool)
  .await
  .map_err(|e| format!("Failed to fetch sessions: {}", e))?;

  let completed_goals: i64 = sqlx::query_scalar(
    "SELECT COUNT(*) FROM goals WHERE member_id = ?1 AND status = 'completed'",
  )
  .bind(member_id)
  .fetch_one(pool)
  .await
  .map_err(|e| format!("Failed to count goals: {}", e))?;

  Ok(compute_member_stats(&sessions, completed_goals, today))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
  }

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  #[test]
  fn test_week_starts_monday() {
    // 2024-03-15 is a Friday
    assert_eq!(week_start(d(2024, 3, 15)), d(2024, 3, 11));
    // Monday maps to itself
    assert_eq!(week_start(d(2024, 3, 11)), d(2024, 3, 11));
  }

  #[test]
  fn test_month_start() {
    assert_eq!(month_start(d(2024, 3, 15)), d(2024, 3, 1));
  }

  #[test]
  fn test_counters_from_sessions() {
    // Friday 2024-03-15: two sessions this week, one last month
    let today = d(2024, 3, 15);
    let sessions = vec![
      (at(2024, 2, 20, 9), 1200.0, false),
      (at(2024, 3, 12, 18), 1500.0, true),
      (at(2024, 3, 15, 7), 800.0, false),
    ];

    let stats = compute_member_stats(&sessions, 2, today);

    assert_eq!(stats.total_workouts, 3);
    assert_eq!(stats.workouts_this_week, 2);
    assert_eq!(stats.workouts_this_month, 2);
    assert_eq!(stats.total_volume, 3500.0);
    assert_eq!(stats.personal_records, 1);
    assert_eq!(stats.completed_goals, 2);
  }

  #[test]
  fn test_same_day_sessions_count_twice_for_week() {
    // Two sessions on one day: weekly count is raw, streak deduplicates
    let today = d(2024, 3, 15);
    let sessions = vec![
      (at(2024, 3, 15, 7), 500.0, false),
      (at(2024, 3, 15, 19), 500.0, false),
    ];

    let stats = compute_member_stats(&sessions, 0, today);

    assert_eq!(stats.workouts_this_week, 2);
    assert_eq!(stats.streak.current, 1);
  }

  #[test]
  fn test_empty_history() {
    let stats = compute_member_stats(&[], 0, d(2024, 3, 15));
    assert_eq!(stats.total_workouts, 0);
    assert_eq!(stats.streak, StreakState::default());
  }

  #[tokio::test]
  async fn test_load_member_stats_from_db() {
    let pool = crate::test_utils::setup_test_db().await;
    let member_id = crate::test_utils::seed_test_member(&pool).await;

    // Three-day run ending today, plus one old session
    crate::test_utils::seed_test_sessions(&pool, member_id, &[0, 1, 2, 40]).await;
    crate::test_utils::seed_test_goals(&pool, member_id, 2).await;

    let today = Utc::now().date_naive();
    let stats = load_member_stats(&pool, member_id, today).await.unwrap();

    assert_eq!(stats.total_workouts, 4);
    assert_eq!(stats.completed_goals, 2);
    assert_eq!(stats.personal_records, 1);
    assert_eq!(stats.streak.current, 3);
    assert!(stats.streak.longest >= stats.streak.current);
    assert!(stats.total_volume > 0.0);

    crate::test_utils::teardown_test_db(pool).await;
  }
}
