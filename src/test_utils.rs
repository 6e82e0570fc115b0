//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Seed helpers for circles, members, sessions, and schedules
//! - Mock data factories

use crate::schedule::SchedulePreferences;
use chrono::{DateTime, Duration, Utc, Weekday};
use sqlx::SqlitePool;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  // Run migrations
  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed a circle with one member, returning the member id
pub async fn seed_test_member(pool: &SqlitePool) -> i64 {
  let circle = sqlx::query("INSERT INTO circles (name) VALUES ('Test Circle')")
    .execute(pool)
    .await
    .expect("Failed to insert circle");

  let member = sqlx::query("INSERT INTO members (circle_id, name) VALUES (?1, 'Alex')")
    .bind(circle.last_insert_rowid())
    .execute(pool)
    .await
    .expect("Failed to insert member");

  member.last_insert_rowid()
}

/// Seed workout sessions at the given day offsets before now
/// Returns the IDs of created sessions
pub async fn seed_test_sessions(pool: &SqlitePool, member_id: i64, days_ago: &[i64]) -> Vec<i64> {
  let mut session_ids = Vec::new();

  for (i, days) in days_ago.iter().enumerate() {
    let completed_at = Utc::now() - Duration::days(*days);

    let result = sqlx::query(
      r#"
      INSERT INTO workout_sessions (member_id, name, completed_at, total_volume, is_personal_record)
      VALUES (?1, ?2, ?3, ?4, ?5)
      "#,
    )
    .bind(member_id)
    .bind(format!("Session {}", i))
    .bind(completed_at)
    .bind(1000.0 + i as f64 * 100.0)
    .bind(i == 0)
    .execute(pool)
    .await
    .expect("Failed to insert test session");

    session_ids.push(result.last_insert_rowid());
  }

  session_ids
}

/// Seed completed goals for a member
pub async fn seed_test_goals(pool: &SqlitePool, member_id: i64, completed: usize) {
  for i in 0..completed {
    sqlx::query(
      r#"
      INSERT INTO goals (member_id, title, status, completed_at)
      VALUES (?1, ?2, 'completed', ?3)
      "#,
    )
    .bind(member_id)
    .bind(format!("Goal {}", i))
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to insert test goal");
  }
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Create mock schedule preferences for testing
pub fn mock_preferences(member_id: i64) -> SchedulePreferences {
  SchedulePreferences {
    member_id,
    preferred_days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
    preferred_time_slot: None,
    min_rest_days: 1,
    max_consecutive_workout_days: 3,
    auto_reschedule: false,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    // Verify key tables exist
    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN \
       ('members', 'workout_sessions', 'scheduled_workouts', 'schedule_preferences')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert!(tables.len() >= 4, "Expected at least 4 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_sessions_returns_correct_count() {
    let pool = setup_test_db().await;
    let member_id = seed_test_member(&pool).await;

    let ids = seed_test_sessions(&pool, member_id, &[0, 1, 2]).await;
    assert_eq!(ids.len(), 3);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workout_sessions")
      .fetch_one(&pool)
      .await
      .expect("Failed to count sessions");

    assert_eq!(count, 3);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let prefs = mock_preferences(7);
    assert_eq!(prefs.member_id, 7);
    assert_eq!(prefs.preferred_days.len(), 3);

    let past = datetime_days_ago(7);
    let diff = Utc::now() - past;
    assert!(diff.num_days() >= 6 && diff.num_days() <= 8);
  }
}
