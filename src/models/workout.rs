use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed workout session. Same-day sessions are stored as separate
/// rows; collapsing to one-per-day happens in the streak engine only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkoutSession {
  pub id: i64,
  pub member_id: i64,
  pub name: Option<String>,
  pub completed_at: DateTime<Utc>,
  /// Sum of weight x reps across all sets in the session
  pub total_volume: f64,
  pub is_personal_record: bool,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new sessions (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkoutSession {
  pub member_id: i64,
  pub name: Option<String>,
  pub completed_at: DateTime<Utc>,
  pub total_volume: f64,
  pub is_personal_record: bool,
}
