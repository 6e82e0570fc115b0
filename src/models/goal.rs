use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Goal {
  pub id: i64,
  pub member_id: i64,
  pub title: String,
  pub status: String,
  pub completed_at: Option<DateTime<Utc>>,
  pub created_at: Option<DateTime<Utc>>,
}
