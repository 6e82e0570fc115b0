use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tenant group sharing workout data (renamed from "family")
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Circle {
  pub id: i64,
  pub name: String,
  pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
  pub id: i64,
  pub circle_id: i64,
  pub name: String,
  pub created_at: Option<DateTime<Utc>>,
}
