pub mod schedule;
pub mod stats;

use crate::db::AppState;
use crate::models::workout::NewWorkoutSession;
use crate::models::{Circle, Goal, Member, WorkoutSession};
use chrono::Utc;
use std::sync::Arc;
use tauri::State;

#[tauri::command]
pub async fn get_circles(
  state: State<'_, Arc<AppState>>,
) -> Result<Vec<Circle>, String> {
  sqlx::query_as::<_, Circle>(
    "SELECT * FROM circles ORDER BY name"
  )
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch circles: {}", e))
}

#[tauri::command]
pub async fn get_members(
  state: State<'_, Arc<AppState>>,
  circle_id: i64,
) -> Result<Vec<Member>, String> {
  sqlx::query_as::<_, Member>(
    "SELECT * FROM members WHERE circle_id = ?1 ORDER BY name"
  )
  .bind(circle_id)
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch members: {}", e))
}

#[tauri::command]
pub async fn get_workout_sessions(
  state: State<'_, Arc<AppState>>,
  member_id: i64,
  limit: Option<i64>,
) -> Result<Vec<WorkoutSession>, String> {
  sqlx::query_as::<_, WorkoutSession>(
    "SELECT * FROM workout_sessions WHERE member_id = ?1 ORDER BY completed_at DESC LIMIT ?2"
  )
  .bind(member_id)
  .bind(limit.unwrap_or(50))
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch sessions: {}", e))
}

#[tauri::command]
pub async fn log_workout_session(
  state: State<'_, Arc<AppState>>,
  session: NewWorkoutSession,
) -> Result<i64, String> {
  let result = sqlx::query(
    r#"
    INSERT INTO workout_sessions (member_id, name, completed_at, total_volume, is_personal_record)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
  )
  .bind(session.member_id)
  .bind(&session.name)
  .bind(session.completed_at)
  .bind(session.total_volume)
  .bind(session.is_personal_record)
  .execute(&state.db)
  .await
  .map_err(|e| format!("Failed to log session: {}", e))?;

  Ok(result.last_insert_rowid())
}

#[tauri::command]
pub async fn get_goals(
  state: State<'_, Arc<AppState>>,
  member_id: i64,
) -> Result<Vec<Goal>, String> {
  sqlx::query_as::<_, Goal>(
    "SELECT * FROM goals WHERE member_id = ?1 ORDER BY created_at DESC"
  )
  .bind(member_id)
  .fetch_all(&state.db)
  .await
  .map_err(|e| format!("Failed to fetch goals: {}", e))
}

#[tauri::command]
pub async fn complete_goal(
  state: State<'_, Arc<AppState>>,
  goal_id: i64,
) -> Result<(), String> {
  sqlx::query(
    "UPDATE goals SET status = 'completed', completed_at = ?1 WHERE id = ?2"
  )
  .bind(Utc::now())
  .bind(goal_id)
  .execute(&state.db)
  .await
  .map_err(|e| format!("Failed to complete goal: {}", e))?;

  Ok(())
}
