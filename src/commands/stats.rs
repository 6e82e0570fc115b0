//! Streak and achievement commands

use crate::achievements::{build_achievements, Achievement};
use crate::db::AppState;
use crate::stats::{load_member_stats, MemberStats};
use crate::streaks::StreakState;
use chrono::Utc;
use std::sync::Arc;
use tauri::State;

/// Current and longest streak for a member
#[tauri::command]
pub async fn get_streak(
  state: State<'_, Arc<AppState>>,
  member_id: i64,
) -> Result<StreakState, String> {
  let today = Utc::now().date_naive();
  let stats = load_member_stats(&state.db, member_id, today).await?;
  Ok(stats.streak)
}

/// Full counter set for a member's profile page
#[tauri::command]
pub async fn get_member_stats(
  state: State<'_, Arc<AppState>>,
  member_id: i64,
) -> Result<MemberStats, String> {
  let today = Utc::now().date_naive();
  load_member_stats(&state.db, member_id, today).await
}

/// Earned and in-progress achievements across every ladder
#[tauri::command]
pub async fn get_achievements(
  state: State<'_, Arc<AppState>>,
  member_id: i64,
) -> Result<Vec<Achievement>, String> {
  let now = Utc::now();
  let stats = load_member_stats(&state.db, member_id, now.date_naive()).await?;
  Ok(build_achievements(&stats, now))
}
