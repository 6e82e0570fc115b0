//! Tauri commands for the workout schedule and missed-workout remediation

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tauri::State;

use crate::db::AppState;
use crate::schedule::{
    self, Reassignment, RescheduleStrategy, SchedulePreferences, ScheduledWorkout, TimeSlot,
};

/// Fetch a member's schedule. Rows whose date has passed uncompleted come
/// back (and are persisted) as missed.
#[tauri::command]
pub async fn get_schedule(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
) -> Result<Vec<ScheduledWorkout>, String> {
    let today = Utc::now().date_naive();
    schedule::load_schedule(&state.db, member_id, today).await
}

/// Plan a new workout on a given date
#[tauri::command]
pub async fn create_scheduled_workout(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
    name: String,
    scheduled_date: NaiveDate,
) -> Result<i64, String> {
    schedule::insert_scheduled_workout(&state.db, member_id, &name, scheduled_date).await
}

/// Move one missed workout to a new date. The UI guards against past dates.
#[tauri::command]
pub async fn reschedule_workout(
    state: State<'_, Arc<AppState>>,
    workout_id: i64,
    new_date: NaiveDate,
) -> Result<ScheduledWorkout, String> {
    schedule::reschedule_workout(&state.db, workout_id, new_date).await
}

/// Skip one workout, optionally recording why
#[tauri::command]
pub async fn skip_workout(
    state: State<'_, Arc<AppState>>,
    workout_id: i64,
    reason: Option<String>,
) -> Result<ScheduledWorkout, String> {
    schedule::skip_workout(&state.db, workout_id, reason).await
}

/// Mark a scheduled workout completed
#[tauri::command]
pub async fn complete_workout(
    state: State<'_, Arc<AppState>>,
    workout_id: i64,
) -> Result<ScheduledWorkout, String> {
    schedule::complete_workout(&state.db, workout_id).await
}

/// Batch-reschedule every missed workout using the chosen strategy
#[tauri::command]
pub async fn auto_reschedule_missed(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
    strategy: RescheduleStrategy,
) -> Result<Vec<Reassignment>, String> {
    let today = Utc::now().date_naive();
    schedule::auto_reschedule_missed(&state.db, member_id, strategy, today).await
}

/// Skip every missed workout with a shared reason; returns how many
#[tauri::command]
pub async fn skip_all_missed(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
) -> Result<usize, String> {
    let today = Utc::now().date_naive();
    schedule::skip_all_missed(&state.db, member_id, today).await
}

/// Next few preferred-day dates for the quick pick reschedule UI
#[tauri::command]
pub async fn get_suggested_dates(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
    count: Option<usize>,
) -> Result<Vec<NaiveDate>, String> {
    let today = Utc::now().date_naive();
    let prefs = schedule::load_preferences(&state.db, member_id).await?;
    Ok(schedule::suggest_dates(
        &prefs.preferred_days,
        count.unwrap_or(3),
        today,
    ))
}

#[tauri::command]
pub async fn get_schedule_preferences(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
) -> Result<SchedulePreferences, String> {
    schedule::load_preferences(&state.db, member_id).await
}

#[tauri::command]
pub async fn update_schedule_preferences(
    state: State<'_, Arc<AppState>>,
    member_id: i64,
    preferred_days: Vec<chrono::Weekday>,
    preferred_time_slot: Option<TimeSlot>,
    min_rest_days: Option<i64>,
    max_consecutive_workout_days: Option<i64>,
    auto_reschedule: Option<bool>,
) -> Result<SchedulePreferences, String> {
    let current = schedule::load_preferences(&state.db, member_id).await?;

    let prefs = SchedulePreferences {
        member_id,
        preferred_days,
        preferred_time_slot,
        min_rest_days: min_rest_days.unwrap_or(current.min_rest_days),
        max_consecutive_workout_days: max_consecutive_workout_days
            .unwrap_or(current.max_consecutive_workout_days),
        auto_reschedule: auto_reschedule.unwrap_or(current.auto_reschedule),
    };
    schedule::save_preferences(&state.db, &prefs).await?;

    Ok(prefs)
}
