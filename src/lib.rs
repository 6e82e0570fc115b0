mod achievements;
mod commands;
mod db;
mod models;
mod schedule;
mod stats;
mod streaks;
#[cfg(test)]
mod test_utils;

use db::AppState;
use std::sync::Arc;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(|app| {
      // Initialize database
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle).await {
          Ok(pool) => {
            let state = Arc::new(AppState { db: pool });
            app_handle.manage(state);
            println!("Database ready");
          }
          Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      commands::get_circles,
      commands::get_members,
      commands::get_workout_sessions,
      commands::log_workout_session,
      commands::get_goals,
      commands::complete_goal,
      // Streak & achievement commands
      commands::stats::get_streak,
      commands::stats::get_member_stats,
      commands::stats::get_achievements,
      // Schedule commands
      commands::schedule::get_schedule,
      commands::schedule::create_scheduled_workout,
      commands::schedule::reschedule_workout,
      commands::schedule::skip_workout,
      commands::schedule::complete_workout,
      commands::schedule::auto_reschedule_missed,
      commands::schedule::skip_all_missed,
      commands::schedule::get_suggested_dates,
      commands::schedule::get_schedule_preferences,
      commands::schedule::update_schedule_preferences,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
