//! Missed-Workout Rescheduler
//!
//! Detects scheduled workouts whose date elapsed without completion and offers
//! individual and batch remediation.
//!
//! Key principles:
//! - Status changes are explicit transition functions returning new records
//! - Missed detection is two-phase: a pure pass computes transitions, the
//!   caller persists them (the schedule read path does both, read-repair style)
//! - The status flip to missed is idempotent, so concurrent reads racing on
//!   the same rows are benign
//! - No workout is ever dropped: every missed row ends scheduled, skipped,
//!   or stays missed

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::collections::{HashSet, VecDeque};

// ---------------------------------------------------------------------------
/// Workout Status: lifecycle of a scheduled workout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum WorkoutStatus {
    #[default]
    Scheduled,
    /// Terminal
    Completed,
    /// Derived from the calendar, reversible via reschedule
    Missed,
    /// Terminal
    Skipped,
    /// Transient marker; a reschedule lands the row back on Scheduled
    Rescheduled,
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scheduled => write!(f, "scheduled"),
            Self::Completed => write!(f, "completed"),
            Self::Missed => write!(f, "missed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Rescheduled => write!(f, "rescheduled"),
        }
    }
}

impl std::str::FromStr for WorkoutStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "missed" => Ok(Self::Missed),
            "skipped" => Ok(Self::Skipped),
            "rescheduled" => Ok(Self::Rescheduled),
            _ => Err(format!("Unknown workout status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
/// Schedule Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Batch rescheduling with no preferred days has no valid target dates;
    /// reported to the caller instead of silently succeeding
    #[error("No preferred training days configured - nothing to reschedule")]
    NoPreferredDays,

    #[error("Cannot {action} a workout with status {status}")]
    InvalidTransition {
        action: &'static str,
        status: WorkoutStatus,
    },
}

// ---------------------------------------------------------------------------
/// Scheduled Workout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledWorkout {
    pub id: i64,
    pub member_id: i64,
    pub name: String,
    pub scheduled_date: NaiveDate,
    pub status: WorkoutStatus,
    /// First planned date, kept across reschedules
    pub original_date: Option<NaiveDate>,
    pub rescheduled_count: i64,
    pub skip_reason: Option<String>,
}

impl ScheduledWorkout {
    /// Mark as completed. Only a scheduled workout can be completed.
    pub fn complete(&self) -> Result<Self, ScheduleError> {
        match self.status {
            WorkoutStatus::Scheduled => Ok(Self {
                status: WorkoutStatus::Completed,
                ..self.clone()
            }),
            status => Err(ScheduleError::InvalidTransition {
                action: "complete",
                status,
            }),
        }
    }

    /// Move a missed workout to a new date. Returns the row to scheduled and
    /// increments the reschedule counter.
    pub fn reschedule(&self, new_date: NaiveDate) -> Result<Self, ScheduleError> {
        match self.status {
            WorkoutStatus::Missed => Ok(Self {
                scheduled_date: new_date,
                status: WorkoutStatus::Scheduled,
                original_date: self.original_date.or(Some(self.scheduled_date)),
                rescheduled_count: self.rescheduled_count + 1,
                ..self.clone()
            }),
            status => Err(ScheduleError::InvalidTransition {
                action: "reschedule",
                status,
            }),
        }
    }

    /// Skip a scheduled or missed workout, with an optional reason. Terminal.
    pub fn skip(&self, reason: Option<String>) -> Result<Self, ScheduleError> {
        match self.status {
            WorkoutStatus::Scheduled | WorkoutStatus::Missed => Ok(Self {
                status: WorkoutStatus::Skipped,
                skip_reason: reason,
                ..self.clone()
            }),
            status => Err(ScheduleError::InvalidTransition {
                action: "skip",
                status,
            }),
        }
    }

    /// Flip to missed. Applied by detection only, to still-scheduled rows
    /// whose date has passed.
    fn mark_missed(&self) -> Self {
        Self {
            status: WorkoutStatus::Missed,
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
/// Schedule Preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morning => write!(f, "morning"),
            Self::Afternoon => write!(f, "afternoon"),
            Self::Evening => write!(f, "evening"),
        }
    }
}

impl std::str::FromStr for TimeSlot {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(Self::Morning),
            "afternoon" => Ok(Self::Afternoon),
            "evening" => Ok(Self::Evening),
            _ => Err(format!("Unknown time slot: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePreferences {
    pub member_id: i64,
    pub preferred_days: Vec<Weekday>,
    pub preferred_time_slot: Option<TimeSlot>,
    pub min_rest_days: i64,
    pub max_consecutive_workout_days: i64,
    pub auto_reschedule: bool,
}

impl SchedulePreferences {
    /// Defaults for a member with no stored preferences yet
    pub fn default_for(member_id: i64) -> Self {
        Self {
            member_id,
            preferred_days: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
            preferred_time_slot: None,
            min_rest_days: 1,
            max_consecutive_workout_days: 3,
            auto_reschedule: false,
        }
    }
}

// ---------------------------------------------------------------------------
/// Missed Detection (pure two-phase: compute, then apply)
// ---------------------------------------------------------------------------

/// One status flip to persist
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusTransition {
    pub workout_id: i64,
    pub from: WorkoutStatus,
    pub to: WorkoutStatus,
}

/// Find every still-scheduled row whose date has passed. Pure: persisting the
/// flips is the caller's job.
pub fn compute_missed_transitions(
    rows: &[ScheduledWorkout],
    today: NaiveDate,
) -> Vec<StatusTransition> {
    rows.iter()
        .filter(|w| w.status == WorkoutStatus::Scheduled && w.scheduled_date < today)
        .map(|w| StatusTransition {
            workout_id: w.id,
            from: w.status,
            to: WorkoutStatus::Missed,
        })
        .collect()
}

/// Return the row set with missed statuses materialized. Idempotent.
pub fn detect_missed(rows: &[ScheduledWorkout], today: NaiveDate) -> Vec<ScheduledWorkout> {
    rows.iter()
        .map(|w| {
            if w.status == WorkoutStatus::Scheduled && w.scheduled_date < today {
                w.mark_missed()
            } else {
                w.clone()
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
/// Batch Reschedule Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RescheduleStrategy {
    /// Next free preferred day on or after today, assigned sequentially
    NextAvailable,
    /// Preferred days after the last currently-scheduled workout, in order
    EndOfSchedule,
    /// Round-robin over the coming weeks so no week is overloaded
    SpreadEvenly,
}

/// A planned date change for one missed workout
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reassignment {
    pub workout_id: i64,
    pub new_date: NaiveDate,
}

/// Plan new dates for a set of missed workouts. Pure: returns the plan, the
/// caller persists each reassignment.
///
/// `schedule` is the member's full row set; still-scheduled dates in it are
/// treated as occupied so batch targets never collide with existing plans.
pub fn auto_reschedule(
    missed: &[ScheduledWorkout],
    schedule: &[ScheduledWorkout],
    preferred_days: &[Weekday],
    strategy: RescheduleStrategy,
    today: NaiveDate,
) -> Result<Vec<Reassignment>, ScheduleError> {
    if preferred_days.is_empty() {
        return Err(ScheduleError::NoPreferredDays);
    }
    if missed.is_empty() {
        return Ok(Vec::new());
    }

    let occupied: HashSet<NaiveDate> = schedule
        .iter()
        .filter(|w| w.status == WorkoutStatus::Scheduled)
        .map(|w| w.scheduled_date)
        .collect();

    let plan = match strategy {
        RescheduleStrategy::NextAvailable => {
            let mut taken = occupied;
            let mut plan = Vec::with_capacity(missed.len());
            for workout in missed {
                let mut day = today;
                while !preferred_days.contains(&day.weekday()) || taken.contains(&day) {
                    day += Duration::days(1);
                }
                taken.insert(day);
                plan.push(Reassignment {
                    workout_id: workout.id,
                    new_date: day,
                });
            }
            plan
        }
        RescheduleStrategy::EndOfSchedule => {
            let last_scheduled = schedule
                .iter()
                .filter(|w| w.status == WorkoutStatus::Scheduled)
                .map(|w| w.scheduled_date)
                .max();
            let mut day = last_scheduled.unwrap_or(today).max(today);
            let mut plan = Vec::with_capacity(missed.len());
            for workout in missed {
                loop {
                    day += Duration::days(1);
                    if preferred_days.contains(&day.weekday()) {
                        break;
                    }
                }
                plan.push(Reassignment {
                    workout_id: workout.id,
                    new_date: day,
                });
            }
            plan
        }
        RescheduleStrategy::SpreadEvenly => {
            let weeks = missed.len().div_ceil(preferred_days.len()).max(1);
            let mut week_slots: Vec<VecDeque<NaiveDate>> = (0..weeks)
                .map(|w| week_slot_dates(today, w, preferred_days, &occupied))
                .collect();

            let mut plan = Vec::with_capacity(missed.len());
            for (i, workout) in missed.iter().enumerate() {
                let mut idx = i % weeks;
                let date = loop {
                    if let Some(d) = week_slots[idx].pop_front() {
                        break d;
                    }
                    idx += 1;
                    if idx >= week_slots.len() {
                        week_slots.push(week_slot_dates(
                            today,
                            week_slots.len(),
                            preferred_days,
                            &occupied,
                        ));
                    }
                };
                plan.push(Reassignment {
                    workout_id: workout.id,
                    new_date: date,
                });
            }
            plan
        }
    };

    Ok(plan)
}

/// Free preferred-day dates in the 7-day window starting `week_index` weeks
/// from today
fn week_slot_dates(
    today: NaiveDate,
    week_index: usize,
    preferred_days: &[Weekday],
    occupied: &HashSet<NaiveDate>,
) -> VecDeque<NaiveDate> {
    (0..7)
        .map(|offset| today + Duration::days((week_index * 7 + offset) as i64))
        .filter(|d| preferred_days.contains(&d.weekday()) && !occupied.contains(d))
        .collect()
}

// ---------------------------------------------------------------------------
/// Suggested Dates
// ---------------------------------------------------------------------------

/// The next `count` preferred-weekday dates strictly after `from`, for quick
/// pick UI affordances. Empty preferences yield an empty list.
pub fn suggest_dates(preferred_days: &[Weekday], count: usize, from: NaiveDate) -> Vec<NaiveDate> {
    if preferred_days.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(count);
    let mut day = from;
    while out.len() < count {
        day += Duration::days(1);
        if preferred_days.contains(&day.weekday()) {
            out.push(day);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Database Operations
// ---------------------------------------------------------------------------

const DATE_FMT: &str = "%Y-%m-%d";

fn parse_date(s: &str, context: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FMT)
        .map_err(|e| format!("Invalid date in {}: {}", context, e))
}

fn row_to_workout(row: &sqlx::sqlite::SqliteRow) -> Result<ScheduledWorkout, String> {
    let id: i64 = row.get("id");
    let status_str: String = row.get("status");
    let date_str: String = row.get("scheduled_date");
    let original_str: Option<String> = row.get("original_date");

    Ok(ScheduledWorkout {
        id,
        member_id: row.get("member_id"),
        name: row.get("name"),
        scheduled_date: parse_date(&date_str, "scheduled_date")?,
        status: status_str.parse().unwrap_or_default(),
        original_date: original_str
            .map(|s| parse_date(&s, "original_date"))
            .transpose()?,
        rescheduled_count: row.get("rescheduled_count"),
        skip_reason: row.get("skip_reason"),
    })
}

/// Load a member's schedule rows without the missed-detection pass
pub async fn load_schedule_rows(
    pool: &SqlitePool,
    member_id: i64,
) -> Result<Vec<ScheduledWorkout>, String> {
    let rows = sqlx::query(
        r#"
        SELECT id, member_id, name, scheduled_date, status,
               original_date, rescheduled_count, skip_reason
        FROM scheduled_workouts
        WHERE member_id = ?
        ORDER BY scheduled_date, id
        "#,
    )
    .bind(member_id)
    .fetch_all(pool)
    .await
    .map_err(|e| format!("Failed to load schedule: {}", e))?;

    rows.iter().map(row_to_workout).collect()
}

/// Load a single scheduled workout by id
pub async fn load_workout(pool: &SqlitePool, id: i64) -> Result<ScheduledWorkout, String> {
    let row = sqlx::query(
        r#"
        SELECT id, member_id, name, scheduled_date, status,
               original_date, rescheduled_count, skip_reason
        FROM scheduled_workouts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| format!("Failed to load workout: {}", e))?
    .ok_or_else(|| format!("Scheduled workout not found: {}", id))?;

    row_to_workout(&row)
}

/// Insert a new scheduled workout, returning its id
pub async fn insert_scheduled_workout(
    pool: &SqlitePool,
    member_id: i64,
    name: &str,
    scheduled_date: NaiveDate,
) -> Result<i64, String> {
    let result = sqlx::query(
        r#"
        INSERT INTO scheduled_workouts (member_id, name, scheduled_date, status)
        VALUES (?, ?, ?, 'scheduled')
        "#,
    )
    .bind(member_id)
    .bind(name)
    .bind(scheduled_date.format(DATE_FMT).to_string())
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to create scheduled workout: {}", e))?;

    Ok(result.last_insert_rowid())
}

/// Write a workout's mutable fields back to the database
pub async fn save_workout(pool: &SqlitePool, workout: &ScheduledWorkout) -> Result<(), String> {
    sqlx::query(
        r#"
        UPDATE scheduled_workouts
        SET scheduled_date = ?,
            status = ?,
            original_date = ?,
            rescheduled_count = ?,
            skip_reason = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = ?
        "#,
    )
    .bind(workout.scheduled_date.format(DATE_FMT).to_string())
    .bind(workout.status.to_string())
    .bind(workout.original_date.map(|d| d.format(DATE_FMT).to_string()))
    .bind(workout.rescheduled_count)
    .bind(&workout.skip_reason)
    .bind(workout.id)
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to save workout: {}", e))?;

    Ok(())
}

/// Persist missed transitions. The status guard makes the write idempotent,
/// so two concurrent read-repair passes cannot conflict.
pub async fn apply_missed_transitions(
    pool: &SqlitePool,
    transitions: &[StatusTransition],
) -> Result<(), String> {
    for t in transitions {
        sqlx::query(
            r#"
            UPDATE scheduled_workouts
            SET status = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(t.to.to_string())
        .bind(t.workout_id)
        .bind(t.from.to_string())
        .execute(pool)
        .await
        .map_err(|e| format!("Failed to mark workout {} missed: {}", t.workout_id, e))?;
    }

    Ok(())
}

/// Load a member's preferences, falling back to defaults if none stored
pub async fn load_preferences(
    pool: &SqlitePool,
    member_id: i64,
) -> Result<SchedulePreferences, String> {
    let row = sqlx::query(
        r#"
        SELECT preferred_days_json, preferred_time_slot, min_rest_days,
               max_consecutive_workout_days, auto_reschedule
        FROM schedule_preferences
        WHERE member_id = ?
        "#,
    )
    .bind(member_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| format!("Failed to load preferences: {}", e))?;

    match row {
        Some(row) => {
            let days_json: String = row.get("preferred_days_json");
            let preferred_days: Vec<Weekday> = serde_json::from_str(&days_json)
                .map_err(|e| format!("Failed to parse preferred days: {}", e))?;
            let slot: Option<String> = row.get("preferred_time_slot");

            Ok(SchedulePreferences {
                member_id,
                preferred_days,
                preferred_time_slot: slot.and_then(|s| s.parse().ok()),
                min_rest_days: row.get("min_rest_days"),
                max_consecutive_workout_days: row.get("max_consecutive_workout_days"),
                auto_reschedule: row.get("auto_reschedule"),
            })
        }
        None => Ok(SchedulePreferences::default_for(member_id)),
    }
}

/// Upsert a member's preferences
pub async fn save_preferences(
    pool: &SqlitePool,
    prefs: &SchedulePreferences,
) -> Result<(), String> {
    let days_json = serde_json::to_string(&prefs.preferred_days)
        .map_err(|e| format!("Failed to encode preferred days: {}", e))?;

    sqlx::query(
        r#"
        INSERT INTO schedule_preferences (
            member_id, preferred_days_json, preferred_time_slot,
            min_rest_days, max_consecutive_workout_days, auto_reschedule
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(member_id) DO UPDATE SET
            preferred_days_json = excluded.preferred_days_json,
            preferred_time_slot = excluded.preferred_time_slot,
            min_rest_days = excluded.min_rest_days,
            max_consecutive_workout_days = excluded.max_consecutive_workout_days,
            auto_reschedule = excluded.auto_reschedule,
            updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(prefs.member_id)
    .bind(&days_json)
    .bind(prefs.preferred_time_slot.map(|s| s.to_string()))
    .bind(prefs.min_rest_days)
    .bind(prefs.max_consecutive_workout_days)
    .bind(prefs.auto_reschedule)
    .execute(pool)
    .await
    .map_err(|e| format!("Failed to save preferences: {}", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Schedule Actions
// ---------------------------------------------------------------------------

/// Fetch a member's schedule with the missed-detection pass applied.
/// This is a read that writes: rows whose date has passed get their status
/// flipped to missed before the set is returned.
pub async fn load_schedule(
    pool: &SqlitePool,
    member_id: i64,
    today: NaiveDate,
) -> Result<Vec<ScheduledWorkout>, String> {
    let rows = load_schedule_rows(pool, member_id).await?;

    let transitions = compute_missed_transitions(&rows, today);
    if !transitions.is_empty() {
        apply_missed_transitions(pool, &transitions).await?;
    }

    Ok(detect_missed(&rows, today))
}

/// Reschedule one missed workout to a new date
pub async fn reschedule_workout(
    pool: &SqlitePool,
    id: i64,
    new_date: NaiveDate,
) -> Result<ScheduledWorkout, String> {
    let workout = load_workout(pool, id).await?;
    let updated = workout.reschedule(new_date).map_err(|e| e.to_string())?;
    save_workout(pool, &updated).await?;
    Ok(updated)
}

/// Skip one workout, optionally recording why
pub async fn skip_workout(
    pool: &SqlitePool,
    id: i64,
    reason: Option<String>,
) -> Result<ScheduledWorkout, String> {
    let workout = load_workout(pool, id).await?;
    let updated = workout.skip(reason).map_err(|e| e.to_string())?;
    save_workout(pool, &updated).await?;
    Ok(updated)
}

/// Mark one scheduled workout completed
pub async fn complete_workout(pool: &SqlitePool, id: i64) -> Result<ScheduledWorkout, String> {
    let workout = load_workout(pool, id).await?;
    let updated = workout.complete().map_err(|e| e.to_string())?;
    save_workout(pool, &updated).await?;
    Ok(updated)
}

/// Batch-reschedule every missed workout for a member using the given
/// strategy. Per-row writes are independent; a failure partway leaves the
/// remaining rows missed for a later retry.
pub async fn auto_reschedule_missed(
    pool: &SqlitePool,
    member_id: i64,
    strategy: RescheduleStrategy,
    today: NaiveDate,
) -> Result<Vec<Reassignment>, String> {
    let schedule = load_schedule(pool, member_id, today).await?;
    let prefs = load_preferences(pool, member_id).await?;

    let missed: Vec<ScheduledWorkout> = schedule
        .iter()
        .filter(|w| w.status == WorkoutStatus::Missed)
        .cloned()
        .collect();

    let plan = auto_reschedule(&missed, &schedule, &prefs.preferred_days, strategy, today)
        .map_err(|e| e.to_string())?;

    for reassignment in &plan {
        reschedule_workout(pool, reassignment.workout_id, reassignment.new_date).await?;
    }

    Ok(plan)
}

/// Skip every missed workout for a member with a shared reason
pub async fn skip_all_missed(
    pool: &SqlitePool,
    member_id: i64,
    today: NaiveDate,
) -> Result<usize, String> {
    let schedule = load_schedule(pool, member_id, today).await?;

    let mut skipped = 0;
    for workout in schedule
        .iter()
        .filter(|w| w.status == WorkoutStatus::Missed)
    {
        skip_workout(pool, workout.id, Some("Batch skipped".to_string())).await?;
        skipped += 1;
    }

    Ok(skipped)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
