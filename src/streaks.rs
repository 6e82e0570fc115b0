//! Consecutive-day streak calculation
//!
//! Derived fresh from the full completion history on every call; nothing here
//! is cached or persisted. The caller supplies "today" so the boundary between
//! a live and a broken streak stays testable.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Current and longest consecutive-day streaks for one member.
/// Invariant: `longest >= current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StreakState {
  pub current: u32,
  pub longest: u32,
}

/// Compute streaks from completion dates (one entry per completed session).
///
/// Multiple sessions on the same calendar day count once. The current streak
/// is only alive when the most recent completion is today or yesterday;
/// otherwise it is 0 regardless of history.
pub fn compute_streak(dates: &[NaiveDate], today: NaiveDate) -> StreakState {
  let mut days: Vec<NaiveDate> = dates.to_vec();
  days.sort_unstable();
  days.dedup();

  if days.is_empty() {
    return StreakState::default();
  }

  // Longest: single ascending scan, run length resets on any gap
  let mut longest = 1u32;
  let mut run = 1u32;
  for pair in days.windows(2) {
    if pair[1] == pair[0] + Duration::days(1) {
      run += 1;
      longest = longest.max(run);
    } else {
      run = 1;
    }
  }

  // Current: walk backward from the most recent day, but only if that day
  // is today or yesterday
  let mut current = 0u32;
  if let Some(&last) = days.last() {
    if last == today || last == today - Duration::days(1) {
      current = 1;
      for i in (0..days.len().saturating_sub(1)).rev() {
        if days[i] + Duration::days(1) == days[i + 1] {
          current += 1;
        } else {
          break;
        }
      }
    }
  }

  StreakState {
    current,
    longest: longest.max(current),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
