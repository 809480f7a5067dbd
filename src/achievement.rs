//! Achievement aggregation: a task's display-time actual value and rate.
//!
//! How monthly readings combine depends on the task's metric.
//! A `percent` metric tracks a cumulative state such as coverage, so only
//! the most recent reading means anything. `count` and `amount` metrics
//! record increments, so every period in the journal is summed.

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde::Serialize;

use crate::model::{Metric, Task, TaskActivity};

/// Fractional digits kept on the actual/target ratio before scaling to percent.
const WORKING_SCALE: i64 = 4;

/// Fractional digits of a displayed percentage.
const DISPLAY_SCALE: i64 = 2;

/// Where an [`Achievement`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Basis {
    /// Recomputed from the activity journal.
    Journal,

    /// Taken from the task's cached values.
    Cached,
}

/// A task's actual value and achievement at display time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub actual_value: BigDecimal,

    /// Percentage with two decimals, e.g. `33.33`.
    pub rate: BigDecimal,

    /// Whole percentage, e.g. `33`.
    pub percent: i64,

    pub basis: Basis,
}

/// Compute a task's achievement from its journal, most recent period first.
///
/// Quantitative tasks with at least one recorded reading are recomputed.
/// Qualitative tasks and tasks with no readings fall back to the cache.
#[must_use]
pub fn aggregate(task: &Task, history: &[TaskActivity]) -> Achievement {
    if task.is_quantitative()
        && let Some(actual_value) = journal_actual(task.metric, history)
    {
        let ratio = working_ratio(&actual_value, &task.target_value);
        return Achievement {
            rate: ratio.with_scale_round(DISPLAY_SCALE, RoundingMode::HalfUp),
            percent: whole(&ratio),
            actual_value,
            basis: Basis::Journal,
        };
    }

    Achievement {
        actual_value: task.actual_value.clone(),
        rate: task
            .achievement
            .with_scale_round(DISPLAY_SCALE, RoundingMode::HalfUp),
        percent: whole(&task.achievement),
        basis: Basis::Cached,
    }
}

/// Combine journal readings per `metric`.
///
/// Returns `None` when no entry carries a reading.
/// `history` must be ordered most recent period first.
#[must_use]
pub fn journal_actual(metric: Option<Metric>, history: &[TaskActivity]) -> Option<BigDecimal> {
    let mut readings = history.iter().filter_map(|a| a.actual_value.as_ref());
    match metric {
        Some(Metric::Percent) => readings.next().cloned(),
        _ => {
            let first = readings.next()?;
            Some(readings.fold(first.clone(), |sum, v| sum + v))
        }
    }
}

/// `actual / target * 100`, rounded half-up to two decimals.
///
/// A zero, negative, or missing target yields zero.
#[must_use]
pub fn achievement_rate(actual: &BigDecimal, target: &BigDecimal) -> BigDecimal {
    working_ratio(actual, target).with_scale_round(DISPLAY_SCALE, RoundingMode::HalfUp)
}

/// The ratio as a percentage, carrying `WORKING_SCALE - 2` decimals.
fn working_ratio(actual: &BigDecimal, target: &BigDecimal) -> BigDecimal {
    if *target <= BigDecimal::from(0) {
        return BigDecimal::from(0);
    }
    let ratio = (actual / target).with_scale_round(WORKING_SCALE, RoundingMode::HalfUp);
    ratio * BigDecimal::from(100)
}

/// Saturates at the `i64` bounds; the two-decimal rate stays exact.
fn whole(percent: &BigDecimal) -> i64 {
    let rounded = percent.with_scale_round(0, RoundingMode::HalfUp);
    rounded.to_i64().unwrap_or_else(|| {
        log::warn!("achievement {rounded}% does not fit a whole percent; clamping");
        if rounded < BigDecimal::from(0) {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}
