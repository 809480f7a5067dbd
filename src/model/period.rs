//! Reporting periods: one calendar month.

use std::fmt;

use jiff::{Zoned, civil::Date};
use serde::{Deserialize, Serialize};

/// A (year, month) pair. Activity is journaled once per period.
///
/// Ordering is chronological, so sorting descending yields
/// the most recent period first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    year: i16,
    month: i8,
}

/// Unchecked wire form, validated through [`Period::new`].
#[derive(Deserialize)]
struct RawPeriod {
    year: i16,
    month: i8,
}

impl TryFrom<RawPeriod> for Period {
    type Error = String;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Self::new(raw.year, raw.month).ok_or_else(|| format!("invalid month: {}", raw.month))
    }
}

impl Period {
    /// Returns `None` when `month` is outside `1..=12`.
    #[must_use]
    pub const fn new(year: i16, month: i8) -> Option<Self> {
        if matches!(month, 1..=12) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn year(self) -> i16 {
        self.year
    }

    /// `1..=12`.
    #[must_use]
    pub const fn month(self) -> i8 {
        self.month
    }

    /// The period containing the given date.
    #[must_use]
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The period containing today, in the system time zone.
    #[must_use]
    pub fn current() -> Self {
        Self::of(Zoned::now().date())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
