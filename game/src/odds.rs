//! Turning raw outcome counts into displayed percentages.

use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, Snafu};

use crate::model::SeatId;

/// A percentage with two decimals, stored in hundredths of a percent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub struct Percent(u32);

impl Percent {
    pub fn from_hundredths(hundredths: u32) -> Self {
        Percent(hundredths)
    }

    /// `count / total` as a percentage, rounded half up to two decimals.
    pub fn of(count: u64, total: u64) -> Self {
        let scaled = u128::from(count) * 10_000;
        let total = u128::from(total);
        Percent(((2 * scaled + total) / (2 * total)) as u32)
    }

    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Percent {
    /// Prints like a rounded number would: `70%`, `12.5%`, `33.33%`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (whole, frac) = (self.0 / 100, self.0 % 100);
        match frac {
            0 => write!(f, "{}%", whole),
            n if n % 10 == 0 => write!(f, "{}.{}%", whole, n / 10),
            n => write!(f, "{}.{:02}%", whole, n),
        }
    }
}

/// The odds shown for one seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct SeatOdds {
    pub seat: SeatId,
    pub win: Percent,
    pub loss: Percent,
    pub tie: Percent,
}

#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
pub enum CountsError {
    #[snafu(display("expected loss and win counts, got {len} values"))]
    TooFewCounts { len: usize },
    #[snafu(display("outcome counts sum to zero"))]
    EmptySample,
    #[snafu(display("outcome counts are too large to add up"))]
    Overflow,
}

impl SeatOdds {
    /// Derive odds from `[loss, win, ties...]`; every count adds to the total.
    pub fn from_counts(seat: SeatId, counts: &[u64]) -> Result<Self, CountsError> {
        ensure!(counts.len() >= 2, TooFewCountsSnafu { len: counts.len() });
        let total = counts
            .iter()
            .try_fold(0u64, |total, &c| total.checked_add(c))
            .context(OverflowSnafu)?;
        ensure!(total > 0, EmptySampleSnafu);
        let (loss, win) = (counts[0], counts[1]);
        Ok(SeatOdds {
            seat,
            win: Percent::of(win, total),
            loss: Percent::of(loss, total),
            tie: Percent::of(total - loss - win, total),
        })
    }
}

impl fmt::Display for SeatOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: win {} / tie {} / loss {}",
            self.seat, self.win, self.tie, self.loss
        )
    }
}
