//! Time-related types for timeline editing
//!
//! All timeline positions are exact rationals in seconds. Floating point only
//! appears at the view boundary (pixels).

use num_traits::Zero;
use serde::{Deserialize, Serialize};

/// Exact rational time value (seconds)
pub type Rational = num_rational::Rational64;

/// Zero time
pub const TIME_ZERO: Rational = Rational::new_raw(0, 1);

/// Build a rational from numerator/denominator
#[inline]
pub fn rational(numer: i64, denom: i64) -> Rational {
    Rational::new(numer, denom)
}

/// Whole seconds
#[inline]
pub fn seconds(s: i64) -> Rational {
    Rational::from_integer(s)
}

/// Lossy conversion for display and pixel math
#[inline]
pub fn to_seconds_f64(time: Rational) -> f64 {
    *time.numer() as f64 / *time.denom() as f64
}

/// Convert floating seconds to the nearest multiple of `timebase`
pub fn time_from_seconds_f64(secs: f64, timebase: Rational) -> Rational {
    if timebase <= TIME_ZERO {
        return TIME_ZERO;
    }
    let units = (secs / to_seconds_f64(timebase)).round() as i64;
    timebase * units
}

/// Round `time` to the nearest multiple of `timebase`
pub fn snap_time_to_timebase(time: Rational, timebase: Rational) -> Rational {
    if timebase <= TIME_ZERO {
        return time;
    }
    (time / timebase).round() * timebase
}

/// Adjust `movement` so that `start + movement` lands on the timebase grid
pub fn snap_movement_to_timebase(start: Rational, movement: Rational, timebase: Rational) -> Rational {
    snap_time_to_timebase(start + movement, timebase) - start
}

/// Half-open time range `[in, out)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    in_point: Rational,
    out_point: Rational,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(TIME_ZERO, TIME_ZERO)
    }
}

impl TimeRange {
    /// Create a range, swapping the bounds if they are reversed
    pub fn new(in_point: Rational, out_point: Rational) -> Self {
        if out_point < in_point {
            Self {
                in_point: out_point,
                out_point: in_point,
            }
        } else {
            Self {
                in_point,
                out_point,
            }
        }
    }

    #[inline]
    pub fn in_point(&self) -> Rational {
        self.in_point
    }

    #[inline]
    pub fn out_point(&self) -> Rational {
        self.out_point
    }

    #[inline]
    pub fn length(&self) -> Rational {
        self.out_point - self.in_point
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length().is_zero()
    }

    pub fn set_in(&mut self, in_point: Rational) {
        *self = Self::new(in_point, self.out_point);
    }

    pub fn set_out(&mut self, out_point: Rational) {
        *self = Self::new(self.in_point, out_point);
    }

    /// `in <= time < out`
    #[inline]
    pub fn contains(&self, time: Rational) -> bool {
        time >= self.in_point && time < self.out_point
    }

    /// Whether `other` lies entirely within this range
    pub fn contains_range(&self, other: &TimeRange) -> bool {
        other.in_point >= self.in_point && other.out_point <= self.out_point
    }

    /// Strict overlap (touching ranges do not overlap)
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.in_point < other.out_point && other.in_point < self.out_point
    }

    /// Overlapping or sharing an edge
    pub fn touches(&self, other: &TimeRange) -> bool {
        self.in_point <= other.out_point && other.in_point <= self.out_point
    }

    /// Smallest range covering both
    pub fn combined(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(
            self.in_point.min(other.in_point),
            self.out_point.max(other.out_point),
        )
    }

    pub fn intersected(&self, other: &TimeRange) -> Option<TimeRange> {
        let in_point = self.in_point.max(other.in_point);
        let out_point = self.out_point.min(other.out_point);
        if in_point < out_point {
            Some(TimeRange::new(in_point, out_point))
        } else {
            None
        }
    }

    #[inline]
    pub fn shifted(&self, delta: Rational) -> TimeRange {
        TimeRange::new(self.in_point + delta, self.out_point + delta)
    }
}

impl std::ops::Add<Rational> for TimeRange {
    type Output = Self;

    fn add(self, rhs: Rational) -> Self::Output {
        self.shifted(rhs)
    }
}

impl std::ops::Sub<Rational> for TimeRange {
    type Output = Self;

    fn sub(self, rhs: Rational) -> Self::Output {
        self.shifted(-rhs)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.in_point, self.out_point)
    }
}

/// Sorted, non-overlapping set of ranges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeList {
    ranges: Vec<TimeRange>,
}

impl TimeRangeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a range, merging it with anything it touches
    pub fn insert(&mut self, range: TimeRange) {
        if range.is_empty() {
            return;
        }
        let mut merged = range;
        self.ranges.retain(|r| {
            if r.touches(&merged) {
                merged = merged.combined(r);
                false
            } else {
                true
            }
        });
        let pos = self
            .ranges
            .iter()
            .position(|r| r.in_point() > merged.in_point())
            .unwrap_or(self.ranges.len());
        self.ranges.insert(pos, merged);
    }

    /// Subtract a range, splitting any range it cuts through
    pub fn remove(&mut self, range: TimeRange) {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if !r.overlaps(&range) {
                out.push(r);
                continue;
            }
            if r.in_point() < range.in_point() {
                out.push(TimeRange::new(r.in_point(), range.in_point()));
            }
            if r.out_point() > range.out_point() {
                out.push(TimeRange::new(range.out_point(), r.out_point()));
            }
        }
        self.ranges = out;
    }

    pub fn contains(&self, time: Rational) -> bool {
        self.ranges.iter().any(|r| r.contains(time))
    }

    pub fn shift(&mut self, delta: Rational) {
        for r in &mut self.ranges {
            *r = r.shifted(delta);
        }
    }

    /// Move every range's in point by `delta`, dropping ranges that collapse
    pub fn trim_in(&mut self, delta: Rational) {
        let ranges: Vec<TimeRange> = self.ranges.drain(..).collect();
        for r in ranges {
            let in_point = r.in_point() + delta;
            if in_point < r.out_point() {
                self.insert(TimeRange::new(in_point, r.out_point()));
            }
        }
    }

    /// Move every range's out point by `delta`, dropping ranges that collapse
    pub fn trim_out(&mut self, delta: Rational) {
        let ranges: Vec<TimeRange> = self.ranges.drain(..).collect();
        for r in ranges {
            let out_point = r.out_point() + delta;
            if out_point > r.in_point() {
                self.insert(TimeRange::new(r.in_point(), out_point));
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimeRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}
