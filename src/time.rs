//! Units of the logical clock. One unit of simulated time is one day; the
//! clock has no relation to wall-clock time.

pub const DAY: f64 = 1.0;
pub const HOUR: f64 = DAY / 24.0;
pub const MINUTE: f64 = DAY / (24.0 * 60.0);
pub const SECOND: f64 = DAY / (24.0 * 60.0 * 60.0);
pub const WEEK: f64 = DAY * 7.0;

/// Returns the earliest time `>= now` that falls at `time_of_day` (a fraction
/// of a day) on some day.
///
/// Recurring daily behaviors registered at setup use this so that an entity
/// created after the simulation has started picks up its cycle on the next
/// occurrence instead of in the past.
#[must_use]
pub fn next_time_of_day(now: f64, time_of_day: f64) -> f64 {
    let day_start = (now / DAY).floor() * DAY;
    let candidate = day_start + time_of_day;
    if candidate >= now {
        candidate
    } else {
        candidate + DAY
    }
}
