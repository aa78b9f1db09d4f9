//! Training ramp-up curves.
//!
//! Maps (training week, total training weeks) to the fraction of
//! full output a new crew delivers that week.

/// Curve for training periods of four weeks or longer.
const LONG_CURVE: [f64; 5] = [0.10, 0.30, 0.60, 0.90, 1.0];
const THREE_WEEK_CURVE: [f64; 3] = [0.25, 0.65, 1.0];
const TWO_WEEK_CURVE: [f64; 2] = [0.50, 1.0];

/// Productivity fraction in `[0.0, 1.0]` for a crew in its
/// `training_week` (1-based) of a `total_weeks` training period.
///
/// Callers coerce `training_week` to at least 1.
pub fn ramp_fraction(training_week: u32, total_weeks: u32) -> f64 {
    if total_weeks == 0 || training_week > total_weeks {
        return 1.0;
    }
    let week = training_week.max(1) as usize;
    match total_weeks {
        t if t >= 4 => LONG_CURVE[week.min(LONG_CURVE.len()) - 1],
        3 => THREE_WEEK_CURVE[week - 1],
        2 => TWO_WEEK_CURVE[week - 1],
        t => (training_week as f64 / t as f64 * 0.9 + 0.1).min(1.0),
    }
}
