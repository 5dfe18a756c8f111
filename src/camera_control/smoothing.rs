//! First-order exponential smoothing of integer settings.

/// Default fraction of the gap closed per frame for white balance.
pub const DEFAULT_STEP: f64 = 0.05;

/// Moves `current` a fraction `step` of the way toward `target` and rounds to
/// the nearest integer. `step` is expected in `(0, 1]`; `1.0` jumps straight
/// to the target.
///
/// Once the remaining gap is small enough that `step · gap` rounds to zero the
/// value stays put, so the filter settles within `0.5 / step` of the target
/// instead of creeping toward it one unit per frame.
pub fn smooth(current: i32, target: i32, step: f64) -> i32 {
    if current == target {
        return current;
    }
    let next = f64::from(current) + step * (f64::from(target) - f64::from(current));
    next.round() as i32
}
