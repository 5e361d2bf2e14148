//! Unit conversions applied once at the input boundary.
//! Everything past the boundary is meters, seconds, kilograms and newtons.

pub const GRAVITY: f64 = 9.81;

/// Highest commercial speed on the network, used when no rolling stock is known.
pub const DEFAULT_MAX_SPEED_KMH: f64 = 320.0;

pub fn kmh_to_ms(speed: f64) -> f64 {
    speed / 3.6
}

pub fn ms_to_kmh(speed: f64) -> f64 {
    speed * 3.6
}

/// Slope angle from a grade given in meters per kilometer.
pub fn grade_angle(grade: f64) -> f64 {
    (grade / 1000.0).atan()
}
