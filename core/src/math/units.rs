use std::f64::consts::PI;

/// Arcminutes to radians.
pub const M2R: f64 = PI / 180.0 / 60.0;
/// Radians to arcminutes.
pub const R2M: f64 = 180.0 / PI * 60.0;

pub fn radians_from_minutes(minutes: f64) -> f64 {
    minutes * M2R
}

pub fn minutes_from_radians(radians: f64) -> f64 {
    radians * R2M
}

/// IAGA `DECBAS` headers carry the declination baseline in tenths of arcminutes.
pub fn radians_from_deci_arcminutes(deci_arcminutes: f64) -> f64 {
    radians_from_minutes(deci_arcminutes / 10.0)
}

pub fn deci_arcminutes_from_radians(radians: f64) -> f64 {
    minutes_from_radians(radians) * 10.0
}
