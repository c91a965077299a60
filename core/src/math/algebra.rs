//! Scalar relations between the geographic (X, Y), magnetic (H, D) and
//! observatory (H, E or H, D) frames.
//!
//! All angles are radians. The declination baseline is the fixed angle between
//! the observatory sensor's H axis and magnetic north.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelAlgebra {
    declination_baseline: f64,
}

impl ChannelAlgebra {
    pub fn new(declination_baseline: f64) -> Self {
        Self {
            declination_baseline,
        }
    }

    pub fn declination_baseline(&self) -> f64 {
        self.declination_baseline
    }

    pub fn magnetic_horizontal_from_observatory(h: f64, e: f64) -> f64 {
        h.hypot(e)
    }

    pub fn magnetic_declination_from_observatory(&self, h: f64, e: f64) -> f64 {
        self.declination_baseline + Self::observatory_declination_from_observatory(h, e)
    }

    pub fn geographic_x_from_magnetic(h: f64, d: f64) -> f64 {
        h * d.cos()
    }

    pub fn geographic_y_from_magnetic(h: f64, d: f64) -> f64 {
        h * d.sin()
    }

    pub fn magnetic_horizontal_from_geographic(x: f64, y: f64) -> f64 {
        x.hypot(y)
    }

    pub fn magnetic_declination_from_geographic(x: f64, y: f64) -> f64 {
        y.atan2(x)
    }

    pub fn observatory_declination_from_magnetic(&self, d: f64) -> f64 {
        d - self.declination_baseline
    }

    pub fn observatory_horizontal_from_magnetic(&self, h: f64, d: f64) -> f64 {
        h * self.observatory_declination_from_magnetic(d).cos()
    }

    pub fn observatory_e_from_magnetic(&self, h: f64, d: f64) -> f64 {
        h * self.observatory_declination_from_magnetic(d).sin()
    }

    /// E from observatory H and the observatory declination angle.
    pub fn observatory_e_from_observatory(h: f64, d_obs: f64) -> f64 {
        h * d_obs.tan()
    }

    /// `atan2(0, 0)` is 0, so a zero vector has zero declination.
    pub fn observatory_declination_from_observatory(h: f64, e: f64) -> f64 {
        e.atan2(h)
    }

    /// (H, D) in the magnetic frame from observatory (H, E).
    pub fn magnetic_from_observatory(&self, h: f64, e: f64) -> (f64, f64) {
        (
            Self::magnetic_horizontal_from_observatory(h, e),
            self.magnetic_declination_from_observatory(h, e),
        )
    }

    /// (X, Y) from magnetic (H, D).
    pub fn geographic_from_magnetic(h: f64, d: f64) -> (f64, f64) {
        (
            Self::geographic_x_from_magnetic(h, d),
            Self::geographic_y_from_magnetic(h, d),
        )
    }

    /// (H, D) in the magnetic frame from geographic (X, Y).
    pub fn magnetic_from_geographic(x: f64, y: f64) -> (f64, f64) {
        (
            Self::magnetic_horizontal_from_geographic(x, y),
            Self::magnetic_declination_from_geographic(x, y),
        )
    }

    /// Observatory (H, E) from magnetic (H, D).
    pub fn observatory_from_magnetic(&self, h: f64, d: f64) -> (f64, f64) {
        (
            self.observatory_horizontal_from_magnetic(h, d),
            self.observatory_e_from_magnetic(h, d),
        )
    }

    pub fn geographic_from_observatory(&self, h: f64, e: f64) -> (f64, f64) {
        let (mag_h, mag_d) = self.magnetic_from_observatory(h, e);
        Self::geographic_from_magnetic(mag_h, mag_d)
    }

    pub fn observatory_from_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        let (mag_h, mag_d) = Self::magnetic_from_geographic(x, y);
        self.observatory_from_magnetic(mag_h, mag_d)
    }

    /// Vector total field from any orthogonal triple (X, Y, Z or H, E, Z).
    pub fn computed_f(x: f64, y: f64, z: f64) -> f64 {
        (x * x + y * y + z * z).sqrt()
    }

    /// Difference between the vector-computed and the measured scalar field.
    pub fn delta_f(f_vector: f64, f_scalar: f64) -> f64 {
        f_vector - f_scalar
    }
}
