//! Clinical measurements derived from a fitted head ellipse
//!
//! BPD and OFD are the full major and minor axes scaled by the pixel size.
//! HC uses the first-order perimeter approximation pi * (BPD + OFD) / 2 and
//! gestational age comes from a quadratic regression on HC in centimetres.

use crate::io::configuration::{
    DAYS_PER_WEEK, DEFAULT_PIXEL_SIZE_MM, GA_INTERCEPT_DAYS, GA_LINEAR_COEFFICIENT,
    GA_QUADRATIC_COEFFICIENT,
};
use crate::math::ellipse::Ellipse;
use std::fmt;

/// Gestational age split into whole weeks and remaining days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestationalAge {
    /// Completed weeks
    pub weeks: u32,
    /// Remaining days, rounded half to even
    pub days: u32,
}

impl GestationalAge {
    /// Split a day count into weeks and rounded remaining days
    ///
    /// Weeks use floor division; the remainder is rounded half to even, so
    /// a remainder of 6.5 or more reports as 7 days without carrying.
    pub fn from_days(total_days: f64) -> Self {
        if !total_days.is_finite() || total_days <= 0.0 {
            return Self::default();
        }
        let weeks = (total_days / DAYS_PER_WEEK).floor();
        let days = (total_days % DAYS_PER_WEEK).round_ties_even();
        Self {
            weeks: weeks as u32,
            days: days as u32,
        }
    }
}

impl fmt::Display for GestationalAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}w {}d", self.weeks, self.days)
    }
}

/// Head measurements in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Biometry {
    /// Head circumference
    pub hc_mm: f64,
    /// Biparietal diameter
    pub bpd_mm: f64,
    /// Occipito-frontal diameter
    pub ofd_mm: f64,
    /// Gestational age estimated from HC
    pub gestational_age: GestationalAge,
}

/// Parse pixel-size text typed by the user or taken from calibration
///
/// Accepts only `digits` or `digits.digits`; anything else, including the
/// empty string, yields [`DEFAULT_PIXEL_SIZE_MM`].
pub fn parse_pixel_size(text: &str) -> f64 {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    let well_formed = match text.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(text),
    };

    if well_formed {
        text.parse().unwrap_or(DEFAULT_PIXEL_SIZE_MM)
    } else {
        DEFAULT_PIXEL_SIZE_MM
    }
}

/// Gestational age in days from head circumference in millimetres
pub fn gestational_age_days(hc_mm: f64) -> f64 {
    let hc_cm = hc_mm / 10.0;
    GA_QUADRATIC_COEFFICIENT.mul_add(hc_cm * hc_cm, GA_LINEAR_COEFFICIENT * hc_cm)
        + GA_INTERCEPT_DAYS
}

/// Pixel size the measurements are computed with
///
/// Negative and non-finite values, such as an overlong digit string parsed
/// to infinity, fall back to [`DEFAULT_PIXEL_SIZE_MM`].
pub fn effective_pixel_size(pixel_size_mm: f64) -> f64 {
    if pixel_size_mm.is_finite() && pixel_size_mm >= 0.0 {
        pixel_size_mm
    } else {
        DEFAULT_PIXEL_SIZE_MM
    }
}

/// Derive all measurements from a fitted ellipse
///
/// The pixel size goes through [`effective_pixel_size`] first. A pixel size
/// of exactly zero yields zero-length diameters and a zero gestational age
/// rather than a regression evaluated at HC = 0.
pub fn measure(ellipse: &Ellipse, pixel_size_mm: f64) -> Biometry {
    let pixel_size = effective_pixel_size(pixel_size_mm);

    let bpd_mm = 2.0 * ellipse.semi_major * pixel_size;
    let ofd_mm = 2.0 * ellipse.semi_minor * pixel_size;
    let hc_mm = std::f64::consts::PI * (bpd_mm + ofd_mm) / 2.0;

    let gestational_age = if pixel_size == 0.0 {
        GestationalAge::default()
    } else {
        GestationalAge::from_days(gestational_age_days(hc_mm))
    };

    Biometry {
        hc_mm,
        bpd_mm,
        ofd_mm,
        gestational_age,
    }
}
