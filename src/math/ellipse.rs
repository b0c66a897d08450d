//! Direct least-squares ellipse fitting (Fitzgibbon, numerically stable form
//! of Halir and Flusser)
//!
//! Points are centred and scaled before building the scatter matrices; the
//! 6x6 constrained problem is reduced to a 3x3 eigenproblem whose single
//! elliptical eigenvector gives the quadratic part of the conic.

use crate::io::configuration::MIN_FIT_POINTS;
use crate::io::error::{BiometryError, Result};
use nalgebra::{DMatrix, Matrix2, Matrix3, Vector3};

/// Geometric ellipse in image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Centre as (x, y) in pixels
    pub center: [f64; 2],
    /// Semi-major axis length in pixels
    pub semi_major: f64,
    /// Semi-minor axis length in pixels
    pub semi_minor: f64,
    /// Rotation of the major axis from the +x axis, degrees in [0, 180)
    pub angle_deg: f64,
}

impl Ellipse {
    /// Sample `n` points evenly in parameter space along the outline
    pub fn sample_points(&self, n: usize) -> Vec<[f64; 2]> {
        let theta = self.angle_deg.to_radians();
        let (sin_t, cos_t) = theta.sin_cos();
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                let (sin_p, cos_p) = t.sin_cos();
                let u = self.semi_major * cos_p;
                let v = self.semi_minor * sin_p;
                [
                    self.center[0] + u * cos_t - v * sin_t,
                    self.center[1] + u * sin_t + v * cos_t,
                ]
            })
            .collect()
    }

    /// Copy with both semi-axes grown by `delta` pixels
    pub fn inflated(&self, delta: f64) -> Self {
        Self {
            semi_major: (self.semi_major + delta).max(0.0),
            semi_minor: (self.semi_minor + delta).max(0.0),
            ..*self
        }
    }
}

/// Fit an ellipse to contour points
///
/// # Errors
///
/// Returns [`BiometryError::EllipseFit`] when fewer than
/// [`MIN_FIT_POINTS`] points are given, when the points are collinear or
/// otherwise degenerate, or when the best conic is not an ellipse.
pub fn fit_ellipse(points: &[[f64; 2]]) -> Result<Ellipse> {
    let n = points.len();
    let fail = |reason: &str| BiometryError::EllipseFit {
        points: n,
        reason: reason.to_string(),
    };

    if n < MIN_FIT_POINTS {
        return Err(fail("too few points"));
    }

    let (mean_x, mean_y, scale) = normalization_params(points);

    // Quadratic and linear halves of the design matrix
    let mut d1 = DMatrix::<f64>::zeros(n, 3);
    let mut d2 = DMatrix::<f64>::zeros(n, 3);
    for (i, &[px, py]) in points.iter().enumerate() {
        let x = (px - mean_x) * scale;
        let y = (py - mean_y) * scale;
        d1[(i, 0)] = x * x;
        d1[(i, 1)] = x * y;
        d1[(i, 2)] = y * y;
        d2[(i, 0)] = x;
        d2[(i, 1)] = y;
        d2[(i, 2)] = 1.0;
    }

    let s1: Matrix3<f64> = (d1.transpose() * &d1).fixed_view::<3, 3>(0, 0).into_owned();
    let s2: Matrix3<f64> = (d1.transpose() * &d2).fixed_view::<3, 3>(0, 0).into_owned();
    let s3: Matrix3<f64> = (d2.transpose() * &d2).fixed_view::<3, 3>(0, 0).into_owned();

    // Normalised coordinates keep S3 entries on the order of n
    if s3.determinant().abs() < 1e-9 * (n as f64).powi(3) {
        return Err(fail("points are collinear"));
    }
    let s3_inv = s3
        .try_inverse()
        .ok_or_else(|| fail("points are collinear"))?;
    let t = -s3_inv * s2.transpose();
    let reduced = s1 + s2 * t;

    // Premultiply by the inverse of the constraint matrix [[0,0,2],[0,-1,0],[2,0,0]]
    let system = Matrix3::new(
        reduced[(2, 0)] / 2.0,
        reduced[(2, 1)] / 2.0,
        reduced[(2, 2)] / 2.0,
        -reduced[(1, 0)],
        -reduced[(1, 1)],
        -reduced[(1, 2)],
        reduced[(0, 0)] / 2.0,
        reduced[(0, 1)] / 2.0,
        reduced[(0, 2)] / 2.0,
    );

    let a1 = elliptical_eigenvector(&system).ok_or_else(|| fail("no elliptical solution"))?;
    let a2 = t * a1;

    let coeffs = denormalize_conic(
        [a1[0], a1[1], a1[2], a2[0], a2[1], a2[2]],
        mean_x,
        mean_y,
        scale,
    );

    conic_to_ellipse(coeffs).ok_or_else(|| fail("conic is not a proper ellipse"))
}

/// Centroid and isotropic scale that bring the mean distance to sqrt(2)
fn normalization_params(points: &[[f64; 2]]) -> (f64, f64, f64) {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let mean_dist = points
        .iter()
        .map(|p| (p[0] - mean_x).hypot(p[1] - mean_y))
        .sum::<f64>()
        / n;

    let scale = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    (mean_x, mean_y, scale)
}

/// Eigenvector of the reduced system that satisfies 4ac - b^2 > 0
fn elliptical_eigenvector(system: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let trace = system.trace();
    let minor_sum = system[(0, 0)] * system[(1, 1)] - system[(0, 1)] * system[(1, 0)]
        + system[(0, 0)] * system[(2, 2)]
        - system[(0, 2)] * system[(2, 0)]
        + system[(1, 1)] * system[(2, 2)]
        - system[(1, 2)] * system[(2, 1)];
    let det = system.determinant();

    let mut best: Option<(f64, Vector3<f64>)> = None;
    for eigenvalue in real_cubic_roots(-trace, minor_sum, -det) {
        let shifted = system - Matrix3::identity() * eigenvalue;
        let Some(v) = null_vector(&shifted) else {
            continue;
        };
        let constraint = 4.0 * v[0] * v[2] - v[1] * v[1];
        if constraint > 0.0 && best.is_none_or(|(value, _)| eigenvalue.abs() < value) {
            best = Some((eigenvalue.abs(), v));
        }
    }

    best.map(|(_, v)| v)
}

/// Largest row of the adjugate, proportional to the null vector of a rank-2 matrix
fn null_vector(m: &Matrix3<f64>) -> Option<Vector3<f64>> {
    let rows = [m.row(0).transpose(), m.row(1).transpose(), m.row(2).transpose()];
    let candidates = [
        rows[1].cross(&rows[2]),
        rows[2].cross(&rows[0]),
        rows[0].cross(&rows[1]),
    ];

    let best = candidates
        .iter()
        .max_by(|a, b| a.norm_squared().total_cmp(&b.norm_squared()))?;
    let norm = best.norm();
    (norm > 1e-15).then(|| best / norm)
}

/// Real roots of x^3 + b x^2 + c x + d = 0
fn real_cubic_roots(b: f64, c: f64, d: f64) -> Vec<f64> {
    // Depressed cubic t^3 + p t + q with x = t - b/3
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let shift = -b / 3.0;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    if disc > 0.0 {
        let sqrt_disc = disc.sqrt();
        let u = (-q / 2.0 + sqrt_disc).cbrt();
        let v = (-q / 2.0 - sqrt_disc).cbrt();
        vec![u + v + shift]
    } else if p.abs() < 1e-300 {
        vec![shift]
    } else {
        let r = (-p / 3.0).sqrt();
        let cos_arg = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
        let phi = cos_arg.acos() / 3.0;
        (0..3)
            .map(|k| {
                2.0 * r * (phi - std::f64::consts::TAU * f64::from(k) / 3.0).cos() + shift
            })
            .collect()
    }
}

/// Map conic coefficients from normalised coordinates back to pixels
///
/// With x' = s(x - mx) and y' = s(y - my) substituted into
/// A'x'^2 + B'x'y' + C'y'^2 + D'x' + E'y' + F' = 0.
fn denormalize_conic(c: [f64; 6], mx: f64, my: f64, s: f64) -> [f64; 6] {
    let [a_, b_, c_, d_, e_, f_] = c;
    let s2 = s * s;

    let a = a_ * s2;
    let b = b_ * s2;
    let c = c_ * s2;
    let d = -2.0 * a_ * s2 * mx - b_ * s2 * my + d_ * s;
    let e = -b_ * s2 * mx - 2.0 * c_ * s2 * my + e_ * s;
    let f =
        a_ * s2 * mx * mx + b_ * s2 * mx * my + c_ * s2 * my * my - d_ * s * mx - e_ * s * my + f_;

    [a, b, c, d, e, f]
}

/// Convert A x^2 + B xy + C y^2 + D x + E y + F = 0 into geometric form
fn conic_to_ellipse(coeffs: [f64; 6]) -> Option<Ellipse> {
    let [a, b, c, d, e, f] = coeffs;

    let denom = 4.0 * a * c - b * b;
    if denom <= 0.0 {
        return None;
    }

    let cx = (b * e - 2.0 * c * d) / denom;
    let cy = (b * d - 2.0 * a * e) / denom;

    // Conic value at the centre
    let f_center = a * cx * cx + b * cx * cy + c * cy * cy + d * cx + e * cy + f;
    if f_center.abs() < 1e-300 {
        return None;
    }

    let quadratic = Matrix2::new(a, b / 2.0, b / 2.0, c);
    let eigen = quadratic.symmetric_eigen();
    let (l0, l1) = (eigen.eigenvalues[0], eigen.eigenvalues[1]);

    let sq0 = -f_center / l0;
    let sq1 = -f_center / l1;
    if !(sq0 > 0.0 && sq1 > 0.0) {
        return None;
    }

    // The major axis follows the eigenvector of the smaller eigenvalue magnitude
    let (semi_major, semi_minor, axis) = if sq0 >= sq1 {
        (sq0.sqrt(), sq1.sqrt(), eigen.eigenvectors.column(0).into_owned())
    } else {
        (sq1.sqrt(), sq0.sqrt(), eigen.eigenvectors.column(1).into_owned())
    };

    let angle_deg = axis[1].atan2(axis[0]).to_degrees().rem_euclid(180.0);

    Some(Ellipse {
        center: [cx, cy],
        semi_major,
        semi_minor,
        angle_deg,
    })
}
