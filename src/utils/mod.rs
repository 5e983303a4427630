use crate::c64;
use num_traits::Zero;

pub mod thread;

/// Checks whether `a` and `b` agree to `decimal_places` significant decimal places.
///
/// The comparison is relative to the larger magnitude of the two values. When one of them is
/// (almost) zero, the difference is compared against `10^-decimal_places` directly, so values
/// that both vanish are considered equal. Infinities are only equal to themselves and `NaN` is
/// never equal to anything.
pub fn almost_equal_relative(a: f64, b: f64, decimal_places: i32) -> bool {
    if a.is_infinite() || b.is_infinite() {
        return a == b;
    }
    if a.is_nan() || b.is_nan() {
        return false;
    }

    let max_error = 10.0f64.powi(-decimal_places);
    let diff = (a - b).abs();

    if a.abs() < f64::EPSILON / 2.0 || b.abs() < f64::EPSILON / 2.0 {
        return diff < max_error;
    }
    if (a == 0.0 && b.abs() < max_error) || (b == 0.0 && a.abs() < max_error) {
        return true;
    }
    diff < max_error * a.abs().max(b.abs())
}

/// Returns `z / |z|`, or one if `z` is zero.
#[inline]
pub(crate) fn phase(z: c64) -> c64 {
    let norm = z.norm();
    if norm == 0.0 {
        c64::new(1.0, 0.0)
    } else {
        z / norm
    }
}

/// Overwrites the `n × n` column-major buffer with the identity matrix.
#[inline]
pub(crate) fn set_identity(data: &mut [c64], n: usize) {
    data.fill(c64::zero());
    for i in 0..n {
        data[i * n + i] = c64::new(1.0, 0.0);
    }
}

/// Euclidean norm of a vector, scaled to avoid overflow.
pub(crate) fn norm_l2(x: &[c64]) -> f64 {
    if x.iter().any(|z| z.is_nan()) {
        return f64::NAN;
    }
    let scale = x.iter().fold(0.0f64, |acc, z| acc.max(z.re.abs()).max(z.im.abs()));
    if scale == 0.0 || scale.is_infinite() {
        return scale;
    }
    let sum = x.iter().fold(0.0, |acc, z| acc + (z / scale).norm_sqr());
    scale * sum.sqrt()
}
