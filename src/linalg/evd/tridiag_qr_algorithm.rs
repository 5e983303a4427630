// Algorithm ported from Eigen, a lightweight C++ template library
// for linear algebra.
//
// Copyright (C) 2008-2010 Gael Guennebaud <gael.guennebaud@inria.fr>
// Copyright (C) 2010 Jitse Niesen <jitse@maths.leeds.ac.uk>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    c64,
    linalg::jacobi::{col_pair_mut, JacobiRotation},
    LinalgError, Result,
};

/// Diagonalizes the real symmetric tridiagonal matrix with diagonal `diag` and subdiagonal
/// `offdiag` using implicit Wilkinson-shifted QR sweeps.
///
/// On success, `diag` holds the eigenvalues in ascending order. The rotations are applied on the
/// right of the `n × n` matrix `u`, so passing the transformation that produced the tridiagonal
/// matrix yields the eigenvectors of the original matrix directly.
pub fn compute_tridiag_real_evd_qr_algorithm(
    diag: &mut [f64],
    offdiag: &mut [f64],
    u: Option<&mut [c64]>,
    epsilon: f64,
    consider_zero_threshold: f64,
) -> Result<()> {
    let n = diag.len();
    if n <= 1 {
        return Ok(());
    }
    equator::assert!(offdiag.len() == n - 1);

    let mut end = n - 1;
    let mut start = 0;

    let nbits = core::mem::size_of::<f64>() * 8;
    let max_iter = n.saturating_mul(Ord::max(30, nbits / 2));
    let mut iter = 0;

    let mut u = u;

    while end > 0 {
        for i in start..end {
            if offdiag[i].abs() < consider_zero_threshold
                || offdiag[i].abs() <= epsilon * (diag[i].abs() * diag[i + 1].abs()).sqrt()
            {
                offdiag[i] = 0.0;
            }
        }

        while end > 0 && offdiag[end - 1] == 0.0 {
            end -= 1;
        }

        if end == 0 {
            break;
        }

        iter += 1;
        if iter >= max_iter {
            log::warn!(
                target: "fallback_linalg",
                "evd: tridiagonal QR did not converge after {iter} sweeps"
            );
            return Err(LinalgError::NoConvergence { iterations: iter });
        }

        start = end - 1;
        while start > 0 && offdiag[start - 1] != 0.0 {
            start -= 1;
        }

        // Wilkinson shift
        let td = (diag[end - 1] - diag[end]) * 0.5;
        let e = offdiag[end - 1];

        let mut mu = diag[end];
        if td == 0.0 {
            mu -= e.abs();
        } else if e != 0.0 {
            let e2 = e * e;
            let h = td.hypot(e);
            let h = if td > 0.0 { h } else { -h };
            if e2 == 0.0 {
                mu -= e / ((td + h) / e);
            } else {
                mu -= e2 / (td + h);
            }
        }

        let mut x = diag[start] - mu;
        let mut z = offdiag[start];

        let mut k = start;
        while k < end && z != 0.0 {
            let JacobiRotation { c, s } = JacobiRotation::make_givens(x, z);

            // T = G^T T G
            let sdk = s * diag[k] + c * offdiag[k];
            let dkp1 = s * offdiag[k] + c * diag[k + 1];

            diag[k] = c * (c * diag[k] - s * offdiag[k]) - s * (c * offdiag[k] - s * diag[k + 1]);
            diag[k + 1] = s * sdk + c * dkp1;
            offdiag[k] = c * sdk - s * dkp1;

            if k > start {
                offdiag[k - 1] = c * offdiag[k - 1] - s * z;
            }

            x = offdiag[k];
            if k < end - 1 {
                z = -s * offdiag[k + 1];
                offdiag[k + 1] *= c;
            }

            // Q = Q G
            if let Some(u) = u.as_deref_mut() {
                let (x, y) = col_pair_mut(u, n, k, k + 1);
                JacobiRotation { c, s }.apply_on_the_right_in_place(x, y);
            }
            k += 1;
        }
    }

    for i in 0..n - 1 {
        let mut min_idx = i;
        let mut min_val = diag[i];

        for (k, diag) in diag[i + 1..n].iter().enumerate() {
            let k = k + i + 1;
            if *diag < min_val {
                min_idx = k;
                min_val = *diag;
            }
        }
        if min_idx > i {
            diag.swap(i, min_idx);
            if let Some(u) = u.as_deref_mut() {
                let (x, y) = col_pair_mut(u, n, i, min_idx);
                x.swap_with_slice(y);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use assert_approx_eq::assert_approx_eq;
    use num_traits::Zero;

    #[track_caller]
    fn test_evd(diag: &[f64], offdiag: &[f64]) {
        let n = diag.len();
        let mut u = identity(n);

        let mut s = diag.to_vec();
        let mut e = offdiag.to_vec();
        compute_tridiag_real_evd_qr_algorithm(
            &mut s,
            &mut e,
            Some(&mut u),
            f64::EPSILON,
            f64::MIN_POSITIVE,
        )
        .unwrap();

        for i in 1..n {
            assert!(s[i - 1] <= s[i]);
        }

        let mut sigma = vec![c64::zero(); n * n];
        for i in 0..n {
            sigma[i * n + i] = c64::new(s[i], 0.0);
        }
        let reconstructed = mul(&mul(&u, n, n, &sigma, n), n, n, &adjoint(&u, n, n), n);
        for j in 0..n {
            for i in 0..n {
                let target = if i == j {
                    diag[j]
                } else if i == j + 1 {
                    offdiag[j]
                } else if j == i + 1 {
                    offdiag[i]
                } else {
                    0.0
                };

                assert_approx_eq!(reconstructed[j * n + i].re, target, 1e-13);
                assert_approx_eq!(reconstructed[j * n + i].im, 0.0, 1e-13);
            }
        }
    }

    #[test]
    fn test_evd_2_0() {
        test_evd(&[1.0, 1.0], &[0.0]);
    }

    #[test]
    fn test_evd_2_1() {
        test_evd(&[1.0, 1.0], &[0.5213289]);
    }

    #[test]
    fn test_evd_3() {
        test_evd(&[1.79069356, 1.20930644, 1.0], &[-4.06813537e-01, 0.0]);
    }

    #[test]
    fn test_evd_wilkinson() {
        let diag = [3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0];
        let offdiag = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_glued_wilkinson() {
        let diag = [
            3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0, 3.0, 2.0, 1.0, 0.0, 1.0, 2.0, 3.0,
        ];
        let x = 1e-6;
        let offdiag = [
            1.0, 1.0, 1.0, 1.0, 1.0, 1.0, x, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0,
        ];
        test_evd(&diag, &offdiag);
    }

    #[test]
    fn test_nearly_equal_diagonal() {
        test_evd(&[1.0000000000000002, 1.0000000000000002], &[7.216449660063518e-16]);
    }

    #[test]
    fn nan_does_not_converge() {
        let mut diag = [1.0, f64::NAN, 2.0];
        let mut offdiag = [1.0, 1.0];
        assert!(matches!(
            compute_tridiag_real_evd_qr_algorithm(
                &mut diag,
                &mut offdiag,
                None,
                f64::EPSILON,
                f64::MIN_POSITIVE,
            ),
            Err(LinalgError::NoConvergence { .. })
        ));
    }
}
