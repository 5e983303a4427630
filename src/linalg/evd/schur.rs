//! Complex Schur form of an upper Hessenberg matrix, by single-shift QR iteration.

use crate::{
    c64,
    linalg::jacobi::{col_pair_mut, ComplexRotation},
    utils::{norm_l2, thread::for_each_col_mut},
    LinalgError, Parallelism, Result,
};
use num_traits::Zero;

/// Number of sweeps without deflation after which an exceptional shift is used.
const NON_CONVERGENCE_LIMIT: usize = 10;

#[inline]
fn abs1(z: c64) -> f64 {
    z.re.abs() + z.im.abs()
}

/// Eigenvalues of the 2×2 matrix `[[a00, a01], [a10, a11]]`.
fn eig22(a00: c64, a01: c64, a10: c64, a11: c64) -> (c64, c64) {
    let s = abs1(a00) + abs1(a01) + abs1(a10) + abs1(a11);
    if s == 0.0 {
        return (c64::zero(), c64::zero());
    }

    let s_inv = s.recip();
    let (a00, a01, a10, a11) = (a00 * s_inv, a01 * s_inv, a10 * s_inv, a11 * s_inv);

    let tr = (a00 + a11) * 0.5;
    let det = (a00 - tr) * (a00 - tr) + a01 * a10;
    let rtdisc = det.sqrt();
    ((tr + rtdisc) * s, (tr - rtdisc) * s)
}

/// Reduces the `n × n` upper Hessenberg matrix `h` to upper triangular Schur form `T` in place,
/// accumulating the transformations on the right of `z`.
///
/// If `A = Z·H·Z^H` on entry, then `A = Z·T·Z^H` on exit. The eigenvalues, in the order in which
/// they appear on the diagonal of `T`, are written to `w`.
pub fn compute_schur(h: &mut [c64], n: usize, z: &mut [c64], w: &mut [c64]) -> Result<()> {
    equator::assert!(all(h.len() == n * n, z.len() == n * n, w.len() == n));
    if n == 0 {
        return Ok(());
    }

    let at = |i: usize, j: usize| j * n + i;

    let eps = f64::EPSILON;
    let smlnum = f64::MIN_POSITIVE / eps;
    let itmax = 30 * Ord::max(10, n) * n;

    let mut k_defl = 0usize;
    let mut istop = n;
    let mut istart = 0;

    for iter in 0..=itmax {
        if iter == itmax {
            log::warn!(
                target: "fallback_linalg",
                "evd: Schur iteration did not converge after {iter} sweeps, {istop} eigenvalue(s) left"
            );
            return Err(LinalgError::NoConvergence { iterations: iter });
        }

        if istart + 1 >= istop {
            if istart + 1 == istop {
                w[istart] = h[at(istart, istart)];
            }
            break;
        }

        for i in (istart + 1..istop).rev() {
            let sub = abs1(h[at(i, i - 1)]);
            if sub < smlnum {
                h[at(i, i - 1)] = c64::zero();
                istart = i;
                break;
            }

            let mut tst = abs1(h[at(i - 1, i - 1)]) + abs1(h[at(i, i)]);
            if tst == 0.0 {
                if i >= 2 {
                    tst += abs1(h[at(i - 1, i - 2)]);
                }
                if i + 1 < n {
                    tst += abs1(h[at(i + 1, i)]);
                }
            }
            if sub <= eps * tst {
                h[at(i, i - 1)] = c64::zero();
                istart = i;
                break;
            }
        }

        if istart + 1 >= istop {
            k_defl = 0;
            w[istart] = h[at(istart, istart)];
            istop = istart;
            istart = 0;
            continue;
        }

        k_defl += 1;
        let (a00, a01, a10, a11) = if k_defl % NON_CONVERGENCE_LIMIT == 0 {
            // exceptional shift
            let mut s = h[at(istop - 1, istop - 2)].norm();
            if istop > 2 {
                s += h[at(istop - 2, istop - 3)].norm();
            }
            let a00 = h[at(istop - 1, istop - 1)] + 0.75 * s;
            (a00, c64::new(s, 0.0), c64::new(-0.4375 * s, 0.0), a00)
        } else {
            // Wilkinson shift
            (
                h[at(istop - 2, istop - 2)],
                h[at(istop - 2, istop - 1)],
                h[at(istop - 1, istop - 2)],
                h[at(istop - 1, istop - 1)],
            )
        };

        let (mut shift, other) = eig22(a00, a01, a10, a11);
        let last = h[at(istop - 1, istop - 1)];
        if abs1(shift - last) > abs1(other - last) {
            shift = other;
        }

        // chase the bulge down the active block
        for i in istart..istop - 1 {
            let rot = if i == istart {
                ComplexRotation::make(h[at(i, i)] - shift, h[at(i + 1, i)]).0
            } else {
                let (rot, r) = ComplexRotation::make(h[at(i, i - 1)], h[at(i + 1, i - 1)]);
                h[at(i, i - 1)] = r;
                h[at(i + 1, i - 1)] = c64::zero();
                rot
            };

            for j in i..n {
                let (x, y) = rot.apply_on_the_left(h[at(i, j)], h[at(i + 1, j)]);
                h[at(i, j)] = x;
                h[at(i + 1, j)] = y;
            }

            let rows = Ord::min(i + 3, istop);
            let (x, y) = col_pair_mut(h, n, i, i + 1);
            rot.apply_adjoint_on_the_right_in_place(&mut x[..rows], &mut y[..rows]);

            let (x, y) = col_pair_mut(z, n, i, i + 1);
            rot.apply_adjoint_on_the_right_in_place(x, y);
        }
    }

    Ok(())
}

/// Computes the eigenvectors `Z·X` from the upper triangular Schur factor `t` and the Schur
/// vectors `z`, where the columns of `X` are the eigenvectors of `T`.
///
/// Each column is normalized to unit Euclidean norm.
pub fn compute_eigenvectors(
    t: &[c64],
    z: &[c64],
    n: usize,
    vectors: &mut [c64],
    parallelism: Parallelism,
) {
    equator::assert!(all(t.len() == n * n, z.len() == n * n, vectors.len() == n * n));
    let eps = f64::EPSILON;
    let smlnum = f64::MIN_POSITIVE * (n as f64 / eps);

    for_each_col_mut(
        vectors,
        n,
        |k, v| {
            let lambda = t[k * n + k];
            let smin = f64::max(eps * abs1(lambda), smlnum);

            let mut x = vec![c64::zero(); k + 1];
            x[k] = c64::new(1.0, 0.0);
            for i in (0..k).rev() {
                let sum: c64 = (i + 1..=k).map(|j| t[j * n + i] * x[j]).sum();
                let mut denom = t[i * n + i] - lambda;
                if abs1(denom) < smin {
                    denom = c64::new(smin, 0.0);
                }
                x[i] = -sum / denom;
            }

            v.fill(c64::zero());
            for (j, x) in x.iter().enumerate() {
                for (v, z) in v.iter_mut().zip(&z[j * n..(j + 1) * n]) {
                    *v += z * x;
                }
            }

            let norm = norm_l2(v);
            if norm > 0.0 {
                let inv = norm.recip();
                for v in v.iter_mut() {
                    *v *= inv;
                }
            }
        },
        parallelism,
    );
}
