//! Implicit shift QR iteration on a real upper bidiagonal matrix.

use crate::{
    c64,
    linalg::jacobi::{col_pair_mut, JacobiRotation},
    LinalgError, Result,
};

/// Maximum number of QR sweeps spent on a single singular value.
pub const MAX_ITERATIONS: usize = 1000;

/// Relative tolerance, 15 significant decimal places.
const NEGLIGIBLE_TOLERANCE: f64 = 1e-15;

/// Whether adding an element to `test` leaves it unchanged to within [`NEGLIGIBLE_TOLERANCE`].
///
/// The comparison is purely relative, so scaling the bidiagonal matrix never changes which
/// elements are deflated. `NaN` is never negligible.
#[inline]
fn negligible(ztest: f64, test: f64) -> bool {
    (ztest - test).abs() <= NEGLIGIBLE_TOLERANCE * ztest.abs()
}

/// Multiplies the columns `i` and `j` of a column-major matrix by `rot`, as `x ← c·x + s·y`,
/// `y ← -s·x + c·y` with `x` the column `i`.
#[inline]
fn rotate_cols(data: &mut [c64], col_len: usize, i: usize, j: usize, rot: JacobiRotation) {
    if i < j {
        let (x, y) = col_pair_mut(data, col_len, i, j);
        rot.apply_on_the_left_in_place(x, y);
    } else {
        let (y, x) = col_pair_mut(data, col_len, j, i);
        rot.apply_on_the_left_in_place(x, y);
    }
}

#[inline]
fn swap_cols(data: &mut [c64], col_len: usize, i: usize, j: usize) {
    let (x, y) = col_pair_mut(data, col_len, i, j);
    x.swap_with_slice(y);
}

/// Diagonalizes the bidiagonal matrix with diagonal `s` and superdiagonal `e`.
///
/// On success, `s` holds the singular values in decreasing order. The left and right rotations
/// are accumulated into the columns of `u` (`rows × rows`) and `v` (`cols × cols`) when provided.
pub fn compute_bidiag_svd_qr_iteration(
    s: &mut [f64],
    e: &mut [f64],
    rows: usize,
    cols: usize,
    mut u: Option<&mut [c64]>,
    mut v: Option<&mut [c64]>,
) -> Result<()> {
    let order = s.len();
    equator::assert!(e.len() == order);

    let mut m = order;
    let mut iter = 0;

    while m > 0 {
        if iter >= MAX_ITERATIONS {
            log::warn!(
                target: "fallback_linalg",
                "svd: no convergence after {iter} sweeps, {m} singular value(s) left"
            );
            return Err(LinalgError::NoConvergence { iterations: iter });
        }

        // search for a negligible superdiagonal element, the active block starts right after it
        let mut l = m - 1;
        while l > 0 {
            let test = s[l - 1].abs() + s[l].abs();
            let ztest = test + e[l - 1].abs();
            if negligible(ztest, test) {
                e[l - 1] = 0.0;
                break;
            }
            l -= 1;
        }

        enum Kase {
            DeflateLast,
            Split,
            QrStep,
            Converged,
        }

        let kase;
        if l == m - 1 {
            kase = Kase::Converged;
        } else {
            // search for a negligible diagonal element of the block
            let mut ls = m;
            while ls > l {
                let mut test = 0.0;
                if ls != m {
                    test += e[ls - 1].abs();
                }
                if ls != l + 1 {
                    test += e[ls - 2].abs();
                }
                let ztest = test + s[ls - 1].abs();
                if negligible(ztest, test) {
                    s[ls - 1] = 0.0;
                    break;
                }
                ls -= 1;
            }

            if ls == l {
                kase = Kase::QrStep;
            } else if ls == m {
                kase = Kase::DeflateLast;
            } else {
                kase = Kase::Split;
                l = ls;
            }
        }

        match kase {
            Kase::DeflateLast => {
                let mut f = e[m - 2];
                e[m - 2] = 0.0;
                for k in (l..m - 1).rev() {
                    let (rot, r) = JacobiRotation::rotg(s[k], f);
                    s[k] = r;
                    if k != l {
                        f = -rot.s * e[k - 1];
                        e[k - 1] *= rot.c;
                    }
                    if let Some(v) = v.as_deref_mut() {
                        rotate_cols(v, cols, k, m - 1, rot);
                    }
                }
            }
            Kase::Split => {
                let mut f = e[l - 1];
                e[l - 1] = 0.0;
                for k in l..m {
                    let (rot, r) = JacobiRotation::rotg(s[k], f);
                    s[k] = r;
                    f = -rot.s * e[k];
                    e[k] *= rot.c;
                    if let Some(u) = u.as_deref_mut() {
                        if k < rows {
                            rotate_cols(u, rows, k, l - 1, rot);
                        }
                    }
                }
            }
            Kase::QrStep => {
                let scale = [s[m - 1], s[m - 2], e[m - 2], s[l], e[l]]
                    .iter()
                    .fold(0.0f64, |acc, x| acc.max(x.abs()));
                let sm = s[m - 1] / scale;
                let smm1 = s[m - 2] / scale;
                let emm1 = e[m - 2] / scale;
                let sl = s[l] / scale;
                let el = e[l] / scale;

                let b = ((smm1 + sm) * (smm1 - sm) + emm1 * emm1) / 2.0;
                let c = (sm * emm1) * (sm * emm1);
                let mut shift = 0.0;
                if b != 0.0 || c != 0.0 {
                    shift = (b * b + c).sqrt();
                    if b < 0.0 {
                        shift = -shift;
                    }
                    shift = c / (b + shift);
                }

                // chase the bulge
                let mut f = (sl + sm) * (sl - sm) + shift;
                let mut g = sl * el;
                for k in l..m - 1 {
                    let (rot, r) = JacobiRotation::rotg(f, g);
                    if k != l {
                        e[k - 1] = r;
                    }
                    f = rot.c * s[k] + rot.s * e[k];
                    e[k] = rot.c * e[k] - rot.s * s[k];
                    g = rot.s * s[k + 1];
                    s[k + 1] *= rot.c;
                    if let Some(v) = v.as_deref_mut() {
                        rotate_cols(v, cols, k, k + 1, rot);
                    }

                    let (rot, r) = JacobiRotation::rotg(f, g);
                    s[k] = r;
                    f = rot.c * e[k] + rot.s * s[k + 1];
                    s[k + 1] = -rot.s * e[k] + rot.c * s[k + 1];
                    g = rot.s * e[k + 1];
                    e[k + 1] *= rot.c;
                    if let Some(u) = u.as_deref_mut() {
                        if k + 1 < rows {
                            rotate_cols(u, rows, k, k + 1, rot);
                        }
                    }
                }
                e[m - 2] = f;
                iter += 1;
                log::trace!(
                    target: "fallback_linalg",
                    "svd: sweep {iter} on block {l}..{m}, |e| = {:e}",
                    e[m - 2].abs()
                );
            }
            Kase::Converged => {
                if s[l] < 0.0 {
                    s[l] = -s[l];
                    if let Some(v) = v.as_deref_mut() {
                        v[l * cols..(l + 1) * cols].iter_mut().for_each(|x| *x = -*x);
                    }
                }

                // sort the singular values in decreasing order
                while l + 1 != order && s[l] < s[l + 1] {
                    s.swap(l, l + 1);
                    if let Some(v) = v.as_deref_mut() {
                        if l + 1 < cols {
                            swap_cols(v, cols, l, l + 1);
                        }
                    }
                    if let Some(u) = u.as_deref_mut() {
                        if l + 1 < rows {
                            swap_cols(u, rows, l, l + 1);
                        }
                    }
                    l += 1;
                }

                iter = 0;
                m -= 1;
            }
        }
    }

    Ok(())
}
