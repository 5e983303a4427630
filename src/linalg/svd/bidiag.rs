//! Reduction to real bidiagonal form.

use crate::{c64, utils::norm_l2};
use num_traits::{One, Zero};

/// Returns `|magnitude|` with the phase of `phase`, or `magnitude` itself if `phase` is zero.
#[inline]
fn with_phase_of(magnitude: c64, phase: c64) -> c64 {
    if phase.is_zero() {
        magnitude
    } else {
        phase * (magnitude.norm() / phase.norm())
    }
}

/// Unit lower bidiagonal reduction of the `rows × cols` matrix `a`, which is destroyed.
///
/// Returns the diagonal and the superdiagonal of a real upper bidiagonal matrix `B` of order
/// `min(cols, rows + 1)`, such that `A = U·B·V^H`. When provided, `u` (`rows × rows`) and `v`
/// (`cols × cols`) receive the unitary factors.
pub fn bidiagonalize(
    a: &mut [c64],
    rows: usize,
    cols: usize,
    mut u: Option<&mut [c64]>,
    mut v: Option<&mut [c64]>,
) -> (Vec<f64>, Vec<f64>) {
    equator::assert!(all(rows > 0, cols > 0, a.len() == rows * cols));

    let order = Ord::min(cols, rows + 1);
    let nct = Ord::min(rows - 1, cols);
    let nrt = Ord::min(cols.saturating_sub(2), rows);

    let mut s = vec![c64::zero(); order];
    let mut e = vec![c64::zero(); cols];
    let mut work = vec![c64::zero(); rows];

    for l in 0..Ord::max(nct, nrt) {
        if l < nct {
            // column transformation, the diagonal goes to s[l]
            let col = &mut a[l * rows + l..(l + 1) * rows];
            let mut sl = c64::new(norm_l2(col), 0.0);
            if !sl.is_zero() {
                sl = with_phase_of(sl, col[0]);
                let inv = sl.inv();
                for x in col.iter_mut() {
                    *x *= inv;
                }
                col[0] += 1.0;
            }
            s[l] = -sl;
        }

        for j in l + 1..cols {
            if l < nct && !s[l].is_zero() {
                let mut t = c64::zero();
                for i in l..rows {
                    t += a[l * rows + i].conj() * a[j * rows + i];
                }
                let t = -t / a[l * rows + l];
                for i in l..rows {
                    let x = a[l * rows + i];
                    a[j * rows + i] += t * x;
                }
            }
            // the l-th row feeds the row transformation
            e[j] = a[j * rows + l].conj();
        }

        if l < nct {
            if let Some(u) = u.as_deref_mut() {
                u[l * rows + l..(l + 1) * rows].copy_from_slice(&a[l * rows + l..(l + 1) * rows]);
            }
        }

        if l >= nrt {
            continue;
        }

        // row transformation, the superdiagonal goes to e[l]
        let mut el = c64::new(norm_l2(&e[l + 1..]), 0.0);
        if !el.is_zero() {
            el = with_phase_of(el, e[l + 1]);
            let inv = el.inv();
            for x in &mut e[l + 1..] {
                *x *= inv;
            }
            e[l + 1] += 1.0;
        }
        e[l] = -el.conj();

        if l + 1 < rows && !e[l].is_zero() {
            work[l + 1..].fill(c64::zero());
            for j in l + 1..cols {
                for i in l + 1..rows {
                    work[i] += e[j] * a[j * rows + i];
                }
            }
            for j in l + 1..cols {
                let w = (-e[j] / e[l + 1]).conj();
                for i in l + 1..rows {
                    a[j * rows + i] += w * work[i];
                }
            }
        }

        if let Some(v) = v.as_deref_mut() {
            v[l * cols + l + 1..(l + 1) * cols].copy_from_slice(&e[l + 1..]);
        }
    }

    if nct < cols {
        s[nct] = a[nct * rows + nct];
    }
    if rows < order {
        s[order - 1] = c64::zero();
    }
    if nrt + 1 < order {
        e[nrt] = a[(order - 1) * rows + nrt];
    }
    e[order - 1] = c64::zero();

    if let Some(u) = u.as_deref_mut() {
        generate_u(u, rows, nct, &s);
    }
    if let Some(v) = v.as_deref_mut() {
        generate_v(v, cols, nrt, &e);
    }

    make_real(s, e, order, rows, cols, u, v)
}

/// Expands the column reflectors stored in `u` into the unitary factor.
fn generate_u(u: &mut [c64], rows: usize, nct: usize, s: &[c64]) {
    for j in nct..rows {
        let col = &mut u[j * rows..(j + 1) * rows];
        col.fill(c64::zero());
        col[j] = c64::one();
    }

    for l in (0..nct).rev() {
        if s[l].is_zero() {
            let col = &mut u[l * rows..(l + 1) * rows];
            col.fill(c64::zero());
            col[l] = c64::one();
            continue;
        }

        for j in l + 1..rows {
            let mut t = c64::zero();
            for i in l..rows {
                t += u[l * rows + i].conj() * u[j * rows + i];
            }
            let t = -t / u[l * rows + l];
            for i in l..rows {
                let x = u[l * rows + i];
                u[j * rows + i] += t * x;
            }
        }

        let col = &mut u[l * rows..(l + 1) * rows];
        for x in &mut col[l..] {
            *x = -*x;
        }
        col[l] += 1.0;
        col[..l].fill(c64::zero());
    }
}

/// Expands the row reflectors stored in `v` into the unitary factor.
fn generate_v(v: &mut [c64], cols: usize, nrt: usize, e: &[c64]) {
    for l in (0..cols).rev() {
        if l < nrt && !e[l].is_zero() {
            for j in l + 1..cols {
                let mut t = c64::zero();
                for i in l + 1..cols {
                    t += v[l * cols + i].conj() * v[j * cols + i];
                }
                let t = -t / v[l * cols + l + 1];
                for i in l + 1..cols {
                    let x = v[l * cols + i];
                    v[j * cols + i] += t * x;
                }
            }
        }
        let col = &mut v[l * cols..(l + 1) * cols];
        col.fill(c64::zero());
        col[l] = c64::one();
    }
}

/// Scales the complex bidiagonal by unit modulus factors until it is real, folding the factors
/// into the columns of `u` and `v`.
fn make_real(
    mut s: Vec<c64>,
    mut e: Vec<c64>,
    order: usize,
    rows: usize,
    cols: usize,
    mut u: Option<&mut [c64]>,
    mut v: Option<&mut [c64]>,
) -> (Vec<f64>, Vec<f64>) {
    for i in 0..order {
        if !s[i].is_zero() {
            let t = s[i].norm();
            let r = s[i] / t;
            s[i] = c64::new(t, 0.0);
            if i + 1 < order {
                e[i] /= r;
            }
            if let Some(u) = u.as_deref_mut() {
                if i < rows {
                    u[i * rows..(i + 1) * rows].iter_mut().for_each(|x| *x *= r);
                }
            }
        }

        if i + 1 == order {
            break;
        }

        if !e[i].is_zero() {
            let t = e[i].norm();
            let r = t / e[i];
            e[i] = c64::new(t, 0.0);
            s[i + 1] *= r;
            if let Some(v) = v.as_deref_mut() {
                v[(i + 1) * cols..(i + 2) * cols].iter_mut().for_each(|x| *x *= r);
            }
        }
    }

    (
        s.iter().map(|s| s.re).collect(),
        e[..order].iter().map(|e| e.re).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn bidiagonal_reconstructs() {
        for (m, n) in [(1, 1), (1, 4), (4, 1), (5, 5), (8, 3), (3, 8), (2, 7)] {
            let a = random_mat(m, n);
            let mut work = a.clone();
            let mut u = vec![c64::zero(); m * m];
            let mut v = vec![c64::zero(); n * n];
            let (s, e) = bidiagonalize(&mut work, m, n, Some(&mut u), Some(&mut v));

            let order = Ord::min(n, m + 1);
            assert_eq!(s.len(), order);
            assert_eq!(e.len(), order);
            assert_eq!(e[order - 1], 0.0);
            assert_orthonormal_columns(&u, m, m, 1e-12);
            assert_orthonormal_columns(&v, n, n, 1e-12);

            // m × n bidiagonal
            let mut b = vec![c64::zero(); m * n];
            for i in 0..order {
                if i < m {
                    b[i * m + i] = c64::new(s[i], 0.0);
                }
                if i + 1 < order && i < m {
                    b[(i + 1) * m + i] = c64::new(e[i], 0.0);
                }
            }
            let ub = mul(&u, m, m, &b, n);
            let reconstructed = mul(&ub, m, n, &adjoint(&v, n, n), n);
            assert_close(&reconstructed, &a, 1e-12);
        }
    }
}
