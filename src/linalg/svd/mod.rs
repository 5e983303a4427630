//! Singular value decomposition.
//!
//! The SVD of a matrix $M$ of shape $(m, n)$ is a decomposition into three components $U$, $S$,
//! and $V$, such that:
//!
//! - $U$ has shape $(m, m)$ and is a unitary matrix,
//! - $V$ has shape $(n, n)$ and is a unitary matrix,
//! - $S$ has shape $(m, n)$ and is zero everywhere except the main diagonal, which holds the
//!   singular values in decreasing order,
//! - and finally:
//!
//! $$M = U S V^H.$$
//!
//! The decomposition follows Golub, Kahan and Reinsch: the matrix is reduced to a complex
//! bidiagonal form by alternating left and right Householder reflections, the bidiagonal is made
//! real by unit modulus scalings, and is then diagonalized by implicitly shifted QR sweeps.

use crate::{
    c64,
    error::check_len,
    utils::{set_identity, thread::for_each_col_mut},
    Provider, Result,
};
use num_traits::Zero;

pub mod bidiag;
pub mod qr_iteration;

/// Computes the SVD of the `rows × cols` matrix `a`, which is destroyed.
///
/// `s` receives the `min(rows, cols)` singular values. When provided, `u` receives $U$ and `vt`
/// receives $V^H$.
pub fn compute_svd(
    a: &mut [c64],
    rows: usize,
    cols: usize,
    s: &mut [c64],
    mut u: Option<&mut [c64]>,
    vt: Option<&mut [c64]>,
) -> Result<()> {
    let size = Ord::min(rows, cols);
    equator::assert!(all(a.len() == rows * cols, s.len() == size));

    if rows == 0 || cols == 0 {
        if let Some(u) = u {
            set_identity(u, rows);
        }
        if let Some(vt) = vt {
            set_identity(vt, cols);
        }
        return Ok(());
    }

    let mut v = vt.as_ref().map(|_| vec![c64::zero(); cols * cols]);
    let (mut diag, mut offdiag) =
        bidiag::bidiagonalize(a, rows, cols, u.as_deref_mut(), v.as_deref_mut());
    qr_iteration::compute_bidiag_svd_qr_iteration(
        &mut diag,
        &mut offdiag,
        rows,
        cols,
        u.as_deref_mut(),
        v.as_deref_mut(),
    )?;

    for (s, d) in s.iter_mut().zip(&diag) {
        *s = c64::new(*d, 0.0);
    }
    if let (Some(vt), Some(v)) = (vt, v) {
        for j in 0..cols {
            for i in 0..cols {
                vt[j * cols + i] = v[i * cols + j].conj();
            }
        }
    }
    Ok(())
}

/// Computes `x = V·diag(s)^-1·U^H·b` for a single right-hand side.
pub fn solve(
    u: &[c64],
    s: &[c64],
    vt: &[c64],
    rows: usize,
    cols: usize,
    b: &[c64],
    x: &mut [c64],
) {
    let size = s.len();
    let tmp: Vec<c64> = (0..cols)
        .map(|j| {
            if j < size {
                let u_j = &u[j * rows..(j + 1) * rows];
                u_j.iter().zip(b).map(|(u, b)| u.conj() * b).sum::<c64>() / s[j]
            } else {
                c64::zero()
            }
        })
        .collect();

    for (j, x) in x.iter_mut().enumerate() {
        let vt_j = &vt[j * cols..(j + 1) * cols];
        *x = vt_j.iter().zip(&tmp).map(|(vt, t)| vt.conj() * t).sum();
    }
}

impl Provider {
    /// Computes the singular value decomposition `A = U·S·V^H` of the `rows × cols` matrix `a`.
    ///
    /// `s` receives the `min(rows, cols)` singular values in decreasing order, as complex numbers
    /// with zero imaginary part. When `compute_vectors` is set, `u` (`rows × rows`) receives $U$
    /// and `vt` (`cols × cols`) receives $V^H$; otherwise they are not accessed and may be empty.
    pub fn singular_value_decomposition(
        &self,
        compute_vectors: bool,
        a: &[c64],
        rows: usize,
        cols: usize,
        s: &mut [c64],
        u: &mut [c64],
        vt: &mut [c64],
    ) -> Result<()> {
        check_len("a", a.len(), rows * cols)?;
        check_len("s", s.len(), Ord::min(rows, cols))?;
        if compute_vectors {
            check_len("u", u.len(), rows * rows)?;
            check_len("vt", vt.len(), cols * cols)?;
        }

        let mut work = a.to_vec();
        if compute_vectors {
            compute_svd(&mut work, rows, cols, s, Some(u), Some(vt))
        } else {
            compute_svd(&mut work, rows, cols, s, None, None)
        }
    }

    /// Computes the least squares solution of `A·X = B` through the SVD of the `rows × cols`
    /// matrix `a`. `b` is `rows × columns_of_b` and `x` receives the `cols × columns_of_b`
    /// solution.
    pub fn svd_solve(
        &self,
        a: &[c64],
        rows: usize,
        cols: usize,
        b: &[c64],
        columns_of_b: usize,
        x: &mut [c64],
    ) -> Result<()> {
        check_len("a", a.len(), rows * cols)?;
        let mut s = vec![c64::zero(); Ord::min(rows, cols)];
        let mut u = vec![c64::zero(); rows * rows];
        let mut vt = vec![c64::zero(); cols * cols];
        self.singular_value_decomposition(true, a, rows, cols, &mut s, &mut u, &mut vt)?;
        self.svd_solve_factored(rows, cols, &s, &u, &vt, b, columns_of_b, x)
    }

    /// Computes the least squares solution of `A·X = B` from the factors computed by
    /// [`Provider::singular_value_decomposition`].
    ///
    /// Zero singular values are not filtered out and produce infinities or `NaN`s.
    pub fn svd_solve_factored(
        &self,
        rows: usize,
        cols: usize,
        s: &[c64],
        u: &[c64],
        vt: &[c64],
        b: &[c64],
        columns_of_b: usize,
        x: &mut [c64],
    ) -> Result<()> {
        check_len("s", s.len(), Ord::min(rows, cols))?;
        check_len("u", u.len(), rows * rows)?;
        check_len("vt", vt.len(), cols * cols)?;
        check_len("b", b.len(), rows * columns_of_b)?;
        check_len("x", x.len(), cols * columns_of_b)?;

        for_each_col_mut(
            x,
            cols,
            |j, x| solve(u, s, vt, rows, cols, &b[j * rows..(j + 1) * rows], x),
            self.parallelism_for(columns_of_b * cols),
        );
        Ok(())
    }
}
