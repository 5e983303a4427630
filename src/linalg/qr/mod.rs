//! The QR decomposition decomposes a matrix $A$ into the product
//! $$A = QR,$$
//! where $Q$ is a unitary matrix and $R$ is an upper trapezoidal matrix.
//!
//! The full decomposition of an $m \times n$ matrix produces an $m \times m$ matrix $Q$ and an
//! $m \times n$ matrix $R$. When $m \geq n$, the thin decomposition only keeps the first $n$
//! columns of $Q$, which overwrite $A$, and the top $n \times n$ block of $R$.

use crate::{
    c64,
    error::check_len,
    utils::{set_identity, thread::for_each_col_mut},
    Config, LinalgError, Operand, Provider, Result,
};
use num_traits::Zero;

pub mod compute;
pub mod solve;

/// Variant of the QR decomposition used by the solvers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum QrMethod {
    /// `Q` is `rows × rows` and `R` is `rows × cols`.
    #[default]
    Full,
    /// `Q` is `rows × cols` and `R` is `cols × cols`.
    Thin,
}

impl QrMethod {
    /// Shapes of `Q` and `R` for an input with the given dimensions.
    #[inline]
    fn shapes(self, rows: usize, cols: usize) -> ((usize, usize), (usize, usize)) {
        match self {
            QrMethod::Full => ((rows, rows), (rows, cols)),
            QrMethod::Thin => ((rows, cols), (cols, cols)),
        }
    }
}

#[inline]
fn check_tau(tau: &[c64], size: usize) -> Result<()> {
    if tau.len() < size {
        return Err(LinalgError::DimensionMismatch {
            operand: "tau",
            expected: size,
            found: tau.len(),
        });
    }
    Ok(())
}

impl Provider {
    /// Computes the full QR decomposition of a `rows × cols` matrix.
    ///
    /// `r` holds the matrix on entry and the `rows × cols` factor `R` on exit. `q` receives the
    /// `rows × rows` unitary factor, and `tau` the scalars of the Householder reflectors.
    pub fn qr_factor(
        &self,
        r: &mut [c64],
        rows: usize,
        cols: usize,
        q: &mut [c64],
        tau: &mut [c64],
    ) -> Result<()> {
        let size = Ord::min(rows, cols);
        check_len("r", r.len(), rows * cols)?;
        check_len("q", q.len(), rows * rows)?;
        check_tau(tau, size)?;

        let Config {
            parallelize_columns,
            parallelism,
            ..
        } = *self.config();
        let mut householder = vec![c64::zero(); rows * size];
        compute::qr_in_place(r, rows, cols, &mut householder, tau, parallelize_columns, parallelism);

        set_identity(q, rows);
        compute::accumulate_q(&householder, rows, size, q, rows, parallelize_columns, parallelism);
        Ok(())
    }

    /// Computes the thin QR decomposition of a `rows × cols` matrix, with `rows >= cols`.
    ///
    /// `a` holds the matrix on entry and the `rows × cols` factor `Q` on exit. `r` receives the
    /// `cols × cols` factor `R`, and `tau` the scalars of the Householder reflectors.
    pub fn thin_qr_factor(
        &self,
        a: &mut [c64],
        rows: usize,
        cols: usize,
        r: &mut [c64],
        tau: &mut [c64],
    ) -> Result<()> {
        if rows < cols {
            return Err(LinalgError::RowsLessThanColumns { rows, cols });
        }
        check_len("a", a.len(), rows * cols)?;
        check_len("r", r.len(), cols * cols)?;
        check_tau(tau, cols)?;

        let Config {
            parallelize_columns,
            parallelism,
            ..
        } = *self.config();
        let mut householder = vec![c64::zero(); rows * cols];
        compute::qr_in_place(a, rows, cols, &mut householder, tau, parallelize_columns, parallelism);

        for j in 0..cols {
            r[j * cols..(j + 1) * cols].copy_from_slice(&a[j * rows..j * rows + cols]);
        }

        a.fill(c64::zero());
        for i in 0..cols {
            a[i * rows + i] = c64::new(1.0, 0.0);
        }
        compute::accumulate_q(&householder, rows, cols, a, cols, parallelize_columns, parallelism);
        Ok(())
    }

    /// Computes the least squares solution of `A·X = B`, where `a` is `rows × cols` with
    /// `rows >= cols`, `b` is `rows × columns_of_b` and `x` receives the `cols × columns_of_b`
    /// solution.
    ///
    /// [`Operand::Output`] stands for `x`. The factorization cannot be read from the buffer the
    /// solution is written to, so it fails with [`LinalgError::AliasedBuffers`].
    pub fn qr_solve<'a>(
        &self,
        a: impl Into<Operand<'a>>,
        rows: usize,
        cols: usize,
        b: &[c64],
        columns_of_b: usize,
        x: &mut [c64],
        method: QrMethod,
    ) -> Result<()> {
        let a = a.into().distinct()?;
        if rows < cols {
            return Err(LinalgError::RowsLessThanColumns { rows, cols });
        }
        check_len("a", a.len(), rows * cols)?;

        let mut factor = a.to_vec();
        let mut tau = vec![c64::zero(); cols];
        let ((q_rows, q_cols), (r_rows, r_cols)) = method.shapes(rows, cols);
        let mut r = vec![c64::zero(); r_rows * r_cols];

        let q = match method {
            QrMethod::Full => {
                let mut q = vec![c64::zero(); q_rows * q_cols];
                self.qr_factor(&mut factor, rows, cols, &mut q, &mut tau)?;
                r = factor;
                q
            }
            QrMethod::Thin => {
                self.thin_qr_factor(&mut factor, rows, cols, &mut r, &mut tau)?;
                factor
            }
        };
        self.qr_solve_factored(&q, &r, rows, cols, b, columns_of_b, x, method)
    }

    /// Computes the least squares solution of `A·X = B` from a QR decomposition of `A` computed
    /// with [`Provider::qr_factor`] or [`Provider::thin_qr_factor`], as selected by `method`.
    ///
    /// As in [`Provider::qr_solve`], passing [`Operand::Output`] for `q` or `r` names `x` and
    /// fails with [`LinalgError::AliasedBuffers`].
    pub fn qr_solve_factored<'a>(
        &self,
        q: impl Into<Operand<'a>>,
        r: impl Into<Operand<'a>>,
        rows: usize,
        cols: usize,
        b: &[c64],
        columns_of_b: usize,
        x: &mut [c64],
        method: QrMethod,
    ) -> Result<()> {
        let q = q.into().distinct()?;
        let r = r.into().distinct()?;
        if rows < cols {
            return Err(LinalgError::RowsLessThanColumns { rows, cols });
        }
        let ((q_rows, q_cols), (r_rows, r_cols)) = method.shapes(rows, cols);
        check_len("q", q.len(), q_rows * q_cols)?;
        check_len("r", r.len(), r_rows * r_cols)?;
        check_len("b", b.len(), rows * columns_of_b)?;
        check_len("x", x.len(), cols * columns_of_b)?;

        for_each_col_mut(
            x,
            cols,
            |j, x| solve::solve(q, r, rows, cols, r_rows, &b[j * rows..(j + 1) * rows], x),
            self.parallelism_for(columns_of_b * cols),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::*, Parallelism};

    fn assert_upper_trapezoidal(r: &[c64], rows: usize, cols: usize) {
        for j in 0..cols {
            for i in j + 1..rows {
                assert_eq!(r[j * rows + i], c64::zero());
            }
        }
    }

    #[test]
    fn full_qr() {
        let provider = Provider::default();
        for (m, n) in [(1, 1), (4, 4), (9, 5), (5, 9), (30, 17)] {
            let a = random_mat(m, n);
            let mut r = a.clone();
            let mut q = vec![c64::zero(); m * m];
            let mut tau = vec![c64::zero(); Ord::min(m, n)];
            provider.qr_factor(&mut r, m, n, &mut q, &mut tau).unwrap();

            assert_upper_trapezoidal(&r, m, n);
            assert_orthonormal_columns(&q, m, m, 1e-12);
            assert_close(&mul(&q, m, m, &r, n), &a, 1e-12);
            for tau in &tau {
                assert!(tau.im == 0.0 && (1.0..=2.0).contains(&tau.re));
            }
        }
    }

    #[test]
    fn thin_qr() {
        let provider = Provider::default();
        for (m, n) in [(3, 3), (12, 4), (40, 25)] {
            let a = random_mat(m, n);
            let mut q = a.clone();
            let mut r = vec![c64::zero(); n * n];
            let mut tau = vec![c64::zero(); n];
            provider.thin_qr_factor(&mut q, m, n, &mut r, &mut tau).unwrap();

            assert_upper_trapezoidal(&r, n, n);
            assert_orthonormal_columns(&q, m, n, 1e-12);
            assert_close(&mul(&q, m, n, &r, n), &a, 1e-12);
        }

        let mut a = random_mat(2, 3);
        let mut r = vec![c64::zero(); 9];
        let mut tau = vec![c64::zero(); 3];
        assert_eq!(
            provider.thin_qr_factor(&mut a, 2, 3, &mut r, &mut tau),
            Err(LinalgError::RowsLessThanColumns { rows: 2, cols: 3 })
        );
    }

    #[test]
    fn wide_trailing_update_in_parallel() {
        let (m, n) = (5, 450);
        let a = random_mat(m, n);
        let mut results = Vec::new();
        for config in [
            Config::sequential(),
            Config::default().with_parallelism(Parallelism::Rayon(4)),
        ] {
            let provider = Provider::new(config);
            let mut r = a.clone();
            let mut q = vec![c64::zero(); m * m];
            let mut tau = vec![c64::zero(); m];
            provider.qr_factor(&mut r, m, n, &mut q, &mut tau).unwrap();
            assert_close(&mul(&q, m, m, &r, n), &a, 1e-12);
            results.push(r);
        }
        assert_close(&results[0], &results[1], 1e-12);
    }

    #[test]
    fn column_split_threshold_from_config() {
        let (m, n) = (12, 9);
        let a = random_mat(m, n);
        let sequential = Provider::new(Config::sequential());
        let split = Provider::new(
            Config::default()
                .with_parallelism(Parallelism::Rayon(4))
                .with_parallelize_columns(2),
        );

        let mut r_seq = a.clone();
        let mut q_seq = vec![c64::zero(); m * m];
        let mut tau = vec![c64::zero(); n];
        sequential.qr_factor(&mut r_seq, m, n, &mut q_seq, &mut tau).unwrap();

        let mut r_split = a.clone();
        let mut q_split = vec![c64::zero(); m * m];
        split.qr_factor(&mut r_split, m, n, &mut q_split, &mut tau).unwrap();
        assert_close(&r_split, &r_seq, 1e-12);
        assert_close(&q_split, &q_seq, 1e-12);

        let mut q_thin = a.clone();
        let mut r_thin = vec![c64::zero(); n * n];
        split.thin_qr_factor(&mut q_thin, m, n, &mut r_thin, &mut tau).unwrap();
        assert_close(&mul(&q_thin, m, n, &r_thin, n), &a, 1e-12);
    }

    #[test]
    fn solve_least_squares() {
        let provider = Provider::default();
        for method in [QrMethod::Full, QrMethod::Thin] {
            for (m, n, k) in [(6, 6, 2), (15, 4, 3)] {
                let a = random_mat(m, n);
                let x_expected = random_mat(n, k);
                let b = mul(&a, m, n, &x_expected, k);

                let mut x = vec![c64::zero(); n * k];
                provider.qr_solve(&a, m, n, &b, k, &mut x, method).unwrap();
                assert_close(&x, &x_expected, 1e-9);
            }
        }
    }

    #[test]
    fn solve_overdetermined_residual_is_orthogonal() {
        let provider = Provider::default();
        let (m, n) = (10, 3);
        let a = random_mat(m, n);
        let b = random_mat(m, 1);
        let mut x = vec![c64::zero(); n];
        provider
            .qr_solve(&a, m, n, &b, 1, &mut x, QrMethod::Thin)
            .unwrap();

        let ax = mul(&a, m, n, &x, 1);
        let residual: Vec<c64> = b.iter().zip(&ax).map(|(b, ax)| b - ax).collect();
        let normal = mul(&adjoint(&a, m, n), n, m, &residual, 1);
        assert_close(&normal, &vec![c64::zero(); n], 1e-10);
    }

    #[test]
    fn errors() {
        let provider = Provider::default();
        let a = random_mat(2, 3);
        let b = random_mat(2, 1);
        let mut x = vec![c64::zero(); 3];
        assert_eq!(
            provider.qr_solve(&a, 2, 3, &b, 1, &mut x, QrMethod::Full),
            Err(LinalgError::RowsLessThanColumns { rows: 2, cols: 3 })
        );
        let b = random_mat(3, 1);
        assert_eq!(
            provider.qr_solve(Operand::Output, 3, 3, &b, 1, &mut x, QrMethod::Full),
            Err(LinalgError::AliasedBuffers)
        );
        let q = identity(3);
        for method in [QrMethod::Full, QrMethod::Thin] {
            assert_eq!(
                provider.qr_solve_factored(&q, Operand::Output, 3, 3, &b, 1, &mut x, method),
                Err(LinalgError::AliasedBuffers)
            );
            assert_eq!(
                provider.qr_solve_factored(Operand::Output, &q, 3, 3, &b, 1, &mut x, method),
                Err(LinalgError::AliasedBuffers)
            );
        }

        let mut r = random_mat(3, 3);
        let mut q = vec![c64::zero(); 9];
        let mut tau = vec![c64::zero(); 2];
        assert!(matches!(
            provider.qr_factor(&mut r, 3, 3, &mut q, &mut tau),
            Err(LinalgError::DimensionMismatch { operand: "tau", .. })
        ));
    }
}
