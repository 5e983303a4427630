//! Cholesky decomposition.
//!
//! The Cholesky decomposition of a Hermitian positive definite matrix $A$ is $A = LL^H$, where
//! $L$ is lower triangular with a positive real diagonal. Positive definiteness is checked along
//! the way: the factorization fails as soon as a pivot with a non positive real part is met.

use crate::{c64, error::check_len, utils::thread::for_each_col_mut, Operand, Provider, Result};

pub mod compute;
pub mod solve;

impl Provider {
    /// Replaces the `order × order` matrix `a` with its Cholesky factor.
    ///
    /// On failure, `a` is left partially overwritten.
    pub fn cholesky_factor(&self, a: &mut [c64], order: usize) -> Result<()> {
        check_len("a", a.len(), order * order)?;
        compute::cholesky_in_place(
            a,
            order,
            self.config().parallelize_elements,
            self.config().parallelism,
        )
    }

    /// Solves `A·X = B` in place for a Hermitian positive definite `A`, where `b` holds the
    /// `order × columns_of_b` matrix `B`.
    pub fn cholesky_solve<'a>(
        &self,
        columns_of_b: usize,
        a: impl Into<Operand<'a>>,
        order: usize,
        b: &mut [c64],
    ) -> Result<()> {
        let a = a.into().distinct()?;
        check_len("a", a.len(), order * order)?;
        check_len("b", b.len(), order * columns_of_b)?;

        let mut l = a.to_vec();
        self.cholesky_factor(&mut l, order)?;
        self.cholesky_solve_factored(columns_of_b, &l, order, b)
    }

    /// Solves `A·X = B` in place, where `a` holds the Cholesky factor computed by
    /// [`Provider::cholesky_factor`].
    pub fn cholesky_solve_factored<'a>(
        &self,
        columns_of_b: usize,
        a: impl Into<Operand<'a>>,
        order: usize,
        b: &mut [c64],
    ) -> Result<()> {
        let l = a.into().distinct()?;
        check_len("a", l.len(), order * order)?;
        check_len("b", b.len(), order * columns_of_b)?;

        for_each_col_mut(
            b,
            order,
            |_, col| solve::solve_in_place(l, order, col),
            self.parallelism_for(columns_of_b),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::*, Config, LinalgError, Parallelism};

    #[test]
    fn factor_reconstructs() {
        let provider = Provider::default();
        for n in [1, 2, 5, 30] {
            let a = random_hpd(n);
            let mut l = a.clone();
            provider.cholesky_factor(&mut l, n).unwrap();

            for j in 0..n {
                assert!(l[j * n + j].re > 0.0);
                assert!(l[j * n + j].im.abs() < 1e-12);
                for i in 0..j {
                    assert_eq!(l[j * n + i], c64::default());
                }
            }
            assert_close(&mul(&l, n, n, &adjoint(&l, n, n), n), &a, 1e-10);
        }
    }

    #[test]
    fn diagonal() {
        let provider = Provider::default();
        let mut a = [
            c64::new(4.0, 0.0),
            c64::default(),
            c64::default(),
            c64::new(9.0, 0.0),
        ];
        provider.cholesky_factor(&mut a, 2).unwrap();
        assert_close(
            &a,
            &[
                c64::new(2.0, 0.0),
                c64::default(),
                c64::default(),
                c64::new(3.0, 0.0),
            ],
            1e-15,
        );
    }

    #[test]
    fn solve() {
        for provider in [
            Provider::default(),
            Provider::new(
                Config::default()
                    .with_parallelism(Parallelism::Rayon(3))
                    .with_parallelize_elements(1),
            ),
        ] {
            let (n, k) = (12, 5);
            let a = random_hpd(n);
            let x = random_mat(n, k);
            let mut b = mul(&a, n, n, &x, k);
            provider.cholesky_solve(k, &a, n, &mut b).unwrap();
            assert_close(&b, &x, 1e-10);

            let mut l = a.clone();
            provider.cholesky_factor(&mut l, n).unwrap();
            let mut b = mul(&a, n, n, &x, k);
            provider.cholesky_solve_factored(k, &l, n, &mut b).unwrap();
            assert_close(&b, &x, 1e-10);
        }
    }

    #[test]
    fn errors() {
        let provider = Provider::default();
        let mut a = vec![c64::new(-1.0, 0.0); 4];
        assert_eq!(
            provider.cholesky_factor(&mut a, 2),
            Err(LinalgError::NotPositiveDefinite {
                non_positive_definite_minor: 1
            })
        );

        let mut b = random_mat(2, 1);
        assert_eq!(
            provider.cholesky_solve_factored(1, Operand::Output, 2, &mut b),
            Err(LinalgError::AliasedBuffers)
        );
        assert!(provider.cholesky_factor(&mut a, 3).is_err());
    }
}
