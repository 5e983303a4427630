//! LU decomposition with partial pivoting.
//!
//! The LU decomposition of a square matrix $A$ is a factorization $PA = LU$, where $P$ is a
//! permutation matrix, $L$ is a unit lower triangular matrix and $U$ is an upper triangular
//! matrix. Both factors are packed into the storage of $A$.
//!
//! The permutation is reported as a pivot vector in the LAPACK `getrf` format: entry $j$ holds
//! the row that was swapped with row $j$ during the factorization. It is not an accumulated
//! permutation, and applying it means applying the swaps in increasing order of $j$.

use crate::{
    c64,
    error::check_len,
    utils::{set_identity, thread::for_each_col_mut},
    Operand, Provider, Result,
};

pub mod compute;
pub mod solve;

impl Provider {
    /// Factors the `order × order` matrix `data` in place, filling `ipiv` with the pivot rows.
    ///
    /// An exactly zero pivot does not stop the factorization. It is reported at warn level and
    /// propagates as infinities or `NaN`s through later solves.
    pub fn lu_factor(&self, data: &mut [c64], order: usize, ipiv: &mut [usize]) -> Result<()> {
        check_len("data", data.len(), order * order)?;
        check_len("ipiv", ipiv.len(), order)?;

        let n_zero_pivots = compute::lu_in_place(data, order, ipiv);
        if n_zero_pivots > 0 {
            log::warn!(
                target: "fallback_linalg",
                "lu: {n_zero_pivots} zero pivot(s) in a matrix of order {order}, the matrix is singular"
            );
        }
        Ok(())
    }

    /// Solves `A·X = B` in place, where `b` holds the `order × columns_of_b` matrix `B`.
    ///
    /// `a` is left untouched.
    pub fn lu_solve<'a>(
        &self,
        columns_of_b: usize,
        a: impl Into<Operand<'a>>,
        order: usize,
        b: &mut [c64],
    ) -> Result<()> {
        let a = a.into().distinct()?;
        check_len("a", a.len(), order * order)?;
        check_len("b", b.len(), order * columns_of_b)?;

        let mut lu = a.to_vec();
        let mut ipiv = vec![0usize; order];
        self.lu_factor(&mut lu, order, &mut ipiv)?;
        self.lu_solve_factored(columns_of_b, &lu, order, &ipiv, b)
    }

    /// Solves `A·X = B` in place, where `a` and `ipiv` hold the output of
    /// [`Provider::lu_factor`].
    pub fn lu_solve_factored<'a>(
        &self,
        columns_of_b: usize,
        a: impl Into<Operand<'a>>,
        order: usize,
        ipiv: &[usize],
        b: &mut [c64],
    ) -> Result<()> {
        let a = a.into().distinct()?;
        check_len("a", a.len(), order * order)?;
        check_len("ipiv", ipiv.len(), order)?;
        check_len("b", b.len(), order * columns_of_b)?;

        for_each_col_mut(
            b,
            order,
            |_, col| solve::solve_in_place(a, order, ipiv, col),
            self.parallelism_for(b.len()),
        );
        Ok(())
    }

    /// Replaces the `order × order` matrix `a` with its inverse.
    pub fn lu_inverse(&self, a: &mut [c64], order: usize) -> Result<()> {
        check_len("a", a.len(), order * order)?;
        let mut ipiv = vec![0usize; order];
        self.lu_factor(a, order, &mut ipiv)?;
        self.lu_inverse_factored(a, order, &ipiv)
    }

    /// Replaces the LU factors in `a` with the inverse of the matrix they were computed from.
    pub fn lu_inverse_factored(&self, a: &mut [c64], order: usize, ipiv: &[usize]) -> Result<()> {
        check_len("a", a.len(), order * order)?;
        let mut inverse = vec![c64::default(); order * order];
        set_identity(&mut inverse, order);
        self.lu_solve_factored(order, &*a, order, ipiv, &mut inverse)?;
        a.copy_from_slice(&inverse);
        Ok(())
    }
}
