//! Elementwise kernels over flat arrays.
//!
//! Inputs that may coincide with the result are taken as [`Operand`]s: passing
//! [`Operand::Output`] reads the current contents of `result`, which makes every kernel usable
//! in place.

use crate::{
    c64,
    error::check_len,
    utils::thread::{for_each_indexed_mut, par_split_indices, parallelism_degree},
    Operand, Parallelism, Provider, Result,
};
use num_traits::{One, Zero};
use rayon::prelude::*;

#[inline(always)]
fn read(operand: Operand<'_>, i: usize, current: c64) -> c64 {
    match operand {
        Operand::Slice(slice) => slice[i],
        Operand::Output => current,
    }
}

#[inline]
fn check_operand(name: &'static str, operand: Operand<'_>, len: usize) -> Result<()> {
    match operand {
        Operand::Slice(slice) => check_len(name, slice.len(), len),
        Operand::Output => Ok(()),
    }
}

/// Computes `result[i] = op(lhs[i], rhs[i])`.
#[inline]
pub fn zip_map(
    lhs: Operand<'_>,
    rhs: Operand<'_>,
    result: &mut [c64],
    op: impl Send + Sync + Fn(c64, c64) -> c64,
    parallelism: Parallelism,
) {
    for_each_indexed_mut(
        result,
        |i, current| op(read(lhs, i, current), read(rhs, i, current)),
        parallelism,
    );
}

/// Computes the unconjugated dot product `Σ x[i]·y[i]`.
pub fn dot(x: &[c64], y: &[c64], parallelism: Parallelism) -> c64 {
    equator::assert!(x.len() == y.len());
    let n = x.len();
    let chunk = |start: usize, len: usize| -> c64 {
        x[start..start + len]
            .iter()
            .zip(&y[start..start + len])
            .map(|(x, y)| x * y)
            .sum()
    };
    match parallelism {
        Parallelism::None => chunk(0, n),
        Parallelism::Rayon(_) => {
            let n_chunks = parallelism_degree(parallelism).min(n).max(1);
            (0..n_chunks)
                .into_par_iter()
                .map(|idx| {
                    let (start, len) = par_split_indices(n, idx, n_chunks);
                    chunk(start, len)
                })
                .sum()
        }
    }
}

impl Provider {
    /// Computes `result = y + α·x`.
    pub fn add_vector_to_scaled_vector<'a>(
        &self,
        y: impl Into<Operand<'a>>,
        alpha: c64,
        x: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        let (y, x) = (y.into(), x.into());
        check_operand("y", y, result.len())?;
        check_operand("x", x, result.len())?;
        let parallelism = self.parallelism_for(result.len());

        if alpha.is_zero() {
            zip_map(y, y, result, |y, _| y, parallelism);
        } else if alpha.is_one() {
            zip_map(y, x, result, |y, x| y + x, parallelism);
        } else {
            zip_map(y, x, result, |y, x| y + alpha * x, parallelism);
        }
        Ok(())
    }

    /// Computes `result = α·x`.
    pub fn scale_array<'a>(
        &self,
        alpha: c64,
        x: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        let x = x.into();
        check_operand("x", x, result.len())?;

        if alpha.is_zero() {
            result.fill(c64::zero());
        } else if alpha.is_one() {
            if let Operand::Slice(x) = x {
                result.copy_from_slice(x);
            }
        } else {
            let parallelism = self.parallelism_for(result.len());
            zip_map(x, x, result, |x, _| alpha * x, parallelism);
        }
        Ok(())
    }

    /// Computes `result = conj(x)`.
    pub fn conjugate_array<'a>(&self, x: impl Into<Operand<'a>>, result: &mut [c64]) -> Result<()> {
        let x = x.into();
        check_operand("x", x, result.len())?;
        let parallelism = self.parallelism_for(result.len());
        zip_map(x, x, result, |x, _| x.conj(), parallelism);
        Ok(())
    }

    /// Computes the unconjugated dot product `Σ x[i]·y[i]`.
    pub fn dot_product(&self, x: &[c64], y: &[c64]) -> Result<c64> {
        check_len("y", y.len(), x.len())?;
        Ok(dot(x, y, self.parallelism_for(x.len())))
    }

    /// Computes `result = x + y`.
    pub fn add_arrays<'a>(
        &self,
        x: impl Into<Operand<'a>>,
        y: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        self.binary_op(x.into(), y.into(), result, |x, y| x + y)
    }

    /// Computes `result = x - y`.
    pub fn subtract_arrays<'a>(
        &self,
        x: impl Into<Operand<'a>>,
        y: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        self.binary_op(x.into(), y.into(), result, |x, y| x - y)
    }

    /// Computes `result[i] = x[i]·y[i]`.
    pub fn pointwise_multiply_arrays<'a>(
        &self,
        x: impl Into<Operand<'a>>,
        y: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        self.binary_op(x.into(), y.into(), result, |x, y| x * y)
    }

    /// Computes `result[i] = x[i] / y[i]`, following IEEE semantics for zero divisors.
    pub fn pointwise_divide_arrays<'a>(
        &self,
        x: impl Into<Operand<'a>>,
        y: impl Into<Operand<'a>>,
        result: &mut [c64],
    ) -> Result<()> {
        self.binary_op(x.into(), y.into(), result, |x, y| x / y)
    }

    fn binary_op(
        &self,
        x: Operand<'_>,
        y: Operand<'_>,
        result: &mut [c64],
        op: impl Send + Sync + Fn(c64, c64) -> c64,
    ) -> Result<()> {
        check_operand("x", x, result.len())?;
        check_operand("y", y, result.len())?;
        zip_map(x, y, result, op, self.parallelism_for(result.len()));
        Ok(())
    }
}
