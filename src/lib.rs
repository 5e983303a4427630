//! `fallback-linalg` is a pure Rust dense linear algebra kernel for complex matrices.
//!
//! It is meant to sit behind a higher level matrix library as the engine used when no native
//! BLAS/LAPACK implementation is available. Every routine works on flat, column-major buffers of
//! [`c64`] plus explicit dimensions: the crate owns no matrix type, performs no I/O and keeps no
//! state between calls.
//!
//! The entry points are the methods of [`Provider`], grouped as follows:
//!
//! - elementwise kernels: [`Provider::add_vector_to_scaled_vector`],
//!   [`Provider::scale_array`], [`Provider::conjugate_array`], [`Provider::dot_product`],
//!   [`Provider::add_arrays`], [`Provider::subtract_arrays`],
//!   [`Provider::pointwise_multiply_arrays`], [`Provider::pointwise_divide_arrays`],
//! - [`Provider::matrix_norm`],
//! - matrix products: [`Provider::matrix_multiply`], [`Provider::matrix_multiply_with_update`],
//! - LU with partial pivoting, Cholesky, Householder QR, Golub-Kahan-Reinsch SVD and the
//!   eigendecomposition, each with its solve variants.
//!
//! # Example
//! ```
//! use fallback_linalg::{c64, Provider};
//!
//! let provider = Provider::default();
//!
//! // column-major [[4, 2], [2, 3]]
//! let a = [c64::new(4.0, 0.0), c64::new(2.0, 0.0), c64::new(2.0, 0.0), c64::new(3.0, 0.0)];
//! let mut b = [c64::new(2.0, 0.0), c64::new(1.0, 0.0)];
//!
//! provider.lu_solve(1, &a, 2, &mut b).unwrap();
//!
//! assert!((b[0] - c64::new(0.5, 0.0)).norm() < 1e-12);
//! assert!((b[1] - c64::new(0.0, 0.0)).norm() < 1e-12);
//! ```
//!
//! # Parallelism
//! Routines fan out through [`rayon`] when the work exceeds the thresholds of the provider's
//! [`Config`]. Parallel branches always write disjoint parts of the output, and only the
//! outermost level of a recursive algorithm is allowed to fork.

#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(non_camel_case_types)]

use equator::debug_assert;

pub mod error;
pub mod linalg;
pub mod mat;
pub mod provider;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{LinalgError, Result};
pub use linalg::QrMethod;
pub use provider::{Config, Provider};

pub use num_complex;
pub use reborrow;

/// 64-bit complex floating point number, the scalar type of every buffer in this crate.
pub type c64 = num_complex::Complex<f64>;

/// Parallelism strategy that is passed to the kernels of the library.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism.
    ///
    /// The code is possibly executed in parallel on the current thread, as well as the currently
    /// active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    Rayon(usize),
}

/// Transposition applied to an operand of a matrix product.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Transpose {
    /// Use the operand as stored.
    #[default]
    NoTrans,
    /// Use the transpose of the operand.
    Trans,
    /// Use the conjugate transpose of the operand.
    ConjTrans,
}

impl Transpose {
    /// Whether rows and columns of the operand are swapped.
    #[inline]
    pub fn is_transposed(self) -> bool {
        !matches!(self, Transpose::NoTrans)
    }

    /// Whether the elements of the operand are conjugated when read.
    #[inline]
    pub fn is_conjugated(self) -> bool {
        matches!(self, Transpose::ConjTrans)
    }
}

/// Matrix norm computed by [`Provider::matrix_norm`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Norm {
    /// Maximum absolute column sum.
    One,
    /// Maximum absolute row sum.
    Infinity,
    /// Largest absolute value of an entry.
    MaxAbs,
    /// Square root of the sum of the squared absolute values.
    Frobenius,
}

impl TryFrom<char> for Norm {
    type Error = LinalgError;

    /// Parses the norm codes accepted by the LAPACK `xLANGE` family.
    fn try_from(code: char) -> Result<Self> {
        match code.to_ascii_uppercase() {
            '1' | 'O' => Ok(Norm::One),
            'I' => Ok(Norm::Infinity),
            'M' => Ok(Norm::MaxAbs),
            'F' | 'E' => Ok(Norm::Frobenius),
            _ => Err(LinalgError::UnsupportedNormKind(code)),
        }
    }
}

/// Input buffer of a routine that also writes to an output buffer.
///
/// Rust references already guarantee that a `&[c64]` input and a `&mut [c64]` output never
/// overlap. When the caller wants a routine to read its input from the very buffer it writes to,
/// it passes [`Operand::Output`] instead. Routines that can support this clone the output before
/// computing. Routines for which it makes no sense report [`LinalgError::AliasedBuffers`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Operand<'a> {
    /// A buffer distinct from the output.
    Slice(&'a [c64]),
    /// The output buffer itself.
    Output,
}

impl<'a> Operand<'a> {
    /// Returns the slice, or a copy of `output` stored in `storage`.
    #[inline]
    pub(crate) fn or_clone_of(self, output: &[c64], storage: &'a mut Vec<c64>) -> &'a [c64] {
        match self {
            Operand::Slice(slice) => slice,
            Operand::Output => {
                storage.clear();
                storage.extend_from_slice(output);
                storage
            }
        }
    }

    /// Returns the slice, failing if it is the output buffer.
    #[inline]
    pub(crate) fn distinct(self) -> Result<&'a [c64]> {
        match self {
            Operand::Slice(slice) => Ok(slice),
            Operand::Output => Err(LinalgError::AliasedBuffers),
        }
    }
}

impl<'a> From<&'a [c64]> for Operand<'a> {
    #[inline]
    fn from(slice: &'a [c64]) -> Self {
        Operand::Slice(slice)
    }
}

impl<'a> From<&'a mut [c64]> for Operand<'a> {
    #[inline]
    fn from(slice: &'a mut [c64]) -> Self {
        Operand::Slice(slice)
    }
}

impl<'a> From<&'a Vec<c64>> for Operand<'a> {
    #[inline]
    fn from(vec: &'a Vec<c64>) -> Self {
        Operand::Slice(vec)
    }
}

impl<'a, const N: usize> From<&'a [c64; N]> for Operand<'a> {
    #[inline]
    fn from(array: &'a [c64; N]) -> Self {
        Operand::Slice(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_codes() {
        assert_eq!(Norm::try_from('1'), Ok(Norm::One));
        assert_eq!(Norm::try_from('o'), Ok(Norm::One));
        assert_eq!(Norm::try_from('I'), Ok(Norm::Infinity));
        assert_eq!(Norm::try_from('m'), Ok(Norm::MaxAbs));
        assert_eq!(Norm::try_from('E'), Ok(Norm::Frobenius));
        assert_eq!(
            Norm::try_from('x'),
            Err(LinalgError::UnsupportedNormKind('x'))
        );
    }

    #[test]
    fn operand_resolution() {
        let output = [c64::new(1.0, 2.0), c64::new(3.0, 4.0)];
        let other = [c64::new(5.0, 0.0)];

        let mut storage = Vec::new();
        assert_eq!(
            Operand::from(&other).or_clone_of(&output, &mut storage),
            &other
        );
        let mut storage = Vec::new();
        assert_eq!(Operand::Output.or_clone_of(&output, &mut storage), &output);

        assert_eq!(Operand::Output.distinct(), Err(LinalgError::AliasedBuffers));
        assert!(Operand::from(&other).distinct().is_ok());
    }

    #[test]
    fn transpose_flags() {
        assert!(!Transpose::NoTrans.is_transposed());
        assert!(Transpose::Trans.is_transposed());
        assert!(!Transpose::Trans.is_conjugated());
        assert!(Transpose::ConjTrans.is_transposed() && Transpose::ConjTrans.is_conjugated());
    }
}
