use core::fmt;

/// Errors reported by the routines of this crate.
///
/// On failure, buffers that a routine factors in place may already be partially overwritten and
/// must be treated as invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinalgError {
    /// A buffer does not have the length implied by the dimensions passed alongside it.
    DimensionMismatch {
        /// Name of the offending argument.
        operand: &'static str,
        /// Length implied by the dimensions.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// An input was given as the output buffer of a routine that cannot work in place.
    AliasedBuffers,
    /// The routine requires at least as many rows as columns.
    RowsLessThanColumns { rows: usize, cols: usize },
    /// The Cholesky factorization met a pivot whose real part is not positive.
    NotPositiveDefinite {
        /// The dimension of the first square non positive-definite top-left corner of the input
        /// matrix.
        non_positive_definite_minor: usize,
    },
    /// The character is not a known norm code.
    UnsupportedNormKind(char),
    /// An iterative algorithm exhausted its iteration budget.
    NoConvergence { iterations: usize },
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch {
                operand,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch for `{operand}`: expected length {expected}, found {found}"
            ),
            Self::AliasedBuffers => write!(f, "input and output buffers must be distinct"),
            Self::RowsLessThanColumns { rows, cols } => {
                write!(f, "matrix has fewer rows ({rows}) than columns ({cols})")
            }
            Self::NotPositiveDefinite {
                non_positive_definite_minor,
            } => write!(
                f,
                "matrix is not positive definite: leading minor of order {non_positive_definite_minor} is not positive"
            ),
            Self::UnsupportedNormKind(code) => write!(f, "unsupported norm kind {code:?}"),
            Self::NoConvergence { iterations } => {
                write!(f, "algorithm did not converge after {iterations} iterations")
            }
        }
    }
}

impl std::error::Error for LinalgError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, LinalgError>;

/// Checks that a buffer holds exactly `expected` elements.
#[inline]
pub(crate) fn check_len(operand: &'static str, found: usize, expected: usize) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(LinalgError::DimensionMismatch {
            operand,
            expected,
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let err = check_len("b", 3, 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dimension mismatch for `b`: expected length 4, found 3"
        );
        assert!(check_len("b", 4, 4).is_ok());
        assert_eq!(
            LinalgError::NotPositiveDefinite {
                non_positive_definite_minor: 2
            }
            .to_string(),
            "matrix is not positive definite: leading minor of order 2 is not positive"
        );
    }
}
