use crate::{c64, error::check_len, Norm, Provider, Result, Transpose};
use num_traits::{One, Zero};

impl Provider {
    /// Computes the requested norm of the `rows × cols` column-major `matrix`.
    ///
    /// The Frobenius norm is obtained as `sqrt(trace(A·A^H))` through
    /// [`Provider::matrix_multiply_with_update`], using `A^H·A` instead when the matrix is tall so
    /// that the scratch product is `min(rows, cols)` square. Empty matrices have norm zero.
    pub fn matrix_norm(&self, norm: Norm, rows: usize, cols: usize, matrix: &[c64]) -> Result<f64> {
        check_len("matrix", matrix.len(), rows * cols)?;
        if matrix.is_empty() {
            return Ok(0.0);
        }

        let norm = match norm {
            Norm::One => matrix
                .chunks_exact(rows)
                .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
                .fold(0.0, f64::max),
            Norm::Infinity => {
                let mut row_sums = vec![0.0f64; rows];
                for col in matrix.chunks_exact(rows) {
                    for (sum, z) in row_sums.iter_mut().zip(col) {
                        *sum += z.norm();
                    }
                }
                row_sums.into_iter().fold(0.0, f64::max)
            }
            Norm::MaxAbs => matrix.iter().map(|z| z.norm()).fold(0.0, f64::max),
            Norm::Frobenius => {
                // trace(A·A^H) = trace(A^H·A), form the smaller of the two products
                let (trans_a, trans_b, order) = if cols < rows {
                    (Transpose::ConjTrans, Transpose::NoTrans, cols)
                } else {
                    (Transpose::NoTrans, Transpose::ConjTrans, rows)
                };
                let mut gram = vec![c64::zero(); order * order];
                self.matrix_multiply_with_update(
                    trans_a,
                    trans_b,
                    c64::one(),
                    matrix,
                    rows,
                    cols,
                    matrix,
                    rows,
                    cols,
                    c64::zero(),
                    &mut gram,
                )?;
                (0..order).map(|i| gram[i * order + i].norm()).sum::<f64>().sqrt()
            }
        };
        Ok(norm)
    }
}
