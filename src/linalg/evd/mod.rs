//! Eigenvalue decomposition of a square matrix.
//!
//! The eigenvalue decomposition of a square matrix $M$ of shape $(n, n)$ is a decomposition into
//! two components $U$, $S$:
//!
//! - $U$ has shape $(n, n)$ and is invertible,
//! - $S$ has shape $(n, n)$ and is a diagonal matrix,
//! - and finally:
//!
//! $$M = U S U^{-1}.$$
//!
//! If $M$ is Hermitian, then $U$ can be made unitary ($U^{-1} = U^H$), and $S$ is real valued.
//!
//! Hermitian matrices are reduced to a real tridiagonal matrix which is then diagonalized by the
//! implicit QR algorithm. General matrices are reduced to Hessenberg form, then to complex Schur
//! form, and the eigenvectors are recovered from the triangular Schur factor.

use crate::{c64, error::check_len, Provider, Result};
use num_traits::Zero;

pub mod hessenberg;
pub mod schur;
pub mod tridiag;
pub mod tridiag_qr_algorithm;

impl Provider {
    /// Computes the eigenvalue decomposition of the `order × order` matrix `matrix`.
    ///
    /// - `matrix_ev` receives the eigenvectors, one per column,
    /// - `vector_ev` receives the eigenvalues,
    /// - `matrix_d` is cleared and receives the eigenvalues on its diagonal.
    ///
    /// When `is_hermitian` is set, only Hermitian input is meaningful: the eigenvalues are real
    /// and sorted in ascending order, and the eigenvectors are orthonormal. Otherwise the
    /// eigenvalues appear in the order they are found by the Schur iteration, and each
    /// eigenvector has unit Euclidean norm.
    pub fn eigen_decomp(
        &self,
        is_hermitian: bool,
        order: usize,
        matrix: &[c64],
        matrix_ev: &mut [c64],
        vector_ev: &mut [c64],
        matrix_d: &mut [c64],
    ) -> Result<()> {
        let n = order;
        check_len("matrix", matrix.len(), n * n)?;
        check_len("matrix_ev", matrix_ev.len(), n * n)?;
        check_len("vector_ev", vector_ev.len(), n)?;
        check_len("matrix_d", matrix_d.len(), n * n)?;

        let parallelism = self.parallelism_for(n * n);
        let mut work = matrix.to_vec();

        if is_hermitian {
            let (mut diag, mut offdiag) =
                tridiag::tridiagonalize(&mut work, n, matrix_ev, parallelism);
            tridiag_qr_algorithm::compute_tridiag_real_evd_qr_algorithm(
                &mut diag,
                &mut offdiag,
                Some(matrix_ev),
                f64::EPSILON,
                f64::MIN_POSITIVE,
            )?;
            for (ev, d) in vector_ev.iter_mut().zip(&diag) {
                *ev = c64::new(*d, 0.0);
            }
        } else {
            let mut z = vec![c64::zero(); n * n];
            hessenberg::make_hessenberg_in_place(
                &mut work,
                n,
                &mut z,
                self.config().parallelize_columns,
                parallelism,
            );
            schur::compute_schur(&mut work, n, &mut z, vector_ev)?;
            schur::compute_eigenvectors(&work, &z, n, matrix_ev, parallelism);
        }

        matrix_d.fill(c64::zero());
        for (i, ev) in vector_ev.iter().enumerate() {
            matrix_d[i * n + i] = *ev;
        }
        Ok(())
    }
}
