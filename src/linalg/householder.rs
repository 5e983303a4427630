//! Householder reflections.
//!
//! A Householder reflection is a linear transformation that describes a reflection about a
//! hyperplane that crosses the origin of the space.
//!
//! The reflectors built here are stored as a vector $v$ with $v^H v = 2$, so that the
//! transformation is simply $$H = I - vv^H,$$ which is both Hermitian and unitary.
//! Alongside $v$, [`make_householder_in_place`] reports the LAPACK-style scalar $\tau$ of the
//! reflector written as $I - \tau u u^H$ with $u_0 = 1$.

use crate::{
    c64,
    mat::MatMut,
    utils::{norm_l2, phase, thread::join_raw},
    Parallelism,
};
use num_traits::Zero;

/// Overwrites `x` with the vector $v$ of the reflection $H = I - vv^H$ such that $Hx = \beta e_0$.
///
/// Returns $(\beta, \tau)$. The sign of $\beta$ is chosen opposite to the phase of $x_0$ to avoid
/// cancellation.
pub fn make_householder_in_place(x: &mut [c64]) -> (c64, f64) {
    let norm = norm_l2(x);
    if x.len() <= 1 || norm == 0.0 {
        let beta = x.first().map_or(c64::zero(), |x0| -*x0);
        x.fill(c64::zero());
        if let Some(x0) = x.first_mut() {
            *x0 = c64::new(core::f64::consts::SQRT_2, 0.0);
        }
        return (beta, 2.0);
    }

    let alpha = phase(x[0]) * norm;
    let inv_alpha = alpha.inv();
    for x in x.iter_mut() {
        *x *= inv_alpha;
    }
    x[0] += 1.0;

    let tau = x[0].re;
    let scale = tau.sqrt().recip();
    for x in x.iter_mut() {
        *x *= scale;
    }
    (-alpha, tau)
}

/// Computes $A \leftarrow (I - vv^H) A$, where the rows of `matrix` match the entries of `v`.
///
/// The columns are split in halves across threads while there are more than
/// `parallelize_columns` of them.
pub fn apply_householder_on_the_left(
    v: &[c64],
    matrix: MatMut<'_>,
    parallelize_columns: usize,
    parallelism: Parallelism,
) {
    let mut matrix = matrix;
    let ncols = matrix.ncols();
    if ncols == 0 {
        return;
    }
    equator::assert!(matrix.nrows() == v.len());

    if parallelism != Parallelism::None && ncols > Ord::max(parallelize_columns, 1) {
        let (_, left, _, right) = matrix.split_at_mut(0, ncols / 2);
        join_raw(
            |parallelism| apply_householder_on_the_left(v, left, parallelize_columns, parallelism),
            |parallelism| apply_householder_on_the_left(v, right, parallelize_columns, parallelism),
            parallelism,
        );
        return;
    }

    for j in 0..ncols {
        let mut dot = c64::zero();
        for (i, v) in v.iter().enumerate() {
            dot += v.conj() * matrix.read(i, j);
        }
        if dot.is_zero() {
            continue;
        }
        for (i, v) in v.iter().enumerate() {
            matrix.add_assign(i, j, -(v * dot));
        }
    }
}

/// Computes $A \leftarrow A (I - vv^H)$, where the columns of `matrix` match the entries of `v`.
pub fn apply_householder_on_the_right(v: &[c64], matrix: MatMut<'_>) {
    let mut matrix = matrix;
    equator::assert!(matrix.ncols() == v.len());

    for i in 0..matrix.nrows() {
        let mut dot = c64::zero();
        for (j, v) in v.iter().enumerate() {
            dot += matrix.read(i, j) * v;
        }
        if dot.is_zero() {
            continue;
        }
        for (j, v) in v.iter().enumerate() {
            matrix.add_assign(i, j, -(dot * v.conj()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mat::MatMut, test_utils::*};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn reflects_onto_first_axis() {
        for n in [1, 2, 5, 13] {
            let x = random_mat(n, 1);
            let mut v = x.clone();
            let (beta, tau) = make_householder_in_place(&mut v);

            assert_approx_eq!(beta.norm(), norm_l2(&x), 1e-12);
            assert_approx_eq!(norm_l2(&v).powi(2), 2.0, 1e-12);
            assert!((1.0..=2.0).contains(&tau));

            let mut y = x.clone();
            apply_householder_on_the_left(
                &v,
                MatMut::from_column_major_slice_mut(&mut y, n, 1),
                200,
                Parallelism::None,
            );
            assert_approx_eq!((y[0] - beta).norm(), 0.0, 1e-12);
            for y in &y[1..] {
                assert_approx_eq!(y.norm(), 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn zero_vector() {
        let mut v = vec![c64::zero(); 3];
        let (beta, tau) = make_householder_in_place(&mut v);
        assert_eq!(beta, c64::zero());
        assert_eq!(tau, 2.0);
        assert_approx_eq!(v[0].re, core::f64::consts::SQRT_2);
    }

    #[test]
    fn left_and_right_are_adjoint() {
        let n = 6;
        let ncols = 43;
        let mut v = random_mat(n, 1);
        make_householder_in_place(&mut v);

        let a = random_mat(n, ncols);
        let mut left_seq = a.clone();
        let mut left_par = a.clone();
        apply_householder_on_the_left(
            &v,
            MatMut::from_column_major_slice_mut(&mut left_seq, n, ncols),
            200,
            Parallelism::None,
        );
        apply_householder_on_the_left(
            &v,
            MatMut::from_column_major_slice_mut(&mut left_par, n, ncols),
            4,
            Parallelism::Rayon(4),
        );
        assert_close(&left_par, &left_seq, 1e-12);

        // (H A)^H = A^H H
        let mut right = adjoint(&a, n, ncols);
        apply_householder_on_the_right(
            &v,
            MatMut::from_column_major_slice_mut(&mut right, ncols, n),
        );
        assert_close(&adjoint(&right, ncols, n), &left_seq, 1e-12);
    }
}
