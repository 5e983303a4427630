use crate::{
    c64,
    linalg::householder::{apply_householder_on_the_left, make_householder_in_place},
    mat::MatMut,
    Parallelism,
};
use num_traits::Zero;

/// Reduces the `m × n` matrix `r` to upper trapezoidal form with Householder reflections.
///
/// The reflector of step `i` is stored in rows `i..m` of column `i` of the `m × min(m, n)` matrix
/// `householder`, and its LAPACK-style scalar in `tau[i]`.
pub fn qr_in_place(
    r: &mut [c64],
    m: usize,
    n: usize,
    householder: &mut [c64],
    tau: &mut [c64],
    parallelize_columns: usize,
    parallelism: Parallelism,
) {
    let size = Ord::min(m, n);
    equator::assert!(all(
        r.len() == m * n,
        householder.len() == m * size,
        tau.len() >= size,
    ));

    householder.fill(c64::zero());
    for i in 0..size {
        let v = &mut householder[i * m + i..(i + 1) * m];
        v.copy_from_slice(&r[i * m + i..(i + 1) * m]);
        let (beta, tau_i) = make_householder_in_place(v);
        tau[i] = c64::new(tau_i, 0.0);

        r[i * m + i] = beta;
        r[i * m + i + 1..(i + 1) * m].fill(c64::zero());

        let (_, _, _, trailing) = MatMut::from_column_major_slice_mut(r, m, n).split_at_mut(i, i + 1);
        apply_householder_on_the_left(v, trailing, parallelize_columns, parallelism);
    }
}

/// Applies the reflectors stored in `householder` to the `m × q_cols` matrix `q`, which must
/// initially hold the first `q_cols` columns of the identity, yielding the first `q_cols` columns
/// of the unitary factor.
pub fn accumulate_q(
    householder: &[c64],
    m: usize,
    size: usize,
    q: &mut [c64],
    q_cols: usize,
    parallelize_columns: usize,
    parallelism: Parallelism,
) {
    equator::assert!(all(householder.len() == m * size, q.len() == m * q_cols));

    for i in (0..Ord::min(size, q_cols)).rev() {
        let v = &householder[i * m + i..(i + 1) * m];
        let (_, _, _, trailing) = MatMut::from_column_major_slice_mut(q, m, q_cols).split_at_mut(i, i);
        apply_householder_on_the_left(v, trailing, parallelize_columns, parallelism);
    }
}
