use crate::{
    c64,
    linalg::householder::{
        apply_householder_on_the_left, apply_householder_on_the_right, make_householder_in_place,
    },
    mat::MatMut,
    utils::set_identity,
    Parallelism,
};
use num_traits::Zero;

/// Reduces the `n × n` matrix `a` to upper Hessenberg form `H = Q^H·A·Q` in place, and stores
/// the unitary `Q` in `q`.
pub fn make_hessenberg_in_place(
    a: &mut [c64],
    n: usize,
    q: &mut [c64],
    parallelize_columns: usize,
    parallelism: Parallelism,
) {
    equator::assert!(all(a.len() == n * n, q.len() == n * n));
    set_identity(q, n);

    for k in 0..n.saturating_sub(2) {
        let mut v = a[k * n + k + 1..(k + 1) * n].to_vec();
        let (beta, _) = make_householder_in_place(&mut v);

        let col = &mut a[k * n + k + 1..(k + 1) * n];
        col.fill(c64::zero());
        col[0] = beta;

        // H·A, rows and columns below and right of the reflected column
        let (_, _, _, trailing) =
            MatMut::from_column_major_slice_mut(a, n, n).split_at_mut(k + 1, k + 1);
        apply_householder_on_the_left(&v, trailing, parallelize_columns, parallelism);

        // A·H, every row
        let (_, _, _, right) = MatMut::from_column_major_slice_mut(a, n, n).split_at_mut(0, k + 1);
        apply_householder_on_the_right(&v, right);

        let (_, _, _, right) = MatMut::from_column_major_slice_mut(q, n, n).split_at_mut(0, k + 1);
        apply_householder_on_the_right(&v, right);
    }
}
