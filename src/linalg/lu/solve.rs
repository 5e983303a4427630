use crate::c64;

/// Solves `A·x = b` in place, where `lu` and `ipiv` hold the output of
/// [`lu_in_place`](super::compute::lu_in_place) for the `n × n` matrix `A`.
pub fn solve_in_place(lu: &[c64], n: usize, ipiv: &[usize], b: &mut [c64]) {
    equator::debug_assert!(all(lu.len() == n * n, ipiv.len() == n, b.len() == n));

    for (i, &p) in ipiv.iter().enumerate() {
        if p != i {
            b.swap(i, p);
        }
    }

    // L·y = P·b, unit diagonal
    for k in 0..n {
        let bk = b[k];
        for i in k + 1..n {
            b[i] -= bk * lu[k * n + i];
        }
    }

    // U·x = y
    for k in (0..n).rev() {
        b[k] /= lu[k * n + k];
        let bk = b[k];
        for i in 0..k {
            b[i] -= bk * lu[k * n + i];
        }
    }
}
