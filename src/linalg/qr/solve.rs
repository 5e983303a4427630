use crate::c64;
use num_traits::Zero;

/// Computes the least squares solution `x` of `Q·R·x = b` for one right-hand side.
///
/// `q` holds at least `n` columns of the `m × m` unitary factor (with columns of length `m`), and
/// `r` is the upper triangular factor stored with columns of length `r_rows`.
pub fn solve(q: &[c64], r: &[c64], m: usize, n: usize, r_rows: usize, b: &[c64], x: &mut [c64]) {
    equator::debug_assert!(all(b.len() == m, x.len() == n));

    // y = Q^H·b, truncated to the first n rows
    for (i, x) in x.iter_mut().enumerate() {
        let q_i = &q[i * m..(i + 1) * m];
        *x = q_i.iter().zip(b).map(|(q, b)| q.conj() * b).sum();
    }

    for k in (0..n).rev() {
        x[k] /= r[k * r_rows + k];
        let xk = x[k];
        if xk.is_zero() {
            continue;
        }
        for i in 0..k {
            x[i] -= xk * r[k * r_rows + i];
        }
    }
}
