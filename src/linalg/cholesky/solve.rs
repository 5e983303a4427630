use crate::c64;

/// Solves `L·L^H·x = b` in place, where `l` holds the `n × n` Cholesky factor.
pub fn solve_in_place(l: &[c64], n: usize, b: &mut [c64]) {
    equator::debug_assert!(all(l.len() == n * n, b.len() == n));

    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[k * n + i] * b[k];
        }
        b[i] = sum / l[i * n + i];
    }

    for i in (0..n).rev() {
        let mut sum = b[i];
        for k in i + 1..n {
            sum -= l[i * n + k].conj() * b[k];
        }
        b[i] = sum / l[i * n + i].conj();
    }
}
