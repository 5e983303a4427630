use crate::c64;
use num_traits::Zero;

/// Computes the LU factorization with partial pivoting of the `n × n` matrix stored in `data`,
/// using Crout's column ordering.
///
/// On exit, the strictly lower part of `data` holds the unit lower triangular factor `L`, and the
/// upper part holds `U`. `ipiv[j]` receives the row that was swapped with row `j` while processing
/// column `j`.
///
/// Returns the number of exactly zero pivots met. Such pivots are kept as is and the entries below
/// them are left unscaled, so the subsequent solves propagate infinities and `NaN`s.
pub fn lu_in_place(data: &mut [c64], n: usize, ipiv: &mut [usize]) -> usize {
    equator::assert!(all(data.len() == n * n, ipiv.len() == n));

    for (i, p) in ipiv.iter_mut().enumerate() {
        *p = i;
    }

    let mut col = vec![c64::zero(); n];
    let mut n_zero_pivots = 0;

    for j in 0..n {
        col.copy_from_slice(&data[j * n..(j + 1) * n]);

        for i in 0..n {
            let k_max = Ord::min(i, j);
            let mut dot = c64::zero();
            for k in 0..k_max {
                dot += data[k * n + i] * col[k];
            }
            col[i] -= dot;
            data[j * n + i] = col[i];
        }

        let mut pivot = j;
        let mut max = data[j * n + j].norm();
        for i in j + 1..n {
            let abs = data[j * n + i].norm();
            if abs > max {
                pivot = i;
                max = abs;
            }
        }

        if pivot != j {
            for k in 0..n {
                data.swap(k * n + pivot, k * n + j);
            }
            ipiv[j] = pivot;
        }

        let diag = data[j * n + j];
        if diag.is_zero() {
            n_zero_pivots += 1;
            continue;
        }
        for x in &mut data[j * n + j + 1..(j + 1) * n] {
            *x /= diag;
        }
    }

    n_zero_pivots
}
