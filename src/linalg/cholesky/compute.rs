use crate::{
    c64,
    utils::thread::{join_raw, parallelism_degree},
    LinalgError, Parallelism, Result,
};
use num_traits::Zero;

/// Subtracts `mult·mult^H` from the lower part of the columns `first..` of an `n × n` matrix.
///
/// `cols` starts at column `first`. Above `parallelize_columns` columns, the first third of the
/// columns is updated concurrently with the rest.
fn rank_one_update(
    cols: &mut [c64],
    first: usize,
    n: usize,
    mult: &[c64],
    parallelize_columns: usize,
    parallelism: Parallelism,
) {
    let count = cols.len() / n;
    if count > parallelize_columns && parallelism_degree(parallelism) > 1 {
        let split = Ord::max(count / 3, 1);
        let (left, right) = cols.split_at_mut(split * n);
        join_raw(
            |parallelism| rank_one_update(left, first, n, mult, parallelize_columns, parallelism),
            |parallelism| {
                rank_one_update(right, first + split, n, mult, parallelize_columns, parallelism)
            },
            parallelism,
        );
        return;
    }

    for (offset, col) in cols.chunks_exact_mut(n).enumerate() {
        let j = first + offset;
        let mult_j = mult[j].conj();
        for i in j..n {
            col[i] -= mult[i] * mult_j;
        }
    }
}

/// Computes the Cholesky factor `L` of the `n × n` Hermitian positive definite matrix stored in
/// `data`, such that `A = L·L^H`.
///
/// Only the lower triangular part of the input is read. On success, `data` holds `L` with its
/// strictly upper part set to zero.
pub fn cholesky_in_place(
    data: &mut [c64],
    n: usize,
    parallelize_columns: usize,
    parallelism: Parallelism,
) -> Result<()> {
    equator::assert!(data.len() == n * n);

    let mut mult = vec![c64::zero(); n];
    for ij in 0..n {
        let pivot = data[ij * n + ij];
        if pivot.re <= 0.0 || pivot.re.is_nan() {
            return Err(LinalgError::NotPositiveDefinite {
                non_positive_definite_minor: ij + 1,
            });
        }

        let diag = pivot.sqrt();
        data[ij * n + ij] = diag;
        for i in ij + 1..n {
            data[ij * n + i] /= diag;
            mult[i] = data[ij * n + i];
        }

        let (_, trailing) = data.split_at_mut((ij + 1) * n);
        rank_one_update(trailing, ij + 1, n, &mult, parallelize_columns, parallelism);
    }

    for j in 1..n {
        data[j * n..j * n + j].fill(c64::zero());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn parallel_update_matches_sequential() {
        let n = 40;
        let a = random_hpd(n);
        let mut seq = a.clone();
        let mut par = a.clone();
        cholesky_in_place(&mut seq, n, usize::MAX, Parallelism::None).unwrap();
        cholesky_in_place(&mut par, n, 2, Parallelism::Rayon(4)).unwrap();
        assert_close(&par, &seq, 1e-12);
    }

    #[test]
    fn reports_failing_minor() {
        // [[1, 2], [2, 1]] has a negative second leading minor
        let mut data = [
            c64::new(1.0, 0.0),
            c64::new(2.0, 0.0),
            c64::new(2.0, 0.0),
            c64::new(1.0, 0.0),
        ];
        assert_eq!(
            cholesky_in_place(&mut data, 2, usize::MAX, Parallelism::None),
            Err(LinalgError::NotPositiveDefinite {
                non_positive_definite_minor: 2
            })
        );
    }
}
