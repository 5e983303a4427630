//! Matrix multiplication.
//!
//! The product is computed by a cache-oblivious recursion: the three dimensions are halved until
//! the blocks are small enough for a direct triple loop. The eight block products of a split are
//! issued in two batches of four, grouped by the half of the inner dimension they consume, so that
//! the products running concurrently always write to disjoint quadrants of the destination.

use crate::{
    c64,
    error::check_len,
    mat::{MatMut, MatRef},
    utils::thread::{join_raw, parallelism_degree},
    LinalgError, Operand, Parallelism, Provider, Result, Transpose,
};
use num_traits::{One, Zero};
use reborrow::*;

/// Matrix view together with the transposition applied when reading it.
#[derive(Copy, Clone)]
pub struct OpRef<'a> {
    pub mat: MatRef<'a>,
    pub trans: Transpose,
}

impl<'a> OpRef<'a> {
    #[inline]
    pub fn new(mat: MatRef<'a>, trans: Transpose) -> Self {
        Self { mat, trans }
    }

    /// Number of rows of `op(A)`.
    #[inline]
    pub fn nrows(&self) -> usize {
        if self.trans.is_transposed() {
            self.mat.ncols()
        } else {
            self.mat.nrows()
        }
    }

    /// Number of columns of `op(A)`.
    #[inline]
    pub fn ncols(&self) -> usize {
        if self.trans.is_transposed() {
            self.mat.nrows()
        } else {
            self.mat.ncols()
        }
    }

    /// Splits `op(A)` into four blocks at row `i` and column `j` of `op(A)`.
    #[inline]
    fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        let trans = self.trans;
        let op = move |mat| Self { mat, trans };
        if trans.is_transposed() {
            let (top_left, top_right, bot_left, bot_right) = self.mat.split_at(j, i);
            (op(top_left), op(bot_left), op(top_right), op(bot_right))
        } else {
            let (top_left, top_right, bot_left, bot_right) = self.mat.split_at(i, j);
            (op(top_left), op(top_right), op(bot_left), op(bot_right))
        }
    }
}

#[inline(always)]
fn accumulate(
    mut dst: MatMut<'_>,
    depth: usize,
    alpha: c64,
    lhs: impl Fn(usize, usize) -> c64,
    rhs: impl Fn(usize, usize) -> c64,
) {
    let (m, n) = (dst.nrows(), dst.ncols());
    for j in 0..n {
        for l in 0..depth {
            let b = alpha * rhs(l, j);
            if b.is_zero() {
                continue;
            }
            for i in 0..m {
                dst.add_assign(i, j, lhs(i, l) * b);
            }
        }
    }
}

/// Computes `dst += alpha * op(lhs) * op(rhs)` with a triple loop.
pub fn matmul_direct(dst: MatMut<'_>, lhs: OpRef<'_>, rhs: OpRef<'_>, alpha: c64) {
    use Transpose::*;

    let depth = lhs.ncols();
    let (a, b) = (lhs.mat, rhs.mat);
    match (lhs.trans, rhs.trans) {
        (NoTrans, NoTrans) => accumulate(dst, depth, alpha, |i, l| a.read(i, l), |l, j| b.read(l, j)),
        (NoTrans, Trans) => accumulate(dst, depth, alpha, |i, l| a.read(i, l), |l, j| b.read(j, l)),
        (NoTrans, ConjTrans) => accumulate(
            dst,
            depth,
            alpha,
            |i, l| a.read(i, l),
            |l, j| b.read(j, l).conj(),
        ),
        (Trans, NoTrans) => accumulate(dst, depth, alpha, |i, l| a.read(l, i), |l, j| b.read(l, j)),
        (Trans, Trans) => accumulate(dst, depth, alpha, |i, l| a.read(l, i), |l, j| b.read(j, l)),
        (Trans, ConjTrans) => accumulate(
            dst,
            depth,
            alpha,
            |i, l| a.read(l, i),
            |l, j| b.read(j, l).conj(),
        ),
        (ConjTrans, NoTrans) => accumulate(
            dst,
            depth,
            alpha,
            |i, l| a.read(l, i).conj(),
            |l, j| b.read(l, j),
        ),
        (ConjTrans, Trans) => accumulate(
            dst,
            depth,
            alpha,
            |i, l| a.read(l, i).conj(),
            |l, j| b.read(j, l),
        ),
        (ConjTrans, ConjTrans) => accumulate(
            dst,
            depth,
            alpha,
            |i, l| a.read(l, i).conj(),
            |l, j| b.read(j, l).conj(),
        ),
    }
}

/// Computes `dst += alpha * op(lhs) * op(rhs)`.
///
/// Blocks with `m + n <= order`, or with any dimension equal to one, are computed directly.
/// Only the outermost split fans out across threads.
pub fn matmul(
    dst: MatMut<'_>,
    lhs: OpRef<'_>,
    rhs: OpRef<'_>,
    alpha: c64,
    order: usize,
    parallelism: Parallelism,
) {
    let mut dst = dst;
    let (m, n, k) = (dst.nrows(), dst.ncols(), lhs.ncols());
    equator::assert!(all(lhs.nrows() == m, rhs.ncols() == n, rhs.nrows() == k));

    if m == 0 || n == 0 || k == 0 {
        return;
    }
    if m + n <= order || m == 1 || n == 1 || k == 1 {
        matmul_direct(dst, lhs, rhs, alpha);
        return;
    }

    if parallelism_degree(parallelism) > 1 {
        log::debug!(target: "fallback_linalg", "matmul {m}x{k}x{n}: fanning out");
    }

    let (m2, n2, k2) = (m / 2, n / 2, k / 2);
    let (a11, a12, a21, a22) = lhs.split_at(m2, k2);
    let (b11, b12, b21, b22) = rhs.split_at(k2, n2);
    let (mut c11, mut c12, mut c21, mut c22) = dst.rb_mut().split_at_mut(m2, n2);

    for (a1, a2, b1, b2) in [(a11, a21, b11, b12), (a12, a22, b21, b22)] {
        join_raw(
            |parallelism| {
                join_raw(
                    |_| matmul(c11.rb_mut(), a1, b1, alpha, order, Parallelism::None),
                    |_| matmul(c12.rb_mut(), a1, b2, alpha, order, Parallelism::None),
                    parallelism,
                )
            },
            |parallelism| {
                join_raw(
                    |_| matmul(c21.rb_mut(), a2, b1, alpha, order, Parallelism::None),
                    |_| matmul(c22.rb_mut(), a2, b2, alpha, order, Parallelism::None),
                    parallelism,
                )
            },
            parallelism,
        );
    }
}

#[inline]
fn operand_len(operand: Operand<'_>, output_len: usize) -> usize {
    match operand {
        Operand::Slice(slice) => slice.len(),
        Operand::Output => output_len,
    }
}

impl Provider {
    /// Computes `result = x * y`, where `x` is `rows_x × cols_x` and `y` is `rows_y × cols_y`.
    pub fn matrix_multiply<'a>(
        &self,
        x: impl Into<Operand<'a>>,
        rows_x: usize,
        cols_x: usize,
        y: impl Into<Operand<'a>>,
        rows_y: usize,
        cols_y: usize,
        result: &mut [c64],
    ) -> Result<()> {
        self.matrix_multiply_with_update(
            Transpose::NoTrans,
            Transpose::NoTrans,
            c64::one(),
            x,
            rows_x,
            cols_x,
            y,
            rows_y,
            cols_y,
            c64::zero(),
            result,
        )
    }

    /// Computes `c = alpha * op(a) * op(b) + beta * c`.
    ///
    /// `a` is stored as a `rows_a × cols_a` matrix and `b` as a `rows_b × cols_b` matrix, so
    /// that `op(a)` is `m × k` and `op(b)` is `k × n` once the transpositions are applied. `c`
    /// must hold `m × n` elements. Either operand may be [`Operand::Output`], in which case a copy
    /// of `c` taken before the update is used.
    pub fn matrix_multiply_with_update<'a>(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        alpha: c64,
        a: impl Into<Operand<'a>>,
        rows_a: usize,
        cols_a: usize,
        b: impl Into<Operand<'a>>,
        rows_b: usize,
        cols_b: usize,
        beta: c64,
        c: &mut [c64],
    ) -> Result<()> {
        let (a, b) = (a.into(), b.into());
        check_len("a", operand_len(a, c.len()), rows_a * cols_a)?;
        check_len("b", operand_len(b, c.len()), rows_b * cols_b)?;

        let (m, k) = if trans_a.is_transposed() {
            (cols_a, rows_a)
        } else {
            (rows_a, cols_a)
        };
        let (k_b, n) = if trans_b.is_transposed() {
            (cols_b, rows_b)
        } else {
            (rows_b, cols_b)
        };
        if k != k_b {
            return Err(LinalgError::DimensionMismatch {
                operand: "b",
                expected: k,
                found: k_b,
            });
        }
        check_len("c", c.len(), m * n)?;

        if alpha.is_zero() && beta.is_zero() {
            c.fill(c64::zero());
            return Ok(());
        }

        let mut a_storage = Vec::new();
        let mut b_storage = Vec::new();
        let a = a.or_clone_of(c, &mut a_storage);
        let b = b.or_clone_of(c, &mut b_storage);

        if beta.is_zero() {
            c.fill(c64::zero());
        } else if !beta.is_one() {
            c.iter_mut().for_each(|c| *c *= beta);
        }
        if alpha.is_zero() {
            return Ok(());
        }

        matmul(
            MatMut::from_column_major_slice_mut(c, m, n),
            OpRef::new(MatRef::from_column_major_slice(a, rows_a, cols_a), trans_a),
            OpRef::new(MatRef::from_column_major_slice(b, rows_b, cols_b), trans_b),
            alpha,
            self.config().parallelize_order,
            self.config().parallelism,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::*, Config};

    fn op(a: &[c64], rows: usize, cols: usize, trans: Transpose) -> Vec<c64> {
        match trans {
            Transpose::NoTrans => a.to_vec(),
            Transpose::Trans => transpose(a, rows, cols),
            Transpose::ConjTrans => adjoint(a, rows, cols),
        }
    }

    #[test]
    fn multiply_by_identity() {
        let provider = Provider::default();
        let (m, n) = (7, 5);
        let a = random_mat(m, n);
        let mut c = vec![c64::zero(); m * n];
        provider
            .matrix_multiply(&a, m, n, &identity(n), n, n, &mut c)
            .unwrap();
        assert_close(&c, &a, 1e-14);
    }

    #[test]
    fn every_transpose_combination() {
        use Transpose::*;
        let modes = [NoTrans, Trans, ConjTrans];
        let alpha = c64::new(0.5, 1.5);
        let beta = c64::new(-1.0, 0.25);

        for config in [
            Config::sequential().with_parallelize_order(8),
            Config::default()
                .with_parallelize_order(8)
                .with_parallelism(Parallelism::Rayon(4)),
            Config::default(),
        ] {
            let provider = Provider::new(config);
            for (m, n, k) in [(1, 1, 1), (3, 4, 5), (17, 9, 23), (40, 33, 65)] {
                for ta in modes {
                    for tb in modes {
                        let (rows_a, cols_a) = if ta.is_transposed() { (k, m) } else { (m, k) };
                        let (rows_b, cols_b) = if tb.is_transposed() { (n, k) } else { (k, n) };
                        let a = random_mat(rows_a, cols_a);
                        let b = random_mat(rows_b, cols_b);
                        let c0 = random_mat(m, n);

                        let prod = mul(&op(&a, rows_a, cols_a, ta), m, k, &op(&b, rows_b, cols_b, tb), n);
                        let expected: Vec<c64> =
                            prod.iter().zip(&c0).map(|(p, c)| alpha * p + beta * c).collect();

                        let mut c = c0.clone();
                        provider
                            .matrix_multiply_with_update(
                                ta, tb, alpha, &a, rows_a, cols_a, &b, rows_b, cols_b, beta, &mut c,
                            )
                            .unwrap();
                        assert_close(&c, &expected, 1e-10);
                    }
                }
            }
        }
    }

    #[test]
    fn scalar_special_cases() {
        let provider = Provider::default();
        let a = random_mat(3, 3);
        let b = random_mat(3, 3);
        let c0 = random_mat(3, 3);

        let mut c = c0.clone();
        provider
            .matrix_multiply_with_update(
                Transpose::NoTrans,
                Transpose::NoTrans,
                c64::zero(),
                &a,
                3,
                3,
                &b,
                3,
                3,
                c64::one(),
                &mut c,
            )
            .unwrap();
        assert_eq!(c, c0);

        provider
            .matrix_multiply_with_update(
                Transpose::NoTrans,
                Transpose::NoTrans,
                c64::zero(),
                &a,
                3,
                3,
                &b,
                3,
                3,
                c64::zero(),
                &mut c,
            )
            .unwrap();
        assert!(c.iter().all(|c| c.is_zero()));
    }

    #[test]
    fn aliased_operand_is_copied() {
        let provider = Provider::new(Config::default().with_parallelize_order(4));
        let n = 12;
        let a = random_mat(n, n);
        let mut c = random_mat(n, n);
        let expected = mul(&c, n, n, &a, n);

        provider
            .matrix_multiply(Operand::Output, n, n, &a, n, n, &mut c)
            .unwrap();
        assert_close(&c, &expected, 1e-12);

        let mut c = random_mat(n, n);
        let expected = mul(&c, n, n, &c, n);
        provider
            .matrix_multiply(Operand::Output, n, n, Operand::Output, n, n, &mut c)
            .unwrap();
        assert_close(&c, &expected, 1e-12);
    }

    #[test]
    fn empty_inner_dimension() {
        let provider = Provider::default();
        let empty: Vec<c64> = Vec::new();
        let mut c = random_mat(2, 3);
        provider
            .matrix_multiply(&empty, 2, 0, &empty, 0, 3, &mut c)
            .unwrap();
        assert!(c.iter().all(|c| c.is_zero()));
    }

    #[test]
    fn shape_mismatch() {
        let provider = Provider::default();
        let a = random_mat(2, 3);
        let b = random_mat(2, 3);
        let mut c = vec![c64::zero(); 6];
        assert_eq!(
            provider.matrix_multiply(&a, 2, 3, &b, 2, 3, &mut c),
            Err(LinalgError::DimensionMismatch {
                operand: "b",
                expected: 3,
                found: 2
            })
        );
        assert!(provider
            .matrix_multiply_with_update(
                Transpose::NoTrans,
                Transpose::ConjTrans,
                c64::one(),
                &a,
                2,
                3,
                &b,
                2,
                3,
                c64::zero(),
                &mut c[..4],
            )
            .is_ok());
        assert!(provider.matrix_multiply(&a, 3, 3, &b, 3, 2, &mut c).is_err());
    }
}
