use crate::{
    c64,
    linalg::householder::{apply_householder_on_the_right, make_householder_in_place},
    mat::MatMut,
    utils::{
        phase, set_identity,
        thread::{for_each_col_mut, for_each_indexed_mut},
    },
    Parallelism,
};
use num_traits::{One, Zero};

/// Reduces the `n × n` Hermitian matrix `a` to a real symmetric tridiagonal matrix `T`, such that
/// `A = Q·T·Q^H`.
///
/// Returns the diagonal and subdiagonal of `T`, whose subdiagonal is non-negative. `a` is
/// destroyed and `q` receives the unitary `Q`.
pub fn tridiagonalize(
    a: &mut [c64],
    n: usize,
    q: &mut [c64],
    parallelism: Parallelism,
) -> (Vec<f64>, Vec<f64>) {
    equator::assert!(all(a.len() == n * n, q.len() == n * n));
    set_identity(q, n);

    let mut p = vec![c64::zero(); n];
    for k in 0..n.saturating_sub(2) {
        let m = n - k - 1;
        let mut v = a[k * n + k + 1..(k + 1) * n].to_vec();
        let (beta, _) = make_householder_in_place(&mut v);

        {
            let col = &mut a[k * n + k + 1..(k + 1) * n];
            col.fill(c64::zero());
            col[0] = beta;
        }
        for j in k + 1..n {
            a[j * n + k] = c64::zero();
        }
        a[(k + 1) * n + k] = beta.conj();

        // H·A22·H = A22 - v·w^H - w·v^H, with p = A22·v and w = p - (v^H·p / 2)·v
        let p = &mut p[..m];
        {
            let a = &*a;
            let v = &v;
            for_each_indexed_mut(
                p,
                |i, _| {
                    (0..m)
                        .map(|j| a[(k + 1 + j) * n + k + 1 + i] * v[j])
                        .sum()
                },
                parallelism,
            );
        }
        let half_alpha = v.iter().zip(p.iter()).map(|(v, p)| v.conj() * p).sum::<c64>().re * 0.5;
        let w: Vec<c64> = p.iter().zip(&v).map(|(p, v)| p - v * half_alpha).collect();

        let offset = (k + 1) * n;
        for_each_col_mut(
            &mut a[offset..],
            n,
            |j, col| {
                let (vj, wj) = (v[j].conj(), w[j].conj());
                for (i, x) in col[k + 1..].iter_mut().enumerate() {
                    *x -= v[i] * wj + w[i] * vj;
                }
            },
            parallelism,
        );

        let (_, _, _, right) = MatMut::from_column_major_slice_mut(q, n, n).split_at_mut(0, k + 1);
        apply_householder_on_the_right(&v, right);
    }

    let diag: Vec<f64> = (0..n).map(|i| a[i * n + i].re).collect();
    let mut offdiag = Vec::with_capacity(n.saturating_sub(1));

    // T = D·T_real·D^H with D unitary diagonal, so Q·D becomes the new Q
    let mut d = c64::one();
    for k in 0..n {
        if k > 0 {
            let e = a[(k - 1) * n + k];
            offdiag.push(e.norm());
            d *= phase(e);
        }
        if d != c64::one() {
            for x in &mut q[k * n..(k + 1) * n] {
                *x *= d;
            }
        }
    }

    (diag, offdiag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn tridiagonal() {
        for n in [0, 1, 2, 3, 8, 31] {
            let a = random_hermitian(n);
            let mut work = a.clone();
            let mut q = vec![c64::zero(); n * n];
            let (diag, offdiag) = tridiagonalize(&mut work, n, &mut q, Parallelism::Rayon(0));

            assert_eq!(diag.len(), n);
            assert_eq!(offdiag.len(), n.saturating_sub(1));
            assert!(offdiag.iter().all(|e| *e >= 0.0));
            assert_orthonormal_columns(&q, n, n, 1e-10);

            let mut t = vec![c64::zero(); n * n];
            for i in 0..n {
                t[i * n + i] = c64::new(diag[i], 0.0);
                if i + 1 < n {
                    t[i * n + i + 1] = c64::new(offdiag[i], 0.0);
                    t[(i + 1) * n + i] = c64::new(offdiag[i], 0.0);
                }
            }
            let qtqh = mul(&mul(&q, n, n, &t, n), n, n, &adjoint(&q, n, n), n);
            assert_close(&qtqh, &a, 1e-10);
        }
    }
}
