use crate::c64;
use assert_approx_eq::assert_approx_eq;
use core::cell::RefCell;
use num_traits::Zero;
use rand::prelude::*;

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(StdRng::seed_from_u64(0));
}

pub fn random_f64() -> f64 {
    RNG.with(|rng| {
        let mut rng = rng.borrow_mut();
        let rng = &mut *rng;
        rng.gen()
    })
}

pub fn random_c64() -> c64 {
    c64 {
        re: random_f64(),
        im: random_f64(),
    }
}

/// Random `nrows × ncols` column-major matrix.
pub fn random_mat(nrows: usize, ncols: usize) -> Vec<c64> {
    (0..nrows * ncols).map(|_| random_c64()).collect()
}

/// Random Hermitian positive definite matrix `B·B^H + n·I`.
pub fn random_hpd(n: usize) -> Vec<c64> {
    let b = random_mat(n, n);
    let mut a = mul(&b, n, n, &adjoint(&b, n, n), n);
    for i in 0..n {
        a[i * n + i] += c64::new(n as f64, 0.0);
    }
    a
}

/// Random Hermitian matrix.
pub fn random_hermitian(n: usize) -> Vec<c64> {
    let b = random_mat(n, n);
    let bh = adjoint(&b, n, n);
    b.iter().zip(&bh).map(|(x, y)| (x + y) * 0.5).collect()
}

pub fn identity(n: usize) -> Vec<c64> {
    let mut id = vec![c64::zero(); n * n];
    for i in 0..n {
        id[i * n + i] = c64::new(1.0, 0.0);
    }
    id
}

/// Naive product of an `m × k` and a `k × n` matrix.
pub fn mul(a: &[c64], m: usize, k: usize, b: &[c64], n: usize) -> Vec<c64> {
    let mut c = vec![c64::zero(); m * n];
    for j in 0..n {
        for depth in 0..k {
            let b = b[j * k + depth];
            for i in 0..m {
                c[j * m + i] += a[depth * m + i] * b;
            }
        }
    }
    c
}

/// Conjugate transpose of an `m × n` matrix.
pub fn adjoint(a: &[c64], m: usize, n: usize) -> Vec<c64> {
    let mut out = vec![c64::zero(); m * n];
    for j in 0..n {
        for i in 0..m {
            out[i * n + j] = a[j * m + i].conj();
        }
    }
    out
}

/// Transpose of an `m × n` matrix.
pub fn transpose(a: &[c64], m: usize, n: usize) -> Vec<c64> {
    let mut out = vec![c64::zero(); m * n];
    for j in 0..n {
        for i in 0..m {
            out[i * n + j] = a[j * m + i];
        }
    }
    out
}

pub fn assert_close(actual: &[c64], expected: &[c64], eps: f64) {
    assert_eq!(actual.len(), expected.len());
    for (x, y) in actual.iter().zip(expected) {
        assert_approx_eq!(x.re, y.re, eps);
        assert_approx_eq!(x.im, y.im, eps);
    }
}

/// Checks that the columns of the `m × n` matrix `q` are orthonormal.
pub fn assert_orthonormal_columns(q: &[c64], m: usize, n: usize, eps: f64) {
    let qhq = mul(&adjoint(q, m, n), n, m, q, n);
    assert_close(&qhq, &identity(n), eps);
}
