use crate::c64;
use num_traits::Zero;

/// Real plane rotation `[[c, s], [-s, c]]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JacobiRotation {
    pub c: f64,
    pub s: f64,
}

impl JacobiRotation {
    /// Rotation `G` such that `G^T * [p; q] = [r; 0]`.
    #[inline]
    pub fn make_givens(p: f64, q: f64) -> Self {
        if q == 0.0 {
            Self {
                c: if p < 0.0 { -1.0 } else { 1.0 },
                s: 0.0,
            }
        } else if p == 0.0 {
            Self {
                c: 0.0,
                s: if q < 0.0 { 1.0 } else { -1.0 },
            }
        } else if p.abs() > q.abs() {
            let t = q / p;
            let mut u = (1.0 + t * t).sqrt();
            if p < 0.0 {
                u = -u;
            }
            let c = u.recip();
            let s = -t * c;

            Self { c, s }
        } else {
            let t = p / q;
            let mut u = (1.0 + t * t).sqrt();
            if q < 0.0 {
                u = -u;
            }
            let s = -u.recip();
            let c = -t * s;

            Self { c, s }
        }
    }

    /// Constructs the rotation that maps `[a; b]` to `[r; 0]` when applied on the left, with the
    /// sign conventions of the reference BLAS `drotg`.
    ///
    /// Returns the rotation and `r`.
    #[inline]
    pub fn rotg(a: f64, b: f64) -> (Self, f64) {
        let roe = if a.abs() > b.abs() { a } else { b };
        let scale = a.abs() + b.abs();
        if scale == 0.0 {
            return (Self { c: 1.0, s: 0.0 }, 0.0);
        }

        let mut r = scale * ((a / scale).powi(2) + (b / scale).powi(2)).sqrt();
        if roe < 0.0 {
            r = -r;
        }
        (Self { c: a / r, s: b / r }, r)
    }

    #[inline]
    pub fn transpose(&self) -> Self {
        Self {
            c: self.c,
            s: -self.s,
        }
    }

    /// Applies the rotation to the pair of rows (or columns) `x` and `y`:
    /// `x ← c·x + s·y`, `y ← -s·x + c·y`.
    #[inline]
    pub fn apply_on_the_left_in_place(&self, x: &mut [c64], y: &mut [c64]) {
        let Self { c, s } = *self;
        if c == 1.0 && s == 0.0 {
            return;
        }
        for (x, y) in x.iter_mut().zip(y.iter_mut()) {
            let (x_, y_) = (*x, *y);
            *x = x_ * c + y_ * s;
            *y = y_ * c - x_ * s;
        }
    }

    /// Multiplies the pair of columns `[x, y]` by the rotation on the right.
    #[inline]
    pub fn apply_on_the_right_in_place(&self, x: &mut [c64], y: &mut [c64]) {
        self.transpose().apply_on_the_left_in_place(x, y);
    }
}

/// Complex plane rotation `[[c, s], [-conj(s), c]]` with a real cosine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexRotation {
    pub c: f64,
    pub s: c64,
}

impl ComplexRotation {
    /// Constructs the rotation that maps `[a; b]` to `[r; 0]` when applied on the left.
    ///
    /// Returns the rotation and `r`.
    #[inline]
    pub fn make(a: c64, b: c64) -> (Self, c64) {
        let abs_a = a.norm();
        if abs_a == 0.0 {
            return (
                Self {
                    c: 0.0,
                    s: c64::new(1.0, 0.0),
                },
                b,
            );
        }
        let scale = abs_a + b.norm();
        let norm = scale * ((a / scale).norm_sqr() + (b / scale).norm_sqr()).sqrt();
        let alpha = a / abs_a;
        (
            Self {
                c: abs_a / norm,
                s: alpha * b.conj() / norm,
            },
            alpha * norm,
        )
    }

    /// `x ← c·x + s·y`, `y ← -conj(s)·x + c·y`.
    #[inline]
    pub fn apply_on_the_left(&self, x: c64, y: c64) -> (c64, c64) {
        (x * self.c + self.s * y, y * self.c - self.s.conj() * x)
    }

    /// Multiplies the pair of columns `[x, y]` by the adjoint of the rotation on the right.
    #[inline]
    pub fn apply_adjoint_on_the_right_in_place(&self, x: &mut [c64], y: &mut [c64]) {
        let Self { c, s } = *self;
        if c == 1.0 && s.is_zero() {
            return;
        }
        for (x, y) in x.iter_mut().zip(y.iter_mut()) {
            let (x_, y_) = (*x, *y);
            *x = x_ * c + y_ * s.conj();
            *y = y_ * c - x_ * s;
        }
    }
}

/// Borrows columns `i` and `j` (with `i < j`) of a column-major buffer with columns of length
/// `col_len`.
#[inline]
#[track_caller]
pub(crate) fn col_pair_mut(
    data: &mut [c64],
    col_len: usize,
    i: usize,
    j: usize,
) -> (&mut [c64], &mut [c64]) {
    assert!(i < j);
    let (head, tail) = data.split_at_mut(j * col_len);
    (
        &mut head[i * col_len..(i + 1) * col_len],
        &mut tail[..col_len],
    )
}
