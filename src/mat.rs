//! Strided column-major views over flat buffers.
//!
//! Buffers handed to the [`Provider`](crate::Provider) are plain slices. The recursive kernels
//! need to address rectangular sub-blocks of them and, for the parallel ones, hand disjoint
//! sub-blocks to different threads. [`MatRef`] and [`MatMut`] provide exactly that: a pointer,
//! dimensions and a column stride, with [`MatMut::split_at_mut`] as the only way to obtain
//! several mutable views into the same buffer.

use crate::{c64, debug_assert};
use core::marker::PhantomData;
use reborrow::*;

/// Immutable view over a column-major matrix.
#[derive(Copy, Clone)]
pub struct MatRef<'a> {
    ptr: *const c64,
    nrows: usize,
    ncols: usize,
    col_stride: usize,
    __marker: PhantomData<&'a c64>,
}

/// Mutable view over a column-major matrix.
///
/// Since `MatMut` mutably borrows data, it cannot be [`Copy`]. Use [`ReborrowMut::rb_mut`] to
/// pass it to a function while keeping it usable afterwards.
pub struct MatMut<'a> {
    ptr: *mut c64,
    nrows: usize,
    ncols: usize,
    col_stride: usize,
    __marker: PhantomData<&'a mut c64>,
}

unsafe impl Send for MatRef<'_> {}
unsafe impl Sync for MatRef<'_> {}
unsafe impl Send for MatMut<'_> {}
unsafe impl Sync for MatMut<'_> {}

impl<'a> MatRef<'a> {
    /// Views `data` as an `nrows × ncols` column-major matrix.
    ///
    /// # Panics
    /// Panics if `data.len() != nrows * ncols`.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice(data: &'a [c64], nrows: usize, ncols: usize) -> Self {
        assert_eq!(data.len(), nrows * ncols);
        Self {
            ptr: data.as_ptr(),
            nrows,
            ncols,
            col_stride: nrows,
            __marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline(always)]
    pub fn col_stride(&self) -> usize {
        self.col_stride
    }

    /// Reads the element at row `i`, column `j`.
    #[inline(always)]
    #[track_caller]
    pub fn read(&self, i: usize, j: usize) -> c64 {
        assert!(i < self.nrows && j < self.ncols);
        unsafe { *self.ptr.add(i + j * self.col_stride) }
    }

    /// Splits the matrix into four blocks at row `i` and column `j`.
    ///
    /// Returns the top left, top right, bottom left and bottom right blocks, in that order.
    #[inline]
    #[track_caller]
    pub fn split_at(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        assert!(i <= self.nrows && j <= self.ncols);
        let block = |row: usize, col: usize, nrows: usize, ncols: usize| MatRef {
            // the pointer stays in bounds (or one past the end) of the original allocation
            ptr: self.ptr.wrapping_add(row + col * self.col_stride),
            nrows,
            ncols,
            col_stride: self.col_stride,
            __marker: PhantomData,
        };
        let (m, n) = (self.nrows, self.ncols);
        (
            block(0, 0, i, j),
            block(0, j, i, n - j),
            block(i, 0, m - i, j),
            block(i, j, m - i, n - j),
        )
    }
}

impl<'a> MatMut<'a> {
    /// Views `data` as an `nrows × ncols` column-major matrix.
    ///
    /// # Panics
    /// Panics if `data.len() != nrows * ncols`.
    #[inline]
    #[track_caller]
    pub fn from_column_major_slice_mut(data: &'a mut [c64], nrows: usize, ncols: usize) -> Self {
        assert_eq!(data.len(), nrows * ncols);
        Self {
            ptr: data.as_mut_ptr(),
            nrows,
            ncols,
            col_stride: nrows,
            __marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    #[inline(always)]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    #[inline(always)]
    #[track_caller]
    pub fn read(&self, i: usize, j: usize) -> c64 {
        self.rb().read(i, j)
    }

    /// Writes `value` at row `i`, column `j`.
    #[inline(always)]
    #[track_caller]
    pub fn write(&mut self, i: usize, j: usize, value: c64) {
        assert!(i < self.nrows && j < self.ncols);
        unsafe { *self.ptr.add(i + j * self.col_stride) = value };
    }

    /// Adds `value` to the element at row `i`, column `j`.
    #[inline(always)]
    #[track_caller]
    pub fn add_assign(&mut self, i: usize, j: usize, value: c64) {
        debug_assert!(all(i < self.nrows, j < self.ncols));
        let old = self.read(i, j);
        self.write(i, j, old + value);
    }

    /// Splits the matrix into four disjoint blocks at row `i` and column `j`.
    ///
    /// Returns the top left, top right, bottom left and bottom right blocks, in that order.
    #[inline]
    #[track_caller]
    pub fn split_at_mut(self, i: usize, j: usize) -> (Self, Self, Self, Self) {
        assert!(i <= self.nrows && j <= self.ncols);
        let block = |row: usize, col: usize, nrows: usize, ncols: usize| MatMut {
            ptr: self.ptr.wrapping_add(row + col * self.col_stride),
            nrows,
            ncols,
            col_stride: self.col_stride,
            __marker: PhantomData,
        };
        let (m, n) = (self.nrows, self.ncols);
        (
            block(0, 0, i, j),
            block(0, j, i, n - j),
            block(i, 0, m - i, j),
            block(i, j, m - i, n - j),
        )
    }
}

impl<'short> Reborrow<'short> for MatMut<'_> {
    type Target = MatRef<'short>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        MatRef {
            ptr: self.ptr,
            nrows: self.nrows,
            ncols: self.ncols,
            col_stride: self.col_stride,
            __marker: PhantomData,
        }
    }
}

impl<'short> ReborrowMut<'short> for MatMut<'_> {
    type Target = MatMut<'short>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        MatMut {
            ptr: self.ptr,
            nrows: self.nrows,
            ncols: self.ncols,
            col_stride: self.col_stride,
            __marker: PhantomData,
        }
    }
}
