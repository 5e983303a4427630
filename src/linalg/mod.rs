//! Linear algebra module.
//!
//! Contains the kernels behind the methods of [`Provider`](crate::Provider), together with the
//! low level building blocks they share (Householder reflections, plane rotations).
//!
//! # Memory allocation
//! Routines write their results to the buffers passed by the caller. Temporary storage, when an
//! algorithm needs some, is allocated internally and released before returning: a clone of an
//! input that the caller asked to be read from the output buffer, the pivot vector of a one-shot
//! solve, or the unitary factors of a decomposition that is only used to solve a system.
//!
//! # Layout
//! Every matrix is a flat column-major slice: element $(i, j)$ of an $m \times n$ matrix lives at
//! index $j m + i$.

pub mod householder;
pub mod jacobi;

pub mod elementwise;
pub mod matmul;
pub mod norm;

pub mod cholesky;
pub mod lu;
pub mod qr;

pub mod evd;
pub mod svd;

pub use qr::QrMethod;
