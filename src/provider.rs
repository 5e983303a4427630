//! The [`Provider`] and its tuning parameters.
//!
//! The methods of [`Provider`] are implemented next to the kernels they drive, in the modules of
//! [`linalg`](crate::linalg).

use crate::{utils::thread::parallelism_degree, Parallelism};

/// Tuning parameters of a [`Provider`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Config {
    /// The multiply recursion stops splitting once `m + n` is at most this value.
    pub parallelize_order: usize,
    /// Minimum amount of work (elements, columns) before a kernel fans out across threads.
    pub parallelize_elements: usize,
    /// A Householder reflector is applied to two halves of its trailing columns on separate
    /// threads once there are more than this many columns.
    pub parallelize_columns: usize,
    /// Thread budget of the provider.
    pub parallelism: Parallelism,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self {
            parallelize_order: 64,
            parallelize_elements: 300,
            parallelize_columns: 200,
            parallelism: Parallelism::Rayon(0),
        }
    }
}

impl Config {
    #[inline]
    pub fn with_parallelize_order(self, parallelize_order: usize) -> Self {
        Self {
            parallelize_order,
            ..self
        }
    }

    #[inline]
    pub fn with_parallelize_elements(self, parallelize_elements: usize) -> Self {
        Self {
            parallelize_elements,
            ..self
        }
    }

    #[inline]
    pub fn with_parallelize_columns(self, parallelize_columns: usize) -> Self {
        Self {
            parallelize_columns,
            ..self
        }
    }

    #[inline]
    pub fn with_parallelism(self, parallelism: Parallelism) -> Self {
        Self {
            parallelism,
            ..self
        }
    }

    /// Default thresholds, executed on the calling thread only.
    #[inline]
    pub fn sequential() -> Self {
        Self::default().with_parallelism(Parallelism::None)
    }
}

/// Dense complex linear algebra routines on flat column-major buffers.
///
/// A provider is a small `Copy` value that only carries its [`Config`]. It holds no buffers and
/// no state between calls, so the same provider can be shared freely across threads.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Provider {
    config: Config,
}

impl Provider {
    #[inline]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of threads the provider may use.
    #[inline]
    pub fn max_degree_of_parallelism(&self) -> usize {
        parallelism_degree(self.config.parallelism)
    }

    /// Parallelism granted to a kernel that performs `work` units of independent work.
    #[inline]
    pub(crate) fn parallelism_for(&self, work: usize) -> Parallelism {
        if work > self.config.parallelize_elements && self.max_degree_of_parallelism() > 1 {
            self.config.parallelism
        } else {
            Parallelism::None
        }
    }
}
