use crate::*;
use rayon::prelude::*;

/// Executes the two operations, possibly in parallel, while splitting the amount of parallelism
/// between the two.
#[inline]
pub fn join_raw(
    op_a: impl Send + FnOnce(Parallelism),
    op_b: impl Send + FnOnce(Parallelism),
    parallelism: Parallelism,
) {
    match parallelism {
        Parallelism::None => {
            op_a(parallelism);
            op_b(parallelism);
        }
        Parallelism::Rayon(n_threads) => {
            let n_threads = parallelism_degree(Parallelism::Rayon(n_threads));
            if n_threads <= 1 {
                op_a(Parallelism::None);
                op_b(Parallelism::None);
            } else {
                let parallelism = Parallelism::Rayon(n_threads - n_threads / 2);
                rayon::join(|| op_a(parallelism), || op_b(parallelism));
            }
        }
    }
}

/// Overwrites every element of `data` with `op(index, old_value)`, possibly in parallel.
#[inline]
pub fn for_each_indexed_mut<T: Send + Copy>(
    data: &mut [T],
    op: impl Send + Sync + Fn(usize, T) -> T,
    parallelism: Parallelism,
) {
    match parallelism {
        Parallelism::None => data
            .iter_mut()
            .enumerate()
            .for_each(|(i, x)| *x = op(i, *x)),
        Parallelism::Rayon(_) => {
            let min_len = data.len() / parallelism_degree(parallelism);
            data.par_iter_mut()
                .enumerate()
                .with_min_len(min_len.max(1))
                .for_each(|(i, x)| *x = op(i, *x));
        }
    }
}

/// Calls `op(j, column)` for every consecutive `col_len`-sized chunk of `data`, possibly in
/// parallel.
///
/// Each call receives a distinct column, so the columns of a right-hand-side matrix can be
/// solved for independently.
#[inline]
pub fn for_each_col_mut<T: Send>(
    data: &mut [T],
    col_len: usize,
    op: impl Send + Sync + Fn(usize, &mut [T]),
    parallelism: Parallelism,
) {
    if col_len == 0 {
        return;
    }
    match parallelism {
        Parallelism::None => data
            .chunks_exact_mut(col_len)
            .enumerate()
            .for_each(|(j, col)| op(j, col)),
        Parallelism::Rayon(_) => data
            .par_chunks_exact_mut(col_len)
            .enumerate()
            .for_each(|(j, col)| op(j, col)),
    }
}

/// The amount of threads that should ideally execute an operation with the given parallelism.
#[inline]
pub fn parallelism_degree(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        Parallelism::Rayon(n_threads) => n_threads,
    }
}

/// Returns the start and length of a subsegment of `0..n`, split between `chunk_count` consumers,
/// for the consumer at index `idx`.
///
/// For the same `n` and `chunk_count`, different values of `idx` between in `0..chunk_count` will
/// represent distinct subsegments.
#[inline]
pub fn par_split_indices(n: usize, idx: usize, chunk_count: usize) -> (usize, usize) {
    let chunk_size = n / chunk_count;
    let rem = n % chunk_count;

    let idx_to_col_start = move |idx| {
        if idx < rem {
            idx * (chunk_size + 1)
        } else {
            rem + idx * chunk_size
        }
    };

    let start = idx_to_col_start(idx);
    let end = idx_to_col_start(idx + 1);
    (start, end - start)
}
