//! Bulk-loop executors for data-parallel sweeps over the state vector
//!
//! Every bulk operation in the kernel is expressed as a loop over `[0, count)`
//! dispatched through an [`Executor`]. Two interchangeable implementations are
//! provided: [`SequentialExecutor`] runs the loop inline on the calling
//! thread, [`ParallelExecutor`] spreads it over a rayon pool with a thread
//! count fixed at construction. [`AnyExecutor`] selects between them at
//! runtime from a configured thread count.
//!
//! Contract: loop bodies may run in any order and must only touch memory that
//! is disjoint between indices; the executor returns only once every index
//! has completed. Reduction combiners must be associative and commutative.
//! Partition bounds are deterministic, so a caller can reproduce per-partition
//! cumulative sums after a partitioned reduction.

use crate::error::{Result, StateError};
use rayon::prelude::*;
use std::sync::Arc;

/// Bulk-indexed loop execution over `[0, count)`
pub trait Executor: Send + Sync {
    /// Number of partitions the index range is split into
    fn num_partitions(&self) -> usize;

    /// Half-open index range `[k0, k1)` covered by partition `m`
    ///
    /// Bounds tile `[0, count)` exactly and in partition order.
    fn partition_bounds(&self, count: u64, m: usize) -> (u64, u64) {
        let p = self.num_partitions() as u64;
        let m = m as u64;
        (count * m / p, count * (m + 1) / p)
    }

    /// Invoke `f(i)` for every `i` in `[0, count)`
    ///
    /// Completes only when all invocations have completed. Side effects
    /// visible across indices must be on disjoint memory.
    fn run<F>(&self, count: u64, f: F)
    where
        F: Fn(u64) + Send + Sync;

    /// Reduce `f(i)` over `[0, count)` with an associative, commutative
    /// `combine` starting from `identity`
    fn run_reduce<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> R
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync;

    /// Like [`Executor::run_reduce`], but returns one partial reduction per
    /// partition, in partition order
    fn run_reduce_partitioned<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync;
}

/// Single-threaded executor: one partition, plain loop
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for SequentialExecutor {
    fn num_partitions(&self) -> usize {
        1
    }

    fn run<F>(&self, count: u64, f: F)
    where
        F: Fn(u64) + Send + Sync,
    {
        for i in 0..count {
            f(i);
        }
    }

    fn run_reduce<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> R
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        let mut acc = identity;
        for i in 0..count {
            acc = combine(acc, f(i));
        }
        acc
    }

    fn run_reduce_partitioned<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        vec![self.run_reduce(count, identity, f, combine)]
    }
}

/// Worker-pool executor backed by rayon with a fixed thread count
///
/// The index range is split into one partition per thread using the same
/// bounds that [`Executor::partition_bounds`] reports, so partitioned
/// reductions line up with later [`Executor::partition_bounds`] queries.
/// Partials are combined in partition order, which makes reductions
/// deterministic for a fixed thread count.
pub struct ParallelExecutor {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl ParallelExecutor {
    /// Build an executor over `num_threads` workers (at least one)
    ///
    /// # Errors
    /// Returns [`StateError::ThreadPool`] if the worker pool cannot be built.
    pub fn new(num_threads: usize) -> Result<Self> {
        let num_threads = num_threads.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| StateError::ThreadPool {
                reason: e.to_string(),
            })?;

        Ok(Self { pool, num_threads })
    }

    /// Configured worker count
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    fn partials<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        let parts = self.num_threads;
        self.pool.install(|| {
            (0..parts)
                .into_par_iter()
                .map(|m| {
                    let (k0, k1) = self.partition_bounds(count, m);
                    let mut acc = identity.clone();
                    for i in k0..k1 {
                        acc = combine(acc, f(i));
                    }
                    acc
                })
                .collect()
        })
    }
}

impl Executor for ParallelExecutor {
    fn num_partitions(&self) -> usize {
        self.num_threads
    }

    fn run<F>(&self, count: u64, f: F)
    where
        F: Fn(u64) + Send + Sync,
    {
        let parts = self.num_threads;
        self.pool.install(|| {
            (0..parts).into_par_iter().for_each(|m| {
                let (k0, k1) = self.partition_bounds(count, m);
                for i in k0..k1 {
                    f(i);
                }
            });
        });
    }

    fn run_reduce<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> R
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        let partials = self.partials(count, identity.clone(), f, &combine);
        partials.into_iter().fold(identity, |a, b| combine(a, b))
    }

    fn run_reduce_partitioned<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        self.partials(count, identity, f, combine)
    }
}

/// Runtime-selected executor: sequential for a single worker, pooled above
///
/// This is the indirection point the runner uses to honor its thread-count
/// option without monomorphizing twice.
pub enum AnyExecutor {
    Sequential(SequentialExecutor),
    Parallel(ParallelExecutor),
}

impl AnyExecutor {
    /// Select the implementation for a configured worker count
    ///
    /// # Errors
    /// Returns [`StateError::ThreadPool`] if the worker pool cannot be built.
    pub fn from_threads(num_threads: usize) -> Result<Self> {
        if num_threads <= 1 {
            Ok(Self::Sequential(SequentialExecutor::new()))
        } else {
            Ok(Self::Parallel(ParallelExecutor::new(num_threads)?))
        }
    }
}

impl Executor for AnyExecutor {
    fn num_partitions(&self) -> usize {
        match self {
            Self::Sequential(e) => e.num_partitions(),
            Self::Parallel(e) => e.num_partitions(),
        }
    }

    fn run<F>(&self, count: u64, f: F)
    where
        F: Fn(u64) + Send + Sync,
    {
        match self {
            Self::Sequential(e) => e.run(count, f),
            Self::Parallel(e) => e.run(count, f),
        }
    }

    fn run_reduce<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> R
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        match self {
            Self::Sequential(e) => e.run_reduce(count, identity, f, combine),
            Self::Parallel(e) => e.run_reduce(count, identity, f, combine),
        }
    }

    fn run_reduce_partitioned<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        match self {
            Self::Sequential(e) => e.run_reduce_partitioned(count, identity, f, combine),
            Self::Parallel(e) => e.run_reduce_partitioned(count, identity, f, combine),
        }
    }
}

impl<E: Executor> Executor for Arc<E> {
    fn num_partitions(&self) -> usize {
        (**self).num_partitions()
    }

    fn partition_bounds(&self, count: u64, m: usize) -> (u64, u64) {
        (**self).partition_bounds(count, m)
    }

    fn run<F>(&self, count: u64, f: F)
    where
        F: Fn(u64) + Send + Sync,
    {
        (**self).run(count, f)
    }

    fn run_reduce<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> R
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        (**self).run_reduce(count, identity, f, combine)
    }

    fn run_reduce_partitioned<R, F, C>(&self, count: u64, identity: R, f: F, combine: C) -> Vec<R>
    where
        R: Send + Sync + Clone,
        F: Fn(u64) -> R + Send + Sync,
        C: Fn(R, R) -> R + Send + Sync,
    {
        (**self).run_reduce_partitioned(count, identity, f, combine)
    }
}

/// Raw pointer wrapper for executor closures that write the state in place
///
/// Loop bodies receive disjoint index sets, so concurrent writes through the
/// pointer never alias. The wrapper only exists to satisfy `Send`/`Sync`
/// bounds on closures; dereferencing it is still `unsafe` at each use site.
#[derive(Debug, Clone, Copy)]
pub struct SendPtr<T>(*mut T);

unsafe impl<T> Send for SendPtr<T> {}
unsafe impl<T> Sync for SendPtr<T> {}

impl<T> SendPtr<T> {
    pub fn new(ptr: *mut T) -> Self {
        Self(ptr)
    }

    #[inline]
    pub fn get(self) -> *mut T {
        self.0
    }
}
