use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;

use rayon::prelude::*;
use rayon::{
    ThreadPool,
    ThreadPoolBuilder
};
use serde::{
    Deserialize,
    Serialize
};

use crate::calc::calcerror::CalcError;

/// Worker thread count relative to the available cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThreadCount {
    One,
    Half,
    NMinusOne,
    #[default]
    All
}

impl ThreadCount {
    pub fn value(&self) -> usize {
        let cores = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        match self {
            ThreadCount::One => 1,
            ThreadCount::Half => (cores / 2).max(1),
            ThreadCount::NMinusOne => cores.saturating_sub(1).max(1),
            ThreadCount::All => cores
        }
    }
}

/// Runs independent calculation tasks.
///
/// `map` and `try_map` always return results in input order, so callers can
/// merge them deterministically regardless of where each task ran. `Direct`
/// runs everything on the calling thread.
#[derive(Clone)]
pub enum CalcExecutor {
    Direct,
    Pool(Arc<ThreadPool>)
}

impl CalcExecutor {
    pub fn pool(threads: usize) -> Result<CalcExecutor, CalcError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("seishaz-{i}"))
            .build()?;
        Ok(CalcExecutor::Pool(Arc::new(pool)))
    }

    /// `Direct` for one thread, otherwise a dedicated pool.
    pub fn from_thread_count(count: ThreadCount) -> Result<CalcExecutor, CalcError> {
        match count.value() {
            1 => Ok(CalcExecutor::Direct),
            n => CalcExecutor::pool(n)
        }
    }

    pub fn threads(&self) -> usize {
        match self {
            CalcExecutor::Direct => 1,
            CalcExecutor::Pool(pool) => pool.current_num_threads()
        }
    }

    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send
    {
        match self {
            CalcExecutor::Direct => items.iter().map(f).collect(),
            CalcExecutor::Pool(pool) => pool.install(|| items.par_iter().map(f).collect())
        }
    }

    /// As [`CalcExecutor::map`], failing on the first error.
    pub fn try_map<T, R, E, F>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(&T) -> Result<R, E> + Sync + Send
    {
        match self {
            CalcExecutor::Direct => items.iter().map(f).collect(),
            CalcExecutor::Pool(pool) => pool.install(|| items.par_iter().map(f).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pooled_map_preserves_order() {
        let items: Vec<u64> = (0..1000).collect();
        let direct = CalcExecutor::Direct.map(&items, |x| x * x);
        let pooled = CalcExecutor::pool(4).unwrap().map(&items, |x| x * x);
        assert_eq!(direct, pooled);
    }

    #[test]
    fn try_map_short_circuits() {
        let items: Vec<i32> = (0..100).collect();
        let executor = CalcExecutor::pool(3).unwrap();
        let result: Result<Vec<i32>, String> = executor.try_map(&items, |&x| {
            if x == 42 { Err(format!("bad {x}")) } else { Ok(x) }
        });
        assert_eq!(result, Err("bad 42".to_owned()));
    }

    #[test]
    fn thread_counts_are_positive() {
        for count in [ThreadCount::One, ThreadCount::Half, ThreadCount::NMinusOne, ThreadCount::All] {
            assert!(count.value() >= 1);
        }
        assert_eq!(CalcExecutor::from_thread_count(ThreadCount::One).unwrap().threads(), 1);
    }
}
