//! Sequential or rayon-backed execution of independent matches

use rayon::prelude::*;

/// Apply `job` to every item, returning outputs in input order
///
/// With `parallel` set the jobs run on the global rayon pool; the output
/// order is the same either way.
pub(crate) fn map_in_order<T, R, F>(items: Vec<T>, parallel: bool, job: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    if parallel {
        items.into_par_iter().map(job).collect()
    } else {
        items.into_iter().map(job).collect()
    }
}

/// Like [`map_in_order`], but stops at the first error
///
/// Sequentially no job after the failing one starts. On the rayon pool,
/// jobs already in flight finish but no new ones are picked up, and the
/// error returned is whichever failure was seen first.
pub(crate) fn try_map_in_order<T, R, E, F>(items: Vec<T>, parallel: bool, job: F) -> Result<Vec<R>, E>
where
    T: Send,
    R: Send,
    E: Send,
    F: Fn(T) -> Result<R, E> + Send + Sync,
{
    if parallel {
        items.into_par_iter().map(job).collect()
    } else {
        items.into_iter().map(job).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parallel_keeps_order() {
        let items: Vec<u32> = (0..500).collect();
        let sequential = map_in_order(items.clone(), false, |x| x * 3);
        let parallel = map_in_order(items, true, |x| x * 3);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[499], 1497);
    }

    #[test]
    fn test_try_map_stops_at_first_error() {
        let started = AtomicUsize::new(0);
        let result = try_map_in_order((0..10u32).collect(), false, |x| {
            started.fetch_add(1, Ordering::SeqCst);
            if x == 3 {
                Err(x)
            } else {
                Ok(x)
            }
        });
        assert_eq!(result, Err(3));
        assert_eq!(started.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_try_map_collects_in_order() {
        let items: Vec<u32> = (0..300).collect();
        let parallel: Result<Vec<u32>, ()> = try_map_in_order(items.clone(), true, |x| Ok(x + 1));
        assert_eq!(parallel.unwrap(), items.iter().map(|x| x + 1).collect::<Vec<_>>());

        let failed = try_map_in_order(items, true, |x| if x % 100 == 42 { Err(x) } else { Ok(x) });
        assert!(matches!(failed, Err(x) if x % 100 == 42));
    }
}
