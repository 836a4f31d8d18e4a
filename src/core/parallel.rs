//! Ordered, bounded parallel map over an iterator.
//!
//! Each `ParallelMap` runs its work on a private rayon pool of `max_workers`
//! threads, so consuming it from inside another rayon pool cannot starve its
//! own jobs. At most `max_workers` items are in flight at once and results
//! come back in input order. Nothing is scheduled until the iterator is
//! pulled, and dropping it stops scheduling: results of jobs that are still
//! running are discarded when they finish. A panic in `f` is re-raised on the
//! consuming thread at the position of the item that panicked.
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, bounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::warn;

enum Workers {
    NotStarted,
    Pool(ThreadPool),
    /// Pool could not be built; calls run on the consuming thread
    Inline,
}

pub struct ParallelMap<I, F, T> {
    items: I,
    f: Arc<F>,
    max_workers: usize,
    workers: Workers,
    in_flight: VecDeque<Receiver<thread::Result<T>>>,
}

/// Apply `f` to every item of `items` on a dedicated pool, keeping at most
/// `max_workers` calls in flight and yielding results in input order.
pub fn parallel_map<I, F, T>(items: I, f: F, max_workers: usize) -> ParallelMap<I::IntoIter, F, T>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    ParallelMap {
        items: items.into_iter(),
        f: Arc::new(f),
        max_workers: max_workers.max(1),
        workers: Workers::NotStarted,
        in_flight: VecDeque::new(),
    }
}

impl<I, F, T> ParallelMap<I, F, T>
where
    I: Iterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    fn start_workers(&mut self) {
        if !matches!(self.workers, Workers::NotStarted) {
            return;
        }
        self.workers = match ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .thread_name(|i| format!("parallel-map-{i}"))
            .build()
        {
            Ok(pool) => Workers::Pool(pool),
            Err(e) => {
                warn!("Could not start worker pool ({}), running sequentially", e);
                Workers::Inline
            }
        };
    }

    fn fill(&mut self) {
        while self.in_flight.len() < self.max_workers {
            let Some(item) = self.items.next() else {
                break;
            };
            self.start_workers();

            let (tx, rx) = bounded(1);
            let f = Arc::clone(&self.f);
            let job = move || {
                let result = catch_unwind(AssertUnwindSafe(|| f(item)));
                // receiver is gone once the consumer stops iterating
                let _ = tx.send(result);
            };
            match &self.workers {
                Workers::Pool(pool) => pool.spawn(job),
                _ => job(),
            }
            self.in_flight.push_back(rx);
        }
    }

    /// Number of calls currently scheduled but not yet yielded
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl<I, F, T> Iterator for ParallelMap<I, F, T>
where
    I: Iterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> T + Send + Sync + 'static,
    T: Send + 'static,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.fill();
        let rx = self.in_flight.pop_front()?;
        match rx.recv() {
            Ok(Ok(value)) => Some(value),
            Ok(Err(payload)) => resume_unwind(payload),
            // every job sends exactly once before its sender drops
            Err(_) => panic!("parallel map worker exited without producing a result"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.items.size_hint();
        let n = self.in_flight.len();
        (lo.saturating_add(n), hi.and_then(|h| h.checked_add(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn results_follow_input_order() {
        // later items finish first
        let out: Vec<usize> = parallel_map(
            0..32usize,
            |i| {
                std::thread::sleep(Duration::from_millis(((32 - i) % 5) as u64));
                i * 2
            },
            8,
        )
        .collect();
        assert_eq!(out, (0..32).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[test]
    fn in_flight_is_bounded() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (Arc::clone(&active), Arc::clone(&peak));

        let mut iter = parallel_map(
            0..40usize,
            move |i| {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(2));
                a.fetch_sub(1, Ordering::SeqCst);
                i
            },
            3,
        );
        assert_eq!(iter.in_flight(), 0);
        assert_eq!(iter.next(), Some(0));
        assert!(iter.in_flight() <= 3);
        assert_eq!(iter.count(), 39);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn nothing_runs_until_pulled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let iter = parallel_map(
            0..10,
            move |i: i32| {
                c.fetch_add(1, Ordering::SeqCst);
                i
            },
            4,
        );
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(iter);
    }

    #[test]
    fn stopping_early_bounds_the_work_done() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let taken: Vec<i32> = parallel_map(
            0..1000,
            move |i: i32| {
                c.fetch_add(1, Ordering::SeqCst);
                i
            },
            4,
        )
        .take(2)
        .collect();
        assert_eq!(taken, vec![0, 1]);
        // two yielded plus at most one refill window
        assert!(calls.load(Ordering::SeqCst) <= 2 + 4);
    }

    #[test]
    fn zero_workers_behaves_like_one() {
        let out: Vec<i32> = parallel_map(vec![3, 1, 2], |i| i + 1, 0).collect();
        assert_eq!(out, vec![4, 2, 3]);
    }

    #[test]
    fn consuming_inside_a_single_thread_pool_does_not_deadlock() {
        let outer = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .build()
            .unwrap();
        let (tx, rx) = bounded(1);
        thread::spawn(move || {
            let out: Vec<i32> = outer.install(|| parallel_map(0..4, |x: i32| x, 2).collect());
            let _ = tx.send(out);
        });
        let out = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(out, vec![0, 1, 2, 3]);
    }

    #[test]
    fn worker_panic_is_raised_at_its_position() {
        let mut iter = parallel_map(
            0..5,
            |x: i32| {
                if x == 1 {
                    panic!("bad item {x}");
                }
                x
            },
            2,
        );
        assert_eq!(iter.next(), Some(0));
        let raised = catch_unwind(AssertUnwindSafe(|| iter.next()));
        assert!(raised.is_err());
    }

    #[test]
    fn panic_does_not_silently_truncate_collect() {
        let collected = catch_unwind(|| {
            parallel_map(0..5, |x: i32| if x == 3 { panic!("bad") } else { x }, 2)
                .collect::<Vec<_>>()
        });
        assert!(collected.is_err());
    }
}
