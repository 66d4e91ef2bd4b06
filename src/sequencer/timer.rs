use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}};
use std::time::Duration;

pub type Continuation = Box<dyn FnOnce() + Send + 'static>;

/// Posts a continuation to run once after a delay
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerToken;
}

/// Handle to one scheduled continuation.
///
/// Dropping the token leaves the continuation scheduled; only `cancel` stops it.
pub struct TimerToken {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerToken {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerToken").finish_non_exhaustive()
    }
}

/// Runs continuations as tasks on a tokio runtime.
///
/// Build it from a current-thread runtime to keep every drain step on one
/// control thread.
#[derive(Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Scheduler for the runtime the caller is running on. Panics outside a runtime.
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerToken {
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            continuation();
        });
        let abort = task.abort_handle();
        TimerToken::new(move || abort.abort())
    }
}

struct Entry {
    due: Duration,
    seq: u64,
    cancelled: Arc<AtomicBool>,
    continuation: Continuation,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

/// Virtual clock scheduler: nothing runs until [`ManualScheduler::advance`].
#[derive(Default, Clone)]
pub struct ManualScheduler {
    clock: Arc<Mutex<Clock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock.
    pub fn now(&self) -> Duration {
        self.clock.lock().unwrap().now
    }

    /// Remaining delays of outstanding continuations, in firing order.
    pub fn pending_delays(&self) -> Vec<Duration> {
        let clock = self.clock.lock().unwrap();
        let mut live: Vec<(Duration, u64)> = clock
            .entries
            .iter()
            .filter(|e| !e.cancelled.load(Ordering::SeqCst))
            .map(|e| (e.due, e.seq))
            .collect();
        live.sort();
        live.into_iter().map(|(due, _)| due - clock.now).collect()
    }

    pub fn pending(&self) -> usize {
        self.pending_delays().len()
    }

    /// Moves the clock forward by `by`, running every continuation that falls
    /// due, including ones they schedule inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let next = {
                let mut clock = self.clock.lock().unwrap();
                clock.entries.retain(|e| !e.cancelled.load(Ordering::SeqCst));
                let due_index = clock
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.due <= target)
                    .min_by_key(|(_, e)| (e.due, e.seq))
                    .map(|(i, _)| i);
                match due_index {
                    Some(i) => {
                        let entry = clock.entries.remove(i);
                        clock.now = entry.due;
                        Some(entry.continuation)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };
            // Run outside the lock so the continuation can schedule again
            match next {
                Some(continuation) => continuation(),
                None => break,
            }
        }
    }

    /// Runs every outstanding continuation, however far ahead it is.
    pub fn run_until_idle(&self) {
        while let Some(delay) = self.pending_delays().first().copied() {
            self.advance(delay);
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, continuation: Continuation) -> TimerToken {
        let cancelled = Arc::new(AtomicBool::new(false));
        {
            let mut clock = self.clock.lock().unwrap();
            let due = clock.now + delay;
            let seq = clock.next_seq;
            clock.next_seq += 1;
            clock.entries.push(Entry {
                due,
                seq,
                cancelled: Arc::clone(&cancelled),
                continuation,
            });
        }
        TimerToken::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Continuation) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |tag: &'static str| -> Continuation {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(tag))
        };
        (log, make)
    }

    #[test]
    fn manual_fires_exactly_at_due_time() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let _token = scheduler.schedule(Duration::from_millis(400), make("a"));

        scheduler.advance(Duration::from_millis(399));
        assert!(log.lock().unwrap().is_empty());
        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*log.lock().unwrap(), vec!["a"]);
        assert_eq!(scheduler.now(), Duration::from_millis(400));
    }

    #[test]
    fn manual_orders_by_due_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let _a = scheduler.schedule(Duration::from_millis(20), make("late"));
        let _b = scheduler.schedule(Duration::from_millis(10), make("first"));
        let _c = scheduler.schedule(Duration::from_millis(10), make("second"));
        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "late"]);
    }

    #[test]
    fn cancelled_continuation_never_runs() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let token = scheduler.schedule(Duration::from_millis(5), make("x"));
        assert_eq!(scheduler.pending(), 1);
        token.cancel();
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(1));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn dropping_token_keeps_continuation() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        drop(scheduler.schedule(Duration::from_millis(5), make("kept")));
        scheduler.run_until_idle();
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn continuation_can_reschedule_within_window() {
        let scheduler = ManualScheduler::new();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let inner_scheduler = scheduler.clone();
        let inner_hits = Arc::clone(&hits);
        let _token = scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner_hits.lock().unwrap().push(inner_scheduler.now());
                let again = Arc::clone(&inner_hits);
                let clock = inner_scheduler.clone();
                drop(inner_scheduler.schedule(
                    Duration::from_millis(10),
                    Box::new(move || again.lock().unwrap().push(clock.now())),
                ));
            }),
        );
        scheduler.advance(Duration::from_millis(25));
        assert_eq!(
            *hits.lock().unwrap(),
            vec![Duration::from_millis(10), Duration::from_millis(20)]
        );
        assert_eq!(scheduler.now(), Duration::from_millis(25));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_scheduler_waits_for_delay() {
        let scheduler = TokioScheduler::current();
        let (log, make) = recorder();
        let _token = scheduler.schedule(Duration::from_millis(400), make("tick"));

        tokio::time::sleep(Duration::from_millis(399)).await;
        assert!(log.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(*log.lock().unwrap(), vec!["tick"]);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_cancel_aborts_task() {
        let scheduler = TokioScheduler::current();
        let (log, make) = recorder();
        let token = scheduler.schedule(Duration::from_millis(50), make("never"));
        token.cancel();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(log.lock().unwrap().is_empty());
    }
}
