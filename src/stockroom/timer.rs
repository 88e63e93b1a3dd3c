//! # Deferred Callbacks
//!
//! Everything time-based in stockroom (the filter debounce, toast auto-dismiss,
//! the simulated initial load) is a callback scheduled on a [`TimerQueue`]. The
//! queue never spawns threads and never blocks on its own: the host decides when
//! to fire due callbacks by calling [`TimerQueue::run_due`], or waits for all of
//! them with [`TimerQueue::run_until_idle`].
//!
//! Time comes from a [`Clock`]. The shell uses [`SystemClock`]; tests use
//! [`ManualClock`] and move time forward explicitly, which makes debounce
//! behaviour fully deterministic.
//!
//! Callbacks run with no borrow of the queue held, so they may schedule or cancel
//! other timers.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for a [`TimerQueue`], as an offset from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;

    /// Block (or pretend to) until `deadline` has been reached.
    fn wait_until(&self, deadline: Duration);
}

/// Wall-clock time measured from when the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn wait_until(&self, deadline: Duration) {
        if deadline > self.now.get() {
            self.now.set(deadline);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

type Callback = Box<dyn FnOnce()>;

#[derive(Default)]
struct Timers {
    next_id: u64,
    // Ordered by deadline, then by scheduling order for equal deadlines.
    queue: BTreeMap<(Duration, u64), Callback>,
    deadlines: HashMap<u64, Duration>,
}

pub struct TimerQueue {
    clock: Box<dyn Clock>,
    timers: RefCell<Timers>,
}

impl TimerQueue {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            timers: RefCell::new(Timers::default()),
        }
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Run `callback` once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
        let deadline = self.clock.now() + delay;
        let mut timers = self.timers.borrow_mut();
        let id = timers.next_id;
        timers.next_id += 1;
        timers.queue.insert((deadline, id), Box::new(callback));
        timers.deadlines.insert(id, deadline);
        tracing::trace!(timer = id, ?delay, "timer scheduled");
        TimerId(id)
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut timers = self.timers.borrow_mut();
        match timers.deadlines.remove(&id.0) {
            Some(deadline) => {
                timers.queue.remove(&(deadline, id.0));
                tracing::trace!(timer = id.0, "timer cancelled");
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.borrow().deadlines.contains_key(&id.0)
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().queue.len()
    }

    /// Deadline of a pending timer.
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.timers.borrow().deadlines.get(&id.0).copied()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers
            .borrow()
            .queue
            .keys()
            .next()
            .map(|(deadline, _)| *deadline)
    }

    /// Fire every timer whose deadline has passed. Returns how many fired.
    pub fn run_due(&self) -> usize {
        let mut fired = 0;
        while let Some(callback) = self.pop_due(self.clock.now()) {
            callback();
            fired += 1;
        }
        fired
    }

    /// Wait until `deadline`, then fire everything due by then.
    pub fn run_until(&self, deadline: Duration) -> usize {
        self.clock.wait_until(deadline);
        self.run_due()
    }

    /// Wait for and fire timers until none are left, including timers scheduled
    /// by the callbacks themselves.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.next_deadline() {
            self.clock.wait_until(deadline);
            fired += self.run_due();
        }
        fired
    }

    fn pop_due(&self, now: Duration) -> Option<Callback> {
        let mut timers = self.timers.borrow_mut();
        let key = *timers.queue.keys().next()?;
        if key.0 > now {
            return None;
        }
        timers.deadlines.remove(&key.1);
        timers.queue.remove(&key)
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_queue() -> (ManualClock, Rc<TimerQueue>) {
        let clock = ManualClock::new();
        let queue = Rc::new(TimerQueue::new(clock.clone()));
        (clock, queue)
    }

    #[test]
    fn fires_only_after_delay() {
        let (clock, queue) = manual_queue();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        queue.schedule(Duration::from_millis(300), move || h.set(h.get() + 1));

        clock.advance_ms(299);
        assert_eq!(queue.run_due(), 0);
        assert_eq!(hits.get(), 0);

        clock.advance_ms(1);
        assert_eq!(queue.run_due(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let (clock, queue) = manual_queue();
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        let id = queue.schedule(Duration::from_millis(10), move || h.set(1));

        assert!(queue.is_scheduled(id));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));

        clock.advance_ms(50);
        queue.run_due();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn fires_in_deadline_order() {
        let (clock, queue) = manual_queue();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("late", 30), ("early", 10), ("mid", 20), ("mid2", 20)] {
            let o = order.clone();
            queue.schedule(Duration::from_millis(ms), move || o.borrow_mut().push(name));
        }
        clock.advance_ms(100);
        queue.run_due();
        assert_eq!(*order.borrow(), vec!["early", "mid", "mid2", "late"]);
    }

    #[test]
    fn callbacks_may_schedule_more_timers() {
        let (_clock, queue) = manual_queue();
        let hits = Rc::new(Cell::new(0));
        let q = queue.clone();
        let h = hits.clone();
        queue.schedule(Duration::from_millis(5), move || {
            h.set(h.get() + 1);
            let h2 = h.clone();
            q.schedule(Duration::from_millis(5), move || h2.set(h2.get() + 1));
        });

        assert_eq!(queue.run_until_idle(), 2);
        assert_eq!(hits.get(), 2);
        assert_eq!(queue.now(), Duration::from_millis(10));
    }

    #[test]
    fn run_until_fires_up_to_the_deadline_only() {
        let (_clock, queue) = manual_queue();
        let early = queue.schedule(Duration::from_millis(100), || {});
        let late = queue.schedule(Duration::from_millis(900), || {});
        assert_eq!(queue.deadline(early), Some(Duration::from_millis(100)));

        assert_eq!(queue.run_until(Duration::from_millis(100)), 1);
        assert_eq!(queue.deadline(early), None);
        assert!(queue.is_scheduled(late));
        assert_eq!(queue.now(), Duration::from_millis(100));
    }

    #[test]
    fn next_deadline_tracks_earliest_timer() {
        let (_clock, queue) = manual_queue();
        assert_eq!(queue.next_deadline(), None);
        queue.schedule(Duration::from_millis(40), || {});
        let early = queue.schedule(Duration::from_millis(15), || {});
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(15)));
        queue.cancel(early);
        assert_eq!(queue.next_deadline(), Some(Duration::from_millis(40)));
    }
}
