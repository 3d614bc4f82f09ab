use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source for reply deadlines.
///
/// Deadlines are expressed as offsets from the clock's own origin so a virtual
/// clock and the wall clock share one representation.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock source anchored at construction time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock that only moves when told to.
///
/// Clones share the same timeline, so a test can keep one handle and give
/// another to the controller.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let delta = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Identifier for one scheduled reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplyTimerId(pub u64);

impl ReplyTimerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Handle returned to the host when a reply is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledReply {
    pub id: ReplyTimerId,
    /// How long the host should wait before waking the controller.
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingReply {
    due: Duration,
    id: ReplyTimerId,
}

/// One-shot deferred tasks ordered by deadline.
///
/// Ties are broken by scheduling order. Nothing is ever cancelled; every entry
/// fires exactly once through [`ReplyQueue::take_due`].
pub struct ReplyQueue {
    clock: Arc<dyn Clock>,
    pending: BinaryHeap<Reverse<PendingReply>>,
    next_id: u64,
}

impl ReplyQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            pending: BinaryHeap::new(),
            next_id: 1,
        }
    }

    pub fn schedule(&mut self, delay: Duration) -> ScheduledReply {
        let id = ReplyTimerId::new(self.next_id);
        self.next_id += 1;

        let due = self.clock.now().saturating_add(delay);
        self.pending.push(Reverse(PendingReply { due, id }));
        ScheduledReply { id, delay }
    }

    /// Removes and returns every reply whose deadline has passed.
    pub fn take_due(&mut self) -> Vec<ReplyTimerId> {
        let now = self.clock.now();
        let mut fired = Vec::new();

        while let Some(Reverse(next)) = self.pending.peek() {
            if next.due > now {
                break;
            }
            fired.push(next.id);
            self.pending.pop();
        }

        fired
    }

    /// Time remaining until the earliest pending deadline.
    pub fn next_due_in(&self) -> Option<Duration> {
        let Reverse(next) = self.pending.peek()?;
        Some(next.due.saturating_sub(self.clock.now()))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> (ManualClock, ReplyQueue) {
        let clock = ManualClock::new();
        let queue = ReplyQueue::new(Arc::new(clock.clone()));
        (clock, queue)
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let (clock, mut queue) = queue();
        queue.schedule(Duration::from_millis(1000));

        clock.advance(Duration::from_millis(999));
        assert!(queue.take_due().is_empty());
        assert_eq!(queue.next_due_in(), Some(Duration::from_millis(1)));

        clock.advance(Duration::from_millis(1));
        assert_eq!(queue.take_due(), vec![ReplyTimerId::new(1)]);
        assert!(queue.is_empty());
        assert_eq!(queue.next_due_in(), None);
    }

    #[test]
    fn staggered_replies_fire_in_deadline_order_once() {
        let (clock, mut queue) = queue();
        let first = queue.schedule(Duration::from_millis(1000));
        clock.advance(Duration::from_millis(300));
        let second = queue.schedule(Duration::from_millis(1000));

        clock.advance(Duration::from_millis(700));
        assert_eq!(queue.take_due(), vec![first.id]);
        assert_eq!(queue.len(), 1);

        clock.advance(Duration::from_millis(5_000));
        assert_eq!(queue.take_due(), vec![second.id]);
        assert!(queue.take_due().is_empty());
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let (clock, mut queue) = queue();
        let ids = (0..3)
            .map(|_| queue.schedule(Duration::from_millis(10)).id)
            .collect::<Vec<_>>();

        clock.advance(Duration::from_millis(10));
        assert_eq!(queue.take_due(), ids);
    }
}
