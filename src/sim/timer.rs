//! Scene-owned deferred actions
//!
//! Fire-once timers keyed by id. The owner advances them with the tick clock
//! and drops or cancels them on teardown, so nothing scheduled by a scene can
//! fire after that scene is gone.

const DUE_SLACK: f64 = 1e-6;

/// Handle to a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<A> {
    id: TimerId,
    due: f64,
    action: A,
}

/// Pending timers with a monotonically advancing clock (seconds)
///
/// The clock is f64: an f32 stops absorbing 1/60 s steps after a few days.
#[derive(Debug, Clone)]
pub struct Timers<A> {
    pending: Vec<Pending<A>>,
    now: f64,
    next_id: u64,
}

impl<A> Default for Timers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Timers<A> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            now: 0.0,
            next_id: 1,
        }
    }

    /// Run `action` once after `delay` seconds
    pub fn schedule(&mut self, delay: f32, action: A) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + f64::from(delay.max(0.0)),
            action,
        });
        id
    }

    /// Cancel a single timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending timer whose action matches
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&A) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.action));
        before - self.pending.len()
    }

    /// Cancel everything (scene teardown)
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Advance the clock and return due actions, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<A> {
        self.now += f64::from(dt);
        let now = self.now;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            // Tolerates f32 delays that are not exact multiples of the step
            if self.pending[i].due <= now + DUE_SLACK {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| p.action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Seconds since the timer set was created
    pub fn now(&self) -> f64 {
        self.now
    }
}
