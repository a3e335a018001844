//! Deferred events on the frame clock
//!
//! Level-completion debounce, next-level load and TNT fuses are scheduled here
//! instead of running on their own timers. Everything fires from inside `tick`,
//! so deferred work is serialized with the frame loop.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled event, used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// Deferred simulation events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledEvent {
    /// Re-check that the level is still clear before completing it
    LevelCompletionCheck,
    /// Leave the level transition and load the current level
    LoadNextLevel,
    /// Fuse of the explosive with this id burned down
    Detonate(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    fire_at: f64,
    token: TimerToken,
    event: ScheduledEvent,
    cancelled: bool,
}

/// Frame-clock scheduler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    /// Milliseconds of unpaused simulation time
    now: f64,
    entries: Vec<Entry>,
    next_token: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock (ms)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward
    pub fn advance(&mut self, dt_ms: f32) {
        self.now += dt_ms.max(0.0) as f64;
    }

    /// Schedule `event` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f32, event: ScheduledEvent) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.push(Entry {
            fire_at: self.now + delay_ms.max(0.0) as f64,
            token,
            event,
            cancelled: false,
        });
        token
    }

    /// Invalidate a token. The entry is dropped once its time passes.
    pub fn cancel(&mut self, token: TimerToken) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.token == token) {
            entry.cancelled = true;
        }
    }

    /// True while the event is scheduled, not yet fired and not cancelled
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries
            .iter()
            .any(|e| e.token == token && !e.cancelled)
    }

    /// Milliseconds until the token fires (None if fired or cancelled)
    pub fn remaining(&self, token: TimerToken) -> Option<f32> {
        self.entries
            .iter()
            .find(|e| e.token == token && !e.cancelled)
            .map(|e| (e.fire_at - self.now).max(0.0) as f32)
    }

    /// Remove and return all due events, earliest first.
    /// Events scheduled at the same time keep their scheduling order.
    pub fn drain_due(&mut self) -> Vec<ScheduledEvent> {
        let now = self.now;
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.fire_at <= now {
                if !e.cancelled {
                    due.push(e.clone());
                }
                false
            } else {
                true
            }
        });
        // Tokens increase monotonically, so they break fire_at ties in scheduling order
        due.sort_by(|a, b| {
            a.fire_at
                .partial_cmp(&b.fire_at)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.token.0.cmp(&b.token.0))
        });
        due.into_iter().map(|e| e.event).collect()
    }

    /// Number of live (uncancelled) entries
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.cancelled).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_fires_after_delay() {
        let mut sched = Scheduler::new();
        sched.schedule(100.0, ScheduledEvent::LevelCompletionCheck);

        sched.advance(99.0);
        assert!(sched.drain_due().is_empty());

        sched.advance(1.0);
        assert_eq!(sched.drain_due(), vec![ScheduledEvent::LevelCompletionCheck]);
        // Fires once
        sched.advance(500.0);
        assert!(sched.drain_due().is_empty());
    }

    #[test]
    fn test_cancelled_event_never_fires() {
        let mut sched = Scheduler::new();
        let token = sched.schedule(50.0, ScheduledEvent::Detonate(7));
        assert!(sched.is_pending(token));

        sched.cancel(token);
        assert!(!sched.is_pending(token));

        sched.advance(100.0);
        assert!(sched.drain_due().is_empty());
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn test_due_events_in_fire_order() {
        let mut sched = Scheduler::new();
        sched.schedule(30.0, ScheduledEvent::Detonate(2));
        sched.schedule(10.0, ScheduledEvent::Detonate(1));
        sched.schedule(30.0, ScheduledEvent::LoadNextLevel);

        sched.advance(40.0);
        assert_eq!(
            sched.drain_due(),
            vec![
                ScheduledEvent::Detonate(1),
                ScheduledEvent::Detonate(2),
                ScheduledEvent::LoadNextLevel,
            ]
        );
    }

    #[test]
    fn test_remaining_time() {
        let mut sched = Scheduler::new();
        let token = sched.schedule(1000.0, ScheduledEvent::Detonate(3));
        sched.advance(250.0);
        let left = sched.remaining(token).unwrap();
        assert!((left - 750.0).abs() < 0.01);
    }
}
