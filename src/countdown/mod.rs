//! Cancellable, tick-based countdown.
//!
//! ```text
//! Idle ──start(total)──▶ Active ──tick…──▶ remaining == 0 ──▶ Completed ──▶ Idle
//!                          │
//!                          └──cancel()──▶ Cancelled ──▶ Idle
//! ```
//!
//! Recording starts on the *first* tick, when `total - 1` ticks remain, so
//! the recorded clip lines up with the visible numbers.  See
//! [`CountdownEvent::starts_recording`].

use std::time::Duration;

use thiserror::Error;

use crate::timer::{TimerKind, TimerSink, TimerSlot};

/// Default spacing between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CountdownError {
    #[error("countdown is already active")]
    AlreadyActive,
    #[error("countdown needs at least one tick")]
    ZeroDuration,
}

/// Live countdown bookkeeping; only exists while the countdown is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    pub remaining_ticks: u32,
    pub total_ticks: u32,
}

/// Emitted by [`CountdownController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick { remaining: u32, total: u32 },
    Completed,
    Cancelled,
}

impl CountdownEvent {
    /// `true` for the tick at which recording must begin
    /// (`remaining == total - 1`).
    ///
    /// ```
    /// use face_capture::countdown::CountdownEvent;
    ///
    /// assert!(CountdownEvent::Tick { remaining: 3, total: 4 }.starts_recording());
    /// assert!(!CountdownEvent::Tick { remaining: 2, total: 4 }.starts_recording());
    /// assert!(!CountdownEvent::Completed.starts_recording());
    /// ```
    pub fn starts_recording(&self) -> bool {
        matches!(self, CountdownEvent::Tick { remaining, total } if *remaining + 1 == *total)
    }
}

// ---------------------------------------------------------------------------
// CountdownController
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct CountdownController {
    state: Option<CountdownState>,
    timer: TimerSlot,
}

impl CountdownController {
    pub fn new(sink: TimerSink) -> Self {
        Self {
            state: None,
            timer: TimerSlot::new(TimerKind::CountdownTick, sink),
        }
    }

    /// Begin a countdown of `total_ticks` ticks spaced `tick_interval` apart.
    ///
    /// Fails without side effects if a countdown is already active.
    pub fn start(
        &mut self,
        total_ticks: u32,
        tick_interval: Duration,
    ) -> Result<(), CountdownError> {
        if self.state.is_some() {
            return Err(CountdownError::AlreadyActive);
        }
        if total_ticks == 0 {
            return Err(CountdownError::ZeroDuration);
        }

        self.state = Some(CountdownState {
            remaining_ticks: total_ticks,
            total_ticks,
        });
        self.timer.start_repeating(tick_interval);
        log::debug!("countdown: started ({total_ticks} ticks every {tick_interval:?})");
        Ok(())
    }

    /// Process a delivered tick.
    ///
    /// Stale ticks (from a cancelled or finished countdown) produce nothing.
    /// The final tick yields `Tick { remaining: 0 }` followed by `Completed`,
    /// and the timer is disabled before `Completed` is returned.
    pub fn on_tick(&mut self, generation: u64) -> Vec<CountdownEvent> {
        if !self.timer.accepts(generation) {
            log::trace!("countdown: dropping stale tick (gen {generation})");
            return Vec::new();
        }
        let Some(state) = self.state.as_mut() else {
            self.timer.cancel();
            return Vec::new();
        };

        state.remaining_ticks = state.remaining_ticks.saturating_sub(1);
        let mut events = vec![CountdownEvent::Tick {
            remaining: state.remaining_ticks,
            total: state.total_ticks,
        }];

        if state.remaining_ticks == 0 {
            self.timer.cancel();
            self.state = None;
            events.push(CountdownEvent::Completed);
            log::debug!("countdown: completed");
        }
        events
    }

    /// Abort the countdown.
    ///
    /// Returns `Some(Cancelled)` when an active countdown was stopped and
    /// `None` (no event, no state change) when already idle.
    pub fn cancel(&mut self) -> Option<CountdownEvent> {
        self.timer.cancel();
        self.state.take().map(|_| {
            log::debug!("countdown: cancelled");
            CountdownEvent::Cancelled
        })
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<CountdownState> {
        self.state
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerEvent;
    use tokio::sync::mpsc;

    fn controller() -> (CountdownController, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CountdownController::new(TimerSink::from_channel(tx)), rx)
    }

    async fn drive_to_end(
        c: &mut CountdownController,
        rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
    ) -> Vec<CountdownEvent> {
        let mut all = Vec::new();
        while c.is_active() {
            let ev = rx.recv().await.expect("tick");
            all.extend(c.on_tick(ev.generation));
        }
        all
    }

    #[tokio::test(start_paused = true)]
    async fn four_tick_countdown_sequence() {
        let (mut c, mut rx) = controller();
        c.start(4, DEFAULT_TICK_INTERVAL).unwrap();

        let events = drive_to_end(&mut c, &mut rx).await;
        assert_eq!(
            events,
            vec![
                CountdownEvent::Tick { remaining: 3, total: 4 },
                CountdownEvent::Tick { remaining: 2, total: 4 },
                CountdownEvent::Tick { remaining: 1, total: 4 },
                CountdownEvent::Tick { remaining: 0, total: 4 },
                CountdownEvent::Completed,
            ]
        );
        assert!(!c.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn recording_starts_exactly_once_at_total_minus_one() {
        let (mut c, mut rx) = controller();
        c.start(4, DEFAULT_TICK_INTERVAL).unwrap();

        let events = drive_to_end(&mut c, &mut rx).await;
        let starts: Vec<_> = events.iter().filter(|e| e.starts_recording()).collect();
        assert_eq!(starts, vec![&CountdownEvent::Tick { remaining: 3, total: 4 }]);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_active_fails() {
        let (mut c, _rx) = controller();
        c.start(3, DEFAULT_TICK_INTERVAL).unwrap();
        assert_eq!(
            c.start(5, DEFAULT_TICK_INTERVAL),
            Err(CountdownError::AlreadyActive)
        );
        assert_eq!(c.state().unwrap().total_ticks, 3);
    }

    #[tokio::test]
    async fn zero_ticks_is_rejected() {
        let (mut c, _rx) = controller();
        assert_eq!(c.start(0, DEFAULT_TICK_INTERVAL), Err(CountdownError::ZeroDuration));
        assert!(!c.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent_and_drops_pending_ticks() {
        let (mut c, mut rx) = controller();
        c.start(4, DEFAULT_TICK_INTERVAL).unwrap();

        let ev = rx.recv().await.expect("tick");
        assert_eq!(c.cancel(), Some(CountdownEvent::Cancelled));
        assert_eq!(c.cancel(), None);
        assert!(c.on_tick(ev.generation).is_empty());
    }

    #[tokio::test]
    async fn cancel_when_idle_emits_nothing() {
        let (mut c, _rx) = controller();
        assert_eq!(c.cancel(), None);
        assert!(c.state().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn tick_after_completion_is_ignored() {
        let (mut c, mut rx) = controller();
        c.start(1, DEFAULT_TICK_INTERVAL).unwrap();

        let ev = rx.recv().await.expect("tick");
        let events = c.on_tick(ev.generation);
        assert_eq!(events.last(), Some(&CountdownEvent::Completed));
        assert!(c.on_tick(ev.generation).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_cancel_uses_fresh_generation() {
        let (mut c, mut rx) = controller();
        c.start(4, DEFAULT_TICK_INTERVAL).unwrap();
        c.cancel();
        c.start(2, DEFAULT_TICK_INTERVAL).unwrap();

        let ev = rx.recv().await.expect("tick");
        assert_eq!(
            c.on_tick(ev.generation),
            vec![CountdownEvent::Tick { remaining: 1, total: 2 }]
        );
    }
}
