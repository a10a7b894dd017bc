//! Cancellable timers whose ticks are delivered as events.
//!
//! Every timer lives in a [`TimerSlot`].  Starting a slot bumps its
//! generation and spawns a tokio task that pushes [`TimerEvent`]s carrying
//! that generation into a [`TimerSink`] (in production, the orchestrator's
//! single inbound channel).  Cancelling aborts the task and bumps the
//! generation again, so a tick that was already queued before the
//! cancellation is rejected by [`TimerSlot::accepts`] when it is finally
//! processed.
//!
//! ```text
//! TimerSlot::start_repeating ──spawn──▶ tick task ──TimerEvent{gen}──▶ sink
//!                                                                       │
//! owner: slot.accepts(event.generation)? act : drop  ◀──────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

// ---------------------------------------------------------------------------
// TimerKind / TimerEvent
// ---------------------------------------------------------------------------

/// Identifies which slot a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    CountdownTick,
    RecordingProgress,
    InstructionProgress,
    InstructionStep,
    InstructionAutoHide,
    VideoSettle,
}

/// One delivered tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub kind: TimerKind,
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// TimerSink
// ---------------------------------------------------------------------------

/// Destination for timer ticks.
///
/// The delivery function returns `false` once the receiver is gone, which
/// ends the tick task.
#[derive(Clone)]
pub struct TimerSink(Arc<dyn Fn(TimerEvent) -> bool + Send + Sync>);

impl TimerSink {
    pub fn new(deliver: impl Fn(TimerEvent) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(deliver))
    }

    /// Sink that forwards ticks unchanged into a channel.
    pub fn from_channel(tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self::new(move |event| tx.send(event).is_ok())
    }

    fn deliver(&self, event: TimerEvent) -> bool {
        (self.0)(event)
    }
}

impl std::fmt::Debug for TimerSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerSink").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

/// A single exclusively-owned timer that can be invalidated at any time.
#[derive(Debug)]
pub struct TimerSlot {
    kind: TimerKind,
    sink: TimerSink,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn new(kind: TimerKind, sink: TimerSink) -> Self {
        Self {
            kind,
            sink,
            generation: 0,
            task: None,
        }
    }

    /// Tick every `period`, first tick one `period` from now.
    ///
    /// Any previously running timer in this slot is cancelled first.
    /// Returns the generation carried by the new ticks.
    pub fn start_repeating(&mut self, period: Duration) -> u64 {
        self.cancel();
        self.generation += 1;
        let event = TimerEvent {
            kind: self.kind,
            generation: self.generation,
        };
        let sink = self.sink.clone();

        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !sink.deliver(event) {
                    break;
                }
            }
        }));
        self.generation
    }

    /// Fire exactly once after `delay`.
    ///
    /// The owner calls [`finish`](Self::finish) when it accepts the tick.
    pub fn start_once(&mut self, delay: Duration) -> u64 {
        self.cancel();
        self.generation += 1;
        let event = TimerEvent {
            kind: self.kind,
            generation: self.generation,
        };
        let sink = self.sink.clone();

        self.task = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            sink.deliver(event);
        }));
        self.generation
    }

    /// Invalidate the running timer, if any.
    ///
    /// Idempotent and safe on a slot that was never started.  Returns `true`
    /// when a running timer was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                self.generation += 1;
                true
            }
            None => false,
        }
    }

    /// Retire a one-shot timer whose tick has been accepted.
    pub fn finish(&mut self) {
        self.cancel();
    }

    /// `true` if a tick carrying `generation` should be acted upon.
    pub fn accepts(&self, generation: u64) -> bool {
        self.task.is_some() && generation == self.generation
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(kind: TimerKind) -> (TimerSlot, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TimerSlot::new(kind, TimerSink::from_channel(tx)), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn repeating_timer_ticks_with_current_generation() {
        let (mut slot, mut rx) = slot(TimerKind::CountdownTick);
        let generation = slot.start_repeating(Duration::from_secs(1));

        for _ in 0..3 {
            let ev = rx.recv().await.expect("tick");
            assert_eq!(ev.kind, TimerKind::CountdownTick);
            assert_eq!(ev.generation, generation);
            assert!(slot.accepts(ev.generation));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_waits_one_period() {
        let (mut slot, mut rx) = slot(TimerKind::CountdownTick);
        let start = Instant::now();
        slot.start_repeating(Duration::from_secs(1));

        rx.recv().await.expect("tick");
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn queued_tick_is_rejected_after_cancel() {
        let (mut slot, mut rx) = slot(TimerKind::RecordingProgress);
        slot.start_repeating(Duration::from_millis(100));

        let ev = rx.recv().await.expect("tick");
        assert!(slot.cancel());
        assert!(!slot.accepts(ev.generation));
        assert!(!slot.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_invalidates_previous_generation() {
        let (mut slot, mut rx) = slot(TimerKind::InstructionStep);
        let first = slot.start_once(Duration::from_millis(10));
        let second = slot.start_once(Duration::from_millis(20));
        assert_ne!(first, second);

        let ev = rx.recv().await.expect("tick");
        assert_eq!(ev.generation, second);
        assert!(!slot.accepts(first));
        assert!(slot.accepts(second));
    }

    #[tokio::test]
    async fn cancel_on_idle_slot_is_noop() {
        let (mut slot, _rx) = slot(TimerKind::VideoSettle);
        assert!(!slot.cancel());
        assert!(!slot.cancel());
        assert!(!slot.accepts(0));
    }

    #[tokio::test(start_paused = true)]
    async fn once_timer_fires_a_single_time() {
        let (mut slot, mut rx) = slot(TimerKind::InstructionAutoHide);
        slot.start_once(Duration::from_millis(5));

        let ev = rx.recv().await.expect("tick");
        assert!(slot.accepts(ev.generation));
        slot.finish();

        time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
