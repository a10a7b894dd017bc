//! Tutorial sequencing with pause, resume and skip.
//!
//! ```text
//! Hidden ──start──▶ Showing ──▶ StepActive ──step timer──▶ Advancing ──▶ StepActive (next)
//!                                  │    ▲                      │
//!                               pause  resume                  └─ last step ──▶ Completed
//!                                  ▼    │                                           │
//!                                 Paused                         auto-hide delay ──▶ Hidden
//! ```
//!
//! Each active step runs two timers: a high-frequency *progress* timer
//! driving the 0→1 ratio and a one-shot *step* timer firing at the step's
//! duration.  Pausing keeps the accumulated progress `p`; resuming restarts
//! both timers with `duration * (1 - p)` remaining.

use std::time::Duration;

use tokio::time::Instant;

use super::{InstructionStep, InstructionTrigger};
use crate::config::InstructionConfig;
use crate::timer::{TimerEvent, TimerKind, TimerSink, TimerSlot};

/// Time left in a step of `duration` paused at `progress`.
///
/// ```
/// use std::time::Duration;
/// use face_capture::instructions::remaining_after_pause;
///
/// let left = remaining_after_pause(Duration::from_secs(4), 0.25);
/// assert_eq!(left, Duration::from_secs(3));
/// ```
pub fn remaining_after_pause(duration: Duration, progress: f32) -> Duration {
    duration.mul_f64(1.0 - f64::from(progress.clamp(0.0, 1.0)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Hidden,
    Showing,
    StepActive,
    Paused,
    Advancing,
}

/// Emitted by the sequencer for the orchestrator to forward or act on.
#[derive(Debug, Clone, PartialEq)]
pub enum InstructionEvent {
    Shown(InstructionTrigger),
    StepStarted {
        index: usize,
        text: String,
        animation: Option<String>,
    },
    Progress {
        index: usize,
        ratio: f32,
    },
    Paused {
        index: usize,
        progress: f32,
    },
    Resumed {
        index: usize,
        remaining: Duration,
    },
    Completed,
    Hidden,
    /// Ask the orchestrator to pause (`true`) or resume (`false`) detection.
    RequestPauseDetection(bool),
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    started: Instant,
    base_progress: f32,
}

#[derive(Debug)]
pub struct InstructionSequencer {
    enabled: bool,
    steps: Vec<InstructionStep>,
    pending_steps: Option<Vec<InstructionStep>>,
    state: SequencerState,
    index: usize,
    segment: Option<Segment>,
    saved_progress: f32,
    progress_timer: TimerSlot,
    step_timer: TimerSlot,
    hide_timer: TimerSlot,
    progress_interval: Duration,
    auto_hide_delay: Duration,
    redisplay_min_interval: Duration,
    last_trigger: Option<InstructionTrigger>,
    last_display: Option<Instant>,
    holds_detection_pause: bool,
}

impl InstructionSequencer {
    pub fn new(config: &InstructionConfig, sink: TimerSink) -> Self {
        Self {
            enabled: config.enabled,
            steps: config.steps.iter().map(InstructionStep::from).collect(),
            pending_steps: None,
            state: SequencerState::Hidden,
            index: 0,
            segment: None,
            saved_progress: 0.0,
            progress_timer: TimerSlot::new(TimerKind::InstructionProgress, sink.clone()),
            step_timer: TimerSlot::new(TimerKind::InstructionStep, sink.clone()),
            hide_timer: TimerSlot::new(TimerKind::InstructionAutoHide, sink),
            progress_interval: Duration::from_millis(config.progress_interval_ms.max(1)),
            auto_hide_delay: Duration::from_millis(config.auto_hide_delay_ms),
            redisplay_min_interval: Duration::from_secs(config.redisplay_min_interval_secs),
            last_trigger: None,
            last_display: None,
            holds_detection_pause: false,
        }
    }

    /// Swap in new settings.  Step changes made while a tutorial is running
    /// take effect the next time it starts.
    pub fn apply_configuration(&mut self, config: &InstructionConfig) {
        self.enabled = config.enabled;
        self.progress_interval = Duration::from_millis(config.progress_interval_ms.max(1));
        self.auto_hide_delay = Duration::from_millis(config.auto_hide_delay_ms);
        self.redisplay_min_interval = Duration::from_secs(config.redisplay_min_interval_secs);

        let steps: Vec<_> = config.steps.iter().map(InstructionStep::from).collect();
        if self.state == SequencerState::Hidden {
            self.steps = steps;
        } else {
            self.pending_steps = Some(steps);
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state != SequencerState::Hidden
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Show the tutorial from step 0.
    pub fn start(&mut self, trigger: InstructionTrigger) -> Vec<InstructionEvent> {
        if self.steps.is_empty() {
            log::debug!("instructions: no steps configured, nothing to show");
            return Vec::new();
        }
        self.cancel_timers();
        self.index = 0;
        self.state = SequencerState::Showing;
        self.last_display = Some(Instant::now());
        self.last_trigger = Some(trigger.clone());
        log::debug!("instructions: showing ({trigger:?})");

        let mut events = vec![InstructionEvent::Shown(trigger)];
        if !self.holds_detection_pause {
            self.holds_detection_pause = true;
            events.push(InstructionEvent::RequestPauseDetection(true));
        }
        events.push(self.begin_step(0.0));
        events
    }

    /// Trigger-driven display: only when nothing is showing, the minimum
    /// interval since the last display has elapsed, and `trigger` differs
    /// from the last displayed one.
    pub fn request_display(&mut self, trigger: InstructionTrigger) -> Vec<InstructionEvent> {
        if !self.enabled || self.state != SequencerState::Hidden {
            return Vec::new();
        }
        if let Some(last) = self.last_display {
            if last.elapsed() < self.redisplay_min_interval {
                log::debug!("instructions: redisplay suppressed (too soon)");
                return Vec::new();
            }
        }
        if self.last_trigger.as_ref() == Some(&trigger) {
            log::debug!("instructions: redisplay suppressed (same trigger)");
            return Vec::new();
        }
        self.start(trigger)
    }

    /// Freeze the current step, keeping its accumulated progress.
    pub fn pause(&mut self) -> Vec<InstructionEvent> {
        if self.state != SequencerState::StepActive {
            return Vec::new();
        }
        self.saved_progress = self.current_progress();
        self.segment = None;
        self.progress_timer.cancel();
        self.step_timer.cancel();
        self.state = SequencerState::Paused;
        vec![InstructionEvent::Paused {
            index: self.index,
            progress: self.saved_progress,
        }]
    }

    /// Continue a paused step with `duration * (1 - saved)` remaining.
    pub fn resume(&mut self) -> Vec<InstructionEvent> {
        if self.state != SequencerState::Paused {
            return Vec::new();
        }
        let remaining = remaining_after_pause(self.steps[self.index].duration, self.saved_progress);
        self.start_segment(self.saved_progress);
        self.state = SequencerState::StepActive;
        vec![InstructionEvent::Resumed {
            index: self.index,
            remaining,
        }]
    }

    /// Complete the current step immediately and move on.
    pub fn skip(&mut self) -> Vec<InstructionEvent> {
        match self.state {
            SequencerState::StepActive | SequencerState::Paused => {
                self.progress_timer.cancel();
                self.step_timer.cancel();
                self.advance()
            }
            _ => Vec::new(),
        }
    }

    /// Close the overlay, releasing any detection pause it holds.
    pub fn hide(&mut self) -> Vec<InstructionEvent> {
        if self.state == SequencerState::Hidden {
            return Vec::new();
        }
        self.cancel_timers();
        self.segment = None;
        self.state = SequencerState::Hidden;
        if let Some(steps) = self.pending_steps.take() {
            self.steps = steps;
        }

        let mut events = Vec::new();
        if self.holds_detection_pause {
            self.holds_detection_pause = false;
            events.push(InstructionEvent::RequestPauseDetection(false));
        }
        events.push(InstructionEvent::Hidden);
        events
    }

    /// Route a timer tick owned by this sequencer.
    pub fn on_timer(&mut self, event: TimerEvent) -> Vec<InstructionEvent> {
        match event.kind {
            TimerKind::InstructionProgress => {
                if !self.progress_timer.accepts(event.generation)
                    || self.state != SequencerState::StepActive
                {
                    return Vec::new();
                }
                vec![InstructionEvent::Progress {
                    index: self.index,
                    ratio: self.current_progress(),
                }]
            }
            TimerKind::InstructionStep => {
                if !self.step_timer.accepts(event.generation) {
                    return Vec::new();
                }
                self.step_timer.finish();
                self.progress_timer.cancel();
                self.advance()
            }
            TimerKind::InstructionAutoHide => {
                if !self.hide_timer.accepts(event.generation) {
                    return Vec::new();
                }
                self.hide_timer.finish();
                self.hide()
            }
            _ => Vec::new(),
        }
    }

    fn current_progress(&self) -> f32 {
        let Some(segment) = self.segment else {
            return self.saved_progress;
        };
        let duration = self.steps[self.index].duration;
        if duration.is_zero() {
            return 1.0;
        }
        let elapsed = segment.started.elapsed().as_secs_f64() / duration.as_secs_f64();
        (f64::from(segment.base_progress) + elapsed).min(1.0) as f32
    }

    fn begin_step(&mut self, base_progress: f32) -> InstructionEvent {
        self.state = SequencerState::StepActive;
        self.saved_progress = base_progress;
        self.start_segment(base_progress);
        let step = &self.steps[self.index];
        InstructionEvent::StepStarted {
            index: self.index,
            text: step.text.clone(),
            animation: step.animation.clone(),
        }
    }

    fn start_segment(&mut self, base_progress: f32) {
        let remaining = remaining_after_pause(self.steps[self.index].duration, base_progress);
        self.segment = Some(Segment {
            started: Instant::now(),
            base_progress,
        });
        self.progress_timer.start_repeating(self.progress_interval);
        self.step_timer.start_once(remaining);
    }

    fn advance(&mut self) -> Vec<InstructionEvent> {
        self.state = SequencerState::Advancing;
        self.segment = None;
        let mut events = vec![InstructionEvent::Progress {
            index: self.index,
            ratio: 1.0,
        }];

        if self.index + 1 < self.steps.len() {
            self.index += 1;
            events.push(self.begin_step(0.0));
        } else {
            events.extend(self.complete());
        }
        events
    }

    fn complete(&mut self) -> Vec<InstructionEvent> {
        log::debug!("instructions: sequence completed");
        self.progress_timer.cancel();
        self.step_timer.cancel();
        self.state = SequencerState::Showing;
        self.hide_timer.start_once(self.auto_hide_delay);

        let mut events = vec![InstructionEvent::Completed];
        if self.holds_detection_pause {
            self.holds_detection_pause = false;
            events.push(InstructionEvent::RequestPauseDetection(false));
        }
        events
    }

    fn cancel_timers(&mut self) {
        self.progress_timer.cancel();
        self.step_timer.cancel();
        self.hide_timer.cancel();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InstructionStepConfig;
    use tokio::sync::mpsc;

    fn config(durations_ms: &[u64]) -> InstructionConfig {
        InstructionConfig {
            steps: durations_ms
                .iter()
                .enumerate()
                .map(|(i, &d)| InstructionStepConfig {
                    text: format!("step {i}"),
                    animation: None,
                    duration_ms: d,
                })
                .collect(),
            progress_interval_ms: 50,
            auto_hide_delay_ms: 500,
            redisplay_min_interval_secs: 5,
            ..InstructionConfig::default()
        }
    }

    fn sequencer(
        durations_ms: &[u64],
    ) -> (InstructionSequencer, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            InstructionSequencer::new(&config(durations_ms), TimerSink::from_channel(tx)),
            rx,
        )
    }

    /// Feed ticks until one produces an event matching `pred`.
    async fn run_until(
        seq: &mut InstructionSequencer,
        rx: &mut mpsc::UnboundedReceiver<TimerEvent>,
        pred: impl Fn(&InstructionEvent) -> bool,
    ) -> Vec<InstructionEvent> {
        let mut seen = Vec::new();
        loop {
            let ev = rx.recv().await.expect("tick");
            let out = seq.on_timer(ev);
            let hit = out.iter().any(&pred);
            seen.extend(out);
            if hit {
                return seen;
            }
        }
    }

    #[test]
    fn remaining_after_pause_arithmetic() {
        let d = Duration::from_secs(3);
        assert_eq!(remaining_after_pause(d, 0.0), d);
        assert_eq!(remaining_after_pause(d, 1.0), Duration::ZERO);
        assert_eq!(remaining_after_pause(d, 1.5), Duration::ZERO);
        let half = remaining_after_pause(d, 0.5);
        assert!((half.as_secs_f64() - 1.5).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn start_pauses_detection_and_shows_first_step() {
        let (mut seq, _rx) = sequencer(&[1000, 1000]);
        let events = seq.start(InstructionTrigger::OnStart);

        assert_eq!(events[0], InstructionEvent::Shown(InstructionTrigger::OnStart));
        assert_eq!(events[1], InstructionEvent::RequestPauseDetection(true));
        assert!(matches!(events[2], InstructionEvent::StepStarted { index: 0, .. }));
        assert_eq!(seq.state(), SequencerState::StepActive);
    }

    #[tokio::test(start_paused = true)]
    async fn full_sequence_completes_resumes_detection_and_auto_hides() {
        let (mut seq, mut rx) = sequencer(&[200, 200]);
        seq.start(InstructionTrigger::OnStart);

        let events = run_until(&mut seq, &mut rx, |e| *e == InstructionEvent::Completed).await;
        assert!(events.contains(&InstructionEvent::StepStarted {
            index: 1,
            text: "step 1".into(),
            animation: None
        }));
        assert!(events.contains(&InstructionEvent::RequestPauseDetection(false)));
        assert!(seq.is_visible());

        let events = run_until(&mut seq, &mut rx, |e| *e == InstructionEvent::Hidden).await;
        assert_eq!(events, vec![InstructionEvent::Hidden]);
        assert_eq!(seq.state(), SequencerState::Hidden);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_reported_between_zero_and_one() {
        let (mut seq, mut rx) = sequencer(&[1000]);
        seq.start(InstructionTrigger::OnStart);

        let ev = rx.recv().await.expect("tick");
        let out = seq.on_timer(ev);
        match out.as_slice() {
            [InstructionEvent::Progress { index: 0, ratio }] => {
                assert!((*ratio - 0.05).abs() < 1e-3, "ratio was {ratio}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pause_resume_round_trip_preserves_total_duration() {
        let (mut seq, mut rx) = sequencer(&[3000, 3000]);
        let t0 = Instant::now();
        seq.start(InstructionTrigger::OnStart);

        tokio::time::sleep(Duration::from_millis(1200)).await;
        let paused = seq.pause();
        let before_pause = t0.elapsed();
        let progress = match paused.as_slice() {
            [InstructionEvent::Paused { index: 0, progress }] => *progress,
            other => panic!("unexpected {other:?}"),
        };
        assert!((progress - 0.4).abs() < 1e-3);

        // Time spent paused must not count.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seq.state(), SequencerState::Paused);

        let resumed_at = Instant::now();
        let resumed = seq.resume();
        match resumed.as_slice() {
            [InstructionEvent::Resumed { index: 0, remaining }] => {
                assert!((remaining.as_secs_f64() - 1.8).abs() < 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }

        run_until(&mut seq, &mut rx, |e| {
            matches!(e, InstructionEvent::StepStarted { index: 1, .. })
        })
        .await;
        let after_resume = resumed_at.elapsed();
        let total = before_pause + after_resume;
        assert!(
            (total.as_secs_f64() - 3.0).abs() < 0.01,
            "total step time was {total:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn skip_completes_current_step_immediately() {
        let (mut seq, _rx) = sequencer(&[5000, 5000]);
        seq.start(InstructionTrigger::OnStart);

        let events = seq.skip();
        assert_eq!(events[0], InstructionEvent::Progress { index: 0, ratio: 1.0 });
        assert!(matches!(events[1], InstructionEvent::StepStarted { index: 1, .. }));

        let events = seq.skip();
        assert!(events.contains(&InstructionEvent::Completed));
    }

    #[tokio::test(start_paused = true)]
    async fn skip_while_paused_advances() {
        let (mut seq, _rx) = sequencer(&[5000, 5000]);
        seq.start(InstructionTrigger::OnStart);
        seq.pause();

        let events = seq.skip();
        assert!(matches!(events[1], InstructionEvent::StepStarted { index: 1, .. }));
        assert_eq!(seq.state(), SequencerState::StepActive);
    }

    #[tokio::test(start_paused = true)]
    async fn hide_releases_detection_pause() {
        let (mut seq, _rx) = sequencer(&[5000]);
        seq.start(InstructionTrigger::OnStart);

        let events = seq.hide();
        assert_eq!(
            events,
            vec![
                InstructionEvent::RequestPauseDetection(false),
                InstructionEvent::Hidden
            ]
        );
        assert!(seq.hide().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_step_tick_after_skip_is_ignored() {
        let (mut seq, mut rx) = sequencer(&[100, 5000]);
        seq.start(InstructionTrigger::OnStart);

        tokio::time::sleep(Duration::from_millis(150)).await;
        seq.skip(); // step 0 timer already queued its tick

        while let Ok(ev) = rx.try_recv() {
            let out = seq.on_timer(ev);
            assert!(
                !out.iter().any(|e| matches!(e, InstructionEvent::StepStarted { .. })),
                "stale tick advanced the sequence: {out:?}"
            );
        }
        assert_eq!(seq.current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn redisplay_requires_interval_and_distinct_trigger() {
        let (mut seq, _rx) = sequencer(&[100]);
        assert!(!seq.request_display(InstructionTrigger::OnStart).is_empty());
        seq.hide();

        // Too soon, even with a different trigger.
        assert!(seq
            .request_display(InstructionTrigger::Error("lost face".into()))
            .is_empty());

        tokio::time::sleep(Duration::from_secs(6)).await;

        // Same trigger as last time.
        assert!(seq.request_display(InstructionTrigger::OnStart).is_empty());

        // Different payload counts as a different trigger.
        assert!(!seq
            .request_display(InstructionTrigger::Error("lost face".into()))
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn redisplay_ignored_while_showing() {
        let (mut seq, _rx) = sequencer(&[1000]);
        seq.start(InstructionTrigger::OnStart);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(seq
            .request_display(InstructionTrigger::Error("x".into()))
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn step_changes_while_showing_apply_on_next_start() {
        let (mut seq, _rx) = sequencer(&[1000]);
        seq.start(InstructionTrigger::OnStart);

        seq.apply_configuration(&config(&[1000, 1000, 1000]));
        assert!(seq.skip().contains(&InstructionEvent::Completed));

        seq.hide();
        seq.start(InstructionTrigger::OnStart);
        let events = seq.skip();
        assert!(matches!(events[1], InstructionEvent::StepStarted { index: 1, .. }));
    }

    #[tokio::test]
    async fn empty_sequence_never_shows() {
        let (mut seq, _rx) = sequencer(&[]);
        assert!(seq.start(InstructionTrigger::OnStart).is_empty());
        assert!(!seq.is_visible());
    }
}
