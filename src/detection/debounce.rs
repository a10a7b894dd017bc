//! Edge detector over the optimal-position boolean.
//!
//! The orchestrator acts on transitions only.  A run of optimal frames yields
//! one [`OptimalityEdge::RoseToOptimal`] followed by `NoChange`, so a steady
//! face never re-triggers the countdown.

use super::DetectionSignal;

/// Transition of the optimal-position flag between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimalityEdge {
    RoseToOptimal,
    FellFromOptimal,
    NoChange,
}

/// Retains the previous optimality flag and reports edges.
///
/// ```
/// use face_capture::detection::{DetectionSignal, OptimalityEdge, SignalDebouncer};
///
/// let mut d = SignalDebouncer::new();
/// assert_eq!(d.observe(&DetectionSignal::optimal()), OptimalityEdge::RoseToOptimal);
/// assert_eq!(d.observe(&DetectionSignal::optimal()), OptimalityEdge::NoChange);
/// assert_eq!(d.observe(&DetectionSignal::no_face()), OptimalityEdge::FellFromOptimal);
/// ```
#[derive(Debug, Default)]
pub struct SignalDebouncer {
    was_optimal: bool,
}

impl SignalDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's signal and return the edge it produced.
    pub fn observe(&mut self, signal: &DetectionSignal) -> OptimalityEdge {
        let is_optimal = signal.is_optimal();
        let edge = match (self.was_optimal, is_optimal) {
            (false, true) => OptimalityEdge::RoseToOptimal,
            (true, false) => OptimalityEdge::FellFromOptimal,
            _ => OptimalityEdge::NoChange,
        };
        self.was_optimal = is_optimal;
        edge
    }

    pub fn was_optimal(&self) -> bool {
        self.was_optimal
    }

    /// Forget the retained flag; the next optimal frame rises again.
    pub fn reset(&mut self) {
        self.was_optimal = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_not_optimal() {
        let d = SignalDebouncer::new();
        assert!(!d.was_optimal());
    }

    #[test]
    fn face_without_correct_position_is_not_optimal() {
        let mut d = SignalDebouncer::new();
        let s = DetectionSignal::new(true, false, "Move closer");
        assert_eq!(d.observe(&s), OptimalityEdge::NoChange);
        assert!(!d.was_optimal());
    }

    #[test]
    fn toggling_produces_alternating_edges() {
        let mut d = SignalDebouncer::new();
        let seq = [true, true, false, false, true, false];
        let edges: Vec<_> = seq
            .iter()
            .map(|&ok| {
                let s = if ok {
                    DetectionSignal::optimal()
                } else {
                    DetectionSignal::no_face()
                };
                d.observe(&s)
            })
            .collect();

        assert_eq!(
            edges,
            vec![
                OptimalityEdge::RoseToOptimal,
                OptimalityEdge::NoChange,
                OptimalityEdge::FellFromOptimal,
                OptimalityEdge::NoChange,
                OptimalityEdge::RoseToOptimal,
                OptimalityEdge::FellFromOptimal,
            ]
        );
    }

    #[test]
    fn reset_allows_a_new_rise() {
        let mut d = SignalDebouncer::new();
        d.observe(&DetectionSignal::optimal());
        d.reset();
        assert_eq!(
            d.observe(&DetectionSignal::optimal()),
            OptimalityEdge::RoseToOptimal
        );
    }
}
