// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hold confirmation.
//!
//! A match only counts once it has been held without interruption: for a
//! duration, for a number of frames, or (in instant mode) for a single frame.
//! Any negative signal discards all accumulated evidence; there is no decay
//! and no grace period.

use crate::config::HoldMode;

/// State of the hold machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoldState {
    /// No positive signal since the last reset.
    #[default]
    Idle,
    /// Accumulating evidence.
    Holding,
    /// Threshold reached on this update. Momentary: the machine is already
    /// back in [`HoldState::Idle`] when this is reported.
    Confirmed,
}

/// Result of feeding one match signal to a [`HoldTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldUpdate {
    /// Progress toward confirmation in `[0, 1]`.
    pub progress: f32,
    /// `true` exactly on the update that reached the threshold.
    pub just_confirmed: bool,
    /// State reported for this update.
    pub state: HoldState,
    /// Evidence after this update: elapsed ms (time mode) or consecutive
    /// frames (count and instant modes). Zero after a reset or confirmation.
    pub evidence: f64,
}

/// Contiguous-run hold detector.
#[derive(Debug, Clone)]
pub struct HoldTracker {
    mode: HoldMode,
    state: HoldState,
    start_ms: Option<f64>,
    frames: u32,
    evidence: f64,
}

impl HoldTracker {
    /// Create an idle tracker.
    #[must_use]
    pub const fn new(mode: HoldMode) -> Self {
        Self {
            mode,
            state: HoldState::Idle,
            start_ms: None,
            frames: 0,
            evidence: 0.0,
        }
    }

    /// Confirmation mode.
    #[must_use]
    pub const fn mode(&self) -> HoldMode {
        self.mode
    }

    /// Current state; never [`HoldState::Confirmed`] between updates.
    #[must_use]
    pub const fn state(&self) -> HoldState {
        self.state
    }

    /// Evidence accumulated so far.
    #[must_use]
    pub const fn evidence(&self) -> f64 {
        self.evidence
    }

    /// Progress toward confirmation in `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(&self) -> f32 {
        let fraction = match self.mode {
            HoldMode::Time { duration_ms } => self.evidence / duration_ms,
            HoldMode::Count { frames } => self.evidence / f64::from(frames),
            HoldMode::Instant => self.evidence,
        };
        fraction.clamp(0.0, 1.0) as f32
    }

    /// Discard all evidence and return to [`HoldState::Idle`].
    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
        self.start_ms = None;
        self.frames = 0;
        self.evidence = 0.0;
    }

    /// Feed one match signal observed at `now_ms`.
    ///
    /// `now_ms` is only read in time mode.
    pub fn update(&mut self, matched: bool, now_ms: f64) -> HoldUpdate {
        if !matched {
            self.reset();
            return self.report();
        }

        let reached = match self.mode {
            HoldMode::Time { duration_ms } => {
                let start = *self.start_ms.get_or_insert(now_ms);
                self.evidence = (now_ms - start).max(0.0);
                self.evidence >= duration_ms
            }
            HoldMode::Count { frames } => {
                self.frames = self.frames.saturating_add(1);
                self.evidence = f64::from(self.frames);
                self.frames >= frames
            }
            HoldMode::Instant => true,
        };

        if reached {
            self.reset();
            return HoldUpdate {
                progress: 1.0,
                just_confirmed: true,
                state: HoldState::Confirmed,
                evidence: 0.0,
            };
        }

        self.state = HoldState::Holding;
        self.report()
    }

    fn report(&self) -> HoldUpdate {
        HoldUpdate {
            progress: self.progress(),
            just_confirmed: false,
            state: self.state,
            evidence: self.evidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_49_then_miss_does_not_confirm() {
        let mut hold = HoldTracker::new(HoldMode::Count { frames: 50 });
        for i in 1..=49 {
            let update = hold.update(true, 0.0);
            assert!(!update.just_confirmed);
            assert_eq!(update.state, HoldState::Holding);
            assert!((update.evidence - f64::from(i)).abs() < f64::EPSILON);
        }
        let update = hold.update(false, 0.0);
        assert!(!update.just_confirmed);
        assert_eq!(update.state, HoldState::Idle);
        assert!(update.evidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_count_confirms_exactly_once_on_fiftieth() {
        let mut hold = HoldTracker::new(HoldMode::Count { frames: 50 });
        for _ in 0..49 {
            hold.update(true, 0.0);
        }
        hold.update(false, 0.0);

        let mut confirmations = 0;
        for i in 1..=50 {
            let update = hold.update(true, 0.0);
            if update.just_confirmed {
                confirmations += 1;
                assert_eq!(i, 50);
                assert_eq!(update.state, HoldState::Confirmed);
                assert!(update.evidence.abs() < f64::EPSILON);
            }
        }
        assert_eq!(confirmations, 1);
        assert_eq!(hold.state(), HoldState::Idle);
        assert!(hold.evidence().abs() < f64::EPSILON);
    }

    #[test]
    fn test_count_progress_fraction() {
        let mut hold = HoldTracker::new(HoldMode::Count { frames: 4 });
        assert!((hold.update(true, 0.0).progress - 0.25).abs() < f32::EPSILON);
        assert!((hold.update(true, 0.0).progress - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_time_evidence_strictly_increases_then_resets() {
        let mut hold = HoldTracker::new(HoldMode::Time { duration_ms: 3000.0 });
        let mut last = -1.0;
        for t in (1000..=3999).step_by(333) {
            let update = hold.update(true, f64::from(t));
            assert!(update.evidence > last);
            last = update.evidence;
        }
        let update = hold.update(true, 3999.0);
        assert!((update.evidence - 2999.0).abs() < f64::EPSILON);
        assert!(!update.just_confirmed);

        let update = hold.update(false, 4000.0);
        assert!(update.evidence.abs() < f64::EPSILON);
        assert_eq!(update.state, HoldState::Idle);
        assert!(update.progress.abs() < f32::EPSILON);
    }

    #[test]
    fn test_time_confirms_at_duration() {
        let mut hold = HoldTracker::new(HoldMode::Time { duration_ms: 3000.0 });
        assert!(!hold.update(true, 500.0).just_confirmed);
        let halfway = hold.update(true, 2000.0);
        assert!((halfway.progress - 0.5).abs() < 1e-6);
        let update = hold.update(true, 3500.0);
        assert!(update.just_confirmed);
        assert!(hold.evidence().abs() < f64::EPSILON);

        // The next run starts from scratch.
        let update = hold.update(true, 3600.0);
        assert!(!update.just_confirmed);
        assert!(update.evidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_instant_confirms_on_first_match() {
        let mut hold = HoldTracker::new(HoldMode::Instant);
        assert_eq!(hold.mode(), HoldMode::Instant);
        assert!(!hold.update(false, 0.0).just_confirmed);
        let update = hold.update(true, 0.0);
        assert!(update.just_confirmed);
        assert!((update.progress - 1.0).abs() < f32::EPSILON);
    }
}
