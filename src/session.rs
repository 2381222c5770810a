// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame loop driving a [`GameController`].
//!
//! One iteration per frame: estimate poses, tick the controller with the first
//! detected pose, publish a [`Snapshot`]. Iterations never overlap, and
//! loading only happens in [`Session::begin`] / [`Session::restart`], never
//! while frames are being processed.

use std::cell::Cell;
use std::rc::Rc;

use crate::clock::ManualClock;
use crate::error::Result;
use crate::estimator::{Frame, PoseEstimator};
use crate::game::{GameController, Phase, Snapshot, TickOutcome};

/// Consumer of game state, typically a UI.
pub trait PresentationSink {
    /// Called after every processed frame.
    fn on_frame(&mut self, snapshot: &Snapshot);

    /// Called once when the last pose is passed.
    fn on_complete(&mut self, snapshot: &Snapshot) {
        let _ = snapshot;
    }

    /// Called with a player-facing message when the session cannot go on.
    fn on_error(&mut self, message: &str);
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_frame(&mut self, _snapshot: &Snapshot) {}

    fn on_error(&mut self, _message: &str) {}
}

/// Cancels a running [`Session::run`] before its next frame.
///
/// Clones share the flag. Stopping more than once has no further effect.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    stopped: Rc<Cell<bool>>,
}

impl StopHandle {
    /// Create a handle that is not stopped.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop.
    pub fn stop(&self) {
        self.stopped.set(true);
    }

    /// Whether stop has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }

    fn clear(&self) {
        self.stopped.set(false);
    }
}

/// Why [`Session::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionEnd {
    /// The game was not running when the loop was entered.
    #[default]
    NotRunning,
    /// Every pose was passed.
    Completed,
    /// Stop was requested.
    Stopped,
    /// The frame source ran out first.
    Exhausted,
}

/// Summary of one [`Session::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// How the loop ended.
    pub end: SessionEnd,
    /// Frames processed.
    pub frames: usize,
    /// Frames in which nobody was detected.
    pub empty_frames: usize,
    /// Pose changes triggered by holding, including the final one.
    pub confirmations: usize,
}

/// A game plus the loop that feeds it frames.
#[derive(Debug)]
pub struct Session {
    game: GameController,
    stop: StopHandle,
    frame_clock: Option<ManualClock>,
}

impl Session {
    /// Wrap a controller.
    #[must_use]
    pub fn new(game: GameController) -> Self {
        Self {
            game,
            stop: StopHandle::new(),
            frame_clock: None,
        }
    }

    /// Drive `clock` from frame timestamps.
    ///
    /// The same clock (or a clone) must have been given to the controller with
    /// [`GameController::with_clock`]. Frames without a timestamp leave it unchanged.
    #[must_use]
    pub fn with_frame_clock(mut self, clock: ManualClock) -> Self {
        self.frame_clock = Some(clock);
        self
    }

    /// Handle that stops [`Self::run`].
    #[must_use]
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// The controller.
    #[must_use]
    pub const fn game(&self) -> &GameController {
        &self.game
    }

    /// The controller, for UI actions such as [`GameController::skip`].
    pub fn game_mut(&mut self) -> &mut GameController {
        &mut self.game
    }

    /// Start the game.
    ///
    /// # Errors
    ///
    /// A start failure is reported to `sink` as a player-facing message and
    /// returned; the session can be started again afterwards.
    pub fn begin<S: PresentationSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.stop.clear();
        match self.game.start() {
            Ok(()) => {
                sink.on_frame(&self.game.snapshot());
                Ok(())
            }
            Err(e) => {
                sink.on_error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Restart the game from any phase.
    ///
    /// # Errors
    ///
    /// Same as [`Self::begin`].
    pub fn restart<S: PresentationSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.begin(sink)
    }

    /// Process frames until the game completes, stop is requested or `frames` runs out.
    ///
    /// # Errors
    ///
    /// An estimator failure ends the loop: it is reported to `sink` and returned.
    pub fn run<E, S, I>(&mut self, estimator: &mut E, frames: I, sink: &mut S) -> Result<SessionReport>
    where
        E: PoseEstimator + ?Sized,
        S: PresentationSink + ?Sized,
        I: IntoIterator<Item = Frame>,
    {
        let mut report = SessionReport::default();
        if self.game.phase() != Phase::Running {
            return Ok(report);
        }

        report.end = SessionEnd::Exhausted;
        for frame in frames {
            if self.stop.is_stopped() {
                report.end = SessionEnd::Stopped;
                break;
            }

            let poses = match estimator.estimate(&frame) {
                Ok(poses) => poses,
                Err(e) => {
                    self.stop.stop();
                    sink.on_error(&e.user_message());
                    return Err(e);
                }
            };
            if let (Some(clock), Some(t)) = (&self.frame_clock, frame.timestamp_ms) {
                clock.set(t);
            }

            let outcome = self.game.tick(poses.first());
            report.frames += 1;
            match outcome {
                TickOutcome::NoPose => report.empty_frames += 1,
                TickOutcome::Advanced { .. } | TickOutcome::Completed => report.confirmations += 1,
                TickOutcome::Idle | TickOutcome::Scored { .. } => {}
            }

            let snapshot = self.game.snapshot();
            sink.on_frame(&snapshot);
            if outcome == TickOutcome::Completed {
                self.stop.stop();
                sink.on_complete(&snapshot);
                report.end = SessionEnd::Completed;
                return Ok(report);
            }
        }

        if self.stop.is_stopped() {
            report.end = SessionEnd::Stopped;
        }
        Ok(report)
    }
}
