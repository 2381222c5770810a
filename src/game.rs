// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Game controller.
//!
//! [`GameController`] owns every piece of mutable session state: the shuffled
//! sequence, the current index, the hold tracker and the phase. It is driven
//! from outside: `start`, `skip` and `restart` come from the UI layer and
//! `tick` from whatever schedules frames (a render loop, [`crate::Session`],
//! or a test).

use std::fmt;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::clock::{Clock, MonotonicClock};
use crate::config::GameConfig;
use crate::error::Result;
use crate::hold::{HoldTracker, HoldUpdate};
use crate::keypoints::KeypointSet;
use crate::loader::{ImageRef, ReferenceLoader};
use crate::sequence::{ReferencePose, Sequence, build_sequence};
use crate::similarity::{MatchScore, score};

/// Lifecycle phase of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No sequence loaded yet.
    #[default]
    NotStarted,
    /// Accepting ticks.
    Running,
    /// Every pose in the sequence has been confirmed or skipped.
    Completed,
}

impl Phase {
    /// Lowercase phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a call to [`GameController::tick`], [`GameController::advance`] or
/// [`GameController::skip`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The game is not running; nothing changed.
    Idle,
    /// No pose was detected; evidence is untouched.
    NoPose,
    /// The live pose was scored and fed to the hold tracker.
    Scored {
        /// Similarity against the current reference.
        score: MatchScore,
        /// Hold tracker state after this frame.
        hold: HoldUpdate,
    },
    /// Moved on to the pose at `index`.
    Advanced {
        /// New current index.
        index: usize,
    },
    /// The last pose was passed; the game is over.
    Completed,
}

/// Observable state for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Index of the current pose; equals `total` once completed.
    pub current_index: usize,
    /// Number of poses in the sequence.
    pub total: usize,
    /// Image of the pose to copy, if any.
    pub current_image: Option<ImageRef>,
    /// Hold progress in `[0, 1]`.
    pub progress: f32,
    /// Raw hold evidence (ms or frames).
    pub hold_evidence: f64,
    /// Score of the most recent scored frame.
    pub last_score: Option<MatchScore>,
}

/// One copy-the-pose game.
pub struct GameController {
    config: GameConfig,
    loader: Box<dyn ReferenceLoader>,
    rng: Box<dyn RngCore>,
    clock: Box<dyn Clock>,
    sequence: Sequence,
    index: usize,
    phase: Phase,
    hold: HoldTracker,
    last_score: Option<MatchScore>,
    confirmations: usize,
}

impl GameController {
    /// Create a controller in [`Phase::NotStarted`].
    ///
    /// Uses an entropy-seeded RNG and the wall clock; see [`Self::with_rng`] and
    /// [`Self::with_clock`] to substitute them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PoseMatchError::ConfigError`] if `config` is invalid.
    pub fn new(config: GameConfig, loader: impl ReferenceLoader + 'static) -> Result<Self> {
        config.validate()?;
        let hold = HoldTracker::new(config.hold);
        Ok(Self {
            config,
            loader: Box::new(loader),
            rng: Box::new(StdRng::from_entropy()),
            clock: Box::new(MonotonicClock::new()),
            sequence: Sequence::default(),
            index: 0,
            phase: Phase::NotStarted,
            hold,
            last_score: None,
            confirmations: 0,
        })
    }

    /// Use `rng` for shuffling.
    #[must_use]
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Use `clock` for time-based holds.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Shuffle and load a fresh sequence, then start at its first pose.
    ///
    /// # Errors
    ///
    /// Any load failure is returned and leaves the controller exactly as it
    /// was, so `start` can simply be retried.
    pub fn start(&mut self) -> Result<()> {
        let order = build_sequence(self.config.total_poses, self.rng.as_mut());
        let sequence = Sequence::load(&order, self.loader.as_mut())?;

        self.sequence = sequence;
        self.index = 0;
        self.phase = Phase::Running;
        self.hold.reset();
        self.last_score = None;
        self.confirmations = 0;
        Ok(())
    }

    /// Start over with a reshuffled sequence. Allowed in every phase.
    ///
    /// # Errors
    ///
    /// Same as [`Self::start`].
    pub fn restart(&mut self) -> Result<()> {
        self.start()
    }

    /// Process one frame's pose estimate.
    ///
    /// `None` (nobody detected) neither adds nor clears hold evidence.
    pub fn tick(&mut self, live: Option<&KeypointSet>) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Idle;
        }
        let Some(live) = live else {
            return TickOutcome::NoPose;
        };
        let Some(reference) = self.sequence.current(self.index) else {
            return TickOutcome::Idle;
        };

        let score = score(live, &reference.keypoints, &self.config);
        self.last_score = Some(score);
        let hold = self.hold.update(score.matched, self.clock.now_ms());
        if hold.just_confirmed {
            self.confirmations += 1;
            return self.advance();
        }
        TickOutcome::Scored { score, hold }
    }

    /// Move to the next pose, or complete the game after the last one.
    pub fn advance(&mut self) -> TickOutcome {
        if self.phase != Phase::Running {
            return TickOutcome::Idle;
        }
        self.hold.reset();
        self.index += 1;
        if self.index >= self.sequence.len() {
            self.index = self.sequence.len();
            self.phase = Phase::Completed;
            return TickOutcome::Completed;
        }
        TickOutcome::Advanced { index: self.index }
    }

    /// Skip the current pose regardless of how well it is matched.
    ///
    /// No-op unless running.
    pub fn skip(&mut self) -> TickOutcome {
        self.advance()
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Index of the current pose.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.index
    }

    /// Number of poses in the loaded sequence.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sequence.len()
    }

    /// Pose to copy; `None` before start and after completion.
    #[must_use]
    pub fn current(&self) -> Option<&ReferencePose> {
        match self.phase {
            Phase::Running => self.sequence.current(self.index),
            Phase::NotStarted | Phase::Completed => None,
        }
    }

    /// The loaded sequence.
    #[must_use]
    pub const fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Poses confirmed by holding (skips excluded) since the last start.
    #[must_use]
    pub const fn confirmations(&self) -> usize {
        self.confirmations
    }

    /// Hold progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.hold.progress()
    }

    /// Raw hold evidence (ms or frames).
    #[must_use]
    pub const fn hold_evidence(&self) -> f64 {
        self.hold.evidence()
    }

    /// Score of the most recent scored frame.
    #[must_use]
    pub const fn last_score(&self) -> Option<MatchScore> {
        self.last_score
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// State for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            current_index: self.index,
            total: self.total(),
            current_image: self.current().map(|pose| pose.image.clone()),
            progress: self.progress(),
            hold_evidence: self.hold_evidence(),
            last_score: self.last_score,
        }
    }
}

impl fmt::Debug for GameController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameController")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("index", &self.index)
            .field("order", &self.sequence.order())
            .field("hold", &self.hold)
            .finish_non_exhaustive()
    }
}
