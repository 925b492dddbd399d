#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attempt state machine that compiles a program and plays it on a board.
//!
//! A [`RunController`] owns exactly one [`AttemptContext`]. Every run request
//! resets the board, compiles the program through an injected script engine
//! and then applies the compiled steps one at a time, either on demand or
//! continuously with a pause between steps. Progress, rendering, narration
//! and pacing are reported through the [`Collaborators`] bundle.

use std::{sync::Arc, time::Duration};

use robo_trail_core::{
    Badge, CompileError, Event, Frame, FrameSink, GridModel, LevelId, NarrationCue, Narrator,
    Pacer, ProgressSink, RewardSignal, RewardSource, ScriptEngine, Step, StepError,
    DEFAULT_ACTION_CEILING, DEFAULT_STEP_DELAY,
};
use robo_trail_system_compiler::{score_style, Compiler, CompilerConfig};
use robo_trail_world::{self as world, query, Board, StepOutcome};
use thiserror::Error;
use tracing::{debug, info};

/// Tunables for running attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSettings {
    /// Pause between steps in continuous mode.
    pub step_delay: Duration,
    /// Largest number of queued actions a program may produce.
    pub action_ceiling: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            action_ceiling: DEFAULT_ACTION_CEILING,
        }
    }
}

/// Lifecycle of a single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing is running; the board shows the level's initial state.
    Idle,
    /// The program is being evaluated.
    Compiling,
    /// Compiled steps are being applied.
    Simulating,
    /// The actor reached the finish.
    Won,
    /// Compilation failed or a move was refused.
    Failed,
    /// All steps ran without reaching the finish.
    Exhausted,
}

impl Phase {
    /// Reports whether no further steps will run in this attempt.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Failed | Self::Exhausted)
    }
}

/// Reason an attempt ended in [`Phase::Failed`].
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AttemptError {
    /// The program did not compile.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// A move was refused during simulation.
    #[error(transparent)]
    Step(#[from] StepError),
}

/// Hosts notified while an attempt runs.
pub struct Collaborators<'a> {
    /// Receives attempts, rewards, badges and completions.
    pub progress: &'a mut dyn ProgressSink,
    /// Receives a frame after every committed step and after resets.
    pub frames: &'a mut dyn FrameSink,
    /// Receives narration cues.
    pub narrator: &'a mut dyn Narrator,
    /// Yields between continuous steps.
    pub pacer: &'a mut dyn Pacer,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Collaborator that ignores every notification and never sleeps.
#[derive(Clone, Copy, Debug, Default)]
pub struct Quiet;

impl ProgressSink for Quiet {
    fn attempt_started(&mut self, _level: LevelId) {}

    fn reward(&mut self, _signal: RewardSignal, _source: RewardSource) {}

    fn badge_earned(&mut self, _badge: Badge) {}

    fn level_completed(&mut self, _level: LevelId) {}
}

impl FrameSink for Quiet {
    fn present(&mut self, _frame: &Frame<'_>) {}
}

impl Narrator for Quiet {
    fn narrate(&mut self, _cue: &NarrationCue) {}
}

impl Pacer for Quiet {
    fn pause(&mut self, _delay: Duration) {}
}

/// Everything that belongs to the attempt currently on screen.
#[derive(Clone, Debug)]
pub struct AttemptContext {
    board: Board,
    level: Option<LevelId>,
    steps: Vec<Step>,
    cursor: usize,
    phase: Phase,
    failure: Option<AttemptError>,
    events: Vec<Event>,
}

impl AttemptContext {
    fn new(grid: Arc<GridModel>, level: Option<LevelId>) -> Self {
        Self {
            board: Board::new(grid),
            level,
            steps: Vec::new(),
            cursor: 0,
            phase: Phase::Idle,
            failure: None,
            events: Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.board.reset();
        self.steps.clear();
        self.cursor = 0;
        self.phase = Phase::Idle;
        self.failure = None;
        self.events.clear();
    }

    /// Board of the attempt.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Story level being played, `None` for generated puzzles.
    #[must_use]
    pub fn level(&self) -> Option<LevelId> {
        self.level
    }

    /// Compiled steps of the current run.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Index of the next step to apply.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Why the attempt failed, when it did.
    #[must_use]
    pub fn failure(&self) -> Option<&AttemptError> {
        self.failure.as_ref()
    }
}

/// Drives attempts on a single level.
#[derive(Debug)]
pub struct RunController {
    compiler: Compiler,
    settings: RunSettings,
    attempt: AttemptContext,
}

impl RunController {
    /// Creates a controller for the provided level.
    #[must_use]
    pub fn new(grid: Arc<GridModel>, level: Option<LevelId>, settings: RunSettings) -> Self {
        Self {
            compiler: Compiler::new(CompilerConfig {
                action_ceiling: settings.action_ceiling,
            }),
            settings,
            attempt: AttemptContext::new(grid, level),
        }
    }

    /// Attempt currently held by the controller.
    #[must_use]
    pub fn attempt(&self) -> &AttemptContext {
        &self.attempt
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.attempt.phase
    }

    /// Starts a new attempt: resets the board and compiles the program.
    ///
    /// On success the attempt is left in [`Phase::Simulating`] with the cursor
    /// on the first step, or in [`Phase::Exhausted`] when the program produced
    /// no steps at all. A compile failure leaves the freshly reset board
    /// untouched.
    pub fn start(
        &mut self,
        engine: &mut dyn ScriptEngine,
        source: &str,
        out: &mut Collaborators<'_>,
    ) -> Phase {
        if let Some(level) = self.attempt.level {
            out.progress.attempt_started(level);
        }
        self.attempt.clear();
        out.frames.present(&query::frame(&self.attempt.board));

        self.attempt.phase = Phase::Compiling;
        let style = score_style(source);
        out.progress.badge_earned(Badge::FirstRun);
        if style.has_loop {
            out.progress.badge_earned(Badge::LoopHero);
        }
        if style.has_variable {
            out.progress.badge_earned(Badge::VariableWizard);
        }

        match self.compiler.compile_scored(engine, source, style) {
            Ok(program) => {
                out.progress.reward(program.reward(), RewardSource::Style);
                info!(
                    steps = program.steps.len(),
                    points = program.reward().points,
                    "attempt started"
                );
                self.attempt.steps = program.steps;
                if self.attempt.steps.is_empty() {
                    self.exhaust(out);
                } else {
                    self.attempt.phase = Phase::Simulating;
                }
            }
            Err(error) => self.fail(error.into(), out),
        }
        self.attempt.phase
    }

    /// Applies the next step, if the attempt is still simulating.
    pub fn step_once(&mut self, out: &mut Collaborators<'_>) -> Phase {
        if self.attempt.phase != Phase::Simulating {
            return self.attempt.phase;
        }

        let AttemptContext {
            board,
            steps,
            cursor,
            events,
            ..
        } = &mut self.attempt;
        let Some(step) = steps.get(*cursor) else {
            self.exhaust(out);
            return self.attempt.phase;
        };
        let applied = world::apply(board, step, events);
        if applied.is_ok() {
            *cursor += 1;
        }
        debug!(cursor = *cursor, ?step, "step applied");

        self.dispatch_events(out);

        match applied {
            Ok(StepOutcome::Won) => {
                out.frames.present(&query::frame(&self.attempt.board));
                self.attempt.phase = Phase::Won;
                if let Some(level) = self.attempt.level {
                    out.progress.level_completed(level);
                }
                info!(steps = self.attempt.cursor, "finish reached");
                out.narrator.narrate(&NarrationCue::Win);
            }
            Ok(StepOutcome::Continue) => {
                out.frames.present(&query::frame(&self.attempt.board));
                if self.attempt.cursor == self.attempt.steps.len() {
                    self.exhaust(out);
                }
            }
            Err(error) => self.fail(error.into(), out),
        }
        self.attempt.phase
    }

    /// Applies steps until the attempt ends, pausing between them.
    pub fn run_continuous(&mut self, out: &mut Collaborators<'_>) -> Phase {
        while self.step_once(out) == Phase::Simulating {
            out.pacer.pause(self.settings.step_delay);
        }
        self.attempt.phase
    }

    /// Starts an attempt and plays it to the end.
    pub fn run(
        &mut self,
        engine: &mut dyn ScriptEngine,
        source: &str,
        out: &mut Collaborators<'_>,
    ) -> Phase {
        if self.start(engine, source, out) == Phase::Simulating {
            let _ = self.run_continuous(out);
        }
        self.attempt.phase
    }

    /// Discards the running program and restores the level's initial state.
    pub fn reset(&mut self, out: &mut Collaborators<'_>) {
        self.attempt.clear();
        out.frames.present(&query::frame(&self.attempt.board));
    }

    fn dispatch_events(&mut self, out: &mut Collaborators<'_>) {
        for event in self.attempt.events.drain(..) {
            match event {
                Event::RewardGranted { signal, source } => out.progress.reward(signal, source),
                Event::BonusCollected { points, .. } => {
                    out.narrator.narrate(&NarrationCue::BonusCollected { points });
                }
                Event::Said { text } => out.narrator.narrate(&NarrationCue::Say(text)),
                Event::StarCollected { cell } => debug!(%cell, "star collected"),
                Event::ActorMoved { .. } | Event::ActorTurned { .. } | Event::GoalReached { .. } => {}
            }
        }
    }

    fn exhaust(&mut self, out: &mut Collaborators<'_>) {
        self.attempt.phase = Phase::Exhausted;
        info!(steps = self.attempt.cursor, "program finished without reaching the finish");
        out.narrator.narrate(&NarrationCue::Encourage);
    }

    fn fail(&mut self, error: AttemptError, out: &mut Collaborators<'_>) {
        info!(%error, "attempt failed");
        out.narrator.narrate(&NarrationCue::Oops(error.to_string()));
        self.attempt.failure = Some(error);
        self.attempt.phase = Phase::Failed;
    }
}
