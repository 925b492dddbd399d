#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Robo Trail engine.
//!
//! This crate defines the value types that connect the script host, the
//! authoritative board, and the pure systems. The compiler turns learner
//! programs into [`Step`] sequences, the world applies those steps one at a
//! time and reports [`Event`] values, and the run controller forwards the
//! outcome to the external collaborators declared at the bottom of this file.

use std::{collections::BTreeSet, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns on every puzzle board.
pub const GRID_COLUMNS: u32 = 8;

/// Number of rows on every puzzle board.
pub const GRID_ROWS: u32 = 8;

/// Largest count accepted by a single `move(n)` call.
pub const MAX_MOVE_COUNT: u32 = 30;

/// Default ceiling on queued high-level actions per compilation.
pub const DEFAULT_ACTION_CEILING: usize = 220;

/// Default pause between steps when a program runs continuously.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(220);

/// Canonical starting cell shared by the story levels and generated puzzles.
pub const CANONICAL_START: CellCoord = CellCoord::new(0, GRID_ROWS - 1);

/// Canonical finish cell shared by the story levels and generated puzzles.
pub const CANONICAL_FINISH: CellCoord = CellCoord::new(GRID_COLUMNS - 1, 0);

/// Cardinal facings available to the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Facing toward decreasing row indices.
    North,
    /// Facing toward increasing column indices.
    East,
    /// Facing toward increasing row indices.
    South,
    /// Facing toward decreasing column indices.
    West,
}

impl Direction {
    /// All facings in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Facing obtained after a quarter turn counter-clockwise.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Facing obtained after a quarter turn clockwise.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Unit offset as `(column delta, row delta)`.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell one unit away in the provided direction, if it does not underflow.
    ///
    /// The result is not checked against any board bounds; callers combine it
    /// with [`GridBounds::contains`].
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let column = u32::try_from(i64::from(self.column) + dx).ok()?;
        let row = u32::try_from(i64::from(self.row) + dy).ok()?;
        Some(CellCoord::new(column, row))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Rectangular extent of a board measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    columns: u32,
    rows: u32,
}

impl GridBounds {
    /// The fixed 8×8 board used by every level.
    pub const STANDARD: GridBounds = GridBounds::new(GRID_COLUMNS, GRID_ROWS);

    /// Creates bounds with explicit dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the board.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the board.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the board.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Starting cell and facing of the actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StartPose {
    /// Cell the actor occupies when an attempt begins.
    pub cell: CellCoord,
    /// Facing the actor holds when an attempt begins.
    pub facing: Direction,
}

impl StartPose {
    /// Canonical bottom-left start facing east.
    pub const CANONICAL: StartPose = StartPose {
        cell: CANONICAL_START,
        facing: Direction::East,
    };
}

/// One-time collectible that awards points when the actor steps on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bonus {
    /// Cell holding the bonus.
    pub cell: CellCoord,
    /// Points awarded on pickup.
    pub points: u32,
}

impl Bonus {
    /// Creates a bonus located at the provided cell.
    #[must_use]
    pub const fn new(cell: CellCoord, points: u32) -> Self {
        Self { cell, points }
    }
}

/// Layer of level content that occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Impassable wall cell.
    Wall,
    /// Star collectible without a point value.
    Star,
    /// Bonus collectible with a point value.
    Bonus,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Wall => "wall",
            Self::Star => "star",
            Self::Bonus => "bonus",
        };
        f.write_str(label)
    }
}

/// Reasons a level layout is rejected by [`GridModel::try_from`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// A coordinate lies outside the board.
    #[error("{layer} at {cell} lies outside the board")]
    OutOfBounds {
        /// Offending cell.
        cell: CellCoord,
        /// Layer the cell was declared in.
        layer: Layer,
    },
    /// The start or finish cell lies outside the board.
    #[error("start or finish {cell} lies outside the board")]
    EndpointOutOfBounds {
        /// Offending cell.
        cell: CellCoord,
    },
    /// Start and finish share a cell.
    #[error("start and finish share cell {cell}")]
    StartIsFinish {
        /// Shared cell.
        cell: CellCoord,
    },
    /// Two layers claim the same cell.
    #[error("{first} and {second} overlap at {cell}")]
    Overlap {
        /// Contested cell.
        cell: CellCoord,
        /// Layer that claimed the cell first.
        first: Layer,
        /// Layer that attempted to claim it again.
        second: Layer,
    },
    /// A wall covers the start or the finish.
    #[error("wall at {cell} covers the start or the finish")]
    WallOnEndpoint {
        /// Offending cell.
        cell: CellCoord,
    },
    /// A bonus sits on the start cell.
    #[error("bonus at {cell} sits on the start")]
    BonusOnStart {
        /// Offending cell.
        cell: CellCoord,
    },
}

/// Plain, unvalidated description of a level layout.
///
/// This is the serialized shape of a [`GridModel`]; converting it back into a
/// model re-checks every invariant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Board extent.
    pub bounds: GridBounds,
    /// Start cell and facing.
    pub start: StartPose,
    /// Goal cell.
    pub finish: CellCoord,
    /// Wall cells.
    pub walls: Vec<CellCoord>,
    /// Star cells.
    pub stars: Vec<CellCoord>,
    /// Bonus cells with their point values.
    pub bonus: Vec<Bonus>,
}

impl GridLayout {
    /// Creates an empty layout on the standard board.
    #[must_use]
    pub fn new(start: StartPose, finish: CellCoord) -> Self {
        Self {
            bounds: GridBounds::STANDARD,
            start,
            finish,
            walls: Vec::new(),
            stars: Vec::new(),
            bonus: Vec::new(),
        }
    }

    /// Adds the provided wall cells.
    #[must_use]
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = CellCoord>) -> Self {
        self.walls.extend(walls);
        self
    }

    /// Adds the provided star cells.
    #[must_use]
    pub fn with_stars(mut self, stars: impl IntoIterator<Item = CellCoord>) -> Self {
        self.stars.extend(stars);
        self
    }

    /// Adds the provided bonus cells.
    #[must_use]
    pub fn with_bonus(mut self, bonus: impl IntoIterator<Item = Bonus>) -> Self {
        self.bonus.extend(bonus);
        self
    }
}

/// Immutable geometry and content of a single level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridLayout", into = "GridLayout")]
pub struct GridModel {
    bounds: GridBounds,
    start: StartPose,
    finish: CellCoord,
    walls: BTreeSet<CellCoord>,
    stars: BTreeSet<CellCoord>,
    bonus: Vec<Bonus>,
}

impl GridModel {
    /// Board extent.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Start cell and facing.
    #[must_use]
    pub const fn start(&self) -> StartPose {
        self.start
    }

    /// Goal cell.
    #[must_use]
    pub const fn finish(&self) -> CellCoord {
        self.finish
    }

    /// Wall cells in deterministic order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.walls.iter().copied()
    }

    /// Star cells in deterministic order.
    pub fn stars(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.stars.iter().copied()
    }

    /// Bonus cells ordered by coordinate.
    #[must_use]
    pub fn bonus(&self) -> &[Bonus] {
        &self.bonus
    }

    /// Reports whether the cell holds a wall.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.walls.contains(&cell)
    }

    /// Reports whether the actor may not enter the cell.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        !self.bounds.contains(cell) || self.is_wall(cell)
    }

    /// Number of wall cells.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Number of star cells.
    #[must_use]
    pub fn star_count(&self) -> usize {
        self.stars.len()
    }
}

impl TryFrom<GridLayout> for GridModel {
    type Error = GridError;

    fn try_from(layout: GridLayout) -> Result<Self, Self::Error> {
        let GridLayout {
            bounds,
            start,
            finish,
            walls: wall_cells,
            stars: star_cells,
            bonus: bonus_cells,
        } = layout;

        for cell in [start.cell, finish] {
            if !bounds.contains(cell) {
                return Err(GridError::EndpointOutOfBounds { cell });
            }
        }
        if start.cell == finish {
            return Err(GridError::StartIsFinish { cell: finish });
        }

        let mut claimed: Vec<(CellCoord, Layer)> = Vec::new();
        let mut claim = |cell: CellCoord, layer: Layer| -> Result<(), GridError> {
            if !bounds.contains(cell) {
                return Err(GridError::OutOfBounds { cell, layer });
            }
            if let Some((_, first)) = claimed.iter().find(|(existing, _)| *existing == cell) {
                return Err(GridError::Overlap {
                    cell,
                    first: *first,
                    second: layer,
                });
            }
            claimed.push((cell, layer));
            Ok(())
        };

        let mut walls = BTreeSet::new();
        for cell in wall_cells {
            claim(cell, Layer::Wall)?;
            if cell == start.cell || cell == finish {
                return Err(GridError::WallOnEndpoint { cell });
            }
            let _ = walls.insert(cell);
        }

        let mut stars = BTreeSet::new();
        for cell in star_cells {
            claim(cell, Layer::Star)?;
            let _ = stars.insert(cell);
        }

        let mut bonus = Vec::with_capacity(bonus_cells.len());
        for entry in bonus_cells {
            claim(entry.cell, Layer::Bonus)?;
            if entry.cell == start.cell {
                return Err(GridError::BonusOnStart { cell: entry.cell });
            }
            bonus.push(entry);
        }
        bonus.sort_by_key(|entry| entry.cell);

        Ok(Self {
            bounds,
            start,
            finish,
            walls,
            stars,
            bonus,
        })
    }
}

impl From<GridModel> for GridLayout {
    fn from(model: GridModel) -> Self {
        Self {
            bounds: model.bounds,
            start: model.start,
            finish: model.finish,
            walls: model.walls.into_iter().collect(),
            stars: model.stars.into_iter().collect(),
            bonus: model.bonus,
        }
    }
}

/// Mutable position and facing of the actor during an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ActorState {
    /// Cell the actor currently occupies.
    pub position: CellCoord,
    /// Direction the actor currently faces.
    pub facing: Direction,
}

impl ActorState {
    /// Places the actor on the start pose of the provided level.
    #[must_use]
    pub const fn at_start(grid: &GridModel) -> Self {
        let pose = grid.start();
        Self {
            position: pose.cell,
            facing: pose.facing,
        }
    }
}

/// High-level instruction emitted once per script host callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Advance the requested number of cells in the current facing.
    Move {
        /// Number of single-cell moves, already validated to `0..=30`.
        count: u32,
    },
    /// Rotate a quarter turn counter-clockwise.
    TurnLeft,
    /// Rotate a quarter turn clockwise.
    TurnRight,
    /// Speak a message without moving.
    Say {
        /// Message to speak.
        text: String,
    },
}

/// Atomic unit of simulation produced by expanding [`Action`] values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Advance a single cell in the current facing.
    MoveOne,
    /// Rotate a quarter turn counter-clockwise.
    TurnLeft,
    /// Rotate a quarter turn clockwise.
    TurnRight,
    /// Speak a message without moving.
    Say {
        /// Message to speak.
        text: String,
    },
}

/// Point award emitted by the core for the progress collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardSignal {
    /// Number of points awarded.
    pub points: u32,
}

impl RewardSignal {
    /// Creates a reward worth the provided number of points.
    #[must_use]
    pub const fn new(points: u32) -> Self {
        Self { points }
    }
}

/// Origin of a [`RewardSignal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardSource {
    /// Awarded for attempting a program, scored on its style.
    Style,
    /// Awarded for stepping on a bonus cell.
    Bonus,
}

/// Notifications reported by the world while applying steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the actor moved between two cells.
    ActorMoved {
        /// Cell the actor occupied before moving.
        from: CellCoord,
        /// Cell the actor occupies after moving.
        to: CellCoord,
    },
    /// Confirms that the actor rotated.
    ActorTurned {
        /// Facing after the rotation.
        facing: Direction,
    },
    /// Reports that a star was picked up.
    StarCollected {
        /// Cell the star occupied.
        cell: CellCoord,
    },
    /// Reports that a bonus was picked up.
    BonusCollected {
        /// Cell the bonus occupied.
        cell: CellCoord,
        /// Points carried by the bonus.
        points: u32,
    },
    /// Points granted to the learner.
    RewardGranted {
        /// Amount awarded.
        signal: RewardSignal,
        /// Reason the amount was awarded.
        source: RewardSource,
    },
    /// The actor spoke a message.
    Said {
        /// Spoken message.
        text: String,
    },
    /// The actor arrived on the finish cell.
    GoalReached {
        /// Finish cell.
        cell: CellCoord,
    },
}

/// Achievements tracked by the progress collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// Ran a program for the first time.
    FirstRun,
    /// Wrote a program containing a loop.
    LoopHero,
    /// Wrote a program containing a variable assignment.
    VariableWizard,
    /// Picked up a bonus.
    BonusHunter,
    /// Completed the final story level.
    StoryFinisher,
}

impl Badge {
    /// Every badge in display order.
    pub const ALL: [Badge; 5] = [
        Badge::FirstRun,
        Badge::LoopHero,
        Badge::VariableWizard,
        Badge::BonusHunter,
        Badge::StoryFinisher,
    ];

    /// Stable identifier used by external stores.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::FirstRun => "first_run",
            Self::LoopHero => "loop_hero",
            Self::VariableWizard => "variable_wizard",
            Self::BonusHunter => "bonus_hunter",
            Self::StoryFinisher => "story_finisher",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FirstRun => "First Run",
            Self::LoopHero => "Loop Hero",
            Self::VariableWizard => "Variable Wizard",
            Self::BonusHunter => "Bonus Hunter",
            Self::StoryFinisher => "Story Finisher",
        }
    }
}

/// Index of a story level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided zero-based index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0 + 1)
    }
}

/// Rejected argument passed to `move(n)`.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum InvalidParameter {
    /// The argument was NaN or infinite.
    #[error("move(n) needs a number.")]
    NotANumber,
    /// The argument was below zero.
    #[error("move(n) must be 0 or more.")]
    Negative {
        /// Rejected value.
        value: f64,
    },
    /// The argument exceeded [`MAX_MOVE_COUNT`].
    #[error("move(n) is too big. Try 1 to 10.")]
    TooLarge {
        /// Rejected value.
        value: f64,
    },
}

/// Failure reported by a script engine while evaluating a program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EngineError {
    /// One-based source line the engine blamed, when known.
    pub line: Option<usize>,
    /// Message surfaced verbatim to the learner.
    pub message: String,
}

impl EngineError {
    /// Creates an error blamed on a specific line.
    #[must_use]
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Creates an error without line information.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

/// Errors that abort a script engine evaluation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScriptError {
    /// A host operation rejected its argument.
    #[error(transparent)]
    Host(#[from] InvalidParameter),
    /// The engine itself failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Errors that abort a compilation before any board mutation.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CompileError {
    /// A host operation rejected its argument.
    #[error(transparent)]
    InvalidParameter(#[from] InvalidParameter),
    /// The program queued more actions than allowed.
    #[error("Too many actions! Try fewer moves or smaller loops.")]
    ActionLimitExceeded {
        /// Number of actions the program queued.
        queued: usize,
        /// Ceiling that was exceeded.
        ceiling: usize,
    },
    /// The script engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl From<ScriptError> for CompileError {
    fn from(error: ScriptError) -> Self {
        match error {
            ScriptError::Host(rejected) => Self::InvalidParameter(rejected),
            ScriptError::Engine(failure) => Self::Engine(failure),
        }
    }
}

/// Errors raised while applying a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StepError {
    /// The target cell is a wall or lies off the board.
    #[error("Bonk! You hit a candy wall or the edge. Try turning first.")]
    Blocked {
        /// Cell the actor tried to leave.
        from: CellCoord,
        /// Direction of the refused move.
        toward: Direction,
    },
}

/// Capability interface the script engine calls while evaluating a program.
pub trait ScriptHost {
    /// Queues a forward move of `count` cells.
    fn move_forward(&mut self, count: f64) -> Result<(), InvalidParameter>;

    /// Queues a quarter turn counter-clockwise.
    fn turn_left(&mut self);

    /// Queues a quarter turn clockwise.
    fn turn_right(&mut self);

    /// Queues a spoken message.
    fn say(&mut self, text: String);
}

/// Evaluator that runs learner programs against a [`ScriptHost`].
pub trait ScriptEngine {
    /// Evaluates the complete program, invoking host operations as it goes.
    ///
    /// Errors returned by host operations must abort evaluation and be
    /// returned unchanged as [`ScriptError::Host`].
    fn evaluate(&mut self, source: &str, host: &mut dyn ScriptHost) -> Result<(), ScriptError>;
}

/// Write-only consumer of learner progress notifications.
pub trait ProgressSink {
    /// Records that an attempt on the level began.
    fn attempt_started(&mut self, level: LevelId);

    /// Records awarded points.
    fn reward(&mut self, signal: RewardSignal, source: RewardSource);

    /// Records an unlocked badge. Repeated notifications are expected.
    fn badge_earned(&mut self, badge: Badge);

    /// Records that the level was completed.
    fn level_completed(&mut self, level: LevelId);
}

/// Borrowed snapshot of the board handed to renderers.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Level being played.
    pub grid: &'a GridModel,
    /// Current actor state.
    pub actor: ActorState,
    /// Stars not yet collected.
    pub stars: &'a [CellCoord],
    /// Bonus cells not yet collected.
    pub bonus: &'a [Bonus],
}

/// Consumer of rendered frames.
pub trait FrameSink {
    /// Presents the frame; called at least once after every committed step.
    fn present(&mut self, frame: &Frame<'_>);
}

/// Named narration triggers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NarrationCue {
    /// The actor reached the finish.
    Win,
    /// A bonus was picked up.
    BonusCollected {
        /// Points carried by the bonus.
        points: u32,
    },
    /// The program asked the actor to speak.
    Say(String),
    /// An attempt failed with the provided learner-facing message.
    Oops(String),
    /// The program finished without reaching the finish.
    Encourage,
}

impl NarrationCue {
    /// Text a voice service would speak for the cue.
    #[must_use]
    pub fn script(&self) -> String {
        match self {
            Self::Win => "You did it! Welcome to the Home of Coders!".to_owned(),
            Self::BonusCollected { points } => {
                format!("Bonus candy! Plus {points} points!")
            }
            Self::Say(text) => text.clone(),
            Self::Oops(message) => format!("Oops. {message}"),
            Self::Encourage => "Good try! Can you reach the home?".to_owned(),
        }
    }
}

/// Consumer of narration cues. Failures stay inside the implementation.
pub trait Narrator {
    /// Narrates the cue.
    fn narrate(&mut self, cue: &NarrationCue);
}

/// Host scheduler hook used between continuous steps.
pub trait Pacer {
    /// Yields to the host for the provided delay.
    fn pause(&mut self, delay: Duration);
}
