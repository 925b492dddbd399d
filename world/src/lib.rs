#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state and the movement simulator for Robo Trail.
//!
//! A [`Board`] owns the actor and the collectibles of a single attempt. The
//! level geometry is shared read-only through an [`Arc`], so renderers and the
//! simulator can look at the same [`GridModel`] without copying it.

use std::sync::Arc;

use robo_trail_core::{
    ActorState, Bonus, CellCoord, Event, Frame, GridModel, RewardSignal, RewardSource, Step,
    StepError,
};
use tracing::trace;

pub mod levels;

/// Stars and bonus cells that have not been picked up during an attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectibleState {
    stars: Vec<CellCoord>,
    bonus: Vec<Bonus>,
}

impl CollectibleState {
    /// Copies the collectibles declared by the level.
    #[must_use]
    pub fn from_grid(grid: &GridModel) -> Self {
        Self {
            stars: grid.stars().collect(),
            bonus: grid.bonus().to_vec(),
        }
    }

    /// Stars still on the board.
    #[must_use]
    pub fn stars(&self) -> &[CellCoord] {
        &self.stars
    }

    /// Bonus cells still on the board.
    #[must_use]
    pub fn bonus(&self) -> &[Bonus] {
        &self.bonus
    }

    fn take_star(&mut self, cell: CellCoord) -> bool {
        match self.stars.iter().position(|star| *star == cell) {
            Some(index) => {
                let _ = self.stars.remove(index);
                true
            }
            None => false,
        }
    }

    fn take_bonus(&mut self, cell: CellCoord) -> Option<Bonus> {
        let index = self.bonus.iter().position(|bonus| bonus.cell == cell)?;
        Some(self.bonus.remove(index))
    }
}

/// Result of successfully applying a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The attempt continues with the next step.
    Continue,
    /// The actor arrived on the finish cell.
    Won,
}

/// Applies one atomic step to the actor and collectibles of a level.
///
/// A refused move leaves every piece of state untouched. Successful moves
/// collect whatever the destination holds before the win check runs.
pub fn apply_step(
    step: &Step,
    actor: &mut ActorState,
    grid: &GridModel,
    collectibles: &mut CollectibleState,
    out_events: &mut Vec<Event>,
) -> Result<StepOutcome, StepError> {
    match step {
        Step::TurnLeft => {
            actor.facing = actor.facing.turned_left();
            out_events.push(Event::ActorTurned {
                facing: actor.facing,
            });
            Ok(StepOutcome::Continue)
        }
        Step::TurnRight => {
            actor.facing = actor.facing.turned_right();
            out_events.push(Event::ActorTurned {
                facing: actor.facing,
            });
            Ok(StepOutcome::Continue)
        }
        Step::Say { text } => {
            out_events.push(Event::Said { text: text.clone() });
            Ok(StepOutcome::Continue)
        }
        Step::MoveOne => move_one(actor, grid, collectibles, out_events),
    }
}

fn move_one(
    actor: &mut ActorState,
    grid: &GridModel,
    collectibles: &mut CollectibleState,
    out_events: &mut Vec<Event>,
) -> Result<StepOutcome, StepError> {
    let from = actor.position;
    let blocked = StepError::Blocked {
        from,
        toward: actor.facing,
    };
    let Some(to) = from.neighbor(actor.facing) else {
        return Err(blocked);
    };
    if grid.is_blocked(to) {
        trace!(%from, %to, "move refused");
        return Err(blocked);
    }

    actor.position = to;
    out_events.push(Event::ActorMoved { from, to });

    if collectibles.take_star(to) {
        out_events.push(Event::StarCollected { cell: to });
    }

    if let Some(bonus) = collectibles.take_bonus(to) {
        out_events.push(Event::RewardGranted {
            signal: RewardSignal::new(bonus.points),
            source: RewardSource::Bonus,
        });
        out_events.push(Event::BonusCollected {
            cell: to,
            points: bonus.points,
        });
    }

    if to == grid.finish() {
        out_events.push(Event::GoalReached { cell: to });
        return Ok(StepOutcome::Won);
    }

    Ok(StepOutcome::Continue)
}

/// Per-attempt board: shared level geometry plus exclusively owned state.
#[derive(Clone, Debug)]
pub struct Board {
    grid: Arc<GridModel>,
    actor: ActorState,
    collectibles: CollectibleState,
}

impl Board {
    /// Creates a board positioned at the start of the level.
    #[must_use]
    pub fn new(grid: Arc<GridModel>) -> Self {
        let actor = ActorState::at_start(&grid);
        let collectibles = CollectibleState::from_grid(&grid);
        Self {
            grid,
            actor,
            collectibles,
        }
    }

    /// Returns the actor and collectibles to the level's initial state.
    pub fn reset(&mut self) {
        self.actor = ActorState::at_start(&self.grid);
        self.collectibles = CollectibleState::from_grid(&self.grid);
    }
}

/// Applies the provided step to the board, reporting effects through events.
pub fn apply(
    board: &mut Board,
    step: &Step,
    out_events: &mut Vec<Event>,
) -> Result<StepOutcome, StepError> {
    apply_step(
        step,
        &mut board.actor,
        &board.grid,
        &mut board.collectibles,
        out_events,
    )
}

/// Query functions that provide read-only access to the board.
pub mod query {
    use std::sync::Arc;

    use robo_trail_core::{ActorState, Frame, GridModel};

    use super::{Board, CollectibleState};

    /// Level geometry the board was created from.
    #[must_use]
    pub fn grid(board: &Board) -> &Arc<GridModel> {
        &board.grid
    }

    /// Current actor state.
    #[must_use]
    pub fn actor(board: &Board) -> ActorState {
        board.actor
    }

    /// Collectibles not yet picked up.
    #[must_use]
    pub fn collectibles(board: &Board) -> &CollectibleState {
        &board.collectibles
    }

    /// Reports whether the actor stands on the finish.
    #[must_use]
    pub fn has_won(board: &Board) -> bool {
        board.actor.position == board.grid.finish()
    }

    /// Captures a frame for renderers.
    #[must_use]
    pub fn frame(board: &Board) -> Frame<'_> {
        super::frame(board)
    }
}

fn frame(board: &Board) -> Frame<'_> {
    Frame {
        grid: &board.grid,
        actor: board.actor,
        stars: board.collectibles.stars(),
        bonus: board.collectibles.bonus(),
    }
}
