#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural puzzle generator that always leaves a walkable path.
//!
//! Generation first carves a staircase path from the canonical start to the
//! canonical finish, then scatters stars along that path and places walls and
//! bonus cells by bounded rejection sampling. Walls never land on the path, so
//! the finish stays reachable no matter what the sampler draws. When the
//! sampler runs out of attempts the puzzle simply ends up with fewer
//! obstacles; the shortfall is recorded in [`GenerationReport`].

use std::collections::BTreeSet;

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robo_trail_core::{
    Bonus, CellCoord, GridBounds, GridError, GridLayout, GridModel, StartPose, CANONICAL_FINISH,
};
use thiserror::Error;
use tracing::{info, warn};

/// Upper bound on random draws spent placing each obstacle kind.
pub const PLACEMENT_ATTEMPTS: u32 = 2000;

/// Program suggested to the learner for every generated puzzle.
pub const GENERATED_STARTER_CODE: &str = "# Generated puzzle\n# Reach the home (top-right).\n# Try loops + variables!\n\nsteps = 1\nfor i in range(3):\n    move(steps)\n    turn_left()\n\nmove(2)\n";

/// Difficulty tiers offered by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    /// Tier 1.
    Easy,
    /// Tier 2.
    Medium,
    /// Tier 3.
    Hard,
}

/// Rejected difficulty value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("difficulty must be 1, 2 or 3, got {0}")]
pub struct DifficultyError(pub u8);

impl TryFrom<u8> for Difficulty {
    type Error = DifficultyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Easy),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Hard),
            other => Err(DifficultyError(other)),
        }
    }
}

impl Difficulty {
    /// Numeric tier in `1..=3`.
    #[must_use]
    pub const fn tier(self) -> u32 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Display label used in puzzle names.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Number of walls the generator aims for.
    #[must_use]
    pub const fn wall_target(self) -> usize {
        match self {
            Self::Easy => 7,
            Self::Medium => 10,
            Self::Hard => 12,
        }
    }

    /// Number of bonus cells the generator aims for.
    #[must_use]
    pub const fn bonus_target(self) -> usize {
        match self {
            Self::Easy => 2,
            Self::Medium => 3,
            Self::Hard => 4,
        }
    }

    /// Number of stars the generator aims for.
    #[must_use]
    pub const fn star_target(self) -> usize {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
        }
    }

    /// Number of right-then-up zig-zags carved into the path.
    #[must_use]
    pub const fn turns(self) -> usize {
        match self {
            Self::Easy => 3,
            Self::Medium => 5,
            Self::Hard => 7,
        }
    }

    /// Points carried by each bonus cell.
    #[must_use]
    pub const fn bonus_points(self) -> u32 {
        10 + 10 * self.tier()
    }
}

/// Requested versus placed counts for one generated puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationReport {
    /// Walls the difficulty asked for.
    pub requested_walls: usize,
    /// Walls actually placed.
    pub placed_walls: usize,
    /// Bonus cells the difficulty asked for.
    pub requested_bonus: usize,
    /// Bonus cells actually placed.
    pub placed_bonus: usize,
    /// Stars the difficulty asked for.
    pub requested_stars: usize,
    /// Stars actually placed.
    pub placed_stars: usize,
}

impl GenerationReport {
    /// Reports whether any count fell short of its target.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.placed_walls < self.requested_walls
            || self.placed_bonus < self.requested_bonus
            || self.placed_stars < self.requested_stars
    }
}

/// A freshly generated level together with the path that proves it solvable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedPuzzle {
    /// Title shown for the puzzle.
    pub name: String,
    /// Difficulty the puzzle was generated for.
    pub difficulty: Difficulty,
    /// Level geometry.
    pub grid: GridModel,
    /// Orthogonally connected cells from start to finish, free of walls.
    pub path: Vec<CellCoord>,
    /// Placement statistics.
    pub report: GenerationReport,
    /// Program suggested to the learner.
    pub starter_code: &'static str,
}

/// Errors raised while assembling a generated level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The assembled layout violated a grid invariant.
    #[error("generated layout is invalid: {0}")]
    Layout(#[from] GridError),
}

/// Generates a puzzle using the provided random source.
pub fn generate<R>(difficulty: Difficulty, rng: &mut R) -> Result<GeneratedPuzzle, GenerationError>
where
    R: Rng + ?Sized,
{
    let start = StartPose::CANONICAL;
    let finish = CANONICAL_FINISH;
    let bounds = GridBounds::STANDARD;

    let path = carve_path(start.cell, finish, difficulty.turns(), rng);
    let path_set: BTreeSet<CellCoord> = path.iter().copied().collect();

    let candidates: Vec<CellCoord> = path
        .iter()
        .copied()
        .filter(|cell| *cell != start.cell && *cell != finish)
        .collect();
    let star_count = difficulty.star_target().min(candidates.len());
    let stars: Vec<CellCoord> = candidates
        .choose_multiple(rng, star_count)
        .copied()
        .collect();

    let walls = sample_cells(bounds, difficulty.wall_target(), rng, |cell, chosen| {
        !path_set.contains(&cell) && cell != finish && !chosen.contains(&cell)
    });

    let bonus_cells = sample_cells(bounds, difficulty.bonus_target(), rng, |cell, chosen| {
        cell != finish
            && cell != start.cell
            && !walls.contains(&cell)
            && !stars.contains(&cell)
            && !chosen.contains(&cell)
    });

    let report = GenerationReport {
        requested_walls: difficulty.wall_target(),
        placed_walls: walls.len(),
        requested_bonus: difficulty.bonus_target(),
        placed_bonus: bonus_cells.len(),
        requested_stars: difficulty.star_target(),
        placed_stars: stars.len(),
    };
    if report.is_degraded() {
        warn!(?report, "puzzle generated with fewer items than requested");
    }

    let points = difficulty.bonus_points();
    let layout = GridLayout::new(start, finish)
        .with_walls(walls)
        .with_stars(stars)
        .with_bonus(bonus_cells.into_iter().map(|cell| Bonus::new(cell, points)));
    let grid = GridModel::try_from(layout)?;

    info!(
        difficulty = difficulty.tier(),
        walls = grid.wall_count(),
        stars = grid.star_count(),
        bonus = grid.bonus().len(),
        path = path.len(),
        "puzzle generated"
    );

    Ok(GeneratedPuzzle {
        name: format!("Generated Puzzle ({})", difficulty.label()),
        difficulty,
        grid,
        path,
        report,
        starter_code: GENERATED_STARTER_CODE,
    })
}

/// Generates a puzzle reproducibly from a seed.
pub fn generate_seeded(difficulty: Difficulty, seed: u64) -> Result<GeneratedPuzzle, GenerationError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate(difficulty, &mut rng)
}

fn carve_path<R>(start: CellCoord, finish: CellCoord, turns: usize, rng: &mut R) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    let mut column = start.column();
    let mut row = start.row();
    let mut path = vec![start];

    for _ in 0..turns {
        let east_run: u32 = rng.gen_range(1..=2);
        for _ in 0..east_run {
            if column >= finish.column() {
                break;
            }
            column += 1;
            path.push(CellCoord::new(column, row));
        }

        let north_run: u32 = rng.gen_range(1..=2);
        for _ in 0..north_run {
            if row <= finish.row() {
                break;
            }
            row -= 1;
            path.push(CellCoord::new(column, row));
        }
    }

    while column < finish.column() {
        column += 1;
        path.push(CellCoord::new(column, row));
    }
    while row > finish.row() {
        row -= 1;
        path.push(CellCoord::new(column, row));
    }

    path
}

fn sample_cells<R, F>(bounds: GridBounds, target: usize, rng: &mut R, accept: F) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
    F: Fn(CellCoord, &[CellCoord]) -> bool,
{
    let mut chosen = Vec::with_capacity(target);
    let mut attempts = 0;
    while chosen.len() < target && attempts < PLACEMENT_ATTEMPTS {
        attempts += 1;
        let cell = CellCoord::new(
            rng.gen_range(0..bounds.columns()),
            rng.gen_range(0..bounds.rows()),
        );
        if accept(cell, &chosen) {
            chosen.push(cell);
        }
    }
    chosen
}
