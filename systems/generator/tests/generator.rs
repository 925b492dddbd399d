use std::collections::BTreeSet;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robo_trail_core::{CellCoord, CANONICAL_FINISH, CANONICAL_START};
use robo_trail_system_generator::{
    generate, generate_seeded, Difficulty, GeneratedPuzzle, GENERATED_STARTER_CODE,
};

const DIFFICULTIES: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

fn assert_solvable(puzzle: &GeneratedPuzzle) {
    let grid = &puzzle.grid;
    assert_eq!(grid.start().cell, CANONICAL_START);
    assert_eq!(grid.finish(), CANONICAL_FINISH);
    assert_eq!(puzzle.path.first(), Some(&CANONICAL_START));
    assert_eq!(puzzle.path.last(), Some(&CANONICAL_FINISH));

    for pair in puzzle.path.windows(2) {
        assert_eq!(pair[0].manhattan_distance(pair[1]), 1, "path hop {pair:?}");
    }
    for cell in &puzzle.path {
        assert!(!grid.is_wall(*cell), "wall on path at {cell}");
    }
}

fn assert_layers_disjoint(puzzle: &GeneratedPuzzle) {
    let grid = &puzzle.grid;
    let walls: BTreeSet<CellCoord> = grid.walls().collect();
    let stars: BTreeSet<CellCoord> = grid.stars().collect();
    let bonus: BTreeSet<CellCoord> = grid.bonus().iter().map(|bonus| bonus.cell).collect();

    assert!(walls.is_disjoint(&stars));
    assert!(walls.is_disjoint(&bonus));
    assert!(stars.is_disjoint(&bonus));
    assert!(!walls.contains(&CANONICAL_FINISH));
    assert!(!walls.contains(&CANONICAL_START));
    assert!(!bonus.contains(&CANONICAL_START));
    assert!(!bonus.contains(&CANONICAL_FINISH));
    assert!(stars.iter().all(|star| puzzle.path.contains(star)));
}

#[test]
fn every_generated_puzzle_keeps_a_clear_path() {
    for difficulty in DIFFICULTIES {
        for seed in 0..200 {
            let puzzle = generate_seeded(difficulty, seed).expect("layout is valid");
            assert_solvable(&puzzle);
            assert_layers_disjoint(&puzzle);
        }
    }
}

#[test]
fn counts_follow_difficulty_targets() {
    for difficulty in DIFFICULTIES {
        for seed in 0..50 {
            let puzzle = generate_seeded(difficulty, seed).expect("layout is valid");
            let report = puzzle.report;
            assert!(!report.is_degraded(), "seed {seed} degraded: {report:?}");
            assert_eq!(puzzle.grid.wall_count(), difficulty.wall_target());
            assert_eq!(puzzle.grid.star_count(), difficulty.star_target());
            assert_eq!(puzzle.grid.bonus().len(), difficulty.bonus_target());
        }
    }
}

#[test]
fn bonus_points_depend_on_difficulty() {
    let puzzle = generate_seeded(Difficulty::Medium, 3).expect("layout is valid");
    assert!(puzzle.grid.bonus().iter().all(|bonus| bonus.points == 30));
}

#[test]
fn puzzle_metadata_is_fixed() {
    let puzzle = generate_seeded(Difficulty::Easy, 11).expect("layout is valid");
    assert_eq!(puzzle.name, "Generated Puzzle (Easy)");
    assert_eq!(puzzle.difficulty, Difficulty::Easy);
    assert_eq!(puzzle.starter_code, GENERATED_STARTER_CODE);
}

#[test]
fn same_seed_same_puzzle() {
    for difficulty in DIFFICULTIES {
        let mut first = ChaCha8Rng::seed_from_u64(2024);
        let mut second = ChaCha8Rng::seed_from_u64(2024);
        assert_eq!(
            generate(difficulty, &mut first).expect("layout is valid"),
            generate(difficulty, &mut second).expect("layout is valid")
        );
    }
}

/// Random source stuck on zero, so every sampled cell is the top-left corner.
struct Stuck;

impl RngCore for Stuck {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        dest.fill(0);
        Ok(())
    }
}

#[test]
fn exhausted_sampler_degrades_without_failing() {
    let puzzle = generate(Difficulty::Hard, &mut Stuck).expect("degraded layout is still valid");

    assert_eq!(puzzle.report.placed_walls, 1);
    assert_eq!(puzzle.report.requested_walls, 12);
    assert_eq!(puzzle.report.placed_bonus, 0);
    assert!(puzzle.report.is_degraded());
    assert!(puzzle.grid.is_wall(CellCoord::new(0, 0)));
    assert_solvable(&puzzle);
}
