//! The ten hand-made story levels of the Candy City campaign.
//!
//! Every level starts in the bottom-left corner facing east and finishes in
//! the top-right corner.

use robo_trail_core::{
    Bonus, CellCoord, GridError, GridLayout, GridModel, LevelId, StartPose, CANONICAL_FINISH,
};

/// Number of levels in the story campaign.
pub const STORY_LEVEL_COUNT: usize = 10;

/// A story level: geometry plus the text shown to the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoryLevel {
    /// Position of the level in the campaign.
    pub id: LevelId,
    /// Title shown above the board.
    pub name: &'static str,
    /// Story paragraph read when the level opens.
    pub intro: &'static str,
    /// Short hint for the learner.
    pub hint: &'static str,
    /// Program pre-filled in the editor.
    pub starter_code: &'static str,
    /// Level geometry.
    pub grid: GridModel,
}

impl StoryLevel {
    /// Reports whether this is the final level of the campaign.
    #[must_use]
    pub fn is_final(&self) -> bool {
        usize::try_from(self.id.get()).map_or(false, |index| index + 1 == STORY_LEVEL_COUNT)
    }
}

struct LevelData {
    name: &'static str,
    intro: &'static str,
    hint: &'static str,
    stars: &'static [(u32, u32)],
    walls: &'static [(u32, u32)],
    bonus: &'static [(u32, u32, u32)],
    starter_code: &'static str,
}

const STORY: [LevelData; STORY_LEVEL_COUNT] = [
    LevelData {
        name: "Level 1 - Candy Sidewalk",
        intro: "RoboPop wakes up in Candy City. \"I need to reach the Home of Coders!\"",
        hint: "Try move(2). Green lines are valid!",
        stars: &[(1, 6)],
        walls: &[
            (2, 7),
            (2, 6),
            (2, 5),
            (3, 5),
            (4, 5),
            (5, 5),
            (6, 5),
            (5, 2),
        ],
        bonus: &[(1, 7, 10), (3, 6, 10)],
        starter_code: "# Reach the home (top-right)\n# Tip: use small moves and turns.\n\nmove(1)\nturn_left()\nmove(1)\n",
    },
    LevelData {
        name: "Level 2 - Lollipop Corner",
        intro: "A lollipop sign says: \"Turns are choices.\" RoboPop: \"I choose coding!\"",
        hint: "Try a variable: steps = 2 then move(steps).",
        stars: &[(1, 6), (4, 4)],
        walls: &[
            (1, 5),
            (2, 5),
            (3, 5),
            (3, 6),
            (5, 6),
            (6, 6),
            (5, 3),
            (5, 2),
        ],
        bonus: &[(2, 7, 15), (4, 6, 15)],
        starter_code: "# Variables help!\nsteps = 2\nmove(steps)\nturn_left()\nmove(1)\n",
    },
    LevelData {
        name: "Level 3 - Marshmallow Bridge",
        intro: "A marshmallow bridge wiggles! RoboPop: \"I'll go step by step.\"",
        hint: "Try a loop: for i in range(3):",
        stars: &[(1, 6), (6, 2)],
        walls: &[
            (2, 7),
            (2, 6),
            (2, 5),
            (4, 7),
            (4, 6),
            (5, 4),
            (5, 3),
            (5, 2),
        ],
        bonus: &[(1, 7, 20), (3, 6, 20)],
        starter_code: "# Try a loop!\nfor i in range(2):\n    move(1)\n\nturn_left()\nmove(1)\n",
    },
    LevelData {
        name: "Level 4 - Gumdrop Garden",
        intro: "Gumdrops everywhere! RoboPop: \"Patterns make me faster!\"",
        hint: "Use loops so you don't repeat yourself.",
        stars: &[(3, 4), (6, 3)],
        walls: &[
            (1, 6),
            (2, 6),
            (3, 6),
            (3, 7),
            (4, 5),
            (5, 5),
            (6, 5),
            (6, 4),
        ],
        bonus: &[(2, 7, 20), (4, 6, 25)],
        starter_code: "# Repeat patterns\nsteps = 1\nfor i in range(3):\n    move(steps)\n    turn_left()\n\nmove(1)\n",
    },
    LevelData {
        name: "Level 5 - Chocolate Maze",
        intro: "Chocolate walls block the path. RoboPop: \"I'll plan my turns.\"",
        hint: "Try short moves + many turns.",
        stars: &[(1, 6), (5, 4)],
        walls: &[
            (2, 7),
            (2, 6),
            (2, 5),
            (4, 6),
            (5, 6),
            (6, 6),
            (4, 4),
            (4, 3),
        ],
        bonus: &[(1, 7, 25), (3, 6, 25)],
        starter_code: "# Plan turns\nmove(1)\nturn_left()\nmove(1)\nturn_right()\nmove(2)\n",
    },
    LevelData {
        name: "Level 6 - Sprinkles Speedway",
        intro: "Sprinkles zoom by! RoboPop: \"Clean code wins!\"",
        hint: "Try making a helper function (optional).",
        stars: &[(2, 6), (6, 1)],
        walls: &[
            (1, 5),
            (2, 5),
            (3, 5),
            (3, 6),
            (4, 4),
            (5, 4),
            (6, 4),
            (6, 3),
        ],
        bonus: &[(1, 7, 30), (4, 6, 20)],
        starter_code: "# Optional helper\ndef go(n):\n    move(n)\n\ngo(1)\nturn_left()\ngo(1)\n",
    },
    LevelData {
        name: "Level 7 - Jellybean Detour",
        intro: "A jellybean river appears. RoboPop: \"Detour time!\"",
        hint: "Use a variable + loop for bonus XP.",
        stars: &[(1, 6), (3, 4), (6, 2)],
        walls: &[
            (2, 7),
            (2, 6),
            (2, 5),
            (4, 7),
            (4, 6),
            (4, 5),
            (5, 3),
            (6, 3),
        ],
        bonus: &[(1, 7, 20), (3, 6, 35)],
        starter_code: "# Combo (XP!)\nsteps = 1\nfor i in range(2):\n    move(steps)\n    turn_left()\nmove(2)\n",
    },
    LevelData {
        name: "Level 8 - Candy Castle Gate",
        intro: "A candy castle gate appears. RoboPop whispers: \"Almost home...\"",
        hint: "Try small loops, not one giant move.",
        stars: &[(2, 6), (5, 3)],
        walls: &[
            (1, 6),
            (1, 5),
            (3, 6),
            (3, 5),
            (3, 4),
            (5, 6),
            (6, 6),
            (6, 2),
        ],
        bonus: &[(2, 7, 25), (4, 6, 25)],
        starter_code: "# Small steps\nfor i in range(2):\n    move(1)\nturn_left()\nmove(1)\n",
    },
    LevelData {
        name: "Level 9 - Licorice Lab",
        intro: "A lab sign says: \"Test, fix, try again.\" RoboPop: \"That's coding!\"",
        hint: "Use say('hi') for fun.",
        stars: &[(1, 6), (4, 4), (6, 1)],
        walls: &[
            (2, 7),
            (2, 6),
            (2, 5),
            (4, 6),
            (5, 6),
            (6, 6),
            (4, 3),
            (5, 3),
        ],
        bonus: &[(1, 7, 30), (3, 6, 30)],
        starter_code: "# Talk!\nsay(\"I am coding!\")\nmove(1)\nturn_left()\nmove(1)\n",
    },
    LevelData {
        name: "Level 10 - Maze Run to Home of Coders",
        intro: "RoboPop sees it... the Home of Coders! \"Lots of turns... but I can do it!\"",
        hint: "More obstacles! Try variables + loops to keep code short.",
        stars: &[(1, 6), (4, 4), (6, 2)],
        walls: &[(2, 7), (2, 6), (2, 5), (4, 6), (5, 6), (6, 6)],
        bonus: &[(1, 7, 25), (3, 6, 30), (4, 3, 35), (6, 1, 45)],
        starter_code: "# Final level!\n# Reach the home (top-right).\n# Bonus candy gives XP when you step on it.\nsteps = 1\nfor i in range(2):\n    move(1)\n    turn_left()\n    move(1)\n    turn_right()\nmove(2)\n",
    },
];

fn cells(pairs: &[(u32, u32)]) -> impl Iterator<Item = CellCoord> + '_ {
    pairs
        .iter()
        .map(|&(column, row)| CellCoord::new(column, row))
}

fn build(index: usize, data: &LevelData) -> Result<StoryLevel, GridError> {
    let layout = GridLayout::new(StartPose::CANONICAL, CANONICAL_FINISH)
        .with_walls(cells(data.walls))
        .with_stars(cells(data.stars))
        .with_bonus(
            data.bonus
                .iter()
                .map(|&(column, row, points)| Bonus::new(CellCoord::new(column, row), points)),
        );
    Ok(StoryLevel {
        id: LevelId::new(u32::try_from(index).unwrap_or(u32::MAX)),
        name: data.name,
        intro: data.intro,
        hint: data.hint,
        starter_code: data.starter_code,
        grid: GridModel::try_from(layout)?,
    })
}

/// Builds the story level at the provided zero-based index.
///
/// Returns `None` past the end of the campaign.
pub fn story_level(index: usize) -> Option<Result<StoryLevel, GridError>> {
    STORY.get(index).map(|data| build(index, data))
}

/// Builds every story level in campaign order.
pub fn story() -> Result<Vec<StoryLevel>, GridError> {
    STORY
        .iter()
        .enumerate()
        .map(|(index, data)| build(index, data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use robo_trail_core::{Direction, CANONICAL_START};

    #[test]
    fn every_story_level_satisfies_grid_invariants() {
        let levels = story().expect("story levels must be valid");
        assert_eq!(levels.len(), STORY_LEVEL_COUNT);
        for level in &levels {
            assert_eq!(level.grid.start().cell, CANONICAL_START);
            assert_eq!(level.grid.start().facing, Direction::East);
            assert_eq!(level.grid.finish(), CANONICAL_FINISH);
        }
    }

    #[test]
    fn first_level_matches_tutorial_layout() {
        let level = story_level(0).expect("level exists").expect("valid");
        assert!(level.grid.is_wall(CellCoord::new(2, 7)));
        assert!(level
            .grid
            .bonus()
            .contains(&Bonus::new(CellCoord::new(1, 7), 10)));
        assert!(!level.is_final());
    }

    #[test]
    fn campaign_ends_after_ten_levels() {
        assert!(story_level(STORY_LEVEL_COUNT).is_none());
        let last = story_level(STORY_LEVEL_COUNT - 1)
            .expect("level exists")
            .expect("valid");
        assert!(last.is_final());
        assert_eq!(last.grid.bonus().len(), 4);
    }
}
