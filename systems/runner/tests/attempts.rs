use std::{sync::Arc, time::Duration};

use robo_trail_core::{
    Badge, CellCoord, CompileError, Direction, Frame, FrameSink, InvalidParameter, LevelId,
    NarrationCue, Narrator, Pacer, StepError,
};
use robo_trail_script::LessonEngine;
use robo_trail_system_progress::ProgressLedger;
use robo_trail_system_runner::{AttemptError, Collaborators, Phase, RunController, RunSettings};
use robo_trail_world::{levels, query};

#[derive(Default)]
struct Frames(Vec<CellCoord>);

impl FrameSink for Frames {
    fn present(&mut self, frame: &Frame<'_>) {
        self.0.push(frame.actor.position);
    }
}

#[derive(Default)]
struct Cues(Vec<NarrationCue>);

impl Narrator for Cues {
    fn narrate(&mut self, cue: &NarrationCue) {
        self.0.push(cue.clone());
    }
}

#[derive(Default)]
struct Pauses(Vec<Duration>);

impl Pacer for Pauses {
    fn pause(&mut self, delay: Duration) {
        self.0.push(delay);
    }
}

#[derive(Default)]
struct Host {
    ledger: Option<ProgressLedger>,
    frames: Frames,
    cues: Cues,
    pauses: Pauses,
}

impl Host {
    fn new() -> Self {
        Self {
            ledger: Some(ProgressLedger::new(levels::STORY_LEVEL_COUNT)),
            ..Self::default()
        }
    }

    fn ledger(&self) -> &ProgressLedger {
        self.ledger.as_ref().expect("ledger present")
    }

    fn run(&mut self, controller: &mut RunController, source: &str) -> Phase {
        let mut out = self.collaborators();
        controller.run(&mut LessonEngine::default(), source, &mut out)
    }

    fn collaborators(&mut self) -> Collaborators<'_> {
        Collaborators {
            progress: self.ledger.as_mut().expect("ledger present"),
            frames: &mut self.frames,
            narrator: &mut self.cues,
            pacer: &mut self.pauses,
        }
    }
}

fn level_one() -> RunController {
    let level = levels::story_level(0)
        .expect("level exists")
        .expect("level is valid");
    RunController::new(Arc::new(level.grid), Some(level.id), RunSettings::default())
}

#[test]
fn level_one_bonus_then_wall() {
    let mut controller = level_one();
    let mut host = Host::new();

    assert_eq!(host.run(&mut controller, "move(2)\n"), Phase::Failed);

    let attempt = controller.attempt();
    assert_eq!(attempt.steps().len(), 2);
    assert_eq!(attempt.cursor(), 1);
    assert_eq!(query::actor(attempt.board()).position, CellCoord::new(1, 7));
    assert!(query::collectibles(attempt.board())
        .bonus()
        .iter()
        .all(|bonus| bonus.cell != CellCoord::new(1, 7)));
    assert_eq!(
        attempt.failure(),
        Some(&AttemptError::Step(StepError::Blocked {
            from: CellCoord::new(1, 7),
            toward: Direction::East,
        }))
    );

    let ledger = host.ledger();
    assert_eq!(ledger.xp(), 18 + 10);
    assert!(ledger.has_badge(Badge::FirstRun));
    assert!(ledger.has_badge(Badge::BonusHunter));
    assert_eq!(ledger.level(LevelId::new(0)).map(|record| record.attempts), Some(1));

    assert_eq!(
        host.cues.0,
        vec![
            NarrationCue::BonusCollected { points: 10 },
            NarrationCue::Oops(
                "Bonk! You hit a candy wall or the edge. Try turning first.".to_owned()
            ),
        ]
    );
    assert_eq!(host.pauses.0, vec![Duration::from_millis(220)]);
}

#[test]
fn reaching_home_stops_the_program() {
    let mut controller = level_one();
    let mut host = Host::new();
    let source = "turn_left()\nmove(7)\nturn_right()\nmove(7)\nmove(5)\n";

    assert_eq!(host.run(&mut controller, source), Phase::Won);

    let attempt = controller.attempt();
    assert_eq!(attempt.cursor(), 16);
    assert_eq!(attempt.steps().len(), 21);
    assert!(query::has_won(attempt.board()));
    assert_eq!(host.cues.0.last(), Some(&NarrationCue::Win));

    let ledger = host.ledger();
    assert_eq!(ledger.level(LevelId::new(0)).map(|record| record.completed), Some(true));
    assert_eq!(ledger.unlocked(), LevelId::new(1));
}

#[test]
fn empty_program_is_exhausted() {
    let mut controller = level_one();
    let mut host = Host::new();

    assert_eq!(host.run(&mut controller, "# nothing yet\n"), Phase::Exhausted);
    assert_eq!(host.cues.0, vec![NarrationCue::Encourage]);
    assert!(host.pauses.0.is_empty());
}

#[test]
fn runtime_rejection_leaves_board_untouched() {
    let mut controller = level_one();
    let mut host = Host::new();

    assert_eq!(host.run(&mut controller, "move(1)\nmove(-2)\n"), Phase::Failed);

    let attempt = controller.attempt();
    assert!(attempt.steps().is_empty());
    assert_eq!(query::actor(attempt.board()).position, CellCoord::new(0, 7));
    assert_eq!(
        attempt.failure(),
        Some(&AttemptError::Compile(CompileError::InvalidParameter(
            InvalidParameter::Negative { value: -2.0 }
        )))
    );
    assert_eq!(
        host.cues.0,
        vec![NarrationCue::Oops("move(n) must be 0 or more.".to_owned())]
    );
    assert_eq!(host.ledger().xp(), 0);
}

#[test]
fn style_badges_are_awarded_before_evaluation() {
    let mut controller = level_one();
    let mut host = Host::new();

    let phase = host.run(&mut controller, "steps = 2\nfor i in range(steps):\n    mvoe(1)\n");

    assert_eq!(phase, Phase::Failed);
    assert!(host.ledger().has_badge(Badge::LoopHero));
    assert!(host.ledger().has_badge(Badge::VariableWizard));
    assert_eq!(host.ledger().xp(), 0);
}

#[test]
fn style_badges_and_reward_agree_on_success() {
    let mut controller = level_one();
    let mut host = Host::new();

    let phase = host.run(&mut controller, "steps = 1\nfor i in range(steps):\n    turn_left()\n");

    assert_eq!(phase, Phase::Exhausted);
    assert!(host.ledger().has_badge(Badge::LoopHero));
    assert!(host.ledger().has_badge(Badge::VariableWizard));
    assert_eq!(host.ledger().xp(), 10 + 25 + 20 + 8);
}

#[test]
fn single_step_mode_advances_one_step_per_call() {
    let mut controller = level_one();
    let mut host = Host::new();
    let mut engine = LessonEngine::default();

    {
        let mut out = host.collaborators();
        assert_eq!(
            controller.start(&mut engine, "turn_left()\nmove(1)\n", &mut out),
            Phase::Simulating
        );
        assert_eq!(controller.step_once(&mut out), Phase::Simulating);
        assert_eq!(query::actor(controller.attempt().board()).facing, Direction::North);
        assert_eq!(controller.step_once(&mut out), Phase::Exhausted);
        assert_eq!(controller.step_once(&mut out), Phase::Exhausted);
    }

    assert_eq!(
        host.frames.0,
        vec![CellCoord::new(0, 7), CellCoord::new(0, 7), CellCoord::new(0, 6)]
    );
    assert!(host.pauses.0.is_empty());
}

#[test]
fn reset_restores_the_level() {
    let mut controller = level_one();
    let mut host = Host::new();
    let _ = host.run(&mut controller, "move(2)\n");

    {
        let mut out = host.collaborators();
        controller.reset(&mut out);
    }

    let attempt = controller.attempt();
    assert_eq!(attempt.phase(), Phase::Idle);
    assert!(attempt.steps().is_empty());
    assert_eq!(attempt.failure(), None);
    assert_eq!(query::actor(attempt.board()).position, CellCoord::new(0, 7));
    assert_eq!(query::collectibles(attempt.board()).bonus().len(), 2);
    assert_eq!(host.frames.0.last(), Some(&CellCoord::new(0, 7)));
}

#[test]
fn generated_puzzles_do_not_touch_story_progress() {
    let level = levels::story_level(0)
        .expect("level exists")
        .expect("level is valid");
    let mut controller = RunController::new(Arc::new(level.grid), None, RunSettings::default());
    let mut host = Host::new();

    let _ = host.run(&mut controller, "turn_left()\nmove(7)\nturn_right()\nmove(7)\n");

    assert_eq!(controller.phase(), Phase::Won);
    assert_eq!(host.ledger().level(LevelId::new(0)).map(|record| record.attempts), Some(0));
    assert_eq!(host.ledger().unlocked(), LevelId::new(0));
}
