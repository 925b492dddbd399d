#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Action compiler that turns learner programs into atomic simulation steps.
//!
//! The compiler owns the action queue of a single compilation, hands it to the
//! injected [`ScriptEngine`] through the [`ScriptHost`] capability interface,
//! and only expands the queue once the whole program has been evaluated. No
//! board state is touched here.

use once_cell::sync::Lazy;
use regex::Regex;
use robo_trail_core::{
    Action, CompileError, InvalidParameter, RewardSignal, ScriptEngine, ScriptHost, Step,
    DEFAULT_ACTION_CEILING, MAX_MOVE_COUNT,
};
use tracing::debug;

const BASE_POINTS: u32 = 10;
const LOOP_POINTS: u32 = 25;
const VARIABLE_POINTS: u32 = 20;
const SHORT_PROGRAM_POINTS: u32 = 8;
const SHORT_PROGRAM_LINES: usize = 10;

static LOOP_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bfor\b|\bwhile\b").expect("loop keyword pattern must compile"));

static VARIABLE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*[A-Za-z_]\w*\s*=\s*.+").expect("assignment pattern must compile")
});

/// Tunables applied to every compilation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Largest number of queued high-level actions a program may produce.
    pub action_ceiling: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            action_ceiling: DEFAULT_ACTION_CEILING,
        }
    }
}

/// Style features detected in a program's source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleReport {
    /// The program contains a `for` or `while` keyword.
    pub has_loop: bool,
    /// Some line assigns to a simple variable.
    pub has_variable: bool,
    /// The program has at most ten non-blank lines.
    pub short: bool,
    /// Points awarded for attempting the program.
    pub reward: RewardSignal,
}

/// Scores a program's style from its text alone.
///
/// The score never depends on whether the program evaluates or simulates
/// successfully.
#[must_use]
pub fn score_style(source: &str) -> StyleReport {
    let has_loop = LOOP_KEYWORD.is_match(source);
    let has_variable = VARIABLE_ASSIGNMENT.is_match(source);
    let line_count = source
        .split('\n')
        .filter(|line| !line.trim().is_empty())
        .count();
    let short = line_count <= SHORT_PROGRAM_LINES;

    let mut points = BASE_POINTS;
    if has_loop {
        points += LOOP_POINTS;
    }
    if has_variable {
        points += VARIABLE_POINTS;
    }
    if short {
        points += SHORT_PROGRAM_POINTS;
    }

    StyleReport {
        has_loop,
        has_variable,
        short,
        reward: RewardSignal::new(points),
    }
}

/// Checks a `move(n)` argument and converts it into a whole cell count.
///
/// Fractional counts round up, so `move(2.5)` advances three cells.
pub fn validate_move_count(count: f64) -> Result<u32, InvalidParameter> {
    if !count.is_finite() {
        return Err(InvalidParameter::NotANumber);
    }
    if count < 0.0 {
        return Err(InvalidParameter::Negative { value: count });
    }
    if count > f64::from(MAX_MOVE_COUNT) {
        return Err(InvalidParameter::TooLarge { value: count });
    }
    // Bounded to 0..=30 above, so the cast is exact.
    Ok(count.ceil() as u32)
}

/// Ordered action queue filled by script host callbacks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    /// Consumes the queue, yielding the actions.
    #[must_use]
    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

impl ScriptHost for ActionQueue {
    fn move_forward(&mut self, count: f64) -> Result<(), InvalidParameter> {
        let count = validate_move_count(count)?;
        self.actions.push(Action::Move { count });
        Ok(())
    }

    fn turn_left(&mut self) {
        self.actions.push(Action::TurnLeft);
    }

    fn turn_right(&mut self) {
        self.actions.push(Action::TurnRight);
    }

    fn say(&mut self, text: String) {
        self.actions.push(Action::Say { text });
    }
}

/// Expands high-level actions into atomic steps, preserving order.
#[must_use]
pub fn expand(actions: Vec<Action>) -> Vec<Step> {
    let mut steps = Vec::with_capacity(actions.len());
    for action in actions {
        match action {
            Action::Move { count } => {
                steps.extend((0..count).map(|_| Step::MoveOne));
            }
            Action::TurnLeft => steps.push(Step::TurnLeft),
            Action::TurnRight => steps.push(Step::TurnRight),
            Action::Say { text } => steps.push(Step::Say { text }),
        }
    }
    steps
}

/// Result of a successful compilation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledProgram {
    /// Atomic steps in execution order.
    pub steps: Vec<Step>,
    /// Number of high-level actions the program queued.
    pub action_count: usize,
    /// Style features and the attempt reward.
    pub style: StyleReport,
}

impl CompiledProgram {
    /// Points awarded for attempting the program.
    #[must_use]
    pub fn reward(&self) -> RewardSignal {
        self.style.reward
    }
}

/// Compiles learner programs through an injected script engine.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    /// Creates a compiler with the provided configuration.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// Evaluates the program and expands its actions into steps.
    ///
    /// Engine failures and rejected host arguments abort the compilation
    /// unchanged. The action ceiling is checked only after evaluation
    /// finished, against the unexpanded action count.
    pub fn compile(
        &self,
        engine: &mut dyn ScriptEngine,
        source: &str,
    ) -> Result<CompiledProgram, CompileError> {
        self.compile_scored(engine, source, score_style(source))
    }

    /// Like [`Compiler::compile`], reusing a style report the caller already
    /// computed for `source`.
    pub fn compile_scored(
        &self,
        engine: &mut dyn ScriptEngine,
        source: &str,
        style: StyleReport,
    ) -> Result<CompiledProgram, CompileError> {
        let mut queue = ActionQueue::default();
        engine.evaluate(source, &mut queue)?;

        let queued = queue.actions.len();
        if queued > self.config.action_ceiling {
            return Err(CompileError::ActionLimitExceeded {
                queued,
                ceiling: self.config.action_ceiling,
            });
        }

        let steps = expand(queue.into_actions());
        debug!(actions = queued, steps = steps.len(), "program compiled");
        Ok(CompiledProgram {
            steps,
            action_count: queued,
            style,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robo_trail_core::{EngineError, ScriptError};

    /// Engine stand-in that replays a fixed list of host calls.
    struct Replay(Vec<Call>);

    enum Call {
        Move(f64),
        Left,
        Right,
        Say(&'static str),
        Fail(&'static str),
    }

    impl ScriptEngine for Replay {
        fn evaluate(&mut self, _source: &str, host: &mut dyn ScriptHost) -> Result<(), ScriptError> {
            for call in &self.0 {
                match call {
                    Call::Move(count) => host.move_forward(*count)?,
                    Call::Left => host.turn_left(),
                    Call::Right => host.turn_right(),
                    Call::Say(text) => host.say((*text).to_owned()),
                    Call::Fail(message) => return Err(EngineError::new(*message).into()),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn moves_expand_into_single_steps() {
        let mut engine = Replay(vec![Call::Move(2.0), Call::Left, Call::Say("hi"), Call::Right]);
        let program = Compiler::default()
            .compile(&mut engine, "")
            .expect("program compiles");

        assert_eq!(program.action_count, 4);
        assert_eq!(
            program.steps,
            vec![
                Step::MoveOne,
                Step::MoveOne,
                Step::TurnLeft,
                Step::Say {
                    text: "hi".to_owned()
                },
                Step::TurnRight,
            ]
        );
    }

    #[test]
    fn move_zero_produces_no_steps() {
        let mut engine = Replay(vec![Call::Move(0.0)]);
        let program = Compiler::default()
            .compile(&mut engine, "")
            .expect("program compiles");
        assert_eq!(program.action_count, 1);
        assert!(program.steps.is_empty());
    }

    #[test]
    fn move_count_validation_matches_host_contract() {
        assert_eq!(validate_move_count(f64::NAN), Err(InvalidParameter::NotANumber));
        assert_eq!(
            validate_move_count(f64::INFINITY),
            Err(InvalidParameter::NotANumber)
        );
        assert_eq!(
            validate_move_count(-2.0),
            Err(InvalidParameter::Negative { value: -2.0 })
        );
        assert_eq!(
            validate_move_count(31.0),
            Err(InvalidParameter::TooLarge { value: 31.0 })
        );
        assert_eq!(validate_move_count(30.0), Ok(30));
        assert_eq!(validate_move_count(2.5), Ok(3));
    }

    #[test]
    fn rejected_move_aborts_compilation() {
        let mut engine = Replay(vec![Call::Move(1.0), Call::Move(-2.0), Call::Move(1.0)]);
        let error = Compiler::default()
            .compile(&mut engine, "")
            .expect_err("negative move must fail");
        assert_eq!(
            error,
            CompileError::InvalidParameter(InvalidParameter::Negative { value: -2.0 })
        );
        assert_eq!(error.to_string(), "move(n) must be 0 or more.");
    }

    #[test]
    fn engine_errors_propagate_verbatim() {
        let mut engine = Replay(vec![Call::Left, Call::Fail("NameError: name 'mvoe' is not defined")]);
        let error = Compiler::default()
            .compile(&mut engine, "")
            .expect_err("engine failure must propagate");
        assert_eq!(error.to_string(), "NameError: name 'mvoe' is not defined");
    }

    #[test]
    fn ceiling_counts_actions_not_steps() {
        let compiler = Compiler::new(CompilerConfig { action_ceiling: 2 });

        let mut long_moves = Replay(vec![Call::Move(30.0), Call::Move(30.0)]);
        let program = compiler
            .compile(&mut long_moves, "")
            .expect("two actions fit");
        assert_eq!(program.steps.len(), 60);

        let mut many_turns = Replay(vec![Call::Left, Call::Left, Call::Left]);
        assert_eq!(
            compiler.compile(&mut many_turns, ""),
            Err(CompileError::ActionLimitExceeded {
                queued: 3,
                ceiling: 2,
            })
        );
    }

    #[test]
    fn default_ceiling_allows_exactly_two_hundred_twenty_actions() {
        let compiler = Compiler::default();
        let mut at_limit = Replay((0..220).map(|_| Call::Left).collect());
        assert!(compiler.compile(&mut at_limit, "").is_ok());

        let mut over_limit = Replay((0..221).map(|_| Call::Left).collect());
        assert!(matches!(
            compiler.compile(&mut over_limit, ""),
            Err(CompileError::ActionLimitExceeded { queued: 221, .. })
        ));
    }

    #[test]
    fn full_style_program_scores_sixty_three() {
        let source = "steps = 2\nfor i in range(3):\n    move(steps)\n";
        let style = score_style(source);
        assert!(style.has_loop);
        assert!(style.has_variable);
        assert!(style.short);
        assert_eq!(style.reward, RewardSignal::new(63));
    }

    #[test]
    fn plain_long_program_scores_base_points() {
        let source = "move(1)\n".repeat(11);
        let style = score_style(&source);
        assert!(!style.has_loop);
        assert!(!style.has_variable);
        assert!(!style.short);
        assert_eq!(style.reward, RewardSignal::new(10));
    }

    #[test]
    fn blank_lines_do_not_count_against_short_bonus() {
        let source = format!("{}\n\n\n   \n", "turn_left()\n".repeat(10));
        assert!(score_style(&source).short);
    }

    #[test]
    fn loop_keyword_must_be_a_whole_word() {
        assert!(!score_style("say(\"forward\")\n").has_loop);
        assert!(score_style("while True:\n    move(1)\n").has_loop);
    }

    #[test]
    fn reward_is_attached_to_compiled_program() {
        let mut engine = Replay(vec![Call::Move(1.0)]);
        let program = Compiler::default()
            .compile(&mut engine, "move(1)\n")
            .expect("program compiles");
        assert_eq!(program.reward(), RewardSignal::new(18));
    }

    #[test]
    fn precomputed_style_is_carried_through() {
        let source = "steps = 1
for i in range(2):
    move(steps)
";
        let style = score_style(source);
        let mut engine = Replay(vec![Call::Move(1.0), Call::Move(1.0)]);
        let program = Compiler::default()
            .compile_scored(&mut engine, source, style)
            .expect("program compiles");
        assert_eq!(program.style, style);
        assert_eq!(program.reward(), RewardSignal::new(63));
    }
}
