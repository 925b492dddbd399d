#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for playing, generating and checking Robo Trail puzzles.

mod config;
mod console;
mod puzzle_code;

use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::Rng;
use robo_trail_core::{CellCoord, CompileError, GridModel, LevelId};
use robo_trail_rendering::{render, TextRenderer};
use robo_trail_script::LessonEngine;
use robo_trail_system_classifier::{classify_source, LineReport, Verdict};
use robo_trail_system_generator::{generate_seeded, Difficulty, GENERATED_STARTER_CODE};
use robo_trail_system_progress::ProgressLedger;
use robo_trail_system_runner::{AttemptError, Collaborators, Phase, RunController};
use robo_trail_world::{levels, query, Board};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    config::Settings,
    console::{ConsoleNarrator, SleepPacer},
    puzzle_code::PuzzleCode,
};

/// Log directives used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn,robo_trail=info";

#[derive(Parser, Debug)]
#[command(name = "robo-trail")]
#[command(about = "Guide RoboPop home through Candy City with tiny programs")]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the story levels.
    Levels,
    /// Run a program on a story level or a shared puzzle.
    Play(PlayArgs),
    /// Play story levels in order, carrying progress between programs.
    Campaign(CampaignArgs),
    /// Generate a random puzzle that is always solvable.
    Generate(GenerateArgs),
    /// Report which lines of a program look valid.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Story level number, starting at 1.
    #[arg(long, default_value_t = 1, conflicts_with = "code")]
    level: usize,

    /// Puzzle code printed by `generate`.
    #[arg(long)]
    code: Option<String>,

    /// Program to run; defaults to the puzzle's starter code.
    #[arg(long)]
    program: Option<PathBuf>,

    /// Apply one step each time Enter is pressed.
    #[arg(long)]
    step: bool,

    /// Pause between steps in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Largest number of actions a program may queue.
    #[arg(long)]
    action_ceiling: Option<usize>,

    /// Do not print narration.
    #[arg(long)]
    mute: bool,

    /// Print the progress summary as JSON when the attempt ends.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CampaignArgs {
    /// Program files; each one targets the next level, falling back to the
    /// highest unlocked level while earlier ones are unsolved.
    #[arg(required = true)]
    programs: Vec<PathBuf>,

    /// Pause between steps in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Do not print narration.
    #[arg(long)]
    mute: bool,

    /// Print the progress summary as JSON at the end.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Program file to check.
    file: PathBuf,

    /// Print the line reports as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Difficulty from 1 (easy) to 3 (hard).
    #[arg(default_value_t = 1)]
    difficulty: u8,

    /// Seed for reproducible puzzles.
    #[arg(long)]
    seed: Option<u64>,

    /// Print the puzzle as JSON.
    #[arg(long)]
    json: bool,
}

struct Puzzle {
    name: String,
    intro: Option<&'static str>,
    hint: Option<&'static str>,
    level: Option<LevelId>,
    grid: GridModel,
    starter_code: &'static str,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Levels => list_levels(),
        Command::Play(args) => play(args, settings),
        Command::Campaign(args) => campaign(&args, settings),
        Command::Generate(args) => generate(&args),
        Command::Check(args) => check(&args),
    }
}

fn list_levels() -> Result<()> {
    let story = levels::story().context("story level data is invalid")?;
    for level in story {
        println!("{}", level.name);
        println!("    {}", level.intro);
        println!("    Hint: {}", level.hint);
    }
    Ok(())
}

fn resolve_puzzle(args: &PlayArgs) -> Result<Puzzle> {
    if let Some(code) = &args.code {
        let decoded = PuzzleCode::decode(code).context("failed to read puzzle code")?;
        return Ok(Puzzle {
            name: decoded.name,
            intro: None,
            hint: None,
            level: None,
            grid: decoded.grid,
            starter_code: GENERATED_STARTER_CODE,
        });
    }

    let index = args
        .level
        .checked_sub(1)
        .with_context(|| format!("level numbers start at 1, got {}", args.level))?;
    let level = levels::story_level(index)
        .with_context(|| {
            format!(
                "there is no level {}; choose 1 to {}",
                args.level,
                levels::STORY_LEVEL_COUNT
            )
        })?
        .context("story level data is invalid")?;
    Ok(Puzzle {
        name: level.name.to_owned(),
        intro: Some(level.intro),
        hint: Some(level.hint),
        level: Some(level.id),
        grid: level.grid,
        starter_code: level.starter_code,
    })
}

fn play(args: PlayArgs, settings: Settings) -> Result<()> {
    let settings = settings.with_overrides(args.delay_ms, args.action_ceiling, args.mute);
    let puzzle = resolve_puzzle(&args)?;
    let source = match &args.program {
        Some(path) => read_program(path)?,
        None => puzzle.starter_code.to_owned(),
    };

    print_intro(&puzzle.name, puzzle.intro, puzzle.hint);
    info!(name = %puzzle.name, step_mode = args.step, "playing puzzle");
    let mut ledger = ProgressLedger::new(levels::STORY_LEVEL_COUNT);
    let outcome = attempt(
        puzzle.grid,
        puzzle.level,
        &source,
        &settings,
        args.step,
        &mut ledger,
    )?;

    println!("{outcome}");
    print_progress(&ledger, args.json)
}

fn campaign(args: &CampaignArgs, settings: Settings) -> Result<()> {
    let settings = settings.with_overrides(args.delay_ms, None, args.mute);
    let mut ledger = ProgressLedger::new(levels::STORY_LEVEL_COUNT);

    for (requested, path) in args.programs.iter().enumerate() {
        let source = read_program(path)?;
        let id = ledger.select_level(requested);
        let index = usize::try_from(id.get()).context("level index out of range")?;
        let level = levels::story_level(index)
            .with_context(|| format!("there is no level {id}"))?
            .context("story level data is invalid")?;

        print_intro(level.name, Some(level.intro), Some(level.hint));
        info!(level = %id, program = %path.display(), "campaign attempt");
        let outcome = attempt(level.grid, Some(id), &source, &settings, false, &mut ledger)?;
        println!("{outcome}");
        println!();
    }

    println!(
        "Completed {} of {} levels",
        ledger.completed_count(),
        levels::STORY_LEVEL_COUNT
    );
    print_progress(&ledger, args.json)
}

fn read_program(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read program at {}", path.display()))
}

fn print_intro(name: &str, intro: Option<&str>, hint: Option<&str>) {
    println!("{name}");
    if let Some(intro) = intro {
        println!("{intro}");
    }
    if let Some(hint) = hint {
        println!("Hint: {hint}");
    }
    println!();
}

/// Plays one attempt to the end and describes how it went.
fn attempt(
    grid: GridModel,
    level: Option<LevelId>,
    source: &str,
    settings: &Settings,
    step: bool,
    ledger: &mut ProgressLedger,
) -> Result<String> {
    let mut controller = RunController::new(Arc::new(grid), level, settings.run);
    let mut frames = TextRenderer::new(io::stdout());
    let mut narrator = ConsoleNarrator::new(io::stdout(), settings.narration);
    let mut pacer = SleepPacer;
    let mut engine = LessonEngine::default();
    let mut out = Collaborators {
        progress: ledger,
        frames: &mut frames,
        narrator: &mut narrator,
        pacer: &mut pacer,
    };

    let phase = if step {
        step_through(&mut controller, &mut engine, source, &mut out)?
    } else {
        controller.run(&mut engine, source, &mut out)
    };
    Ok(outcome_line(phase, controller.attempt().failure()))
}

fn print_progress(ledger: &ProgressLedger, json: bool) -> Result<()> {
    let badges: Vec<&str> = ledger.badges().map(|badge| badge.name()).collect();
    println!("XP: {} | Badges: {}", ledger.xp(), badges.join(", "));
    if json {
        let summary = serde_json::to_string_pretty(&ledger.summary())
            .context("failed to serialize progress summary")?;
        println!("{summary}");
    }
    Ok(())
}

fn step_through(
    controller: &mut RunController,
    engine: &mut LessonEngine,
    source: &str,
    out: &mut Collaborators<'_>,
) -> Result<Phase> {
    let mut phase = controller.start(engine, source, out);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    while phase == Phase::Simulating {
        print!("Press Enter for the next step (q to stop): ");
        io::stdout().flush().context("failed to flush prompt")?;
        line.clear();
        let read = input.read_line(&mut line).context("failed to read input")?;
        if read == 0 || line.trim() == "q" {
            break;
        }
        phase = controller.step_once(out);
    }
    Ok(phase)
}

fn outcome_line(phase: Phase, failure: Option<&AttemptError>) -> String {
    match (phase, failure) {
        (Phase::Won, _) => "You reached the Home of Coders!".to_owned(),
        (Phase::Exhausted, _) => "Program finished. Can you reach the home?".to_owned(),
        (Phase::Failed, Some(AttemptError::Compile(CompileError::Engine(error)))) => {
            match error.line {
                Some(line) => format!("Error on line {line}: {error}"),
                None => format!("Error: {error}"),
            }
        }
        (Phase::Failed, Some(error)) => format!("Error: {error}"),
        _ => "Stopped before the program finished.".to_owned(),
    }
}

#[derive(Serialize)]
struct GeneratedDocument<'a> {
    name: &'a str,
    difficulty: u32,
    seed: u64,
    code: &'a str,
    grid: &'a GridModel,
    path: &'a [CellCoord],
    starter_code: &'a str,
    walls_requested: usize,
    bonus_requested: usize,
    stars_requested: usize,
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let difficulty = Difficulty::try_from(args.difficulty)?;
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let puzzle = generate_seeded(difficulty, seed).context("failed to generate puzzle")?;
    let code = PuzzleCode {
        name: puzzle.name.clone(),
        grid: puzzle.grid.clone(),
    }
    .encode()
    .context("failed to encode puzzle code")?;

    if args.json {
        let document = GeneratedDocument {
            name: &puzzle.name,
            difficulty: difficulty.tier(),
            seed,
            code: &code,
            grid: &puzzle.grid,
            path: &puzzle.path,
            starter_code: puzzle.starter_code,
            walls_requested: puzzle.report.requested_walls,
            bonus_requested: puzzle.report.requested_bonus,
            stars_requested: puzzle.report.requested_stars,
        };
        let json =
            serde_json::to_string_pretty(&document).context("failed to serialize puzzle")?;
        println!("{json}");
        return Ok(());
    }

    let report = puzzle.report;
    println!("{} (seed {seed})", puzzle.name);
    let board = Board::new(Arc::new(puzzle.grid));
    println!("{}", render(&query::frame(&board)));
    println!(
        "Walls: {}/{} | Bonus: {}/{} | Stars: {}/{}",
        report.placed_walls,
        report.requested_walls,
        report.placed_bonus,
        report.requested_bonus,
        report.placed_stars,
        report.requested_stars
    );
    println!("Code: {code}");
    Ok(())
}

fn check(args: &CheckArgs) -> Result<()> {
    let source = read_program(&args.file)?;
    let reports = classify_source(&source);
    if args.json {
        let json =
            serde_json::to_string_pretty(&reports).context("failed to serialize line reports")?;
        println!("{json}");
        return Ok(());
    }

    for report in &reports {
        println!("{}", check_line(report));
    }
    let invalid = reports
        .iter()
        .filter(|report| report.verdict == Verdict::Invalid)
        .count();
    println!("{invalid} line(s) need a second look");
    Ok(())
}

fn check_line(report: &LineReport) -> String {
    let (mark, rule) = match (report.verdict, report.rule) {
        (Verdict::Valid, Some(rule)) => ("ok", rule.name()),
        (Verdict::Valid, None) => ("ok", ""),
        (Verdict::Invalid, _) => ("??", ""),
    };
    format!("{:>3} {mark} {:<16} {}", report.number, rule, report.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_log_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn campaign_takes_programs_in_order() {
        let cli = Cli::try_parse_from(["robo-trail", "campaign", "one.py", "two.py", "--json"])
            .expect("arguments parse");
        let Command::Campaign(args) = cli.command else {
            panic!("expected campaign");
        };
        assert_eq!(args.programs, [PathBuf::from("one.py"), PathBuf::from("two.py")]);
        assert!(args.json);
        assert!(Cli::try_parse_from(["robo-trail", "campaign"]).is_err());
    }

    #[test]
    fn check_accepts_json_flag() {
        let cli = Cli::try_parse_from(["robo-trail", "check", "hop.py", "--json"])
            .expect("arguments parse");
        assert!(matches!(cli.command, Command::Check(CheckArgs { json: true, .. })));
    }

    #[test]
    fn check_lines_show_the_matching_rule() {
        let reports = classify_source("move(2)\nx = 5 + 1");
        assert_eq!(check_line(&reports[0]), "  1 ok move_call        move(2)");
        assert_eq!(check_line(&reports[1]), "  2 ??                  x = 5 + 1");
    }
}
