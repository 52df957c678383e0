use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use keyhunt::model::{
    AttributeSet, Difficulty, DifficultyTable, MatchCompletionState, MatchStats, MatchView,
};
use keyhunt::{MatchError, MatchState, Settings};

#[derive(Debug, Parser)]
#[command(name = "keyhunt", about = "Find every team that wipes out the opposing side")]
struct Cli {
    /// Difficulty level, 0 (very easy) to 4 (very hard)
    #[arg(short, long)]
    difficulty: Option<usize>,
    /// Seed for a reproducible match
    #[arg(short, long)]
    seed: Option<u64>,
    /// Alternate difficulty table (JSON)
    #[arg(long)]
    profiles: Option<PathBuf>,
    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    env_logger::init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(path) = cli.profiles {
        settings.profiles_path = Some(path);
    }
    if let Some(level) = cli.difficulty {
        settings.difficulty = Difficulty::from_index(level).ok_or(MatchError::UnknownDifficulty(level))?;
    }
    if cli.seed.is_some() {
        settings.seed = cli.seed;
    }

    let table: DifficultyTable = settings.difficulty_table()?;
    let mut state = MatchState::new(table);
    let view = state.start_match(settings.difficulty, settings.seed)?;
    print_match(&view);
    if settings.debug_mode {
        if let Some(keys) = state.planted_keys() {
            println!("[debug] seed {:?}, planted keys: {:?}", state.seed(), keys);
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("team> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        match input {
            "" => continue,
            "quit" | "exit" => break,
            "history" => {
                if let Some(view) = state.view() {
                    print_history(&view);
                }
                continue;
            }
            "deps" => {
                if let Some(view) = state.view() {
                    print_match(&view);
                }
                continue;
            }
            _ => {}
        }
        if let Some(level) = input.strip_prefix("new") {
            let difficulty = match level.trim().parse::<usize>() {
                Ok(level) => Difficulty::from_index(level).ok_or(MatchError::UnknownDifficulty(level)),
                Err(_) => Ok(settings.difficulty),
            };
            match difficulty.and_then(|d| state.start_match(d, settings.seed)) {
                Ok(view) => print_match(&view),
                Err(e) => println!("{}", e),
            }
            continue;
        }

        let team = match input.parse::<AttributeSet>() {
            Ok(team) => team,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match state.submit_team(&team) {
            Ok(submission) => {
                if submission.was_submitted_before {
                    println!("{} already fought; it defeated {}", team, submission.closure);
                    continue;
                }
                let attributes = state.view().map(|v| v.attributes).unwrap_or_default();
                let survivors = submission.survivors(&attributes);
                if survivors.is_empty() {
                    println!("{} wiped out every opponent!", team);
                } else {
                    println!("{} defeated {}; still standing: {}", team, submission.closure, survivors);
                }
                if submission.newly_found {
                    println!("That is one of the teams you were looking for.");
                } else if submission.is_superkey {
                    println!("Not every member of that team was needed.");
                }
                if !state.completion_state()?.is_over() {
                    state.advance_round()?;
                }
            }
            Err(e) => {
                println!("{}", e);
                continue;
            }
        }

        match state.completion_state()? {
            MatchCompletionState::InProgress => {
                if let Some(view) = state.view() {
                    println!(
                        "Round {}/{}; teams found {}/{}",
                        view.round, view.total_rounds, view.keys_found, view.total_keys
                    );
                }
            }
            MatchCompletionState::Won(stats) => {
                println!("Congrats! You found every team within the rounds.");
                print_stats(&stats, true);
                println!("Type 'new <level>' to play again or 'quit'.");
            }
            MatchCompletionState::Lost(stats) => {
                println!("Out of rounds. Try again next time!");
                print_stats(&stats, false);
                println!("Type 'new <level>' to play again or 'quit'.");
            }
        }
    }
    Ok(())
}

fn print_match(view: &MatchView) {
    println!(
        "{} match: monsters {}; find {} teams in {} rounds",
        view.difficulty,
        view.attributes,
        view.total_keys,
        view.total_rounds
    );
    println!("{}", view.dependencies);
}

fn print_history(view: &MatchView) {
    for entry in view.history.iter() {
        println!("{} -> {}", entry.team, entry.closure);
    }
}

fn print_stats(stats: &MatchStats, won: bool) {
    println!(
        "You used {} {}.",
        stats.monsters_used,
        if stats.monsters_used == 1 { "monster" } else { "monsters" }
    );
    if won {
        println!(
            "You used {} {} to find all the teams.",
            stats.rounds_used,
            if stats.rounds_used == 1 { "round" } else { "rounds" }
        );
    } else {
        println!(
            "You found {} teams but missed {}.",
            stats.keys_found,
            stats.keys_missing()
        );
    }
}
