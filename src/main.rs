use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use dicecalc::{
    prelude::*,
    render::stats_summary,
    session::{DEFAULT_HISTORY_LIMIT, DEFAULT_NOTATION},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored dice labels
    #[arg(long, default_value_t = false, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the exact outcome distribution of a dice notation
    Stats {
        /// Dice notation, e.g. 3d6+7
        notation: String,

        /// Print the statistics as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Width of the longest histogram bar
        #[arg(short, long, default_value_t = 40)]
        width: usize,
    },
    /// Roll a dice notation one or more times
    Roll {
        /// Dice notation, e.g. 3d6+7
        notation: String,

        /// Number of rolls
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Random seed for reproducibility
        #[arg(long, default_value = None)]
        seed: Option<u64>,

        /// Print the rolls as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Interactive calculator (the default)
    Repl {
        /// Random seed for reproducibility
        #[arg(long, default_value = None)]
        seed: Option<u64>,

        /// Number of rolls kept in the history
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        history: usize,

        /// Width of the longest histogram bar
        #[arg(short, long, default_value_t = 40)]
        width: usize,
    },
}

fn roller(seed: Option<u64>) -> Roller {
    match seed {
        Some(seed) => Roller::from_seed(seed),
        None => Roller::new(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("Starting with args: {:?}", args);

    let color = !args.no_color;
    let command = args.command.unwrap_or(Command::Repl {
        seed: None,
        history: DEFAULT_HISTORY_LIMIT,
        width: 40,
    });

    match command {
        Command::Stats {
            notation,
            json,
            width,
        } => {
            let spec = parse_dice(&notation)?;
            let stats = compute_stats(&spec);
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", stats_summary(&spec, &stats));
                print!("{}", histogram(&stats.distribution, width));
            }
        }
        Command::Roll {
            notation,
            count,
            seed,
            json,
        } => {
            let mut roller = roller(seed);
            let config = SessionConfig {
                history_limit: count,
                initial_notation: notation,
            };
            let mut session = Session::new(&config);
            if let Some(error) = session.error.take() {
                return Err(error.into());
            }
            for _ in 0..count {
                session.roll(&mut roller)?;
            }
            if json {
                let rolls: Vec<&RollRecord> = session.history.iter().collect();
                println!("{}", serde_json::to_string_pretty(&rolls)?);
            } else {
                print!("{}", history_table(&session.history, color));
            }
        }
        Command::Repl {
            seed,
            history,
            width,
        } => {
            let mut roller = roller(seed);
            let config = SessionConfig {
                history_limit: history,
                initial_notation: DEFAULT_NOTATION.to_string(),
            };
            repl(Session::new(&config), &mut roller, width, color)?;
        }
    }

    Ok(())
}

const HELP: &str = "\
Type a dice notation (e.g. 3d6+7) to select it.
  <enter> or roll   roll the selected dice
  history           show past rolls
  #N                select the dice of history entry N
  clear             clear the history
  help              show this message
  quit              exit";

fn repl(mut session: Session, roller: &mut Roller, width: usize, color: bool) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{HELP}");
    if let Some(dice) = &session.dice {
        show_dice(dice, width);
    }
    print!("> ");
    stdout.flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "clear" => session.clear_history(),
            "history" => print!("{}", history_table(&session.history, color)),
            "" | "roll" => match session.roll(roller)? {
                Some(record) => {
                    let mut buf = String::new();
                    record.pretty_print(&mut buf)?;
                    println!("{buf}");
                }
                None => match &session.error {
                    Some(error) => println!("Cannot roll {:?}: {error}", session.raw),
                    None => println!("No dice selected"),
                },
            },
            entry if entry.starts_with('#') => {
                let reselected = entry[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| session.reselect(index));
                match reselected {
                    Some(Ok(dice)) => show_dice(dice, width),
                    Some(Err(error)) => println!("{error}"),
                    None => println!("No history entry {entry}"),
                }
            }
            notation => match session.update_dice(notation) {
                Ok(dice) => show_dice(dice, width),
                Err(error) => println!("{notation}\n{}^ {error}", " ".repeat(error.position)),
            },
        }
        print!("> ");
        stdout.flush()?;
    }

    Ok(())
}

fn show_dice(dice: &SelectedDice, width: usize) {
    println!("{}", stats_summary(&dice.spec, &dice.stats));
    print!("{}", histogram(&dice.stats.distribution, width));
}
