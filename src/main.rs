use std::io::Read;
use std::process::exit;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::{fs, io};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use fd_solver::io::{output, parser};
use fd_solver::solver::{Config, Counters, Engine};

#[derive(Parser)]
#[clap(about = "Finite-domain constraint solver")]
struct Args {
    /// Input problem file, or "-" to read from stdin.
    filename: String,

    /// Stop after this many solutions.
    #[clap(long)]
    max_solutions: Option<u64>,

    /// Re-sort constraints by observed quality every N nodes.
    #[clap(long, default_value_t = 1)]
    reorder_interval: u64,

    /// Suppress the progress display.
    #[clap(long)]
    quiet: bool,
}

fn read_input(filename: &str) -> Result<String, io::Error> {
    if filename == "-" {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        Ok(input)
    } else {
        fs::read_to_string(filename)
    }
}

fn make_progress_bar() -> ProgressBar {
    const PROGRESS_SCALE: u64 = 1000;
    let bar = ProgressBar::new(PROGRESS_SCALE);
    bar.set_style(
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {percent}% {msg}"),
    );
    bar
}

fn main() {
    let args = Args::parse();

    let input = read_input(&args.filename).expect("Could not read the input.");
    let problem = parser::parse_text(&input).unwrap_or_else(|message| {
        eprintln!("{message}");
        exit(1);
    });

    let abort = Arc::new(AtomicBool::new(false));
    {
        let abort = Arc::clone(&abort);
        ctrlc::set_handler(move || abort.store(true, Ordering::Relaxed))
            .expect("Could not set the interrupt handler.");
    }

    let mut config = Config {
        max_solutions: args.max_solutions,
        reorder_interval: args.reorder_interval,
        abort: Some(Arc::clone(&abort)),
        ..Config::default()
    };

    let progress_bar = if !args.quiet && atty::is(atty::Stream::Stderr) {
        let bar = make_progress_bar();
        let callback_bar = bar.clone();
        config.progress_callback = Some(Box::new(move |counters: &Counters| {
            callback_bar.set_position((counters.progress_ratio * 1000.0) as u64);
            callback_bar.set_message(output::counters(counters));
        }));
        Some(bar)
    } else {
        None
    };

    let mut engine = Engine::new(&problem, config).unwrap_or_else(|error| {
        eprintln!("{error}");
        exit(1);
    });

    let mut num_solutions = 0;
    while args.max_solutions.map_or(true, |max| num_solutions < max) {
        match engine.next() {
            Some(Ok(solution)) => {
                num_solutions += 1;
                let text = output::solution_as_grids(&solution);
                match &progress_bar {
                    Some(bar) => bar.println(text),
                    None => println!("{text}"),
                }
            }
            Some(Err(error)) => {
                if let Some(bar) = &progress_bar {
                    bar.finish_and_clear();
                }
                eprintln!("{error}");
                eprintln!("{}", output::counters(engine.counters()));
                exit(1);
            }
            None => break,
        }
    }

    if let Some(bar) = &progress_bar {
        bar.finish_and_clear();
    }
    if abort.load(Ordering::Relaxed) {
        eprintln!("Interrupted.");
    }
    eprintln!("{}", output::counters(engine.counters()));
}
