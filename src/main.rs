//!
//! Command line front end: runs an EzASM file to completion, steps through it one line per
//! Enter press, or reads instructions interactively from stdin.
//!

use ezasm::config::Config;
use ezasm::controller::Controller;
use ezasm::instruction::Registry;
use ezasm::simulator::{SimError, Simulator};
use ezasm::utf8_lossy_lines::{Utf8LossyLines, Utf8LossyLinesExt};
use owo_colors::OwoColorize;
use std::io::{self, BufReader, Stdin, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Stdin lines, printing `prompt` to stderr before reading each one
struct Prompted {
    lines: Utf8LossyLines<BufReader<Stdin>>,
    prompt: &'static str,
}

impl Prompted {
    fn new(prompt: &'static str) -> Self {
        Self {
            lines: BufReader::new(io::stdin()).utf8_lossy_lines(),
            prompt,
        }
    }
}

impl Iterator for Prompted {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        eprint!("{}", self.prompt.bright_blue());
        let _ = io::stderr().flush();
        match self.lines.next()? {
            Ok(line) => Some(line),
            Err(e) => {
                tracing::error!("failed to read from stdin: {}", e);
                None
            }
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn report(err: &SimError) {
    eprintln!("{}\n{}", "An error occurred while running your code:".bright_red(), err);
}

fn main() -> ExitCode {
    let config = match Config::get() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log);

    let mut sim = Simulator::new(Arc::new(Registry::standard()), config.simulator());
    if let Some(file) = &config.file {
        if let Err(e) = sim.load_file(file) {
            eprintln!(
                "{}\n{}",
                "An error occurred while parsing your code:".bright_red(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    if config.print_program {
        sim.print_program();
    }

    let controller = Controller::with_error_hook(sim, report);
    let start_time = Instant::now();

    if config.interactive {
        controller.start_interactive(Prompted::new("> "));
        controller.await_termination();
    } else if config.step {
        step_through(&controller);
    } else {
        controller.start_run();
        controller.await_termination();
        println!("Finished in {}ms", start_time.elapsed().as_millis());
    }

    if config.print_state {
        controller.simulator().lock().print_state();
    }

    // Interactive sessions report their errors as they go
    if controller.take_errors().is_empty() || config.interactive {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Steps once per line read from stdin, until the program halts or faults
fn step_through(controller: &Controller) {
    let mut input = Prompted::new("[enter] step ");
    while input.next().is_some() {
        controller.start_single_step();
        controller.await_termination();

        let snapshot = controller.snapshot();
        let pc = snapshot.register("pc").unwrap_or_default();
        eprintln!("{} {}  {}", "pc".bright_blue(), pc, snapshot.state);

        if snapshot.state.is_terminal() {
            break;
        }
    }
}
