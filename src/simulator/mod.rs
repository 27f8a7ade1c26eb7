//!
//! Runs a parsed EzASM program line by line.
//!
//! A [`Simulator`] owns a [`Machine`] (registers and memory), the loaded [`Program`] and a
//! [`Dispatcher`] that runs each line. `$pc` holds the index of the next line: [`Simulator::step`]
//! advances it before dispatching, so branches simply overwrite it.
//!

use crate::instruction::{Dispatcher, Registry};
use crate::parser;
use crate::utf8_lossy_lines::Utf8LossyLinesExt;
use owo_colors::OwoColorize;
use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

pub mod error;
pub use error::SimError;

mod machine;
pub use machine::Machine;

pub mod memory;
use memory::{Memory, DEFAULT_MEMORY_SIZE};

mod program;
pub use program::Program;

pub mod register_names;

mod registers;
pub use registers::Registers;

mod word;
pub use word::{FromWord, IntoWord, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    /// Nothing executed since the program was loaded or reset
    Idle,
    Running,
    Paused,
    /// `$pc` left the program
    Halted,
    /// A line failed to execute
    Faulted,
}

impl State {
    /// Halted and faulted simulators need a reset before stepping again
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Halted | State::Faulted)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::Running => "running",
            State::Paused => "paused",
            State::Halted => "halted",
            State::Faulted => "faulted",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Bytes of memory. `$sp` starts here.
    pub memory_size: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }
}

/// One register, as seen from outside the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterView {
    pub name: &'static str,
    pub value: i64,
}

/// A copy of everything a display needs to know about a simulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub registers: Vec<RegisterView>,
    pub state: State,
}

impl Snapshot {
    /// Looks a register up by name or number, without the `$`
    pub fn register(&self, name: &str) -> Option<i64> {
        let i = register_names::index_of(name)?;
        self.registers.get(i).map(|r| r.value)
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }
}

#[derive(Debug)]
pub struct Simulator {
    machine: Machine,
    program: Program,
    dispatcher: Dispatcher,
    state: State,

    /// Lines run through [`Simulator::execute_line`] so far, to number them in errors
    interactive_lines: u32,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Arc::new(Registry::standard()), SimulatorConfig::default())
    }
}

impl Simulator {
    pub fn new(registry: Arc<Registry>, config: SimulatorConfig) -> Self {
        Self {
            machine: Machine::new(config.memory_size),
            program: Program::default(),
            dispatcher: Dispatcher::new(registry),
            state: State::Idle,
            interactive_lines: 0,
        }
    }

    /// Parses and loads a program, resetting registers and memory. The previous program is
    /// kept if parsing fails.
    pub fn load_program<I, S>(&mut self, lines: I) -> Result<(), SimError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.program = Program::parse(lines)?;
        self.reset();
        Ok(())
    }

    pub fn load_source(&mut self, source: &str) -> Result<(), SimError> {
        self.load_program(source.lines())
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), SimError> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "loading program");

        let file = std::fs::File::open(path)?;
        let lines = BufReader::new(file)
            .utf8_lossy_lines()
            .collect::<Result<Vec<_>, _>>()?;
        self.load_program(lines)
    }

    /// Returns registers, memory and `$pc` to their initial values. The program stays loaded.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.state = State::Idle;
        self.interactive_lines = 0;
    }

    /// Runs the line `$pc` points at. Stepping an idle simulator starts it, stepping a paused
    /// one keeps it paused.
    ///
    /// On failure the simulator faults and `$pc` keeps pointing at the failed line.
    pub fn step(&mut self) -> Result<State, SimError> {
        if self.state.is_terminal() {
            return Err(SimError::NotRunnable(self.state));
        }
        if self.state == State::Idle {
            self.state = State::Running;
        }

        let pc = self.machine.registers.pc();
        let line = match self.program.get(pc) {
            Some(line) => line,
            None => {
                self.state = State::Halted;
                return Ok(self.state);
            }
        };

        self.machine.registers.set_pc(Word::from(pc.wrapping_add(1)));

        if let Err(err) = self
            .dispatcher
            .execute(&mut self.machine, &self.program, line)
        {
            self.machine.registers.set_pc(Word::from(pc));
            self.state = State::Faulted;
            return Err(SimError::Exec {
                err,
                ctx: line.ctx.clone(),
            });
        }

        if self.program.get(self.machine.registers.pc()).is_none() {
            self.state = State::Halted;
        }
        Ok(self.state)
    }

    /// Steps until the program halts or faults
    pub fn run(&mut self) -> Result<State, SimError> {
        self.resume();
        loop {
            let state = self.step()?;
            if state.is_terminal() {
                return Ok(state);
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == State::Running {
            self.state = State::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == State::Paused {
            self.state = State::Running;
        }
    }

    /// Parses and runs a single line against the live machine, outside of the loaded program.
    /// `$pc` isn't advanced, and failures don't fault the simulator. Blank and label-only lines
    /// do nothing.
    pub fn execute_line(&mut self, text: &str) -> Result<(), SimError> {
        self.interactive_lines += 1;
        let statement = parser::parse_statement(text, self.interactive_lines)?;
        let Some(line) = statement.line else {
            return Ok(());
        };

        self.dispatcher
            .execute(&mut self.machine, &self.program, &line)
            .map_err(|err| SimError::Exec {
                err,
                ctx: line.ctx.clone(),
            })
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn registers(&self) -> &Registers {
        &self.machine.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.machine.memory
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn snapshot(&self) -> Snapshot {
        let registers = self
            .machine
            .registers
            .iter()
            .zip(register_names::REGVEC)
            .map(|(value, name)| RegisterView {
                name,
                value: value.as_i64(),
            })
            .collect();

        Snapshot {
            registers,
            state: self.state,
        }
    }

    pub fn print_state(&self) {
        eprintln!("{} {}", "State:".bright_blue(), self.state);
        eprintln!("{}", "Registers:".bright_blue());
        for (i, view) in self.snapshot().registers.iter().enumerate() {
            eprint!(
                "{}{:<4} {:016x} ",
                "$".bright_blue(),
                view.name.bright_blue(),
                view.value
            );
            if i % 4 == 3 {
                eprintln!();
            }
        }
        eprintln!();

        let handlers = self.dispatcher.handlers();
        if !handlers.is_empty() {
            eprintln!("{}", "Instructions executed:".bright_blue());
            for handler in handlers {
                eprintln!("  {:<12} {}", handler.group(), handler.invocations());
            }
        }
    }

    pub fn print_program(&self) {
        let labels = self.program.labels();
        eprintln!("{}", "Program: --------------------".bright_blue());
        for (i, line) in self.program.lines().iter().enumerate() {
            for (name, _) in labels.iter().filter(|&&(_, at)| at == i) {
                eprintln!("{}:", name.bright_yellow());
            }
            eprintln!("{:>5}  {}", i, line.ctx.source.trim());
        }
        for (name, _) in labels.iter().filter(|&&(_, at)| at == self.program.len()) {
            eprintln!("{}:", name.bright_yellow());
        }
        eprintln!("{}", "-----------------------------".bright_blue());
    }
}
