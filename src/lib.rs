//!
//! EzASM is a small, line oriented assembly language meant for teaching. This crate parses it,
//! dispatches each line through a table of instructions and simulates the result on a machine
//! with 64-bit registers and a flat, byte addressable memory.
//!
//! There's no binary encoding: a program is just its lines, and `$pc` holds the index of the
//! next line to run. Labels name line indexes, so branching to one means writing its index
//! to `$pc`.
//!
//! ```
//! use ezasm::simulator::{Simulator, State};
//!
//! let mut sim = Simulator::default();
//! sim.load_source("li $t0 5\nadd $t0 $t0 3").unwrap();
//! assert_eq!(sim.run().unwrap(), State::Halted);
//! assert_eq!(sim.snapshot().register("t0"), Some(8));
//! ```
//!

pub mod config;
pub mod controller;
pub mod instruction;
pub mod parser;
pub mod simulator;
pub mod utf8_lossy_lines;
