use super::State;
use crate::instruction::ExecError;
use crate::parser::error::ParseError;
use crate::parser::Context;
use owo_colors::OwoColorize;
use std::io;
use thiserror::Error;

/// Anything that can go wrong while loading or running a program
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    /// A line failed to execute
    #[error("{}\n{}", err.bold(), ctx)]
    Exec { err: ExecError, ctx: Context },

    #[error("Failed to read the program: {0}")]
    Io(#[from] io::Error),

    #[error("The simulator is {} and can't run until it's reset", .0.bright_yellow())]
    NotRunnable(State),
}

impl SimError {
    pub fn exec_error(&self) -> Option<&ExecError> {
        match self {
            SimError::Exec { err, .. } => Some(err),
            _ => None,
        }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            SimError::Parse(err) => Some(err),
            _ => None,
        }
    }

    /// The source line the error points at
    pub fn line(&self) -> Option<u32> {
        match self {
            SimError::Exec { ctx, .. } => Some(ctx.line),
            SimError::Parse(err) => err.context().map(|ctx| ctx.line),
            _ => None,
        }
    }
}
