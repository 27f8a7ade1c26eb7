use super::OperandKind;
use owo_colors::OwoColorize;
use thiserror::Error;

/// Errors raised while dispatching or executing an instruction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("Unknown instruction '{}'", .0.bright_yellow())]
    UnknownInstruction(String),

    #[error("Unknown register '{}{}'", "$".bright_yellow(), .0.bright_yellow())]
    UnknownRegister(String),

    #[error("Label '{}' was not found", .0.bright_yellow())]
    UnknownLabel(String),

    #[error(
        "'{}' expects {} operand(s), but {} were given",
        mnemonic.bright_blue(), expected.bright_blue(), found.bright_yellow()
    )]
    ArityMismatch {
        mnemonic: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "Operand {} of '{}' must be {}, but '{}' is not",
        (position + 1).bright_blue(), mnemonic.bright_blue(), expected, operand.bright_yellow()
    )]
    KindMismatch {
        mnemonic: String,
        position: usize,
        expected: OperandKind,
        operand: String,
    },

    #[error("Memory access out of range at address {}", address.bright_yellow())]
    MemoryOutOfRange { address: i64 },

    #[error("Division by zero")]
    DivideByZero,

    /// A handler was given targets its descriptor never allows. This is a bug in the
    /// instruction table, never in the program being simulated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExecError {
    /// Whether the operands didn't fit the instruction's declared shape
    pub fn is_arity_or_kind_mismatch(&self) -> bool {
        matches!(
            self,
            ExecError::ArityMismatch { .. } | ExecError::KindMismatch { .. }
        )
    }
}
