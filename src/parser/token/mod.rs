pub mod context;
pub use context::Context;

use std::fmt;

/// One parsed operand. Tokens only describe syntax: whether a register or a label actually
/// exists is decided when the instruction is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `$t0`, `$3`
    Register(String),
    /// `42`, `-0x10`, `'a'`
    Immediate(i64),
    /// `offset($base)`
    Memory { base: String, offset: i64 },
    /// `loop`
    Label(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Register(name) => write!(f, "${}", name),
            Token::Immediate(x) => write!(f, "{}", x),
            Token::Memory { base, offset } => write!(f, "{}(${})", offset, base),
            Token::Label(label) => write!(f, "{}", label),
        }
    }
}
