use super::error::ExecError;
use crate::parser::Token;
use crate::simulator::{register_names, Machine, Program, Word};
use std::fmt;

/// What an instruction needs from one of its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Something to read a Word from
    Input,
    /// Something to write a Word to: a register or a memory reference
    Output,
    /// Where to jump to. Labels resolve to their line; anything readable works too.
    Destination,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandKind::Input => write!(f, "a readable value"),
            OperandKind::Output => write!(f, "a register or memory reference"),
            OperandKind::Destination => write!(f, "a jump destination"),
        }
    }
}

/// A [`Token`] resolved against the state of a simulator, right before its instruction runs.
/// Targets are never cached: a memory reference reads its base register when it's resolved,
/// so the same line can point somewhere else the next time it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Register index
    Register(usize),
    Immediate(Word),
    /// Absolute address, already offset
    Memory(i64),
    /// Line index in the program
    Label(usize),
}

impl Target {
    pub fn resolve(token: &Token, machine: &Machine, program: &Program) -> Result<Self, ExecError> {
        let register = |name: &String| {
            register_names::index_of(name).ok_or_else(|| ExecError::UnknownRegister(name.clone()))
        };

        match token {
            Token::Register(name) => register(name).map(Target::Register),
            Token::Immediate(x) => Ok(Target::Immediate(Word::from(*x))),
            Token::Memory { base, offset } => {
                let base = machine.registers.get(register(base)?).as_i64();
                Ok(Target::Memory(base.wrapping_add(*offset)))
            }
            Token::Label(label) => program
                .label(label)
                .map(Target::Label)
                .ok_or_else(|| ExecError::UnknownLabel(label.clone())),
        }
    }

    /// Registers and memory are both readable and writable, immediates and labels are only
    /// readable. Anything readable can be jumped to.
    pub fn supports(&self, kind: OperandKind) -> bool {
        match kind {
            OperandKind::Input | OperandKind::Destination => true,
            OperandKind::Output => matches!(self, Target::Register(_) | Target::Memory(_)),
        }
    }

    pub fn get(&self, machine: &Machine) -> Result<Word, ExecError> {
        match *self {
            Target::Register(i) => Ok(machine.registers.get(i)),
            Target::Immediate(x) => Ok(x),
            Target::Memory(address) => machine.memory.get_word(address),
            Target::Label(line) => Ok(Word::from(line)),
        }
    }

    pub fn set(&self, machine: &mut Machine, value: Word) -> Result<(), ExecError> {
        match *self {
            Target::Register(i) => {
                machine.registers.set(i, value);
                Ok(())
            }
            Target::Memory(address) => machine.memory.set_word(address, value),
            Target::Immediate(_) | Target::Label(_) => {
                Err(ExecError::Internal(format!("{:?} is not writable", self)))
            }
        }
    }

    /// The line to jump to
    pub fn address(&self, machine: &Machine) -> Result<Word, ExecError> {
        self.get(machine)
    }
}
