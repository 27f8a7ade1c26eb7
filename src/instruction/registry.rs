//! The catalog of instructions a simulator knows how to run

use super::error::ExecError;
use super::target::{OperandKind, Target};
use crate::simulator::Machine;
use hashbrown::HashMap;
use std::fmt;

/// Executes one instruction with already resolved and validated targets
pub type HandlerFn = fn(&mut Machine, &[Target]) -> Result<(), ExecError>;

/// Instructions implemented together. Each simulator gets one handler instance per group,
/// created the first time one of the group's instructions runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandlerGroup {
    Arithmetic,
    Comparison,
    Branch,
    Transfer,
}

impl fmt::Display for HandlerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandlerGroup::Arithmetic => "arithmetic",
            HandlerGroup::Comparison => "comparison",
            HandlerGroup::Branch => "branch",
            HandlerGroup::Transfer => "transfer",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone)]
pub struct OperationDescriptor {
    pub mnemonic: String,
    pub operands: Vec<OperandKind>,
    pub group: HandlerGroup,
    pub handler: HandlerFn,
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("mnemonic", &self.mnemonic)
            .field("operands", &self.operands)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

/// Maps mnemonics to [`OperationDescriptor`]s. Built once at startup and shared by every
/// simulator that uses it.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    instructions: HashMap<String, OperationDescriptor>,
}

impl Registry {
    /// A registry with no instructions at all
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every instruction in [`super::impls`]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        super::impls::register_all(&mut registry);
        registry
    }

    /// Registers an instruction. Registering a mnemonic twice replaces the first definition,
    /// which is returned (and logged as a warning).
    pub fn register(
        &mut self,
        mnemonic: &str,
        operands: &[OperandKind],
        group: HandlerGroup,
        handler: HandlerFn,
    ) -> Option<OperationDescriptor> {
        let mnemonic = mnemonic.to_ascii_lowercase();
        let descriptor = OperationDescriptor {
            mnemonic: mnemonic.clone(),
            operands: operands.to_vec(),
            group,
            handler,
        };

        let previous = self.instructions.insert(mnemonic, descriptor);
        if let Some(previous) = &previous {
            tracing::warn!(
                mnemonic = %previous.mnemonic,
                old_group = %previous.group,
                new_group = %group,
                "instruction registered twice, the new definition replaces the old one"
            );
        }
        previous
    }

    pub fn lookup(&self, mnemonic: &str) -> Option<&OperationDescriptor> {
        match self.instructions.get(mnemonic) {
            Some(descriptor) => Some(descriptor),
            None => self.instructions.get(mnemonic.to_ascii_lowercase().as_str()),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Registered mnemonics, sorted
    pub fn mnemonics(&self) -> Vec<&str> {
        let mut mnemonics: Vec<&str> = self.instructions.keys().map(String::as_str).collect();
        mnemonics.sort_unstable();
        mnemonics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OperandKind::*;

    fn nop(_: &mut Machine, _: &[Target]) -> Result<(), ExecError> {
        Ok(())
    }

    fn fail(_: &mut Machine, _: &[Target]) -> Result<(), ExecError> {
        Err(ExecError::DivideByZero)
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = Registry::new();
        registry.register("NOP", &[], HandlerGroup::Transfer, nop);
        assert!(registry.lookup("nop").is_some());
        assert!(registry.lookup("NoP").is_some());
        assert!(registry.lookup("other").is_none());
    }

    #[test]
    fn reregistering_overwrites_and_reports_the_old_definition() {
        let mut registry = Registry::new();
        assert!(registry
            .register("op", &[Input], HandlerGroup::Transfer, nop)
            .is_none());

        let previous = registry
            .register("op", &[Output, Input], HandlerGroup::Arithmetic, fail)
            .expect("the first definition should be returned");
        assert_eq!(previous.group, HandlerGroup::Transfer);
        assert_eq!(previous.operands, &[Input]);

        let current = registry.lookup("op").unwrap();
        assert_eq!(current.group, HandlerGroup::Arithmetic);
        assert_eq!(current.operands, &[Output, Input]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn standard_registry_has_the_basics() {
        let registry = Registry::standard();
        for mnemonic in ["add", "addi", "li", "beq", "seq", "push", "pop", "j"] {
            assert!(registry.lookup(mnemonic).is_some(), "{mnemonic} is missing");
        }
        let add = registry.lookup("add").unwrap();
        assert_eq!(add.operands, &[Output, Input, Input]);
    }
}
