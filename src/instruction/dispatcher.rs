//! Binds a [`Registry`] to one simulator and runs parsed lines against it

use super::error::ExecError;
use super::registry::{HandlerGroup, OperationDescriptor, Registry};
use super::target::Target;
use crate::parser::Line;
use crate::simulator::{Machine, Program};
use hashbrown::HashMap;
use std::sync::Arc;

/// The per-simulator side of a handler group. Created the first time one of the group's
/// instructions is dispatched, and lives as long as the dispatcher that created it.
#[derive(Debug)]
pub struct HandlerInstance {
    group: HandlerGroup,
    invocations: u64,
}

impl HandlerInstance {
    fn bind(group: HandlerGroup) -> Self {
        tracing::debug!(%group, "instantiating instruction handler");
        Self {
            group,
            invocations: 0,
        }
    }

    fn invoke(
        &mut self,
        descriptor: &OperationDescriptor,
        machine: &mut Machine,
        targets: &[Target],
    ) -> Result<(), ExecError> {
        self.invocations += 1;
        (descriptor.handler)(machine, targets)
    }

    pub fn group(&self) -> HandlerGroup {
        self.group
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    handlers: HashMap<HandlerGroup, HandlerInstance>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            handlers: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs one line. Every operand is resolved and checked before the handler is called, so
    /// a line that fails here has no effect on the machine. Branches are just handlers that
    /// write to `$pc`.
    pub fn execute(
        &mut self,
        machine: &mut Machine,
        program: &Program,
        line: &Line,
    ) -> Result<(), ExecError> {
        let descriptor = self
            .registry
            .lookup(&line.mnemonic)
            .ok_or_else(|| ExecError::UnknownInstruction(line.mnemonic.clone()))?;

        let targets = Self::resolve(descriptor, machine, program, line)?;

        tracing::trace!(line = line.number(), mnemonic = %descriptor.mnemonic, ?targets, "executing");

        self.handlers
            .entry(descriptor.group)
            .or_insert_with(|| HandlerInstance::bind(descriptor.group))
            .invoke(descriptor, machine, &targets)
    }

    /// Resolves a line's tokens into targets, checking them against the descriptor's shape
    pub fn resolve(
        descriptor: &OperationDescriptor,
        machine: &Machine,
        program: &Program,
        line: &Line,
    ) -> Result<Vec<Target>, ExecError> {
        if line.tokens.len() != descriptor.operands.len() {
            return Err(ExecError::ArityMismatch {
                mnemonic: descriptor.mnemonic.clone(),
                expected: descriptor.operands.len(),
                found: line.tokens.len(),
            });
        }

        line.tokens
            .iter()
            .zip(&descriptor.operands)
            .enumerate()
            .map(|(position, (token, &kind))| {
                let target = Target::resolve(token, machine, program)?;
                if target.supports(kind) {
                    Ok(target)
                } else {
                    Err(ExecError::KindMismatch {
                        mnemonic: descriptor.mnemonic.clone(),
                        position,
                        expected: kind,
                        operand: token.to_string(),
                    })
                }
            })
            .collect()
    }

    /// The handler instances created so far, in a stable order
    pub fn handlers(&self) -> Vec<&HandlerInstance> {
        let mut handlers: Vec<_> = self.handlers.values().collect();
        handlers.sort_by_key(|h| h.group);
        handlers
    }
}
