use super::operands;
use crate::instruction::{ExecError, HandlerGroup, OperandKind, Registry, Target};
use crate::simulator::memory::WORD_SIZE;
use crate::simulator::register_names::SP_INDEX;
use crate::simulator::{Machine, Word};

/// `out = input`. `li` and `mv` only differ in what the assembler lets you write.
fn exec_move(machine: &mut Machine, targets: &[Target]) -> Result<(), ExecError> {
    let [out, input] = operands::<2>(targets)?;
    let value = input.get(machine)?;
    out.set(machine, value)
}

/// Decrements `$sp` by a word and stores the input at the new top of the stack. `$sp` is
/// left untouched if the store faults.
fn exec_push(machine: &mut Machine, targets: &[Target]) -> Result<(), ExecError> {
    let [input] = operands::<1>(targets)?;
    let value = input.get(machine)?;
    let sp = machine.registers.get(SP_INDEX).as_i64().wrapping_sub(WORD_SIZE as i64);
    machine.memory.set_word(sp, value)?;
    machine.registers.set(SP_INDEX, Word::from(sp));
    Ok(())
}

fn exec_pop(machine: &mut Machine, targets: &[Target]) -> Result<(), ExecError> {
    let [out] = operands::<1>(targets)?;
    let sp = machine.registers.get(SP_INDEX).as_i64();
    let value = machine.memory.get_word(sp)?;
    machine
        .registers
        .set(SP_INDEX, Word::from(sp.wrapping_add(WORD_SIZE as i64)));
    // `pop $sp` keeps the popped value
    out.set(machine, value)
}

pub fn register(registry: &mut Registry) {
    use OperandKind::{Input, Output};
    registry.register("li", &[Output, Input], HandlerGroup::Transfer, exec_move);
    registry.register("mv", &[Output, Input], HandlerGroup::Transfer, exec_move);
    registry.register("push", &[Input], HandlerGroup::Transfer, exec_push);
    registry.register("pop", &[Output], HandlerGroup::Transfer, exec_pop);
}
