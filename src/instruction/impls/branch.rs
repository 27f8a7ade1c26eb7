use super::{instructions, operands};
use crate::instruction::{ExecError, HandlerGroup, OperandKind::Destination, Registry, Target};
use crate::simulator::register_names::RA_INDEX;
use crate::simulator::Machine;

/// Jumps to `dest` if `cond(lhs, rhs)` holds. The program counter already points at the next
/// line when this runs, so not jumping needs no work.
fn exec_branch<F>(machine: &mut Machine, targets: &[Target], cond: F) -> Result<(), ExecError>
where
    F: Fn(i64, i64) -> bool,
{
    let [lhs, rhs, dest] = operands::<3>(targets)?;
    if cond(lhs.get(machine)?.as_i64(), rhs.get(machine)?.as_i64()) {
        let address = dest.address(machine)?;
        machine.registers.set_pc(address);
    }
    Ok(())
}

fn exec_jump(machine: &mut Machine, targets: &[Target]) -> Result<(), ExecError> {
    let [dest] = operands::<1>(targets)?;
    let address = dest.address(machine)?;
    machine.registers.set_pc(address);
    Ok(())
}

/// Like `j`, but saves the line to return to in `$ra`
fn exec_jump_and_link(machine: &mut Machine, targets: &[Target]) -> Result<(), ExecError> {
    let ret = machine.registers.pc_word();
    exec_jump(machine, targets)?;
    machine.registers.set(RA_INDEX, ret);
    Ok(())
}

pub fn register(registry: &mut Registry) {
    instructions! { registry, [Input, Input, Destination], Branch, exec_branch;
        "beq" => |a, b| a == b,
        "bne" => |a, b| a != b,
        "blt" => |a, b| a < b,
        "bgt" => |a, b| a > b,
        "ble" => |a, b| a <= b,
        "bge" => |a, b| a >= b,
    }

    registry.register("j", &[Destination], HandlerGroup::Branch, exec_jump);
    registry.register("jal", &[Destination], HandlerGroup::Branch, exec_jump_and_link);
}
