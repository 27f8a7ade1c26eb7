use super::{instructions, operands};
use crate::instruction::{ExecError, Registry, Target};
use crate::simulator::{Machine, Word};

/// `out = cond(lhs, rhs) ? 1 : 0`, comparing both inputs as signed longs
fn exec_compare<F>(machine: &mut Machine, targets: &[Target], cond: F) -> Result<(), ExecError>
where
    F: Fn(i64, i64) -> bool,
{
    let [out, lhs, rhs] = operands::<3>(targets)?;
    let res = cond(lhs.get(machine)?.as_i64(), rhs.get(machine)?.as_i64());
    out.set(machine, Word::from(res))
}

pub fn register(registry: &mut Registry) {
    instructions! { registry, [Output, Input, Input], Comparison, exec_compare;
        "seq" => |a, b| a == b,
        "sne" => |a, b| a != b,
        "slt" => |a, b| a < b,
        "sgt" => |a, b| a > b,
        "sle" => |a, b| a <= b,
        "sge" => |a, b| a >= b,
    }
}
