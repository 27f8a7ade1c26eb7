//!
//! The standard EzASM instruction set. Every group registers its own instructions in
//! [`register_all`]; data instructions take their destination first:
//!
//! ```text
//! add $t0 $t1 5       # $t0 = $t1 + 5
//! beq $t0 $t1 done    # jump to `done` if $t0 == $t1
//! ```
//!

mod arithmetic;
mod branch;
mod comparison;
mod transfer;

use super::error::ExecError;
use super::registry::Registry;
use super::target::Target;

pub fn register_all(registry: &mut Registry) {
    arithmetic::register(registry);
    comparison::register(registry);
    branch::register(registry);
    transfer::register(registry);
}

/// Splits the targets into exactly `N` operands. The dispatcher already checked the arity, so
/// failing here means a descriptor and its handler disagree.
fn operands<const N: usize>(targets: &[Target]) -> Result<&[Target; N], ExecError> {
    targets.try_into().map_err(|_| {
        ExecError::Internal(format!(
            "handler expected {} operands, but got {}",
            N,
            targets.len()
        ))
    })
}

/// Registers a list of instructions sharing the same shape and group, each implemented by
/// calling `$exec` with a closure.
/// ```ignore
/// instructions! { registry, [Output, Input, Input], Arithmetic, exec_binary;
///     "add" => |a, b| a.wrapping_add(b),
/// }
/// ```
macro_rules! instructions {
    ($registry:ident, [$($kind:ident),*], $group:ident, $exec:path; $($name:literal => $op:expr),* $(,)?) => {{
        let kinds = [$($crate::instruction::OperandKind::$kind),*];
        $(
            $registry.register(
                $name,
                &kinds,
                $crate::instruction::HandlerGroup::$group,
                |machine, targets| $exec(machine, targets, $op),
            );
        )*
    }};
}

pub(crate) use instructions;
