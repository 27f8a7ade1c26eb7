use super::{instructions, operands};
use crate::instruction::{ExecError, Registry, Target};
use crate::simulator::{Machine, Word};

/// `out = op(lhs, rhs)`, on the signed interpretation of both inputs
fn exec_binary<F>(machine: &mut Machine, targets: &[Target], op: F) -> Result<(), ExecError>
where
    F: Fn(i64, i64) -> i64,
{
    let [out, lhs, rhs] = operands::<3>(targets)?;
    let value = op(lhs.get(machine)?.as_i64(), rhs.get(machine)?.as_i64());
    out.set(machine, Word::from(value))
}

/// Same as [`exec_binary`], for operations that can fault
fn exec_checked<F>(machine: &mut Machine, targets: &[Target], op: F) -> Result<(), ExecError>
where
    F: Fn(i64, i64) -> Result<i64, ExecError>,
{
    let [out, lhs, rhs] = operands::<3>(targets)?;
    let value = op(lhs.get(machine)?.as_i64(), rhs.get(machine)?.as_i64())?;
    out.set(machine, Word::from(value))
}

/// `out = op(input)`
fn exec_unary<F>(machine: &mut Machine, targets: &[Target], op: F) -> Result<(), ExecError>
where
    F: Fn(i64) -> i64,
{
    let [out, input] = operands::<2>(targets)?;
    let value = op(input.get(machine)?.as_i64());
    out.set(machine, Word::from(value))
}

/// `out = op(out)`
fn exec_in_place<F>(machine: &mut Machine, targets: &[Target], op: F) -> Result<(), ExecError>
where
    F: Fn(i64) -> i64,
{
    let [out] = operands::<1>(targets)?;
    let value = op(out.get(machine)?.as_i64());
    out.set(machine, Word::from(value))
}

fn shift_amount(b: i64) -> u32 {
    (b & 0x3f) as u32
}

pub fn register(registry: &mut Registry) {
    instructions! { registry, [Output, Input, Input], Arithmetic, exec_binary;
        "add" => |a, b| a.wrapping_add(b),
        "addi" => |a, b| a.wrapping_add(b),
        "sub" => |a, b| a.wrapping_sub(b),
        "subi" => |a, b| a.wrapping_sub(b),
        "mul" => |a, b| a.wrapping_mul(b),
        "and" => |a, b| a & b,
        "or" => |a, b| a | b,
        "xor" => |a, b| a ^ b,
        "sll" => |a, b| a.wrapping_shl(shift_amount(b)),
        "srl" => |a, b| ((a as u64) >> shift_amount(b)) as i64,
        "sra" => |a, b| a >> shift_amount(b),
    }

    instructions! { registry, [Output, Input, Input], Arithmetic, exec_checked;
        "div" => |a, b| match b {
            0 => Err(ExecError::DivideByZero),
            b => Ok(a.wrapping_div(b)),
        },
        "rem" => |a, b| match b {
            0 => Err(ExecError::DivideByZero),
            b => Ok(a.wrapping_rem(b)),
        },
    }

    instructions! { registry, [Output, Input], Arithmetic, exec_unary;
        "not" => |a| !a,
    }

    instructions! { registry, [Output], Arithmetic, exec_in_place;
        "inc" => |a| a.wrapping_add(1),
        "dec" => |a| a.wrapping_sub(1),
    }
}

#[cfg(test)]
mod tests {
    use crate::instruction::ExecError;
    use crate::simulator::Simulator;
    use proptest::prelude::*;

    fn run(source: &str) -> Simulator {
        let mut sim = Simulator::default();
        sim.load_source(source).unwrap();
        sim.run().unwrap();
        sim
    }

    fn reg(sim: &Simulator, name: &str) -> i64 {
        sim.snapshot().register(name).unwrap()
    }

    #[test]
    fn test_add_scenario() {
        let sim = run("addi $t0 $zero 5\naddi $t1 $zero 3\nadd $t0 $t0 $t1");
        assert_eq!(reg(&sim, "t0"), 8);
    }

    #[test]
    fn test_overflow_wraps() {
        let sim = run(&format!("li $t0 {}\nadd $t0 $t0 1\nmul $t1 $t0 -1", i64::MAX));
        assert_eq!(reg(&sim, "t0"), i64::MIN);
        assert_eq!(reg(&sim, "t1"), i64::MIN);
    }

    #[test]
    fn test_division() {
        let sim = run("div $t0 -7 2\nrem $t1 -7 2\nli $t2 -9223372036854775808\ndiv $t2 $t2 -1");
        assert_eq!(reg(&sim, "t0"), -3);
        assert_eq!(reg(&sim, "t1"), -1);
        assert_eq!(reg(&sim, "t2"), i64::MIN);
    }

    #[test]
    fn test_divide_by_zero_faults() {
        let mut sim = Simulator::default();
        sim.load_source("li $t0 1\ndiv $t0 $t0 0").unwrap();
        let err = sim.run().unwrap_err();
        assert_eq!(err.exec_error(), Some(&ExecError::DivideByZero));
        assert_eq!(reg(&sim, "t0"), 1);
    }

    #[test]
    fn test_shifts() {
        let sim = run("sll $t0 1 65\nsrl $t1 -1 60\nsra $t2 -16 2\nnot $t3 0");
        assert_eq!(reg(&sim, "t0"), 2);
        assert_eq!(reg(&sim, "t1"), 0xf);
        assert_eq!(reg(&sim, "t2"), -4);
        assert_eq!(reg(&sim, "t3"), -1);
    }

    #[test]
    fn test_in_place() {
        let sim = run("li $t0 41\ninc $t0\ninc $t0\ndec $t0\ninc 0($zero)");
        assert_eq!(reg(&sim, "t0"), 42);
        assert_eq!(sim.memory().get_word(0).unwrap().as_i64(), 1);
    }

    proptest! {
        #[test]
        fn add_and_sub_match_wrapping_arithmetic(a: i64, b: i64) {
            let sim = run(&format!("li $t0 {a}\nli $t1 {b}\nadd $t2 $t0 $t1\nsub $t3 $t0 $t1"));
            prop_assert_eq!(reg(&sim, "t2"), a.wrapping_add(b));
            prop_assert_eq!(reg(&sim, "t3"), a.wrapping_sub(b));
        }
    }
}
