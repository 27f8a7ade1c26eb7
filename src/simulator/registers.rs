use super::register_names::{PC_INDEX, REGISTER_COUNT, SP_INDEX, ZERO_INDEX};
use super::Word;

/// The register file. `$pc` lives at index 0 and holds the index of the next line to run;
/// `$zero` always reads as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    values: [Word; REGISTER_COUNT],
}

impl Registers {
    /// Zeroed registers, with `$sp` pointing at `stack_top`
    pub fn new(stack_top: usize) -> Self {
        let mut registers = Self {
            values: [Word::ZERO; REGISTER_COUNT],
        };
        registers.reset(stack_top);
        registers
    }

    pub fn reset(&mut self, stack_top: usize) {
        self.values = [Word::ZERO; REGISTER_COUNT];
        self.values[SP_INDEX] = Word::from(stack_top);
    }

    /// # Panics
    /// If `i` isn't a register index. Indexes come from [`super::register_names`], so this
    /// would be a bug.
    pub fn get(&self, i: usize) -> Word {
        self.values[i]
    }

    /// Writes to `$zero` are dropped
    pub fn set(&mut self, i: usize, x: Word) {
        if i != ZERO_INDEX {
            self.values[i] = x;
        }
    }

    pub fn pc(&self) -> i64 {
        self.values[PC_INDEX].as_i64()
    }

    pub fn pc_word(&self) -> Word {
        self.values[PC_INDEX]
    }

    pub fn set_pc(&mut self, x: Word) {
        self.values[PC_INDEX] = x;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Word> + '_ {
        self.values.iter().copied()
    }
}
