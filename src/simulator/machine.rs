use super::memory::Memory;
use super::registers::Registers;

/// The state instructions operate on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub registers: Registers,
    pub memory: Memory,
}

impl Machine {
    /// A machine with `memory_size` bytes of memory and the stack starting at its end
    pub fn new(memory_size: usize) -> Self {
        Self {
            registers: Registers::new(memory_size),
            memory: Memory::new(memory_size),
        }
    }

    pub fn reset(&mut self) {
        self.memory.reset();
        self.registers.reset(self.memory.len());
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new(super::memory::DEFAULT_MEMORY_SIZE)
    }
}
