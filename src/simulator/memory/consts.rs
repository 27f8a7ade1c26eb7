/// Bytes of memory a simulator gets unless configured otherwise. `$sp` starts here.
pub const DEFAULT_MEMORY_SIZE: usize = 0x0001_0000;

/// Size of a [`crate::simulator::Word`] in memory, in bytes
pub const WORD_SIZE: usize = 8;
