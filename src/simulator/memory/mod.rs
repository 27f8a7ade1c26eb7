use crate::instruction::ExecError;
use crate::simulator::Word;
use byteorder::{ByteOrder, LittleEndian};

pub mod consts;
pub use consts::*;

/// A flat, byte addressable, little-endian memory starting at address 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_SIZE)
    }
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Zeroes every byte
    pub fn reset(&mut self) {
        self.data.fill(0);
    }

    /// Translates `address..address+n` into a range of `data`, failing if any byte of it
    /// falls outside of the memory
    fn range(&self, address: i64, n: usize) -> Result<std::ops::Range<usize>, ExecError> {
        let out_of_range = ExecError::MemoryOutOfRange { address };
        let start = usize::try_from(address).map_err(|_| out_of_range.clone())?;
        match start.checked_add(n) {
            Some(end) if end <= self.data.len() => Ok(start..end),
            _ => Err(out_of_range),
        }
    }

    /// Reads `n` bytes starting at `address`
    fn get_with<T, F>(&self, address: i64, n: usize, read: F) -> Result<T, ExecError>
    where
        F: FnOnce(&[u8]) -> T,
    {
        let range = self.range(address, n)?;
        Ok(read(&self.data[range]))
    }

    /// Writes `n` bytes starting at `address`. Nothing is written if the access is out of range.
    fn set_with<F>(&mut self, address: i64, n: usize, write: F) -> Result<(), ExecError>
    where
        F: FnOnce(&mut [u8]),
    {
        let range = self.range(address, n)?;
        write(&mut self.data[range]);
        Ok(())
    }

    pub fn get_byte(&self, address: i64) -> Result<u8, ExecError> {
        self.get_with(address, 1, |v| v[0])
    }

    pub fn set_byte(&mut self, address: i64, x: u8) -> Result<(), ExecError> {
        self.set_with(address, 1, |v| v[0] = x)
    }

    pub fn get_word(&self, address: i64) -> Result<Word, ExecError> {
        self.get_with(address, WORD_SIZE, |v| Word::new(LittleEndian::read_u64(v)))
    }

    pub fn set_word(&mut self, address: i64, x: Word) -> Result<(), ExecError> {
        self.set_with(address, WORD_SIZE, |v| LittleEndian::write_u64(v, x.get()))
    }

    /// The raw bytes in `start..start+len`, clamped to the end of the memory
    pub fn bytes(&self, start: usize, len: usize) -> &[u8] {
        let start = start.min(self.data.len());
        let end = start.saturating_add(len).min(self.data.len());
        &self.data[start..end]
    }
}
