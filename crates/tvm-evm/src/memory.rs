//! EVM memory implementation

use crate::stack::Word;

/// EVM memory (byte-addressable, expandable in 32-byte words)
#[derive(Clone, Debug, Default)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Create new empty memory
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Get current memory size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Size memory would have after touching `[offset, offset + size)`.
    ///
    /// Returns `None` when the range overflows the address space.
    pub fn required_size(&self, offset: usize, size: usize) -> Option<usize> {
        if size == 0 {
            return Some(self.data.len());
        }
        let end = offset.checked_add(size)?;
        let aligned = end.checked_next_multiple_of(32)?;
        Some(aligned.max(self.data.len()))
    }

    /// Grow memory to cover `[offset, offset + size)`, rounded up to a word.
    ///
    /// Callers must have charged expansion gas already.
    pub fn expand(&mut self, offset: usize, size: usize) {
        if let Some(new_size) = self.required_size(offset, size) {
            if new_size > self.data.len() {
                self.data.resize(new_size, 0);
            }
        }
    }

    /// Load a 32-byte word from memory
    pub fn load(&self, offset: usize) -> Word {
        let mut result = [0u8; 32];
        self.read_into(offset, &mut result);
        result
    }

    /// Store a 32-byte word to memory
    pub fn store(&mut self, offset: usize, value: &Word) {
        self.expand(offset, 32);
        self.data[offset..offset + 32].copy_from_slice(value);
    }

    /// Store a single byte to memory
    pub fn store8(&mut self, offset: usize, value: u8) {
        self.expand(offset, 1);
        self.data[offset] = value;
    }

    /// Load a byte slice from memory, zero-filling past the end
    pub fn load_slice(&self, offset: usize, size: usize) -> Vec<u8> {
        let mut result = vec![0u8; size];
        self.read_into(offset, &mut result);
        result
    }

    /// Store a byte slice to memory
    pub fn store_slice(&mut self, offset: usize, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.expand(offset, data.len());
        self.data[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Get raw data slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn read_into(&self, offset: usize, out: &mut [u8]) {
        if offset >= self.data.len() {
            return;
        }
        let end = offset.saturating_add(out.len()).min(self.data.len());
        out[..end - offset].copy_from_slice(&self.data[offset..end]);
    }
}
