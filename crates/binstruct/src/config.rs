/// Default starting capacity of the encode buffer.
pub const DEFAULT_INITIAL_CAPACITY: usize = 256;

/// Tunables for a serialize or deserialize call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Starting capacity of the encode buffer. Default: 256 bytes.
    pub initial_capacity: usize,
    /// Largest `len32` block accepted on decode. Default: `u32::MAX`.
    pub max_block_len: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_block_len: u32::MAX as usize,
        }
    }
}
