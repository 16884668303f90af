use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::config::{CodecConfig, DEFAULT_INITIAL_CAPACITY};
use crate::error::{CodecError, Result};
use crate::Directives;

/// Size of the byte-count prefix written before a `len32` block.
pub const BLOCK_PREFIX_SIZE: usize = 4;

/// A value with a binstruct wire form.
///
/// Implementations write only their own bytes; length blocks are applied by
/// [`Encoder::encode_value`] before `encode` is called. The trait is object
/// safe so that abstract field types (`Box<dyn Trait>`) can encode through
/// their concrete value.
pub trait Encode {
    /// Write this value using the given directives.
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()>;

    /// Variable-length collections carry their own count prefix and are
    /// never wrapped in a `len32` block.
    fn is_variable_length(&self) -> bool {
        false
    }
}

/// Append-only output buffer for one serialize call.
#[derive(Debug)]
pub struct Encoder {
    buf: BytesMut,
}

impl Encoder {
    /// Create an encoder with the default initial capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    /// Create an encoder with an explicit initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Encode one field or element, applying its `len32` block if directed.
    pub fn encode_value<T: Encode + ?Sized>(
        &mut self,
        value: &T,
        directives: Directives,
    ) -> Result<()> {
        if !directives.is_block() || value.is_variable_length() {
            return value.encode(self, directives);
        }

        let offset = self.buf.len();
        self.buf.put_u32_le(0);
        value.encode(self, directives.without_block())?;

        let written = self.buf.len() - offset - BLOCK_PREFIX_SIZE;
        let len = u32::try_from(written).map_err(|_| CodecError::LengthExceeded {
            what: "length-prefixed block",
            len: written,
            max: u32::MAX as usize,
        })?;
        self.buf[offset..offset + BLOCK_PREFIX_SIZE].copy_from_slice(&len.to_le_bytes());
        Ok(())
    }

    /// Write a collection count prefix as directed by `count0`/`count16`.
    pub fn encode_count(&mut self, len: usize, directives: Directives) -> Result<()> {
        if directives.count16() {
            let count = u16::try_from(len).map_err(|_| CodecError::LengthExceeded {
                what: "collection",
                len,
                max: u16::MAX as usize,
            })?;
            self.buf.put_u16_le(count);
        } else if !directives.count_omitted() {
            let count = u8::try_from(len).map_err(|_| CodecError::LengthExceeded {
                what: "collection",
                len,
                max: u8::MAX as usize,
            })?;
            self.buf.put_u8(count);
        }
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn put_u16_le(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn put_u32_le(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn put_u64_le(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the encoder and return the encoded bytes.
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a record into the binstruct format.
pub fn serialize<T: Encode + ?Sized>(value: &T) -> Result<Bytes> {
    serialize_with_config(value, &CodecConfig::default())
}

/// Serialize a record with explicit configuration.
///
/// On error the partially written buffer is dropped, never returned.
pub fn serialize_with_config<T: Encode + ?Sized>(value: &T, config: &CodecConfig) -> Result<Bytes> {
    let mut encoder = Encoder::with_capacity(config.initial_capacity);
    encoder.encode_value(value, Directives::NONE)?;
    let bytes = encoder.finish();
    trace!(len = bytes.len(), "serialized record");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(s: &str) -> Directives {
        Directives::parse(s).unwrap()
    }

    #[test]
    fn block_prefix_counts_only_the_wrapped_value() {
        let mut encoder = Encoder::new();
        encoder.put_u8(0xEE);
        encoder.encode_value(&0x0102u16, directives("len32")).unwrap();

        assert_eq!(
            encoder.finish().as_ref(),
            &[0xEE, 0x02, 0x00, 0x00, 0x00, 0x02, 0x01]
        );
    }

    #[test]
    fn nested_blocks_are_patched_independently() {
        let mut encoder = Encoder::new();
        encoder.encode_value(&[7u8, 8], directives("len32,[len32]")).unwrap();

        assert_eq!(
            encoder.finish().as_ref(),
            &[
                0x0A, 0x00, 0x00, 0x00, // outer block: two inner blocks of 5 bytes
                0x01, 0x00, 0x00, 0x00, 0x07, //
                0x01, 0x00, 0x00, 0x00, 0x08,
            ]
        );
    }

    #[test]
    fn variable_length_collections_ignore_own_block_bit() {
        let mut encoder = Encoder::new();
        encoder.encode_value(&vec![1u8, 2], directives("len32")).unwrap();
        assert_eq!(encoder.finish().as_ref(), &[0x02, 0x01, 0x02]);
    }

    #[test]
    fn count_prefix_widths() {
        let mut encoder = Encoder::new();
        encoder.encode_count(3, Directives::NONE).unwrap();
        encoder.encode_count(0x0102, directives("count16")).unwrap();
        encoder.encode_count(9, directives("count0")).unwrap();
        assert_eq!(encoder.finish().as_ref(), &[0x03, 0x02, 0x01]);
    }

    #[test]
    fn count16_takes_precedence_over_count0() {
        let mut encoder = Encoder::new();
        encoder.encode_count(1, directives("count0,count16")).unwrap();
        assert_eq!(encoder.finish().as_ref(), &[0x01, 0x00]);
    }

    #[test]
    fn count_overflow_is_length_exceeded() {
        let mut encoder = Encoder::new();
        let err = encoder.encode_count(256, Directives::NONE).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthExceeded { len: 256, max: 255, .. }
        ));

        let err = encoder
            .encode_count(65_536, directives("count16"))
            .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthExceeded { len: 65_536, max: 65_535, .. }
        ));
    }

    #[test]
    fn serialize_does_not_return_partial_output() {
        let values = vec![0u8; 256];
        assert!(serialize(&values).is_err());
    }

    #[test]
    fn serialize_with_config_uses_capacity() {
        let config = CodecConfig {
            initial_capacity: 0,
            ..CodecConfig::default()
        };
        let bytes = serialize_with_config(&0xAABBCCDDu32, &config).unwrap();
        assert_eq!(bytes.as_ref(), &[0xDD, 0xCC, 0xBB, 0xAA]);
    }
}
