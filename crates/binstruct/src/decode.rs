use std::any::type_name;

use bytes::Buf;
use tracing::trace;

use crate::config::CodecConfig;
use crate::encode::BLOCK_PREFIX_SIZE;
use crate::error::{CodecError, Result};
use crate::registry::{self, DecoderRegistry};
use crate::Directives;

/// A value that can be rebuilt from its binstruct wire form.
///
/// Implementations read only their own bytes; `len32` blocks are resolved by
/// [`Decoder::decode_value`] before `decode` is called.
pub trait Decode: Sized {
    /// Variable-length collections carry their own count prefix and are
    /// never wrapped in a `len32` block.
    const VARIABLE_LENGTH: bool = false;

    /// Read a value using the given directives.
    fn decode(decoder: &mut Decoder<'_, '_>, directives: Directives) -> Result<Self>;
}

#[derive(Clone, Copy)]
enum RegistrySource<'r> {
    Global,
    Explicit(&'r DecoderRegistry),
}

/// Forward-only input window for one deserialize call.
pub struct Decoder<'de, 'r> {
    input: &'de [u8],
    registry: RegistrySource<'r>,
    max_block_len: usize,
}

impl<'de> Decoder<'de, 'static> {
    /// Decode from `input`, resolving abstract fields through the global registry.
    pub fn new(input: &'de [u8]) -> Self {
        Self {
            input,
            registry: RegistrySource::Global,
            max_block_len: CodecConfig::default().max_block_len,
        }
    }
}

impl<'de, 'r> Decoder<'de, 'r> {
    /// Decode from `input`, resolving abstract fields through `registry`.
    pub fn with_registry(input: &'de [u8], registry: &'r DecoderRegistry) -> Self {
        Self {
            input,
            registry: RegistrySource::Explicit(registry),
            max_block_len: CodecConfig::default().max_block_len,
        }
    }

    /// Apply decode limits from `config`.
    pub fn with_config(mut self, config: &CodecConfig) -> Self {
        self.max_block_len = config.max_block_len;
        self
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'de [u8] {
        self.input
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Whether an `end`-tagged field should stop its record here.
    pub fn at_optional_end(&self, field: &'static str) -> bool {
        if self.input.is_empty() {
            trace!(field, "input exhausted at optional end, stopping record");
            true
        } else {
            false
        }
    }

    fn require(&self, needed: usize) -> Result<()> {
        if self.input.len() < needed {
            return Err(CodecError::OutOfBounds {
                needed,
                available: self.input.len(),
            });
        }
        Ok(())
    }

    /// Consume exactly `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'de [u8]> {
        self.require(len)?;
        let (head, tail) = self.input.split_at(len);
        self.input = tail;
        Ok(head)
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.input.get_u8())
    }

    pub fn get_u16_le(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.input.get_u16_le())
    }

    pub fn get_u32_le(&mut self) -> Result<u32> {
        self.require(4)?;
        Ok(self.input.get_u32_le())
    }

    pub fn get_u64_le(&mut self) -> Result<u64> {
        self.require(8)?;
        Ok(self.input.get_u64_le())
    }

    /// Decode one field or element, resolving its `len32` block if directed.
    ///
    /// A block confines the inner decode to exactly the declared bytes; the
    /// stream resumes after the block whether or not the inner value used
    /// all of them.
    pub fn decode_value<T: Decode>(&mut self, directives: Directives) -> Result<T> {
        if !directives.is_block() || T::VARIABLE_LENGTH {
            return T::decode(self, directives);
        }

        self.require(BLOCK_PREFIX_SIZE)?;
        let size = self.input.get_u32_le() as usize;
        if size > self.max_block_len {
            return Err(CodecError::BlockTooLarge {
                size,
                max: self.max_block_len,
            });
        }

        let block = self.take(size)?;
        let rest = self.input;
        self.input = block;
        let result = T::decode(self, directives.without_block());
        self.input = rest;
        result
    }

    /// Read a collection count prefix as directed by `count0`/`count16`.
    ///
    /// Returns `None` when the count is omitted from the wire.
    pub fn decode_count(&mut self, directives: Directives) -> Result<Option<usize>> {
        if directives.count16() {
            Ok(Some(self.get_u16_le()? as usize))
        } else if directives.count_omitted() {
            Ok(None)
        } else {
            Ok(Some(self.get_u8()? as usize))
        }
    }

    /// Decode an abstract value through the registered decoder for `T`.
    ///
    /// The decoder receives every remaining byte and its returned remainder
    /// becomes the new cursor.
    pub fn decode_abstract<T: ?Sized + 'static>(&mut self) -> Result<Box<T>> {
        let decoder = match self.registry {
            RegistrySource::Global => registry::global().read().lookup::<T>(),
            RegistrySource::Explicit(registry) => registry.lookup::<T>(),
        }
        .ok_or(CodecError::Unregistered(type_name::<T>()))?;

        let input = self.input;
        let (value, rest) = decoder(input)?;
        if rest.len() > input.len() {
            return Err(CodecError::OutOfBounds {
                needed: rest.len(),
                available: input.len(),
            });
        }
        self.input = rest;
        Ok(value)
    }
}

impl std::fmt::Debug for Decoder<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = match self.registry {
            RegistrySource::Global => "global",
            RegistrySource::Explicit(_) => "explicit",
        };
        f.debug_struct("Decoder")
            .field("remaining", &self.input.len())
            .field("registry", &registry)
            .field("max_block_len", &self.max_block_len)
            .finish()
    }
}

fn decode_record<'de, T: Decode>(
    destination: &mut T,
    mut decoder: Decoder<'de, '_>,
) -> Result<&'de [u8]> {
    let total = decoder.len();
    let value = decoder.decode_value::<T>(Directives::NONE)?;
    *destination = value;
    let remaining = decoder.remaining();
    trace!(
        consumed = total - remaining.len(),
        remaining = remaining.len(),
        "deserialized record"
    );
    Ok(remaining)
}

/// Deserialize a record, returning the unused bytes.
///
/// Abstract fields resolve through the global registry. `destination` is only
/// overwritten when the whole record decodes.
pub fn deserialize<'de, T: Decode>(destination: &mut T, input: &'de [u8]) -> Result<&'de [u8]> {
    decode_record(destination, Decoder::new(input))
}

/// Deserialize a record, resolving abstract fields through `registry`.
pub fn deserialize_with<'de, T: Decode>(
    destination: &mut T,
    input: &'de [u8],
    registry: &DecoderRegistry,
) -> Result<&'de [u8]> {
    decode_record(destination, Decoder::with_registry(input, registry))
}

/// Deserialize a record with explicit limits, using the global registry.
pub fn deserialize_with_config<'de, T: Decode>(
    destination: &mut T,
    input: &'de [u8],
    config: &CodecConfig,
) -> Result<&'de [u8]> {
    decode_record(destination, Decoder::new(input).with_config(config))
}

/// Decode a fresh value, returning it together with the unused bytes.
pub fn from_bytes<T: Decode>(input: &[u8]) -> Result<(T, &[u8])> {
    let mut decoder = Decoder::new(input);
    let value = decoder.decode_value(Directives::NONE)?;
    Ok((value, decoder.remaining()))
}

/// Decode a fresh value, resolving abstract fields through `registry`.
pub fn from_bytes_with<'de, T: Decode>(
    input: &'de [u8],
    registry: &DecoderRegistry,
) -> Result<(T, &'de [u8])> {
    let mut decoder = Decoder::with_registry(input, registry);
    let value = decoder.decode_value(Directives::NONE)?;
    Ok((value, decoder.remaining()))
}
