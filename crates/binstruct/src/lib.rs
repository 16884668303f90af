//! Directive-driven positional binary codec for Rust structs.
//!
//! A record is written field by field in declaration order with no tags,
//! versions or checksums; producer and consumer must agree on the record type.
//! Per-field `#[binstruct("...")]` directives adjust framing:
//!
//! | Token     | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `-`       | field is not on the wire                                   |
//! | `count0`  | collection has no count prefix                             |
//! | `count16` | collection count is 2 bytes LE instead of 1                |
//! | `len32`   | value is wrapped in a 4-byte LE byte-length block          |
//! | `end`     | decoding stops cleanly here if the input is exhausted      |
//!
//! Bracketed forms (`[count16]`, `[len32]`, ...) apply to each element of a
//! collection field instead of the field itself.
//!
//! Wire primitives: integers are fixed-width little-endian, booleans one byte,
//! text a 1-byte length plus UTF-8 bytes, timestamps 8-byte milliseconds since
//! 1900-03-01.
//!
//! ```ignore
//! use binstruct::{Decode, Encode};
//!
//! #[derive(Debug, Default, PartialEq, Encode, Decode)]
//! struct Hello {
//!     name: String,
//!     #[binstruct("count16")]
//!     flags: Vec<u8>,
//!     #[binstruct("end")]
//!     build: u32,
//! }
//!
//! let bytes = binstruct::serialize(&hello)?;
//! let (decoded, rest) = binstruct::from_bytes::<Hello>(&bytes)?;
//! ```

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod impls;
pub mod registry;

pub use binstruct_derive::{Decode, Encode};
pub use binstruct_directive::{DirectiveError, Directives, Framing};
pub use config::CodecConfig;
pub use decode::{
    deserialize, deserialize_with, deserialize_with_config, from_bytes, from_bytes_with, Decode,
    Decoder,
};
pub use encode::{serialize, serialize_with_config, Encode, Encoder, BLOCK_PREFIX_SIZE};
pub use error::{CodecError, Result};
pub use registry::{register_decoder, DecodeFn, DecoderRegistry};

/// Make `Box<dyn Trait>` usable as a record field.
///
/// The trait must have [`Encode`] as a supertrait: encoding goes through the
/// concrete value with the field's directives reset. Decoding looks up the decoder registered for `dyn Trait`
/// (see [`DecoderRegistry::register`] and [`register_decoder`]) and fails with
/// [`CodecError::Unregistered`] if there is none.
///
/// ```ignore
/// trait Shape: binstruct::Encode {
///     fn area(&self) -> f64;
/// }
/// binstruct::abstract_type!(Shape);
/// ```
#[macro_export]
macro_rules! abstract_type {
    ($($trait_path:path),+ $(,)?) => {$(
        impl $crate::encode::Encode for ::std::boxed::Box<dyn $trait_path> {
            fn encode(
                &self,
                encoder: &mut $crate::encode::Encoder,
                _directives: $crate::Directives,
            ) -> $crate::Result<()> {
                $crate::encode::Encode::encode(&**self, encoder, $crate::Directives::NONE)
            }
        }

        impl $crate::decode::Decode for ::std::boxed::Box<dyn $trait_path> {
            fn decode(
                decoder: &mut $crate::decode::Decoder<'_, '_>,
                _directives: $crate::Directives,
            ) -> $crate::Result<Self> {
                decoder.decode_abstract::<dyn $trait_path>()
            }
        }
    )+};
}
