use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::{CodecError, Result};
use crate::Directives;

// References and optional references are transparent: no null marker is ever
// written, so an absent value cannot be encoded. Any `len32` block has already
// been applied by the caller, hence `without_block`.

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        (**self).encode(encoder, directives)
    }

    fn is_variable_length(&self) -> bool {
        (**self).is_variable_length()
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        match self {
            Some(value) => encoder.encode_value(value, directives.without_block()),
            None => Err(CodecError::Unsupported("absent optional reference")),
        }
    }

    fn is_variable_length(&self) -> bool {
        self.as_ref().is_some_and(Encode::is_variable_length)
    }
}

impl<T: Decode> Decode for Option<T> {
    const VARIABLE_LENGTH: bool = T::VARIABLE_LENGTH;

    fn decode(decoder: &mut Decoder<'_, '_>, directives: Directives) -> Result<Self> {
        decoder
            .decode_value(directives.without_block())
            .map(Some)
    }
}

/// Boxed values are transparent like optional references. `Box<dyn Trait>`
/// is the abstract case and gets its impls from [`crate::abstract_type!`].
impl<T: Encode> Encode for Box<T> {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        encoder.encode_value(&**self, directives.without_block())
    }

    fn is_variable_length(&self) -> bool {
        (**self).is_variable_length()
    }
}

impl<T: Decode> Decode for Box<T> {
    const VARIABLE_LENGTH: bool = T::VARIABLE_LENGTH;

    fn decode(decoder: &mut Decoder<'_, '_>, directives: Directives) -> Result<Self> {
        decoder
            .decode_value(directives.without_block())
            .map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_bytes, serialize};

    #[test]
    fn present_value_is_transparent() {
        assert_eq!(serialize(&Some(0x0102u16)).unwrap().as_ref(), &[0x02, 0x01]);
        assert_eq!(serialize(&&7u8).unwrap().as_ref(), &[0x07]);
    }

    #[test]
    fn absent_value_is_unsupported() {
        assert!(matches!(
            serialize(&None::<u8>),
            Err(CodecError::Unsupported(_))
        ));
    }

    #[test]
    fn decode_allocates_a_fresh_value() {
        let (value, rest) = from_bytes::<Option<String>>(&[0x01, b'z', 0x00]).unwrap();
        assert_eq!(value.as_deref(), Some("z"));
        assert_eq!(rest, &[0x00]);
    }

    #[test]
    fn optional_block_is_applied_once() {
        let d = Directives::parse("len32").unwrap();
        let mut encoder = Encoder::new();
        encoder.encode_value(&Some(5u8), d).unwrap();
        let bytes = encoder.finish();
        assert_eq!(bytes.as_ref(), &[0x01, 0x00, 0x00, 0x00, 0x05]);

        let mut decoder = Decoder::new(&bytes);
        let value: Option<u8> = decoder.decode_value(d).unwrap();
        assert_eq!(value, Some(5));
        assert!(decoder.is_empty());
    }

    #[test]
    fn optional_collections_keep_count_directives() {
        let d = Directives::parse("count16").unwrap();
        let mut encoder = Encoder::new();
        encoder.encode_value(&Some(vec![9u8]), d).unwrap();
        assert_eq!(encoder.finish().as_ref(), &[0x01, 0x00, 0x09]);
    }

    #[test]
    fn boxed_value_keeps_field_directives() {
        let d = Directives::parse("count16").unwrap();
        let mut encoder = Encoder::new();
        encoder.encode_value(&Box::new(vec![7u8]), d).unwrap();
        let bytes = encoder.finish();
        assert_eq!(bytes.as_ref(), &[0x01, 0x00, 0x07]);

        let mut decoder = Decoder::new(&bytes);
        let value: Box<Vec<u8>> = decoder.decode_value(d).unwrap();
        assert_eq!(*value, vec![7]);
        assert!(decoder.is_empty());
    }

    #[test]
    fn boxed_block_is_applied_once() {
        let d = Directives::parse("len32").unwrap();
        let mut encoder = Encoder::new();
        encoder.encode_value(&Box::new(0x0102u16), d).unwrap();
        let bytes = encoder.finish();
        assert_eq!(bytes.as_ref(), &[0x02, 0x00, 0x00, 0x00, 0x02, 0x01]);

        let mut decoder = Decoder::new(&bytes);
        let value: Box<u16> = decoder.decode_value(d).unwrap();
        assert_eq!(*value, 0x0102);
        assert!(decoder.is_empty());
    }
}
