use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::{CodecError, Result};
use crate::Directives;

/// Longest text the 1-byte length prefix can describe.
pub const MAX_TEXT_LEN: usize = u8::MAX as usize;

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder, _directives: Directives) -> Result<()> {
        let len = u8::try_from(self.len()).map_err(|_| CodecError::LengthExceeded {
            what: "text",
            len: self.len(),
            max: MAX_TEXT_LEN,
        })?;
        encoder.put_u8(len);
        encoder.put_slice(self.as_bytes());
        Ok(())
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        self.as_str().encode(encoder, directives)
    }
}

impl Decode for String {
    fn decode(decoder: &mut Decoder<'_, '_>, _directives: Directives) -> Result<Self> {
        let len = decoder.get_u8()? as usize;
        let body = decoder.take(len)?;
        Ok(std::str::from_utf8(body)?.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_bytes, serialize};

    #[test]
    fn text_is_length_prefixed() {
        assert_eq!(serialize("hi").unwrap().as_ref(), &[0x02, b'h', b'i']);
        assert_eq!(serialize("").unwrap().as_ref(), &[0x00]);
    }

    #[test]
    fn text_at_limit_round_trips() {
        let text = "x".repeat(MAX_TEXT_LEN);
        let bytes = serialize(&text).unwrap();
        assert_eq!(bytes.len(), MAX_TEXT_LEN + 1);
        assert_eq!(bytes[0], 0xFF);

        let (decoded, rest) = from_bytes::<String>(&bytes).unwrap();
        assert_eq!(decoded, text);
        assert!(rest.is_empty());
    }

    #[test]
    fn text_over_limit_is_length_exceeded() {
        let err = serialize(&"x".repeat(MAX_TEXT_LEN + 1)).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthExceeded {
                what: "text",
                len: 256,
                max: 255
            }
        ));
    }

    #[test]
    fn missing_length_byte_is_out_of_bounds() {
        assert!(matches!(
            from_bytes::<String>(&[]),
            Err(CodecError::OutOfBounds {
                needed: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn short_body_is_out_of_bounds() {
        let mut input = vec![0xFF];
        input.extend_from_slice(&[b'a'; 254]);
        assert!(matches!(
            from_bytes::<String>(&input),
            Err(CodecError::OutOfBounds {
                needed: 255,
                available: 254
            })
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            from_bytes::<String>(&[0x02, 0xC3, 0x28]),
            Err(CodecError::InvalidText(_))
        ));
    }
}
