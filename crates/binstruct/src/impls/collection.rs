use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::{CodecError, Result};
use crate::Directives;

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        encoder.encode_count(self.len(), directives)?;
        let element = directives.element();
        for item in self {
            encoder.encode_value(item, element)?;
        }
        Ok(())
    }

    fn is_variable_length(&self) -> bool {
        true
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        self.as_slice().encode(encoder, directives)
    }

    fn is_variable_length(&self) -> bool {
        true
    }
}

impl<T: Decode> Decode for Vec<T> {
    const VARIABLE_LENGTH: bool = true;

    fn decode(decoder: &mut Decoder<'_, '_>, directives: Directives) -> Result<Self> {
        let element = directives.element();
        match decoder.decode_count(directives)? {
            Some(count) => {
                let mut items = Vec::with_capacity(count.min(decoder.len()));
                for _ in 0..count {
                    items.push(decoder.decode_value(element)?);
                }
                Ok(items)
            }
            // `count0,[end]`: the rest of the input window is the list.
            None if element.is_optional_end() => {
                let mut items = Vec::new();
                while !decoder.is_empty() {
                    let before = decoder.len();
                    items.push(decoder.decode_value(element)?);
                    if decoder.len() == before {
                        return Err(CodecError::Unsupported(
                            "zero-width element in a rest-of-input collection",
                        ));
                    }
                }
                Ok(items)
            }
            None => Ok(Vec::new()),
        }
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder, directives: Directives) -> Result<()> {
        let element = directives.element();
        for item in self {
            encoder.encode_value(item, element)?;
        }
        Ok(())
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(decoder: &mut Decoder<'_, '_>, directives: Directives) -> Result<Self> {
        let element = directives.element();
        let mut items: Vec<T> = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(decoder.decode_value(element)?);
        }
        // exactly N items were pushed, so the conversion cannot fail
        items
            .try_into()
            .map_err(|_| CodecError::Unsupported("fixed array length mismatch"))
    }
}
