use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::Result;
use crate::Directives;

macro_rules! fixed_width {
    ($($ty:ty => $put:ident, $get:ident, $wire:ty;)*) => {$(
        impl Encode for $ty {
            fn encode(&self, encoder: &mut Encoder, _directives: Directives) -> Result<()> {
                encoder.$put(*self as $wire);
                Ok(())
            }
        }

        impl Decode for $ty {
            fn decode(decoder: &mut Decoder<'_, '_>, _directives: Directives) -> Result<Self> {
                Ok(decoder.$get()? as $ty)
            }
        }
    )*};
}

fixed_width! {
    u8 => put_u8, get_u8, u8;
    i8 => put_u8, get_u8, u8;
    u16 => put_u16_le, get_u16_le, u16;
    i16 => put_u16_le, get_u16_le, u16;
    u32 => put_u32_le, get_u32_le, u32;
    i32 => put_u32_le, get_u32_le, u32;
    u64 => put_u64_le, get_u64_le, u64;
    i64 => put_u64_le, get_u64_le, u64;
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder, _directives: Directives) -> Result<()> {
        encoder.put_u8(u8::from(*self));
        Ok(())
    }
}

impl Decode for bool {
    fn decode(decoder: &mut Decoder<'_, '_>, _directives: Directives) -> Result<Self> {
        Ok(decoder.get_u8()? != 0)
    }
}
