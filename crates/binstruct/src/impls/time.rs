use chrono::{DateTime, TimeZone, Utc};

use crate::decode::{Decode, Decoder};
use crate::encode::{Encode, Encoder};
use crate::error::{CodecError, Result};
use crate::Directives;

/// Wire epoch for timestamps, 1900-03-01T00:00:00Z, as Unix milliseconds.
pub const TIMESTAMP_EPOCH_UNIX_MILLIS: i64 = -2_203_891_200_000;

/// Timestamps are unsigned 8-byte millisecond counts from the wire epoch.
pub const TIMESTAMP_SIZE: usize = 8;

impl Encode for DateTime<Utc> {
    fn encode(&self, encoder: &mut Encoder, _directives: Directives) -> Result<()> {
        let millis = self
            .timestamp_millis()
            .checked_sub(TIMESTAMP_EPOCH_UNIX_MILLIS)
            .and_then(|millis| u64::try_from(millis).ok())
            .ok_or(CodecError::Unsupported("timestamp before 1900-03-01"))?;
        encoder.put_u64_le(millis);
        Ok(())
    }
}

impl Decode for DateTime<Utc> {
    fn decode(decoder: &mut Decoder<'_, '_>, _directives: Directives) -> Result<Self> {
        let millis = decoder.get_u64_le()?;
        i64::try_from(millis)
            .ok()
            .and_then(|millis| millis.checked_add(TIMESTAMP_EPOCH_UNIX_MILLIS))
            .and_then(|unix| Utc.timestamp_millis_opt(unix).single())
            .ok_or(CodecError::Unsupported("timestamp out of range"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_bytes, serialize};

    fn instant(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn known_instant_matches_wire_bytes() {
        let bytes = serialize(&instant("2017-05-09T01:31:48Z")).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[0xa0, 0x5f, 0xfc, 0x0c, 0x5d, 0x03, 0x00, 0x00]
        );
    }

    #[test]
    fn epoch_is_zero() {
        let bytes = serialize(&instant("1900-03-01T00:00:00Z")).unwrap();
        assert_eq!(bytes.as_ref(), &[0u8; TIMESTAMP_SIZE]);
    }

    #[test]
    fn sub_millisecond_precision_is_truncated() {
        let bytes = serialize(&instant("2017-05-09T01:31:48.123456Z")).unwrap();
        let (decoded, _) = from_bytes::<DateTime<Utc>>(&bytes).unwrap();
        assert_eq!(decoded, instant("2017-05-09T01:31:48.123Z"));
    }

    #[test]
    fn before_epoch_is_unsupported() {
        assert!(matches!(
            serialize(&instant("1899-12-31T23:59:59Z")),
            Err(CodecError::Unsupported(_))
        ));
    }

    #[test]
    fn out_of_range_wire_value_is_rejected() {
        assert!(matches!(
            from_bytes::<DateTime<Utc>>(&[0xFF; 8]),
            Err(CodecError::Unsupported(_))
        ));
    }
}
