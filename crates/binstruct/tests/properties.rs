use binstruct::{from_bytes, serialize, CodecError, Decode, Encode};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
struct Sample {
    small: u8,
    signed: i16,
    counter: u32,
    offset: i64,
    enabled: bool,
    name: String,
    #[binstruct("count16,[len32]")]
    tags: Vec<String>,
    grid: [u16; 3],
    #[binstruct("len32")]
    origin: Point,
    #[binstruct("[len32]")]
    path: Vec<Point>,
}

fn point() -> impl Strategy<Value = Point> {
    (any::<i32>(), any::<i32>()).prop_map(|(x, y)| Point { x, y })
}

fn sample() -> impl Strategy<Value = Sample> {
    (
        any::<u8>(),
        any::<i16>(),
        any::<u32>(),
        any::<i64>(),
        any::<bool>(),
        "[a-z0-9 ]{0,64}",
        prop::collection::vec("[a-z]{0,12}", 0..300),
        any::<[u16; 3]>(),
        point(),
        prop::collection::vec(point(), 0..20),
    )
        .prop_map(
            |(small, signed, counter, offset, enabled, name, tags, grid, origin, path)| Sample {
                small,
                signed,
                counter,
                offset,
                enabled,
                name,
                tags,
                grid,
                origin,
                path,
            },
        )
}

proptest! {
    #[test]
    fn serialize_then_deserialize_is_identity(value in sample()) {
        let bytes = serialize(&value).unwrap();
        let (decoded, rest) = from_bytes::<Sample>(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn any_truncation_is_out_of_bounds(value in sample(), cut in 1usize..64) {
        let bytes = serialize(&value).unwrap();
        let cut = cut.min(bytes.len());
        let result = from_bytes::<Sample>(&bytes[..bytes.len() - cut]);
        prop_assert!(
            matches!(result, Err(CodecError::OutOfBounds { .. })),
            "unexpected result: {:?}",
            result
        );
    }

    #[test]
    fn unicode_text_round_trips_within_limit(text in "\\PC{0,60}") {
        prop_assume!(text.len() <= 255);
        let bytes = serialize(&text).unwrap();
        prop_assert_eq!(bytes[0] as usize, text.len());
        let (decoded, _) = from_bytes::<String>(&bytes).unwrap();
        prop_assert_eq!(decoded, text);
    }
}
