//! Property tests for the hex run-length codec

use bcma::rle;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_bytes_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let text = rle::encode_bytes(&data);
        prop_assert_eq!(rle::decode_bytes(&text).unwrap(), data);
    }

    #[test]
    fn prop_hex_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let hex = hex::encode(&data);
        let text = rle::encode_hex(&hex).unwrap();
        prop_assert_eq!(rle::decode_to_hex(&text).unwrap(), hex);
    }

    #[test]
    fn prop_encode_of_decode_is_identity(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        // The codec is a bijection: re-encoding expanded text reproduces it.
        let text = rle::encode_bytes(&data);
        let expanded = rle::decode_to_hex(&text).unwrap();
        prop_assert_eq!(rle::encode_hex(&expanded).unwrap(), text);
    }
}
