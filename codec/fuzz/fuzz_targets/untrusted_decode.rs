#![no_main]

use libfuzzer_sys::fuzz_target;
use wirecodec::{
    int24, safe_uint, uint8, BoolCodec, BytesCodec, Codec, DateCodec, Encoding, NullableCodec,
    SetCodec, StringCodec, StructCodec, UFixedCodec, VarUIntCodec, VariantCodec, VectorCodec,
};

fn message() -> impl Codec {
    let entry = StructCodec::default()
        .field("flag", BoolCodec)
        .field("when", DateCodec)
        .field("amount", UFixedCodec::new(6, false).unwrap())
        .field("memo", NullableCodec::new(StringCodec::default().with_range(..=64)));
    VariantCodec::default()
        .member(0, VectorCodec::new(entry).with_range(..=32))
        .member(1, SetCodec::new(int24()).with_range(..=32))
        .member(2, BytesCodec::new(Encoding::Base58).with_range(..=256))
        .member(3, VarUIntCodec)
        .member(4, safe_uint())
        .member(5, VectorCodec::new(uint8()))
}

fuzz_target!(|data: &[u8]| {
    let codec = message();
    // Any input either fails cleanly or decodes to a value that survives both round trips.
    // Varuints may be non-minimal, so the re-encoding can be shorter than the input.
    if let Ok(value) = codec.decode(data) {
        let encoded = codec.encode(&value).expect("Failed to encode a decoded value!");
        assert!(encoded.len() <= data.len());
        assert_eq!(codec.decode(&encoded).unwrap(), value);
        let json = codec.to_json(&value).expect("Failed to convert a decoded value!");
        assert_eq!(codec.from_json(&json).unwrap(), value);
    }
});
