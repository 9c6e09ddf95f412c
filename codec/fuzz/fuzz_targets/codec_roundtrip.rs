#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use num_bigint::{BigInt, BigUint, Sign};
use wirecodec::{
    big_int, big_uint, int16, int32, int48, int8, uint16, uint32, uint48, uint8, BytesCodec,
    Codec, Encoding, Error, NullableCodec, SetCodec, StringCodec, StructCodec, Value,
    VarUIntCodec, VariantCodec, VectorCodec,
};

fn roundtrip(codec: &impl Codec, value: &Value) {
    let encoded = match codec.encode(value) {
        Ok(encoded) => encoded,
        // Out-of-range inputs must fail the same way on the JSON path.
        Err(_) => {
            assert!(codec.to_json(value).is_err());
            return;
        }
    };
    if let Some(size) = codec.fixed_size() {
        assert_eq!(encoded.len(), size);
    }
    let decoded = codec
        .decode(&encoded)
        .expect("Failed to decode a successfully encoded input!");
    assert_eq!(codec.encode(&decoded).unwrap(), encoded);

    let json = codec.to_json(value).expect("JSON rejected a valid input!");
    let from_json = codec.from_json(&json).expect("Failed to parse own JSON!");
    assert_eq!(from_json, decoded);
}

fn roundtrip_uint(width: u8, value: u64) {
    let value = Value::UInt(value);
    match width % 5 {
        0 => roundtrip(&uint8(), &value),
        1 => roundtrip(&uint16(), &value),
        2 => roundtrip(&uint32(), &value),
        3 => roundtrip(&uint48(), &value),
        _ => roundtrip(&VarUIntCodec, &value),
    }
}

fn roundtrip_int(width: u8, value: i64) {
    let value = Value::Int(value);
    match width % 4 {
        0 => roundtrip(&int8(), &value),
        1 => roundtrip(&int16(), &value),
        2 => roundtrip(&int32(), &value),
        _ => roundtrip(&int48(), &value),
    }
}

fn roundtrip_big(width: u8, negative: bool, magnitude: &[u8]) {
    let width = usize::from(width % 40) + 1;
    let magnitude = BigUint::from_bytes_be(magnitude);
    if negative {
        let codec = big_int(width).unwrap();
        roundtrip(&codec, &Value::BigInt(BigInt::from_biguint(Sign::Minus, magnitude)));
    } else {
        let codec = big_uint(width).unwrap();
        roundtrip(&codec, &Value::BigUInt(magnitude));
    }
}

fn roundtrip_bytes(encoding: u8, data: &[u8]) {
    let encoding = match encoding % 3 {
        0 => Encoding::Hex,
        1 => Encoding::Base58,
        _ => Encoding::Base64,
    };
    let value = Value::Bytes(Bytes::copy_from_slice(data));
    roundtrip(&BytesCodec::new(encoding), &value);
    if !data.is_empty() {
        roundtrip(&BytesCodec::fixed(data.len(), encoding).unwrap(), &value);
    }
}

fn roundtrip_set(values: Vec<u16>) {
    let codec = SetCodec::new(uint16());
    let value = Value::Set(values.iter().copied().map(Value::from).collect());
    let unique = values.iter().collect::<std::collections::BTreeSet<_>>();
    match codec.encode(&value) {
        Ok(encoded) => {
            assert_eq!(unique.len(), values.len());
            // Big-endian u16s sort like the numbers themselves.
            let decoded = codec.decode(&encoded).unwrap();
            let expected = Value::Set(unique.into_iter().copied().map(Value::from).collect());
            assert_eq!(decoded, expected);
        }
        Err(Error::DuplicateElement) => assert!(unique.len() < values.len()),
        Err(err) => panic!("unexpected error: {err}"),
    }
}

fn roundtrip_record(id: u8, name: String, scores: Vec<i16>, tag: Option<u32>) {
    let codec = StructCodec::default()
        .field("id", uint8())
        .field("name", StringCodec::default())
        .field("scores", VectorCodec::new(int16()))
        .field("tag", NullableCodec::new(uint32()));
    let value = Value::record([
        ("id", Value::from(id)),
        ("name", Value::from(name)),
        (
            "scores",
            Value::Vector(scores.into_iter().map(Value::from).collect()),
        ),
        ("tag", Value::from(tag)),
    ]);
    roundtrip(&codec, &value);
}

fn roundtrip_variant(discriminant: u8, payload: u8) {
    let codec = VariantCodec::default()
        .member(0, uint8())
        .member(3, StringCodec::default());
    let value = match discriminant % 3 {
        0 => Value::variant(0, payload),
        1 => Value::variant(3, payload.to_string()),
        _ => Value::variant(u32::from(discriminant), payload),
    };
    roundtrip(&codec, &value);
}

#[derive(Arbitrary, Debug)]
enum FuzzInput<'a> {
    UInt { width: u8, value: u64 },
    Int { width: u8, value: i64 },
    Big { width: u8, negative: bool, magnitude: &'a [u8] },
    Bytes { encoding: u8, data: &'a [u8] },
    Text(String),
    Set(Vec<u16>),
    Record { id: u8, name: String, scores: Vec<i16>, tag: Option<u32> },
    Variant { discriminant: u8, payload: u8 },
}

fn fuzz(input: FuzzInput) {
    match input {
        FuzzInput::UInt { width, value } => roundtrip_uint(width, value),
        FuzzInput::Int { width, value } => roundtrip_int(width, value),
        FuzzInput::Big {
            width,
            negative,
            magnitude,
        } => roundtrip_big(width, negative, magnitude),
        FuzzInput::Bytes { encoding, data } => roundtrip_bytes(encoding, data),
        FuzzInput::Text(text) => roundtrip(&StringCodec::default(), &Value::from(text)),
        FuzzInput::Set(values) => roundtrip_set(values),
        FuzzInput::Record {
            id,
            name,
            scores,
            tag,
        } => roundtrip_record(id, name, scores, tag),
        FuzzInput::Variant {
            discriminant,
            payload,
        } => roundtrip_variant(discriminant, payload),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
