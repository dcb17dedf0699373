use super::*;
use bytes::Bytes;
use std::collections::BTreeMap;

fn roundtrip(value: &Value) {
    let encoded = encode(value);
    let decoded = decode(&encoded).unwrap();
    assert_eq!(&decoded, value, "roundtrip failed for {:?}", value);
}

#[test]
fn integers() {
    assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(decode(b"i0e").unwrap(), Value::Integer(0));
    assert_eq!(decode(b"i-7e").unwrap(), Value::Integer(-7));
    assert_eq!(encode(&Value::Integer(-7)), b"i-7e");
}

#[test]
fn rejects_malformed_integers() {
    assert!(decode(b"i042e").is_err());
    assert!(decode(b"i-0e").is_err());
    assert!(decode(b"ie").is_err());
    assert!(decode(b"i-e").is_err());
    assert!(decode(b"i12").is_err());
}

#[test]
fn byte_strings() {
    assert_eq!(decode(b"4:spam").unwrap(), Value::string("spam"));
    assert_eq!(decode(b"0:").unwrap(), Value::string(""));
    assert_eq!(encode(&Value::string("spam")), b"4:spam");
}

#[test]
fn non_utf8_strings_survive() {
    let raw = [b'3', b':', 0xff, 0x00, 0xab];
    let value = decode(&raw).unwrap();
    assert_eq!(value.as_bytes().unwrap().as_ref(), &[0xff, 0x00, 0xab]);
    assert_eq!(value.as_str(), None);
    assert_eq!(encode(&value), raw);
}

#[test]
fn rejects_truncated_length_prefix() {
    assert!(decode(b"4:spa").is_err());
    assert!(decode(b"12").is_err());
    assert!(decode(b"9999999999999999999999:x").is_err());
}

#[test]
fn rejects_unterminated_containers() {
    assert!(decode(b"l4:spam").is_err());
    assert!(decode(b"d4:spami1e").is_err());
}

#[test]
fn rejects_unknown_leading_byte() {
    assert!(matches!(
        decode(b"x42e"),
        Err(BencodeError::UnexpectedByte(b'x'))
    ));
}

#[test]
fn rejects_trailing_data() {
    assert!(matches!(
        decode(b"i1ei2e"),
        Err(BencodeError::TrailingData)
    ));
}

#[test]
fn rejects_non_string_dict_keys() {
    assert!(matches!(
        decode(b"di1ei2ee"),
        Err(BencodeError::NonStringKey)
    ));
}

#[test]
fn decode_prefix_reports_consumed_bytes() {
    let (value, used) = decode_prefix(b"i42e-extra").unwrap();
    assert_eq!(value, Value::Integer(42));
    assert_eq!(used, 4);
}

#[test]
fn roundtrips_nested_structures() {
    // Three levels of dict/list nesting.
    let mut inner = BTreeMap::new();
    inner.insert(Bytes::from_static(b"deep"), Value::Integer(3));

    let mut middle = BTreeMap::new();
    middle.insert(
        Bytes::from_static(b"list"),
        Value::List(vec![
            Value::Dict(inner),
            Value::string("mid"),
            Value::List(vec![Value::Integer(1), Value::Integer(2)]),
        ]),
    );

    let mut outer = BTreeMap::new();
    outer.insert(Bytes::from_static(b"child"), Value::Dict(middle));
    outer.insert(Bytes::from_static(b"n"), Value::Integer(-1));

    roundtrip(&Value::Dict(outer));
    roundtrip(&Value::List(vec![]));
    roundtrip(&Value::dict());
}

#[test]
fn dict_keys_encode_sorted_regardless_of_insertion_order() {
    let mut forward = BTreeMap::new();
    forward.insert(Bytes::from_static(b"alpha"), Value::Integer(1));
    forward.insert(Bytes::from_static(b"beta"), Value::Integer(2));
    forward.insert(Bytes::from_static(b"gamma"), Value::Integer(3));

    let mut reversed = BTreeMap::new();
    reversed.insert(Bytes::from_static(b"gamma"), Value::Integer(3));
    reversed.insert(Bytes::from_static(b"beta"), Value::Integer(2));
    reversed.insert(Bytes::from_static(b"alpha"), Value::Integer(1));

    let expected = b"d5:alphai1e4:betai2e5:gammai3ee";
    assert_eq!(encode(&Value::Dict(forward)), expected);
    assert_eq!(encode(&Value::Dict(reversed)), expected);
}

#[test]
fn deep_nesting_is_bounded() {
    let mut data = Vec::new();
    data.extend(std::iter::repeat(b'l').take(200));
    data.extend(std::iter::repeat(b'e').take(200));
    assert!(matches!(decode(&data), Err(BencodeError::NestingTooDeep)));
}
