use cborlinq_core::config::DEFAULT_MAX_DEPTH;
use cborlinq_core::decoder::read_node;
use cborlinq_core::{
    decode, decode_with, CancelFlag, CborLinqError, ConformanceMode, DecodeOptions, Node,
    NodeKind, Scalar,
};
use minicbor::Decoder;

fn decode_one(bytes: &[u8]) -> Node {
    decode(bytes)
        .expect("decode failed")
        .expect("expected a node, got null")
}

fn scalar(bytes: &[u8]) -> Scalar {
    decode_one(bytes)
        .as_scalar()
        .cloned()
        .expect("expected a scalar")
}

/// Nesting depth reported by a format error.
fn format_depth(result: cborlinq_core::Result<Option<Node>>) -> usize {
    match result {
        Err(CborLinqError::Format { depth, .. }) => depth,
        other => panic!("expected a format error, got {other:?}"),
    }
}

fn nested_arrays(levels: usize) -> Vec<u8> {
    let mut bytes = vec![0x81; levels];
    bytes.push(0x80);
    bytes
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn null_root_decodes_to_absent() {
    assert_eq!(decode(&[0xf6]).unwrap(), None);
}

#[test]
fn booleans() {
    assert_eq!(scalar(&[0xf5]), Scalar::Bool(true));
    assert_eq!(scalar(&[0xf4]), Scalar::Bool(false));
}

#[test]
fn unsigned_integers_decode_as_u64() {
    assert_eq!(scalar(&[0x00]), Scalar::U64(0));
    assert_eq!(scalar(&[0x18, 0x64]), Scalar::U64(100));
    assert_eq!(scalar(&[0x19, 0x03, 0xe8]), Scalar::U64(1000));
    assert_eq!(
        scalar(&[0x1b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        Scalar::U64(u64::MAX)
    );
}

#[test]
fn negative_integers_decode_as_i64() {
    assert_eq!(scalar(&[0x20]), Scalar::I64(-1));
    assert_eq!(scalar(&[0x38, 0x63]), Scalar::I64(-100));
    assert_eq!(
        scalar(&[0x3b, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]),
        Scalar::I64(i64::MIN)
    );
}

#[test]
fn negative_integer_beyond_i64_is_rejected() {
    let bytes = [0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_eq!(format_depth(decode(&bytes)), 0);
}

#[test]
fn floats() {
    assert_eq!(scalar(&[0xf9, 0x3c, 0x00]), Scalar::F32(1.0));
    assert_eq!(scalar(&[0xfa, 0x47, 0xc3, 0x50, 0x00]), Scalar::F32(100000.0));
    assert_eq!(
        scalar(&[0xfb, 0x3f, 0xf1, 0x99, 0x99, 0x99, 0x99, 0x99, 0x9a]),
        Scalar::F64(1.1)
    );
}

#[test]
fn text_and_bytes() {
    assert_eq!(scalar(&[0x63, b'a', b'b', b'c']), Scalar::Text("abc".into()));
    assert_eq!(scalar(&[0x60]), Scalar::Text(String::new()));
    assert_eq!(scalar(&[0x42, 0x01, 0x02]), Scalar::Bytes(vec![1, 2]));
}

#[test]
fn chunked_strings_are_concatenated() {
    assert_eq!(
        scalar(&[0x7f, 0x62, b'h', b'e', 0x63, b'l', b'l', b'o', 0xff]),
        Scalar::Text("hello".into())
    );
    assert_eq!(
        scalar(&[0x5f, 0x41, 0x01, 0x42, 0x02, 0x03, 0xff]),
        Scalar::Bytes(vec![1, 2, 3])
    );
}

// ============================================================================
// Definite containers
// ============================================================================

#[test]
fn definite_array() {
    let node = decode_one(&[0x83, 0x01, 0x02, 0x03]);
    let values: Vec<u64> = node
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.unwrap().to_typed().unwrap())
        .collect();
    assert_eq!(values, [1, 2, 3]);
}

#[test]
fn null_element_becomes_absent_slot() {
    let node = decode_one(&[0x82, 0xf6, 0x01]);
    let array = node.as_array().unwrap();
    assert_eq!(array.try_get(0), Some(None));
    assert_eq!(array.get(1).unwrap().kind(), NodeKind::Integer);
}

#[test]
fn definite_map_keeps_wire_order() {
    // {"z": 1, "a": [2, 3]}
    let node = decode_one(&[0xa2, 0x61, b'z', 0x01, 0x61, b'a', 0x82, 0x02, 0x03]);
    let object = node.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["z", "a"]);
    assert_eq!(object.get("a").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn empty_definite_containers() {
    assert!(decode_one(&[0x80]).as_array().unwrap().is_empty());
    assert!(decode_one(&[0xa0]).as_object().unwrap().is_empty());
}

// ============================================================================
// Indefinite containers
// ============================================================================

#[test]
fn indefinite_array() {
    let node = decode_one(&[0x9f, 0x01, 0x02, 0xff]);
    assert_eq!(node.as_array().unwrap().len(), 2);
}

#[test]
fn empty_indefinite_array() {
    assert!(decode_one(&[0x9f, 0xff]).as_array().unwrap().is_empty());
}

#[test]
fn empty_indefinite_map() {
    assert!(decode_one(&[0xbf, 0xff]).as_object().unwrap().is_empty());
}

#[test]
fn nested_indefinite_containers() {
    // [_ [_ ], []]
    let node = decode_one(&[0x9f, 0x9f, 0xff, 0x80, 0xff]);
    let outer = node.as_array().unwrap();
    assert_eq!(outer.len(), 2);
    assert!(outer.get(0).unwrap().as_array().unwrap().is_empty());
    assert!(outer.get(1).unwrap().as_array().unwrap().is_empty());
}

#[test]
fn indefinite_map_with_indefinite_value() {
    // {_ "a": 1, "b": [_ 2, 3]}
    let bytes = [
        0xbf, 0x61, b'a', 0x01, 0x61, b'b', 0x9f, 0x02, 0x03, 0xff, 0xff,
    ];
    let node = decode_one(&bytes);
    let object = node.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(object.get("b").unwrap().as_array().unwrap().len(), 2);
}

#[test]
fn indefinite_and_definite_forms_decode_equal() {
    let definite = decode_one(&[0xa1, 0x61, b'k', 0x82, 0x01, 0xf6]);
    let indefinite = decode_one(&[0xbf, 0x61, b'k', 0x9f, 0x01, 0xf6, 0xff, 0xff]);
    assert_eq!(definite, indefinite);
}

#[test]
fn unterminated_indefinite_array_is_rejected() {
    assert_eq!(format_depth(decode(&[0x9f, 0x01])), 1);
}

// ============================================================================
// Unsupported and malformed input
// ============================================================================

#[test]
fn tag_at_root_reports_depth_zero() {
    // 1(1363896240)
    let bytes = [0xc1, 0x1a, 0x51, 0x4b, 0x67, 0xb0];
    assert_eq!(format_depth(decode(&bytes)), 0);
}

#[test]
fn tag_inside_array_reports_its_depth() {
    assert_eq!(format_depth(decode(&[0x81, 0x81, 0xc1, 0x00])), 2);
}

#[test]
fn undefined_and_simple_values_are_rejected() {
    assert_eq!(format_depth(decode(&[0xf7])), 0);
    assert_eq!(format_depth(decode(&[0xf0])), 0);
}

#[test]
fn stray_break_is_rejected() {
    assert_eq!(format_depth(decode(&[0xff])), 0);
    assert_eq!(format_depth(decode(&[0x81, 0xff])), 1);
}

#[test]
fn non_text_map_key_is_rejected() {
    assert_eq!(format_depth(decode(&[0xa1, 0x01, 0x02])), 1);
    assert_eq!(format_depth(decode(&[0xa1, 0x41, 0x00, 0x02])), 1);
}

#[test]
fn empty_input_is_rejected() {
    assert_eq!(format_depth(decode(&[])), 0);
}

#[test]
fn truncated_input_is_rejected() {
    assert!(matches!(
        decode(&[0x82, 0x01]),
        Err(CborLinqError::Format { .. })
    ));
    assert!(matches!(
        decode(&[0x63, b'a']),
        Err(CborLinqError::Format { .. })
    ));
}

#[test]
fn forged_length_fails_without_allocating() {
    let bytes = [0x9b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert!(matches!(decode(&bytes), Err(CborLinqError::Format { .. })));
    let bytes = [0xbb, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert!(matches!(decode(&bytes), Err(CborLinqError::Format { .. })));
}

// ============================================================================
// Conformance modes
// ============================================================================

/// {"a": 1, "b": 2, "a": 3}
const DUPLICATE_KEYS: [u8; 10] = [0xa3, 0x61, b'a', 0x01, 0x61, b'b', 0x02, 0x61, b'a', 0x03];

#[test]
fn lax_duplicate_key_keeps_last_value_in_first_position() {
    let node = decode_one(&DUPLICATE_KEYS);
    let object = node.as_object().unwrap();
    assert_eq!(object.keys().collect::<Vec<_>>(), ["a", "b"]);
    assert_eq!(object.get("a").unwrap().to_typed::<u8>().unwrap(), 3);
}

#[test]
fn strict_duplicate_key_is_rejected() {
    let result = decode_with(&DUPLICATE_KEYS, &DecodeOptions::strict());
    assert_eq!(format_depth(result), 1);
}

#[test]
fn lax_ignores_trailing_bytes() {
    assert_eq!(decode_one(&[0x01, 0x02]).to_typed::<u8>().unwrap(), 1);
}

#[test]
fn strict_rejects_trailing_bytes() {
    let options = DecodeOptions::default().with_conformance(ConformanceMode::Strict);
    assert_eq!(format_depth(decode_with(&[0x01, 0x02], &options)), 0);
}

#[test]
fn strict_accepts_well_formed_input() {
    let node = decode_with(&[0xa1, 0x61, b'a', 0x01], &DecodeOptions::strict())
        .unwrap()
        .unwrap();
    assert_eq!(node.kind(), NodeKind::Object);
}

// ============================================================================
// Depth limit and cancellation
// ============================================================================

#[test]
fn nesting_within_limit_decodes() {
    let options = DecodeOptions::default().with_max_depth(3);
    let node = decode_with(&nested_arrays(2), &options).unwrap().unwrap();
    assert_eq!(node.kind(), NodeKind::Array);
}

#[test]
fn nesting_beyond_limit_is_rejected() {
    let options = DecodeOptions::default().with_max_depth(2);
    assert_eq!(format_depth(decode_with(&nested_arrays(2), &options)), 2);
}

#[test]
fn zero_depth_allows_only_scalars() {
    let options = DecodeOptions::default().with_max_depth(0);
    assert!(decode_with(&[0x01], &options).is_ok());
    assert_eq!(format_depth(decode_with(&[0x80], &options)), 0);
}

#[test]
fn pathological_nesting_hits_default_limit() {
    assert_eq!(format_depth(decode(&nested_arrays(100_000))), 512);
}

#[test]
fn nesting_at_default_limit_decodes() {
    let node = decode(&nested_arrays(DEFAULT_MAX_DEPTH - 1)).unwrap().unwrap();
    let mut depth = 0;
    let mut current = &node;
    while let Some(inner) = current.as_array().and_then(|a| a.get(0)) {
        current = inner;
        depth += 1;
    }
    assert_eq!(depth, DEFAULT_MAX_DEPTH - 1);
    assert!(current.as_array().unwrap().is_empty());
}

#[test]
fn deep_maps_hit_the_limit_too() {
    let mut bytes = Vec::new();
    for _ in 0..1_000 {
        bytes.extend_from_slice(&[0xa1, 0x61, b'k']);
    }
    bytes.push(0xf6);
    assert_eq!(format_depth(decode(&bytes)), 512);
}

#[test]
fn cancelled_flag_aborts_decoding() {
    let flag = CancelFlag::new();
    let options = DecodeOptions::default().with_cancel(flag.clone());
    flag.cancel();
    assert!(matches!(
        decode_with(&[0x82, 0x01, 0x02], &options),
        Err(CborLinqError::Cancelled)
    ));
}

#[test]
fn unset_flag_does_not_interfere() {
    let options = DecodeOptions::default().with_cancel(CancelFlag::new());
    assert!(decode_with(&[0x82, 0x01, 0x02], &options).unwrap().is_some());
}

// ============================================================================
// Cursor-level reading
// ============================================================================

#[test]
fn read_node_consumes_exactly_one_item() {
    let bytes = [0x82, 0x01, 0x02, 0x63, b'a', b'b', b'c', 0xf6];
    let mut d = Decoder::new(&bytes);
    let options = DecodeOptions::default();

    let first = read_node(&mut d, &options).unwrap().unwrap();
    assert_eq!(first.kind(), NodeKind::Array);
    assert_eq!(d.position(), 3);

    let second = read_node(&mut d, &options).unwrap().unwrap();
    assert_eq!(second.to_typed::<String>().unwrap(), "abc");

    assert_eq!(read_node(&mut d, &options).unwrap(), None);
    assert_eq!(d.position(), bytes.len());
}
