#![no_main]

use arbitrary::{Result, Unstructured};
use fbxbin::{
    from_bytes, to_bytes, CompressionPolicy, EncodeOptions, Mode, Node, NodeBuilder, Property,
};
use libfuzzer_sys::fuzz_target;

fn arb_array<'a, T: arbitrary::Arbitrary<'a>>(u: &mut Unstructured<'a>) -> Result<Vec<T>> {
    let len = u.int_in_range::<u16>(0..=512)? as usize;
    (0..len).map(|_| u.arbitrary()).collect()
}

/// Вещественные без NaN: иначе сравнение деревьев ложно.
fn finite_f64(u: &mut Unstructured) -> Result<f64> {
    let v: f64 = u.arbitrary()?;
    Ok(if v.is_nan() { 0.0 } else { v })
}

fn finite_f32(u: &mut Unstructured) -> Result<f32> {
    let v: f32 = u.arbitrary()?;
    Ok(if v.is_nan() { 0.0 } else { v })
}

fn arb_property(u: &mut Unstructured) -> Result<Property> {
    Ok(match u.int_in_range::<u8>(0..=12)? {
        0 => Property::I16(u.arbitrary()?),
        1 => Property::Bool(u.arbitrary()?),
        2 => Property::I32(u.arbitrary()?),
        3 => Property::F32(finite_f32(u)?),
        4 => Property::F64(finite_f64(u)?),
        5 => Property::I64(u.arbitrary()?),
        6 => Property::String(u.arbitrary()?),
        7 => Property::Raw(u.arbitrary()?),
        8 => {
            let len = u.int_in_range::<u16>(0..=512)?;
            Property::F32Array((0..len).map(|_| finite_f32(u)).collect::<Result<_>>()?)
        }
        9 => {
            let len = u.int_in_range::<u16>(0..=512)?;
            Property::F64Array((0..len).map(|_| finite_f64(u)).collect::<Result<_>>()?)
        }
        10 => Property::I64Array(arb_array(u)?),
        11 => Property::I32Array(arb_array(u)?),
        _ => Property::BoolArray(arb_array(u)?),
    })
}

fn arb_name(u: &mut Unstructured) -> Result<String> {
    let len = u.int_in_range::<u8>(1..=16)?;
    (0..len)
        .map(|_| Ok(char::from(u.int_in_range(b'A'..=b'z')?)))
        .collect()
}

fn arb_node(
    u: &mut Unstructured,
    depth: u32,
) -> Result<Node> {
    let mut builder = NodeBuilder::new(arb_name(u)?);
    for _ in 0..u.int_in_range::<u8>(0..=4)? {
        builder.push_property(arb_property(u)?);
    }
    if depth > 0 {
        for _ in 0..u.int_in_range::<u8>(0..=4)? {
            builder.push_child(arb_node(u, depth - 1)?);
        }
    }
    Ok(builder.build())
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(root) = arb_node(&mut u, 4) else {
        return;
    };
    let policy = CompressionPolicy {
        enabled: u.arbitrary().unwrap_or(true),
        min_payload_bytes: u.int_in_range(0..=256).unwrap_or(128),
        level: u.int_in_range(0..=9).unwrap_or(6),
    };
    let opts = EncodeOptions {
        compression: policy,
        ..EncodeOptions::default()
    };

    let bytes = to_bytes(&root, &opts).expect("named tree must encode");
    for mode in [Mode::Strict, Mode::Lenient] {
        let doc = from_bytes(&bytes, mode).expect("encoded tree must decode");
        assert_eq!(doc.root, root);
    }
});
