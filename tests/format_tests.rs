//! Тесты формата на собранных вручную байтах
//!
//! Каждый тест собирает поток побайтно и проверяет поведение декодера в
//! строгом и мягком режимах.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use fbxbin::{
    engine::fbx::{compress_payload, read_document, read_node, FBX_MAGIC},
    document_to_bytes, document_to_text, from_bytes, to_bytes, DecodeOptions, EncodeOptions,
    FbxError, Mode, Node, Property,
};

const HEADER_LEN: u64 = 27;

fn header(version: u32) -> Vec<u8> {
    let mut buf = FBX_MAGIC.to_vec();
    buf.extend_from_slice(&0x001Au16.to_le_bytes());
    buf.extend_from_slice(&version.to_le_bytes());
    buf
}

/// Запись узла по абсолютному смещению `base` с корректными длинами.
fn record(
    base: u64,
    name: &str,
    num_props: u32,
    props: &[u8],
    children: &[u8],
) -> Vec<u8> {
    let end = base + (13 + name.len() + props.len() + children.len()) as u64;
    let mut buf = Vec::new();
    buf.extend_from_slice(&(end as u32).to_le_bytes());
    buf.extend_from_slice(&num_props.to_le_bytes());
    buf.extend_from_slice(&(props.len() as u32).to_le_bytes());
    buf.push(name.len() as u8);
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(props);
    buf.extend_from_slice(children);
    buf
}

fn sentinel() -> Vec<u8> {
    vec![0u8; 13]
}

fn bool_prop(v: u8) -> Vec<u8> {
    vec![b'C', v]
}

fn assert_format_error(err: FbxError) {
    assert!(err.is_format(), "expected format error, got {err:?}");
}

////////////////////////////////////////////////////////////////////////////////
// Sentinel
////////////////////////////////////////////////////////////////////////////////

/// Тест проверяет, что sentinel с ненулевым именем и свойствами принимается
/// в мягком режиме и отвергается в строгом.
#[test]
fn test_sentinel_discipline() {
    let mut dirty = Vec::new();
    dirty.extend_from_slice(&0u32.to_le_bytes());
    dirty.extend_from_slice(&2u32.to_le_bytes());
    dirty.extend_from_slice(&9u32.to_le_bytes());
    dirty.push(3);
    dirty.extend_from_slice(b"Bad");

    let err = read_node(&mut Cursor::new(dirty.clone()), Mode::Strict).unwrap_err();
    assert_format_error(err);
    assert!(read_node(&mut Cursor::new(dirty), Mode::Lenient)
        .unwrap()
        .is_none());
}

/// Тест проверяет грязный sentinel на уровне документа.
#[test]
fn test_dirty_top_level_sentinel() {
    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "A", 1, &bool_prop(1), &[]));
    let mut tail = sentinel();
    tail[5] = 1; // num_properties
    bytes.extend(tail);

    assert_format_error(from_bytes(&bytes, Mode::Strict).unwrap_err());
    let doc = from_bytes(&bytes, Mode::Lenient).unwrap();
    assert_eq!(doc.root.name(), "A");
}

////////////////////////////////////////////////////////////////////////////////
// Отрицательный остаток
////////////////////////////////////////////////////////////////////////////////

/// Тест проверяет, что `end_offset` раньше конца свойств фатален в обоих
/// режимах.
#[test]
fn test_negative_remainder_is_always_fatal() {
    let mut bytes = header(7400);
    let mut node = record(HEADER_LEN, "Node", 1, &bool_prop(1), &[]);
    let short_end = (HEADER_LEN + 10) as u32;
    node[0..4].copy_from_slice(&short_end.to_le_bytes());
    bytes.extend(node);
    bytes.extend(sentinel());

    for mode in [Mode::Strict, Mode::Lenient] {
        let err = from_bytes(&bytes, mode).unwrap_err();
        assert_format_error(err.clone());
        // свойства кончаются на 27 + 17 + 2
        assert_eq!(err.offset(), Some(HEADER_LEN + 19));
    }
}

////////////////////////////////////////////////////////////////////////////////
// Контрольная сумма
////////////////////////////////////////////////////////////////////////////////

/// Документ с одним узлом "Mesh" и сжатым массивом f64.
fn compressed_document(values: &[f64]) -> (Vec<u8>, u64) {
    let raw: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    let zlib = compress_payload(&raw, 6).unwrap();

    let mut props = vec![b'd'];
    props.extend_from_slice(&(values.len() as u32).to_le_bytes());
    props.extend_from_slice(&1u32.to_le_bytes());
    props.extend_from_slice(&(zlib.len() as u32).to_le_bytes());
    props.extend_from_slice(&zlib);

    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "Mesh", 1, &props, &[]));
    bytes.extend(sentinel());

    // 27 + 17 (заголовок записи) + 13 (тег и заголовок массива) + zlib - 4
    let trailer = HEADER_LEN + 17 + 13 + zlib.len() as u64 - 4;
    (bytes, trailer)
}

#[test]
fn test_checksum_enforcement() {
    let values: Vec<f64> = (0..100).map(|i| f64::from(i) * 0.5).collect();
    let (mut bytes, trailer) = compressed_document(&values);

    assert_eq!(
        from_bytes(&bytes, Mode::Strict).unwrap().root.properties()[0],
        Property::F64Array(values.clone())
    );

    bytes[trailer as usize] ^= 0x5A;
    let err = from_bytes(&bytes, Mode::Strict).unwrap_err();
    assert_format_error(err.clone());
    assert_eq!(err.offset(), Some(trailer));

    let doc = from_bytes(&bytes, Mode::Lenient).unwrap();
    assert_eq!(doc.root.properties(), &[Property::F64Array(values)]);
}

/// Тест проверяет, что повреждённый deflate-поток фатален в обоих режимах.
#[test]
fn test_malformed_deflate_stream() {
    let values: Vec<f64> = (0..100).map(f64::from).collect();
    let (mut bytes, _) = compressed_document(&values);
    // первый байт deflate сразу за 2 байтами заголовка zlib: BTYPE = 11
    let deflate_start = (HEADER_LEN + 17 + 13 + 2) as usize;
    bytes[deflate_start] = 0xFF;

    for mode in [Mode::Strict, Mode::Lenient] {
        assert_format_error(from_bytes(&bytes, mode).unwrap_err());
    }
}

#[test]
fn test_bad_zlib_header_strict_only() {
    let values: Vec<f64> = (0..100).map(f64::from).collect();
    let (mut bytes, _) = compressed_document(&values);
    let cmf = (HEADER_LEN + 17 + 13) as usize;
    bytes[cmf] = 0x79; // CM = 9

    assert_format_error(from_bytes(&bytes, Mode::Strict).unwrap_err());
    assert_eq!(
        from_bytes(&bytes, Mode::Lenient).unwrap().root.properties(),
        &[Property::F64Array(values)]
    );
}

////////////////////////////////////////////////////////////////////////////////
// Заголовок
////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_header_tolerance() {
    let mut bytes = header(7300);
    bytes[..8].copy_from_slice(b"NotKayda");
    bytes.extend(record(HEADER_LEN, "A", 1, &bool_prop(0), &[]));
    bytes.extend(sentinel());

    let err = from_bytes(&bytes, Mode::Strict).unwrap_err();
    assert_eq!(err.offset(), Some(0));

    let doc = from_bytes(&bytes, Mode::Lenient).unwrap();
    assert_eq!(doc.version, 7300);
    assert_eq!(doc.root.name(), "A");
}

#[test]
fn test_truncated_header() {
    for mode in [Mode::Strict, Mode::Lenient] {
        assert_format_error(from_bytes(&header(7400)[..20], mode).unwrap_err());
    }
}

////////////////////////////////////////////////////////////////////////////////
// Корень
////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_root_collapse() {
    let mut single = header(7400);
    single.extend(record(HEADER_LEN, "Only", 1, &bool_prop(1), &[]));
    single.extend(sentinel());
    let doc = from_bytes(&single, Mode::Strict).unwrap();
    assert_eq!(doc.root.name(), "Only");
    assert_eq!(doc.root.properties(), &[Property::Bool(true)]);

    let mut double = header(7400);
    let first = record(HEADER_LEN, "A", 1, &bool_prop(1), &[]);
    let second = record(HEADER_LEN + first.len() as u64, "B", 1, &bool_prop(0), &[]);
    double.extend(first);
    double.extend(second);
    double.extend(sentinel());
    let doc = from_bytes(&double, Mode::Strict).unwrap();
    assert!(doc.root.is_implicit_root());
    assert_eq!(doc.root.children().len(), 2);
}

/// Тест проверяет, что неявный корень с одним безымянным потомком не
/// переживает roundtrip: декодер схлопывает лишний уровень.
#[test]
fn test_single_child_implicit_root_collapses_after_roundtrip() {
    let child = Node::builder("Only").property(1i32).build();
    let root = Node::root(vec![child.clone()]);
    let bytes = to_bytes(&root, &EncodeOptions::default()).unwrap();
    assert_eq!(from_bytes(&bytes, Mode::Strict).unwrap().root, child);
}

////////////////////////////////////////////////////////////////////////////////
// Пустые контейнеры
////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_empty_string_property() {
    let mut props = vec![b'S'];
    props.extend_from_slice(&0u32.to_le_bytes());
    props.extend(bool_prop(1));

    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "N", 2, &props, &[]));
    bytes.extend(sentinel());

    let doc = from_bytes(&bytes, Mode::Strict).unwrap();
    assert_eq!(
        doc.root.properties(),
        &[Property::String(String::new()), Property::Bool(true)]
    );
}

/// Тест проверяет узел без свойств и потомков, за которым сразу идёт
/// sentinel его пустого списка.
#[test]
fn test_empty_node_followed_by_its_sentinel() {
    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "Empty", 0, &[], &sentinel()));
    bytes.extend(sentinel());

    let doc = from_bytes(&bytes, Mode::Strict).unwrap();
    assert_eq!(doc.root, Node::builder("Empty").build());

    let encoded = to_bytes(
        &doc.root,
        &EncodeOptions {
            write_footer: false,
            ..EncodeOptions::default()
        },
    )
    .unwrap();
    assert_eq!(encoded, bytes);
}

/// Тест проверяет, что безымянная запись без свойств (13 байт заголовка и
/// собственный sentinel) читается как узел, а не как конец списка.
#[test]
fn test_unnamed_empty_node_is_not_a_sentinel() {
    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "", 0, &[], &sentinel()));
    bytes.extend(sentinel());
    assert_eq!(u32::from_le_bytes(bytes[27..31].try_into().unwrap()), 53);

    for mode in [Mode::Strict, Mode::Lenient] {
        let doc = from_bytes(&bytes, mode).unwrap();
        assert_eq!(doc.root, Node::builder("").build());
        assert!(!doc.implicit_root, "{mode:?}");
        assert_eq!(doc.top_level().len(), 1);
        assert_eq!(document_to_text(&doc), ":\n");

        let no_footer = EncodeOptions {
            write_footer: false,
            ..EncodeOptions::default()
        };
        assert_eq!(document_to_bytes(&doc, &no_footer).unwrap(), bytes);
    }
}

/// Тест проверяет две безымянные записи подряд на верхнем уровне.
#[test]
fn test_two_unnamed_top_level_nodes() {
    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "", 0, &[], &sentinel()));
    bytes.extend(record(HEADER_LEN + 26, "", 0, &[], &sentinel()));
    bytes.extend(sentinel());

    for mode in [Mode::Strict, Mode::Lenient] {
        let doc = from_bytes(&bytes, mode).unwrap();
        assert!(doc.implicit_root, "{mode:?}");
        assert_eq!(doc.top_level(), &[Node::builder("").build(), Node::builder("").build()]);
        assert_eq!(document_to_text(&doc), ":\n:\n");
    }
}

////////////////////////////////////////////////////////////////////////////////
// Прочее
////////////////////////////////////////////////////////////////////////////////

#[test]
fn test_unknown_tag_in_document() {
    let mut bytes = header(7400);
    bytes.extend(record(HEADER_LEN, "N", 1, &[b'Z', 0], &[]));
    bytes.extend(sentinel());

    for mode in [Mode::Strict, Mode::Lenient] {
        let err = from_bytes(&bytes, mode).unwrap_err();
        assert_eq!(err.offset(), Some(HEADER_LEN + 14));
    }
}

/// Поток, не умеющий сообщать позицию. Считает прочитанные байты.
struct Unseekable {
    inner: Cursor<Vec<u8>>,
    bytes_read: usize,
}

impl Read for Unseekable {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.bytes_read += n;
        Ok(n)
    }
}

impl Seek for Unseekable {
    fn seek(
        &mut self,
        _pos: SeekFrom,
    ) -> io::Result<u64> {
        Err(io::Error::new(io::ErrorKind::Unsupported, "pipe"))
    }
}

/// Тест проверяет, что поток без seek отвергается до чтения первого байта.
#[test]
fn test_non_seekable_stream_precondition() {
    let mut bytes = header(7400);
    bytes.extend(sentinel());
    let mut src = Unseekable {
        inner: Cursor::new(bytes),
        bytes_read: 0,
    };

    let err = read_document(&mut src, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, FbxError::Precondition { .. }));
    assert_eq!(src.bytes_read, 0);
}

#[test]
fn test_trailing_footer_is_ignored() {
    let root = Node::builder("Scene").property("x").build();
    let mut bytes = to_bytes(&root, &EncodeOptions::default()).unwrap();
    bytes.extend_from_slice(b"garbage after footer");
    assert_eq!(from_bytes(&bytes, Mode::Strict).unwrap().root, root);
}
