//! Кодирование дерева [`Node`] в бинарный FBX.
//!
//! `end_offset` и длина списка свойств записи известны только после записи
//! её содержимого, поэтому энкодер пишет заглушки и затем возвращается к ним
//! через `Seek`. Для файлов на диске удобнее собрать документ в
//! `Cursor<Vec<u8>>` (см. [`to_bytes`]) и записать буфер одним вызовом.

use std::{
    io::{Cursor, Seek, SeekFrom, Write},
    slice,
};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use fbxbin_error::{FbxError, FbxResult};
use tracing::{debug, trace};

use super::{
    compression::compress_payload,
    header::{write_footer, write_header},
    options::{CompressionPolicy, EncodeOptions},
    source::position,
    tags::{ARRAY_ENCODING_RAW, ARRAY_ENCODING_ZLIB},
};
use super::decode::FbxDocument;
use crate::tree::{Node, Property};

/// Длина sentinel-записи.
pub const NULL_RECORD_LEN: usize = 13;

/// Кодирует документ в буфер в памяти.
pub fn to_bytes(
    root: &Node,
    options: &EncodeOptions,
) -> FbxResult<Vec<u8>> {
    let mut cur = Cursor::new(Vec::new());
    write_document(&mut cur, root, options)?;
    Ok(cur.into_inner())
}

/// Кодирует декодированный документ, сохраняя его список узлов верхнего
/// уровня (см. [`FbxDocument::top_level`]).
pub fn document_to_bytes(
    doc: &FbxDocument,
    options: &EncodeOptions,
) -> FbxResult<Vec<u8>> {
    let mut cur = Cursor::new(Vec::new());
    write_nodes(&mut cur, doc.top_level(), options)?;
    Ok(cur.into_inner())
}

/// Пишет документ с корнем `root`.
///
/// Неявный корень (без имени и свойств) не пишется сам: его потомки
/// становятся узлами верхнего уровня. Любой другой узел пишется как
/// единственный узел верхнего уровня.
pub fn write_document<W: Write + Seek>(
    w: &mut W,
    root: &Node,
    options: &EncodeOptions,
) -> FbxResult<()> {
    if root.is_implicit_root() {
        write_nodes(w, root.children(), options)
    } else {
        write_nodes(w, slice::from_ref(root), options)
    }
}

/// Пишет полный файл: преамбула, узлы верхнего уровня, sentinel и, если
/// включено, футер.
pub fn write_nodes<W: Write + Seek>(
    w: &mut W,
    nodes: &[Node],
    options: &EncodeOptions,
) -> FbxResult<()> {
    let start = position(w)?;
    write_header(w, options.version)?;
    for node in nodes {
        write_node(w, node, options)?;
    }
    write_null_record(w)?;
    if options.write_footer {
        write_footer(w, options.version)?;
    }
    debug!(
        version = options.version,
        top_level = nodes.len(),
        bytes = position(w)? - start,
        "FBX document encoded"
    );
    Ok(())
}

/// Пишет 13 нулевых байт.
pub fn write_null_record<W: Write>(w: &mut W) -> FbxResult<()> {
    w.write_all(&[0u8; NULL_RECORD_LEN])?;
    Ok(())
}

/// Пишет запись узла вместе с поддеревом.
///
/// Вложенный список (потомки и sentinel) пишется, если у узла есть потомки
/// или нет ни одного свойства. После возврата поток стоит в конце записи.
pub fn write_node<W: Write + Seek>(
    w: &mut W,
    node: &Node,
    options: &EncodeOptions,
) -> FbxResult<()> {
    let start = position(w)?;
    let name = node.name().as_bytes();
    let name_len = u8::try_from(name.len()).map_err(|_| {
        FbxError::format(
            start,
            format!(
                "node name '{}' is {} bytes, limit is 255",
                node.name(),
                name.len()
            ),
        )
    })?;
    let num_properties = to_u32(node.properties().len(), start, "property count")?;

    // end_offset и длина свойств дописываются после содержимого
    w.write_u32::<LittleEndian>(0)?;
    w.write_u32::<LittleEndian>(num_properties)?;
    w.write_u32::<LittleEndian>(0)?;
    w.write_u8(name_len)?;
    w.write_all(name)?;

    let props_start = position(w)?;
    for property in node.properties() {
        write_property(w, property, &options.compression)?;
    }
    let props_end = position(w)?;

    if !node.children().is_empty() || node.properties().is_empty() {
        for child in node.children() {
            write_node(w, child, options)?;
        }
        write_null_record(w)?;
    }
    let end = position(w)?;

    let end_offset = to_u32(end, start, "record end offset")?;
    let property_list_len = to_u32(props_end - props_start, start, "property list length")?;

    w.seek(SeekFrom::Start(start))?;
    w.write_u32::<LittleEndian>(end_offset)?;
    w.seek(SeekFrom::Start(start + 8))?;
    w.write_u32::<LittleEndian>(property_list_len)?;
    w.seek(SeekFrom::Start(end))?;

    trace!(node = node.name(), offset = start, end, "node encoded");
    Ok(())
}

/// Пишет одно свойство: тег и значение.
///
/// Массивы сжимаются, если этого требует `policy`.
pub fn write_property<W: Write + Seek>(
    w: &mut W,
    property: &Property,
    policy: &CompressionPolicy,
) -> FbxResult<()> {
    w.write_u8(property.tag())?;
    match property {
        Property::I16(v) => w.write_i16::<LittleEndian>(*v)?,
        Property::Bool(v) => w.write_u8(u8::from(*v))?,
        Property::I32(v) => w.write_i32::<LittleEndian>(*v)?,
        Property::F32(v) => w.write_f32::<LittleEndian>(*v)?,
        Property::F64(v) => w.write_f64::<LittleEndian>(*v)?,
        Property::I64(v) => w.write_i64::<LittleEndian>(*v)?,
        Property::String(s) => write_blob(w, s.as_bytes(), "string length")?,
        Property::Raw(b) => write_blob(w, b, "raw length")?,
        Property::F32Array(v) => {
            let mut raw = vec![0u8; v.len() * 4];
            LittleEndian::write_f32_into(v, &mut raw);
            write_array(w, v.len(), &raw, policy)?;
        }
        Property::F64Array(v) => {
            let mut raw = vec![0u8; v.len() * 8];
            LittleEndian::write_f64_into(v, &mut raw);
            write_array(w, v.len(), &raw, policy)?;
        }
        Property::I64Array(v) => {
            let mut raw = vec![0u8; v.len() * 8];
            LittleEndian::write_i64_into(v, &mut raw);
            write_array(w, v.len(), &raw, policy)?;
        }
        Property::I32Array(v) => {
            let mut raw = vec![0u8; v.len() * 4];
            LittleEndian::write_i32_into(v, &mut raw);
            write_array(w, v.len(), &raw, policy)?;
        }
        Property::BoolArray(v) => {
            let raw: Vec<u8> = v.iter().map(|b| u8::from(*b)).collect();
            write_array(w, v.len(), &raw, policy)?;
        }
    }
    Ok(())
}

/// u32 длина и байты.
fn write_blob<W: Write + Seek>(
    w: &mut W,
    bytes: &[u8],
    what: &str,
) -> FbxResult<()> {
    let offset = position(w)?;
    w.write_u32::<LittleEndian>(to_u32(bytes.len(), offset, what)?)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Заголовок массива и полезная нагрузка, сжатая или как есть.
fn write_array<W: Write + Seek>(
    w: &mut W,
    count: usize,
    raw: &[u8],
    policy: &CompressionPolicy,
) -> FbxResult<()> {
    let offset = position(w)?;
    let count = to_u32(count, offset, "array element count")?;

    let (encoding, payload) = if policy.should_compress(raw.len()) {
        (ARRAY_ENCODING_ZLIB, compress_payload(raw, policy.level)?)
    } else {
        (ARRAY_ENCODING_RAW, raw.to_vec())
    };
    let byte_len = to_u32(payload.len(), offset, "array byte length")?;

    w.write_u32::<LittleEndian>(count)?;
    w.write_u32::<LittleEndian>(encoding)?;
    w.write_u32::<LittleEndian>(byte_len)?;
    w.write_all(&payload)?;
    Ok(())
}

/// Проверяет, что значение помещается в поле u32.
fn to_u32<T>(
    value: T,
    offset: u64,
    what: &str,
) -> FbxResult<u32>
where
    T: TryInto<u32> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        FbxError::format(
            offset,
            format!("{what} {value} does not fit in 32 bits"),
        )
    })
}
