//! Декодирование бинарного FBX в дерево [`Node`].
//!
//! Разбор рекурсивный: запись узла читается целиком (свойства, затем
//! вложенный список до sentinel), и только после этого узел замораживается и
//! отдаётся родителю. Режим [`Mode`] передаётся в каждый вызов явно.
//!
//! Проверки, которые выполняются только в строгом режиме:
//! - sentinel состоит из 13 нулевых байт;
//! - длина списка свойств совпадает с фактически прочитанной;
//! - вложенный список заканчивается ровно на `end_offset`;
//! - заголовок и Adler-32 сжатых массивов;
//! - длина несжатого массива равна `count * размер элемента`;
//! - имена и строки являются корректным UTF-8.
//!
//! В обоих режимах фатальны: обрыв потока, неизвестный тег свойства,
//! `end_offset` раньше конца свойств, повреждённый deflate-поток и
//! превышение допустимой глубины вложенности.

use std::{
    io::{Cursor, Read, Seek, SeekFrom},
    slice,
};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use fbxbin_error::{FbxError, FbxResult};
use tracing::{debug, warn};

use super::{
    compression::read_compressed_payload,
    header::{read_header, WIDE_RECORD_VERSION},
    hooks::{ArrayEvent, DecodeHook, NodeEvent, NoopHook},
    options::{DecodeOptions, Mode},
    source::{position, read_at, read_bytes, PositionedReader},
    tags::*,
};
use crate::tree::{Node, NodeBuilder, Property};

/// Результат декодирования файла.
#[derive(Debug, Clone, PartialEq)]
pub struct FbxDocument {
    /// Версия из преамбулы.
    pub version: u32,
    /// Корень дерева. Если на верхнем уровне ровно один узел, это он сам;
    /// иначе неявный корень без имени и свойств.
    pub root: Node,
    /// `root` собран декодером из списка верхнего уровня (0 или 2+ узла) и в
    /// файле отдельной записью не присутствует.
    pub implicit_root: bool,
}

impl FbxDocument {
    /// Документ с единственным узлом верхнего уровня.
    pub fn new(
        version: u32,
        root: Node,
    ) -> Self {
        Self {
            version,
            root,
            implicit_root: false,
        }
    }

    /// Документ из списка узлов верхнего уровня с правилом схлопывания корня.
    pub fn from_top_level(
        version: u32,
        nodes: Vec<Node>,
    ) -> Self {
        let implicit_root = nodes.len() != 1;
        Self {
            version,
            root: Node::root(nodes).collapse_root(),
            implicit_root,
        }
    }

    /// Узлы верхнего уровня в том виде, в каком они лежат в файле.
    pub fn top_level(&self) -> &[Node] {
        if self.implicit_root {
            self.root.children()
        } else {
            slice::from_ref(&self.root)
        }
    }
}

/// Декодирует файл целиком: преамбула, узлы верхнего уровня до sentinel.
///
/// Поток должен уметь сообщать позицию, иначе до чтения первого байта
/// возвращается [`FbxError::Precondition`]. Байты после завершающего
/// sentinel (футер) не читаются.
pub fn read_document<R: Read + Seek>(
    r: R,
    options: &DecodeOptions,
) -> FbxResult<FbxDocument> {
    read_document_with(r, options, &mut NoopHook)
}

/// То же, что [`read_document`], с наблюдателем за ходом разбора.
pub fn read_document_with<R, H>(
    r: R,
    options: &DecodeOptions,
    hook: &mut H,
) -> FbxResult<FbxDocument>
where
    R: Read + Seek,
    H: DecodeHook + ?Sized,
{
    let mut src = PositionedReader::new(r)?;
    let version = read_header(&mut src, options.mode)?;
    if version >= WIDE_RECORD_VERSION {
        warn!(
            version,
            "FBX version uses 64-bit record headers; decoding with 32-bit layout"
        );
    }

    let mut top = Vec::new();
    while let Some(node) = read_node_with(&mut src, options, hook, 0)? {
        top.push(node);
    }

    let doc = FbxDocument::from_top_level(version, top);
    debug!(
        version,
        mode = options.mode.as_str(),
        nodes = doc.root.node_count(),
        top_level = doc.top_level().len(),
        bytes = src.position(),
        "FBX document decoded"
    );
    Ok(doc)
}

/// Декодирует документ из буфера в памяти.
pub fn from_bytes(
    bytes: &[u8],
    mode: Mode,
) -> FbxResult<FbxDocument> {
    read_document(Cursor::new(bytes), &DecodeOptions::default().with_mode(mode))
}

/// Читает одну запись узла вместе со всем поддеревом.
///
/// `None` означает sentinel: запись с `end_offset == 0` завершает список.
pub fn read_node<R: Read + Seek>(
    r: &mut R,
    mode: Mode,
) -> FbxResult<Option<Node>> {
    read_node_with(
        r,
        &DecodeOptions::default().with_mode(mode),
        &mut NoopHook,
        0,
    )
}

/// Читает запись узла на глубине `depth` с наблюдателем.
pub fn read_node_with<R, H>(
    r: &mut R,
    options: &DecodeOptions,
    hook: &mut H,
    depth: usize,
) -> FbxResult<Option<Node>>
where
    R: Read + Seek,
    H: DecodeHook + ?Sized,
{
    let mode = options.mode;
    let start = position(r)?;
    let end_offset = u64::from(read_at(r, |r| r.read_u32::<LittleEndian>())?);
    let num_properties = read_at(r, |r| r.read_u32::<LittleEndian>())?;
    let property_list_len = read_at(r, |r| r.read_u32::<LittleEndian>())?;
    let name_len = read_at(r, |r| r.read_u8())?;
    let name = read_string(r, u64::from(name_len), mode, "node name")?;

    if end_offset == 0 {
        if mode.is_strict() && (num_properties != 0 || property_list_len != 0 || name_len != 0) {
            return Err(FbxError::format(
                start,
                "malformed sentinel record: expected 13 zero bytes",
            ));
        }
        return Ok(None);
    }

    if depth >= options.max_depth {
        return Err(FbxError::format(
            start,
            format!("node nesting exceeds {} levels", options.max_depth),
        ));
    }

    let mut builder = NodeBuilder::new(name);
    hook.on_node_start(&NodeEvent {
        name: builder.name(),
        offset: start,
        end_offset,
        depth,
    });

    let props_start = position(r)?;
    for _ in 0..num_properties {
        let property = read_property_with(r, mode, hook)?;
        builder.push_property(property);
    }
    let props_end = position(r)?;

    if mode.is_strict() && props_end - props_start != u64::from(property_list_len) {
        return Err(FbxError::format(
            props_end,
            format!(
                "property list of '{}' is {} bytes, header declares {property_list_len}",
                builder.name(),
                props_end - props_start
            ),
        ));
    }

    if end_offset < props_end {
        return Err(FbxError::format(
            props_end,
            format!(
                "record '{}' ends at 0x{end_offset:X}, before its properties end",
                builder.name()
            ),
        ));
    }

    let remaining = end_offset - props_end;
    if remaining > 0 {
        hook.on_children(
            &NodeEvent {
                name: builder.name(),
                offset: start,
                end_offset,
                depth,
            },
            remaining,
        );
        while let Some(child) = read_node_with(r, options, hook, depth + 1)? {
            builder.push_child(child);
        }

        if mode.is_strict() {
            let children_end = position(r)?;
            if children_end != end_offset {
                return Err(FbxError::format(
                    children_end,
                    format!(
                        "nested list of '{}' ends at 0x{children_end:X}, record declares 0x{end_offset:X}",
                        builder.name()
                    ),
                ));
            }
        }
    }

    let node = builder.build();
    hook.on_node_end(
        &NodeEvent {
            name: node.name(),
            offset: start,
            end_offset,
            depth,
        },
        &node,
    );
    Ok(Some(node))
}

/// Читает одно типизированное свойство.
pub fn read_property<R: Read + Seek>(
    r: &mut R,
    mode: Mode,
) -> FbxResult<Property> {
    read_property_with(r, mode, &mut NoopHook)
}

fn read_property_with<R, H>(
    r: &mut R,
    mode: Mode,
    hook: &mut H,
) -> FbxResult<Property>
where
    R: Read + Seek,
    H: DecodeHook + ?Sized,
{
    let offset = position(r)?;
    let tag = read_at(r, |r| r.read_u8())?;

    let property = match tag {
        TAG_I16 => Property::I16(read_at(r, |r| r.read_i16::<LittleEndian>())?),
        TAG_BOOL => Property::Bool(read_at(r, |r| r.read_u8())? != 0),
        TAG_I32 => Property::I32(read_at(r, |r| r.read_i32::<LittleEndian>())?),
        TAG_F32 => Property::F32(read_at(r, |r| r.read_f32::<LittleEndian>())?),
        TAG_F64 => Property::F64(read_at(r, |r| r.read_f64::<LittleEndian>())?),
        TAG_I64 => Property::I64(read_at(r, |r| r.read_i64::<LittleEndian>())?),
        TAG_STRING => {
            let len = read_at(r, |r| r.read_u32::<LittleEndian>())?;
            Property::String(read_string(r, u64::from(len), mode, "string property")?)
        }
        TAG_RAW => {
            let len = read_at(r, |r| r.read_u32::<LittleEndian>())?;
            Property::Raw(read_bytes(r, u64::from(len))?)
        }
        TAG_F32_ARRAY | TAG_F64_ARRAY | TAG_I64_ARRAY | TAG_I32_ARRAY | TAG_BOOL_ARRAY => {
            read_array(r, tag, mode, hook)?
        }
        other => {
            return Err(FbxError::format(
                offset,
                format!("unknown property type tag 0x{other:02X}"),
            ))
        }
    };
    Ok(property)
}

/// Читает массив после тега: заголовок и полезную нагрузку.
fn read_array<R, H>(
    r: &mut R,
    tag: u8,
    mode: Mode,
    hook: &mut H,
) -> FbxResult<Property>
where
    R: Read + Seek,
    H: DecodeHook + ?Sized,
{
    let offset = position(r)?;
    let count = read_at(r, |r| r.read_u32::<LittleEndian>())?;
    let encoding = read_at(r, |r| r.read_u32::<LittleEndian>())?;
    let byte_len = read_at(r, |r| r.read_u32::<LittleEndian>())?;
    hook.on_array(&ArrayEvent {
        offset,
        tag,
        count,
        encoding,
        byte_len,
    });

    let elem_size = match array_element_size(tag) {
        Some(size) => size as u64,
        None => {
            return Err(FbxError::format(
                offset,
                format!("tag 0x{tag:02X} is not an array type"),
            ))
        }
    };
    let expected = u64::from(count) * elem_size;
    let payload_start = position(r)?;

    let payload = match encoding {
        ARRAY_ENCODING_RAW => {
            if mode.is_strict() && u64::from(byte_len) != expected {
                return Err(FbxError::format(
                    offset,
                    format!(
                        "raw array of {count} elements declares {byte_len} bytes, expected {expected}"
                    ),
                ));
            }
            read_bytes(r, expected)?
        }
        ARRAY_ENCODING_ZLIB => read_compressed_payload(r, byte_len, expected, mode)?,
        other if mode.is_strict() => {
            return Err(FbxError::format(
                offset,
                format!("unknown array encoding {other}"),
            ))
        }
        other => {
            warn!(
                offset,
                encoding = other,
                byte_len,
                "unknown array encoding, skipping payload"
            );
            let skip_to = payload_start + u64::from(byte_len);
            r.seek(SeekFrom::Start(skip_to))
                .map_err(|e| FbxError::from_io(e, skip_to))?;
            Vec::new()
        }
    };

    Ok(decode_elements(tag, &payload))
}

/// Разбирает полезную нагрузку массива на элементы.
fn decode_elements(
    tag: u8,
    payload: &[u8],
) -> Property {
    match tag {
        TAG_F32_ARRAY => Property::F32Array(
            payload
                .chunks_exact(4)
                .map(LittleEndian::read_f32)
                .collect(),
        ),
        TAG_F64_ARRAY => Property::F64Array(
            payload
                .chunks_exact(8)
                .map(LittleEndian::read_f64)
                .collect(),
        ),
        TAG_I64_ARRAY => Property::I64Array(
            payload
                .chunks_exact(8)
                .map(LittleEndian::read_i64)
                .collect(),
        ),
        TAG_I32_ARRAY => Property::I32Array(
            payload
                .chunks_exact(4)
                .map(LittleEndian::read_i32)
                .collect(),
        ),
        _ => Property::BoolArray(payload.iter().map(|b| *b != 0).collect()),
    }
}

/// Читает строку длиной `len` байт.
///
/// Строгий режим требует корректного UTF-8, мягкий заменяет некорректные
/// последовательности на U+FFFD.
fn read_string<R: Read + Seek>(
    r: &mut R,
    len: u64,
    mode: Mode,
    what: &str,
) -> FbxResult<String> {
    let offset = position(r)?;
    let bytes = read_bytes(r, len)?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) if mode.is_strict() => Err(FbxError::format(
            offset,
            format!("invalid UTF-8 in {what}: {}", e.utf8_error()),
        )),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}
