//! Бинарный кодек FBX.
//!
//! ## Формат
//!
//! Файл состоит из 27-байтовой преамбулы, списка записей узлов верхнего
//! уровня, завершающего sentinel (13 нулевых байт) и необязательного футера.
//! Все числа little-endian, кроме Adler-32 в конце сжатых массивов.
//!
//! ```text
//! запись узла:
//!   u32 end_offset      абсолютное смещение конца записи
//!   u32 num_properties
//!   u32 property_list_len
//!   u8  name_len
//!   ... name, свойства, [потомки..., sentinel]
//! ```
//!
//! ## Пример
//!
//! ```no_run
//! use std::fs::File;
//!
//! use fbxbin::engine::fbx::{document_to_bytes, read_document, DecodeOptions, EncodeOptions};
//!
//! let file = File::open("scene.fbx")?;
//! let doc = read_document(std::io::BufReader::new(file), &DecodeOptions::strict())?;
//! let bytes = document_to_bytes(&doc, &EncodeOptions::default())?;
//! std::fs::write("copy.fbx", bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Модули
//!
//! - [`decode`] - разбор потока в дерево [`crate::tree::Node`]
//! - [`encode`] - запись дерева с обратной подстановкой длин
//! - [`compression`] - zlib-массивы и Adler-32
//! - [`header`] - преамбула и футер
//! - [`hooks`] - наблюдатели за ходом декодирования
//! - [`options`] - режим строгости и политика сжатия
//! - [`source`] - поток с отслеживанием позиции
//! - [`tags`] - теги типов свойств

pub mod compression;
pub mod decode;
pub mod encode;
pub mod header;
pub mod hooks;
pub mod options;
pub mod source;
pub mod tags;

pub use compression::{compress_payload, inflate_payload, validate_zlib_header, Adler32Read};
pub use decode::{
    from_bytes, read_document, read_document_with, read_node, read_node_with, read_property,
    FbxDocument,
};
pub use encode::{
    document_to_bytes, to_bytes, write_document, write_node, write_nodes, write_null_record, write_property,
};
pub use header::{read_header, write_footer, write_header, DEFAULT_VERSION, FBX_MAGIC};
pub use hooks::{
    ArrayEvent, CountingHook, DecodeHook, DecodeStats, NodeEvent, NoopHook, TracingHook,
};
pub use options::{CompressionPolicy, DecodeOptions, EncodeOptions, Mode};
pub use source::PositionedReader;
