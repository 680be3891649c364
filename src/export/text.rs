//! Текстовое представление дерева узлов.
//!
//! ```text
//! Objects: {
//!     Model: 42, "Model::Cube", T {
//!         Vertices: *3 {a: 0,1.5,-2}
//!     }
//! }
//! ```
//!
//! Одна табуляция на уровень вложенности. Блок `{ ... }` открывается только
//! у узлов с потомками. Строка вида `"Cube\x00\x01Model"` выводится как
//! `"Model::Cube"`: сегменты разделителя переставляются в обратном порядке.

use std::{
    fmt::{self, Write as _},
    io::{self, Write},
    slice,
};

use crate::{
    engine::fbx::FbxDocument,
    tree::{Node, Property},
};

/// Разделитель «имя/класс» внутри строковых свойств.
pub const NAME_CLASS_SEPARATOR: &str = "\x00\x01";

/// Список узлов, выводимых с нулевым отступом.
///
/// Реализует [`fmt::Display`], поэтому строку можно получить через
/// `to_string()`, а в поток писать через `write!`.
#[derive(Debug, Clone, Copy)]
pub struct TextDump<'a> {
    nodes: &'a [Node],
}

impl<'a> TextDump<'a> {
    /// Один узел вместе с поддеревом. Узел выводится всегда, даже без
    /// имени и свойств.
    pub fn node(node: &'a Node) -> Self {
        Self {
            nodes: slice::from_ref(node),
        }
    }

    /// Узлы верхнего уровня документа. Корень, собранный декодером,
    /// не выводится.
    pub fn document(doc: &'a FbxDocument) -> Self {
        Self {
            nodes: doc.top_level(),
        }
    }
}

impl fmt::Display for TextDump<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for node in self.nodes {
            write_node(f, node, 0)?;
        }
        Ok(())
    }
}

/// Пишет узел и его поддерево в текстовом виде.
pub fn write_text<W: Write>(
    w: &mut W,
    node: &Node,
) -> io::Result<()> {
    write!(w, "{}", TextDump::node(node))
}

/// Текстовое представление узла в виде строки.
pub fn to_text(node: &Node) -> String {
    TextDump::node(node).to_string()
}

/// Пишет узлы верхнего уровня документа.
pub fn write_document_text<W: Write>(
    w: &mut W,
    doc: &FbxDocument,
) -> io::Result<()> {
    write!(w, "{}", TextDump::document(doc))
}

pub fn document_to_text(doc: &FbxDocument) -> String {
    TextDump::document(doc).to_string()
}

fn write_node(
    f: &mut fmt::Formatter<'_>,
    node: &Node,
    depth: usize,
) -> fmt::Result {
    let indent = "\t".repeat(depth);
    write!(f, "{indent}{}:", node.name())?;

    if !node.properties().is_empty() {
        let rendered: Vec<String> = node.properties().iter().map(render_property).collect();
        write!(f, " {}", rendered.join(", "))?;
    }

    if node.children().is_empty() {
        writeln!(f)
    } else {
        writeln!(f, " {{")?;
        for child in node.children() {
            write_node(f, child, depth + 1)?;
        }
        writeln!(f, "{indent}}}")
    }
}

/// Одно свойство в текстовом виде.
pub fn render_property(property: &Property) -> String {
    match property {
        Property::I16(v) => v.to_string(),
        Property::Bool(v) => render_bool(*v).to_string(),
        Property::I32(v) => v.to_string(),
        Property::F32(v) => v.to_string(),
        Property::F64(v) => v.to_string(),
        Property::I64(v) => v.to_string(),
        Property::String(s) => format!("\"{}\"", reverse_segments(s)),
        Property::Raw(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for b in bytes {
                let _ = write!(hex, "{b:02x}");
            }
            format!("R\"{hex}\"")
        }
        Property::F32Array(v) => render_array(v.iter().map(ToString::to_string), v.len()),
        Property::F64Array(v) => render_array(v.iter().map(ToString::to_string), v.len()),
        Property::I64Array(v) => render_array(v.iter().map(ToString::to_string), v.len()),
        Property::I32Array(v) => render_array(v.iter().map(ToString::to_string), v.len()),
        Property::BoolArray(v) => {
            render_array(v.iter().map(|b| render_bool(*b).to_string()), v.len())
        }
    }
}

fn render_bool(v: bool) -> &'static str {
    if v {
        "T"
    } else {
        "F"
    }
}

fn render_array(
    values: impl Iterator<Item = String>,
    len: usize,
) -> String {
    let joined: Vec<String> = values.collect();
    format!("*{len} {{a: {}}}", joined.join(","))
}

/// `"a\x00\x01b"` -> `"b::a"`. Строки без разделителя не меняются.
fn reverse_segments(s: &str) -> String {
    if !s.contains(NAME_CLASS_SEPARATOR) {
        return s.to_string();
    }
    let mut segments: Vec<&str> = s.split(NAME_CLASS_SEPARATOR).collect();
    segments.reverse();
    segments.join("::")
}
