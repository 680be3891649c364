//! Экспорт дерева узлов в человекочитаемые форматы.

pub mod text;

pub use text::{
    document_to_text, render_property, to_text, write_document_text, write_text, TextDump,
};
