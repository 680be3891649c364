//! Кодек бинарного контейнера FBX.
//!
//! - [`tree`] - дерево узлов и типизированные свойства;
//! - [`engine::fbx`] - декодер (строгий и мягкий режимы), энкодер,
//!   zlib-массивы, преамбула и футер;
//! - [`export`] - текстовое представление дерева;
//! - [`config`], [`logging`] - окружение CLI `fbxbin`.

/// Загрузка настроек CLI.
pub mod config;
/// Бинарный кодек.
pub mod engine;
/// Текстовый экспорт.
pub mod export;
/// Установка подписчика `tracing`.
pub mod logging;
/// Модель данных.
pub mod tree;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use config::Settings;
pub use engine::fbx::{
    document_to_bytes, from_bytes, read_document, read_document_with, to_bytes, write_document,
    CompressionPolicy, CountingHook, DecodeHook, DecodeOptions, DecodeStats, EncodeOptions,
    FbxDocument, Mode, NoopHook, TracingHook,
};
pub use export::{document_to_text, to_text, write_document_text, write_text};
pub use fbxbin_error::{FbxError, FbxResult, FbxbinResult, StackError, StatusCode};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use tree::{Node, NodeBuilder, Property};
