//! Параметры декодера и энкодера.
//!
//! Режим строгости и политика сжатия передаются в каждую операцию явно,
//! глобального изменяемого состояния у кодека нет.

use serde::{Deserialize, Serialize};

use super::header::DEFAULT_VERSION;

/// Глубина вложенности узлов по умолчанию, после которой декодер
/// прекращает разбор.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Минимальный размер полезной нагрузки массива, начиная с которого
/// энкодер пытается сжимать.
pub const DEFAULT_MIN_COMPRESS_BYTES: usize = 128;

/// Уровень zlib по умолчанию.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Режим проверки входных данных.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Любое структурное несоответствие является ошибкой.
    #[default]
    Strict,
    /// Разбор «как получится»: несоответствия, которые можно обойти,
    /// пропускаются.
    Lenient,
}

impl Mode {
    pub fn is_strict(self) -> bool {
        matches!(self, Mode::Strict)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Lenient => "lenient",
        }
    }
}

/// Параметры декодирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub mode: Mode,
    /// Максимальная глубина вложенности записей. Проверяется в обоих режимах.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Strict,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            mode: Mode::Lenient,
            ..Self::default()
        }
    }

    pub fn with_mode(
        mut self,
        mode: Mode,
    ) -> Self {
        self.mode = mode;
        self
    }
}

/// Когда и как энкодер сжимает массивы.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionPolicy {
    pub enabled: bool,
    /// Массивы с полезной нагрузкой меньше порога пишутся как есть.
    pub min_payload_bytes: usize,
    /// Уровень zlib, 0..=9.
    pub level: u32,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            min_payload_bytes: DEFAULT_MIN_COMPRESS_BYTES,
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl CompressionPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Нужно ли сжимать массив с полезной нагрузкой `payload_len` байт.
    pub fn should_compress(
        &self,
        payload_len: usize,
    ) -> bool {
        self.enabled && payload_len >= self.min_payload_bytes
    }
}

/// Параметры кодирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Версия, записываемая в заголовок и футер.
    pub version: u32,
    pub compression: CompressionPolicy,
    /// Дописывать ли футер после завершающего sentinel.
    pub write_footer: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION,
            compression: CompressionPolicy::default(),
            write_footer: true,
        }
    }
}
