use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use fbxbin_error::{ensure, FbxbinResult, GenericError, ResultExt, StackError, StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    engine::fbx::{
        options::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DEPTH, DEFAULT_MIN_COMPRESS_BYTES},
        CompressionPolicy, DecodeOptions, EncodeOptions, Mode,
    },
    logging::LoggingConfig,
};

/// Префикс переменных окружения: `FBXBIN_MODE`, `FBXBIN_COMPRESSION__LEVEL`.
pub const ENV_PREFIX: &str = "FBXBIN";
/// Имя файла конфигурации без расширения, ищется в текущем каталоге.
pub const CONFIG_FILE_STEM: &str = "fbxbin";

/// Настройки приложения.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub mode: Mode,
    pub max_depth: usize,
    pub compression: CompressionPolicy,
    pub write_footer: bool,
    pub log: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: Mode::Strict,
            max_depth: DEFAULT_MAX_DEPTH,
            compression: CompressionPolicy::default(),
            write_footer: true,
            log: LoggingConfig::default(),
        }
    }
}

impl Settings {
    /// Загружает настройки.
    ///
    /// `path` задаёт обязательный файл; без него читается `fbxbin.toml`
    /// (или другой поддерживаемый формат), если он есть. Переменные
    /// окружения перекрывают файл.
    pub fn load(path: Option<&Path>) -> FbxbinResult<Self> {
        let settings: Settings = Self::build(path)
            .and_then(Config::try_deserialize)
            .map_err(config_error)
            .context("failed to load configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    fn build(path: Option<&Path>) -> Result<Config, ConfigError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(CONFIG_FILE_STEM).required(false),
        };

        Config::builder()
            // Значения по умолчанию
            .set_default("mode", Mode::Strict.as_str())?
            .set_default("max_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default("compression.enabled", true)?
            .set_default("compression.min_payload_bytes", DEFAULT_MIN_COMPRESS_BYTES as u64)?
            .set_default("compression.level", u64::from(DEFAULT_COMPRESSION_LEVEL))?
            .set_default("write_footer", true)?
            .set_default("log.level", "warn")?
            .set_default("log.format", "compact")?
            .set_default("log.with_ansi", true)?
            .set_default("log.with_target", false)?
            .add_source(file)
            // FBXBIN_MODE=lenient, FBXBIN_COMPRESSION__LEVEL=9
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }

    /// Проверяет диапазоны значений.
    pub fn validate(&self) -> FbxbinResult<()> {
        ensure!(
            self.compression.level <= 9,
            StatusCode::ConfigError,
            "compression level {} is out of range 0..=9",
            self.compression.level
        );
        ensure!(
            self.max_depth > 0,
            StatusCode::ConfigError,
            "max_depth must be positive"
        );
        self.log
            .validate()
            .map_err(|msg| StackError::new(GenericError::new(StatusCode::ConfigError, msg)))?;
        Ok(())
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            mode: self.mode,
            max_depth: self.max_depth,
        }
    }

    /// Параметры записи файла версии `version`.
    pub fn encode_options(
        &self,
        version: u32,
    ) -> EncodeOptions {
        EncodeOptions {
            version,
            compression: self.compression,
            write_footer: self.write_footer,
        }
    }
}

fn config_error(err: ConfigError) -> StackError {
    StackError::new(GenericError::new(StatusCode::ConfigError, err.to_string()))
}
