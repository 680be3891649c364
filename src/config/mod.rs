//! Конфигурация CLI: значения по умолчанию, необязательный `fbxbin.toml`,
//! переменные окружения `FBXBIN_*`.

pub mod settings;

pub use settings::{Settings, CONFIG_FILE_STEM, ENV_PREFIX};
