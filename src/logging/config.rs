use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Формат вывода событий.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный вывод для разработки
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON, одна запись на строку
    Json,
}

/// Настройки логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень или полная директива `EnvFilter` (например
    /// `"warn,fbxbin::engine=trace"`).
    pub level: String,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
            with_ansi: true,
            with_target: false,
        }
    }
}

impl LoggingConfig {
    /// Директива фильтра из конфигурации.
    pub fn build_filter_directive(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            "warn".to_string()
        } else {
            level.to_string()
        }
    }

    /// Проверяет, что директива разбирается `EnvFilter`.
    pub fn validate(&self) -> Result<(), String> {
        let directive = self.build_filter_directive();
        EnvFilter::try_new(&directive)
            .map(|_| ())
            .map_err(|e| format!("invalid log directive '{directive}': {e}"))
    }
}
