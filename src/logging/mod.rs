//! Логирование на базе `tracing`.
//!
//! Кодек пишет события сам (`debug!` на уровне документа, `trace!` на
//! уровне узла); этот модуль только устанавливает подписчик.

pub mod config;
mod filters;
mod formatter;

pub use config::{LogFormat, LoggingConfig};
use fbxbin_error::{FbxbinResult, GenericError, StackError, StatusCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Устанавливает глобальный подписчик.
///
/// Повторный вызов в том же процессе возвращает ошибку.
pub fn init_logging(config: &LoggingConfig) -> FbxbinResult<()> {
    config
        .validate()
        .map_err(|msg| StackError::new(GenericError::new(StatusCode::ConfigError, msg)))?;

    let env_filter = filters::build_filter_from_config(config);
    let layer = formatter::build_formatter_from_config(config);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init()
        .map_err(|e| {
            StackError::new(GenericError::new(
                StatusCode::Internal,
                format!("failed to install log subscriber: {e}"),
            ))
        })?;

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.build_filter_directive(),
        format = ?config.format,
        "Logging initialized"
    );
    Ok(())
}
