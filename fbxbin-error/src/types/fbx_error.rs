use std::{any::Any, io};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка бинарного кодека FBX.
///
/// Любое нарушение структуры файла: `Format` со смещением в байтах, где оно
/// было обнаружено. Вызывающий код различает ошибки только по варианту и
/// сообщению; отдельных вариантов под каждую проверку нет.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FbxError {
    /// Структурное нарушение: магия, sentinel, длины, теги, сжатие,
    /// контрольная сумма, обрыв потока.
    #[error("Format error at offset 0x{offset:X}: {message}")]
    Format { offset: u64, message: String },

    /// Поток не удовлетворяет требованиям кодека (например, не умеет seek).
    /// Возвращается до чтения первого байта.
    #[error("Stream precondition failed: {reason}")]
    Precondition { reason: String },

    /// Ошибка нижележащего ввода-вывода, не связанная с содержимым файла.
    #[error("I/O error{}: {message}", offset_suffix(.offset))]
    Io {
        kind: io::ErrorKind,
        message: String,
        offset: Option<u64>,
    },
}

fn offset_suffix(offset: &Option<u64>) -> String {
    match offset {
        Some(o) => format!(" at offset 0x{o:X}"),
        None => String::new(),
    }
}

impl FbxError {
    /// Создаёт ошибку формата.
    pub fn format(
        offset: u64,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            offset,
            message: message.into(),
        }
    }

    /// Создаёт ошибку предусловия.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::Precondition {
            reason: reason.into(),
        }
    }

    /// Преобразует `io::Error`, возникшую при чтении поля по смещению
    /// `offset`.
    ///
    /// Обрыв потока посреди записи: это нарушение формата, а не сбой
    /// ввода-вывода: запись заявляла больше байт, чем есть в файле.
    pub fn from_io(
        err: io::Error,
        offset: u64,
    ) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::format(offset, "unexpected end of stream"),
            kind => Self::Io {
                kind,
                message: err.to_string(),
                offset: Some(offset),
            },
        }
    }

    /// Смещение, на котором обнаружена ошибка (если известно).
    pub fn offset(&self) -> Option<u64> {
        match self {
            Self::Format { offset, .. } => Some(*offset),
            Self::Io { offset, .. } => *offset,
            Self::Precondition { .. } => None,
        }
    }

    /// Человекочитаемое сообщение без префикса варианта.
    pub fn message(&self) -> &str {
        match self {
            Self::Format { message, .. } | Self::Io { message, .. } => message,
            Self::Precondition { reason } => reason,
        }
    }

    /// Является ли ошибка нарушением формата.
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

impl ErrorExt for FbxError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Format { .. } => StatusCode::InvalidData,
            Self::Precondition { .. } => StatusCode::NotSeekable,
            Self::Io { kind, .. } => match kind {
                io::ErrorKind::NotFound => StatusCode::NotFound,
                io::ErrorKind::PermissionDenied => StatusCode::PermissionDenied,
                _ => StatusCode::Io,
            },
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::Format { .. } => format!("Not a valid binary FBX file ({self})"),
            Self::Precondition { reason } => format!("Unsupported input stream: {reason}"),
            Self::Io { .. } => self.to_string(),
        }
    }
}

impl From<io::Error> for FbxError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            offset: None,
        }
    }
}
