//! Обёртка потока, отслеживающая абсолютную позицию.
//!
//! Декодер сверяет позицию после почти каждого поля (границы свойств,
//! `end_offset` записи, смещения ошибок). Обёртка хранит позицию сама, и
//! `stream_position()` не превращается в системный вызов на каждое поле.

use std::io::{self, Read, Seek, SeekFrom};

use fbxbin_error::{FbxError, FbxResult};

/// Reader с отслеживанием позиции.
///
/// Позиция считывается у нижележащего потока один раз при создании. Если
/// поток не умеет сообщать позицию (pipe, сокет), создание завершается
/// ошибкой предусловия до чтения первого байта.
pub struct PositionedReader<R> {
    inner: R,
    pos: u64,
}

impl<R: Read + Seek> PositionedReader<R> {
    /// Создаёт обёртку, проверяя, что поток поддерживает seek.
    pub fn new(mut inner: R) -> FbxResult<Self> {
        let pos = inner
            .stream_position()
            .map_err(|e| FbxError::precondition(format!("stream is not seekable: {e}")))?;
        Ok(Self { inner, pos })
    }

    /// Текущая абсолютная позиция.
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl<R: Read> Read for PositionedReader<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Seek> Seek for PositionedReader<R> {
    fn seek(
        &mut self,
        pos: SeekFrom,
    ) -> io::Result<u64> {
        self.pos = self.inner.seek(pos)?;
        Ok(self.pos)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }
}

/// Текущая позиция потока.
pub(crate) fn position<S: Seek + ?Sized>(s: &mut S) -> FbxResult<u64> {
    s.stream_position().map_err(FbxError::from)
}

/// Выполняет чтение поля, привязывая возможную ошибку к смещению его начала.
pub(crate) fn read_at<R, T, F>(
    r: &mut R,
    f: F,
) -> FbxResult<T>
where
    R: Read + Seek,
    F: FnOnce(&mut R) -> io::Result<T>,
{
    let offset = position(r)?;
    f(r).map_err(|e| FbxError::from_io(e, offset))
}

/// Читает ровно `len` байт, не выделяя память заранее под заявленную длину.
///
/// Длина приходит из файла и не заслуживает доверия: буфер растёт по мере
/// фактического чтения, а обрыв потока даёт ошибку формата.
pub(crate) fn read_bytes<R: Read + Seek>(
    r: &mut R,
    len: u64,
) -> FbxResult<Vec<u8>> {
    let offset = position(r)?;
    let mut buf = Vec::new();
    r.by_ref()
        .take(len)
        .read_to_end(&mut buf)
        .map_err(|e| FbxError::from_io(e, offset))?;
    if (buf.len() as u64) < len {
        return Err(FbxError::format(
            offset,
            format!(
                "unexpected end of stream: needed {len} bytes, got {}",
                buf.len()
            ),
        ));
    }
    Ok(buf)
}
