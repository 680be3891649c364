//! Сжатие и распаковка полезной нагрузки массивов.
//!
//! Сжатый массив хранится как zlib-поток (RFC 1950): 2 байта заголовка,
//! raw deflate и Adler-32 распакованных данных в big-endian. Заголовок и
//! трейлер разбираются здесь вручную, сам deflate распаковывает `flate2`.
//! Так декодер может сверить контрольную сумму в строгом режиме и
//! проигнорировать её в мягком.

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt};
use fbxbin_error::{FbxError, FbxResult};
use flate2::{read::DeflateDecoder, write::ZlibEncoder, Compression};
use tracing::trace;

use super::{
    options::Mode,
    source::{position, read_at},
};

/// Заголовок zlib (2 байта) плюс трейлер Adler-32 (4 байта).
pub const ZLIB_FRAMING_LEN: u32 = 6;
/// Метод сжатия deflate в младших битах CMF.
const CM_DEFLATE: u8 = 8;
/// Максимальное значение CINFO (окно 32 КиБ).
const MAX_CINFO: u8 = 7;
/// Бит FDICT в FLG.
const FLG_FDICT: u8 = 0x20;

/// Reader-обёртка, считающая Adler-32 прочитанных байт на лету.
pub struct Adler32Read<R: Read> {
    inner: R,
    hasher: adler2::Adler32,
    bytes_read: u64,
}

impl<R: Read> Adler32Read<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: adler2::Adler32::new(),
            bytes_read: 0,
        }
    }

    /// Контрольная сумма всех байт, прошедших через обёртку.
    pub fn checksum(&self) -> u32 {
        self.hasher.checksum()
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for Adler32Read<R> {
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            self.hasher.write_slice(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}

/// Проверяет 2-байтовый заголовок zlib.
///
/// `offset` указывает на байт CMF и попадает в ошибку.
pub fn validate_zlib_header(
    cmf: u8,
    flg: u8,
    offset: u64,
) -> FbxResult<()> {
    if cmf & 0x0F != CM_DEFLATE {
        return Err(FbxError::format(
            offset,
            format!("unsupported zlib compression method {}", cmf & 0x0F),
        ));
    }
    if cmf >> 4 > MAX_CINFO {
        return Err(FbxError::format(
            offset,
            format!("invalid zlib window size (CINFO {})", cmf >> 4),
        ));
    }
    if (u16::from(cmf) << 8 | u16::from(flg)) % 31 != 0 {
        return Err(FbxError::format(
            offset + 1,
            format!("zlib header check failed (CMF 0x{cmf:02X}, FLG 0x{flg:02X})"),
        ));
    }
    if flg & FLG_FDICT != 0 {
        return Err(FbxError::format(
            offset + 1,
            "zlib preset dictionary is not supported",
        ));
    }
    Ok(())
}

/// Распаковывает raw deflate из `src`, забирая не больше `expected` байт.
///
/// Возвращает распакованные байты и их Adler-32. Буфер растёт по мере
/// распаковки и не резервируется по заявленному размеру.
pub fn inflate_payload<R: Read>(
    src: R,
    expected: u64,
) -> io::Result<(Vec<u8>, u32)> {
    let mut reader = Adler32Read::new(DeflateDecoder::new(src));
    let mut out = Vec::new();
    reader.by_ref().take(expected).read_to_end(&mut out)?;
    Ok((out, reader.checksum()))
}

/// Сжимает полезную нагрузку массива в zlib-поток с уровнем `level`.
pub fn compress_payload(
    data: &[u8],
    level: u32,
) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    encoder.finish()
}

/// Читает сжатую полезную нагрузку массива.
///
/// Поток стоит в начале zlib-данных, `byte_len` взят из заголовка массива,
/// `expected` равен `count * размер элемента`. После возврата поток стоит
/// ровно на `start + byte_len` в обоих режимах.
///
/// Строгий режим проверяет заголовок zlib и сверяет Adler-32 с трейлером.
/// Мягкий пропускает заголовок без проверки и трейлер не читает. Повреждённый
/// deflate-поток и нехватка распакованных байт являются ошибкой в обоих
/// режимах.
pub fn read_compressed_payload<R: Read + Seek>(
    r: &mut R,
    byte_len: u32,
    expected: u64,
    mode: Mode,
) -> FbxResult<Vec<u8>> {
    let start = position(r)?;
    let declared_end = start + u64::from(byte_len);

    if mode.is_strict() {
        if byte_len < ZLIB_FRAMING_LEN {
            return Err(FbxError::format(
                start,
                format!("compressed array is {byte_len} bytes, too short for zlib framing"),
            ));
        }
        let cmf = read_at(r, |r| r.read_u8())?;
        let flg = read_at(r, |r| r.read_u8())?;
        validate_zlib_header(cmf, flg, start)?;
    } else {
        let mut skipped = [0u8; 2];
        read_at(r, |r| r.read_exact(&mut skipped))?;
    }

    let deflate_len = u64::from(byte_len.saturating_sub(2));
    let inflated = inflate_payload(r.by_ref().take(deflate_len), expected);
    let offset = position(r)?;
    let (payload, checksum) = inflated.map_err(|e| {
        FbxError::format(offset, format!("malformed compressed array: {e}"))
    })?;

    if payload.len() as u64 != expected {
        return Err(FbxError::format(
            offset,
            format!(
                "compressed array inflated to {} bytes, expected {expected}",
                payload.len()
            ),
        ));
    }

    if mode.is_strict() {
        let trailer = declared_end - 4;
        r.seek(SeekFrom::Start(trailer))
            .map_err(|e| FbxError::from_io(e, trailer))?;
        let recorded = read_at(r, |r| r.read_u32::<BigEndian>())?;
        if recorded != checksum {
            return Err(FbxError::format(
                trailer,
                format!(
                    "array checksum mismatch: computed 0x{checksum:08X}, recorded 0x{recorded:08X}"
                ),
            ));
        }
    } else {
        r.seek(SeekFrom::Start(declared_end))
            .map_err(|e| FbxError::from_io(e, declared_end))?;
    }

    trace!(
        offset = start,
        compressed = byte_len,
        inflated = expected,
        "compressed array decoded"
    );
    Ok(payload)
}
