//! Преамбула и футер бинарного FBX.
//!
//! Раскладка преамбулы (27 байт):
//!
//! ```text
//! 0   21 байт   "Kaydara FBX Binary  \0"
//! 21  u16 LE    0x001A
//! 23  u32 LE    версия (например, 7400)
//! ```
//!
//! Футер дописывается энкодером после завершающего sentinel и при чтении не
//! проверяется: декодер останавливается на sentinel верхнего уровня.

use std::io::{Read, Seek, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use fbxbin_error::{FbxError, FbxResult};

use super::{
    options::Mode,
    source::{position, read_at},
};

/// Магическая строка в начале файла, включая завершающий NUL.
pub const FBX_MAGIC: &[u8; 21] = b"Kaydara FBX Binary  \x00";
/// Значение u16 сразу после магии.
pub const FBX_MAGIC_NUMBER: u16 = 0x001A;
/// Длина магии и u16 вместе.
pub const PREAMBLE_LEN: usize = 23;
/// Полная длина преамбулы вместе с версией.
pub const HEADER_LEN: u64 = 27;
/// Версия, которую энкодер пишет по умолчанию.
pub const DEFAULT_VERSION: u32 = 7400;
/// Начиная с этой версии поля длины записей становятся 64-битными.
pub const WIDE_RECORD_VERSION: u32 = 7500;

/// Идентификатор, открывающий футер.
pub const FOOTER_ID: [u8; 16] = [
    0xFA, 0xBC, 0xAB, 0x09, 0xD0, 0xC8, 0xD4, 0x66, 0xB1, 0x76, 0xFB, 0x83, 0x1C, 0xF7, 0x26, 0x7E,
];
/// Магия, закрывающая футер.
pub const FOOTER_MAGIC: [u8; 16] = [
    0xF8, 0x5A, 0x8C, 0x6A, 0xDE, 0xF5, 0xD9, 0x7E, 0xEC, 0xE9, 0x0C, 0xE3, 0x75, 0x8F, 0x29, 0x0B,
];
/// Нули между версией в футере и закрывающей магией.
const FOOTER_ZERO_LEN: usize = 120;

/// Читает преамбулу и возвращает версию файла.
///
/// В строгом режиме магия и u16 сверяются побайтно, несовпадение даёт
/// ошибку формата со смещением проблемного поля. В мягком режиме первые 23
/// байта читаются без проверки. Обрыв потока является ошибкой в обоих
/// режимах.
pub fn read_header<R: Read + Seek>(
    r: &mut R,
    mode: Mode,
) -> FbxResult<u32> {
    let start = position(r)?;

    if mode.is_strict() {
        let mut magic = [0u8; 21];
        read_at(r, |r| r.read_exact(&mut magic))?;
        if &magic != FBX_MAGIC {
            return Err(FbxError::format(start, "not a binary FBX file: bad magic"));
        }
        let number = read_at(r, |r| r.read_u16::<LittleEndian>())?;
        if number != FBX_MAGIC_NUMBER {
            return Err(FbxError::format(
                start + FBX_MAGIC.len() as u64,
                format!(
                    "bad header marker: expected 0x{FBX_MAGIC_NUMBER:04X}, found 0x{number:04X}"
                ),
            ));
        }
    } else {
        let mut preamble = [0u8; PREAMBLE_LEN];
        read_at(r, |r| r.read_exact(&mut preamble))?;
    }

    read_at(r, |r| r.read_u32::<LittleEndian>())
}

/// Пишет 27-байтовую преамбулу.
pub fn write_header<W: Write>(
    w: &mut W,
    version: u32,
) -> FbxResult<()> {
    w.write_all(FBX_MAGIC)?;
    w.write_u16::<LittleEndian>(FBX_MAGIC_NUMBER)?;
    w.write_u32::<LittleEndian>(version)?;
    Ok(())
}

/// Пишет футер в раскладке, которую принимают распространённые читатели.
///
/// Идентификатор, 4 нуля, выравнивание до 16 байт (полные 16 байт, если
/// позиция уже выровнена), версия, 120 нулей, закрывающая магия.
pub fn write_footer<W: Write + Seek>(
    w: &mut W,
    version: u32,
) -> FbxResult<()> {
    w.write_all(&FOOTER_ID)?;
    w.write_all(&[0u8; 4])?;

    let pad = footer_padding(position(w)?);
    w.write_all(&[0u8; 16][..pad])?;

    w.write_u32::<LittleEndian>(version)?;
    w.write_all(&[0u8; FOOTER_ZERO_LEN])?;
    w.write_all(&FOOTER_MAGIC)?;
    Ok(())
}

/// Кол-во байт выравнивания футера для позиции `offset`.
fn footer_padding(offset: u64) -> usize {
    match (offset % 16) as usize {
        0 => 16,
        rem => 16 - rem,
    }
}
