//! Определение тегов для бинарного формата свойств.
//!
//! Каждое свойство предваряется однобайтовым ASCII-тегом.
//! Используется в модулях `decode` и `encode`.

/// Целое 16 бит (i16)
pub const TAG_I16: u8 = b'Y';
/// Логическое значение (1 байт)
pub const TAG_BOOL: u8 = b'C';
/// Целое 32 бита (i32)
pub const TAG_I32: u8 = b'I';
/// Число с плавающей точкой (f32)
pub const TAG_F32: u8 = b'F';
/// Число с плавающей точкой (f64)
pub const TAG_F64: u8 = b'D';
/// Целое 64 бита (i64)
pub const TAG_I64: u8 = b'L';
/// Массив f32
pub const TAG_F32_ARRAY: u8 = b'f';
/// Массив f64
pub const TAG_F64_ARRAY: u8 = b'd';
/// Массив i64
pub const TAG_I64_ARRAY: u8 = b'l';
/// Массив i32
pub const TAG_I32_ARRAY: u8 = b'i';
/// Массив bool (по байту на элемент)
pub const TAG_BOOL_ARRAY: u8 = b'b';
/// Строка: u32 длина + байты
pub const TAG_STRING: u8 = b'S';
/// Сырые байты: u32 длина + байты
pub const TAG_RAW: u8 = b'R';

/// Массив хранится как есть.
pub const ARRAY_ENCODING_RAW: u32 = 0;
/// Массив сжат zlib (заголовок RFC1950 + deflate + Adler-32).
pub const ARRAY_ENCODING_ZLIB: u32 = 1;

/// Размер одного элемента массива в байтах для тега массива.
pub fn array_element_size(tag: u8) -> Option<usize> {
    match tag {
        TAG_F32_ARRAY | TAG_I32_ARRAY => Some(4),
        TAG_F64_ARRAY | TAG_I64_ARRAY => Some(8),
        TAG_BOOL_ARRAY => Some(1),
        _ => None,
    }
}
