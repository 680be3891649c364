//! Типизированные значения свойств узла.
//!
//! Набор вариантов закрыт: примитивы, строка, сырой блоб и однородные
//! массивы. Каждому варианту соответствует ровно один однобайтовый тег
//! бинарного формата (см. [`crate::engine::fbx::tags`]).

use crate::engine::fbx::tags::{
    TAG_BOOL, TAG_BOOL_ARRAY, TAG_F32, TAG_F32_ARRAY, TAG_F64, TAG_F64_ARRAY, TAG_I16, TAG_I32,
    TAG_I32_ARRAY, TAG_I64, TAG_I64_ARRAY, TAG_RAW, TAG_STRING,
};

/// Значение свойства узла.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    I16(i16),
    Bool(bool),
    I32(i32),
    F32(f32),
    F64(f64),
    I64(i64),
    String(String),
    Raw(Vec<u8>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
    I64Array(Vec<i64>),
    I32Array(Vec<i32>),
    BoolArray(Vec<bool>),
}

impl Property {
    /// Тег типа, под которым значение записывается в поток.
    pub fn tag(&self) -> u8 {
        match self {
            Property::I16(_) => TAG_I16,
            Property::Bool(_) => TAG_BOOL,
            Property::I32(_) => TAG_I32,
            Property::F32(_) => TAG_F32,
            Property::F64(_) => TAG_F64,
            Property::I64(_) => TAG_I64,
            Property::String(_) => TAG_STRING,
            Property::Raw(_) => TAG_RAW,
            Property::F32Array(_) => TAG_F32_ARRAY,
            Property::F64Array(_) => TAG_F64_ARRAY,
            Property::I64Array(_) => TAG_I64_ARRAY,
            Property::I32Array(_) => TAG_I32_ARRAY,
            Property::BoolArray(_) => TAG_BOOL_ARRAY,
        }
    }

    /// Короткое имя типа для логов и сообщений об ошибках.
    pub fn type_name(&self) -> &'static str {
        match self {
            Property::I16(_) => "i16",
            Property::Bool(_) => "bool",
            Property::I32(_) => "i32",
            Property::F32(_) => "f32",
            Property::F64(_) => "f64",
            Property::I64(_) => "i64",
            Property::String(_) => "string",
            Property::Raw(_) => "raw",
            Property::F32Array(_) => "f32[]",
            Property::F64Array(_) => "f64[]",
            Property::I64Array(_) => "i64[]",
            Property::I32Array(_) => "i32[]",
            Property::BoolArray(_) => "bool[]",
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_len().is_some()
    }

    /// Кол-во элементов для массивов, `None` для остальных типов.
    pub fn array_len(&self) -> Option<usize> {
        match self {
            Property::F32Array(v) => Some(v.len()),
            Property::F64Array(v) => Some(v.len()),
            Property::I64Array(v) => Some(v.len()),
            Property::I32Array(v) => Some(v.len()),
            Property::BoolArray(v) => Some(v.len()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Property::Raw(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Property::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Целое значение с расширением до `i64` (без потерь для всех целых
    /// скаляров).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Property::I16(v) => Some(i64::from(*v)),
            Property::I32(v) => Some(i64::from(*v)),
            Property::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Вещественное значение с расширением до `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Property::F32(v) => Some(f64::from(*v)),
            Property::F64(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_property {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Property {
                fn from(v: $ty) -> Self {
                    Property::$variant(v)
                }
            }
        )*
    };
}

impl_from_for_property! {
    i16 => I16,
    bool => Bool,
    i32 => I32,
    f32 => F32,
    f64 => F64,
    i64 => I64,
    String => String,
    Vec<u8> => Raw,
    Vec<f32> => F32Array,
    Vec<f64> => F64Array,
    Vec<i64> => I64Array,
    Vec<i32> => I32Array,
    Vec<bool> => BoolArray,
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Property::String(s.to_string())
    }
}
