//! Движок кодирования.
//!
//! - `fbx`: бинарный контейнер FBX (преамбула, записи узлов, свойства,
//!   сжатые массивы, футер).

pub mod fbx;

pub use fbx::*;
