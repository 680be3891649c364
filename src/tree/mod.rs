//! Дерево узлов в памяти: общая модель для декодера, энкодера и
//! текстового экспорта.

pub mod node;
pub mod property;

pub use node::{Node, NodeBuilder};
pub use property::Property;
