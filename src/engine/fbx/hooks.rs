//! Наблюдатели за ходом декодирования.
//!
//! Декодер вызывает методы [`DecodeHook`] для каждой записи:
//! - `on_node_start()` - прочитан заголовок записи;
//! - `on_array()` - прочитан заголовок массива;
//! - `on_children()` - у записи есть байты под вложенный список;
//! - `on_node_end()` - узел полностью собран.
//!
//! Все методы имеют пустую реализацию по умолчанию. Хук только наблюдает и
//! не может изменить результат разбора.

use tracing::{debug, trace};

use crate::tree::Node;

/// Заголовок записи узла в момент события.
#[derive(Debug, Clone, Copy)]
pub struct NodeEvent<'a> {
    pub name: &'a str,
    /// Смещение начала записи.
    pub offset: u64,
    /// `end_offset` из заголовка записи.
    pub end_offset: u64,
    /// 0 для узлов верхнего уровня.
    pub depth: usize,
}

/// Заголовок массива в момент события.
#[derive(Debug, Clone, Copy)]
pub struct ArrayEvent {
    pub offset: u64,
    pub tag: u8,
    pub count: u32,
    /// 0 - как есть, 1 - zlib.
    pub encoding: u32,
    pub byte_len: u32,
}

/// Трейт для наблюдения за декодированием.
pub trait DecodeHook {
    fn on_node_start(
        &mut self,
        _event: &NodeEvent<'_>,
    ) {
    }

    fn on_array(
        &mut self,
        _event: &ArrayEvent,
    ) {
    }

    /// `remaining` - кол-во байт между концом свойств и `end_offset`.
    fn on_children(
        &mut self,
        _event: &NodeEvent<'_>,
        _remaining: u64,
    ) {
    }

    fn on_node_end(
        &mut self,
        _event: &NodeEvent<'_>,
        _node: &Node,
    ) {
    }
}

/// Хук, который ничего не делает.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl DecodeHook for NoopHook {}

/// Хук, пишущий события в `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHook;

impl DecodeHook for TracingHook {
    fn on_node_start(
        &mut self,
        event: &NodeEvent<'_>,
    ) {
        trace!(
            node = event.name,
            offset = event.offset,
            end = event.end_offset,
            depth = event.depth,
            "node start"
        );
    }

    fn on_array(
        &mut self,
        event: &ArrayEvent,
    ) {
        trace!(
            offset = event.offset,
            tag = %char::from(event.tag),
            count = event.count,
            encoding = event.encoding,
            byte_len = event.byte_len,
            "array"
        );
    }

    fn on_children(
        &mut self,
        event: &NodeEvent<'_>,
        remaining: u64,
    ) {
        trace!(node = event.name, depth = event.depth, remaining, "nested list");
    }

    fn on_node_end(
        &mut self,
        event: &NodeEvent<'_>,
        node: &Node,
    ) {
        debug!(
            node = event.name,
            offset = event.offset,
            depth = event.depth,
            properties = node.properties().len(),
            children = node.children().len(),
            "node decoded"
        );
    }
}

/// Статистика декодирования.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Кол-во узлов (без sentinel)
    pub nodes: u64,
    pub properties: u64,
    pub arrays: u64,
    /// Из них сжатых zlib
    pub compressed_arrays: u64,
    /// Сумма элементов всех массивов
    pub array_elements: u64,
    /// Наибольшая глубина (0 - только узлы верхнего уровня)
    pub max_depth: usize,
}

/// Хук, собирающий [`DecodeStats`].
#[derive(Debug, Clone, Default)]
pub struct CountingHook {
    stats: DecodeStats,
}

impl CountingHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    pub fn into_stats(self) -> DecodeStats {
        self.stats
    }
}

impl DecodeHook for CountingHook {
    fn on_node_start(
        &mut self,
        event: &NodeEvent<'_>,
    ) {
        self.stats.nodes += 1;
        self.stats.max_depth = self.stats.max_depth.max(event.depth);
    }

    fn on_array(
        &mut self,
        event: &ArrayEvent,
    ) {
        self.stats.arrays += 1;
        self.stats.array_elements += u64::from(event.count);
        if event.encoding == super::tags::ARRAY_ENCODING_ZLIB {
            self.stats.compressed_arrays += 1;
        }
    }

    fn on_node_end(
        &mut self,
        _event: &NodeEvent<'_>,
        node: &Node,
    ) {
        self.stats.properties += node.properties().len() as u64;
    }
}

/// Пара хуков, вызываемых по очереди.
impl<A: DecodeHook, B: DecodeHook> DecodeHook for (A, B) {
    fn on_node_start(
        &mut self,
        event: &NodeEvent<'_>,
    ) {
        self.0.on_node_start(event);
        self.1.on_node_start(event);
    }

    fn on_array(
        &mut self,
        event: &ArrayEvent,
    ) {
        self.0.on_array(event);
        self.1.on_array(event);
    }

    fn on_children(
        &mut self,
        event: &NodeEvent<'_>,
        remaining: u64,
    ) {
        self.0.on_children(event, remaining);
        self.1.on_children(event, remaining);
    }

    fn on_node_end(
        &mut self,
        event: &NodeEvent<'_>,
        node: &Node,
    ) {
        self.0.on_node_end(event, node);
        self.1.on_node_end(event, node);
    }
}
