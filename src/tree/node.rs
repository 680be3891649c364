//! Узел дерева и его построитель.
//!
//! Узел после сборки не изменяется: декодер сначала полностью собирает
//! потомков через [`NodeBuilder`], и только затем вызывает `build()` и
//! прикрепляет готовый узел к родителю. Частично собранный узел никогда не
//! покидает декодер, даже на пути ошибки.

use super::Property;

/// Именованная запись: упорядоченные свойства и упорядоченные потомки.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Node {
    name: String,
    properties: Vec<Property>,
    children: Vec<Node>,
}

/// Построитель узла (append-then-freeze).
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    name: String,
    properties: Vec<Property>,
    children: Vec<Node>,
}

impl Node {
    /// Начинает сборку узла с заданным именем.
    pub fn builder(name: impl Into<String>) -> NodeBuilder {
        NodeBuilder::new(name)
    }

    /// Неявный корень документа: без имени и свойств.
    pub fn root(children: Vec<Node>) -> Self {
        Self {
            name: String::new(),
            properties: Vec::new(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Первый потомок с указанным именем.
    pub fn child(
        &self,
        name: &str,
    ) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Все потомки с указанным именем, в порядке следования.
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Разбирает узел на составные части.
    pub fn into_parts(self) -> (String, Vec<Property>, Vec<Node>) {
        (self.name, self.properties, self.children)
    }

    /// Узел выглядит как неявный корень: пустое имя и нет свойств.
    pub fn is_implicit_root(&self) -> bool {
        self.name.is_empty() && self.properties.is_empty()
    }

    /// Схлопывает лишний уровень обёртки.
    ///
    /// Если корень без имени и свойств содержит ровно одного потомка,
    /// возвращается этот потомок; иначе узел возвращается без изменений.
    pub fn collapse_root(self) -> Node {
        if self.is_implicit_root() && self.children.len() == 1 {
            let mut children = self.children;
            children.remove(0)
        } else {
            self
        }
    }

    /// Кол-во узлов в поддереве, включая сам узел.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Глубина поддерева (лист имеет глубину 1).
    pub fn max_depth(&self) -> usize {
        1 + self.children.iter().map(Node::max_depth).max().unwrap_or(0)
    }
}

impl NodeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Добавляет свойство (builder-style).
    pub fn property(
        mut self,
        value: impl Into<Property>,
    ) -> Self {
        self.properties.push(value.into());
        self
    }

    /// Добавляет готового потомка (builder-style).
    pub fn child(
        mut self,
        node: Node,
    ) -> Self {
        self.children.push(node);
        self
    }

    /// Добавляет несколько потомков подряд.
    pub fn children(
        mut self,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn push_property(
        &mut self,
        value: Property,
    ) {
        self.properties.push(value);
    }

    pub fn push_child(
        &mut self,
        node: Node,
    ) {
        self.children.push(node);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Завершает сборку. После этого узел только читается.
    pub fn build(self) -> Node {
        Node {
            name: self.name,
            properties: self.properties,
            children: self.children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::builder("Objects")
            .child(
                Node::builder("Model")
                    .property(42i64)
                    .property("Cube\x00\x01Model")
                    .build(),
            )
            .child(Node::builder("Geometry").property(vec![0.0f64, 1.0]).build())
            .child(Node::builder("Model").property(43i64).build())
            .build()
    }

    #[test]
    fn test_accessors() {
        let node = sample();
        assert_eq!(node.name(), "Objects");
        assert!(node.properties().is_empty());
        assert_eq!(node.children().len(), 3);
        assert_eq!(
            node.child("Geometry").unwrap().properties()[0],
            Property::F64Array(vec![0.0, 1.0])
        );
        assert!(node.child("Material").is_none());
        assert_eq!(node.children_named("Model").count(), 2);
    }

    #[test]
    fn test_counts() {
        let node = sample();
        assert_eq!(node.node_count(), 4);
        assert_eq!(node.max_depth(), 2);
        assert_eq!(Node::default().max_depth(), 1);
    }

    /// Тест проверяет схлопывание корня с единственным потомком.
    #[test]
    fn test_collapse_single_child_root() {
        let inner = sample();
        let root = Node::root(vec![inner.clone()]);
        assert_eq!(root.collapse_root(), inner);
    }

    /// Тест проверяет, что корень с несколькими потомками не схлопывается.
    #[test]
    fn test_collapse_keeps_multi_child_root() {
        let root = Node::root(vec![sample(), Node::builder("Takes").build()]);
        let collapsed = root.clone().collapse_root();
        assert_eq!(collapsed, root);
    }

    #[test]
    fn test_collapse_keeps_named_node() {
        let node = Node::builder("Wrapper").child(sample()).build();
        assert_eq!(node.clone().collapse_root(), node);
    }

    #[test]
    fn test_builder_push() {
        let mut b = NodeBuilder::new("");
        assert_eq!(b.name(), "");
        b.push_property(Property::I32(1));
        b.push_child(Node::default());
        let node = b.build();
        let (name, props, children) = node.into_parts();
        assert!(name.is_empty());
        assert_eq!(props, vec![Property::I32(1)]);
        assert_eq!(children, vec![Node::default()]);
    }

    #[test]
    fn test_builder_children_keeps_order() {
        let node = Node::builder("Objects")
            .child(Node::builder("A").build())
            .children(vec![Node::builder("B").build(), Node::builder("C").build()])
            .build();
        let names: Vec<&str> = node.children().iter().map(Node::name).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
