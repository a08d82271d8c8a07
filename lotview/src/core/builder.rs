//! Constructors for declarative tree descriptions.

use crate::core::node::{
    Attributes, Children, DeclarativeNode, Element, Key, NodeType, PropValue, Props,
};

/// Attributes and key supplied when creating a node.
#[derive(Debug, Clone, Default)]
pub struct Config {
    key: Option<Key>,
    attrs: Attributes,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// Build a declarative node.
///
/// A single child is stored as [`Children::One`]; any other count is stored
/// as an ordered [`Children::Many`] list, so zero children yield an empty list.
pub fn create_node(kind: impl Into<NodeType>, config: Config, children: Vec<Element>) -> Element {
    let Config { key, attrs } = config;
    let children = match <[Element; 1]>::try_from(children) {
        Ok([only]) => Children::One(Box::new(only)),
        Err(many) => Children::Many(many),
    };
    Element::Node(DeclarativeNode {
        kind: kind.into(),
        key,
        props: Props { attrs, children },
    })
}

/// Composite node whose render function ignores its props.
pub fn component(render: impl Fn() -> Element + 'static) -> Element {
    create_node(NodeType::composite(move |_| render()), Config::new(), Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::Scalar;

    fn node_of(element: Element) -> DeclarativeNode {
        match element {
            Element::Node(node) => node,
            Element::Scalar(scalar) => panic!("expected node, got scalar {scalar}"),
        }
    }

    #[test]
    fn single_child_is_stored_as_value() {
        let node = node_of(create_node("span", Config::new(), vec!["hello".into()]));
        match node.props.children {
            Children::One(child) => {
                assert!(matches!(*child, Element::Scalar(Scalar::Text(ref text)) if text == "hello"));
            }
            Children::Many(_) => panic!("expected singleton children"),
        }
    }

    #[test]
    fn several_children_are_stored_in_order() {
        let node = node_of(create_node(
            "ul",
            Config::new(),
            vec!["a".into(), "b".into(), "c".into()],
        ));
        match node.props.children {
            Children::Many(children) => assert_eq!(children.len(), 3),
            Children::One(_) => panic!("expected list children"),
        }
    }

    #[test]
    fn no_children_yield_empty_list() {
        let node = node_of(create_node("img", Config::new(), Vec::new()));
        assert!(matches!(node.props.children, Children::Many(ref list) if list.is_empty()));
    }

    #[test]
    fn key_is_read_from_config() {
        let keyed = node_of(create_node("li", Config::new().key(7u64), Vec::new()));
        assert_eq!(keyed.key, Some(Key::from("7")));

        let plain = node_of(create_node("li", Config::new().attr("class", "x"), Vec::new()));
        assert_eq!(plain.key, None);
        assert_eq!(plain.props.get("class"), Some(&PropValue::from("x")));
    }
}
