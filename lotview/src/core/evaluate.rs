//! Resolution of declarative descriptions into evaluated trees.

use crate::core::node::{Children, Element, NodeType, VElement, VNode};

/// Recursively resolve composites until only primitive nodes and scalars remain.
///
/// Composites may chain into further composites. A composite's key is carried
/// onto the node it resolves to unless that node already has one, so keyed
/// components stay correlatable after resolution.
pub fn evaluate(element: &Element) -> VNode {
    let node = match element {
        Element::Scalar(scalar) => return VNode::Text(scalar.clone()),
        Element::Node(node) => node,
    };

    match &node.kind {
        NodeType::Composite(render) => {
            let mut resolved = evaluate(&render(&node.props));
            if let (Some(key), VNode::Element(element)) = (&node.key, &mut resolved) {
                if element.key.is_none() {
                    element.key = Some(key.clone());
                }
            }
            resolved
        }
        NodeType::Primitive(tag) => VNode::Element(VElement {
            tag: tag.clone(),
            key: node.key.clone(),
            attrs: node.props.attrs.clone(),
            children: match &node.props.children {
                Children::Many(children) => children.iter().map(evaluate).collect(),
                Children::One(child) => vec![evaluate(child)],
            },
        }),
    }
}
