//! Declarative and evaluated tree node types.
//!
//! A [`DeclarativeNode`] describes the desired shape of a tree before
//! composites are resolved. A [`VNode`] is the evaluated form: every node is
//! either a scalar text leaf or an element with a concrete host tag.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Text or number payload of a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(value) => write_number(f, *value),
        }
    }
}

/// Integral numbers print without a fractional part (`16`, not `16.0`).
fn write_number(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        write!(f, "{}", value as i64)
    } else {
        write!(f, "{}", value)
    }
}

/// Event handler attached to a node.
///
/// Two callbacks are equal only when they share the same allocation, so a
/// freshly built handler always differs from the one already on the live tree.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new(handler: impl Fn() + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self) {
        (self.0)();
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Value of a single attribute (a prop other than `children`).
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Handler(Callback),
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Text(text) => f.write_str(text),
            PropValue::Number(value) => write_number(f, *value),
            PropValue::Bool(value) => write!(f, "{}", value),
            PropValue::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Text(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Text(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        PropValue::Handler(value)
    }
}

/// Attribute map, ordered by name for deterministic patching.
pub type Attributes = BTreeMap<String, PropValue>;

/// Identity token used to correlate siblings across renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key(value)
    }
}

impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key(value.to_string())
    }
}

/// Render function of a composite node.
pub type RenderFn = Rc<dyn Fn(&Props) -> Element>;

/// What a declarative node resolves to.
#[derive(Clone)]
pub enum NodeType {
    /// Concrete host tag such as `div`.
    Primitive(String),
    /// Function from props to another declarative description.
    Composite(RenderFn),
}

impl NodeType {
    pub fn composite(render: impl Fn(&Props) -> Element + 'static) -> Self {
        NodeType::Composite(Rc::new(render))
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeType::Primitive(tag) => f.debug_tuple("Primitive").field(tag).finish(),
            NodeType::Composite(_) => f.write_str("Composite(..)"),
        }
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        NodeType::Primitive(tag.to_string())
    }
}

/// Children as supplied to the builder: a single value or an ordered list.
#[derive(Debug, Clone)]
pub enum Children {
    One(Box<Element>),
    Many(Vec<Element>),
}

impl Default for Children {
    fn default() -> Self {
        Children::Many(Vec::new())
    }
}

/// Props handed to a node: attributes plus `children`.
#[derive(Debug, Clone, Default)]
pub struct Props {
    pub attrs: Attributes,
    pub children: Children,
}

impl Props {
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attrs.get(name)
    }

    /// Boolean prop; missing or non-boolean values read as `false`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attrs.get(name), Some(PropValue::Bool(true)))
    }

    pub fn handler(&self, name: &str) -> Option<&Callback> {
        match self.attrs.get(name) {
            Some(PropValue::Handler(callback)) => Some(callback),
            _ => None,
        }
    }
}

/// Description of a desired tree shape prior to resolution.
#[derive(Debug, Clone)]
pub struct DeclarativeNode {
    pub kind: NodeType,
    pub key: Option<Key>,
    pub props: Props,
}

/// Anything that may appear in a declarative tree.
#[derive(Debug, Clone)]
pub enum Element {
    Scalar(Scalar),
    Node(DeclarativeNode),
}

impl From<DeclarativeNode> for Element {
    fn from(node: DeclarativeNode) -> Self {
        Element::Node(node)
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Element::Scalar(Scalar::Text(text.to_string()))
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Element::Scalar(Scalar::Text(text))
    }
}

impl From<f64> for Element {
    fn from(value: f64) -> Self {
        Element::Scalar(Scalar::Number(value))
    }
}

/// Evaluated element: primitive tag only, children always a list.
#[derive(Debug, Clone, PartialEq)]
pub struct VElement {
    pub tag: String,
    pub key: Option<Key>,
    pub attrs: Attributes,
    pub children: Vec<VNode>,
}

/// Node of an evaluated tree. Composites cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Text(Scalar),
    Element(VElement),
}

impl VNode {
    /// Host tag, or `None` for a text leaf.
    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(element) => Some(element.tag.as_str()),
        }
    }

    pub fn key(&self) -> Option<&Key> {
        match self {
            VNode::Text(_) => None,
            VNode::Element(element) => element.key.as_ref(),
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Text(_) => &[],
            VNode::Element(element) => &element.children,
        }
    }
}
