//! In-memory live tree.
//!
//! [`MemoryHost`] stands in for the externally owned document: an arena of
//! element and text nodes addressed by [`NodeId`]. Removed subtrees are
//! released and their slots reused, so a long-running page does not grow the
//! arena with every replacement.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::core::node::{Attributes, Callback, PropValue, VNode};
use crate::core::reconcile::{HostTree, KEY_ATTRIBUTE};

/// Handle to a node owned by a [`MemoryHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
enum Payload {
    Element { tag: String, attrs: Attributes },
    Text(String),
}

#[derive(Debug)]
struct Slot {
    payload: Payload,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct MemoryHost {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element carrying an `id` attribute, used as a mount point.
    pub fn create_root(&mut self, tag: &str, id: &str) -> NodeId {
        let root = self.create_element(tag);
        self.set_attribute(root, "id", PropValue::from(id));
        root
    }

    /// Number of nodes currently allocated (attached or not).
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).and_then(|slot| slot.parent)
    }

    /// Serialize the subtree rooted at `node` as HTML-like markup.
    ///
    /// Handler attributes are omitted.
    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(slot) = self.slot(node) else {
            return;
        };
        match &slot.payload {
            Payload::Text(text) => out.push_str(&escape(text)),
            Payload::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    if matches!(value, PropValue::Handler(_)) {
                        continue;
                    }
                    let _ = write!(out, " {}=\"{}\"", name, escape(&value.to_string()));
                }
                out.push('>');
                for child in &slot.children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{}>", tag);
            }
        }
    }

    /// First node in document order (including `root`) whose attribute
    /// `name` renders as `value`.
    pub fn find_by_attribute(&self, root: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.find(root, &|host: &Self, node: NodeId| {
            host.attribute(node, name)
                .is_some_and(|found| found.to_string() == value)
        })
    }

    /// First strict descendant of `root` with the given tag.
    pub fn find_descendant(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.children(root)
            .into_iter()
            .find_map(|child| {
                self.find(child, &|host: &Self, node: NodeId| host.tag(node) == Some(tag))
            })
    }

    fn find(&self, node: NodeId, matches: &dyn Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        if matches(self, node) {
            return Some(node);
        }
        self.children(node)
            .into_iter()
            .find_map(|child| self.find(child, matches))
    }

    /// Handler stored under attribute `event` (e.g. `onclick`).
    ///
    /// Callers holding the host behind a `RefCell` should take the handler,
    /// release the borrow, then call it: a handler may trigger a re-render.
    pub fn handler(&self, node: NodeId, event: &str) -> Option<Callback> {
        match self.attribute(node, event) {
            Some(PropValue::Handler(handler)) => Some(handler.clone()),
            _ => None,
        }
    }

    pub fn snapshot(&self, node: NodeId) -> Snapshot {
        Snapshot::of_live(self, node)
    }

    fn slot(&self, node: NodeId) -> Option<&Slot> {
        self.slots.get(node.0).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, node: NodeId) -> Option<&mut Slot> {
        self.slots.get_mut(node.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let slot = Slot {
            payload,
            parent: None,
            children: Vec::new(),
        };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(slot));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Unlink `node` from its parent, if any.
    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent(node) else {
            return;
        };
        if let Some(slot) = self.slot_mut(parent) {
            slot.children.retain(|child| *child != node);
        }
        if let Some(slot) = self.slot_mut(node) {
            slot.parent = None;
        }
    }

    /// Free `node` and its whole subtree.
    fn release(&mut self, node: NodeId) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if let Some(slot) = self.slots.get_mut(current.0).and_then(Option::take) {
                pending.extend(slot.children);
                self.free.push(current.0);
            }
        }
    }

    fn attach(&mut self, parent: NodeId, index: Option<usize>, child: NodeId) {
        if self.slot(parent).is_none() || self.slot(child).is_none() {
            return;
        }
        self.detach(child);
        if let Some(slot) = self.slot_mut(parent) {
            match index {
                Some(index) => {
                    let index = index.min(slot.children.len());
                    slot.children.insert(index, child);
                }
                None => slot.children.push(child),
            }
        }
        if let Some(slot) = self.slot_mut(child) {
            slot.parent = Some(parent);
        }
    }
}

impl HostTree for MemoryHost {
    type Handle = NodeId;

    fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node)?.payload {
            Payload::Element { tag, .. } => Some(tag.as_str()),
            Payload::Text(_) => None,
        }
    }

    fn attributes(&self, node: NodeId) -> Vec<(String, PropValue)> {
        match self.slot(node).map(|slot| &slot.payload) {
            Some(Payload::Element { attrs, .. }) => attrs
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&PropValue> {
        match &self.slot(node)?.payload {
            Payload::Element { attrs, .. } => attrs.get(name),
            Payload::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node)?.payload {
            Payload::Text(text) => Some(text.as_str()),
            Payload::Element { .. } => None,
        }
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.slot(node)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: PropValue) {
        if let Some(Slot {
            payload: Payload::Element { attrs, .. },
            ..
        }) = self.slot_mut(node)
        {
            attrs.insert(name.to_string(), value);
        }
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if let Some(Slot {
            payload: Payload::Element { attrs, .. },
            ..
        }) = self.slot_mut(node)
        {
            attrs.remove(name);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(Slot {
            payload: Payload::Text(current),
            ..
        }) = self.slot_mut(node)
        {
            *current = text.to_string();
        }
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, None, child);
    }

    fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.attach(parent, Some(index), child);
    }

    fn replace_child(&mut self, parent: NodeId, new_child: NodeId, old_child: NodeId) {
        if self.parent(old_child) != Some(parent) || self.slot(new_child).is_none() {
            return;
        }
        self.detach(new_child);
        if let Some(slot) = self.slot_mut(parent) {
            for child in &mut slot.children {
                if *child == old_child {
                    *child = new_child;
                }
            }
        }
        if let Some(slot) = self.slot_mut(new_child) {
            slot.parent = Some(parent);
        }
        self.release(old_child);
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.parent(child) != Some(parent) {
            return;
        }
        self.detach(child);
        self.release(child);
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Payload::Element {
            tag: tag.to_string(),
            attrs: Attributes::new(),
        })
    }

    fn create_text(&mut self) -> NodeId {
        self.alloc(Payload::Text(String::new()))
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Host-independent structural view of a tree: tags, text and rendered
/// attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Text(String),
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        children: Vec<Snapshot>,
    },
}

impl Snapshot {
    pub fn of_live<H: HostTree>(host: &H, node: H::Handle) -> Snapshot {
        match host.tag(node) {
            None => Snapshot::Text(host.text(node).unwrap_or_default().to_string()),
            Some(tag) => Snapshot::Element {
                tag: tag.to_string(),
                attrs: host
                    .attributes(node)
                    .into_iter()
                    .map(|(name, value)| (name, value.to_string()))
                    .collect(),
                children: host
                    .children(node)
                    .into_iter()
                    .map(|child| Snapshot::of_live(host, child))
                    .collect(),
            },
        }
    }

    /// Expected live shape of an evaluated node, including its key attribute.
    pub fn of_vnode(node: &VNode) -> Snapshot {
        match node {
            VNode::Text(scalar) => Snapshot::Text(scalar.to_string()),
            VNode::Element(element) => {
                let mut attrs: BTreeMap<String, String> = element
                    .attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect();
                if let Some(key) = &element.key {
                    attrs.insert(KEY_ATTRIBUTE.to_string(), key.to_string());
                }
                Snapshot::Element {
                    tag: element.tag.clone(),
                    attrs,
                    children: element.children.iter().map(Snapshot::of_vnode).collect(),
                }
            }
        }
    }
}
