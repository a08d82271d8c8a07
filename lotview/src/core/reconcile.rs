//! Minimal-mutation patching of a live tree toward an evaluated tree.
//!
//! The reconciler walks the evaluated tree and the live tree together in a
//! single depth-first pass. Tag or child-count mismatches are resolved
//! structurally (update, replace, insert, remove) and are never errors.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::evaluate::evaluate;
use crate::core::invariants::duplicate_sibling_keys;
use crate::core::node::{Element, PropValue, Scalar, VElement, VNode};

/// Live attribute that records the key of the evaluated node it was synced to.
pub const KEY_ATTRIBUTE: &str = "data-key";

/// The externally owned mutable tree the reconciler patches.
///
/// Text leaves have no tag. Handles are cheap copies; the host owns the nodes.
pub trait HostTree {
    type Handle: Copy + Eq + Hash + Debug;

    fn tag(&self, node: Self::Handle) -> Option<&str>;
    fn attributes(&self, node: Self::Handle) -> Vec<(String, PropValue)>;
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&PropValue>;
    fn text(&self, node: Self::Handle) -> Option<&str>;
    fn children(&self, node: Self::Handle) -> Vec<Self::Handle>;

    fn set_attribute(&mut self, node: Self::Handle, name: &str, value: PropValue);
    fn remove_attribute(&mut self, node: Self::Handle, name: &str);
    fn set_text(&mut self, node: Self::Handle, text: &str);

    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);
    /// Place `child` at `index` among `parent`'s children, detaching it from
    /// its current position first if it is already attached.
    fn insert_child(&mut self, parent: Self::Handle, index: usize, child: Self::Handle);
    fn replace_child(&mut self, parent: Self::Handle, new_child: Self::Handle, old_child: Self::Handle);
    fn remove_child(&mut self, parent: Self::Handle, child: Self::Handle);

    fn create_element(&mut self, tag: &str) -> Self::Handle;
    fn create_text(&mut self) -> Self::Handle;
}

/// Reconciler behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileOptions {
    /// Match keyed children by key before falling back to position.
    pub keyed_children: bool,
    /// Remove live attributes that the evaluated node no longer carries.
    pub prune_attributes: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            keyed_children: true,
            prune_attributes: true,
        }
    }
}

impl ReconcileOptions {
    /// Positional matching and overwrite-only attributes.
    pub fn baseline() -> Self {
        Self {
            keyed_children: false,
            prune_attributes: false,
        }
    }
}

/// Mutations applied to the live tree during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub attributes_set: usize,
    pub attributes_removed: usize,
    pub texts_set: usize,
    pub created: usize,
    pub replaced: usize,
    pub removed: usize,
    pub moved: usize,
}

impl SyncSummary {
    /// Structural mutations only (attribute and text writes excluded).
    pub fn structural(&self) -> usize {
        self.created + self.replaced + self.removed + self.moved
    }

    pub fn is_empty(&self) -> bool {
        *self == SyncSummary::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    /// Evaluate `root` and sync it as the single child of `live_root`.
    ///
    /// The live root itself is wrapped with its current tag and attributes so
    /// that only its children are patched.
    pub fn render<H: HostTree>(&self, host: &mut H, root: &Element, live_root: H::Handle) -> SyncSummary {
        let evaluated = evaluate(root);
        if self.options.keyed_children {
            let conflicts = duplicate_sibling_keys(&evaluated);
            if !conflicts.is_empty() {
                warn!(conflicts = %conflicts.join("; "), "duplicate sibling keys, first occurrence wins");
            }
        }

        let wrapper = VNode::Element(VElement {
            tag: host.tag(live_root).unwrap_or_default().to_string(),
            key: None,
            attrs: host.attributes(live_root).into_iter().collect(),
            children: vec![evaluated],
        });

        let mut summary = SyncSummary::default();
        self.sync(host, &wrapper, live_root, &mut summary);
        debug!(?summary, "reconciled live tree");
        summary
    }

    /// Patch `live` so it matches `virtual_node`, recursing into children.
    pub fn sync<H: HostTree>(
        &self,
        host: &mut H,
        virtual_node: &VNode,
        live: H::Handle,
        summary: &mut SyncSummary,
    ) {
        match virtual_node {
            VNode::Text(scalar) => sync_text(host, scalar, live, summary),
            VNode::Element(element) => {
                self.sync_attributes(host, element, live, summary);
                if let Some(key) = &element.key {
                    let value = PropValue::from(key.as_str());
                    if host.attribute(live, KEY_ATTRIBUTE) != Some(&value) {
                        host.set_attribute(live, KEY_ATTRIBUTE, value);
                    }
                }
                self.sync_children(host, &element.children, live, summary);
            }
        }
    }

    fn sync_attributes<H: HostTree>(
        &self,
        host: &mut H,
        element: &VElement,
        live: H::Handle,
        summary: &mut SyncSummary,
    ) {
        for (name, value) in &element.attrs {
            if host.attribute(live, name) != Some(value) {
                host.set_attribute(live, name, value.clone());
                summary.attributes_set += 1;
            }
        }

        if !self.options.prune_attributes {
            return;
        }
        let stale: Vec<String> = host
            .attributes(live)
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !element.attrs.contains_key(name))
            .filter(|name| !(name == KEY_ATTRIBUTE && element.key.is_some()))
            .collect();
        for name in stale {
            host.remove_attribute(live, &name);
            summary.attributes_removed += 1;
        }
    }

    fn sync_children<H: HostTree>(
        &self,
        host: &mut H,
        virtual_children: &[VNode],
        parent: H::Handle,
        summary: &mut SyncSummary,
    ) {
        let mut live_children = host.children(parent);
        let mut claimed = if self.options.keyed_children {
            claimed_live_children(host, virtual_children, &live_children)
        } else {
            HashMap::new()
        };

        for (index, child) in virtual_children.iter().enumerate() {
            if let Some(existing) = take_keyed_match(host, child, &mut claimed) {
                if let Some(position) = live_children.iter().position(|live| *live == existing) {
                    if position != index {
                        host.insert_child(parent, index, existing);
                        live_children.remove(position);
                        live_children.insert(index, existing);
                        summary.moved += 1;
                    }
                    self.sync(host, child, existing, summary);
                    continue;
                }
            }

            match live_children.get(index).copied() {
                Some(current) if !is_claimed(&claimed, current) => {
                    if same_tag(host, child, current) {
                        self.sync(host, child, current, summary);
                    } else {
                        let fresh = self.materialize(host, child, summary);
                        host.replace_child(parent, fresh, current);
                        live_children[index] = fresh;
                        summary.replaced += 1;
                    }
                }
                Some(_) => {
                    // The live child here is reserved for a later keyed sibling.
                    let fresh = self.materialize(host, child, summary);
                    host.insert_child(parent, index, fresh);
                    live_children.insert(index, fresh);
                    summary.created += 1;
                }
                None => {
                    let fresh = self.materialize(host, child, summary);
                    host.append_child(parent, fresh);
                    live_children.push(fresh);
                    summary.created += 1;
                }
            }
        }

        if live_children.len() > virtual_children.len() {
            for stale in live_children.drain(virtual_children.len()..) {
                host.remove_child(parent, stale);
                summary.removed += 1;
            }
        }
    }

    /// Create a detached live node for `virtual_node` and sync into it.
    fn materialize<H: HostTree>(
        &self,
        host: &mut H,
        virtual_node: &VNode,
        summary: &mut SyncSummary,
    ) -> H::Handle {
        let fresh = match virtual_node {
            VNode::Text(_) => host.create_text(),
            VNode::Element(element) => host.create_element(&element.tag),
        };
        self.sync(host, virtual_node, fresh, summary);
        fresh
    }
}

fn sync_text<H: HostTree>(host: &mut H, scalar: &Scalar, live: H::Handle, summary: &mut SyncSummary) {
    let rendered = scalar.to_string();
    if host.text(live) != Some(rendered.as_str()) {
        host.set_text(live, &rendered);
        summary.texts_set += 1;
    }
}

fn same_tag<H: HostTree>(host: &H, virtual_node: &VNode, live: H::Handle) -> bool {
    virtual_node.tag() == host.tag(live)
}

/// Live children whose key is also carried by some virtual sibling.
///
/// With duplicate live keys the first occurrence wins.
fn claimed_live_children<H: HostTree>(
    host: &H,
    virtual_children: &[VNode],
    live_children: &[H::Handle],
) -> HashMap<String, H::Handle> {
    let wanted: HashSet<&str> = virtual_children
        .iter()
        .filter_map(|child| child.key().map(|key| key.as_str()))
        .collect();
    if wanted.is_empty() {
        return HashMap::new();
    }

    let mut claimed = HashMap::new();
    for live in live_children {
        if let Some(PropValue::Text(key)) = host.attribute(*live, KEY_ATTRIBUTE) {
            if wanted.contains(key.as_str()) && !claimed.contains_key(key) {
                claimed.insert(key.clone(), *live);
            }
        }
    }
    claimed
}

fn take_keyed_match<H: HostTree>(
    host: &H,
    virtual_node: &VNode,
    claimed: &mut HashMap<String, H::Handle>,
) -> Option<H::Handle> {
    let key = virtual_node.key()?;
    let live = claimed.remove(key.as_str())?;
    same_tag(host, virtual_node, live).then_some(live)
}

fn is_claimed<Handle: PartialEq>(claimed: &HashMap<String, Handle>, live: Handle) -> bool {
    claimed.values().any(|handle| *handle == live)
}
