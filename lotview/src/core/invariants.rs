//! Semantic invariants not expressible in the types.

use std::collections::HashSet;

use crate::core::node::VNode;
use crate::core::state::Lot;

/// Check a freshly loaded lot list:
/// - No duplicate ids
/// - Prices are finite and non-negative
pub fn validate_lots(lots: &[Lot]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for (index, lot) in lots.iter().enumerate() {
        if !seen.insert(lot.id) {
            errors.push(format!("duplicate lot id {} at index {}", lot.id, index));
        }
        if !lot.price.is_finite() || lot.price < 0.0 {
            errors.push(format!("lot {}: price {} must be finite and >= 0", lot.id, lot.price));
        }
    }
    errors
}

/// Report keys that appear more than once among the children of one node.
///
/// Paths are tag chains from the root with child indices, e.g. `div/ul[1]`.
pub fn duplicate_sibling_keys(root: &VNode) -> Vec<String> {
    let mut errors = Vec::new();
    let path = root.tag().unwrap_or("#text").to_string();
    check_node(root, &path, &mut errors);
    errors
}

fn check_node(node: &VNode, path: &str, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for child in node.children() {
        if let Some(key) = child.key() {
            if !seen.insert(key.as_str()) {
                errors.push(format!("{}: duplicate key '{}'", path, key));
            }
        }
    }

    for (index, child) in node.children().iter().enumerate() {
        if let Some(tag) = child.tag() {
            let child_path = format!("{}/{}[{}]", path, tag, index);
            check_node(child, &child_path, errors);
        }
    }
}
