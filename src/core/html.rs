// src/core/html.rs
//
// Tree-walking helpers over a parsed document.
// Parsing itself is `scraper`'s job; everything here only reads node refs.
// All searches are pre-order and stop at the first hit. `descendants()`
// walks the tree iteratively, so deep markup cannot blow the stack.

use std::iter;

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};

/// Where the region of interest is marked in the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Marker<'m> {
    /// Restrict matches to this element name. `None` accepts any element.
    pub tag: Option<&'m str>,
    /// Attribute *value* to look for. The attribute name is not checked.
    pub value: &'m str,
}

impl<'m> Marker<'m> {
    pub const fn any_element(value: &'m str) -> Self {
        Self { tag: None, value }
    }

    fn matches(&self, node: &Node) -> bool {
        let Some(el) = node.as_element() else { return false };
        if let Some(tag) = self.tag {
            if !el.name().eq_ignore_ascii_case(tag) { return false; }
        }
        el.attrs().any(|(_, v)| v == self.value)
    }
}

/// First node in document order (starting at and including `root`)
/// that satisfies `marker`.
pub fn find_marker<'a>(root: NodeRef<'a, Node>, marker: &Marker<'_>) -> Option<NodeRef<'a, Node>> {
    root.descendants().find(|n| marker.matches(n.value()))
}

/// First element named `tag` in `node`'s subtree, `node` included.
pub fn find_tag<'a>(node: NodeRef<'a, Node>, tag: &str) -> Option<NodeRef<'a, Node>> {
    node.descendants().find(|n| {
        n.value().as_element().is_some_and(|el| el.name().eq_ignore_ascii_case(tag))
    })
}

/// Plain text of a single node: a text node's own text, or every text
/// descendant of an element concatenated. Comments and the like are empty.
pub fn node_text(node: NodeRef<'_, Node>) -> String {
    match node.value() {
        Node::Text(t) => {
            let text: &str = t;
            text.to_string()
        }
        Node::Element(_) => ElementRef::wrap(node)
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Walk `start` and every sibling after it. For each, find the first nested
/// `tag` element, render its *first child* to text, trim, and keep it.
///
/// Siblings without a `tag`, or whose `tag` is empty, add nothing; the
/// result is never padded, so callers can detect a short harvest.
pub fn harvest_sibling_text(start: NodeRef<'_, Node>, tag: &str) -> Vec<String> {
    iter::successors(Some(start), |n| n.next_sibling())
        .filter_map(|sib| find_tag(sib, tag))
        .filter_map(|hit| hit.first_child())
        .map(|child| node_text(child).trim().to_string())
        .collect()
}
