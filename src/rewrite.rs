//! # Marker Rewriter
//!
//! Walks a rendered fragment depth-first and replaces every marker inside a
//! text node with a [`Control`]. Literal text around markers is kept verbatim
//! and in order; containers are descended into but never replaced.
//!
//! The rewrite is cheap to re-run. Text without a marker is left untouched, and
//! controls produced by an earlier pass are not text, so a second pass over
//! the same fragment changes nothing.

use tracing::{debug, trace};

use crate::marker::{contains_marker, split_segments, Segment};
use crate::node::{Control, Node, RootHandle};

/// Post-processor a host registers for each rendered fragment.
///
/// The rendering root is fixed at construction, so every control produced by
/// this processor resolves players in that root even if the host later builds
/// a new tree.
#[derive(Clone)]
pub struct MarkerPostProcessor {
    root: RootHandle,
}

impl MarkerPostProcessor {
    pub fn new(root: RootHandle) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &RootHandle {
        &self.root
    }

    /// Rewrite `fragment` in place, returning the number of controls created.
    pub fn process(&self, fragment: &mut Node) -> usize {
        rewrite_markers(fragment, &self.root)
    }
}

/// Rewrite all markers below `node`, binding new controls to `root`.
///
/// A bare text node has no parent to splice into and is left as is,
/// so callers pass the fragment's container.
pub fn rewrite_markers(node: &mut Node, root: &RootHandle) -> usize {
    let created = match node {
        Node::Container(container) => rewrite_children(&mut container.children, root),
        Node::Text(_) | Node::Control(_) => 0,
    };
    if created > 0 {
        debug!(controls = created, "rewrote audio markers");
    }
    created
}

/// Turn one text run into its replacement nodes, or `None` if it holds no marker.
pub fn rewrite_text(text: &str, root: &RootHandle) -> Option<Vec<Node>> {
    if !contains_marker(text) {
        return None;
    }

    let nodes = split_segments(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(literal) => Node::text(literal),
            Segment::Marker(token) => {
                trace!(name = %token.binding.name, start = token.binding.start, "marker");
                Node::Control(Control::new(token.binding, root.clone()))
            }
        })
        .collect();
    Some(nodes)
}

fn rewrite_children(children: &mut Vec<Node>, root: &RootHandle) -> usize {
    let mut created = 0;
    let mut index = 0;

    while index < children.len() {
        if let Node::Container(container) = &mut children[index] {
            created += rewrite_children(&mut container.children, root);
            index += 1;
            continue;
        }

        let replacement = match &children[index] {
            Node::Text(text) => rewrite_text(text, root),
            _ => None,
        };

        match replacement {
            Some(nodes) => {
                let width = nodes.len();
                created += nodes.iter().filter(|n| matches!(n, Node::Control(_))).count();
                children.splice(index..=index, nodes);
                index += width;
            }
            None => index += 1,
        }
    }

    created
}
