//! # Renderable Nodes
//!
//! A host-independent stand-in for a rendered document fragment.
//!
//! ```text
//! Node (enum)
//!   ├── Text(String)            text-bearing node, the only kind the rewriter edits
//!   ├── Container               element with ordered children, never replaced
//!   │     ├── tag: String
//!   │     └── children: Vec<Node>
//!   └── Control                 produced 1:1 from a marker
//!         ├── binding: MarkerBinding
//!         └── root: RootHandle  rendering root captured when the fragment was scanned
//! ```

use std::fmt;
use std::rc::Rc;

use crate::marker::MarkerBinding;
use crate::playback::RenderRoot;

/// Shared, immutable reference to the rendering root a control resolves players in.
pub type RootHandle = Rc<dyn RenderRoot>;

/// Interactive control substituted for a marker.
#[derive(Clone)]
pub struct Control {
    binding: MarkerBinding,
    root: RootHandle,
}

impl Control {
    pub fn new(binding: MarkerBinding, root: RootHandle) -> Self {
        Self { binding, root }
    }

    pub fn binding(&self) -> &MarkerBinding {
        &self.binding
    }

    pub fn root(&self) -> &RootHandle {
        &self.root
    }

    pub fn label(&self) -> String {
        self.binding.label()
    }

    /// True when this control was scanned under `root`.
    pub fn is_bound_to(&self, root: &RootHandle) -> bool {
        Rc::ptr_eq(&self.root, root)
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Control {
    fn eq(&self, other: &Self) -> bool {
        self.binding == other.binding && Rc::ptr_eq(&self.root, &other.root)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub tag: String,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Container(Container),
    Control(Control),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn container(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Container(Container {
            tag: tag.into(),
            children,
        })
    }

    /// Concatenated text as a DOM `textContent` would report it,
    /// control labels included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, true);
        out
    }

    /// Concatenated text of the text-bearing nodes only.
    pub fn literal_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out, false);
        out
    }

    fn collect_text(&self, out: &mut String, with_labels: bool) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Container(container) => {
                for child in &container.children {
                    child.collect_text(out, with_labels);
                }
            }
            Node::Control(control) => {
                if with_labels {
                    out.push_str(&control.label());
                }
            }
        }
    }

    /// Every control in the subtree, in document order.
    pub fn controls(&self) -> Vec<&Control> {
        let mut found = Vec::new();
        self.collect_controls(&mut found);
        found
    }

    fn collect_controls<'a>(&'a self, found: &mut Vec<&'a Control>) {
        match self {
            Node::Text(_) => {}
            Node::Container(container) => {
                for child in &container.children {
                    child.collect_controls(found);
                }
            }
            Node::Control(control) => found.push(control),
        }
    }
}

/// Build a fragment from raw note text: one `p` per blank-line separated
/// paragraph, inside a `div`.
pub fn fragment_from_text(source: &str) -> Node {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(Node::container("p", vec![Node::text(current.join("\n"))]));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(Node::container("p", vec![Node::text(current.join("\n"))]));
    }

    Node::container("div", paragraphs)
}
