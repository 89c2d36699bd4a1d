use crate::node::{Control, Node};

/// Class carried by every rendered marker control.
pub const CONTROL_CLASS: &str = "audiomark-control";

/// Serialize a rendered fragment to HTML.
pub fn to_html(node: &Node) -> String {
    let mut html = String::new();
    write_node(&mut html, node);
    html
}

fn write_node(html: &mut String, node: &Node) {
    match node {
        Node::Text(text) => html.push_str(&escape_html(text)),
        Node::Container(container) => {
            html.push_str(&format!("<{}>", container.tag));
            for child in &container.children {
                write_node(html, child);
            }
            html.push_str(&format!("</{}>", container.tag));
        }
        Node::Control(control) => html.push_str(&control_to_html(control)),
    }
}

/// Markup for one control.
///
/// ```
/// use std::rc::Rc;
/// use audiomark::html::control_to_html;
/// use audiomark::playback::memory::MemoryRoot;
/// use audiomark::{Control, MarkerBinding};
///
/// let control = Control::new(MarkerBinding::new("a&b.mp3", 5, Some(9)), Rc::new(MemoryRoot::new()));
/// assert_eq!(
///     control_to_html(&control),
///     r#"<button class="audiomark-control" data-audio-file="a&amp;b.mp3" data-start="5" data-end="9">Play a&amp;b.mp3 @ 5s</button>"#
/// );
/// ```
pub fn control_to_html(control: &Control) -> String {
    let binding = control.binding();
    let mut html = String::new();

    html.push_str(&format!(
        "<button class=\"{}\" data-audio-file=\"{}\" data-start=\"{}\"",
        CONTROL_CLASS,
        escape_html(&binding.name),
        binding.start
    ));
    if let Some(end) = binding.end {
        html.push_str(&format!(" data-end=\"{}\"", end));
    }
    html.push('>');
    html.push_str(&escape_html(&control.label()));
    html.push_str("</button>");

    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
