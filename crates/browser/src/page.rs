//! Text extraction from fetched documents.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use url::Url;

/// Elements whose content is never shown as page text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that do not break the text flow.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

/// Parse an HTML document.
fn parse(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

fn element_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum Step {
    Enter(Handle),
    /// Leaving a block element.
    Break,
}

/// Visit text nodes in document order, calling `on_break` at block
/// boundaries. Hidden elements are skipped with their content.
fn walk_text(root: &Handle, mut on_text: impl FnMut(&str), mut on_break: impl FnMut()) {
    let mut stack = vec![Step::Enter(root.clone())];

    while let Some(step) = stack.pop() {
        let node = match step {
            Step::Enter(node) => node,
            Step::Break => {
                on_break();
                continue;
            }
        };

        match &node.data {
            NodeData::Text { contents } => on_text(&contents.borrow()),
            NodeData::Element { name, .. } => {
                let name = &*name.local;
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                if !INLINE_ELEMENTS.contains(&name) {
                    on_break();
                    stack.push(Step::Break);
                }
                stack.extend(node.children.borrow().iter().rev().cloned().map(Step::Enter));
            }
            NodeData::Document => {
                stack.extend(node.children.borrow().iter().rev().cloned().map(Step::Enter));
            }
            _ => {}
        }
    }
}

/// First element named `name` in document order.
fn find_element(root: &Handle, name: &str) -> Option<Handle> {
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        if element_name(&node) == Some(name) {
            return Some(node);
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}

/// Text of the first `<title>` element, else the URL.
pub fn page_title(html: &str, url: &Url) -> String {
    let dom = parse(html);
    let title = find_element(&dom.document, "title").map(|title| {
        let mut text = String::new();
        walk_text(&title, |t| text.push_str(t), || {});
        collapse_whitespace(&text)
    });

    match title {
        Some(title) if !title.is_empty() => title,
        _ => url.to_string(),
    }
}

/// Visible text of an HTML document, with entities decoded, scripts and
/// styles dropped, and whitespace collapsed.
pub fn plain_text(html: &str) -> String {
    let dom = parse(html);
    let text = std::cell::RefCell::new(String::with_capacity(html.len()));
    walk_text(
        &dom.document,
        |t| text.borrow_mut().push_str(t),
        || text.borrow_mut().push(' '),
    );
    collapse_whitespace(&text.into_inner())
}
