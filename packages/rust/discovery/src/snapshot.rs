//! Static document tree over saved HTML.
//!
//! A snapshot is what a live page looked like at capture time. Layout is not
//! available, so an element counts as rendered unless it or an ancestor is
//! hidden by the `hidden` attribute, `aria-hidden="true"`, or an inline
//! `display: none`. Nothing can load or expand, so interactions are recorded
//! and otherwise ignored.
//!
//! The parsed document is flattened once into an element arena plus a token
//! stream of open/close/text events. All walks over it are iterative, so
//! nesting depth is bounded only by memory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{trace, warn};
use url::Url;

use classfetch_shared::Result;

use crate::dom::DocumentTree;

/// Elements whose contents never contribute to rendered text.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start on their own line in rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// An interaction a caller attempted on the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotInteraction {
    Scroll(usize),
    Activate(usize),
}

#[derive(Debug)]
enum Token {
    Open(usize),
    Close(usize),
    Text(String),
}

#[derive(Debug)]
struct SnapshotElement {
    name: String,
    attrs: HashMap<String, String>,
    /// Hidden by its own attributes.
    hidden: bool,
    /// Neither it nor any ancestor is hidden.
    rendered: bool,
    /// Index of the last element in this element's subtree.
    last_descendant: usize,
    open_token: usize,
    close_token: usize,
}

impl SnapshotElement {
    fn omitted_from_text(&self) -> bool {
        self.hidden || SKIP_TAGS.contains(&self.name.as_str())
    }

    fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.name.as_str())
    }
}

/// A [`DocumentTree`] over a parsed HTML capture.
///
/// Element handles are document-order indices. Each distinct selector is
/// evaluated once against the document and its matches are kept.
#[derive(Debug)]
pub struct SnapshotTree {
    source: String,
    base_url: Option<Url>,
    elements: Vec<SnapshotElement>,
    tokens: Vec<Token>,
    matches: Mutex<HashMap<String, Vec<usize>>>,
    interactions: Mutex<Vec<SnapshotInteraction>>,
}

impl SnapshotTree {
    /// Parse an HTML capture. Relative hrefs resolve against `base_url`.
    pub fn parse(html: &str, base_url: Option<Url>) -> Self {
        let doc = Html::parse_document(html);
        let (elements, tokens) = flatten(&doc);

        trace!(elements = elements.len(), tokens = tokens.len(), "snapshot parsed");

        Self {
            source: html.to_string(),
            base_url,
            elements,
            tokens,
            matches: Mutex::new(HashMap::new()),
            interactions: Mutex::new(Vec::new()),
        }
    }

    /// Number of elements in the snapshot.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Interactions attempted so far, in order.
    pub fn interactions(&self) -> Vec<SnapshotInteraction> {
        self.interactions
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn record(&self, interaction: SnapshotInteraction) {
        if let Ok(mut log) = self.interactions.lock() {
            log.push(interaction);
        }
    }

    /// Run `f` over the sorted indices of elements matching `selector`.
    fn with_matches<R>(&self, selector: &str, f: impl FnOnce(&[usize]) -> R) -> R {
        let Ok(mut cache) = self.matches.lock() else {
            return f(&self.evaluate(selector));
        };
        if !cache.contains_key(selector) {
            let found = self.evaluate(selector);
            cache.insert(selector.to_string(), found);
        }
        f(cache.get(selector).map(Vec::as_slice).unwrap_or_default())
    }

    /// Indices of elements matching `selector`, in document order.
    fn evaluate(&self, selector: &str) -> Vec<usize> {
        let sel = match Selector::parse(selector) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(selector, error = %e, "invalid selector");
                return Vec::new();
            }
        };

        trace!(selector, "evaluating selector");
        let doc = Html::parse_document(&self.source);
        doc.root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
            .filter(|(_, el)| sel.matches(el))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Approximate `innerText`: visible text, one line per block.
    fn rendered_text(&self, element: &SnapshotElement) -> String {
        let mut raw = String::new();
        let mut pos = element.open_token + 1;

        while pos < element.close_token {
            match &self.tokens[pos] {
                Token::Text(text) => raw.push_str(text),
                Token::Open(child) => {
                    let child = &self.elements[*child];
                    if child.name == "br" {
                        raw.push('\n');
                        pos = child.close_token;
                    } else if child.omitted_from_text() {
                        pos = child.close_token;
                    } else if child.is_block() {
                        raw.push('\n');
                    }
                }
                Token::Close(child) => {
                    if self.elements[*child].is_block() {
                        raw.push('\n');
                    }
                }
            }
            pos += 1;
        }

        raw.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl DocumentTree for SnapshotTree {
    type Element = usize;

    async fn query_all(&self, selector: &str) -> Vec<usize> {
        self.with_matches(selector, |found| found.to_vec())
    }

    async fn query_within(&self, element: &usize, selector: &str) -> Vec<usize> {
        let Some(scope) = self.elements.get(*element) else {
            return Vec::new();
        };
        // descendants occupy the index range just after the element
        self.with_matches(selector, |found| {
            let start = found.partition_point(|idx| idx <= element);
            let end = found.partition_point(|idx| *idx <= scope.last_descendant);
            found[start..end].to_vec()
        })
    }

    async fn href(&self, element: &usize) -> Option<String> {
        let raw = self.elements.get(*element)?.attrs.get("href")?;
        match &self.base_url {
            Some(base) => base.join(raw).ok().map(|u| u.to_string()),
            None => Some(raw.clone()),
        }
    }

    async fn inner_text(&self, element: &usize) -> String {
        self.elements
            .get(*element)
            .map(|e| self.rendered_text(e))
            .unwrap_or_default()
    }

    async fn attribute(&self, element: &usize, name: &str) -> Option<String> {
        self.elements.get(*element)?.attrs.get(name).cloned()
    }

    async fn is_attached(&self, element: &usize) -> bool {
        *element < self.elements.len()
    }

    async fn has_render_box(&self, element: &usize) -> bool {
        self.elements.get(*element).is_some_and(|e| e.rendered)
    }

    async fn scroll_into_view(&self, element: &usize) -> Result<()> {
        self.record(SnapshotInteraction::Scroll(*element));
        Ok(())
    }

    async fn activate(&self, element: &usize) -> Result<()> {
        self.record(SnapshotInteraction::Activate(*element));
        Ok(())
    }
}

/// Flatten the document in pre-order with an explicit stack of open elements.
///
/// Element indices follow `descendants()` order, the same order selector
/// evaluation enumerates.
fn flatten(doc: &Html) -> (Vec<SnapshotElement>, Vec<Token>) {
    let mut elements: Vec<SnapshotElement> = Vec::new();
    let mut tokens = Vec::new();
    let mut open: Vec<(ElementRef<'_>, usize)> = Vec::new();

    for node in doc.root_element().descendants() {
        let parent_id = node.parent().map(|p| p.id());
        while let Some(&(ancestor, idx)) = open.last() {
            if Some(ancestor.id()) == parent_id {
                break;
            }
            open.pop();
            close(idx, &mut elements, &mut tokens);
        }

        match node.value() {
            Node::Text(text) => {
                let text: &str = text;
                tokens.push(Token::Text(text.to_owned()));
            }
            Node::Element(el) => {
                let Some(el_ref) = ElementRef::wrap(node) else {
                    continue;
                };
                let idx = elements.len();
                let hidden = is_hidden(el);
                let parent_rendered = open
                    .last()
                    .is_none_or(|(_, parent)| elements[*parent].rendered);

                elements.push(SnapshotElement {
                    name: el.name().to_string(),
                    attrs: el
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    hidden,
                    rendered: parent_rendered && !hidden,
                    last_descendant: idx,
                    open_token: tokens.len(),
                    close_token: tokens.len(),
                });
                tokens.push(Token::Open(idx));
                open.push((el_ref, idx));
            }
            _ => {}
        }
    }

    while let Some((_, idx)) = open.pop() {
        close(idx, &mut elements, &mut tokens);
    }

    (elements, tokens)
}

fn close(idx: usize, elements: &mut [SnapshotElement], tokens: &mut Vec<Token>) {
    let last = elements.len() - 1;
    let element = &mut elements[idx];
    element.last_descendant = last;
    element.close_token = tokens.len();
    tokens.push(Token::Close(idx));
}

fn is_hidden(el: &scraper::node::Element) -> bool {
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    el.attr("style").is_some_and(|style| {
        let compact: String = style
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();
        compact.contains("display:none")
    })
}
