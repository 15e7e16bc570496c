//! Scriptable in-memory page for exercising extraction and expansion.
//!
//! Nodes are identified by their index. The page understands three selectors
//! ([`FakePage::LINKS`], [`FakePage::LOAD_MORE`], [`FakePage::COLLAPSED`])
//! plus the title-hint selector used by the title chain. Activations mutate
//! the page the way a feed does: "load more" appends links, expanding an item
//! reveals its children, possibly only after simulated time passes.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use classfetch_shared::{ClassFetchError, ExpansionConfig, Result};

use crate::clock::{Clock, ManualClock};
use crate::dom::DocumentTree;
use crate::title::TITLE_HINT_SELECTOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interaction {
    Scroll(usize),
    Activate(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Link,
    LoadMore,
    Item,
    TitleHint,
}

#[derive(Debug, Default)]
enum OnActivate {
    #[default]
    Nothing,
    LoadMore {
        batches: VecDeque<Vec<(String, String)>>,
        sticky: bool,
    },
    Expand {
        reveal_after: Duration,
        detach: Vec<usize>,
    },
}

#[derive(Debug)]
struct Node {
    kind: Kind,
    text: String,
    href: Option<String>,
    attrs: HashMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
    attached: bool,
    rendered: bool,
    fail_activation: bool,
    on_activate: OnActivate,
}

impl Node {
    fn new(kind: Kind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            href: None,
            attrs: HashMap::new(),
            parent: None,
            children: Vec::new(),
            attached: true,
            rendered: true,
            fail_activation: false,
            on_activate: OnActivate::Nothing,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: Vec<Node>,
    now: Duration,
    pending_reveals: Vec<(Duration, usize)>,
    interactions: Vec<Interaction>,
}

impl State {
    fn push(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn add_child(&mut self, parent: usize, mut node: Node) -> usize {
        node.parent = Some(parent);
        let id = self.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    fn rendered(&self, id: usize) -> bool {
        let mut current = Some(id);
        while let Some(idx) = current {
            let node = &self.nodes[idx];
            if !node.rendered {
                return false;
            }
            current = node.parent;
        }
        true
    }

    fn text(&self, id: usize) -> String {
        let node = &self.nodes[id];
        let mut parts = vec![node.text.clone()];
        parts.extend(
            node.children
                .iter()
                .filter(|c| self.nodes[**c].rendered)
                .map(|c| self.text(*c)),
        );
        parts.retain(|p| !p.is_empty());
        parts.join("\n")
    }

    fn apply_due_reveals(&mut self) {
        let now = self.now;
        let (due, later): (Vec<_>, Vec<_>) = self
            .pending_reveals
            .drain(..)
            .partition(|(at, _)| *at <= now);
        self.pending_reveals = later;
        for (_, id) in due {
            self.nodes[id].rendered = true;
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakePage {
    state: Mutex<State>,
}

impl FakePage {
    pub const LINKS: &'static str = "a";
    pub const LOAD_MORE: &'static str = "load-more";
    pub const COLLAPSED: &'static str = "collapsed";

    pub fn new() -> Self {
        Self::default()
    }

    /// Expansion config wired to this page's selectors, with default timings.
    pub fn config() -> ExpansionConfig {
        ExpansionConfig {
            load_more_selector: Self::LOAD_MORE.into(),
            collapsed_item_selector: Self::COLLAPSED.into(),
            link_selector: Self::LINKS.into(),
            ..ExpansionConfig::default()
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().expect("fake page lock");
        f(&mut state)
    }

    /// Top-level visible link.
    pub fn link(&self, href: &str, text: &str) -> usize {
        self.with(|s| {
            let mut node = Node::new(Kind::Link, text);
            node.href = Some(href.to_string());
            s.push(node)
        })
    }

    /// Collapsed item whose children are revealed as soon as it is activated.
    pub fn collapsed_item(&self) -> usize {
        self.collapsed_item_revealing_after(Duration::ZERO)
    }

    /// Collapsed item whose children only render `delay` after activation.
    pub fn collapsed_item_revealing_after(&self, delay: Duration) -> usize {
        self.with(|s| {
            let mut node = Node::new(Kind::Item, "");
            node.attrs.insert("aria-expanded".into(), "false".into());
            node.on_activate = OnActivate::Expand {
                reveal_after: delay,
                detach: Vec::new(),
            };
            s.push(node)
        })
    }

    /// Link inside a collapsed item, hidden until the item expands.
    pub fn hidden_link_in(&self, item: usize, href: &str, text: &str) -> usize {
        self.with(|s| {
            let mut node = Node::new(Kind::Link, text);
            node.href = Some(href.to_string());
            node.rendered = false;
            s.add_child(item, node)
        })
    }

    /// Descendant carrying a title-like class.
    pub fn title_child(&self, link: usize, text: &str) -> usize {
        self.with(|s| s.add_child(link, Node::new(Kind::TitleHint, text)))
    }

    /// "Load more" control that appends one batch of `(href, text)` links per
    /// activation and detaches once the batches run out, unless `sticky`.
    pub fn load_more(&self, batches: Vec<Vec<(&str, &str)>>, sticky: bool) -> usize {
        self.with(|s| {
            let mut node = Node::new(Kind::LoadMore, "View more");
            node.on_activate = OnActivate::LoadMore {
                batches: batches
                    .into_iter()
                    .map(|b| {
                        b.into_iter()
                            .map(|(h, t)| (h.to_string(), t.to_string()))
                            .collect()
                    })
                    .collect(),
                sticky,
            };
            s.push(node)
        })
    }

    /// When `item` expands, `other` is removed from the document.
    pub fn on_expand_detach(&self, item: usize, other: usize) {
        self.with(|s| {
            if let OnActivate::Expand { detach, .. } = &mut s.nodes[item].on_activate {
                detach.push(other);
            }
        });
    }

    pub fn set_rendered(&self, id: usize, rendered: bool) {
        self.with(|s| s.nodes[id].rendered = rendered);
    }

    pub fn set_attribute(&self, id: usize, name: &str, value: &str) {
        self.with(|s| {
            s.nodes[id].attrs.insert(name.into(), value.into());
        });
    }

    pub fn fail_activation(&self, id: usize) {
        self.with(|s| s.nodes[id].fail_activation = true);
    }

    pub fn interactions(&self) -> Vec<Interaction> {
        self.with(|s| s.interactions.clone())
    }

    pub fn activations(&self) -> Vec<usize> {
        self.interactions()
            .into_iter()
            .filter_map(|i| match i {
                Interaction::Activate(id) => Some(id),
                Interaction::Scroll(_) => None,
            })
            .collect()
    }

    /// Move simulated time forward, rendering anything that settled.
    pub fn advance(&self, by: Duration) {
        self.with(|s| {
            s.now += by;
            s.apply_due_reveals();
        });
    }
}

#[async_trait]
impl DocumentTree for FakePage {
    type Element = usize;

    async fn query_all(&self, selector: &str) -> Vec<usize> {
        self.with(|s| {
            (0..s.nodes.len())
                .filter(|id| {
                    let node = &s.nodes[*id];
                    node.attached
                        && match selector {
                            Self::LINKS => node.kind == Kind::Link,
                            Self::LOAD_MORE => node.kind == Kind::LoadMore,
                            Self::COLLAPSED => {
                                node.attrs.get("aria-expanded").map(String::as_str)
                                    == Some("false")
                            }
                            _ => false,
                        }
                })
                .collect()
        })
    }

    async fn query_within(&self, element: &usize, selector: &str) -> Vec<usize> {
        if selector != TITLE_HINT_SELECTOR {
            return Vec::new();
        }
        self.with(|s| {
            s.nodes[*element]
                .children
                .iter()
                .copied()
                .filter(|c| s.nodes[*c].kind == Kind::TitleHint)
                .collect()
        })
    }

    async fn href(&self, element: &usize) -> Option<String> {
        self.with(|s| s.nodes[*element].href.clone())
    }

    async fn inner_text(&self, element: &usize) -> String {
        self.with(|s| s.text(*element))
    }

    async fn attribute(&self, element: &usize, name: &str) -> Option<String> {
        self.with(|s| s.nodes[*element].attrs.get(name).cloned())
    }

    async fn is_attached(&self, element: &usize) -> bool {
        self.with(|s| s.nodes[*element].attached)
    }

    async fn has_render_box(&self, element: &usize) -> bool {
        self.with(|s| s.rendered(*element))
    }

    async fn scroll_into_view(&self, element: &usize) -> Result<()> {
        self.with(|s| s.interactions.push(Interaction::Scroll(*element)));
        Ok(())
    }

    async fn activate(&self, element: &usize) -> Result<()> {
        self.with(|s| {
            let id = *element;
            if s.nodes[id].fail_activation || !s.nodes[id].attached {
                return Err(ClassFetchError::dom(format!("node {id} rejected activation")));
            }
            s.interactions.push(Interaction::Activate(id));

            match std::mem::take(&mut s.nodes[id].on_activate) {
                OnActivate::Nothing => {}
                OnActivate::LoadMore {
                    mut batches,
                    sticky,
                } => {
                    if let Some(batch) = batches.pop_front() {
                        for (href, text) in batch {
                            let mut node = Node::new(Kind::Link, &text);
                            node.href = Some(href);
                            s.push(node);
                        }
                    }
                    if batches.is_empty() && !sticky {
                        s.nodes[id].attached = false;
                    }
                    s.nodes[id].on_activate = OnActivate::LoadMore { batches, sticky };
                }
                OnActivate::Expand {
                    reveal_after,
                    detach,
                } => {
                    s.nodes[id]
                        .attrs
                        .insert("aria-expanded".into(), "true".into());
                    let at = s.now + reveal_after;
                    let children = s.nodes[id].children.clone();
                    s.pending_reveals.extend(children.into_iter().map(|c| (at, c)));
                    s.apply_due_reveals();
                    for other in &detach {
                        s.nodes[*other].attached = false;
                    }
                    s.nodes[id].on_activate = OnActivate::Expand {
                        reveal_after,
                        detach,
                    };
                }
            }
            Ok(())
        })
    }
}

/// Clock that advances the page's simulated time on every wait.
pub(crate) struct FakeClock<'a> {
    page: &'a FakePage,
    inner: ManualClock,
}

impl<'a> FakeClock<'a> {
    pub fn new(page: &'a FakePage) -> Self {
        Self {
            page,
            inner: ManualClock::new(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.elapsed()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.sleeps()
    }
}

#[async_trait]
impl<'a> Clock for FakeClock<'a> {
    async fn sleep(&self, duration: Duration) {
        self.inner.sleep(duration).await;
        self.page.advance(duration);
    }
}
