//! Attachment extraction from the currently rendered tree.

use tracing::{debug, instrument, trace};
use url::Url;

use classfetch_shared::Attachment;

use crate::accumulator::Accumulator;
use crate::classify::classify;
use crate::dom::DocumentTree;
use crate::title::derive_title;

/// Hosts whose links can be attachments.
pub const DOCUMENT_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];

/// Counters for one extraction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Link elements on a document host.
    pub candidates: usize,
    /// New attachments recorded.
    pub added: usize,
    /// Links whose URL was already recorded.
    pub duplicates: usize,
    /// Links skipped because they have no rendering box.
    pub hidden: usize,
    /// Links no rule could classify.
    pub unclassified: usize,
    /// Links whose href did not parse.
    pub malformed: usize,
}

/// Scrape the tree once into a throwaway accumulator.
#[instrument(skip_all, fields(selector = link_selector))]
pub async fn extract_fresh<T>(tree: &T, link_selector: &str) -> Vec<Attachment>
where
    T: DocumentTree + ?Sized,
{
    let mut acc = Accumulator::new();
    let stats = extract_into(tree, link_selector, &mut acc).await;
    debug!(?stats, "fresh extraction complete");
    acc.into_attachments()
}

/// Run one extraction pass, adding new attachments to `acc`.
///
/// Links are visited in document order. Malformed, off-host, duplicate,
/// hidden, and unclassifiable links are skipped without error.
pub async fn extract_into<T>(tree: &T, link_selector: &str, acc: &mut Accumulator) -> PassStats
where
    T: DocumentTree + ?Sized,
{
    let mut stats = PassStats::default();

    for element in tree.query_all(link_selector).await {
        let Some(href) = tree.href(&element).await else {
            continue;
        };

        let url = match Url::parse(&href) {
            Ok(url) => url,
            Err(e) => {
                debug!(%href, error = %e, "skipping malformed link");
                stats.malformed += 1;
                continue;
            }
        };

        if !is_document_host(&url) {
            continue;
        }
        stats.candidates += 1;

        let canonical = url.to_string();
        if acc.contains(&canonical) {
            trace!(url = %canonical, "already recorded");
            stats.duplicates += 1;
            continue;
        }

        if !tree.is_visible(&element).await {
            debug!(url = %canonical, "skipping link without a rendering box");
            stats.hidden += 1;
            continue;
        }

        let title = derive_title(tree, &element).await;
        let Some(kind) = classify(&url, &title.value) else {
            debug!(url = %canonical, title = %title.value, "no type rule matched, excluding");
            stats.unclassified += 1;
            continue;
        };

        trace!(url = %canonical, title = %title.value, source = ?title.source, %kind, "attachment found");
        acc.insert(Attachment {
            url: canonical,
            title: title.value,
            kind,
        });
        stats.added += 1;
    }

    stats
}

fn is_document_host(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| DOCUMENT_HOSTS.contains(&host))
}
