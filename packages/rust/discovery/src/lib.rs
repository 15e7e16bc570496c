//! Attachment discovery over a rendered coursework feed.
//!
//! This crate provides:
//! - [`DocumentTree`]: the narrow view of a live page the engine drives
//! - [`expand_and_extract`]: the page-expansion controller
//! - [`extract_fresh`] / [`extract_into`]: link extraction, titling, and classification
//! - [`SnapshotTree`]: a static tree over saved HTML
//! - [`discover`]: one complete discovery run

mod accumulator;
mod classify;
mod clock;
mod dom;
mod expand;
mod extract;
mod snapshot;
mod title;

#[cfg(test)]
mod fake;

use tracing::{info, instrument};

use classfetch_shared::{Attachment, ExpansionConfig};

pub use accumulator::Accumulator;
pub use classify::classify;
pub use clock::{Clock, ManualClock, TokioClock};
pub use dom::DocumentTree;
pub use expand::{ExpansionStats, expand_and_extract};
pub use extract::{DOCUMENT_HOSTS, PassStats, extract_fresh, extract_into};
pub use snapshot::{SnapshotInteraction, SnapshotTree};
pub use title::{DerivedTitle, TitleSource, derive_title};

/// Run one full discovery: expand the page, extracting as it goes, and
/// return every attachment found in discovery order.
///
/// The accumulator lives exactly as long as this call.
#[instrument(skip_all)]
pub async fn discover<T, C>(tree: &T, clock: &C, config: &ExpansionConfig) -> Vec<Attachment>
where
    T: DocumentTree + ?Sized,
    C: Clock + ?Sized,
{
    let mut acc = Accumulator::new();
    let stats = expand_and_extract(tree, clock, config, &mut acc).await;

    info!(
        attachments = acc.len(),
        passes = stats.passes,
        "discovery run complete"
    );

    acc.into_attachments()
}
