//! Page expansion controller.
//!
//! Drives a live feed into its fully-expanded state: keeps pressing "load
//! more" until the control stops showing up, then opens every collapsed item
//! one at a time, running an extraction pass after each so attachments are
//! attributed to the expansion that revealed them. Every step is sequential;
//! the only suspension points are the clock's poll and settle waits.

use tracing::{debug, info, instrument, trace, warn};

use classfetch_shared::ExpansionConfig;

use crate::accumulator::Accumulator;
use crate::clock::Clock;
use crate::dom::{DocumentTree, bring_into_view_and_activate};
use crate::extract::extract_into;

/// What one expansion run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// "Load more" activations performed.
    pub load_more_rounds: u32,
    /// Whether the run stopped pressing "load more" because of the round cap.
    pub hit_round_cap: bool,
    /// Collapsed items found after loading finished.
    pub items_found: usize,
    /// Collapsed items successfully activated.
    pub items_expanded: usize,
    /// Collapsed items that vanished, hid, or refused activation.
    pub items_skipped: usize,
    /// Extraction passes run.
    pub passes: usize,
}

/// Expand the page and accumulate every attachment it reveals into `acc`.
///
/// Never fails: missing controls end the load phase, stale items are
/// skipped, and rejected interactions are logged and skipped.
#[instrument(skip_all)]
pub async fn expand_and_extract<T, C>(
    tree: &T,
    clock: &C,
    config: &ExpansionConfig,
    acc: &mut Accumulator,
) -> ExpansionStats
where
    T: DocumentTree + ?Sized,
    C: Clock + ?Sized,
{
    let mut stats = ExpansionStats::default();

    // Phase 1: load every page of top-level items.
    loop {
        let Some(control) = poll_for_visible(tree, clock, config).await else {
            debug!(rounds = stats.load_more_rounds, "no load-more control, top-level items loaded");
            break;
        };

        if stats.load_more_rounds >= config.max_load_more_rounds {
            warn!(
                rounds = stats.load_more_rounds,
                "load-more control still present after round cap, moving on"
            );
            stats.hit_round_cap = true;
            break;
        }

        if let Err(e) = bring_into_view_and_activate(tree, &control).await {
            warn!(error = %e, "load-more activation failed, moving on");
            break;
        }
        stats.load_more_rounds += 1;
        clock.sleep(config.load_more_settle).await;
    }

    // Phase 2: expand collapsed items, extracting after each.
    let items = tree.query_all(&config.collapsed_item_selector).await;
    stats.items_found = items.len();

    extract_into(tree, &config.link_selector, acc).await;
    stats.passes += 1;

    for (index, item) in items.iter().enumerate() {
        if !tree.is_visible(item).await {
            debug!(index, "collapsed item detached or hidden, skipping");
            stats.items_skipped += 1;
            continue;
        }

        if let Err(e) = bring_into_view_and_activate(tree, item).await {
            warn!(index, error = %e, "could not expand item, skipping");
            stats.items_skipped += 1;
            continue;
        }
        stats.items_expanded += 1;

        clock.sleep(config.item_settle).await;

        let pass = extract_into(tree, &config.link_selector, acc).await;
        stats.passes += 1;
        trace!(index, added = pass.added, "item expanded");
    }

    // Phase 3: catch anything that settled late.
    extract_into(tree, &config.link_selector, acc).await;
    stats.passes += 1;

    info!(
        rounds = stats.load_more_rounds,
        items = stats.items_found,
        expanded = stats.items_expanded,
        skipped = stats.items_skipped,
        attachments = acc.len(),
        "expansion complete"
    );

    stats
}

/// Poll for a visible "load more" control, waiting `poll_interval` after each miss.
async fn poll_for_visible<T, C>(tree: &T, clock: &C, config: &ExpansionConfig) -> Option<T::Element>
where
    T: DocumentTree + ?Sized,
    C: Clock + ?Sized,
{
    for attempt in 1..=config.poll_attempts {
        for candidate in tree.query_all(&config.load_more_selector).await {
            if tree.is_visible(&candidate).await {
                return Some(candidate);
            }
        }
        trace!(attempt, "load-more control not visible yet");
        clock.sleep(config.poll_interval).await;
    }
    None
}
