//! Message container locator — ordered strategies, first hit wins.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Enumerate candidate message containers in document order.
///
/// Strategies are tried in order; the first one yielding at least one
/// element decides the result. Strategies are never merged, so overlapping
/// selectors cannot produce duplicate or mismatched counts. An empty
/// result means "no conversation present", which the caller may retry
/// within its content-readiness window.
pub fn locate_containers<'a>(doc: &'a Html, strategies: &[&str]) -> Vec<ElementRef<'a>> {
    for strategy in strategies {
        if let Ok(selector) = Selector::parse(strategy) {
            let found: Vec<ElementRef<'a>> = doc.select(&selector).collect();
            if !found.is_empty() {
                debug!(strategy, count = found.len(), "container strategy matched");
                return found;
            }
        }
    }

    debug!("no container strategy matched");
    Vec::new()
}
