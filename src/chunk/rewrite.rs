//! Retarget in-page links at the pages their anchors end up on.

use std::collections::BTreeSet;

use tracing::debug;

use super::index::{Anchor, DocumentIndex};
use crate::config::ChunkConfig;
use crate::dom::ArenaDom;

/// Outcome of a rewrite pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Number of hrefs changed.
    pub rewritten: usize,
    /// Link targets not registered as a part, chapter or sub-section,
    /// sorted and de-duplicated. Those links are left as they were.
    pub unresolved: Vec<String>,
}

/// New href for a link to `target`, if the target is a known anchor.
///
/// Parts and chapters resolve to their page; sub-sections resolve to the
/// owning chapter's page followed by the original fragment.
pub fn resolve_href(
    index: &DocumentIndex,
    config: &ChunkConfig,
    target: &str,
    fragment: &str,
) -> Option<String> {
    match index.anchor(target)? {
        Anchor::Part(i) => Some(config.page_filename(&index.parts[i].id)),
        Anchor::Chapter(i) => Some(config.page_filename(&index.chapters[i].id)),
        Anchor::Subsection { chapter } => {
            let page = config.page_filename(&index.chapters[chapter].id);
            Some(format!("{page}{fragment}"))
        }
    }
}

/// Rewrite every recorded in-page link.
///
/// Must run before any page is rendered: part pages reuse the document's
/// own table-of-contents listing, and its links have to point at pages.
pub fn rewrite_anchors(
    dom: &mut ArenaDom,
    index: &DocumentIndex,
    config: &ChunkConfig,
) -> RewriteReport {
    let mut rewritten = 0;
    let mut unresolved = BTreeSet::new();

    for link in &index.links {
        match resolve_href(index, config, &link.target, &link.fragment) {
            Some(href) => {
                dom.set_attr(link.node, "href", &href);
                rewritten += 1;
            }
            None => {
                unresolved.insert(link.target.as_str());
            }
        }
    }

    debug!(rewritten, unresolved = unresolved.len(), "rewrote anchors");
    RewriteReport {
        rewritten,
        unresolved: unresolved.into_iter().map(str::to_string).collect(),
    }
}
