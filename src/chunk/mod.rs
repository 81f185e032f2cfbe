//! Splitting a book into part and chapter pages.
//!
//! The pipeline runs in a fixed order over one exclusively-owned document:
//!
//! 1. [`index_document`] records parts, chapters, sub-sections and links.
//! 2. [`rewrite_anchors`] points every in-page link at its page.
//! 3. [`render_pages`] builds each page inside the document shell.
//! 4. [`write_pages`] stores the pages on disk.
//!
//! [`chunk`] runs the first two steps.

mod emit;
mod index;
mod nav;
mod rewrite;

pub use emit::{Page, PageKind, render_pages, write_pages};
pub use index::{Anchor, AnchorLink, Chapter, DocumentIndex, Part, chapter_title, index_document};
pub use nav::build_navigation;
pub use rewrite::{RewriteReport, resolve_href, rewrite_anchors};

use crate::config::ChunkConfig;
use crate::dom::ArenaDom;
use crate::error::Result;

/// A document that has been indexed and had its links rewritten.
#[derive(Debug, Clone)]
pub struct ChunkedDocument {
    pub index: DocumentIndex,
    pub report: RewriteReport,
}

/// Index `dom` and rewrite its in-page links.
///
/// The document is ready for [`render_pages`] afterwards.
pub fn chunk(dom: &mut ArenaDom, config: &ChunkConfig) -> Result<ChunkedDocument> {
    let selectors = config.compile()?;
    let index = index_document(dom, config, &selectors)?;
    let report = rewrite_anchors(dom, &index, config);
    Ok(ChunkedDocument { index, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::error::Error;

    #[test]
    fn test_chunk_rewrites_before_rendering() {
        let mut dom = parse_html(
            r##"<a href="#c">toc</a><div id="content"><div class="sect1"><h2 id="c">1. C</h2></div></div>"##,
        );
        let config = ChunkConfig::default();

        let chunked = chunk(&mut dom, &config).unwrap();

        assert_eq!(chunked.report.rewritten, 1);
        assert!(chunked.report.unresolved.is_empty());
        let link = dom.find_by_tag("a").unwrap();
        assert_eq!(dom.get_attr(link, "href"), Some("c.html"));
    }

    #[test]
    fn test_chunk_fails_without_content() {
        let mut dom = parse_html("<p>plain</p>");
        let err = chunk(&mut dom, &ChunkConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MissingElement(_)));
    }
}
