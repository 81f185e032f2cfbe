//! Parsed document tree.
//!
//! The input page is parsed once by html5ever into an [`ArenaDom`]. Every
//! later pass addresses nodes by [`ArenaNodeId`], so sections can be
//! indexed, rewritten and finally cloned into output pages without holding
//! borrowed references across passes.
//!
//! # Example
//!
//! ```
//! use htmlchunk::dom::{parse_html, serialize_node, SelectorSet};
//!
//! let dom = parse_html(r#"<div id="content"><h2 id="intro">1. Intro</h2></div>"#);
//! let headings = SelectorSet::parse("h2").unwrap().select(&dom, dom.document());
//!
//! assert_eq!(dom.text_of(headings[0]), "1. Intro");
//! assert_eq!(serialize_node(&dom, headings[0]), r#"<h2 id="intro">1. Intro</h2>"#);
//! ```

mod arena;
mod element_ref;
mod select;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use element_ref::{ChunkSelectors, ElementRef};
pub use select::SelectorSet;
pub use serialize::{escape_attr, escape_text, serialize_document, serialize_node};

use std::path::Path;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use tracing::debug;

use crate::error::{Error, Result};
use tree_sink::ArenaSink;

/// Parse an HTML string into an arena DOM.
///
/// Parsing never fails: like a browser, html5ever repairs malformed markup.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    if result.parse_errors() > 0 {
        debug!(errors = result.parse_errors(), "recovered from HTML parse errors");
    }
    result.into_dom()
}

/// Parse HTML bytes, detecting the encoding.
///
/// UTF-8 is tried first, then any `<?xml encoding>` or `<meta charset>`
/// declaration, then Windows-1252.
pub fn parse_html_bytes(html: &[u8]) -> ArenaDom {
    let hint_encoding = crate::util::sniff_encoding(html);
    let html_str = crate::util::decode_text(html, hint_encoding);
    parse_html(&html_str)
}

/// Read and parse the monolithic input document.
///
/// A missing or unreadable file is fatal.
pub fn load_document(path: impl AsRef<Path>) -> Result<ArenaDom> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let dom = parse_html_bytes(&bytes);
    debug!(path = %path.display(), nodes = dom.len(), "loaded document");
    Ok(dom)
}
