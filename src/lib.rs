//! # htmlchunk
//!
//! Split a single-file HTML book into one page per part and per chapter.
//!
//! The input is the kind of document Asciidoctor produces for a book:
//! part headings, numbered chapter sections and a table of contents, all in
//! one file. Every output page keeps the original document shell (head,
//! header, footer) and replaces the content container with one section.
//! In-page links are rewritten to point at the right page, and chapter
//! pages get previous/next navigation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use htmlchunk::{ChunkConfig, run};
//!
//! // Reads build/handbook.html and writes build/<id>.html per section.
//! let report = run("build", "handbook", &ChunkConfig::default()).unwrap();
//! println!("{} pages written", report.written.len());
//! ```
//!
//! ## Step by step
//!
//! ```
//! use htmlchunk::{ChunkConfig, chunk, parse_html, render_pages};
//!
//! let mut dom = parse_html(r##"
//!     <div id="content">
//!       <div class="sect1"><h2 id="_one">1. One</h2><p>See <a href="#_two">two</a>.</p></div>
//!       <div class="sect1"><h2 id="_two">2. Two</h2></div>
//!     </div>"##);
//! let config = ChunkConfig::default();
//!
//! let chunked = chunk(&mut dom, &config).unwrap();
//! let pages = render_pages(&mut dom, &chunked.index, &config).unwrap();
//!
//! assert_eq!(pages[0].filename, "_one.html");
//! assert!(pages[0].html.contains(r#"<a href="_two.html">two</a>"#));
//! ```

pub mod chunk;
pub mod config;
pub mod dom;
pub mod error;
pub(crate) mod util;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use chunk::{
    ChunkedDocument, DocumentIndex, Page, PageKind, RewriteReport, chunk, render_pages,
    write_pages,
};
pub use config::ChunkConfig;
pub use dom::{ArenaDom, load_document, parse_html};
pub use error::{Error, Result};

/// Outcome of a full [`run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Paths of the written pages, parts first.
    pub written: Vec<PathBuf>,
    pub parts: usize,
    pub chapters: usize,
    pub subsections: usize,
    pub rewritten_links: usize,
    /// Link targets that matched no part, chapter or sub-section.
    pub unresolved: Vec<String>,
}

/// Path of the input document for a base name.
pub fn input_path(dir: impl AsRef<Path>, base: &str) -> PathBuf {
    dir.as_ref().join(format!("{base}.html"))
}

/// Chunk `{out_dir}/{base}.html` into pages written next to it.
///
/// Selectors are checked and the whole document is rendered before the
/// first file is written, so input errors never leave partial output.
pub fn run(out_dir: impl AsRef<Path>, base: &str, config: &ChunkConfig) -> Result<ChunkReport> {
    let out_dir = out_dir.as_ref();
    config.compile()?;

    let path = input_path(out_dir, base);
    info!(path = %path.display(), "chunking document");
    let mut dom = load_document(&path)?;

    let ChunkedDocument { index, report } = chunk(&mut dom, config)?;
    let pages = render_pages(&mut dom, &index, config)?;
    let written = write_pages(&pages, out_dir)?;

    if !report.unresolved.is_empty() {
        warn!(
            count = report.unresolved.len(),
            targets = %report.unresolved.join(", "),
            "links to unknown anchors were left unchanged"
        );
    }
    info!(
        pages = written.len(),
        parts = index.parts.len(),
        chapters = index.chapters.len(),
        rewritten = report.rewritten,
        "done"
    );

    Ok(ChunkReport {
        written,
        parts: index.parts.len(),
        chapters: index.chapters.len(),
        subsections: index.subsection_count(),
        rewritten_links: report.rewritten,
        unresolved: report.unresolved,
    })
}
