//! Page assembly and output.
//!
//! Every page reuses the whole input document as its shell: the content
//! container is emptied and refilled with copies of one section, then the
//! full tree is serialized. Headers, stylesheets and the document's own
//! table of contents (with links already rewritten) carry over unchanged.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::index::{Chapter, DocumentIndex, Part};
use super::nav::build_navigation;
use crate::config::ChunkConfig;
use crate::dom::{ArenaDom, ArenaNodeId, serialize_document};
use crate::error::{Error, Result};

/// What a page was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Part,
    Chapter,
}

/// One rendered output page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Id of the part or chapter.
    pub id: String,
    pub kind: PageKind,
    pub filename: String,
    pub html: String,
}

/// Render all part pages, then all chapter pages, in document order.
///
/// Anchor rewriting must already have run. The content container is left
/// empty afterwards.
pub fn render_pages(
    dom: &mut ArenaDom,
    index: &DocumentIndex,
    config: &ChunkConfig,
) -> Result<Vec<Page>> {
    let content = index
        .content
        .ok_or_else(|| Error::MissingElement(format!("#{}", config.content_id)))?;
    dom.clear_children(content);

    let mut pages = Vec::with_capacity(index.page_count());
    for part in &index.parts {
        let nodes = part_content(dom, part);
        pages.push(render_page(dom, content, &nodes, config, &part.id, PageKind::Part));
    }
    for chapter in &index.chapters {
        let nodes = chapter_content(dom, index, config, chapter);
        pages.push(render_page(dom, content, &nodes, config, &chapter.id, PageKind::Chapter));
    }
    Ok(pages)
}

/// Heading, intro, and the table-of-contents listing minus its first
/// (self-link) and last (trailing separator) entries.
fn part_content(dom: &mut ArenaDom, part: &Part) -> Vec<ArenaNodeId> {
    let mut nodes = vec![dom.deep_clone(part.heading)];
    if let Some(intro) = part.intro {
        nodes.push(dom.deep_clone(intro));
    }
    if part.toc.len() > 2 {
        for &entry in &part.toc[1..part.toc.len() - 1] {
            nodes.push(dom.deep_clone(entry));
        }
    }
    nodes
}

/// The whole chapter section followed by its navigation table.
fn chapter_content(
    dom: &mut ArenaDom,
    index: &DocumentIndex,
    config: &ChunkConfig,
    chapter: &Chapter,
) -> Vec<ArenaNodeId> {
    let section = dom.deep_clone(chapter.section);
    let nav = build_navigation(dom, index, config, chapter);
    vec![section, nav]
}

fn render_page(
    dom: &mut ArenaDom,
    content: ArenaNodeId,
    nodes: &[ArenaNodeId],
    config: &ChunkConfig,
    id: &str,
    kind: PageKind,
) -> Page {
    for &node in nodes {
        dom.append(content, node);
    }
    let html = serialize_document(dom);
    dom.clear_children(content);

    let filename = config.page_filename(id);
    debug!(%filename, ?kind, bytes = html.len(), "rendered page");
    Page {
        id: id.to_string(),
        kind,
        filename,
        html,
    }
}

/// Write rendered pages into `out_dir`, creating it if needed.
///
/// Not transactional: a failure part-way leaves earlier pages written.
pub fn write_pages(pages: &[Page], out_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|source| Error::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(pages.len());
    for page in pages {
        let path = out_dir.join(&page.filename);
        std::fs::write(&path, &page.html).map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "wrote page");
        written.push(path);
    }
    Ok(written)
}
