//! Previous/next navigation appended to chapter pages.

use super::index::{Chapter, DocumentIndex};
use crate::config::ChunkConfig;
use crate::dom::{ArenaDom, ArenaNodeId};

const PREV_MARKER: &str = "\u{25c0}";
const NEXT_MARKER: &str = "\u{25b6}";

/// Build the navigation table for a chapter.
///
/// The table always has two cells. The left one links to the previous
/// chapter and the right one to the next; a missing neighbour leaves its
/// cell empty. The returned node is not attached to the document.
pub fn build_navigation(
    dom: &mut ArenaDom,
    index: &DocumentIndex,
    config: &ChunkConfig,
    chapter: &Chapter,
) -> ArenaNodeId {
    let prev = chapter
        .prev
        .as_deref()
        .and_then(|id| index.chapter(id))
        .map(|c| (config.page_filename(&c.id), format!("{PREV_MARKER} {}", c.title)));
    let next = chapter
        .next
        .as_deref()
        .and_then(|id| index.chapter(id))
        .map(|c| (config.page_filename(&c.id), format!("{} {NEXT_MARKER}", c.title)));

    let table = dom.create_html_element("table", &[("class", "chapter-nav"), ("width", "100%")]);
    let row = dom.create_html_element("tr", &[]);
    dom.append(table, row);

    let left = nav_cell(dom, "left", prev);
    let right = nav_cell(dom, "right", next);
    dom.append(row, left);
    dom.append(row, right);
    table
}

fn nav_cell(dom: &mut ArenaDom, align: &str, link: Option<(String, String)>) -> ArenaNodeId {
    let cell = dom.create_html_element("td", &[("width", "50%"), ("align", align)]);
    if let Some((href, text)) = link {
        let a = dom.create_html_element(
            "a",
            &[("href", href.as_str()), ("style", "text-decoration: none;")],
        );
        dom.append_text(a, &text);
        dom.append(cell, a);
    }
    cell
}
