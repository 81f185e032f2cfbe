//! Structural indexing: parts, chapters, sub-sections and in-page links.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ChunkConfig, CompiledSelectors};
use crate::dom::{ArenaDom, ArenaNodeId};
use crate::error::{Error, Result};
use crate::util::fragment_target;

/// Leading chapter number, e.g. `12. ` in `12. Networking`.
static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("static regex"));

/// Heading tags below chapter level.
const SUBSECTION_TAGS: &[&str] = &["h3", "h4", "h5", "h6"];

/// A top-level grouping of chapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub id: String,
    /// The part heading element.
    pub heading: ArenaNodeId,
    /// Introduction block following the heading, if any.
    pub intro: Option<ArenaNodeId>,
    /// Children of the element holding the document's link to this part.
    /// The first entry is the self-link; the last is usually trailing
    /// whitespace.
    pub toc: Vec<ArenaNodeId>,
}

/// A numbered section that becomes its own page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub id: String,
    /// Heading text without its number.
    pub title: String,
    /// The section container (heading and all nested content).
    pub section: ArenaNodeId,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Ids of headings nested in this chapter.
    pub subsections: Vec<String>,
}

/// What an anchor id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Index into [`DocumentIndex::parts`].
    Part(usize),
    /// Index into [`DocumentIndex::chapters`].
    Chapter(usize),
    /// A heading inside the chapter with this index.
    Subsection { chapter: usize },
}

/// An element whose href points at an in-page anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorLink {
    pub node: ArenaNodeId,
    /// Decoded target id.
    pub target: String,
    /// The href as written, e.g. `#caf%C3%A9`.
    pub fragment: String,
}

/// Everything the later passes need to know about the document structure.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    pub parts: Vec<Part>,
    pub chapters: Vec<Chapter>,
    /// In-page links in document order.
    pub links: Vec<AnchorLink>,
    /// The container whose children are replaced on every page.
    pub content: Option<ArenaNodeId>,
    anchors: HashMap<String, Anchor>,
}

impl DocumentIndex {
    /// Look up what an id belongs to.
    pub fn anchor(&self, id: &str) -> Option<Anchor> {
        self.anchors.get(id).copied()
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        match self.anchor(id)? {
            Anchor::Chapter(i) => self.chapters.get(i),
            _ => None,
        }
    }

    pub fn part(&self, id: &str) -> Option<&Part> {
        match self.anchor(id)? {
            Anchor::Part(i) => self.parts.get(i),
            _ => None,
        }
    }

    /// Number of pages the document splits into.
    pub fn page_count(&self) -> usize {
        self.parts.len() + self.chapters.len()
    }

    /// Total number of registered sub-section anchors.
    pub fn subsection_count(&self) -> usize {
        self.chapters.iter().map(|c| c.subsections.len()).sum()
    }

    /// Register an id; the first registration wins.
    fn register(&mut self, id: &str, anchor: Anchor) -> bool {
        match self.anchors.entry(id.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(anchor);
                true
            }
            Entry::Occupied(existing) => {
                warn!(
                    id,
                    existing = ?existing.get(),
                    skipped = ?anchor,
                    "duplicate anchor id, keeping the first"
                );
                false
            }
        }
    }
}

/// Strip a leading `<digits>. ` from a chapter heading.
///
/// Titles without a number, or that would become empty, are returned as-is.
pub fn chapter_title(heading_text: &str) -> String {
    let collapsed = heading_text.split_whitespace().collect::<Vec<_>>().join(" ");
    let stripped = NUMBER_PREFIX.replace(&collapsed, "");
    if stripped.is_empty() {
        collapsed
    } else {
        stripped.into_owned()
    }
}

/// Scan the document once and build the part/chapter registries.
///
/// Fails only if the content container is missing; every other anomaly
/// is logged and the offending item skipped.
pub fn index_document(
    dom: &ArenaDom,
    config: &ChunkConfig,
    selectors: &CompiledSelectors,
) -> Result<DocumentIndex> {
    let content = dom
        .get_by_id(&config.content_id)
        .ok_or_else(|| Error::MissingElement(format!("#{}", config.content_id)))?;

    let mut index = DocumentIndex {
        content: Some(content),
        links: collect_anchor_links(dom),
        ..DocumentIndex::default()
    };

    index_parts(dom, config, selectors, &mut index);
    index_chapters(dom, config, selectors, &mut index);
    link_chapters(&mut index.chapters);

    debug!(
        parts = index.parts.len(),
        chapters = index.chapters.len(),
        subsections = index.subsection_count(),
        links = index.links.len(),
        "indexed document"
    );
    Ok(index)
}

fn collect_anchor_links(dom: &ArenaDom) -> Vec<AnchorLink> {
    dom.descendants(dom.document())
        .filter_map(|node| {
            let href = dom.get_attr(node, "href")?;
            let target = fragment_target(href)?;
            Some(AnchorLink {
                node,
                target: target.into_owned(),
                fragment: href.trim().to_string(),
            })
        })
        .collect()
}

fn index_parts(
    dom: &ArenaDom,
    config: &ChunkConfig,
    selectors: &CompiledSelectors,
    index: &mut DocumentIndex,
) {
    for heading in selectors.parts.select(dom, dom.document()) {
        let Some(id) = dom.element_id(heading) else {
            warn!(text = %dom.text_of(heading).trim(), "part heading without an id, skipping");
            continue;
        };
        if !index.register(id, Anchor::Part(index.parts.len())) {
            continue;
        }

        let intro = dom
            .next_element_sibling(heading)
            .filter(|&div| dom.has_tag(div, "div") && dom.has_class(div, &config.intro_class));

        // Several links may point at a part; the last one in document order
        // supplies the listing. Anchors inside the heading itself don't count.
        let toc = index
            .links
            .iter()
            .rev()
            .find(|link| link.target == id && !is_within(dom, link.node, heading))
            .and_then(|link| dom.parent(link.node))
            .map(|parent| dom.children(parent).collect())
            .unwrap_or_default();

        debug!(id, has_intro = intro.is_some(), "indexed part");
        index.parts.push(Part {
            id: id.to_string(),
            heading,
            intro,
            toc,
        });
    }
}

fn is_within(dom: &ArenaDom, node: ArenaNodeId, ancestor: ArenaNodeId) -> bool {
    std::iter::successors(Some(node), |&n| dom.parent(n)).any(|n| n == ancestor)
}

fn index_chapters(
    dom: &ArenaDom,
    config: &ChunkConfig,
    selectors: &CompiledSelectors,
    index: &mut DocumentIndex,
) {
    for section in selectors.chapters.select(dom, dom.document()) {
        let heading = dom.descendants(section).find(|&h| dom.has_tag(h, &config.chapter_heading));
        let Some((heading, id)) = heading.and_then(|h| Some((h, dom.element_id(h)?))) else {
            warn!(
                selector = selectors.chapters.source(),
                "chapter section without an identified heading, skipping"
            );
            continue;
        };

        let chapter_index = index.chapters.len();
        if !index.register(id, Anchor::Chapter(chapter_index)) {
            continue;
        }

        let subsections = dom
            .descendants(section)
            .filter(|&h| SUBSECTION_TAGS.iter().any(|tag| dom.has_tag(h, tag)))
            .filter_map(|h| dom.element_id(h))
            .filter(|sub_id| {
                index.register(
                    sub_id,
                    Anchor::Subsection {
                        chapter: chapter_index,
                    },
                )
            })
            .map(str::to_string)
            .collect::<Vec<_>>();

        let title = chapter_title(&dom.text_of(heading));
        debug!(id, title = %title, subsections = subsections.len(), "indexed chapter");
        index.chapters.push(Chapter {
            id: id.to_string(),
            title,
            section,
            prev: None,
            next: None,
            subsections,
        });
    }
}

/// Thread the chapters into a chain in document order.
fn link_chapters(chapters: &mut [Chapter]) {
    let ids: Vec<String> = chapters.iter().map(|c| c.id.clone()).collect();
    for (i, chapter) in chapters.iter_mut().enumerate() {
        chapter.prev = i.checked_sub(1).map(|p| ids[p].clone());
        chapter.next = ids.get(i + 1).cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use proptest::prelude::*;

    const BOOK: &str = r##"<!DOCTYPE html>
<html><head><title>Handbook</title></head>
<body class="book">
<div id="header">
<div id="toc" class="toc2">
<ul class="sectlevel0">
<li><a href="#_basics">Basics</a>
<ul class="sectlevel1">
<li><a href="#_intro">1. Intro</a></li>
<li><a href="#_setup">2. Setup</a></li>
</ul>
</li>
</ul>
</div>
</div>
<div id="content">
<h1 id="_basics" class="sect0">Basics</h1>
<div class="openblock partintro"><div class="content">Read this first.</div></div>
<div class="sect1">
<h2 id="_intro">1. Intro</h2>
<div class="sectionbody">
<p>See <a href="#_install">installing</a>.</p>
</div>
</div>
<div class="sect1">
<h2 id="_setup">2. Setup</h2>
<div class="sectionbody">
<div class="sect2"><h3 id="_install">2.1. Install</h3><p>Run it.</p></div>
<div class="sect3"><h4 id="_verify">Verify</h4></div>
</div>
</div>
</div>
</body></html>"##;

    fn index(html: &str) -> (ArenaDom, DocumentIndex) {
        let dom = parse_html(html);
        let config = ChunkConfig::default();
        let selectors = config.compile().unwrap();
        let index = index_document(&dom, &config, &selectors).unwrap();
        (dom, index)
    }

    #[test]
    fn test_chapter_title_strips_number() {
        assert_eq!(chapter_title("1. Intro"), "Intro");
        assert_eq!(chapter_title("12.  Getting   started"), "Getting started");
        assert_eq!(chapter_title("\n  3. Setup\n"), "Setup");
    }

    #[test]
    fn test_chapter_title_without_number_is_verbatim() {
        assert_eq!(chapter_title("Appendix"), "Appendix");
        assert_eq!(chapter_title("2.1 Not a chapter number"), "2.1 Not a chapter number");
        assert_eq!(chapter_title("7. "), "7.");
        assert_eq!(chapter_title("1.Intro"), "1.Intro");
    }

    proptest! {
        #[test]
        fn prop_chapter_title_drops_any_number(
            number in 0u32..10_000,
            title in "[A-Za-z][A-Za-z0-9]*( [A-Za-z0-9]+){0,3}",
        ) {
            prop_assert_eq!(chapter_title(&format!("{number}. {title}")), title.clone());
            prop_assert_eq!(chapter_title(&title), title);
        }
    }

    #[test]
    fn test_index_parts() {
        let (dom, index) = index(BOOK);

        assert_eq!(index.parts.len(), 1);
        let part = &index.parts[0];
        assert_eq!(part.id, "_basics");
        assert_eq!(dom.text_of(part.heading), "Basics");

        let intro = part.intro.expect("partintro captured");
        assert!(dom.has_class(intro, "partintro"));

        // <li> children: self-link, whitespace, nested list, whitespace
        assert_eq!(part.toc.len(), 4);
        assert!(dom.has_tag(part.toc[0], "a"));
        assert!(dom.has_tag(part.toc[2], "ul"));
    }

    #[test]
    fn test_index_chapters_and_chain() {
        let (_dom, index) = index(BOOK);

        let ids: Vec<_> = index.chapters.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["_intro", "_setup"]);

        let intro = index.chapter("_intro").unwrap();
        assert_eq!(intro.title, "Intro");
        assert_eq!(intro.prev, None);
        assert_eq!(intro.next.as_deref(), Some("_setup"));

        let setup = index.chapter("_setup").unwrap();
        assert_eq!(setup.title, "Setup");
        assert_eq!(setup.prev.as_deref(), Some("_intro"));
        assert_eq!(setup.next, None);
    }

    #[test]
    fn test_index_subsections() {
        let (_dom, index) = index(BOOK);

        let setup = index.chapter("_setup").unwrap();
        assert_eq!(setup.subsections, vec!["_install", "_verify"]);
        assert_eq!(
            index.anchor("_install"),
            Some(Anchor::Subsection { chapter: 1 })
        );
        assert_eq!(index.subsection_count(), 2);
        assert_eq!(index.page_count(), 3);
    }

    #[test]
    fn test_index_collects_links_in_order() {
        let (_dom, index) = index(BOOK);

        let targets: Vec<_> = index.links.iter().map(|l| l.target.as_str()).collect();
        assert_eq!(targets, vec!["_basics", "_intro", "_setup", "_install"]);
    }

    #[test]
    fn test_part_without_intro_or_toc() {
        let (_dom, index) = index(
            r#"<div id="content"><h1 id="p" class="sect0">P</h1><div class="sect1"><h2 id="c">1. C</h2></div></div>"#,
        );

        let part = index.part("p").unwrap();
        assert_eq!(part.intro, None);
        assert!(part.toc.is_empty());
    }

    #[test]
    fn test_last_link_to_part_supplies_toc() {
        let (dom, index) = index(
            r##"<ul><li id="first"><a href="#p">P</a></li></ul>
                <ol><li id="second"><a href="#p">P</a> <span>listing</span> </li></ol>
                <div id="content"><h1 id="p" class="sect0">P</h1></div>"##,
        );

        let part = index.part("p").unwrap();
        let parent = dom.parent(part.toc[0]).unwrap();
        assert_eq!(dom.element_id(parent), Some("second"));
    }

    #[test]
    fn test_heading_self_anchor_does_not_supply_toc() {
        let (dom, index) = index(
            r##"<div id="toc"><ul><li id="entry"><a href="#p">Part</a>
                <ul><li><a href="#c1">1. One</a></li></ul>
                </li></ul></div>
                <div id="content">
                <h1 id="p" class="sect0"><a class="anchor" href="#p"></a>Part</h1>
                <div class="sect1"><h2 id="c1"><a class="anchor" href="#c1"></a>1. One</h2></div>
                </div>"##,
        );

        let part = index.part("p").unwrap();
        let parent = dom.parent(part.toc[0]).unwrap();
        assert_eq!(dom.element_id(parent), Some("entry"));
        assert!(part.toc.iter().any(|&n| dom.has_tag(n, "ul")));
        assert_eq!(index.chapters[0].title, "One");
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let (_dom, index) = index(
            r#"<div id="content">
                <div class="sect1"><h2 id="a">1. A</h2><h3 id="a">clash</h3></div>
                <div class="sect1"><h2 id="a">2. Again</h2></div>
            </div>"#,
        );

        assert_eq!(index.chapters.len(), 1);
        assert!(index.chapters[0].subsections.is_empty());
        assert_eq!(index.anchor("a"), Some(Anchor::Chapter(0)));
    }

    #[test]
    fn test_chapter_without_heading_id_is_skipped() {
        let (_dom, index) = index(
            r#"<div id="content">
                <div class="sect1"><h2>No id</h2></div>
                <div class="sect1"><h2 id="ok">2. Ok</h2></div>
            </div>"#,
        );

        assert_eq!(index.chapters.len(), 1);
        assert_eq!(index.chapters[0].prev, None);
    }

    #[test]
    fn test_missing_content_container() {
        let dom = parse_html("<body><p>no container</p></body>");
        let config = ChunkConfig::default();
        let err = index_document(&dom, &config, &config.compile().unwrap()).unwrap_err();

        assert!(matches!(err, Error::MissingElement(ref what) if what == "#content"));
    }
}
