//! Compiled CSS selectors for locating document structure.

use selectors::context::{MatchingContext, QuirksMode, SelectorCaches};
use selectors::matching::{
    MatchingForInvalidation, MatchingMode, NeedsSelectorFlags, matches_selector,
};
use selectors::parser::Selector;

use super::arena::{ArenaDom, ArenaNodeId};
use super::element_ref::{ChunkSelectors, ElementRef};
use crate::error::{Error, Result};

/// A comma-separated selector list, e.g. `h1.sect0, h1.part`.
#[derive(Debug, Clone)]
pub struct SelectorSet {
    source: String,
    selectors: Vec<Selector<ChunkSelectors>>,
}

impl SelectorSet {
    /// Parse a selector list.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSelector {
            selector: source.to_string(),
            reason,
        };

        let mut input = cssparser::ParserInput::new(source);
        let mut parser = cssparser::Parser::new(&mut input);
        let mut selectors = Vec::new();

        loop {
            let selector = Selector::parse(&ChunkSelectors, &mut parser)
                .map_err(|e| invalid(format!("{:?}", e.kind)))?;
            selectors.push(selector);

            if parser.is_exhausted() {
                break;
            }
            parser
                .expect_comma()
                .map_err(|e| invalid(format!("{:?}", e.kind)))?;
        }

        Ok(Self {
            source: source.to_string(),
            selectors,
        })
    }

    /// The selector text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check whether an element matches any selector in the set.
    pub fn matches(&self, dom: &ArenaDom, id: ArenaNodeId) -> bool {
        if !dom.is_element(id) {
            return false;
        }

        let element = ElementRef::new(dom, id);
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.selectors
            .iter()
            .any(|selector| matches_selector(selector, 0, None, &element, &mut context))
    }

    /// All descendants of `root` matching the set, in document order.
    pub fn select(&self, dom: &ArenaDom, root: ArenaNodeId) -> Vec<ArenaNodeId> {
        dom.descendants(root)
            .filter(|&id| self.matches(dom, id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    fn select_first(dom: &ArenaDom, selector: &str) -> Option<ArenaNodeId> {
        SelectorSet::parse(selector)
            .unwrap()
            .select(dom, dom.document())
            .into_iter()
            .next()
    }

    #[test]
    fn test_tag_selector() {
        let dom = parse_html("<div><p>Hello</p></div>");
        let p = dom.find_by_tag("p").unwrap();

        assert!(SelectorSet::parse("p").unwrap().matches(&dom, p));
        assert!(!SelectorSet::parse("div").unwrap().matches(&dom, p));
    }

    #[test]
    fn test_class_selector() {
        let dom = parse_html(r#"<h1 class="sect0 big">Part</h1><h1>Other</h1>"#);
        let parts = SelectorSet::parse("h1.sect0")
            .unwrap()
            .select(&dom, dom.document());

        assert_eq!(parts.len(), 1);
        assert_eq!(dom.text_of(parts[0]), "Part");
    }

    #[test]
    fn test_id_and_attribute_selectors() {
        let dom = parse_html(r##"<div id="content"><a href="#x">x</a><a href="y.html">y</a></div>"##);

        assert!(select_first(&dom, "#content").is_some());
        let links = SelectorSet::parse(r##"a[href^="#"]"##)
            .unwrap()
            .select(&dom, dom.document());
        assert_eq!(links.len(), 1);
        assert_eq!(dom.get_attr(links[0], "href"), Some("#x"));
    }

    #[test]
    fn test_child_selector() {
        let dom = parse_html("<div><span><p>Nested</p></span></div>");
        let p = dom.find_by_tag("p").unwrap();

        assert!(!SelectorSet::parse("div > p").unwrap().matches(&dom, p));
        assert!(SelectorSet::parse("span > p").unwrap().matches(&dom, p));
        assert!(SelectorSet::parse("div p").unwrap().matches(&dom, p));
    }

    #[test]
    fn test_selector_list_preserves_document_order() {
        let dom = parse_html(
            r#"<div class="sect1" id="a"></div><section id="b"></section><div class="sect1" id="c"></div>"#,
        );
        let found = SelectorSet::parse("div.sect1, section")
            .unwrap()
            .select(&dom, dom.document());

        let ids: Vec<_> = found.iter().map(|&id| dom.element_id(id).unwrap()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_invalid_selector() {
        let err = SelectorSet::parse("div..sect1").unwrap_err();
        assert!(matches!(err, Error::InvalidSelector { .. }));

        assert!(SelectorSet::parse("div, ").is_err());
    }
}
