//! HTML serializer with stable pretty-printing.
//!
//! Block containers whose children are all blocks get one tag per line,
//! indented two spaces per level. Anything holding inline content is
//! written on a single line exactly as parsed, so whitespace inside
//! paragraphs, links and `<pre>` blocks never changes what a browser
//! renders. The output is a pure function of the tree, which keeps
//! repeated runs byte-for-byte identical.

use std::fmt::Write;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text is written without escaping.
///
/// `noscript` is raw text because documents are parsed with scripting
/// enabled.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Elements where html5ever drops a leading newline on parse.
const NEWLINE_SENSITIVE: &[&str] = &["pre", "textarea", "listing"];

/// Elements that may be laid out one tag per line.
const BLOCK_ELEMENTS: &[&str] = &[
    "html", "head", "body", "title", "meta", "link", "script", "style", "noscript", "div",
    "section", "article", "aside", "nav", "header", "footer", "main", "h1", "h2", "h3", "h4",
    "h5", "h6", "p", "hr", "ul", "ol", "li", "dl", "dt", "dd", "table", "caption", "colgroup",
    "col", "thead", "tbody", "tfoot", "tr", "td", "th", "figure", "figcaption", "blockquote",
    "pre", "details", "summary", "form", "fieldset", "address",
];

/// Serialize a whole document, pretty-printed.
pub fn serialize_document(dom: &ArenaDom) -> String {
    let mut out = String::new();
    for child in dom.children(dom.document()) {
        write_pretty(dom, child, 0, &mut out);
    }
    out
}

/// Serialize one node and its subtree on a single line, as parsed.
pub fn serialize_node(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    write_compact(dom, id, &mut out);
    out
}

fn write_pretty(dom: &ArenaDom, id: ArenaNodeId, depth: usize, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_pretty(dom, child, depth, out);
            }
        }
        ArenaNodeData::Text(text) => {
            // Whitespace between blocks is layout noise.
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                indent(out, depth);
                out.push_str(&escape_text(trimmed));
                out.push('\n');
            }
        }
        ArenaNodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            if !is_block_layout(dom, id, tag) {
                indent(out, depth);
                write_compact(dom, id, out);
                out.push('\n');
                return;
            }

            indent(out, depth);
            write_start_tag(tag, attrs, out);
            out.push('\n');
            for child in dom.children(id) {
                write_pretty(dom, child, depth + 1, out);
            }
            indent(out, depth);
            write!(out, "</{tag}>").ok();
            out.push('\n');
        }
        ArenaNodeData::Comment(_) | ArenaNodeData::Doctype { .. } => {
            indent(out, depth);
            write_compact(dom, id, out);
            out.push('\n');
        }
    }
}

/// A block element is laid out over several lines only when every child is
/// itself a block, a comment, or inter-element whitespace.
fn is_block_layout(dom: &ArenaDom, id: ArenaNodeId, tag: &str) -> bool {
    if !BLOCK_ELEMENTS.contains(&tag)
        || VOID_ELEMENTS.contains(&tag)
        || RAW_TEXT_ELEMENTS.contains(&tag)
        || NEWLINE_SENSITIVE.contains(&tag)
    {
        return false;
    }

    let mut has_children = false;
    for child in dom.children(id) {
        has_children = true;
        let block_child = match dom.get(child).map(|n| &n.data) {
            Some(ArenaNodeData::Element { name, .. }) => {
                BLOCK_ELEMENTS.contains(&name.local.as_ref())
            }
            Some(ArenaNodeData::Text(text)) => text.trim().is_empty(),
            Some(ArenaNodeData::Comment(_)) => true,
            _ => false,
        };
        if !block_child {
            return false;
        }
    }
    has_children
}

fn write_compact(dom: &ArenaDom, id: ArenaNodeId, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_compact(dom, child, out);
            }
        }
        ArenaNodeData::Text(text) => {
            let raw_parent = dom
                .parent(id)
                .and_then(|p| dom.element_name(p))
                .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name.as_ref()));
            if raw_parent {
                out.push_str(text);
            } else {
                out.push_str(&escape_text(text));
            }
        }
        ArenaNodeData::Comment(text) => {
            write!(out, "<!--{text}-->").ok();
        }
        ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            write!(out, "<!DOCTYPE {name}").ok();
            if !public_id.is_empty() {
                write!(out, " PUBLIC \"{public_id}\"").ok();
                if !system_id.is_empty() {
                    write!(out, " \"{system_id}\"").ok();
                }
            } else if !system_id.is_empty() {
                write!(out, " SYSTEM \"{system_id}\"").ok();
            }
            out.push('>');
        }
        ArenaNodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            write_start_tag(tag, attrs, out);
            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            if NEWLINE_SENSITIVE.contains(&tag)
                && dom
                    .children(id)
                    .next()
                    .and_then(|first| dom.text_content(first))
                    .is_some_and(|text| text.starts_with('\n'))
            {
                out.push('\n');
            }

            for child in dom.children(id) {
                write_compact(dom, child, out);
            }
            write!(out, "</{tag}>").ok();
        }
    }
}

fn write_start_tag(tag: &str, attrs: &[Attribute], out: &mut String) {
    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        out.push(' ');
        if let Some(prefix) = &attr.name.prefix {
            write!(out, "{}:", prefix.as_ref()).ok();
        }
        write!(out, "{}=\"{}\"", attr.name.local.as_ref(), escape_attr(&attr.value)).ok();
    }
    out.push('>');
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Escape text content.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\u{a0}' => result.push_str("&nbsp;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Hello"), "Hello");
        assert_eq!(escape_text("<script>"), "&lt;script&gt;");
        assert_eq!(escape_text("a & b"), "a &amp; b");
        assert_eq!(escape_text("it's \"fine\""), "it's \"fine\"");
        assert_eq!(escape_text("a\u{a0}b"), "a&nbsp;b");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr(r#"Say "hi""#), "Say &quot;hi&quot;");
        assert_eq!(escape_attr("a<b&c"), "a<b&amp;c");
    }

    #[test]
    fn test_block_containers_are_indented() {
        let dom = parse_html("<!DOCTYPE html><html><head></head><body><div id=\"content\"><p>Hi</p></div></body></html>");
        let html = serialize_document(&dom);

        assert_eq!(
            html,
            "<!DOCTYPE html>\n<html>\n  <head></head>\n  <body>\n    <div id=\"content\">\n      <p>Hi</p>\n    </div>\n  </body>\n</html>\n"
        );
    }

    #[test]
    fn test_inline_content_kept_on_one_line() {
        let dom = parse_html("<body><p>Some <em>emphasis</em>  and <a href=\"x.html\">a link</a></p></body>");
        let p = dom.find_by_tag("p").unwrap();

        assert_eq!(
            serialize_node(&dom, p),
            "<p>Some <em>emphasis</em>  and <a href=\"x.html\">a link</a></p>"
        );
    }

    #[test]
    fn test_pre_keeps_leading_newline() {
        let dom = parse_html("<body><pre>\n\nfirst line\n  indented</pre></body>");
        let pre = dom.find_by_tag("pre").unwrap();

        // html5ever drops one leading newline on parse; we add it back.
        assert_eq!(
            serialize_node(&dom, pre),
            "<pre>\n\nfirst line\n  indented</pre>"
        );
    }

    #[test]
    fn test_script_is_not_escaped() {
        let dom = parse_html("<head><script>if (a < b && c) {}</script></head>");
        let script = dom.find_by_tag("script").unwrap();

        assert_eq!(
            serialize_node(&dom, script),
            "<script>if (a < b && c) {}</script>"
        );
    }

    #[test]
    fn test_noscript_is_not_escaped() {
        let source = r#"<html><head><noscript><link rel="stylesheet" href="a.css?x=1&amp;y=2"></noscript></head><body><p>x</p><noscript><img src="x.png" alt="a"></noscript></body></html>"#;
        let first = serialize_document(&parse_html(source));

        assert!(first.contains(r#"<noscript><link rel="stylesheet" href="a.css?x=1&amp;y=2"></noscript>"#));
        assert!(first.contains(r#"<noscript><img src="x.png" alt="a"></noscript>"#));
        assert!(!first.contains("&lt;"));
        assert_eq!(serialize_document(&parse_html(&first)), first);
    }

    #[test]
    fn test_void_elements() {
        let dom = parse_html(r#"<body><p>line<br>break <img src="a.png" alt="A &amp; B"></p></body>"#);
        let p = dom.find_by_tag("p").unwrap();

        assert_eq!(
            serialize_node(&dom, p),
            r#"<p>line<br>break <img src="a.png" alt="A &amp; B"></p>"#
        );
    }

    #[test]
    fn test_serialize_is_stable_after_reparse() {
        let source = "<!DOCTYPE html><html><head><title>T</title></head><body><div class=\"sect1\"><h2 id=\"a\">1. A</h2><div class=\"sectionbody\"><p>x &lt; y</p></div></div></body></html>";
        let first = serialize_document(&parse_html(source));
        let second = serialize_document(&parse_html(&first));

        assert_eq!(first, second);
    }
}
