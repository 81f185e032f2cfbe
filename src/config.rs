//! Structural conventions of the input document.
//!
//! The defaults describe the single-page HTML book layout produced by
//! Asciidoctor: parts are `<h1 class="sect0">`, chapters are
//! `<div class="sect1">` wrappers around an `<h2>`, part introductions are
//! `<div class="partintro">` and everything lives under `<div id="content">`.

use crate::dom::SelectorSet;
use crate::error::Result;

/// Conventions the chunker relies on, plus output naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Selector for part headings.
    pub part_selector: String,
    /// Selector for chapter section containers.
    pub chapter_selector: String,
    /// Tag of the heading that carries a chapter's id and title.
    pub chapter_heading: String,
    /// Class marking a part's introduction block.
    pub intro_class: String,
    /// Id of the container whose content is replaced on every page.
    pub content_id: String,
    /// Prepended to every output file name.
    pub file_prefix: String,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            part_selector: "h1.sect0".to_string(),
            chapter_selector: "div.sect1".to_string(),
            chapter_heading: "h2".to_string(),
            intro_class: "partintro".to_string(),
            content_id: "content".to_string(),
            file_prefix: String::new(),
        }
    }
}

impl ChunkConfig {
    pub fn with_part_selector(mut self, selector: impl Into<String>) -> Self {
        self.part_selector = selector.into();
        self
    }

    pub fn with_chapter_selector(mut self, selector: impl Into<String>) -> Self {
        self.chapter_selector = selector.into();
        self
    }

    pub fn with_content_id(mut self, id: impl Into<String>) -> Self {
        self.content_id = id.into();
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Output file name for a part or chapter id.
    pub fn page_filename(&self, id: &str) -> String {
        format!("{}{}.html", self.file_prefix, id)
    }

    /// Compile the part and chapter selectors.
    ///
    /// Done before the input is read so a typo fails fast.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            parts: SelectorSet::parse(&self.part_selector)?,
            chapters: SelectorSet::parse(&self.chapter_selector)?,
        })
    }
}

/// Parsed form of the configured selectors.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub parts: SelectorSet,
    pub chapters: SelectorSet,
}
