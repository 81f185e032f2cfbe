//! Arena-based DOM for HTML parsing.
//!
//! html5ever parses into this arena, and every later pass (indexing, link
//! rewriting, page assembly) refers to nodes by [`ArenaNodeId`]. Ids stay
//! valid for the lifetime of the arena: detaching a node unlinks it from its
//! parent but never frees it, so a section can be pulled out of the document
//! and still be cloned into any number of output pages.

use std::collections::HashMap;

use html5ever::{LocalName, Namespace, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaNodeId(pub u32);

impl ArenaNodeId {
    /// Sentinel value for no node.
    pub const NONE: ArenaNodeId = ArenaNodeId(u32::MAX);

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum ArenaNodeData {
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id for fast matching.
        id: Option<String>,
        /// Pre-extracted classes for fast matching.
        classes: Vec<String>,
    },
    /// Text content.
    Text(String),
    Comment(String),
    /// Document type declaration.
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A node in the arena DOM.
#[derive(Debug)]
pub struct ArenaNode {
    pub data: ArenaNodeData,
    pub parent: ArenaNodeId,
    pub first_child: ArenaNodeId,
    pub last_child: ArenaNodeId,
    pub prev_sibling: ArenaNodeId,
    pub next_sibling: ArenaNodeId,
}

impl ArenaNode {
    fn new(data: ArenaNodeData) -> Self {
        Self {
            data,
            parent: ArenaNodeId::NONE,
            first_child: ArenaNodeId::NONE,
            last_child: ArenaNodeId::NONE,
            prev_sibling: ArenaNodeId::NONE,
            next_sibling: ArenaNodeId::NONE,
        }
    }
}

/// Arena-based DOM tree.
///
/// All nodes are stored in a contiguous vector. Parent/child/sibling links
/// use indices into this vector.
#[derive(Debug)]
pub struct ArenaDom {
    nodes: Vec<ArenaNode>,
    document: ArenaNodeId,
    /// Map from id attribute to the first node parsed with that id.
    id_map: HashMap<String, ArenaNodeId>,
}

impl ArenaDom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: ArenaNodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(ArenaNode::new(ArenaNodeData::Document));
        dom
    }

    fn alloc(&mut self, node: ArenaNode) -> ArenaNodeId {
        let id = ArenaNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> ArenaNodeId {
        self.document
    }

    /// Get a node by ID.
    pub fn get(&self, id: ArenaNodeId) -> Option<&ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: ArenaNodeId) -> Option<&mut ArenaNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node and register its id attribute.
    ///
    /// Only the first element carrying a given id is registered, so
    /// [`get_by_id`](Self::get_by_id) behaves like `getElementById`.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let node_id = self.alloc_element(name, attrs);
        if let Some(id_str) = self.element_id(node_id).map(str::to_string) {
            self.id_map.entry(id_str).or_insert(node_id);
        }
        node_id
    }

    /// Create an HTML element from a tag name and `(name, value)` pairs.
    ///
    /// Used for synthesized markup such as the chapter navigation table.
    pub fn create_html_element(&mut self, tag: &str, attrs: &[(&str, &str)]) -> ArenaNodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: (*value).to_string(),
            })
            .collect();
        self.alloc_element(html_name(tag), attrs)
    }

    /// Allocate an element without touching the id map.
    fn alloc_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> ArenaNodeId {
        let (id, classes) = extract_id_and_classes(&attrs);
        self.alloc(ArenaNode::new(ArenaNodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Text(text)))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(
        &mut self,
        name: String,
        public_id: String,
        system_id: String,
    ) -> ArenaNodeId {
        self.alloc(ArenaNode::new(ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child to a parent node.
    ///
    /// The child must not currently be attached anywhere; call
    /// [`detach`](Self::detach) first when moving a node.
    pub fn append(&mut self, parent: ArenaNodeId, child: ArenaNodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = ArenaNodeId::NONE;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: ArenaNodeId, new_node: ArenaNodeId) {
        let parent = self
            .get(sibling)
            .map(|n| n.parent)
            .unwrap_or(ArenaNodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to an existing text node, or create new if last child isn't text.
    pub fn append_text(&mut self, parent: ArenaNodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(ArenaNodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let ArenaNodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings.
    ///
    /// The node and its subtree stay in the arena and keep their ids.
    pub fn detach(&mut self, target: ArenaNodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(target_node) = self.get_mut(target) {
            target_node.parent = ArenaNodeId::NONE;
            target_node.prev_sibling = ArenaNodeId::NONE;
            target_node.next_sibling = ArenaNodeId::NONE;
        }
    }

    /// Detach every child of a node.
    pub fn clear_children(&mut self, parent: ArenaNodeId) {
        let children: Vec<_> = self.children(parent).collect();
        for child in children {
            self.detach(child);
        }
    }

    /// Copy a subtree into fresh, unattached nodes.
    ///
    /// Clones are not registered in the id map: looking up an id always
    /// returns the node that came from the parsed document.
    pub fn deep_clone(&mut self, source: ArenaNodeId) -> ArenaNodeId {
        let Some(data) = self.get(source).map(|n| n.data.clone()) else {
            return ArenaNodeId::NONE;
        };
        let copy = self.alloc(ArenaNode::new(data));

        let children: Vec<_> = self.children(source).collect();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Set (or add) an attribute on an element.
    ///
    /// Keeps the cached id and class list in sync. The id map is left
    /// alone; it always describes the document as parsed.
    pub fn set_attr(&mut self, id: ArenaNodeId, attr_name: &str, value: &str) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        let ArenaNodeData::Element {
            attrs,
            id: elem_id,
            classes,
            ..
        } = &mut node.data
        else {
            return;
        };

        match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            Some(attr) => attr.value = value.to_string(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: value.to_string(),
            }),
        }

        (*elem_id, *classes) = extract_id_and_classes(attrs);
    }

    /// Get node by id attribute.
    pub fn get_by_id(&self, id: &str) -> Option<ArenaNodeId> {
        self.id_map.get(id).copied()
    }

    /// Get the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_some())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: ArenaNodeId) -> ChildrenIter<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    /// Iterate over all descendants of a node in document order.
    ///
    /// The root itself is not yielded.
    pub fn descendants(&self, root: ArenaNodeId) -> Descendants<'_> {
        let first = self
            .get(root)
            .map(|n| n.first_child)
            .unwrap_or(ArenaNodeId::NONE);
        Descendants {
            dom: self,
            root,
            next: first,
        }
    }

    /// Find the first element matching a predicate (DFS).
    pub fn find<F>(&self, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        self.find_descendant(self.document, predicate)
    }

    /// Find the first descendant of `root` matching a predicate.
    pub fn find_descendant<F>(&self, root: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        self.descendants(root)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find element by tag name (first match).
    pub fn find_by_tag(&self, tag: &str) -> Option<ArenaNodeId> {
        self.find(|node| is_tag(node, tag))
    }

    /// Next sibling that is an element, skipping text and comments.
    pub fn next_element_sibling(&self, id: ArenaNodeId) -> Option<ArenaNodeId> {
        let mut current = self.get(id)?.next_sibling;
        while current.is_some() {
            if self.is_element(current) {
                return Some(current);
            }
            current = self.get(current)?.next_sibling;
        }
        None
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_of(&self, id: ArenaNodeId) -> String {
        if let Some(text) = self.text_content(id) {
            return text.to_string();
        }
        self.descendants(id)
            .filter_map(|d| self.text_content(d))
            .collect()
    }
}

impl Default for ArenaDom {
    fn default() -> Self {
        Self::new()
    }
}

fn html_name(tag: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(tag))
}

fn is_tag(node: &ArenaNode, tag: &str) -> bool {
    matches!(&node.data, ArenaNodeData::Element { name, .. } if name.local.as_ref() == tag)
}

fn extract_id_and_classes(attrs: &[Attribute]) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes = Vec::new();

    for attr in attrs {
        match attr.name.local.as_ref() {
            "id" => id = Some(attr.value.clone()),
            "class" => {
                classes = attr
                    .value
                    .split_whitespace()
                    .map(|s| s.to_string())
                    .collect();
            }
            _ => {}
        }
    }
    (id, classes)
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a ArenaDom,
    current: ArenaNodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(ArenaNodeId::NONE);
        Some(id)
    }
}

/// Preorder iterator over the descendants of a node.
///
/// Walks the sibling/parent links directly, so it needs no stack.
pub struct Descendants<'a> {
    dom: &'a ArenaDom,
    root: ArenaNodeId,
    next: ArenaNodeId,
}

impl Iterator for Descendants<'_> {
    type Item = ArenaNodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        let node = self.dom.get(current)?;

        if node.first_child.is_some() {
            self.next = node.first_child;
            return Some(current);
        }

        // Climb until a node with a next sibling, stopping at the root.
        let mut cursor = current;
        self.next = ArenaNodeId::NONE;
        while cursor.is_some() && cursor != self.root {
            let Some(n) = self.dom.get(cursor) else {
                break;
            };
            if n.next_sibling.is_some() {
                self.next = n.next_sibling;
                break;
            }
            cursor = n.parent;
        }
        Some(current)
    }
}

/// Convenience methods for element nodes.
impl ArenaDom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: ArenaNodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Get element's namespace.
    pub fn element_namespace(&self, id: ArenaNodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    /// Check the element's tag name.
    pub fn has_tag(&self, id: ArenaNodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: ArenaNodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Get element's id attribute.
    pub fn element_id(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    /// Get element's classes.
    pub fn element_classes(&self, id: ArenaNodeId) -> &[String] {
        static EMPTY: &[String] = &[];
        self.get(id)
            .and_then(|n| match &n.data {
                ArenaNodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(EMPTY)
    }

    /// Check whether an element carries a class.
    pub fn has_class(&self, id: ArenaNodeId, class: &str) -> bool {
        self.element_classes(id).iter().any(|c| c == class)
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: ArenaNodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, ArenaNodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: ArenaNodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            ArenaNodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }
}
