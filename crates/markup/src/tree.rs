use crate::error::{MarkupError, Result};
use crate::sections::split_sections;
use crate::selector::Selector;
use crate::tags::{is_one_of, BLOCK_TAGS, GROUPING_ROLES, GROUPING_TAGS};
use crate::text::visible_text;
use std::ops::Range;
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Unquoted value; `None` for bare attributes such as `disabled`.
    pub value: Option<String>,
    /// Bytes of the value between its quotes.
    pub value_span: Option<Range<usize>>,
    pub span: Range<usize>,
}

/// One element of a component body. All ranges are byte offsets into the full document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub span: Range<usize>,
    pub open_tag: Range<usize>,
    pub inner: Range<usize>,
    pub parent: Option<usize>,
    pub depth: usize,
    pub self_closing: bool,
}

impl Element {
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn is_any(&self, tags: &[&str]) -> bool {
        is_one_of(&self.tag, tags)
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|attr| attr.value.as_deref())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr_value("id")
    }

    /// The attribute carrying CSS classes (`class`, or `className` in JSX-flavoured markup).
    pub fn class_attr(&self) -> Option<&Attribute> {
        self.attr("class").or_else(|| self.attr("className"))
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.class_attr()
            .and_then(|attr| attr.value.as_deref())
            .unwrap_or("")
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }

    pub fn is_block(&self) -> bool {
        self.is_any(BLOCK_TAGS)
    }

    pub fn is_grouping_container(&self) -> bool {
        self.is_any(GROUPING_TAGS)
            || self
                .attr_value("role")
                .is_some_and(|role| is_one_of(role, GROUPING_ROLES))
    }

    /// End of the tag name inside the opening tag; new attributes go after this or after
    /// the last existing attribute.
    pub fn attribute_insertion_point(&self) -> usize {
        self.attributes
            .last()
            .map(|attr| attr.span.end)
            .unwrap_or(self.open_tag.start + 1 + self.tag.len())
    }
}

/// Flat, document-ordered element arena for one component body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupTree {
    elements: Vec<Element>,
}

impl MarkupTree {
    /// Parse the markup body of a component document (the preamble is skipped).
    pub fn parse(source: &str) -> Result<Self> {
        let sections = split_sections(source);
        Self::parse_range(source, sections.body)
    }

    /// Parse `source[range]`, keeping offsets absolute to `source`.
    pub fn parse_range(source: &str, range: Range<usize>) -> Result<Self> {
        let fragment = source
            .get(range.clone())
            .ok_or_else(|| MarkupError::InvalidRange(range.clone()))?;

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_html::LANGUAGE.into())
            .map_err(|e| MarkupError::TreeSitterError(format!("Failed to set language: {e}")))?;
        let tree = parser
            .parse(fragment, None)
            .ok_or_else(|| MarkupError::parse("Failed to parse markup"))?;

        let root = tree.root_node();
        if root.has_error() {
            log::debug!("markup parsed with recoverable errors");
        }

        let mut elements = Vec::new();
        collect(root, source, range.start, None, 0, &mut elements);
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.parent.is_none())
            .map(|(idx, _)| idx)
    }

    pub fn children(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .skip(idx + 1)
            .filter(move |(_, el)| el.parent == Some(idx))
            .map(|(child, _)| child)
    }

    /// Elements sharing `idx`'s parent, `idx` included, in document order.
    pub fn siblings(&self, idx: usize) -> Vec<usize> {
        match self.elements[idx].parent {
            Some(parent) => self.children(parent).collect(),
            None => self.roots().collect(),
        }
    }

    /// Parent chain of `idx`, nearest first.
    pub fn ancestors(&self, idx: usize) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.elements[idx].parent,
        }
    }

    pub fn is_ancestor(&self, ancestor: usize, idx: usize) -> bool {
        self.ancestors(idx).any(|candidate| candidate == ancestor)
    }

    /// Whitespace-normalised visible text of an element's content.
    pub fn text(&self, source: &str, idx: usize) -> String {
        visible_text(&source[self.elements[idx].inner.clone()])
    }

    pub fn find_by_tags(&self, tags: &[&str]) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.is_any(tags))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|el| el.id() == Some(id))
    }

    pub fn select(&self, selector: &Selector, source: &str) -> Vec<usize> {
        (0..self.elements.len())
            .filter(|&idx| selector.matches(self, source, idx))
            .collect()
    }

    /// Nearest block-level element at or above `idx`.
    pub fn block_ancestor_or_self(&self, idx: usize) -> Option<usize> {
        std::iter::once(idx)
            .chain(self.ancestors(idx))
            .find(|&candidate| self.elements[candidate].is_block())
    }

    /// Human-readable location such as `section#hero > div.card > h2`.
    pub fn path(&self, idx: usize) -> String {
        let mut chain: Vec<usize> = self.ancestors(idx).collect();
        chain.reverse();
        chain.push(idx);
        chain
            .into_iter()
            .map(|i| describe(&self.elements[i]))
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

fn describe(element: &Element) -> String {
    let mut label = element.tag.clone();
    if let Some(id) = element.id() {
        label.push('#');
        label.push_str(id);
    } else if let Some(class) = element.classes().next() {
        label.push('.');
        label.push_str(class);
    }
    label
}

pub struct Ancestors<'a> {
    tree: &'a MarkupTree,
    next: Option<usize>,
}

impl Iterator for Ancestors<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.elements[current].parent;
        Some(current)
    }
}

fn collect(
    node: Node,
    source: &str,
    offset: usize,
    parent: Option<usize>,
    depth: usize,
    out: &mut Vec<Element>,
) {
    let mut parent = parent;
    let mut depth = depth;

    if matches!(node.kind(), "element" | "script_element" | "style_element") {
        if let Some(element) = build_element(node, source, offset, parent, depth) {
            out.push(element);
            parent = Some(out.len() - 1);
            depth += 1;
        }
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    for child in children {
        collect(child, source, offset, parent, depth, out);
    }
}

fn build_element(
    node: Node,
    source: &str,
    offset: usize,
    parent: Option<usize>,
    depth: usize,
) -> Option<Element> {
    let mut open = None;
    let mut close = None;
    let mut self_closing = false;
    // End of the last child that is neither tag, for elements without an end tag.
    let mut content_end = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "start_tag" => open = Some(child),
            "self_closing_tag" => {
                open = Some(child);
                self_closing = true;
            }
            "end_tag" => close = Some(child),
            _ => content_end = Some(child.end_byte() + offset),
        }
    }

    let open = open?;
    let span_of = |n: Node| (n.start_byte() + offset)..(n.end_byte() + offset);

    let mut tag = None;
    let mut attributes = Vec::new();
    let mut open_cursor = open.walk();
    for child in open.children(&mut open_cursor) {
        match child.kind() {
            "tag_name" => tag = Some(source[span_of(child)].to_string()),
            "attribute" => attributes.push(build_attribute(child, source, offset)),
            _ => {}
        }
    }

    let open_span = span_of(open);
    let (span, inner) = match close {
        _ if self_closing => (span_of(node), open_span.end..open_span.end),
        Some(close) => {
            let end = (close.start_byte() + offset).max(open_span.end);
            (span_of(node), open_span.end..end)
        }
        // Void or implicitly closed: the node's own span runs over trailing whitespace.
        None => {
            let end = content_end.unwrap_or(open_span.end).max(open_span.end);
            (open_span.start..end, open_span.end..end)
        }
    };

    Some(Element {
        tag: tag?,
        attributes,
        span,
        open_tag: open_span,
        inner,
        parent,
        depth,
        self_closing,
    })
}

fn build_attribute(node: Node, source: &str, offset: usize) -> Attribute {
    let span_of = |n: Node| (n.start_byte() + offset)..(n.end_byte() + offset);

    let mut name = String::new();
    let mut value_span = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "attribute_name" => name = source[span_of(child)].to_string(),
            "attribute_value" => value_span = Some(span_of(child)),
            "quoted_attribute_value" => {
                let quoted = span_of(child);
                let mut inner_cursor = child.walk();
                let inner = child
                    .children(&mut inner_cursor)
                    .find(|n| n.kind() == "attribute_value")
                    .map(span_of);
                value_span = Some(inner.unwrap_or((quoted.start + 1)..(quoted.end - 1).max(quoted.start + 1)));
            }
            _ => {}
        }
    }

    Attribute {
        name,
        value: value_span.clone().map(|range| source[range].to_string()),
        value_span,
        span: span_of(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HERO: &str = r#"---
const cta = "Start";
---
<section id="hero" class="py-12 bg-white">
  <h1 class="text-4xl text-gray-900">Old <span>Headline</span></h1>
  <p>Intro copy</p>
  <img src="/hero.png" alt="Hero">
  <a href="/signup" class="btn">Get started</a>
</section>
"#;

    #[test]
    fn builds_document_ordered_arena_with_absolute_offsets() {
        let tree = MarkupTree::parse(HERO).unwrap();
        let tags: Vec<&str> = tree.elements().iter().map(|el| el.tag.as_str()).collect();
        assert_eq!(tags, vec!["section", "h1", "span", "p", "img", "a"]);

        let h1 = tree.element(1);
        assert_eq!(&HERO[h1.inner.clone()], "Old <span>Headline</span>");
        assert_eq!(h1.parent, Some(0));
        assert_eq!(tree.text(HERO, 1), "Old Headline");
    }

    #[test]
    fn attributes_expose_values_and_spans() {
        let tree = MarkupTree::parse(HERO).unwrap();
        let section = tree.element(0);
        assert_eq!(section.id(), Some("hero"));
        assert!(section.has_class("bg-white"));

        let class = section.class_attr().unwrap();
        assert_eq!(&HERO[class.value_span.clone().unwrap()], "py-12 bg-white");
    }

    #[test]
    fn void_elements_have_empty_inner() {
        let tree = MarkupTree::parse(HERO).unwrap();
        let img = tree.element(4);
        assert!(img.inner.is_empty());
        assert_eq!(img.attr_value("alt"), Some("Hero"));
        assert_eq!(&HERO[img.span.clone()], "<img src=\"/hero.png\" alt=\"Hero\">");
        assert_eq!(img.span, img.open_tag);
    }

    #[test]
    fn void_element_span_leaves_the_following_line_break() {
        let doc = "<div>\n  <img src=\"/a.png\" alt=\"A\">\n  <p>B</p>\n</div>\n";
        let tree = MarkupTree::parse(doc).unwrap();
        let img = tree.element(1);
        assert_eq!(img.tag, "img");
        assert_eq!(&doc[img.span.end..img.span.end + 1], "\n");
        assert_eq!(img.inner, img.span.end..img.span.end);
    }

    #[test]
    fn path_and_ancestors() {
        let tree = MarkupTree::parse(HERO).unwrap();
        assert_eq!(tree.path(2), "section#hero > h1.text-4xl > span");
        assert!(tree.is_ancestor(0, 2));
        assert_eq!(tree.children(0).collect::<Vec<_>>(), vec![1, 3, 4, 5]);
        assert_eq!(tree.block_ancestor_or_self(2), Some(1));
    }

    #[test]
    fn component_tags_keep_their_case() {
        let doc = "<main>\n  <div id=\"hero\">\n    <Hero />\n  </div>\n</main>\n";
        let tree = MarkupTree::parse(doc).unwrap();
        let hero = tree.elements().iter().find(|el| el.tag == "Hero").unwrap();
        assert!(hero.self_closing);
        assert_eq!(tree.find_by_id("hero"), Some(1));
    }
}
