use std::ops::Range;

/// `---` fenced metadata block at the top of a component document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    /// Both fences included, plus the newline after the closing fence.
    pub outer: Range<usize>,
    /// Lines between the fences.
    pub inner: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSections {
    pub preamble: Option<Preamble>,
    pub body: Range<usize>,
}

/// Split a component document into its preamble and markup body.
///
/// A document without an opening fence on its first non-blank line, or whose fence is
/// never closed, is all body.
pub fn split_sections(source: &str) -> DocumentSections {
    let whole = DocumentSections {
        preamble: None,
        body: 0..source.len(),
    };

    let lead = source.len() - source.trim_start_matches(['\u{feff}', ' ', '\t', '\r', '\n']).len();
    let mut lines = LineIter::new(source, lead);

    let Some(first) = lines.next() else {
        return whole;
    };
    if source[first.clone()].trim_end() != "---" {
        return whole;
    }

    let inner_start = first.end;
    for line in lines {
        if source[line.clone()].trim_end() == "---" {
            return DocumentSections {
                preamble: Some(Preamble {
                    outer: lead..line.end,
                    inner: inner_start..line.start,
                }),
                body: line.end..source.len(),
            };
        }
    }

    whole
}

/// Iterates line ranges (newline included) starting at a byte offset.
pub(crate) struct LineIter<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> LineIter<'a> {
    pub(crate) fn new(source: &'a str, pos: usize) -> Self {
        Self { source, pos }
    }
}

impl Iterator for LineIter<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.source.len() {
            return None;
        }
        let start = self.pos;
        let end = self.source[start..]
            .find('\n')
            .map(|offset| start + offset + 1)
            .unwrap_or(self.source.len());
        self.pos = end;
        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_fenced_preamble() {
        let doc = "---\nconst title = 'Hi';\n---\n<h1>{title}</h1>\n";
        let sections = split_sections(doc);
        let preamble = sections.preamble.expect("preamble");

        assert_eq!(&doc[preamble.inner], "const title = 'Hi';\n");
        assert_eq!(&doc[preamble.outer], "---\nconst title = 'Hi';\n---\n");
        assert_eq!(&doc[sections.body], "<h1>{title}</h1>\n");
    }

    #[test]
    fn unfenced_document_is_all_body() {
        let doc = "<section><p>---</p></section>";
        let sections = split_sections(doc);
        assert!(sections.preamble.is_none());
        assert_eq!(sections.body, 0..doc.len());
    }

    #[test]
    fn unclosed_fence_is_all_body() {
        let doc = "---\nimport X from './X.astro';\n<X />";
        assert!(split_sections(doc).preamble.is_none());
    }

    #[test]
    fn empty_preamble_is_recognised() {
        let doc = "\n---\n---\n<div></div>";
        let sections = split_sections(doc);
        let preamble = sections.preamble.expect("preamble");
        assert!(preamble.inner.is_empty());
        assert_eq!(&doc[sections.body], "<div></div>");
    }
}
