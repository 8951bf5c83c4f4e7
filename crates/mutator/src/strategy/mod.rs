//! Locator strategies. Each tier is an object behind [`Strategy`]; the mutator walks
//! an ordered list of them and stops at the first [`Attempt::Found`] or ambiguity.

mod exact;
mod fuzzy;
mod selector;
mod semantic;
mod text_node;

pub(crate) use selector::select_unique;
pub use exact::ExactLiteral;
pub use fuzzy::FuzzyPrefix;
pub use selector::SelectorContainment;
pub use semantic::{SemanticCategory, SemanticHeuristic};
pub use text_node::TextNode;

use crate::cache::SearchCache;
use crate::document::Document;
use crate::error::EditError;
use crate::outcome::{Located, StrategyKind};
use pagesmith_markup::{normalize_whitespace, MarkupTree, Splice};
use pagesmith_protocol::ModifyEdit;
use std::ops::Range;

/// Result of one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Found(Located),
    /// The tier does not apply to this instruction (missing hint, no candidates).
    Skipped,
    /// The tier applied but refused to act. The cascade continues and keeps the reason
    /// in case nothing else succeeds, except after an ambiguity, which ends it.
    Rejected(EditError),
}

pub trait Strategy<E>: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn attempt(&self, doc: &Document<'_>, edit: &E, cache: &SearchCache) -> Attempt;
}

pub fn modify_cascade() -> Vec<Box<dyn Strategy<ModifyEdit>>> {
    vec![
        Box::new(ExactLiteral),
        Box::new(TextNode),
        Box::new(SelectorContainment),
        Box::new(FuzzyPrefix),
        Box::new(SemanticHeuristic),
    ]
}

/// Element content without the whitespace that pads it inside its tags.
pub(crate) fn content_range(source: &str, inner: &Range<usize>) -> Range<usize> {
    let text = &source[inner.clone()];
    let start = inner.start + (text.len() - text.trim_start().len());
    let end = inner.end - (text.len() - text.trim_end().len());
    start..end.max(start)
}

/// Drop candidates that contain another candidate.
pub(crate) fn innermost(tree: &MarkupTree, candidates: &[usize]) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|&idx| !candidates.iter().any(|&other| tree.is_ancestor(idx, other)))
        .collect()
}

/// Drop candidates nested inside another candidate.
pub(crate) fn outermost(tree: &MarkupTree, candidates: &[usize]) -> Vec<usize> {
    candidates
        .iter()
        .copied()
        .filter(|&idx| !candidates.iter().any(|&other| tree.is_ancestor(other, idx)))
        .collect()
}

pub(crate) fn text_contains(tree: &MarkupTree, source: &str, idx: usize, needle: &str) -> bool {
    tree.text(source, idx).contains(&normalize_whitespace(needle))
}

/// Replace the content of each element with `new_content`. Elements whose content
/// already reads `new_content` make the whole attempt a no-op rejection.
pub(crate) fn replace_contents(
    doc: &Document<'_>,
    tree: &MarkupTree,
    indices: &[usize],
    new_content: &str,
) -> Attempt {
    let source = doc.source();
    let mut splices = Vec::with_capacity(indices.len());
    let mut elements = Vec::with_capacity(indices.len());
    let mut fragment = String::new();

    for &idx in indices {
        let element = tree.element(idx);
        if element.self_closing {
            continue;
        }
        let range = content_range(source, &element.inner);
        if source[range.clone()] == *new_content {
            return Attempt::Rejected(EditError::NoMatch(format!(
                "{} already reads `{new_content}`",
                tree.path(idx)
            )));
        }
        if fragment.is_empty() {
            fragment = source[range.clone()].to_string();
        }
        splices.push(Splice::replace(range, new_content));
        elements.push(tree.path(idx));
    }

    if splices.is_empty() {
        return Attempt::Skipped;
    }
    Attempt::Found(Located {
        element_path: elements.first().cloned(),
        splices,
        fragment,
        elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_skips_padding() {
        let doc = "<h1>\n  Title\n</h1>";
        let tree = MarkupTree::parse(doc).unwrap();
        let range = content_range(doc, &tree.element(0).inner);
        assert_eq!(&doc[range], "Title");
    }

    #[test]
    fn nesting_filters() {
        let doc = "<div><div><p>x</p></div></div>";
        let tree = MarkupTree::parse(doc).unwrap();
        assert_eq!(innermost(&tree, &[0, 1, 2]), vec![2]);
        assert_eq!(outermost(&tree, &[1, 2]), vec![1]);
    }
}
