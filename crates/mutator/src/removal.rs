//! Conservative removal cascade: a selector first, then a text anchor bounded by a
//! list-like container. Both refuse rather than widen onto unrelated structure.

use crate::cache::SearchCache;
use crate::document::Document;
use crate::error::EditError;
use crate::outcome::{Located, StrategyKind};
use crate::strategy::{innermost, select_unique, Attempt, Strategy};
use pagesmith_markup::{expand_to_lines, normalize_whitespace, tags::LANDMARK_TAGS, MarkupTree, Splice};
use pagesmith_protocol::RemoveEdit;

/// A block ancestor with more element children than this is treated as a layout
/// container, not a wrapper.
const MAX_WRAPPER_CHILDREN: usize = 3;

pub fn removal_cascade() -> Vec<Box<dyn Strategy<RemoveEdit>>> {
    vec![Box::new(SelectorRemoval), Box::new(TextAnchoredRemoval)]
}

pub struct SelectorRemoval;

impl Strategy<RemoveEdit> for SelectorRemoval {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SelectorRemoval
    }

    fn attempt(&self, doc: &Document<'_>, edit: &RemoveEdit, _cache: &SearchCache) -> Attempt {
        let Some(raw) = edit.selector.as_deref() else {
            return Attempt::Skipped;
        };
        let tree = match doc.tree() {
            Ok(tree) => tree,
            Err(err) => return Attempt::Rejected(err),
        };
        let source = doc.source();
        let idx = match select_unique(tree, source, raw, edit.content_match.as_deref()) {
            Ok(idx) => idx,
            Err(err) => return Attempt::Rejected(err),
        };

        let target = widen_to_wrapper(tree, idx);
        if target != idx {
            log::debug!("widened removal of {} to {}", tree.path(idx), tree.path(target));
        }
        removal(tree, source, target)
    }
}

pub struct TextAnchoredRemoval;

impl Strategy<RemoveEdit> for TextAnchoredRemoval {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextAnchoredRemoval
    }

    fn attempt(&self, doc: &Document<'_>, edit: &RemoveEdit, _cache: &SearchCache) -> Attempt {
        let Some(needle) = edit.content_match.as_deref() else {
            return Attempt::Skipped;
        };
        let needle = normalize_whitespace(needle);
        if needle.is_empty() {
            return Attempt::Skipped;
        }
        let tree = match doc.tree() {
            Ok(tree) => tree,
            Err(err) => return Attempt::Rejected(err),
        };
        let source = doc.source();

        let hits: Vec<usize> = (0..tree.len())
            .filter(|&idx| tree.text(source, idx) == needle)
            .collect();
        let idx = match innermost(tree, &hits).as_slice() {
            [] => {
                return Attempt::Rejected(EditError::NotFound(format!(
                    "no element reads `{needle}`"
                )))
            }
            [only] => *only,
            several => {
                return Attempt::Rejected(EditError::Ambiguous(format!(
                    "{} elements read `{needle}`",
                    several.len()
                )))
            }
        };

        match bounded_item(tree, idx) {
            Some(item) => removal(tree, source, item),
            None => Attempt::Rejected(EditError::NoMatch(format!(
                "{} is not inside a list or group; refusing to guess what to remove",
                tree.path(idx)
            ))),
        }
    }
}

/// Inline targets (a form label, a link) take their block wrapper with them, unless
/// the wrapper is a section-level landmark, a grouping container or a busy layout block.
fn widen_to_wrapper(tree: &MarkupTree, idx: usize) -> usize {
    if tree.element(idx).is_block() {
        return idx;
    }
    match tree.block_ancestor_or_self(idx) {
        Some(block) => {
            let element = tree.element(block);
            let busy = tree.children(block).count() > MAX_WRAPPER_CHILDREN;
            if element.is_any(LANDMARK_TAGS) || element.is_grouping_container() || busy {
                idx
            } else {
                block
            }
        }
        None => idx,
    }
}

/// The element at or above `idx` whose parent is a list or grouping container.
pub(crate) fn bounded_item(tree: &MarkupTree, idx: usize) -> Option<usize> {
    std::iter::once(idx).chain(tree.ancestors(idx)).find(|&candidate| {
        tree.element(candidate)
            .parent
            .is_some_and(|parent| tree.element(parent).is_grouping_container())
    })
}

fn removal(tree: &MarkupTree, source: &str, idx: usize) -> Attempt {
    let element = tree.element(idx);
    let range = expand_to_lines(source, element.span.clone());
    Attempt::Found(Located {
        fragment: source[element.span.clone()].to_string(),
        element_path: Some(tree.path(idx)),
        elements: vec![tree.path(idx)],
        splices: vec![Splice::delete(range)],
    })
}
