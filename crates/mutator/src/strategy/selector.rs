use super::{innermost, replace_contents, text_contains, Attempt, Strategy};
use crate::cache::SearchCache;
use crate::document::Document;
use crate::error::EditError;
use crate::outcome::StrategyKind;
use pagesmith_markup::{MarkupTree, Selector};
use pagesmith_protocol::ModifyEdit;

/// Elements picked by the instruction's selector, narrowed by `content_match` when
/// the selector alone is ambiguous. Never guesses between candidates.
pub struct SelectorContainment;

impl Strategy<ModifyEdit> for SelectorContainment {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SelectorContainment
    }

    fn attempt(&self, doc: &Document<'_>, edit: &ModifyEdit, _cache: &SearchCache) -> Attempt {
        let Some(raw) = edit.selector.as_deref() else {
            return Attempt::Skipped;
        };
        let tree = match doc.tree() {
            Ok(tree) => tree,
            Err(err) => return Attempt::Rejected(err),
        };
        match select_unique(tree, doc.source(), raw, edit.content_match.as_deref()) {
            Ok(idx) => replace_contents(doc, tree, &[idx], &edit.new_content),
            Err(err) => Attempt::Rejected(err),
        }
    }
}

/// Resolve `raw` to exactly one element. Several matches are narrowed to the innermost
/// ones whose text contains `content_match`.
pub(crate) fn select_unique(
    tree: &MarkupTree,
    source: &str,
    raw: &str,
    content_match: Option<&str>,
) -> Result<usize, EditError> {
    let selector =
        Selector::parse(raw).map_err(|err| EditError::InvalidSelector(err.to_string()))?;
    let matches = tree.select(&selector, source);

    match matches.as_slice() {
        [] => Err(EditError::NotFound(format!("no element matches `{raw}`"))),
        [only] => Ok(*only),
        _ => {
            let Some(needle) = content_match.filter(|s| !s.trim().is_empty()) else {
                return Err(EditError::Ambiguous(format!(
                    "selector `{raw}` matches {} elements and no content was given to tell them apart",
                    matches.len()
                )));
            };
            let narrowed: Vec<usize> = matches
                .iter()
                .copied()
                .filter(|&idx| text_contains(tree, source, idx, needle))
                .collect();
            match innermost(tree, &narrowed).as_slice() {
                [only] => Ok(*only),
                [] => Err(EditError::NotFound(format!(
                    "none of the {} elements matching `{raw}` contain `{needle}`",
                    matches.len()
                ))),
                several => Err(EditError::Ambiguous(format!(
                    "{} elements matching `{raw}` contain `{needle}`",
                    several.len()
                ))),
            }
        }
    }
}
