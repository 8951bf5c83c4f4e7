use super::{Attempt, Strategy};
use crate::cache::SearchCache;
use crate::document::Document;
use crate::outcome::{Located, StrategyKind};
use pagesmith_markup::Splice;
use pagesmith_protocol::ModifyEdit;

/// Drops trailing words from `content_match` until a prefix appears verbatim in the
/// document, for instructions whose quoted text drifted at the end.
pub struct FuzzyPrefix;

impl Strategy<ModifyEdit> for FuzzyPrefix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FuzzyPrefix
    }

    fn attempt(&self, doc: &Document<'_>, edit: &ModifyEdit, cache: &SearchCache) -> Attempt {
        let Some(needle) = edit.content_match.as_deref() else {
            return Attempt::Skipped;
        };

        for prefix in prefix_candidates(needle) {
            if let Some(pos) = cache.find_word_bounded(doc, prefix) {
                log::debug!("fuzzy prefix `{prefix}` found at byte {pos}");
                return Attempt::Found(Located {
                    splices: vec![Splice::replace(pos..pos + prefix.len(), edit.new_content.as_str())],
                    fragment: prefix.to_string(),
                    element_path: None,
                    elements: vec![prefix.to_string()],
                });
            }
        }
        Attempt::Skipped
    }
}

/// Proper word prefixes of `text`, longest first, down to the first word. Each is a
/// slice of `text`, so punctuation and spacing are exactly the caller's.
pub(crate) fn prefix_candidates(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let mut word_ends = Vec::new();
    let mut in_word = false;
    for (idx, c) in trimmed.char_indices() {
        if c.is_whitespace() {
            if in_word {
                word_ends.push(idx);
            }
            in_word = false;
        } else {
            in_word = true;
        }
    }

    word_ends.iter().rev().map(|&end| &trimmed[..end]).collect()
}
