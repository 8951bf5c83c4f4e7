use super::{Attempt, Strategy};
use crate::cache::SearchCache;
use crate::document::Document;
use crate::error::EditError;
use crate::outcome::{Located, StrategyKind};
use pagesmith_markup::Splice;
use pagesmith_protocol::ModifyEdit;

/// Verbatim occurrences of `content_match` anywhere in the raw text; every one is
/// replaced.
pub struct ExactLiteral;

impl Strategy<ModifyEdit> for ExactLiteral {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactLiteral
    }

    fn attempt(&self, doc: &Document<'_>, edit: &ModifyEdit, _cache: &SearchCache) -> Attempt {
        let Some(needle) = edit.content_match.as_deref().filter(|s| !s.is_empty()) else {
            return Attempt::Skipped;
        };
        if needle == edit.new_content {
            return Attempt::Rejected(EditError::NoMatch(
                "replacement is identical to the matched content".to_string(),
            ));
        }

        let source = doc.source();
        let occurrences: Vec<usize> = source.match_indices(needle).map(|(pos, _)| pos).collect();
        if occurrences.is_empty() {
            return Attempt::Skipped;
        }

        // Occurrences that are part of an earlier replacement are already applied.
        let applied: Vec<(usize, usize)> = if edit.new_content.contains(needle) {
            source
                .match_indices(edit.new_content.as_str())
                .map(|(pos, text)| (pos, pos + text.len()))
                .collect()
        } else {
            Vec::new()
        };
        let splices: Vec<Splice> = occurrences
            .into_iter()
            .filter(|&pos| {
                !applied
                    .iter()
                    .any(|&(start, end)| start <= pos && pos + needle.len() <= end)
            })
            .map(|pos| Splice::replace(pos..pos + needle.len(), edit.new_content.as_str()))
            .collect();
        if splices.is_empty() {
            return Attempt::Rejected(EditError::NoMatch(format!(
                "every `{needle}` already reads `{}`",
                edit.new_content
            )));
        }

        Attempt::Found(Located {
            elements: vec![needle.to_string()],
            splices,
            fragment: needle.to_string(),
            element_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modify(content_match: &str, new_content: &str) -> ModifyEdit {
        ModifyEdit {
            content_match: Some(content_match.to_string()),
            new_content: new_content.to_string(),
            selector: None,
            hint: None,
        }
    }

    #[test]
    fn counts_every_occurrence() {
        let doc = Document::new("<p>Acme</p><footer>Acme</footer>");
        let Attempt::Found(located) =
            ExactLiteral.attempt(&doc, &modify("Acme", "Globex"), &SearchCache::default())
        else {
            panic!("expected a match");
        };
        assert_eq!(located.transformations(), 2);
        assert!(!doc.is_parsed(), "literal hits never parse the tree");
    }

    #[test]
    fn growing_replacement_is_not_applied_twice() {
        let cache = SearchCache::default();
        let doc = Document::new("<h1>Sale ends soon</h1><p>Sale</p>");
        let Attempt::Found(located) = ExactLiteral.attempt(&doc, &modify("Sale", "Sale ends soon"), &cache)
        else {
            panic!("expected the bare occurrence");
        };
        assert_eq!(located.splices, vec![Splice::replace(26..30, "Sale ends soon")]);

        let done = Document::new("<h1>Sale ends soon</h1>");
        assert!(matches!(
            ExactLiteral.attempt(&done, &modify("Sale", "Sale ends soon"), &cache),
            Attempt::Rejected(EditError::NoMatch(_))
        ));
    }

    #[test]
    fn identical_replacement_is_rejected() {
        let doc = Document::new("<p>Acme</p>");
        assert!(matches!(
            ExactLiteral.attempt(&doc, &modify("Acme", "Acme"), &SearchCache::default()),
            Attempt::Rejected(EditError::NoMatch(_))
        ));
    }
}
