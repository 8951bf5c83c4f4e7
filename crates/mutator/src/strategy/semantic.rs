use super::{replace_contents, Attempt, Strategy};
use crate::cache::SearchCache;
use crate::document::Document;
use crate::outcome::StrategyKind;
use pagesmith_markup::{tags::HEADING_TAGS, Element, MarkupTree};
use pagesmith_protocol::ModifyEdit;

/// Element family a free-text hint points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticCategory {
    CallToAction,
    Emphasis,
    Heading,
    Paragraph,
}

impl SemanticCategory {
    pub fn infer(hint: &str) -> Option<Self> {
        let hint = hint.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|word| hint.contains(word));

        if mentions(&["button", "cta", "call to action", "call-to-action"]) {
            Some(Self::CallToAction)
        } else if mentions(&["rating", "star", "emphasi", "highlight", "bold", "review score"]) {
            Some(Self::Emphasis)
        } else if mentions(&["heading", "headline", "title", "header"]) {
            Some(Self::Heading)
        } else if mentions(&["paragraph", "description", "text", "copy", "tagline"]) {
            Some(Self::Paragraph)
        } else {
            None
        }
    }

    fn admits(self, element: &Element) -> bool {
        match self {
            Self::CallToAction => {
                element.is("button")
                    || element.attr_value("role") == Some("button")
                    || (element.is("a")
                        && element
                            .classes()
                            .any(|class| class.contains("btn") || class.contains("button")))
            }
            Self::Emphasis => element.is_any(&["em", "strong", "b", "i", "mark"]),
            Self::Heading => element.is_any(HEADING_TAGS),
            Self::Paragraph => element.is("p"),
        }
    }

    pub fn candidates(self, tree: &MarkupTree) -> Vec<usize> {
        tree.elements()
            .iter()
            .enumerate()
            .filter(|(_, element)| self.admits(element))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Last resort: infer what kind of element the hint talks about and rewrite the last
/// one of that kind in the document.
pub struct SemanticHeuristic;

impl Strategy<ModifyEdit> for SemanticHeuristic {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SemanticHeuristic
    }

    fn attempt(&self, doc: &Document<'_>, edit: &ModifyEdit, _cache: &SearchCache) -> Attempt {
        let Some(category) = edit.hint.as_deref().and_then(SemanticCategory::infer) else {
            return Attempt::Skipped;
        };
        let tree = match doc.tree() {
            Ok(tree) => tree,
            Err(err) => return Attempt::Rejected(err),
        };
        let Some(&last) = category.candidates(tree).last() else {
            return Attempt::Skipped;
        };

        log::debug!("semantic heuristic picked {} for {category:?}", tree.path(last));
        replace_contents(doc, tree, &[last], &edit.new_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_markup::apply_splices;

    #[test]
    fn infers_categories_in_priority_order() {
        assert_eq!(
            SemanticCategory::infer("change the CTA button text"),
            Some(SemanticCategory::CallToAction)
        );
        assert_eq!(SemanticCategory::infer("the star rating"), Some(SemanticCategory::Emphasis));
        assert_eq!(SemanticCategory::infer("Main headline"), Some(SemanticCategory::Heading));
        assert_eq!(SemanticCategory::infer("intro copy"), Some(SemanticCategory::Paragraph));
        assert_eq!(SemanticCategory::infer("the logo"), None);
    }

    #[test]
    fn last_candidate_wins() {
        let source = r#"<div>
  <a class="btn" href="/a">Learn more</a>
  <button>Sign up</button>
</div>"#;
        let doc = Document::new(source);
        let edit = ModifyEdit {
            content_match: Some("Join now".into()),
            new_content: "Join today".into(),
            selector: None,
            hint: Some("button label".into()),
        };
        let Attempt::Found(located) = SemanticHeuristic.attempt(&doc, &edit, &SearchCache::default())
        else {
            panic!("expected the heuristic to pick a button");
        };
        let out = apply_splices(source, &located.splices).unwrap();
        assert!(out.contains("Learn more"));
        assert!(out.contains("<button>Join today</button>"));
    }
}
