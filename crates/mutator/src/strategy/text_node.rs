use super::{outermost, replace_contents, Attempt, Strategy};
use crate::cache::SearchCache;
use crate::document::Document;
use crate::outcome::StrategyKind;
use pagesmith_markup::{normalize_whitespace, tags::TEXT_TAGS};
use pagesmith_protocol::ModifyEdit;

/// Text-bearing elements whose visible text equals `content_match`, for text the raw
/// markup splits with inline tags (`Old <span>Headline</span>`).
pub struct TextNode;

impl Strategy<ModifyEdit> for TextNode {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TextNode
    }

    fn attempt(&self, doc: &Document<'_>, edit: &ModifyEdit, _cache: &SearchCache) -> Attempt {
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
        let hits: Vec<usize> = tree
            .find_by_tags(TEXT_TAGS)
            .into_iter()
            .filter(|&idx| tree.text(source, idx) == needle)
            .collect();
        let hits = outermost(tree, &hits);
        if hits.is_empty() {
            return Attempt::Skipped;
        }

        log::debug!("text node match for `{needle}` in {} element(s)", hits.len());
        replace_contents(doc, tree, &hits, &edit.new_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_markup::apply_splices;
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_text_split_by_inline_markup() {
        let source = "<section>\n  <h1 class=\"hero\">Old <span class=\"accent\">Headline</span></h1>\n</section>\n";
        let doc = Document::new(source);
        let edit = ModifyEdit {
            content_match: Some("Old Headline".into()),
            new_content: "New Headline".into(),
            selector: None,
            hint: None,
        };

        let Attempt::Found(located) = TextNode.attempt(&doc, &edit, &SearchCache::default()) else {
            panic!("expected a text node match");
        };
        assert_eq!(located.element_path.as_deref(), Some("section > h1.hero"));
        assert_eq!(
            apply_splices(source, &located.splices).unwrap(),
            "<section>\n  <h1 class=\"hero\">New Headline</h1>\n</section>\n"
        );
    }

    #[test]
    fn ignores_non_text_containers() {
        let doc = Document::new("<div>Plain words</div>");
        let edit = ModifyEdit {
            content_match: Some("Plain words".into()),
            new_content: "Other".into(),
            selector: None,
            hint: None,
        };
        assert_eq!(
            TextNode.attempt(&doc, &edit, &SearchCache::default()),
            Attempt::Skipped
        );
    }
}
