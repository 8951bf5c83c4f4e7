//! The page manifest: one import line per component in the preamble and one wrapper
//! block per component in the body.
//!
//! All edits are line-based so that inserting an entry and removing it again leaves
//! the document byte-for-byte as it was.

use crate::error::Result;
use crate::name::ComponentName;
use pagesmith_markup::{
    expand_to_lines, indent_block, line_end, line_indent, line_start, split_sections, MarkupTree,
};
use regex::Regex;
use serde::Serialize;

const CHILD_INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Before,
    After,
}

/// Where the caller asked a new component to go: `(below, "Hero")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionHint {
    pub relation: Relation,
    pub anchor: String,
}

impl PositionHint {
    pub fn new(relation: Relation, anchor: impl Into<String>) -> Self {
        Self {
            relation,
            anchor: anchor.into(),
        }
    }
}

/// Where a wrapper block actually went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "at", content = "anchor")]
pub enum Placement {
    Before(String),
    After(String),
    End,
    /// A wrapper with this id was already present; nothing was inserted.
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageManifest {
    text: String,
}

impl PageManifest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Wrapper blocks in document order: elements carrying an id whose direct children
    /// include a component tag.
    pub fn entries(&self) -> Result<Vec<ManifestEntry>> {
        let tree = MarkupTree::parse(&self.text)?;
        let entries = tree
            .elements()
            .iter()
            .enumerate()
            .filter_map(|(idx, element)| {
                let id = element.id()?;
                tree.children(idx)
                    .map(|child| &tree.element(child).tag)
                    .find(|tag| is_component_tag(tag))
                    .map(|tag| ManifestEntry {
                        name: tag.clone(),
                        id: id.to_string(),
                    })
            })
            .collect();
        Ok(entries)
    }

    pub fn has_wrapper(&self, id: &str) -> Result<bool> {
        Ok(MarkupTree::parse(&self.text)?.find_by_id(id).is_some())
    }

    pub fn has_import(&self, name: &ComponentName) -> bool {
        self.import_range(name).is_some()
    }

    /// Add `line` after the last import of the preamble, creating a preamble if the
    /// manifest has none. Returns false when the component is already imported.
    pub fn insert_import(&mut self, name: &ComponentName, line: &str) -> bool {
        if self.has_import(name) {
            return false;
        }

        let sections = split_sections(&self.text);
        match sections.preamble {
            Some(preamble) => {
                let inner = &self.text[preamble.inner.clone()];
                let at = any_import_pattern()
                    .find_iter(inner)
                    .last()
                    .map(|m| preamble.inner.start + m.end())
                    .unwrap_or(preamble.inner.start);
                let needs_newline = at > 0 && !self.text[..at].ends_with('\n');
                let text = if needs_newline {
                    format!("\n{line}\n")
                } else {
                    format!("{line}\n")
                };
                self.text.insert_str(at, &text);
            }
            None => self.text.insert_str(0, &format!("---\n{line}\n---\n")),
        }
        true
    }

    /// Drop the import line for `name`. Returns false when there was none.
    pub fn remove_import(&mut self, name: &ComponentName) -> bool {
        match self.import_range(name) {
            Some(range) => {
                self.text.replace_range(range, "");
                true
            }
            None => false,
        }
    }

    /// Insert the wrapper block for `name`. The hint's anchor is resolved by id; an
    /// unknown anchor falls back to the end of the page.
    pub fn insert_wrapper(
        &mut self,
        name: &ComponentName,
        hint: Option<&PositionHint>,
    ) -> Result<Placement> {
        let tree = MarkupTree::parse(&self.text)?;
        if tree.find_by_id(name.id()).is_some() {
            return Ok(Placement::Existing);
        }
        let block = format!("<div id=\"{}\">\n{CHILD_INDENT}<{name} />\n</div>", name.id());

        if let Some(hint) = hint {
            let anchor = ComponentName::parse(&hint.anchor)
                .ok()
                .and_then(|anchor| tree.find_by_id(anchor.id()));
            match anchor {
                Some(idx) => {
                    let span = tree.element(idx).span.clone();
                    let anchor_id = tree.element(idx).id().unwrap_or_default().to_string();
                    return Ok(match hint.relation {
                        Relation::Before => {
                            self.insert_lines_before(span.start, &block);
                            Placement::Before(anchor_id)
                        }
                        Relation::After => {
                            self.insert_lines_after(span.start, span.end, &block);
                            Placement::After(anchor_id)
                        }
                    });
                }
                None => log::warn!(
                    "anchor `{}` not found in manifest; appending {name} at the end",
                    hint.anchor
                ),
            }
        }

        if let Some(main) = tree.elements().iter().position(|el| el.is("main")) {
            let element = tree.element(main);
            let indent = match tree.children(main).next() {
                Some(child) => line_indent(&self.text, tree.element(child).span.start).to_string(),
                None => format!("{}{CHILD_INDENT}", line_indent(&self.text, element.span.start)),
            };
            let close_line = line_start(&self.text, element.inner.end);
            if self.text[close_line..element.inner.end].trim().is_empty() {
                let text = format!("{}\n", indent_block(&block, &indent));
                self.text.insert_str(close_line, &text);
            } else {
                let text = format!("\n{}\n", indent_block(&block, &indent));
                self.text.insert_str(element.inner.end, &text);
            }
        } else if let Some(last) = self
            .entries()?
            .last()
            .and_then(|entry| tree.find_by_id(&entry.id))
        {
            let span = tree.element(last).span.clone();
            self.insert_lines_after(span.start, span.end, &block);
        } else {
            let lead = if self.text.is_empty() || self.text.ends_with('\n') { "" } else { "\n" };
            self.text.push_str(&format!("{lead}{block}\n"));
        }
        Ok(Placement::End)
    }

    /// Remove the wrapper block with `id`, including its lines. Returns false when
    /// there was none.
    pub fn remove_wrapper(&mut self, id: &str) -> Result<bool> {
        let tree = MarkupTree::parse(&self.text)?;
        let Some(idx) = tree.find_by_id(id) else {
            return Ok(false);
        };
        let range = expand_to_lines(&self.text, tree.element(idx).span.clone());
        self.text.replace_range(range, "");
        Ok(true)
    }

    fn insert_lines_before(&mut self, start: usize, block: &str) {
        let line = line_start(&self.text, start);
        if self.text[line..start].trim().is_empty() {
            let indent = self.text[line..start].to_string();
            self.text
                .insert_str(line, &format!("{}\n", indent_block(block, &indent)));
        } else {
            self.text.insert_str(start, block);
        }
    }

    fn insert_lines_after(&mut self, start: usize, end: usize, block: &str) {
        let next_line = line_end(&self.text, end);
        if self.text[end..next_line].trim().is_empty() {
            let indent = line_indent(&self.text, start).to_string();
            let lead = if next_line == self.text.len() && !self.text.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            self.text.insert_str(
                next_line,
                &format!("{lead}{}\n", indent_block(block, &indent)),
            );
        } else {
            self.text.insert_str(end, block);
        }
    }

    fn import_range(&self, name: &ComponentName) -> Option<std::ops::Range<usize>> {
        let preamble = split_sections(&self.text).preamble?;
        let inner = &self.text[preamble.inner.clone()];
        let pattern = Regex::new(&format!(
            r#"(?m)^[ \t]*import\s+{}\s+from\s+['"][^'"\n]*['"][ \t]*;?[ \t]*(\r?\n|$)"#,
            regex::escape(name.as_str())
        ))
        .ok()?;
        pattern
            .find(inner)
            .map(|m| (preamble.inner.start + m.start())..(preamble.inner.start + m.end()))
    }
}

fn any_import_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?m)^[ \t]*import\b[^\n]*\n").expect("valid import regex"))
}

fn is_component_tag(tag: &str) -> bool {
    tag.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"---
import Layout from '../layouts/Layout.astro';
import Hero from '../components/Hero.astro';
import Pricing from '../components/Pricing.astro';
---
<Layout title="Home">
  <main>
    <div id="hero">
      <Hero />
    </div>
    <div id="pricing">
      <Pricing />
    </div>
  </main>
</Layout>
"#;

    fn faq() -> ComponentName {
        ComponentName::parse("Faq").unwrap()
    }

    #[test]
    fn lists_wrapper_entries_in_order() {
        let entries = PageManifest::new(PAGE).entries().unwrap();
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["hero", "pricing"]);
        assert_eq!(entries[0].name, "Hero");
    }

    #[test]
    fn inserts_after_anchor_with_matching_indent() {
        let mut manifest = PageManifest::new(PAGE);
        let placement = manifest
            .insert_wrapper(&faq(), Some(&PositionHint::new(Relation::After, "Hero")))
            .unwrap();
        assert_eq!(placement, Placement::After("hero".to_string()));
        assert!(manifest.as_str().contains(
            "      <Hero />\n    </div>\n    <div id=\"faq\">\n      <Faq />\n    </div>\n    <div id=\"pricing\">"
        ));
    }

    #[test]
    fn inserts_before_anchor() {
        let mut manifest = PageManifest::new(PAGE);
        manifest
            .insert_wrapper(&faq(), Some(&PositionHint::new(Relation::Before, "pricing")))
            .unwrap();
        let ids: Vec<String> = manifest.entries().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["hero", "faq", "pricing"]);
    }

    #[test]
    fn unknown_anchor_appends_inside_main() {
        let mut manifest = PageManifest::new(PAGE);
        let placement = manifest
            .insert_wrapper(&faq(), Some(&PositionHint::new(Relation::After, "Gallery")))
            .unwrap();
        assert_eq!(placement, Placement::End);
        assert!(manifest
            .as_str()
            .contains("    <div id=\"faq\">\n      <Faq />\n    </div>\n  </main>"));
    }

    #[test]
    fn existing_wrapper_is_not_duplicated() {
        let mut manifest = PageManifest::new(PAGE);
        let hero = ComponentName::parse("hero").unwrap();
        assert_eq!(manifest.insert_wrapper(&hero, None).unwrap(), Placement::Existing);
        assert_eq!(manifest.as_str(), PAGE);
    }

    #[test]
    fn insert_then_remove_restores_the_manifest() {
        let mut manifest = PageManifest::new(PAGE);
        let name = faq();
        assert!(manifest.insert_import(&name, "import Faq from '../components/Faq.astro';"));
        manifest
            .insert_wrapper(&name, Some(&PositionHint::new(Relation::After, "Hero")))
            .unwrap();
        assert!(manifest.has_import(&name));

        assert!(manifest.remove_wrapper(name.id()).unwrap());
        assert!(manifest.remove_import(&name));
        assert_eq!(manifest.as_str(), PAGE);
    }

    #[test]
    fn import_goes_after_the_last_import() {
        let mut manifest = PageManifest::new(PAGE);
        manifest.insert_import(&faq(), "import Faq from '../components/Faq.astro';");
        assert!(manifest.as_str().starts_with(
            "---\nimport Layout from '../layouts/Layout.astro';\nimport Hero from '../components/Hero.astro';\nimport Pricing from '../components/Pricing.astro';\nimport Faq from '../components/Faq.astro';\n---\n"
        ));
    }

    #[test]
    fn manifest_without_preamble_gains_one() {
        let mut manifest = PageManifest::new("<main>\n</main>\n");
        manifest.insert_import(&faq(), "import Faq from './Faq.astro';");
        manifest.insert_wrapper(&faq(), None).unwrap();
        assert_eq!(
            manifest.as_str(),
            "---\nimport Faq from './Faq.astro';\n---\n<main>\n  <div id=\"faq\">\n    <Faq />\n  </div>\n</main>\n"
        );
    }

    #[test]
    fn removing_absent_entries_reports_false() {
        let mut manifest = PageManifest::new(PAGE);
        assert!(!manifest.remove_wrapper("faq").unwrap());
        assert!(!manifest.remove_import(&faq()));
        assert_eq!(manifest.as_str(), PAGE);
    }
}
