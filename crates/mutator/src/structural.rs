//! Operations that change structure rather than text: insert, move, restructure and
//! image attribute updates. Each resolves its target to exactly one element first.

use crate::document::Document;
use crate::error::{EditError, Result};
use crate::outcome::Located;
use crate::removal::bounded_item;
use crate::strategy::{innermost, select_unique};
use pagesmith_markup::{
    expand_to_lines, indent_block, line_end, line_indent, line_start, normalize_whitespace,
    set_attribute, MarkupTree, Splice,
};
use pagesmith_protocol::{ElementTarget, ImageEdit, InsertEdit, InsertPosition, MoveEdit, RestructureEdit};

const CHILD_INDENT: &str = "  ";

pub fn insert(doc: &Document<'_>, edit: &InsertEdit) -> Result<Located> {
    let tree = doc.tree()?;
    let source = doc.source();

    let (splice, path) = match &edit.anchor {
        Some(anchor) => {
            let idx = resolve_target(tree, source, anchor, true)?;
            (place(tree, source, idx, edit.position, &edit.new_content)?, Some(tree.path(idx)))
        }
        None => match tree.roots().last() {
            Some(last) => (
                place(tree, source, last, edit.position, &edit.new_content)?,
                Some(tree.path(last)),
            ),
            None => (append_to_document(source, &edit.new_content), None),
        },
    };

    Ok(Located {
        fragment: edit.new_content.clone(),
        elements: path.iter().cloned().collect(),
        element_path: path,
        splices: vec![splice],
    })
}

pub fn relocate(doc: &Document<'_>, edit: &MoveEdit) -> Result<Located> {
    let tree = doc.tree()?;
    let source = doc.source();

    let moved = resolve_target(tree, source, &edit.source, true)?;
    let anchor = resolve_target(tree, source, &edit.anchor, true)?;
    if moved == anchor || tree.is_ancestor(moved, anchor) {
        return Err(EditError::NoMatch(format!(
            "cannot move {} relative to itself or its own content",
            tree.path(moved)
        )));
    }

    let span = tree.element(moved).span.clone();
    let cut = expand_to_lines(source, span.clone());
    let fragment = &source[cut.clone()];

    Ok(Located {
        splices: vec![
            Splice::delete(cut),
            place(tree, source, anchor, edit.position, fragment)?,
        ],
        fragment: source[span].to_string(),
        element_path: Some(tree.path(moved)),
        elements: vec![tree.path(moved), tree.path(anchor)],
    })
}

pub fn restructure(doc: &Document<'_>, edit: &RestructureEdit) -> Result<Located> {
    let tree = doc.tree()?;
    let source = doc.source();

    let idx = resolve_target(tree, source, &edit.target, false)?;
    let span = tree.element(idx).span.clone();
    let replacement = indent_block(&edit.new_content, line_indent(source, span.start))
        .trim_start()
        .to_string();
    if replacement == source[span.clone()] {
        return Err(EditError::NoMatch(format!(
            "{} already has the requested structure",
            tree.path(idx)
        )));
    }

    Ok(Located {
        fragment: source[span.clone()].to_string(),
        element_path: Some(tree.path(idx)),
        elements: vec![tree.path(idx)],
        splices: vec![Splice::replace(span, replacement)],
    })
}

pub fn update_image(doc: &Document<'_>, edit: &ImageEdit) -> Result<Located> {
    let tree = doc.tree()?;
    let source = doc.source();

    let target = resolve_target(tree, source, &edit.target, false)?;
    let img = if tree.element(target).is("img") {
        target
    } else {
        let images: Vec<usize> = (target + 1..tree.len())
            .filter(|&idx| tree.element(idx).is("img") && tree.is_ancestor(target, idx))
            .collect();
        match images.as_slice() {
            [only] => *only,
            [] => {
                return Err(EditError::NotFound(format!(
                    "no image inside {}",
                    tree.path(target)
                )))
            }
            several => {
                return Err(EditError::Ambiguous(format!(
                    "{} images inside {}",
                    several.len(),
                    tree.path(target)
                )))
            }
        }
    };

    let element = tree.element(img);
    let splices: Vec<Splice> = [("src", edit.src.as_deref()), ("alt", edit.alt.as_deref())]
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .filter(|(name, value)| element.attr_value(name) != Some(*value))
        .map(|(name, value)| set_attribute(element, name, value))
        .collect();
    if splices.is_empty() {
        return Err(EditError::NoMatch(format!(
            "{} already has the requested attributes",
            tree.path(img)
        )));
    }

    Ok(Located {
        fragment: source[element.open_tag.clone()].to_string(),
        element_path: Some(tree.path(img)),
        elements: vec![tree.path(img)],
        splices,
    })
}

/// Resolve an instruction target to one element. Text targets prefer exact visible
/// text, then containment; with `widen`, they grow to the enclosing list item.
pub(crate) fn resolve_target(
    tree: &MarkupTree,
    source: &str,
    target: &ElementTarget,
    widen: bool,
) -> Result<usize> {
    if let Some(raw) = target.selector.as_deref() {
        return select_unique(tree, source, raw, target.content_match.as_deref());
    }
    let Some(needle) = target.content_match.as_deref().map(normalize_whitespace) else {
        return Err(EditError::NotFound("target names no selector or text".to_string()));
    };

    let texts: Vec<String> = (0..tree.len()).map(|idx| tree.text(source, idx)).collect();
    let mut hits: Vec<usize> = (0..tree.len()).filter(|&idx| texts[idx] == needle).collect();
    if hits.is_empty() {
        hits = (0..tree.len()).filter(|&idx| texts[idx].contains(&needle)).collect();
    }

    let idx = match innermost(tree, &hits).as_slice() {
        [only] => *only,
        [] => return Err(EditError::NotFound(format!("no element reads `{needle}`"))),
        several => {
            return Err(EditError::Ambiguous(format!(
                "{} elements read `{needle}`",
                several.len()
            )))
        }
    };
    Ok(if widen {
        bounded_item(tree, idx).unwrap_or(idx)
    } else {
        idx
    })
}

fn place(
    tree: &MarkupTree,
    source: &str,
    idx: usize,
    position: InsertPosition,
    fragment: &str,
) -> Result<Splice> {
    let element = tree.element(idx);
    let span = element.span.clone();

    match position {
        InsertPosition::Before => {
            let start = line_start(source, span.start);
            if source[start..span.start].trim().is_empty() {
                let indent = &source[start..span.start];
                Ok(Splice::insert(start, format!("{}\n", indent_block(fragment, indent))))
            } else {
                Ok(Splice::insert(span.start, fragment.trim()))
            }
        }
        InsertPosition::After => {
            let end = line_end(source, span.end);
            if source[span.end..end].trim().is_empty() {
                let block = indent_block(fragment, line_indent(source, span.start));
                let lead = if end == source.len() && !source.ends_with('\n') { "\n" } else { "" };
                Ok(Splice::insert(end, format!("{lead}{block}\n")))
            } else {
                Ok(Splice::insert(span.end, fragment.trim()))
            }
        }
        InsertPosition::Prepend | InsertPosition::Append if element.self_closing => {
            Err(EditError::NoMatch(format!(
                "{} cannot hold children",
                tree.path(idx)
            )))
        }
        InsertPosition::Prepend => {
            let inner = &element.inner;
            if !source[inner.clone()].contains('\n') {
                return Ok(Splice::insert(inner.start, fragment.trim()));
            }
            let block = indent_block(fragment, &child_indent(tree, source, idx));
            Ok(Splice::insert(inner.start, format!("\n{block}")))
        }
        InsertPosition::Append => {
            let inner = &element.inner;
            if !source[inner.clone()].contains('\n') {
                return Ok(Splice::insert(inner.end, fragment.trim()));
            }
            let block = indent_block(fragment, &child_indent(tree, source, idx));
            let start = line_start(source, inner.end);
            if source[start..inner.end].trim().is_empty() {
                Ok(Splice::insert(start, format!("{block}\n")))
            } else {
                Ok(Splice::insert(inner.end, format!("\n{block}")))
            }
        }
    }
}

fn child_indent(tree: &MarkupTree, source: &str, idx: usize) -> String {
    match tree.children(idx).next() {
        Some(child) => line_indent(source, tree.element(child).span.start).to_string(),
        None => format!("{}{CHILD_INDENT}", line_indent(source, tree.element(idx).span.start)),
    }
}

fn append_to_document(source: &str, fragment: &str) -> Splice {
    let lead = if source.is_empty() || source.ends_with('\n') { "" } else { "\n" };
    Splice::insert(source.len(), format!("{lead}{}\n", indent_block(fragment, "")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_markup::apply_splices;
    use pretty_assertions::assert_eq;

    const NAV: &str = "<nav>\n  <ul>\n    <li><a href=\"/\">Home</a></li>\n    <li><a href=\"/blog\">Blog</a></li>\n  </ul>\n</nav>\n";

    fn text(content_match: &str) -> ElementTarget {
        ElementTarget::new(None, Some(content_match.to_string()))
    }

    fn run(located: Result<Located>, source: &str) -> String {
        apply_splices(source, &located.unwrap().splices).unwrap()
    }

    #[test]
    fn inserts_after_anchor_item() {
        let edit = InsertEdit {
            new_content: "<li><a href=\"/about\">About</a></li>".into(),
            anchor: Some(text("Home")),
            position: InsertPosition::After,
        };
        assert_eq!(
            run(insert(&Document::new(NAV), &edit), NAV),
            "<nav>\n  <ul>\n    <li><a href=\"/\">Home</a></li>\n    <li><a href=\"/about\">About</a></li>\n    <li><a href=\"/blog\">Blog</a></li>\n  </ul>\n</nav>\n"
        );
    }

    #[test]
    fn appends_inside_container() {
        let edit = InsertEdit {
            new_content: "<li>Contact</li>".into(),
            anchor: Some(ElementTarget::new(Some("ul".into()), None)),
            position: InsertPosition::Append,
        };
        let out = run(insert(&Document::new(NAV), &edit), NAV);
        assert!(out.ends_with("    <li>Contact</li>\n  </ul>\n</nav>\n"), "{out}");
    }

    #[test]
    fn moves_item_before_anchor() {
        let edit = MoveEdit {
            source: text("Blog"),
            anchor: text("Home"),
            position: InsertPosition::Before,
        };
        assert_eq!(
            run(relocate(&Document::new(NAV), &edit), NAV),
            "<nav>\n  <ul>\n    <li><a href=\"/blog\">Blog</a></li>\n    <li><a href=\"/\">Home</a></li>\n  </ul>\n</nav>\n"
        );
    }

    #[test]
    fn move_into_itself_is_refused() {
        let edit = MoveEdit {
            source: ElementTarget::new(Some("ul".into()), None),
            anchor: text("Home"),
            position: InsertPosition::After,
        };
        assert!(matches!(
            relocate(&Document::new(NAV), &edit),
            Err(EditError::NoMatch(_))
        ));
    }

    #[test]
    fn restructure_keeps_indentation() {
        let source = "<section>\n  <div class=\"cta\">Old</div>\n</section>\n";
        let edit = RestructureEdit {
            target: ElementTarget::new(Some(".cta".into()), None),
            new_content: "<div class=\"cta\">\n  <a href=\"/go\">Go</a>\n</div>".into(),
        };
        assert_eq!(
            run(restructure(&Document::new(source), &edit), source),
            "<section>\n  <div class=\"cta\">\n    <a href=\"/go\">Go</a>\n  </div>\n</section>\n"
        );
    }

    #[test]
    fn image_update_finds_nested_img() {
        let source = "<figure id=\"team\">\n  <img src=\"/old.jpg\">\n</figure>\n";
        let edit = ImageEdit {
            target: ElementTarget::new(Some("#team".into()), None),
            src: Some("/new.jpg".into()),
            alt: Some("Our team".into()),
        };
        assert_eq!(
            run(update_image(&Document::new(source), &edit), source),
            "<figure id=\"team\">\n  <img src=\"/new.jpg\" alt=\"Our team\">\n</figure>\n"
        );
    }

    #[test]
    fn unchanged_image_is_a_no_op() {
        let source = "<img src=\"/a.png\" alt=\"A\">";
        let edit = ImageEdit {
            target: ElementTarget::new(Some("img".into()), None),
            src: Some("/a.png".into()),
            alt: None,
        };
        assert!(matches!(
            update_image(&Document::new(source), &edit),
            Err(EditError::NoMatch(_))
        ));
    }
}
