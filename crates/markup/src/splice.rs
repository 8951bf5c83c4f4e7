use crate::error::{MarkupError, Result};
use crate::text::escape_attribute;
use crate::tree::Element;
use std::ops::Range;

/// Replace `range` with `text`. An empty range is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub range: Range<usize>,
    pub text: String,
}

impl Splice {
    pub fn replace(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            text: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            text: String::new(),
        }
    }
}

/// Apply non-overlapping splices. Insertions at the same offset keep their given order.
pub fn apply_splices(source: &str, splices: &[Splice]) -> Result<String> {
    let mut ordered: Vec<&Splice> = splices.iter().collect();
    ordered.sort_by_key(|splice| (splice.range.start, splice.range.end));

    for splice in &ordered {
        let range = &splice.range;
        if range.start > range.end
            || range.end > source.len()
            || !source.is_char_boundary(range.start)
            || !source.is_char_boundary(range.end)
        {
            return Err(MarkupError::InvalidRange(range.clone()));
        }
    }
    for pair in ordered.windows(2) {
        let (first, second) = (&pair[0].range, &pair[1].range);
        let touches = second.start < first.end
            || (second.start == first.start && !first.is_empty() && !second.is_empty());
        if touches {
            return Err(MarkupError::OverlappingSplices {
                first: first.clone(),
                second: second.clone(),
            });
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for splice in ordered {
        out.push_str(&source[cursor..splice.range.start]);
        out.push_str(&splice.text);
        cursor = splice.range.end;
    }
    out.push_str(&source[cursor..]);
    Ok(out)
}

/// Widen `range` to whole lines when nothing but whitespace shares those lines, so a
/// removal does not leave an empty indented line behind.
pub fn expand_to_lines(source: &str, range: Range<usize>) -> Range<usize> {
    let line_start = line_start(source, range.start);
    let before = &source[line_start..range.start];
    if !before.trim().is_empty() {
        return range;
    }

    let line_end = source[range.end..]
        .find('\n')
        .map(|offset| range.end + offset + 1)
        .unwrap_or(source.len());
    let after = &source[range.end..line_end];
    if !after.trim().is_empty() {
        return range;
    }

    line_start..line_end
}

pub fn line_start(source: &str, pos: usize) -> usize {
    source[..pos].rfind('\n').map_or(0, |nl| nl + 1)
}

/// Offset just after the newline ending the line that contains `pos`.
pub fn line_end(source: &str, pos: usize) -> usize {
    source[pos..]
        .find('\n')
        .map(|offset| pos + offset + 1)
        .unwrap_or(source.len())
}

/// Leading whitespace of the line containing `pos`.
pub fn line_indent(source: &str, pos: usize) -> &str {
    let start = line_start(source, pos);
    let line = &source[start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}

/// Re-indent a multi-line fragment so each line starts with `indent`.
pub fn indent_block(fragment: &str, indent: &str) -> String {
    let lines: Vec<&str> = fragment.trim_matches('\n').lines().collect();
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{}", &line[common.min(line.len())..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Set (or add) an attribute on an element's opening tag.
pub fn set_attribute(element: &Element, name: &str, value: &str) -> Splice {
    let escaped = escape_attribute(value);
    match element.attr(name) {
        Some(attr) => match &attr.value_span {
            Some(span) => Splice::replace(span.clone(), escaped),
            None => Splice::replace(attr.span.clone(), format!("{name}=\"{escaped}\"")),
        },
        None => Splice::insert(
            element.attribute_insertion_point(),
            format!(" {name}=\"{escaped}\""),
        ),
    }
}
