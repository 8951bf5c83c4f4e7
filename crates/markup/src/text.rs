use crate::sections::split_sections;
use std::ops::Range;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text a reader would see for a markup fragment: tags and comments dropped, common
/// entities decoded, whitespace collapsed.
pub fn visible_text(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let tail = &rest[lt..];

        if let Some(comment) = tail.strip_prefix("<!--") {
            rest = match comment.find("-->") {
                Some(end) => &comment[end + 3..],
                None => "",
            };
            continue;
        }

        let opens_tag = tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        if !opens_tag {
            out.push('<');
            rest = &tail[1..];
            continue;
        }

        match tag_end(tail) {
            Some(end) => rest = &tail[end..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);

    normalize_whitespace(&decode_entities(&out))
}

/// Byte ranges of the text runs in a document body: everything outside tags,
/// comments, `<script>`/`<style>` contents and the `---` preamble. Runs are returned
/// untrimmed and in document order.
pub fn text_ranges(source: &str) -> Vec<Range<usize>> {
    let body = split_sections(source).body;
    let mut runs = Vec::new();
    let mut pos = body.start;
    let mut run_start = pos;

    while let Some(offset) = source[pos..body.end].find('<') {
        let lt = pos + offset;
        let tail = &source[lt..body.end];

        let skip_to = if let Some(comment) = tail.strip_prefix("<!--") {
            comment
                .find("-->")
                .map_or(body.end, |end| lt + 4 + end + 3)
        } else if tail[1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
        {
            let end = tag_end(tail).map_or(body.end, |end| lt + end);
            match raw_text_element(tail) {
                Some(name) => closing_tag_end(source, end, body.end, name),
                None => end,
            }
        } else {
            pos = lt + 1;
            continue;
        };

        if run_start < lt {
            runs.push(run_start..lt);
        }
        pos = skip_to;
        run_start = skip_to;
    }
    if run_start < body.end {
        runs.push(run_start..body.end);
    }
    runs
}

/// `script` or `style` when `tail` opens one of them.
fn raw_text_element(tail: &str) -> Option<&'static str> {
    ["script", "style"].into_iter().find(|name| {
        tail.get(1..=name.len())
            .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
            && !tail[name.len() + 1..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// Offset just past `</name>` searching from `from`, else `limit`.
fn closing_tag_end(source: &str, from: usize, limit: usize, name: &str) -> usize {
    let closing = format!("</{name}");
    let haystack = source[from..limit].to_ascii_lowercase();
    match haystack.find(&closing) {
        Some(offset) => {
            let start = from + offset;
            tag_end(&source[start..limit]).map_or(limit, |end| start + end)
        }
        None => limit,
    }
}

/// Byte offset just past the `>` closing the tag that starts `tail`, honouring quotes.
fn tag_end(tail: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (idx, c) in tail.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(idx + 1),
            None => {}
        }
    }
    None
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
