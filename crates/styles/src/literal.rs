//! Literal axis: utilities carrying an explicit colour, `bg-[#0f172a]`,
//! `hover:text-[rgb(0_0_0)]`, `dark:border-[#fff]`.

use crate::error::{Result, StyleError};
use pagesmith_markup::{set_attribute, MarkupTree, Splice};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralToken<'a> {
    /// Variant prefixes including their colons, `dark:hover:`.
    pub variants: &'a str,
    pub utility: &'a str,
    pub value: &'a str,
}

impl<'a> LiteralToken<'a> {
    pub fn parse(token: &'a str) -> Option<Self> {
        let caps = token_pattern().captures(token)?;
        Some(Self {
            variants: caps.get(1).map_or("", |m| m.as_str()),
            utility: caps.get(2)?.as_str(),
            value: caps.get(3)?.as_str(),
        })
    }

    pub fn is_dark(&self) -> bool {
        self.variants.split(':').any(|variant| variant == "dark")
    }

    fn with_value(&self, value: &str) -> String {
        format!("{}{}-[{value}]", self.variants, self.utility)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^((?:[a-z0-9_-]+:)*)([a-z][a-z0-9-]*?)-\[(#[0-9a-fA-F]{3,8}|(?:rgb|rgba|hsl|hsla)\([^\]\s]*\))\]$",
        )
        .expect("valid literal colour regex")
    })
}

/// Canonical form of a user-supplied colour: lowercase, `#` added to bare hex.
pub fn normalize_color(raw: &str) -> Result<String> {
    static HEX: OnceLock<Regex> = OnceLock::new();
    static FUNCTIONAL: OnceLock<Regex> = OnceLock::new();
    let hex = HEX.get_or_init(|| Regex::new(r"^#?[0-9a-f]{3,8}$").expect("valid hex regex"));
    let functional = FUNCTIONAL
        .get_or_init(|| Regex::new(r"^(rgb|rgba|hsl|hsla)\([^\]\s]*\)$").expect("valid colour regex"));

    let value = raw.trim().to_ascii_lowercase();
    if hex.is_match(&value) {
        Ok(if value.starts_with('#') {
            value
        } else {
            format!("#{value}")
        })
    } else if functional.is_match(&value) {
        Ok(value)
    } else {
        Err(StyleError::InvalidColor(raw.to_string()))
    }
}

fn same_color(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Literal colour tokens in every class list of a document.
pub fn scan(source: &str) -> Result<Vec<String>> {
    let tree = MarkupTree::parse(source)?;
    Ok(tree
        .elements()
        .iter()
        .flat_map(|element| element.classes())
        .filter(|token| LiteralToken::parse(token).is_some())
        .map(str::to_string)
        .collect())
}

/// Rewrite `from` to `to` in every class list. `dark:` tokens of a utility whose base
/// token matched are rewritten with it, to `dark` when given.
pub fn rewrite(
    source: &str,
    from: &str,
    to: &str,
    dark: Option<&str>,
) -> Result<Option<(Vec<Splice>, Vec<String>)>> {
    let tree = MarkupTree::parse(source)?;
    let mut splices = Vec::new();
    let mut written = Vec::new();

    for element in tree.elements() {
        let Some(attr) = element.class_attr() else {
            continue;
        };
        let Some(value) = attr.value.as_deref() else {
            continue;
        };
        if let Some((classes, changed)) = rewrite_class_list(value, from, to, dark) {
            splices.push(set_attribute(element, &attr.name, &classes));
            written.extend(changed);
        }
    }

    Ok((!splices.is_empty()).then_some((splices, written)))
}

fn rewrite_class_list(
    value: &str,
    from: &str,
    to: &str,
    dark: Option<&str>,
) -> Option<(String, Vec<String>)> {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let parsed: Vec<Option<LiteralToken>> = tokens.iter().map(|t| LiteralToken::parse(t)).collect();

    let matched_utilities: HashSet<&str> = parsed
        .iter()
        .flatten()
        .filter(|token| !token.is_dark() && same_color(token.value, from))
        .map(|token| token.utility)
        .collect();

    let mut changed = Vec::new();
    let rewritten: Vec<String> = tokens
        .iter()
        .zip(&parsed)
        .map(|(raw, token)| {
            let replacement = token.and_then(|token| {
                if !token.is_dark() && same_color(token.value, from) {
                    Some(token.with_value(to))
                } else if token.is_dark()
                    && (same_color(token.value, from) || matched_utilities.contains(token.utility))
                {
                    Some(token.with_value(dark.unwrap_or(to)))
                } else {
                    None
                }
            });
            match replacement {
                Some(new) if new != *raw => {
                    changed.push(new.clone());
                    new
                }
                _ => raw.to_string(),
            }
        })
        .collect();

    (!changed.is_empty()).then(|| (rewritten.join(" "), changed))
}
