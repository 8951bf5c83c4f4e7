//! A small CSS selector subset: type, `#id`, `.class`, `[attr]`, `[attr=v]` (and
//! `~= ^= $= *=`), descendant and child combinators, comma groups, plus the pseudo
//! classes `:contains(text)`, `:nth-of-type(n)`, `:first-of-type` and `:last-of-type`.

use crate::error::{MarkupError, Result};
use crate::tree::MarkupTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    alternatives: Vec<Vec<Step>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Relation to the previous step; ignored on the first one.
    combinator: Combinator,
    compound: Compound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
    pseudos: Vec<Pseudo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Word(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrTest {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pseudo {
    Contains(String),
    NthOfType(usize),
    LastOfType,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MarkupError::selector(raw, "empty selector"));
        }

        let mut parser = SelectorParser {
            raw,
            chars: trimmed.chars().collect(),
            pos: 0,
        };
        let mut alternatives = vec![parser.complex()?];
        while parser.eat(',') {
            alternatives.push(parser.complex()?);
        }
        parser.skip_ws();
        if parser.pos < parser.chars.len() {
            return Err(parser.error(format!("unexpected `{}`", parser.chars[parser.pos])));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, tree: &MarkupTree, source: &str, idx: usize) -> bool {
        self.alternatives
            .iter()
            .any(|steps| matches_steps(tree, source, idx, steps))
    }
}

fn matches_steps(tree: &MarkupTree, source: &str, idx: usize, steps: &[Step]) -> bool {
    let Some((last, rest)) = steps.split_last() else {
        return true;
    };
    if !last.compound.matches(tree, source, idx) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match last.combinator {
        Combinator::Child => tree
            .element(idx)
            .parent
            .is_some_and(|parent| matches_steps(tree, source, parent, rest)),
        Combinator::Descendant => tree
            .ancestors(idx)
            .any(|ancestor| matches_steps(tree, source, ancestor, rest)),
    }
}

impl Compound {
    fn matches(&self, tree: &MarkupTree, source: &str, idx: usize) -> bool {
        let element = tree.element(idx);
        if let Some(tag) = &self.tag {
            if tag != "*" && !element.is(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        for test in &self.attrs {
            let Some(attr) = element.attr(&test.name) else {
                return false;
            };
            let value = attr.value.as_deref().unwrap_or("");
            let ok = match &test.op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == expected,
                AttrOp::Word(expected) => value.split_whitespace().any(|w| w == expected),
                AttrOp::Prefix(expected) => value.starts_with(expected.as_str()),
                AttrOp::Suffix(expected) => value.ends_with(expected.as_str()),
                AttrOp::Substring(expected) => value.contains(expected.as_str()),
            };
            if !ok {
                return false;
            }
        }
        self.pseudos.iter().all(|pseudo| match pseudo {
            Pseudo::Contains(text) => tree.text(source, idx).contains(text.as_str()),
            Pseudo::NthOfType(n) => type_position(tree, idx).0 == *n,
            Pseudo::LastOfType => {
                let (position, count) = type_position(tree, idx);
                position == count
            }
        })
    }
}

/// 1-based position of `idx` among same-tag siblings, and the number of such siblings.
fn type_position(tree: &MarkupTree, idx: usize) -> (usize, usize) {
    let tag = &tree.element(idx).tag;
    let same: Vec<usize> = tree
        .siblings(idx)
        .into_iter()
        .filter(|&sibling| tree.element(sibling).is(tag))
        .collect();
    let position = same.iter().position(|&s| s == idx).map_or(0, |p| p + 1);
    (position, same.len())
}

struct SelectorParser<'a> {
    raw: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl SelectorParser<'_> {
    fn error(&self, reason: impl Into<String>) -> MarkupError {
        MarkupError::selector(self.raw, reason)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn complex(&mut self) -> Result<Vec<Step>> {
        self.skip_ws();
        let mut steps = vec![Step {
            combinator: Combinator::Descendant,
            compound: self.compound()?,
        }];

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected `{c}`"))),
            };
            steps.push(Step {
                combinator,
                compound: self.compound()?,
            });
        }
        Ok(steps)
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?);
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.attr_test()?);
                }
                Some(':') => {
                    self.pos += 1;
                    compound.pseudos.push(self.pseudo()?);
                }
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a selector, found `{c}`")),
                None => self.error("selector ends unexpectedly"),
            });
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                let escaped = self
                    .chars
                    .get(self.pos + 1)
                    .copied()
                    .ok_or_else(|| self.error("dangling escape"))?;
                out.push(escaped);
                self.pos += 2;
            } else if is_ident_char(c) {
                out.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.error("expected a name"));
        }
        Ok(out)
    }

    fn attr_test(&mut self) -> Result<AttrTest> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrTest {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('~' | '^' | '$' | '*')) if self.chars.get(self.pos + 1) == Some(&'=') => {
                self.pos += 2;
                c
            }
            _ => return Err(self.error("malformed attribute test")),
        };

        self.skip_ws();
        let value = self.value_until(']')?;
        if !self.eat(']') {
            return Err(self.error("unclosed `[`"));
        }

        let op = match op {
            '~' => AttrOp::Word(value),
            '^' => AttrOp::Prefix(value),
            '$' => AttrOp::Suffix(value),
            '*' => AttrOp::Substring(value),
            _ => AttrOp::Equals(value),
        };
        Ok(AttrTest { name, op })
    }

    fn pseudo(&mut self) -> Result<Pseudo> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-of-type" | "first" => Ok(Pseudo::NthOfType(1)),
            "last-of-type" | "last" => Ok(Pseudo::LastOfType),
            "contains" | "has-text" => {
                let text = self.parenthesized()?;
                Ok(Pseudo::Contains(text))
            }
            "nth-of-type" | "eq" => {
                let raw = self.parenthesized()?;
                let n: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| self.error(format!("`{raw}` is not a position")))?;
                // jQuery's :eq() counts from zero.
                Ok(Pseudo::NthOfType(if name == "eq" { n + 1 } else { n }))
            }
            other => Err(self.error(format!("unsupported pseudo-class `:{other}`"))),
        }
    }

    fn parenthesized(&mut self) -> Result<String> {
        if !self.eat('(') {
            return Err(self.error("expected `(`"));
        }
        self.skip_ws();
        let value = self.value_until(')')?;
        if !self.eat(')') {
            return Err(self.error("unclosed `(`"));
        }
        Ok(value)
    }

    /// A quoted string, or bare text up to `end`.
    fn value_until(&mut self, end: char) -> Result<String> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let mut out = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error("unterminated string")),
                        Some(c) if c == q => {
                            self.pos += 1;
                            return Ok(out);
                        }
                        Some('\\') => {
                            if let Some(next) = self.chars.get(self.pos + 1).copied() {
                                out.push(next);
                            }
                            self.pos += 2;
                        }
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                    }
                }
            }
            _ => {
                let mut out = String::new();
                while let Some(c) = self.peek() {
                    if c == end {
                        break;
                    }
                    out.push(c);
                    self.pos += 1;
                }
                Ok(out.trim().to_string())
            }
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
