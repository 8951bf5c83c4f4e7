use crate::error::{EditError, Result};
use once_cell::unsync::OnceCell;
use pagesmith_markup::{text_ranges, MarkupError, MarkupTree};
use sha2::{Digest, Sha256};
use std::ops::Range;

/// A component document under edit. The element tree is only built when a strategy
/// first asks for it, so literal hits never pay for a parse.
pub struct Document<'a> {
    source: &'a str,
    tree: OnceCell<std::result::Result<MarkupTree, MarkupError>>,
    digest: OnceCell<String>,
    text: OnceCell<Vec<Range<usize>>>,
}

impl<'a> Document<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            tree: OnceCell::new(),
            digest: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn tree(&self) -> Result<&MarkupTree> {
        self.tree
            .get_or_init(|| {
                log::debug!("parsing markup tree ({} bytes)", self.source.len());
                MarkupTree::parse(self.source)
            })
            .as_ref()
            .map_err(|err| EditError::Markup(err.clone()))
    }

    pub fn is_parsed(&self) -> bool {
        self.tree.get().is_some()
    }

    /// Text runs of the body, outside tags, comments and the preamble.
    pub fn text_ranges(&self) -> &[Range<usize>] {
        self.text.get_or_init(|| text_ranges(self.source))
    }

    /// SHA-256 of the source, hex encoded.
    pub fn digest(&self) -> &str {
        self.digest.get_or_init(|| content_digest(self.source))
    }
}

pub fn content_digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hash.iter().map(|byte| format!("{byte:02x}")).collect()
}
