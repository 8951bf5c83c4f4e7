use crate::document::Document;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

const DEFAULT_CAPACITY: usize = 256;

/// Bounded memo of substring lookups, keyed by document digest and needle.
///
/// Owned by a [`crate::Mutator`]; call [`SearchCache::reset`] to start from a clean
/// slate (tests do this between cases).
pub struct SearchCache {
    entries: Mutex<LruCache<(String, String), Option<usize>>>,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// First offset of `needle` inside one text run of the document that sits on word
    /// boundaries. Tags, attribute values and the preamble are never searched.
    pub fn find_word_bounded(&self, doc: &Document<'_>, needle: &str) -> Option<usize> {
        let key = (doc.digest().to_string(), needle.to_string());
        if let Some(hit) = self.lock().get(&key) {
            return *hit;
        }
        let found = doc.text_ranges().iter().find_map(|run| {
            find_word_bounded(&doc.source()[run.clone()], needle).map(|pos| run.start + pos)
        });
        self.lock().put(key, found);
        found
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(String, String), Option<usize>>> {
        self.entries.lock().expect("search cache mutex poisoned")
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

fn find_word_bounded(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.match_indices(needle).map(|(pos, _)| pos).find(|&pos| {
        let before = haystack[..pos].chars().next_back();
        let after = haystack[pos + needle.len()..].chars().next();
        let starts_word = needle.chars().next().is_some_and(char::is_alphanumeric);
        let ends_word = needle.chars().next_back().is_some_and(char::is_alphanumeric);
        !(starts_word && before.is_some_and(char::is_alphanumeric))
            && !(ends_word && after.is_some_and(char::is_alphanumeric))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_word_boundaries() {
        assert_eq!(find_word_bounded("Starter Start", "Start"), Some(8));
        assert_eq!(find_word_bounded("<p>Start</p>", "Start"), Some(3));
        assert_eq!(find_word_bounded("Restart", "Start"), None);
    }

    #[test]
    fn memoises_and_resets() {
        let cache = SearchCache::new(2);
        let doc = Document::new("<h1>Hello world</h1>");
        assert_eq!(cache.find_word_bounded(&doc, "Hello"), Some(4));
        assert_eq!(cache.find_word_bounded(&doc, "Hello"), Some(4));
        assert_eq!(cache.find_word_bounded(&doc, "Bye"), None);
        assert_eq!(cache.len(), 2);

        cache.find_word_bounded(&doc, "world");
        assert_eq!(cache.len(), 2, "bounded by capacity");

        cache.reset();
        assert!(cache.is_empty());
    }

    #[test]
    fn markup_and_preamble_are_not_searched() {
        let cache = SearchCache::default();
        let doc = Document::new(
            "---\nconst title = 'Hero';\n---\n<section class=\"hero\" data-hero>\n  <h1>Hero</h1>\n</section>\n",
        );
        let pos = cache.find_word_bounded(&doc, "Hero").expect("text run hit");
        assert_eq!(&doc.source()[pos - 4..pos], "<h1>");
        assert_eq!(cache.find_word_bounded(&doc, "hero"), None);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(SearchCache::new(0).capacity(), 1);
    }
}
