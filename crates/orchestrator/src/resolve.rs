use crate::request::named_prefix;
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32String};
use pagesmith_lifecycle::ComponentFile;

/// Shortest request word worth fuzzy matching against component names.
const MIN_FUZZY_LEN: usize = 4;

/// Minimum fuzzy score per pattern character; a clean subsequence scores ~16.
const MIN_SCORE_PER_CHAR: u32 = 12;

const IGNORED_WORDS: &[&str] = &[
    "section", "component", "page", "make", "change", "update", "replace", "please", "with",
    "from", "that", "this", "text", "title", "button", "image", "color", "colour",
];

/// Which component a free-text EDIT request is about: a `Name:` prefix, then a
/// mention of an existing component, then the best fuzzy match of a request word.
pub fn resolve_component<'a>(text: &str, components: &'a [ComponentFile]) -> Option<&'a ComponentFile> {
    if let Some((name, _)) = named_prefix(text) {
        if let Some(found) = by_name(name, components) {
            return Some(found);
        }
    }
    mentioned(text, components).or_else(|| fuzzy(text, components))
}

fn by_name<'a>(name: &str, components: &'a [ComponentFile]) -> Option<&'a ComponentFile> {
    let wanted = squash(name);
    components.iter().find(|file| squash(&file.name) == wanted)
}

/// Earliest mention, where a multi-word mention (`pricing table`) counts for
/// `PricingTable`.
fn mentioned<'a>(text: &str, components: &'a [ComponentFile]) -> Option<&'a ComponentFile> {
    let words = words(text);
    for start in 0..words.len() {
        for span in (1..=3).rev() {
            let Some(slice) = words.get(start..start + span) else {
                continue;
            };
            let joined = slice.concat();
            if let Some(found) = components.iter().find(|file| squash(&file.name) == joined) {
                return Some(found);
            }
        }
    }
    None
}

fn fuzzy<'a>(text: &str, components: &'a [ComponentFile]) -> Option<&'a ComponentFile> {
    let mut matcher = Matcher::new(Config::DEFAULT);
    let names: Vec<Utf32String> = components
        .iter()
        .map(|file| Utf32String::from(file.name.as_str()))
        .collect();

    let mut best: Option<(usize, u32)> = None;
    for word in words(text) {
        if word.chars().count() < MIN_FUZZY_LEN || IGNORED_WORDS.contains(&word.as_str()) {
            continue;
        }
        let pattern = Pattern::parse(&word, CaseMatching::Ignore, Normalization::Smart);
        let floor = MIN_SCORE_PER_CHAR * word.chars().count() as u32;
        for (idx, name) in names.iter().enumerate() {
            let Some(score) = pattern.score(name.slice(..), &mut matcher) else {
                continue;
            };
            if score >= floor && best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
    }

    best.map(|(idx, score)| {
        log::debug!("fuzzy component match {} (score {score})", components[idx].name);
        &components[idx]
    })
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn squash(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
