use pagesmith_protocol::Intent;
use regex::Regex;
use std::sync::OnceLock;

/// Words that mark a request as planning talk rather than a change to apply.
const PLANNING_TERMS: &str = r"scope|scoping|roadmaps?|requirements?|milestones?|timelines?|discovery|brainstorm(?:ing)?|strateg(?:y|ies)|user stor(?:y|ies)|mvp|backlog|sprints?|deliverables?|stakeholders?|kickoff|project plan|planning|estimates?";

const MUTATION_VERBS: &str = r"update|change|edit|modify|replace|rename|make|set|move|swap|adjust|fix|rewrite|remove|delete|tweak|turn|recolou?r|shorten|lengthen|translate|reword|restyle|resize|center|centre|align|hide|put|use";

const CREATE_VERBS: &str = r"create|add|build|generate|insert";

/// Words that turn `remove X in the Y section` into an edit of Y rather than a deletion.
const LOCATING_WORDS: &[&str] = &["from", "in", "inside", "on", "of", "within", "under", "at"];

fn planning() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)\b(?:{PLANNING_TERMS})\b")).expect("valid planning regex")
    })
}

fn delete_section() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^\s*(?:please\s+)?(?:delete|remove)\s+(?:(?:the|a|an|this|that|my|our)\s+)?((?:[\w'-]+\s+){0,3})(?:section|component)s?\b",
        )
        .expect("valid delete regex")
    })
}

fn named_edit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?i)^\s*[a-z][\w-]*\s*:\s*(?:please\s+)?(?:{MUTATION_VERBS}|{CREATE_VERBS})\b"
        ))
        .expect("valid named edit regex")
    })
}

fn leading_edit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^\s*(?:please\s+)?(?:can you\s+)?(?:{MUTATION_VERBS})\b"))
            .expect("valid edit regex")
    })
}

fn leading_create() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"(?i)^\s*(?:please\s+)?(?:can you\s+)?(?:{CREATE_VERBS})\b"))
            .expect("valid create regex")
    })
}

/// `delete [the] [up to three words] section`, where the words name the section
/// instead of locating something inside it.
fn deletes_a_section(text: &str) -> bool {
    delete_section().captures(text).is_some_and(|caps| {
        caps.get(1).map_or("", |words| words.as_str()).split_whitespace().all(|word| {
            !LOCATING_WORDS.contains(&word.to_ascii_lowercase().as_str())
        })
    })
}

/// Fast lexical classification. `None` means undetermined.
///
/// Rules are tried in priority order: planning vocabulary, section deletion, edits,
/// creation. Planning vocabulary wins over everything, even an explicit verb.
pub fn classify_lexical(text: &str) -> Option<Intent> {
    if text.trim().is_empty() {
        return None;
    }
    if planning().is_match(text) {
        return Some(Intent::Chat);
    }
    if deletes_a_section(text) {
        return Some(Intent::Delete);
    }
    if named_edit().is_match(text) || leading_edit().is_match(text) {
        return Some(Intent::Edit);
    }
    if leading_create().is_match(text) {
        return Some(Intent::Create);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planning_vocabulary_overrides_everything() {
        assert_eq!(
            classify_lexical("what's our project scope for the pricing section"),
            Some(Intent::Chat)
        );
        assert_eq!(
            classify_lexical("update the roadmap section with Q3 milestones"),
            Some(Intent::Chat)
        );
        assert_eq!(classify_lexical("delete the MVP section"), Some(Intent::Chat));
    }

    #[test]
    fn delete_needs_a_section_noun() {
        assert_eq!(classify_lexical("delete the pricing section"), Some(Intent::Delete));
        assert_eq!(classify_lexical("Remove section called Faq"), Some(Intent::Delete));
        assert_eq!(classify_lexical("please delete the faq component"), Some(Intent::Delete));
        assert_eq!(
            classify_lexical("remove the second button in the hero"),
            Some(Intent::Edit)
        );
    }

    #[test]
    fn multi_word_sections_can_be_deleted() {
        assert_eq!(
            classify_lexical("delete the pricing table section"),
            Some(Intent::Delete)
        );
        assert_eq!(
            classify_lexical("remove our customer success stories component"),
            Some(Intent::Delete)
        );
        assert_eq!(
            classify_lexical("remove the title from hero section"),
            Some(Intent::Edit)
        );
    }

    #[test]
    fn named_prefix_is_an_edit() {
        assert_eq!(classify_lexical("Hero: change the headline"), Some(Intent::Edit));
        assert_eq!(classify_lexical("Pricing: add a fourth tier"), Some(Intent::Edit));
        assert_eq!(classify_lexical("make the button bigger"), Some(Intent::Edit));
    }

    #[test]
    fn creation_verbs() {
        assert_eq!(classify_lexical("add a testimonials section"), Some(Intent::Create));
        assert_eq!(
            classify_lexical("Generate a landing page including Hero, Features and Faq"),
            Some(Intent::Create)
        );
    }

    #[test]
    fn anything_else_is_undetermined() {
        assert_eq!(classify_lexical("hello there"), None);
        assert_eq!(classify_lexical("   "), None);
        assert_eq!(classify_lexical("the hero looks a bit off"), None);
    }
}
