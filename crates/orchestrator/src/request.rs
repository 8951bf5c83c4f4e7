//! Free-text request parsing: component names, positional hints, delete targets and
//! style requests.

use pagesmith_lifecycle::{PositionHint, Relation};
use pagesmith_styles::{Slot, COLOR_FAMILIES};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Used when a CREATE request names nothing and mentions no known business type.
pub const DEFAULT_COMPONENT: &str = "Features";

const BUSINESS_COMPONENTS: &[(&[&str], &str)] = &[
    (&["restaurant", "cafe", "café", "bistro", "bakery", "pizzeria", "bar"], "Menu"),
    (&["fitness", "gym", "yoga", "pilates", "workout", "crossfit"], "Classes"),
    (&["salon", "spa", "barber", "beauty", "dental", "clinic", "plumber", "cleaning"], "Services"),
    (&["photographer", "photography", "portfolio", "artist", "studio"], "Gallery"),
    (&["shop", "store", "boutique", "ecommerce", "e-commerce"], "Products"),
    (&["realtor", "real estate", "property", "properties"], "Listings"),
    (&["hotel", "resort", "hostel", "villa"], "Rooms"),
    (&["school", "academy", "course", "tutoring", "university"], "Courses"),
    (&["wedding", "conference", "festival", "event"], "Schedule"),
    (&["nonprofit", "non-profit", "charity", "foundation"], "Mission"),
    (&["agency", "consultancy", "consulting", "law firm"], "Services"),
];

const NAME_STOPWORDS: &[&str] = &[
    "a", "an", "the", "this", "that", "my", "our", "new", "section", "sections", "component",
    "components", "page", "entire", "whole", "it",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub names: Vec<String>,
    pub hint: Option<PositionHint>,
}

/// Colour change expressed in a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StyleRequest {
    Literal {
        from: String,
        to: String,
        dark: Option<String>,
    },
    Slot { slot: Slot, family: String },
}

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new(&$pattern).expect(concat!("valid ", stringify!($name), " regex")))
        }
    };
}

cached_regex!(
    enumeration,
    r"(?i)\b(?:including|such as|containing|consisting of|with sections?)\b[\s:]*(.+)$"
);
cached_regex!(
    called,
    r#"(?i)\b(?:create|add|build|generate)\s+(?:(?:a|an|the)\s+)?(?:new\s+)?(?:section|component)\s+(?:called|named|titled)\s+(?:"([^"]+)"|'([^']+)'|“([^”]+)”|([a-z][\w-]*))"#
);
cached_regex!(
    add_named,
    r"(?i)\b(?:create|add|build|generate)\s+(?:a|an|the)\s+(?:new\s+)?([a-z][\w-]*(?:\s+[a-z][\w-]*)?)\s+(?:section|component)\b"
);
cached_regex!(
    position,
    r#"(?i)\b(underneath|below|beneath|under|after|above|before|over)\s+(?:the\s+)?["']?([a-z][\w-]*)["']?"#
);
cached_regex!(
    delete_called,
    r#"(?i)^\s*(?:please\s+)?(?:delete|remove)\s+(?:the\s+)?(?:section|component)\s+(?:(?:called|named)\s+)?(?:"([^"]+)"|'([^']+)'|([a-z][\w-]*(?:\s+[a-z][\w-]*){0,2}?)\s*(?:[.!?]|$|\s(?:from|on|in|please)\b))"#
);
cached_regex!(
    delete_named,
    r#"(?i)^\s*(?:please\s+)?(?:delete|remove)\s+(?:(?:the|a|this|that|our|my)\s+)?["']?([a-z][\w-]*(?:\s+[a-z][\w-]*){0,2})["']?\s+(?:section|component)\b"#
);
cached_regex!(
    named_prefix_pattern,
    r"(?s)^\s*([A-Za-z][\w-]*)\s*:\s*(.+)$"
);
cached_regex!(
    literal_colors,
    r"(?i)(#[0-9a-f]{3,8}\b|(?:rgb|hsl)a?\([^)]*\))\s*(?:to|with|into|->|→)\s*(#[0-9a-f]{3,8}\b|(?:rgb|hsl)a?\([^)]*\))"
);
cached_regex!(
    dark_value,
    r"(?i)\bdark(?:\s+mode)?\s*(?:to|:|=|as|with)?\s*(#[0-9a-f]{3,8})\b"
);
cached_regex!(
    slot_family,
    format!(
        r"(?i)\b(?:colou?r(?:ed|s)?|to|in|headlines?|headings?|titles?|text|copy|paragraphs?|links?|buttons?|accents?)\s+(?:to\s+|in\s+|be\s+)?({})\b",
        COLOR_FAMILIES.join("|")
    )
);
cached_regex!(
    heading_words,
    r"(?i)\b(?:headlines?|headings?|titles?)\b"
);
cached_regex!(
    body_words,
    r"(?i)\b(?:paragraphs?|body\s+(?:text|copy)|text\s+colou?r)\b"
);
cached_regex!(
    accent_words,
    r"(?i)\b(?:links?|buttons?|accents?|ctas?)\b"
);

/// Names of the components a CREATE request asks for. Never empty.
pub fn create_names(text: &str) -> Vec<String> {
    // The positional clause names an existing anchor, not a new component.
    let text = match position().find(text) {
        Some(found) => &text[..found.start()],
        None => text,
    };

    if let Some(caps) = enumeration().captures(text) {
        let names: Vec<String> = split_list(&caps[1]).filter_map(clean_name).collect();
        if !names.is_empty() {
            return names;
        }
    }

    if let Some(caps) = called().captures(text) {
        if let Some(name) = (1..=4).find_map(|group| caps.get(group)).and_then(|m| clean_name(m.as_str())) {
            return vec![name];
        }
    }

    if let Some(caps) = add_named().captures(text) {
        if let Some(name) = clean_name(&caps[1]) {
            return vec![name];
        }
    }

    vec![business_component(text).to_string()]
}

pub fn parse_create(text: &str) -> CreateRequest {
    CreateRequest {
        names: create_names(text),
        hint: position_hint(text),
    }
}

/// `below the Hero` → after `Hero`; `above Pricing` → before `Pricing`.
pub fn position_hint(text: &str) -> Option<PositionHint> {
    let caps = position().captures(text)?;
    let relation = match caps[1].to_ascii_lowercase().as_str() {
        "above" | "before" | "over" => Relation::Before,
        _ => Relation::After,
    };
    let anchor = clean_name(&caps[2])?;
    Some(PositionHint::new(relation, anchor))
}

/// Component domain inferred from business keywords.
pub fn business_component(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    BUSINESS_COMPONENTS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| contains_word(&lower, keyword)))
        .map(|(_, component)| *component)
        .unwrap_or(DEFAULT_COMPONENT)
}

/// Target of `delete [the] NAME section` or `delete [the] section [called] NAME`.
/// Names of up to three words are PascalCased (`pricing table` → `PricingTable`).
pub fn delete_name(text: &str) -> Option<String> {
    [delete_called(), delete_named()].into_iter().find_map(|re| {
        let caps = re.captures(text)?;
        let name = (1..caps.len()).find_map(|group| caps.get(group))?;
        clean_name(name.as_str())
    })
}

/// `Hero: make the title shorter` → (`Hero`, `make the title shorter`).
pub fn named_prefix(text: &str) -> Option<(&str, &str)> {
    let caps = named_prefix_pattern().captures(text)?;
    let name = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str().trim();
    Some((name, rest))
}

/// Colour requests that bypass the edit collaborator.
pub fn style_request(text: &str) -> Option<StyleRequest> {
    if let Some(caps) = literal_colors().captures(text) {
        let dark = dark_value()
            .captures(&text[caps.get(0).map_or(0, |m| m.end())..])
            .map(|dark| dark[1].to_string());
        return Some(StyleRequest::Literal {
            from: caps[1].to_string(),
            to: caps[2].to_string(),
            dark,
        });
    }

    let family = slot_family().captures(text)?[1].to_ascii_lowercase();
    let slot = if heading_words().is_match(text) {
        Slot::HeadingText
    } else if body_words().is_match(text) {
        Slot::BodyText
    } else if accent_words().is_match(text) {
        Slot::Accent
    } else {
        return None;
    };
    Some(StyleRequest::Slot { slot, family })
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split([',', ';', '&', '/'])
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
}

/// Strip articles, trailing `section` nouns and punctuation; normalise shouting
/// (`FAQ` → `Faq`). `None` when nothing usable remains.
fn clean_name(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_matches(|c: char| !c.is_alphanumeric());
    let words: Vec<&str> = raw
        .split_whitespace()
        .skip_while(|word| matches!(word.to_ascii_lowercase().as_str(), "a" | "an" | "the" | "new"))
        .filter(|word| !matches!(word.to_ascii_lowercase().as_str(), "section" | "sections" | "component" | "components"))
        .collect();

    if words.is_empty() {
        return None;
    }
    if words.len() == 1 && NAME_STOPWORDS.contains(&words[0].to_ascii_lowercase().as_str()) {
        return None;
    }

    let name: String = words
        .iter()
        .map(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
            if word.len() > 1 && word.chars().all(|c| !c.is_lowercase()) {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect())
                    .unwrap_or_default()
            } else {
                let mut chars = word.chars();
                chars
                    .next()
                    .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                    .unwrap_or_default()
            }
        })
        .collect();
    Some(name).filter(|name| name.chars().next().is_some_and(char::is_alphabetic))
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn enumeration_takes_the_whole_list() {
        assert_eq!(
            create_names("Build a landing page including hero, pricing table and FAQ"),
            vec!["Hero", "PricingTable", "Faq"]
        );
        assert_eq!(
            create_names("generate a site with sections: About, Team & Contact."),
            vec!["About", "Team", "Contact"]
        );
    }

    #[test]
    fn called_and_bare_names() {
        assert_eq!(
            create_names(r#"create a new section called "Opening Hours""#),
            vec!["OpeningHours"]
        );
        assert_eq!(create_names("add a component named Testimonials"), vec!["Testimonials"]);
        assert_eq!(create_names("add a FAQ section below the Hero"), vec!["Faq"]);
        assert_eq!(create_names("add a new pricing section"), vec!["Pricing"]);
    }

    #[test]
    fn business_fallback() {
        assert_eq!(create_names("make something for my yoga studio"), vec!["Classes"]);
        assert_eq!(create_names("create a section for our bistro"), vec!["Menu"]);
        assert_eq!(create_names("create something nice"), vec![DEFAULT_COMPONENT]);
    }

    #[test]
    fn positional_hints() {
        assert_eq!(
            position_hint("add a FAQ section underneath the hero"),
            Some(PositionHint::new(Relation::After, "Hero"))
        );
        assert_eq!(
            position_hint("add testimonials above 'Pricing'"),
            Some(PositionHint::new(Relation::Before, "Pricing"))
        );
        assert_eq!(position_hint("add a contact section"), None);
    }

    #[test]
    fn delete_targets() {
        assert_eq!(delete_name("delete the pricing section").as_deref(), Some("Pricing"));
        assert_eq!(
            delete_name("remove the section called Faq").as_deref(),
            Some("Faq")
        );
        assert_eq!(delete_name("delete section 'Team'").as_deref(), Some("Team"));
        assert_eq!(delete_name("delete the section"), None);
        assert_eq!(delete_name("delete this section"), None);
    }

    #[test]
    fn multi_word_delete_targets_are_pascal_cased() {
        assert_eq!(
            delete_name("delete the pricing table section").as_deref(),
            Some("PricingTable")
        );
        assert_eq!(
            delete_name("remove the section called customer stories from the page").as_deref(),
            Some("CustomerStories")
        );
        assert_eq!(
            delete_name("delete the component named \"Meet the Team\"").as_deref(),
            Some("MeetTheTeam")
        );
    }

    #[test]
    fn named_prefix_splits_request() {
        assert_eq!(
            named_prefix("Hero: make the title shorter"),
            Some(("Hero", "make the title shorter"))
        );
        assert_eq!(named_prefix("make the hero title shorter"), None);
    }

    #[test]
    fn style_requests() {
        assert_eq!(
            style_request("change #1A2B3C to #ff0000 and dark mode to #ffaaaa"),
            Some(StyleRequest::Literal {
                from: "#1A2B3C".into(),
                to: "#ff0000".into(),
                dark: Some("#ffaaaa".into()),
            })
        );
        assert_eq!(
            style_request("make all headlines emerald"),
            Some(StyleRequest::Slot {
                slot: Slot::HeadingText,
                family: "emerald".into(),
            })
        );
        assert_eq!(
            style_request("change the button colour to Rose"),
            Some(StyleRequest::Slot {
                slot: Slot::Accent,
                family: "rose".into(),
            })
        );
        assert_eq!(style_request("make the hero headline say Blue Skies"), None);
    }
}
