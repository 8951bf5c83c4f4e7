//! Tag vocabularies the locator strategies rely on.

pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Tags whose visible text is a candidate for text-node matching.
pub const TEXT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "a", "em", "strong", "b", "i", "span", "button",
    "label", "li", "small",
];

pub const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Section-level containers; removal never widens onto one of these.
pub const LANDMARK_TAGS: &[&str] = &[
    "html", "body", "main", "section", "article", "header", "footer", "nav", "form", "aside",
];

/// Containers whose direct children are independent items.
pub const GROUPING_TAGS: &[&str] = &[
    "ul", "ol", "dl", "menu", "nav", "select", "optgroup", "datalist", "table", "thead",
    "tbody", "tfoot", "fieldset",
];

pub const GROUPING_ROLES: &[&str] = &["list", "listbox", "menu", "menubar", "group", "tablist"];

pub fn is_one_of(tag: &str, set: &[&str]) -> bool {
    set.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
}
