use serde::Serialize;

pub const COLOR_FAMILIES: &[&str] = &[
    "slate", "gray", "zinc", "neutral", "stone", "red", "orange", "amber", "yellow", "lime",
    "green", "emerald", "teal", "cyan", "sky", "blue", "indigo", "violet", "purple", "fuchsia",
    "pink", "rose",
];

const SHADES: &[u16] = &[50, 100, 200, 300, 400, 500, 600, 700, 800, 900, 950];

/// Named colour roles and the shades they use in light and dark mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    HeadingText,
    BodyText,
    Accent,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::HeadingText, Slot::BodyText, Slot::Accent];

    /// `(light, dark)` shade.
    pub fn shades(self) -> (u16, u16) {
        match self {
            Self::HeadingText => (700, 300),
            Self::BodyText => (600, 400),
            Self::Accent => (600, 500),
        }
    }

    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::HeadingText => pagesmith_markup::tags::HEADING_TAGS,
            Self::BodyText => &["p"],
            Self::Accent => &["a", "button"],
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "headingtext" | "heading" | "headline" | "headlines" => Some(Self::HeadingText),
            "bodytext" | "body" | "text" | "paragraph" => Some(Self::BodyText),
            "accent" | "link" | "button" => Some(Self::Accent),
            _ => None,
        }
    }

    pub fn classes(self, family: &str) -> (String, String) {
        let (light, dark) = self.shades();
        (format!("text-{family}-{light}"), format!("dark:text-{family}-{dark}"))
    }
}

pub fn is_family(name: &str) -> bool {
    COLOR_FAMILIES.contains(&name)
}

/// A `text-<family>-<shade>` class, optionally behind `dark:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteClass<'a> {
    pub dark: bool,
    pub family: &'a str,
    pub shade: u16,
}

impl<'a> PaletteClass<'a> {
    pub fn parse(token: &'a str) -> Option<Self> {
        let (dark, rest) = match token.strip_prefix("dark:") {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let (family, shade) = rest.strip_prefix("text-")?.rsplit_once('-')?;
        let shade: u16 = shade.parse().ok()?;
        (is_family(family) && SHADES.contains(&shade)).then_some(Self {
            dark,
            family,
            shade,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_classes_ignore_size_and_alignment_utilities() {
        assert_eq!(
            PaletteClass::parse("dark:text-slate-300"),
            Some(PaletteClass {
                dark: true,
                family: "slate",
                shade: 300
            })
        );
        assert!(PaletteClass::parse("text-4xl").is_none());
        assert!(PaletteClass::parse("text-center").is_none());
        assert!(PaletteClass::parse("text-brand-700").is_none());
        assert!(PaletteClass::parse("hover:text-blue-700").is_none());
    }

    #[test]
    fn slot_classes_use_fixed_shades() {
        assert_eq!(
            Slot::HeadingText.classes("indigo"),
            ("text-indigo-700".to_string(), "dark:text-indigo-300".to_string())
        );
        assert_eq!(Slot::parse("heading text"), Some(Slot::HeadingText));
        assert_eq!(Slot::parse("ACCENT"), Some(Slot::Accent));
    }
}
