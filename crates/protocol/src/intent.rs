use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Create,
    Edit,
    Delete,
    /// Conversational, never mutates files.
    Chat,
}

impl Intent {
    pub const ALL: [Intent; 4] = [Intent::Create, Intent::Edit, Intent::Delete, Intent::Chat];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Edit => "EDIT",
            Self::Delete => "DELETE",
            Self::Chat => "CHAT",
        }
    }

    /// Parse a bare label such as `"EDIT"` or `" delete. "`. Anything else is `None`.
    pub fn from_label(raw: &str) -> Option<Self> {
        let label = raw
            .trim()
            .trim_matches(|c: char| c == '.' || c == '"' || c == '\'' || c == '`')
            .to_ascii_uppercase();
        Self::ALL.into_iter().find(|intent| intent.as_str() == label)
    }

    pub fn mutates(self) -> bool {
        !matches!(self, Self::Chat)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Intent;

    #[test]
    fn labels_parse_loosely_but_only_alone() {
        assert_eq!(Intent::from_label("EDIT"), Some(Intent::Edit));
        assert_eq!(Intent::from_label(" delete.\n"), Some(Intent::Delete));
        assert_eq!(Intent::from_label("\"chat\""), Some(Intent::Chat));
        assert_eq!(Intent::from_label("I think EDIT"), None);
        assert_eq!(Intent::from_label(""), None);
    }
}
