use crate::palette::Slot;
use serde::Serialize;

/// Which matching axis a reference belongs to. The two are never mixed in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "axis", content = "slot")]
pub enum StyleAxis {
    /// Explicit colour value inside a utility, `text-[#1a2b3c]`.
    LiteralColor,
    /// Palette class standing for a role, `text-slate-700` on a heading.
    SemanticSlot(Slot),
}

/// One colour class occurrence: `(file, axis, raw value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleReference {
    pub file: String,
    pub axis: StyleAxis,
    /// The class token as found (or as written, for rewrites).
    pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleReport {
    pub files_touched: Vec<String>,
    pub rewritten: Vec<StyleReference>,
    /// Files left alone because they could not be read, parsed or written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl StyleReport {
    pub fn is_empty(&self) -> bool {
        self.rewritten.is_empty()
    }

    pub(crate) fn record(&mut self, file: &str, axis: StyleAxis, raws: Vec<String>) {
        if raws.is_empty() {
            return;
        }
        self.files_touched.push(file.to_string());
        self.rewritten.extend(raws.into_iter().map(|raw| StyleReference {
            file: file.to_string(),
            axis,
            raw,
        }));
    }
}
