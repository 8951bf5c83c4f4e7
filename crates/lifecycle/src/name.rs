use crate::error::{LifecycleError, Result};
use serde::Serialize;
use std::fmt;

/// Logical component name (`PricingTable`) and its manifest id (`pricingtable`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ComponentName {
    name: String,
    id: String,
}

impl ComponentName {
    /// Normalise free-form input: `"pricing table"`, `"pricing-table"` and
    /// `"PricingTable"` all become `PricingTable`.
    pub fn parse(raw: &str) -> Result<Self> {
        let name: String = raw
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(capitalize)
            .collect();

        match name.chars().next() {
            Some(first) if first.is_alphabetic() => Ok(Self {
                id: name.to_lowercase(),
                name,
            }),
            _ => Err(LifecycleError::InvalidName(raw.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
