use serde::{Deserialize, Serialize};

use crate::Intent;

/// Error taxonomy shared by every handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Required instruction fields missing; rejected before any file I/O.
    ValidationError,
    /// Component file or targeted element absent.
    NotFoundError,
    /// Every locator strategy ran out without an unambiguous target.
    NoOpError,
    /// A lifecycle step failed while the others went through.
    PartialLifecycleError,
    /// The file changed between read and write.
    ConflictError,
    IoError,
}

/// Result of one handler call, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub success: bool,
    pub elements_modified: Vec<String>,
    pub transformations_applied: usize,
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// On failure: the full original document, so the caller can retry with context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ResultEnvelope {
    pub fn applied(
        file_path: impl Into<String>,
        elements_modified: Vec<String>,
        transformations_applied: usize,
    ) -> Self {
        Self {
            success: true,
            elements_modified,
            transformations_applied,
            file_path: file_path.into(),
            error: None,
            error_kind: None,
            details: None,
        }
    }

    pub fn failed(
        file_path: impl Into<String>,
        kind: ErrorKind,
        error: impl Into<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            success: false,
            elements_modified: Vec::new(),
            transformations_applied: 0,
            file_path: file_path.into(),
            error: Some(error.into()),
            error_kind: Some(kind),
            details,
        }
    }
}

/// Normalised outcome of one request through the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub success: bool,
    pub intent: Intent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub modified_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub envelopes: Vec<ResultEnvelope>,
}

impl Outcome {
    pub fn ok(intent: Intent, response: impl Into<String>, modified_files: Vec<String>) -> Self {
        Self {
            success: true,
            intent,
            response: Some(response.into()),
            error: None,
            modified_files,
            envelopes: Vec::new(),
        }
    }

    pub fn err(intent: Intent, error: impl Into<String>) -> Self {
        Self {
            success: false,
            intent,
            response: None,
            error: Some(error.into()),
            modified_files: Vec::new(),
            envelopes: Vec::new(),
        }
    }

    pub fn with_envelopes(mut self, envelopes: Vec<ResultEnvelope>) -> Self {
        self.envelopes = envelopes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_camel_case_and_skips_empty_optionals() {
        let envelope = ResultEnvelope::applied("src/components/Hero.astro", vec!["h1".into()], 1);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["transformationsApplied"], 1);
        assert_eq!(json["elementsModified"][0], "h1");
        assert!(json.get("error").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn failure_keeps_original_document() {
        let envelope = ResultEnvelope::failed(
            "Hero.astro",
            ErrorKind::NoOpError,
            "no strategy matched",
            Some("<h1>Hi</h1>".to_string()),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errorKind"], "NoOpError");
        assert_eq!(json["details"], "<h1>Hi</h1>");
    }
}
