use crate::error::EditError;
use pagesmith_markup::Splice;
use pagesmith_protocol::ResultEnvelope;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    ExactLiteral,
    TextNode,
    SelectorContainment,
    FuzzyPrefix,
    SemanticHeuristic,
    SelectorRemoval,
    TextAnchoredRemoval,
    Insert,
    Move,
    Restructure,
    ImageUpdate,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactLiteral => "exact_literal",
            Self::TextNode => "text_node",
            Self::SelectorContainment => "selector_containment",
            Self::FuzzyPrefix => "fuzzy_prefix",
            Self::SemanticHeuristic => "semantic_heuristic",
            Self::SelectorRemoval => "selector_removal",
            Self::TextAnchoredRemoval => "text_anchored_removal",
            Self::Insert => "insert",
            Self::Move => "move",
            Self::Restructure => "restructure",
            Self::ImageUpdate => "image_update",
        }
    }
}

/// Outcome of one strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub strategy: StrategyKind,
    pub fragment: String,
    pub element_path: Option<String>,
    pub success: bool,
}

impl MatchResult {
    pub fn miss(strategy: StrategyKind) -> Self {
        Self {
            strategy,
            fragment: String::new(),
            element_path: None,
            success: false,
        }
    }
}

/// What a successful strategy found, and the splices that carry out the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub splices: Vec<Splice>,
    /// The matched text or markup, for reporting.
    pub fragment: String,
    pub element_path: Option<String>,
    /// Labels of the elements touched (element paths, or the fragment for literal edits).
    pub elements: Vec<String>,
}

impl Located {
    pub fn transformations(&self) -> usize {
        self.splices.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub document: String,
    pub matched: MatchResult,
    pub transformations: usize,
    pub elements: Vec<String>,
}

/// Failed mutation. The untouched original rides along so the instruction can be
/// regenerated with full context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub error: EditError,
    pub attempts: Vec<MatchResult>,
    pub original: String,
}

impl Mutation {
    pub fn envelope(&self, file_path: impl Into<String>) -> ResultEnvelope {
        ResultEnvelope::applied(file_path, self.elements.clone(), self.transformations)
    }
}

impl MutationFailure {
    /// Failure envelope; `details` carries the untouched document.
    pub fn envelope(&self, file_path: impl Into<String>) -> ResultEnvelope {
        ResultEnvelope::failed(
            file_path,
            self.error.kind(),
            self.error.to_string(),
            Some(self.original.clone()),
        )
    }
}
