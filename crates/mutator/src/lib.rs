//! # Pagesmith Mutator
//!
//! Locates a fragment inside one component document and changes it.
//!
//! ```text
//! EditOp
//!   │
//!   ├─ Modify ──> ExactLiteral → TextNode → SelectorContainment → FuzzyPrefix → SemanticHeuristic
//!   │
//!   ├─ Remove ──> SelectorRemoval → TextAnchoredRemoval
//!   │
//!   └─ Insert / Move / Restructure / Image ──> single resolved target
//!                    │
//!                    └─> Splice[] → new document   (or MutationFailure + original text)
//! ```
//!
//! The element tree is parsed lazily, so literal hits never touch tree-sitter.

mod cache;
mod document;
mod error;
mod mutator;
mod outcome;
mod removal;
pub mod strategy;
mod structural;

pub use cache::SearchCache;
pub use document::{content_digest, Document};
pub use error::{EditError, Result};
pub use mutator::Mutator;
pub use outcome::{Located, MatchResult, Mutation, MutationFailure, StrategyKind};
pub use removal::{removal_cascade, SelectorRemoval, TextAnchoredRemoval};
