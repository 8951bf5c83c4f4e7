//! # Pagesmith Protocol
//!
//! Types exchanged between the mutation engine and its callers: the edit instruction
//! produced by the language-model collaborator (wire form and validated form), the
//! result envelope every handler returns, the request intent, and the collaborator
//! seam itself.

mod collaborator;
mod envelope;
mod instruction;
mod intent;

pub use collaborator::{
    Collaborator, CollaboratorError, Completion, ImageRef, OfflineCollaborator, Prompt,
};
#[cfg(any(test, feature = "testing"))]
pub use collaborator::ScriptedCollaborator;
pub use envelope::{ErrorKind, Outcome, ResultEnvelope};
pub use instruction::{
    EditInstruction, EditOp, ElementTarget, ImageEdit, InsertEdit, InsertPosition, ModifyEdit,
    MoveEdit, OperationKind, RawEditInstruction, RemoveEdit, RestructureEdit, ValidationError,
};
pub use intent::Intent;

pub fn serialize_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}
