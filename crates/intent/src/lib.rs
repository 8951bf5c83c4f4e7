//! # Pagesmith Intent
//!
//! Maps a free-text request to `CREATE`, `EDIT`, `DELETE` or `CHAT`.
//!
//! A regex pass decides most requests without any I/O; only undetermined text is sent
//! to the language-model collaborator, and a failed or malformed answer becomes `CHAT`.

mod classifier;
mod lexical;

pub use classifier::{Classification, IntentClassifier, Source};
pub use lexical::classify_lexical;
