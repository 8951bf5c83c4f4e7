//! # Pagesmith Markup
//!
//! Structural view of component documents, just deep enough to locate and replace
//! fragments safely.
//!
//! ```text
//! Component document
//!     │
//!     ├──> split_sections → preamble (--- fenced) + body
//!     │
//!     ├──> tree-sitter HTML parse of the body
//!     │      └─> MarkupTree: flat element arena, absolute byte spans
//!     │
//!     ├──> Selector (CSS subset) / visible_text
//!     │
//!     └──> Splice[] → apply_splices → new document text
//! ```

mod error;
mod sections;
mod selector;
mod splice;
pub mod tags;
mod text;
mod tree;

pub use error::{MarkupError, Result};
pub use sections::{split_sections, DocumentSections, Preamble};
pub use selector::Selector;
pub use splice::{
    apply_splices, expand_to_lines, indent_block, line_end, line_indent, line_start,
    set_attribute, Splice,
};
pub use text::{decode_entities, escape_attribute, normalize_whitespace, text_ranges, visible_text};
pub use tree::{Ancestors, Attribute, Element, MarkupTree};
