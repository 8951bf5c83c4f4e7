//! # Pagesmith Styles
//!
//! Colour references across component documents, on two separate axes:
//!
//! - **literal**: utilities with an explicit value (`text-[#1a2b3c]`), rewritten by value;
//! - **semantic**: palette classes on role elements (`text-slate-700` on `h1`),
//!   rewritten by slot through a fixed light/dark shade table.
//!
//! `dark:` variants always move together with their base class.

mod error;
mod literal;
mod palette;
mod reference;
mod resolver;
mod semantic;

pub use error::{Result, StyleError};
pub use literal::{normalize_color, LiteralToken};
pub use palette::{is_family, PaletteClass, Slot, COLOR_FAMILIES};
pub use reference::{StyleAxis, StyleReference, StyleReport};
pub use resolver::StyleResolver;
