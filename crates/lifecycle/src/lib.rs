//! # Pagesmith Lifecycle
//!
//! Component documents and the page manifest that assembles them.
//!
//! ```text
//! create(name, body, hint)              delete(name)
//!   │                                     │
//!   ├─ lock + write <Name>.astro          ├─ 1. manifest wrapper  ─┐
//!   └─ lock manifest                      ├─ 2. manifest import    ├─ Applied | AlreadyAbsent | Failed
//!        ├─ import line                   ├─ 3. component file    ─┘
//!        └─ wrapper block @ hint          └─ converged? (observed end state)
//! ```

mod error;
mod layout;
mod lock;
mod manager;
mod manifest;
mod name;
mod saga;
mod store;

pub use error::{LifecycleError, Result};
pub use layout::ProjectLayout;
pub use lock::{acquire_file_lock, sha256_hex, write_atomic, FileLock, VersionedFile};
pub use manager::{ComponentListing, Created, LifecycleManager, ListedComponent};
pub use manifest::{ManifestEntry, PageManifest, Placement, PositionHint, Relation};
pub use name::ComponentName;
pub use saga::{DeleteReport, DeleteStep, StepReport, StepStatus};
pub use store::{ComponentFile, ComponentStore};
