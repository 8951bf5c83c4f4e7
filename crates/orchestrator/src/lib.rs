//! # Pagesmith Orchestrator
//!
//! Turns a classified free-text request into file changes and one [`Outcome`].
//!
//! ```text
//! request ──▶ IntentClassifier ──▶ Orchestrator
//!                                   ├─ CREATE: names + position ─▶ LifecycleManager::create
//!                                   ├─ DELETE: name ─────────────▶ LifecycleManager::delete
//!                                   ├─ EDIT:   colour request ───▶ StyleResolver
//!                                   │          otherwise ────────▶ collaborator ─▶ instructions
//!                                   │                               ─▶ Mutator (+ correction rounds)
//!                                   └─ CHAT:   collaborator only, no writes
//! ```
//!
//! [`Outcome`]: pagesmith_protocol::Outcome

mod config;
mod edit;
mod error;
mod instructions;
mod orchestrator;
mod prompts;
mod request;
mod resolve;
mod templates;

pub use config::{CollaboratorSettings, EngineConfig, EngineSettings, CONFIG_ENV, CONFIG_FILE_NAME};
pub use edit::EditHandler;
pub use error::{OrchestratorError, Result};
pub use instructions::parse_instructions;
pub use orchestrator::Orchestrator;
pub use request::{
    business_component, create_names, delete_name, parse_create, position_hint, style_request,
    CreateRequest, StyleRequest, DEFAULT_COMPONENT,
};
pub use resolve::resolve_component;
pub use templates::{generic_template, template_for};
