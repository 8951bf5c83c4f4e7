use crate::cache::SearchCache;
use crate::document::Document;
use crate::error::EditError;
use crate::outcome::{Located, MatchResult, Mutation, MutationFailure, StrategyKind};
use crate::removal::removal_cascade;
use crate::strategy::{modify_cascade, Attempt, Strategy};
use crate::structural;
use pagesmith_markup::apply_splices;
use pagesmith_protocol::{EditOp, ModifyEdit, RemoveEdit};

/// Applies validated edit operations to component documents.
///
/// Modify and remove run their strategy cascades in order; structural operations
/// resolve a single target. Any failure hands back the original text untouched.
pub struct Mutator {
    modify: Vec<Box<dyn Strategy<ModifyEdit>>>,
    removal: Vec<Box<dyn Strategy<RemoveEdit>>>,
    cache: SearchCache,
}

impl Mutator {
    pub fn new() -> Self {
        Self::with_cache(SearchCache::default())
    }

    pub fn with_cache(cache: SearchCache) -> Self {
        Self {
            modify: modify_cascade(),
            removal: removal_cascade(),
            cache,
        }
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    pub fn apply(&self, source: &str, op: &EditOp) -> Result<Mutation, MutationFailure> {
        let doc = Document::new(source);
        match op {
            EditOp::Modify(edit) => self.cascade(&doc, &self.modify, edit, || {
                let subject = edit
                    .content_match
                    .as_deref()
                    .or(edit.hint.as_deref())
                    .or(edit.selector.as_deref())
                    .unwrap_or_default();
                format!("no strategy located `{subject}`")
            }),
            EditOp::Remove(edit) => self.cascade(&doc, &self.removal, edit, || {
                "nothing safe to remove for this instruction".to_string()
            }),
            EditOp::Insert(edit) => one_shot(&doc, StrategyKind::Insert, structural::insert(&doc, edit)),
            EditOp::Move(edit) => one_shot(&doc, StrategyKind::Move, structural::relocate(&doc, edit)),
            EditOp::Restructure(edit) => one_shot(
                &doc,
                StrategyKind::Restructure,
                structural::restructure(&doc, edit),
            ),
            EditOp::Image(edit) => one_shot(
                &doc,
                StrategyKind::ImageUpdate,
                structural::update_image(&doc, edit),
            ),
        }
    }

    fn cascade<E>(
        &self,
        doc: &Document<'_>,
        strategies: &[Box<dyn Strategy<E>>],
        edit: &E,
        exhausted: impl FnOnce() -> String,
    ) -> Result<Mutation, MutationFailure> {
        let mut attempts = Vec::with_capacity(strategies.len());
        let mut rejection = None;

        for strategy in strategies {
            let kind = strategy.kind();
            let outcome = match strategy.attempt(doc, edit, &self.cache) {
                Attempt::Found(located) => finish(doc, kind, located),
                Attempt::Skipped => {
                    log::debug!("{}: no candidate", kind.as_str());
                    attempts.push(MatchResult::miss(kind));
                    continue;
                }
                Attempt::Rejected(err) => Err(err),
            };
            match outcome {
                Ok(mutation) => return Ok(mutation),
                Err(err) if err.ends_cascade() => {
                    log::debug!("{}: {err}, stopping", kind.as_str());
                    attempts.push(MatchResult::miss(kind));
                    rejection = Some(err);
                    break;
                }
                Err(err) => {
                    log::debug!("{}: {err}", kind.as_str());
                    attempts.push(MatchResult::miss(kind));
                    rejection.get_or_insert(err);
                }
            }
        }

        let error = rejection.unwrap_or_else(|| EditError::NoMatch(exhausted()));
        log::warn!("edit not applied: {error}");
        Err(MutationFailure {
            error,
            attempts,
            original: doc.source().to_string(),
        })
    }
}

impl Default for Mutator {
    fn default() -> Self {
        Self::new()
    }
}

fn one_shot(
    doc: &Document<'_>,
    kind: StrategyKind,
    located: crate::error::Result<Located>,
) -> Result<Mutation, MutationFailure> {
    located.and_then(|located| finish(doc, kind, located)).map_err(|error| {
        log::warn!("{} not applied: {error}", kind.as_str());
        MutationFailure {
            error,
            attempts: vec![MatchResult::miss(kind)],
            original: doc.source().to_string(),
        }
    })
}

/// Apply the located splices. A result identical to the input counts as a failure so
/// that a repeated edit never reports success.
fn finish(doc: &Document<'_>, kind: StrategyKind, located: Located) -> crate::error::Result<Mutation> {
    let document = apply_splices(doc.source(), &located.splices)?;
    if document == doc.source() {
        return Err(EditError::NoMatch(format!(
            "{} would leave the document unchanged",
            kind.as_str()
        )));
    }

    log::info!(
        "{} applied {} transformation(s){}",
        kind.as_str(),
        located.transformations(),
        located
            .element_path
            .as_deref()
            .map(|path| format!(" at {path}"))
            .unwrap_or_default()
    );
    Ok(Mutation {
        document,
        transformations: located.transformations(),
        matched: MatchResult {
            strategy: kind,
            fragment: located.fragment,
            element_path: located.element_path,
            success: true,
        },
        elements: located.elements,
    })
}
