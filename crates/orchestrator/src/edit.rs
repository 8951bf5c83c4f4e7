use pagesmith_lifecycle::{acquire_file_lock, ComponentFile, ProjectLayout, VersionedFile};
use pagesmith_mutator::Mutator;
use pagesmith_protocol::{EditInstruction, EditOp, ErrorKind, RawEditInstruction, ResultEnvelope};
use pagesmith_styles::{normalize_color, StyleResolver};

/// Applies validated instructions to component documents, one locked
/// read-mutate-write per instruction.
pub struct EditHandler<'a> {
    layout: &'a ProjectLayout,
    mutator: &'a Mutator,
    styles: &'a StyleResolver,
}

/// A modify that swaps one colour literal for another, with a dark-mode variant.
struct ColourSwap {
    from: String,
    to: String,
    dark: String,
}

impl ColourSwap {
    fn detect(raw: &RawEditInstruction, instruction: &EditInstruction) -> Option<Self> {
        let dark = raw.property("darkValue")?;
        let EditOp::Modify(modify) = &instruction.op else {
            return None;
        };
        let from = normalize_color(modify.content_match.as_deref()?).ok()?;
        let to = normalize_color(&modify.new_content).ok()?;
        let dark = normalize_color(dark).ok()?;
        Some(Self { from, to, dark })
    }
}

impl<'a> EditHandler<'a> {
    pub fn new(layout: &'a ProjectLayout, mutator: &'a Mutator, styles: &'a StyleResolver) -> Self {
        Self {
            layout,
            mutator,
            styles,
        }
    }

    /// Validate `raw`, pick its component (the one it names, else `fallback`) and apply
    /// it. Validation failures are reported before any file is touched.
    pub async fn apply_raw(
        &self,
        raw: &RawEditInstruction,
        components: &[ComponentFile],
        fallback: Option<&ComponentFile>,
    ) -> ResultEnvelope {
        let instruction = match EditInstruction::try_from(raw.clone()) {
            Ok(instruction) => instruction,
            Err(err) => {
                log::warn!("rejected instruction: {err}");
                let file = raw.component.clone().unwrap_or_default();
                return ResultEnvelope::failed(file, ErrorKind::ValidationError, err.to_string(), None);
            }
        };

        let named = instruction.component.as_deref().and_then(|name| {
            components
                .iter()
                .find(|file| file.name.eq_ignore_ascii_case(name))
        });
        match named.or(fallback) {
            Some(component) => match ColourSwap::detect(raw, &instruction) {
                Some(swap) => self.swap_colour(component, swap).await,
                None => self.apply(component, &instruction).await,
            },
            None => ResultEnvelope::failed(
                instruction.component.unwrap_or_default(),
                ErrorKind::NotFoundError,
                "component not found",
                None,
            ),
        }
    }

    async fn swap_colour(&self, component: &ComponentFile, swap: ColourSwap) -> ResultEnvelope {
        let display = self.layout.display_path(&component.path);
        let files = std::slice::from_ref(component);
        match self
            .styles
            .rewrite_literal_in(files, &swap.from, &swap.to, Some(&swap.dark))
            .await
        {
            Ok(report) if report.skipped.contains(&display) => ResultEnvelope::failed(
                display,
                ErrorKind::NoOpError,
                "colour rewrite could not be applied",
                None,
            ),
            Ok(report) if report.is_empty() => ResultEnvelope::failed(
                display,
                ErrorKind::NoOpError,
                format!("colour {} not found", swap.from),
                None,
            ),
            Ok(report) => {
                let count = report.rewritten.len();
                let elements = report.rewritten.into_iter().map(|r| r.raw).collect();
                ResultEnvelope::applied(display, elements, count)
            }
            Err(err) => ResultEnvelope::failed(display, err.kind(), err.to_string(), None),
        }
    }

    pub async fn apply(&self, component: &ComponentFile, instruction: &EditInstruction) -> ResultEnvelope {
        let display = self.layout.display_path(&component.path);
        let op = instruction.op.kind().as_str();

        let _lock = match acquire_file_lock(&self.layout.lock_dir(), &component.path).await {
            Ok(lock) => lock,
            Err(err) => return ResultEnvelope::failed(display, err.kind(), err.to_string(), None),
        };
        let file = match VersionedFile::read(&component.path).await {
            Ok(file) if file.exists() => file,
            Ok(_) => {
                return ResultEnvelope::failed(
                    display,
                    ErrorKind::NotFoundError,
                    format!("{} does not exist", component.name),
                    None,
                )
            }
            Err(err) => return ResultEnvelope::failed(display, err.kind(), err.to_string(), None),
        };

        match self.mutator.apply(file.content(), &instruction.op) {
            Ok(mutation) => match file.write_if_unchanged(&mutation.document).await {
                Ok(()) => {
                    log::info!(
                        "{display}: {op} applied via {} ({} change(s))",
                        mutation.matched.strategy.as_str(),
                        mutation.transformations
                    );
                    mutation.envelope(display)
                }
                Err(err) => {
                    log::error!("{display}: {op} not written: {err}");
                    ResultEnvelope::failed(
                        display,
                        err.kind(),
                        err.to_string(),
                        Some(file.content().to_string()),
                    )
                }
            },
            Err(failure) => {
                log::warn!(
                    "{display}: {op} failed after {} attempt(s): {}",
                    failure.attempts.len(),
                    failure.error
                );
                failure.envelope(display)
            }
        }
    }
}
