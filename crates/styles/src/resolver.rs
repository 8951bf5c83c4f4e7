use crate::error::{Result, StyleError};
use crate::literal;
use crate::palette::{is_family, Slot};
use crate::reference::{StyleAxis, StyleReference, StyleReport};
use crate::semantic;
use pagesmith_lifecycle::{
    acquire_file_lock, ComponentFile, ComponentStore, ProjectLayout, VersionedFile,
};
use pagesmith_markup::{apply_splices, Splice};

type Rewrite = Option<(Vec<Splice>, Vec<String>)>;

/// Scans and rewrites colour references across every component document.
pub struct StyleResolver {
    layout: ProjectLayout,
}

impl StyleResolver {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    /// Every reference on one axis, computed fresh from disk.
    pub async fn scan(&self, axis: StyleAxis) -> Result<Vec<StyleReference>> {
        let mut references = Vec::new();
        for file in self.components() {
            let content = VersionedFile::read(&file.path).await?;
            let raws = match axis {
                StyleAxis::LiteralColor => literal::scan(content.content())?,
                StyleAxis::SemanticSlot(slot) => semantic::scan(content.content(), slot)?,
            };
            let display = self.layout.display_path(&file.path);
            references.extend(raws.into_iter().map(|raw| StyleReference {
                file: display.clone(),
                axis,
                raw,
            }));
        }
        Ok(references)
    }

    /// Literal axis: replace one explicit colour value everywhere.
    pub async fn rewrite_literal(
        &self,
        from: &str,
        to: &str,
        dark: Option<&str>,
    ) -> Result<StyleReport> {
        let files = self.components();
        self.rewrite_literal_in(&files, from, to, dark).await
    }

    /// Literal rewrite restricted to `files`.
    pub async fn rewrite_literal_in(
        &self,
        files: &[ComponentFile],
        from: &str,
        to: &str,
        dark: Option<&str>,
    ) -> Result<StyleReport> {
        let from = literal::normalize_color(from)?;
        let to = literal::normalize_color(to)?;
        let dark = dark.map(literal::normalize_color).transpose()?;
        log::info!("rewriting literal colour {from} -> {to} in {} file(s)", files.len());

        self.rewrite_each(files, StyleAxis::LiteralColor, |source| {
            literal::rewrite(source, &from, &to, dark.as_deref())
        })
        .await
    }

    /// Semantic axis: point a slot at a palette family.
    pub async fn sweep_slot(&self, slot: Slot, family: &str) -> Result<StyleReport> {
        let family = family.trim().to_ascii_lowercase();
        if !is_family(&family) {
            return Err(StyleError::UnknownFamily(family));
        }
        log::info!("sweeping {slot:?} to {family}");

        let files = self.components();
        self.rewrite_each(&files, StyleAxis::SemanticSlot(slot), |source| {
            semantic::sweep(source, slot, &family)
        })
        .await
    }

    /// The global headline colour sweep.
    pub async fn sweep_headlines(&self, family: &str) -> Result<StyleReport> {
        self.sweep_slot(Slot::HeadingText, family).await
    }

    fn components(&self) -> Vec<ComponentFile> {
        ComponentStore::new(&self.layout).list()
    }

    async fn rewrite_each(
        &self,
        files: &[ComponentFile],
        axis: StyleAxis,
        rewrite: impl Fn(&str) -> Result<Rewrite>,
    ) -> Result<StyleReport> {
        let mut report = StyleReport::default();

        for file in files {
            let display = self.layout.display_path(&file.path);
            let _lock = acquire_file_lock(&self.layout.lock_dir(), &file.path).await?;
            let content = VersionedFile::read(&file.path).await?;

            let outcome = match rewrite(content.content()) {
                Ok(Some((splices, written))) => apply_splices(content.content(), &splices)
                    .map_err(StyleError::from)
                    .map(|text| Some((text, written))),
                Ok(None) => Ok(None),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(Some((text, written))) => match content.write_if_unchanged(&text).await {
                    Ok(()) => {
                        log::info!("{display}: {} reference(s) rewritten", written.len());
                        report.record(&display, axis, written);
                    }
                    Err(err) => {
                        log::error!("{display}: not written: {err}");
                        report.skipped.push(display);
                    }
                },
                Ok(None) => log::debug!("{display}: no matching references"),
                Err(err) => {
                    log::error!("{display}: skipped: {err}");
                    report.skipped.push(display);
                }
            }
        }

        Ok(report)
    }
}
