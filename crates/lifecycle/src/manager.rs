use crate::error::{LifecycleError, Result};
use crate::layout::ProjectLayout;
use crate::lock::{acquire_file_lock, write_atomic, VersionedFile};
use crate::manifest::{ManifestEntry, PageManifest, Placement, PositionHint};
use crate::name::ComponentName;
use crate::saga::{DeleteReport, DeleteStep, StepReport, StepStatus};
use crate::store::{ComponentFile, ComponentStore};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Created {
    pub component: String,
    pub file_path: String,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentListing {
    pub components: Vec<ListedComponent>,
    /// Manifest entries with no backing file.
    pub dangling: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedComponent {
    pub name: String,
    pub path: String,
    pub in_manifest: bool,
}

/// Creates and deletes components, keeping the page manifest in step with the files.
pub struct LifecycleManager {
    layout: ProjectLayout,
}

impl LifecycleManager {
    pub fn new(layout: ProjectLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    pub fn store(&self) -> ComponentStore<'_> {
        ComponentStore::new(&self.layout)
    }

    /// Write a new component document and register it in the manifest. If the
    /// manifest cannot be updated the new file is removed again.
    pub async fn create(
        &self,
        name: &str,
        body: &str,
        hint: Option<&PositionHint>,
    ) -> Result<Created> {
        let name = ComponentName::parse(name)?;
        let path = self.layout.component_path(&name);

        let _file_lock = acquire_file_lock(&self.layout.lock_dir(), &path).await?;
        if tokio::fs::try_exists(&path).await? {
            return Err(LifecycleError::AlreadyExists(path));
        }
        let mut content = body.trim_end().to_string();
        content.push('\n');
        write_atomic(&path, content.as_bytes()).await?;
        log::info!("wrote component {}", path.display());

        let import = self.layout.import_line(&name);
        let registered = self
            .edit_manifest(|manifest| {
                manifest.insert_import(&name, &import);
                manifest.insert_wrapper(&name, hint)
            })
            .await;

        match registered {
            Ok((placement, _)) => {
                log::info!("registered {name} in manifest ({placement:?})");
                Ok(Created {
                    component: name.to_string(),
                    file_path: self.layout.display_path(&path),
                    placement,
                })
            }
            Err(err) => {
                log::error!("manifest update for {name} failed: {err}; removing new file");
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    log::error!("could not remove {}: {cleanup}", path.display());
                }
                Err(err)
            }
        }
    }

    /// Tear a component down. Each step runs regardless of the others; the report
    /// says whether wrapper, import and file are all gone afterwards.
    pub async fn delete(&self, name: &str) -> Result<DeleteReport> {
        let name = ComponentName::parse(name)?;
        let path = self.resolve_component_path(&name);

        let mut steps = Vec::with_capacity(DeleteStep::SAGA.len());
        for step in DeleteStep::SAGA {
            let status = self.run_step(step, &name, &path).await;
            match &status {
                StepStatus::Applied => log::info!("delete {name}: {step} removed"),
                StepStatus::AlreadyAbsent => log::warn!("delete {name}: {step} already absent"),
                StepStatus::Failed(reason) => log::error!("delete {name}: {step} failed: {reason}"),
            }
            steps.push(StepReport { step, status });
        }

        let converged = self.is_absent(&name, &path).await;
        Ok(DeleteReport {
            component: name.to_string(),
            file_path: self.layout.display_path(&path),
            steps,
            converged,
        })
    }

    pub async fn list(&self) -> Result<ComponentListing> {
        let files = self.store().list();
        let manifest = VersionedFile::read(self.layout.manifest_path()).await?;
        let entries = PageManifest::new(manifest.content()).entries()?;

        let components = files
            .iter()
            .map(|file| ListedComponent {
                name: file.name.clone(),
                path: self.layout.display_path(&file.path),
                in_manifest: entries
                    .iter()
                    .any(|entry| entry.name.eq_ignore_ascii_case(&file.name)),
            })
            .collect();
        let dangling = entries
            .into_iter()
            .filter(|entry| !files.iter().any(|file| file.name.eq_ignore_ascii_case(&entry.name)))
            .collect();

        Ok(ComponentListing {
            components,
            dangling,
        })
    }

    pub fn find_component(&self, name: &str) -> Option<ComponentFile> {
        self.store().find(name)
    }

    async fn run_step(&self, step: DeleteStep, name: &ComponentName, path: &Path) -> StepStatus {
        let outcome = match step {
            DeleteStep::ManifestWrapper => self
                .edit_manifest(|manifest| manifest.remove_wrapper(name.id()))
                .await
                .map(|(removed, _)| removed),
            DeleteStep::ManifestImport => self
                .edit_manifest(|manifest| Ok(manifest.remove_import(name)))
                .await
                .map(|(removed, _)| removed),
            DeleteStep::ComponentFile => self.remove_file(path).await,
        };
        match outcome {
            Ok(true) => StepStatus::Applied,
            Ok(false) => StepStatus::AlreadyAbsent,
            Err(err) => StepStatus::Failed(err.to_string()),
        }
    }

    async fn remove_file(&self, path: &Path) -> Result<bool> {
        let _lock = acquire_file_lock(&self.layout.lock_dir(), path).await?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn is_absent(&self, name: &ComponentName, path: &Path) -> bool {
        let file_gone = !tokio::fs::try_exists(path).await.unwrap_or(true);
        let manifest_clean = match VersionedFile::read(self.layout.manifest_path()).await {
            Ok(file) => {
                let manifest = PageManifest::new(file.content());
                !manifest.has_import(name) && !manifest.has_wrapper(name.id()).unwrap_or(true)
            }
            Err(_) => false,
        };
        file_gone && manifest_clean
    }

    /// The existing file for `name` when one matches case-insensitively, else the
    /// canonical path.
    fn resolve_component_path(&self, name: &ComponentName) -> PathBuf {
        self.store()
            .find(name.as_str())
            .map(|file| file.path)
            .unwrap_or_else(|| self.layout.component_path(name))
    }

    /// Read-modify-write of the manifest under its lock. Returns the closure's value
    /// and whether anything was written.
    async fn edit_manifest<T>(
        &self,
        edit: impl FnOnce(&mut PageManifest) -> Result<T>,
    ) -> Result<(T, bool)> {
        let path = self.layout.manifest_path();
        let _lock = acquire_file_lock(&self.layout.lock_dir(), &path).await?;

        let file = VersionedFile::read(&path).await?;
        let mut manifest = PageManifest::new(file.content());
        let value = edit(&mut manifest)?;

        let changed = manifest.as_str() != file.content();
        if changed {
            file.write_if_unchanged(manifest.as_str()).await?;
        }
        Ok((value, changed))
    }
}
