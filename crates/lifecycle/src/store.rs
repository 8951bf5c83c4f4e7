use crate::layout::ProjectLayout;
use ignore::WalkBuilder;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentFile {
    pub name: String,
    pub path: PathBuf,
}

/// Component documents on disk: one file per component, directly inside the
/// components directory.
pub struct ComponentStore<'a> {
    layout: &'a ProjectLayout,
}

impl<'a> ComponentStore<'a> {
    pub fn new(layout: &'a ProjectLayout) -> Self {
        Self { layout }
    }

    /// Component files sorted by name. A missing directory lists as empty.
    pub fn list(&self) -> Vec<ComponentFile> {
        let dir = self.layout.components_path();
        if !dir.is_dir() {
            log::debug!("components directory {} does not exist", dir.display());
            return Vec::new();
        }

        let mut files = Vec::new();
        let mut builder = WalkBuilder::new(&dir);
        builder.max_depth(Some(1)).hidden(true).git_ignore(false);

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                        continue;
                    }
                    let path = entry.path();
                    let matches_ext = path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.layout.extension));
                    if !matches_ext {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                        files.push(ComponentFile {
                            name: stem.to_string(),
                            path: path.to_path_buf(),
                        });
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        files
    }

    /// Case-insensitive lookup, so `hero` finds `Hero.astro`.
    pub fn find(&self, name: &str) -> Option<ComponentFile> {
        self.list()
            .into_iter()
            .find(|file| file.name.eq_ignore_ascii_case(name))
    }
}
