use crate::name::ComponentName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STATE_DIR_NAME: &str = ".pagesmith";

/// Where component documents and the page manifest live, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub components_dir: PathBuf,
    pub manifest: PathBuf,
    pub extension: String,
    /// Module path the manifest uses to import components.
    pub import_prefix: String,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            components_dir: PathBuf::from("src/components"),
            manifest: PathBuf::from("src/pages/index.astro"),
            extension: "astro".to_string(),
            import_prefix: "../components".to_string(),
        }
    }
}

impl ProjectLayout {
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn components_path(&self) -> PathBuf {
        self.root.join(&self.components_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    pub fn component_path(&self, name: &ComponentName) -> PathBuf {
        self.components_path()
            .join(format!("{}.{}", name.as_str(), self.extension))
    }

    pub fn import_line(&self, name: &ComponentName) -> String {
        format!(
            "import {name} from '{}/{name}.{}';",
            self.import_prefix.trim_end_matches('/'),
            self.extension
        )
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR_NAME).join("locks")
    }

    /// Path relative to the project root, for reporting.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_line_uses_prefix_and_extension() {
        let layout = ProjectLayout::default();
        let name = ComponentName::parse("faq").unwrap();
        assert_eq!(
            layout.import_line(&name),
            "import Faq from '../components/Faq.astro';"
        );
        assert!(layout.component_path(&name).ends_with("src/components/Faq.astro"));
    }
}
