use anyhow::Context;
use serde::Deserialize;
use skein_compiler::CompilerConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-package configuration file, looked up in the package directory.
pub const PROJECT_FILE: &str = "skein.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub compiler: CompilerConfig,
    /// Template globs, relative to the package directory.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    /// Module path other packages import this one by. Defaults to
    /// `crate::<directory name>`.
    pub package_path: Option<String>,
    /// Registry file read before compiling and updated afterwards.
    pub registry: Option<PathBuf>,
    /// Skeleton of the site document, relative to the package directory.
    pub skeleton: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            compiler: CompilerConfig::default(),
            include: vec!["*.html".to_string()],
            exclude: Vec::new(),
            package_path: None,
            registry: None,
            skeleton: None,
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read config {}", path.display()))?;
        let config: ProjectConfig = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// `skein.json` of `package_dir` when present, defaults otherwise.
    pub fn discover(package_dir: &Path) -> anyhow::Result<Self> {
        let path = package_dir.join(PROJECT_FILE);
        if path.is_file() {
            log::debug!("using {}", path.display());
            ProjectConfig::load(&path)
        } else {
            Ok(ProjectConfig::default())
        }
    }

    pub fn package_path(&self, package_dir: &Path) -> String {
        match &self.package_path {
            Some(path) => path.clone(),
            None => {
                let name = package_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("crate::{}", name)
            }
        }
    }
}
