//! Perform Compile
//!
//! Compiles one package directory: discovers its templates, runs the
//! compiler against the registry of packages compiled before it, writes
//! the generated modules and records the package in the registry.
//!
//! Macros are collected from every package before the first one compiles,
//! so includes may name macros of any package of the build.

use anyhow::Context;
use skein_compiler::output::INDEX_FILE;
use skein_compiler::template::MacroSet;
use skein_compiler::{CompileError, Compiler, ComponentSignature, PackageRegistry};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ProjectConfig;

#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub package_dir: PathBuf,
    /// Output directory; the package directory itself when absent.
    pub out_dir: Option<PathBuf>,
    pub config: ProjectConfig,
}

impl CompileOptions {
    pub fn new(package_dir: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        CompileOptions {
            package_dir: package_dir.into(),
            out_dir: None,
            config,
        }
    }

    pub fn out_dir(&self) -> &Path {
        self.out_dir.as_deref().unwrap_or(&self.package_dir)
    }
}

/// Compilation result of one package.
#[derive(Debug, Default)]
pub struct CompilationResult {
    pub package_path: String,
    pub templates: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
    pub errors: Vec<CompileError>,
    pub components: Vec<ComponentSignature>,
}

impl CompilationResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Template files of `base_dir` matching `include` and none of `exclude`,
/// sorted so output does not depend on directory order.
pub fn discover_templates(
    base_dir: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let excluded = exclude
        .iter()
        .map(|pattern| glob::Pattern::new(&base_dir.join(pattern).to_string_lossy()))
        .collect::<Result<Vec<_>, _>>()
        .context("invalid exclude pattern")?;

    let mut files = Vec::new();
    for pattern in include {
        let full_pattern = base_dir.join(pattern);
        let entries = glob::glob(&full_pattern.to_string_lossy())
            .with_context(|| format!("invalid include pattern '{}'", pattern))?;
        for entry in entries {
            match entry {
                Ok(path) => {
                    if path.is_file()
                        && !excluded.iter().any(|p| p.matches_path(&path))
                        && !files.contains(&path)
                    {
                        files.push(path);
                    }
                }
                Err(e) => log::warn!("skipping {}: {}", e.path().display(), e),
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Reads a registry file; a missing file is an empty registry.
pub fn load_registry(path: &Path) -> anyhow::Result<PackageRegistry> {
    if !path.exists() {
        return Ok(PackageRegistry::new());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read registry {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid registry {}", path.display()))
}

pub fn save_registry(path: &Path, registry: &PackageRegistry) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(registry)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("cannot write registry {}", path.display()))
}

/// Templates of a package as `(url, content)` pairs, in discovery order.
fn read_sources(options: &CompileOptions) -> anyhow::Result<(Vec<PathBuf>, Vec<(String, String)>)> {
    let config = &options.config;
    let mut templates = discover_templates(&options.package_dir, &config.include, &config.exclude)?;
    if config.skeleton.is_some() {
        let page = options.out_dir().join(INDEX_FILE);
        templates.retain(|path| *path != page);
    }
    let mut sources = Vec::with_capacity(templates.len());
    for path in &templates {
        sources.push(read_source(path)?);
    }
    Ok((templates, sources))
}

fn read_source(path: &Path) -> anyhow::Result<(String, String)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read template {}", path.display()))?;
    Ok((path.to_string_lossy().into_owned(), content))
}

/// First phase of a build: adds the macros of one package to `macros`.
pub fn collect_macros(
    options: &CompileOptions,
    macros: &mut MacroSet,
) -> anyhow::Result<Vec<CompileError>> {
    let (_, sources) = read_sources(options)?;
    let vocab = options.config.compiler.vocabulary();
    let errors = macros.collect_sources(&vocab, &sources);
    log::debug!(
        "{}: {} macro(s) known after collecting",
        options.package_dir.display(),
        macros.len()
    );
    Ok(errors)
}

/// Compiles one package against `registry` and registers it there.
///
/// Component errors are returned in the result, not as `Err`; the
/// components that passed are written regardless.
pub fn perform_compilation(
    options: &CompileOptions,
    registry: &mut PackageRegistry,
    macros: &MacroSet,
) -> anyhow::Result<CompilationResult> {
    let package_dir = &options.package_dir;
    let config = &options.config;
    let (templates, sources) = read_sources(options)?;
    log::info!(
        "compiling {} ({} template(s))",
        package_dir.display(),
        templates.len()
    );
    let skeleton = match &config.skeleton {
        Some(path) => Some(read_source(&package_dir.join(path))?),
        None => None,
    };

    let compiler = Compiler::with_registry(config.compiler.clone(), registry.clone())
        .with_macros(macros.clone());
    let package = compiler.compile_package(&sources, skeleton.as_ref());

    let out_dir = options.out_dir();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(package.files.len());
    for file in &package.files {
        let path = out_dir.join(&file.name);
        fs::write(&path, &file.contents)
            .with_context(|| format!("cannot write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }

    let package_path = config.package_path(package_dir);
    registry.register(package_path.clone(), package.components.iter().cloned());

    Ok(CompilationResult {
        package_path,
        templates,
        written,
        errors: package.errors,
        components: package.components,
    })
}
