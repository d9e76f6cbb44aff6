//! Compiles `templates/*.html` and the site skeleton into `$OUT_DIR/ui`,
//! included by `src/lib.rs`.

use anyhow::{bail, Context};
use skein_compiler::{Compiler, CompilerConfig, ModuleLayout};
use std::env;
use std::fs;
use std::path::PathBuf;

const TEMPLATES: &str = "templates/*.html";
const SKELETON: &str = "site/index.html";
const SUBDIR: &str = "ui";

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=templates");
    println!("cargo:rerun-if-changed={}", SKELETON);

    let mut sources = Vec::new();
    for entry in glob::glob(TEMPLATES)? {
        let path = entry?;
        println!("cargo:rerun-if-changed={}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        sources.push((path.to_string_lossy().into_owned(), content));
    }
    sources.sort();
    let skeleton = (
        SKELETON.to_string(),
        fs::read_to_string(SKELETON).with_context(|| format!("cannot read {}", SKELETON))?,
    );

    let config = CompilerConfig {
        module_layout: ModuleLayout::OutDir {
            subdir: SUBDIR.to_string(),
        },
        ..CompilerConfig::default()
    };
    let result = Compiler::new(config).compile_package(&sources, Some(&skeleton));
    if result.has_errors() {
        for error in &result.errors {
            println!("cargo:warning={}", error);
        }
        bail!("{} template error(s)", result.errors.len());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?).join(SUBDIR);
    fs::create_dir_all(&out_dir)?;
    for file in &result.files {
        fs::write(out_dir.join(&file.name), &file.contents)
            .with_context(|| format!("cannot write {}", file.name))?;
    }
    Ok(())
}
