//! Output Module
//!
//! Rust source generation: one module per component plus the package module
//! declaring them, and the site module when the package has a skeleton.

pub mod component_gen;
pub mod emitter;
pub mod site_gen;
pub mod template_gen;

pub use component_gen::{
    controller_trait_name, list_alias_name, optional_alias_name, ComponentGenerator,
    EmbedAliases, GENERATED_HEADER,
};
pub use emitter::EmitterVisitorContext;
pub use site_gen::{render_html, SiteGenerator, INDEX_FILE, SITE_MODULE};

use crate::config::{CompilerConfig, ModuleLayout};

pub const PACKAGE_MODULE_FILE: &str = "mod.rs";

/// The package module declaring and re-exporting every component module.
pub fn generate_package_module(config: &CompilerConfig, modules: &[String]) -> String {
    let mut ctx = EmitterVisitorContext::create_root();
    if config.emit_header {
        ctx.println(GENERATED_HEADER);
        ctx.blank_line();
    }
    for module in modules {
        match &config.module_layout {
            ModuleLayout::Files => ctx.println(&format!("pub mod {};", module)),
            ModuleLayout::OutDir { subdir } => {
                ctx.block(&format!("pub mod {} {{", module), "}", |ctx| {
                    ctx.println(&format!(
                        "include!(concat!(env!(\"OUT_DIR\"), \"/{}/{}.rs\"));",
                        subdir, module
                    ));
                });
            }
        }
    }
    if !modules.is_empty() {
        ctx.blank_line();
    }
    for module in modules {
        ctx.println(&format!("pub use {}::*;", module));
    }
    ctx.to_source()
}
