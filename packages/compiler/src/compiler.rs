//! Compiler Main Module
//!
//! Compiles one package: every template file of the package is parsed,
//! walked and assembled, and each component that passes becomes one Rust
//! module. Failing components are reported and skipped; the rest of the
//! package is still generated.
//!
//! Macros are expanded before anything else looks at a component. A
//! compiler can collect the macros of several packages up front so that
//! includes resolve across package boundaries.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};
use crate::ml_parser::{Node, Parser};
use crate::parse_util::ParseSourceSpan;
use crate::output::{
    self, ComponentGenerator, EmbedAliases, SiteGenerator, INDEX_FILE, PACKAGE_MODULE_FILE,
    SITE_MODULE,
};
use crate::template::walker::check_identifier;
use crate::template::{
    Assembler, ComponentSignature, MacroSet, TemplateFile, TemplateWalker, WalkedComponent,
};

/// Component signatures of already compiled packages, keyed by the import
/// path templates use to refer to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageRegistry {
    packages: IndexMap<String, IndexMap<String, ComponentSignature>>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        PackageRegistry::default()
    }

    pub fn register(
        &mut self,
        package: impl Into<String>,
        components: impl IntoIterator<Item = ComponentSignature>,
    ) {
        let signatures = components
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();
        self.packages.insert(package.into(), signatures);
    }

    pub fn package(&self, package: &str) -> Option<&IndexMap<String, ComponentSignature>> {
        self.packages.get(package)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the package output directory.
    pub name: String,
    pub contents: String,
}

#[derive(Debug, Default)]
pub struct PackageResult {
    pub files: Vec<GeneratedFile>,
    pub errors: Vec<CompileError>,
    /// Signatures of the generated components, for registering the package.
    pub components: Vec<ComponentSignature>,
}

impl PackageResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn file(&self, name: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

/// A component that passed every check, ready for generation.
struct Assembled {
    module: String,
    walked: WalkedComponent,
    file: usize,
}

pub struct Compiler {
    config: CompilerConfig,
    registry: PackageRegistry,
    macros: MacroSet,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Compiler::with_registry(config, PackageRegistry::new())
    }

    pub fn with_registry(config: CompilerConfig, registry: PackageRegistry) -> Self {
        Compiler {
            config,
            registry,
            macros: MacroSet::new(),
        }
    }

    /// Starts from macros collected elsewhere, typically from every
    /// package of a build.
    pub fn with_macros(mut self, macros: MacroSet) -> Self {
        self.macros = macros;
        self
    }

    pub fn macros(&self) -> &MacroSet {
        &self.macros
    }

    /// Collects the macro definitions of template files so that later
    /// packages can include them.
    pub fn collect_macros(&mut self, sources: &[(String, String)]) -> Vec<CompileError> {
        let vocab = self.config.vocabulary();
        let errors = self.macros.collect_sources(&vocab, sources);
        log::debug!("{} macro(s) known", self.macros.len());
        errors
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PackageRegistry {
        &mut self.registry
    }

    /// Compiles the template files of one package, given as `(url, content)`
    /// pairs.
    pub fn compile_sources(&self, sources: &[(String, String)]) -> PackageResult {
        self.compile_package(sources, None)
    }

    /// Like [`Compiler::compile_sources`], additionally generating the site
    /// module and `index.html` from a skeleton given as `(url, content)`.
    pub fn compile_package(
        &self,
        sources: &[(String, String)],
        skeleton: Option<&(String, String)>,
    ) -> PackageResult {
        let vocab = self.config.vocabulary();
        let walker = TemplateWalker::new(&vocab);
        let mut result = PackageResult::default();

        let mut parsed = Vec::new();
        for (url, content) in sources {
            if let Some(roots) = parse_markup(url, content, &mut result) {
                parsed.push(roots);
            }
        }

        let mut macros = self.macros.clone();
        for roots in &mut parsed {
            result.errors.extend(macros.collect(&vocab, roots));
        }
        for roots in &mut parsed {
            result.errors.extend(macros.expand_components(&vocab, roots));
        }

        let mut local: IndexMap<String, ComponentSignature> = IndexMap::new();
        let mut declared: Vec<Vec<String>> = Vec::new();
        for roots in &parsed {
            let decls = walker.declarations(roots);
            declared.push(decls.iter().map(|d| d.name.clone()).collect());
            for decl in decls {
                if local.contains_key(&decl.name) {
                    result.errors.push(CompileError::structural(
                        format!("component `{}` is declared more than once", decl.name),
                        &decl.span,
                    ));
                    continue;
                }
                local.insert(
                    decl.name.clone(),
                    ComponentSignature {
                        name: decl.name,
                        has_controller: decl.has_controller,
                    },
                );
            }
        }

        let mut files: Vec<TemplateFile> = Vec::new();
        for (roots, names) in parsed.into_iter().zip(declared) {
            let failed = match walker.walk_file(roots) {
                Ok(mut file) => {
                    let failed = std::mem::take(&mut file.failed);
                    files.push(file);
                    failed
                }
                Err(e) => {
                    result.errors.push(e);
                    names
                }
            };
            // embeds of these resolve to unknown components
            for name in failed {
                local.shift_remove(&name);
            }
        }

        let mut assembled: Vec<Assembled> = Vec::new();
        let mut modules: IndexMap<String, String> = IndexMap::new();
        for (index, file) in files.iter_mut().enumerate() {
            let assembler = Assembler::new(&local, &file.imports, &self.registry);
            for walked in std::mem::take(&mut file.components) {
                let checked = walked.and_then(|mut walked| {
                    assembler.assemble(&mut walked)?;
                    let module = module_name(&walked, &modules)?;
                    Ok((module, walked))
                });
                match checked {
                    Ok((module, walked)) => {
                        modules.insert(module.clone(), walked.component.name.clone());
                        assembled.push(Assembled {
                            module,
                            walked,
                            file: index,
                        });
                    }
                    Err(e) => result.errors.push(e),
                }
            }
        }

        while let Some((index, child, span)) = failed_embed(&assembled) {
            let item = assembled.remove(index);
            log::debug!("dropping {}: embeds failed `{}`", item.walked.component.name, child);
            result.errors.push(CompileError::structural(
                format!("embedded component `{}` failed to compile", child),
                &span,
            ));
        }

        let aliases = embed_aliases(&assembled);
        for item in &assembled {
            let component = &item.walked.component;
            let imports = &files[item.file].imports;
            let source = ComponentGenerator::new(
                &self.config,
                imports,
                component,
                &item.walked.template,
                aliases.get(&component.name).copied().unwrap_or_default(),
            )
            .generate();
            result.files.push(GeneratedFile {
                name: format!("{}.rs", item.module),
                contents: source,
            });

            if self.config.dump_model {
                match serde_json::to_string_pretty(component) {
                    Ok(json) => result.files.push(GeneratedFile {
                        name: format!("{}.json", item.module),
                        contents: json,
                    }),
                    Err(e) => log::warn!("cannot dump model of {}: {}", component.name, e),
                }
            }

            result.components.push(ComponentSignature {
                name: component.name.clone(),
                has_controller: component.has_controller(),
            });
        }

        let mut module_names: Vec<String> = assembled.iter().map(|a| a.module.clone()).collect();
        if let Some((url, content)) = skeleton {
            let passing: IndexMap<String, ComponentSignature> = result
                .components
                .iter()
                .map(|c| (c.name.clone(), c.clone()))
                .collect();
            let site = parse_markup(url, content, &mut result).and_then(|roots| {
                let checked = self.site(&walker, &macros, &passing, roots, url);
                checked.map_err(|e| result.errors.push(e)).ok()
            });
            if let Some((imports, walked)) = site {
                let source =
                    SiteGenerator::new(&self.config, &imports, &walked.component, &walked.template)
                        .generate();
                result.files.push(GeneratedFile {
                    name: format!("{}.rs", SITE_MODULE),
                    contents: source,
                });
                result.files.push(GeneratedFile {
                    name: INDEX_FILE.to_string(),
                    contents: output::render_html(&walked.template),
                });
                module_names.push(SITE_MODULE.to_string());
            }
        }
        result.files.push(GeneratedFile {
            name: PACKAGE_MODULE_FILE.to_string(),
            contents: output::generate_package_module(&self.config, &module_names),
        });

        log::info!(
            "generated {} component(s), {} error(s)",
            result.components.len(),
            result.errors.len()
        );
        result
    }
}

impl Compiler {
    /// Walks and checks a skeleton against the components that passed.
    fn site(
        &self,
        walker: &TemplateWalker,
        macros: &MacroSet,
        passing: &IndexMap<String, ComponentSignature>,
        mut roots: Vec<Node>,
        url: &str,
    ) -> Result<(IndexMap<String, String>, WalkedComponent)> {
        let vocab = self.config.vocabulary();
        for node in &mut roots {
            if let Node::Element(element) = node {
                macros.expand(&vocab, element)?;
            }
        }
        let (imports, mut walked) = walker.walk_skeleton(roots, &self.config.site_struct, url)?;
        check_identifier(&self.config.site_struct, "site struct", &walked.spans.component)?;
        let site_struct = &self.config.site_struct;
        if let Some(other) = passing
            .keys()
            .find(|name| *name == site_struct || snake_case(name) == SITE_MODULE)
        {
            return Err(CompileError::structural(
                format!("the site collides with component `{}`", other),
                &walked.spans.component,
            ));
        }
        Assembler::new(passing, &imports, &self.registry).assemble(&mut walked)?;
        Ok((imports, walked))
    }
}

/// Parses one file, moving its markup errors into `result`.
fn parse_markup(url: &str, content: &str, result: &mut PackageResult) -> Option<Vec<Node>> {
    let tree = Parser::default().parse(content, url);
    if tree.errors.is_empty() {
        return Some(tree.root_nodes);
    }
    log::debug!("{}: {} markup error(s)", url, tree.errors.len());
    result
        .errors
        .extend(tree.errors.into_iter().map(CompileError::Markup));
    None
}

fn module_name(walked: &WalkedComponent, taken: &IndexMap<String, String>) -> Result<String> {
    let module = snake_case(&walked.component.name);
    check_identifier(&module, "module name", &walked.spans.component)?;
    if let Some(other) = taken.get(&module) {
        return Err(CompileError::structural(
            format!(
                "`{}` and `{}` would share the module `{}`",
                other, walked.component.name, module
            ),
            &walked.spans.component,
        ));
    }
    Ok(module)
}

/// First local embed whose component did not make it through assembly.
fn failed_embed(assembled: &[Assembled]) -> Option<(usize, String, ParseSourceSpan)> {
    let passing: HashSet<&str> = assembled
        .iter()
        .map(|a| a.walked.component.name.as_str())
        .collect();
    assembled.iter().enumerate().find_map(|(index, item)| {
        let walked = &item.walked;
        walked
            .component
            .embeds
            .iter()
            .zip(&walked.spans.embeds)
            .find(|(e, _)| e.namespace.is_none() && !passing.contains(e.component_type.as_str()))
            .map(|(e, span)| (index, e.component_type.clone(), span.clone()))
    })
}

/// Which components need `XList` / `OptionalX` aliases.
fn embed_aliases(assembled: &[Assembled]) -> IndexMap<String, EmbedAliases> {
    let mut aliases: IndexMap<String, EmbedAliases> = IndexMap::new();
    for item in assembled {
        for embed in &item.walked.component.embeds {
            if embed.namespace.is_some() {
                continue;
            }
            let entry = aliases.entry(embed.component_type.clone()).or_default();
            match embed.kind {
                crate::binding::EmbedKind::List => entry.list = true,
                crate::binding::EmbedKind::Optional => entry.optional = true,
                crate::binding::EmbedKind::Direct => {}
            }
        }
    }
    aliases
}

/// `HelloWorld` -> `hello_world`, `HTMLView` -> `html_view`.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            out.push(c);
            continue;
        }
        let boundary = match i.checked_sub(1).map(|j| chars[j]) {
            Some(prev) if prev.is_ascii_lowercase() || prev.is_ascii_digit() => true,
            Some(prev) if prev.is_ascii_uppercase() => chars
                .get(i + 1)
                .map_or(false, |next| next.is_ascii_lowercase()),
            _ => false,
        };
        if boundary && !out.ends_with('_') {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
