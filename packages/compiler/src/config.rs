//! Compiler Configuration
//!
//! Vocabulary and output settings. Every field has a default so a config
//! file only needs to name what it changes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ModuleLayout {
    /// `mod <name>;` declarations next to the generated files.
    Files,
    /// `include!` of files a build script wrote to `$OUT_DIR/<subdir>`.
    OutDir { subdir: String },
}

impl Default for ModuleLayout {
    fn default() -> Self {
        ModuleLayout::Files
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompilerConfig {
    /// Namespace prefix of the template vocabulary, as in `<a:component>`.
    pub prefix: String,
    /// Path generated code uses to reach the runtime crate.
    pub runtime_crate: String,
    /// Emit the "generated, do not edit" header.
    pub emit_header: bool,
    /// Also write each component's model as JSON next to its module.
    pub dump_model: bool,
    pub module_layout: ModuleLayout,
    /// Name of the struct generated for a package's skeleton.
    pub site_struct: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            prefix: "a".to_string(),
            runtime_crate: "skein_runtime".to_string(),
            emit_header: true,
            dump_model: false,
            module_layout: ModuleLayout::Files,
            site_struct: "Site".to_string(),
        }
    }
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(&self.prefix)
    }
}

/// Element and attribute names of the template vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub prefix: String,
    pub import: String,
    pub component: String,
    pub data: String,
    pub handlers: String,
    pub controller: String,
    pub embed: String,
    pub construct: String,
    pub bindings: String,
    pub assign: String,
    pub capture: String,
    pub if_: String,
    pub for_: String,
    pub macro_: String,
    pub include: String,
    pub slot: String,
}

impl Vocabulary {
    pub fn new(prefix: &str) -> Self {
        let name = |local: &str| format!("{}:{}", prefix, local);
        Vocabulary {
            prefix: prefix.to_string(),
            import: name("import"),
            component: name("component"),
            data: name("data"),
            handlers: name("handlers"),
            controller: name("controller"),
            embed: name("embed"),
            construct: name("construct"),
            bindings: name("bindings"),
            assign: name("assign"),
            capture: name("capture"),
            if_: name("if"),
            for_: name("for"),
            macro_: name("macro"),
            include: name("include"),
            slot: name("slot"),
        }
    }

    /// Whether `name` lies in the vocabulary's namespace.
    pub fn owns(&self, name: &str) -> bool {
        match (name.get(..self.prefix.len()), name.get(self.prefix.len()..)) {
            (Some(head), Some(rest)) => {
                head.eq_ignore_ascii_case(&self.prefix) && rest.starts_with(':')
            }
            _ => false,
        }
    }

    pub fn is(&self, name: &str, expected: &str) -> bool {
        name.eq_ignore_ascii_case(expected)
    }
}
