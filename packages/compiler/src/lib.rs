//! Compiler for HTML templates annotated with the skein binding language.
//!
//! Markup is parsed by [`ml_parser`], binding attributes by [`binding`];
//! [`template`] walks and checks each component and [`output`] renders it
//! as Rust against the `skein-runtime` crate. [`compiler::Compiler`] ties
//! the stages together for one package.

pub mod binding;
pub mod chars;
pub mod compiler;
pub mod config;
pub mod error;
pub mod ml_parser;
pub mod output;
pub mod parse_util;
pub mod template;

pub use compiler::{snake_case, Compiler, GeneratedFile, PackageRegistry, PackageResult};
pub use config::{CompilerConfig, ModuleLayout, Vocabulary};
pub use error::{CompileError, Production, Result, SemanticError};
pub use template::ComponentSignature;
