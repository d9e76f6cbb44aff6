//! Template
//!
//! From parsed markup to checked component models.

pub mod assembler;
pub mod macros;
pub mod path;
pub mod walker;

pub use assembler::{Assembler, ComponentSignature};
pub use macros::{Macro, MacroSet};
pub use walker::{ComponentDecl, ComponentSpans, TemplateFile, TemplateWalker, WalkedComponent};
