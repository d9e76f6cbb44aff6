//! Binding Language
//!
//! The micro-language embedded in template attributes: its model, its
//! scanner and one parser entry point per grammar production.

pub mod ast;
pub mod parser;
pub mod scanner;

pub use ast::*;
pub use parser::{
    parse_args, parse_assignments, parse_bindings, parse_captures, parse_cparams, parse_expression,
    parse_fields, parse_for, parse_handlers, parse_imports, parse_type,
};
pub use scanner::{BindingError, BindingErrorKind, ScanResult, Scanner};
