//! Compile Errors
//!
//! One error per failing attribute or template, each carrying the span of
//! the offending input.

use std::fmt;

use thiserror::Error;

use crate::parse_util::{ParseError, ParseSourceSpan};

pub type Result<T> = std::result::Result<T, CompileError>;

/// Grammar entry points of the binding language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Bindings,
    Assignments,
    Captures,
    Fields,
    Handlers,
    ComponentParams,
    For,
    Args,
    Imports,
    Expression,
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Production::Bindings => "bindings",
            Production::Assignments => "assignments",
            Production::Captures => "captures",
            Production::Fields => "fields",
            Production::Handlers => "handlers",
            Production::ComponentParams => "component parameters",
            Production::For => "for",
            Production::Args => "arguments",
            Production::Imports => "imports",
            Production::Expression => "expression",
        })
    }
}

/// Locally detectable contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("duplicate parameter `{0}`")]
    DuplicateParam(String),

    #[error("duplicate import `{0}`")]
    DuplicateImport(String),

    #[error("duplicate tag `{0}`")]
    DuplicateTag(String),

    #[error("unknown tag `{0}`")]
    UnknownTag(String),

    #[error("invalid argument `{argument}` for tag `{tag}`")]
    InvalidTagArgument { tag: String, argument: String },

    #[error("too many arguments for tag `{0}`")]
    TooManyTagArguments(String),

    #[error("duplicate class name `{0}`")]
    DuplicateClass(String),

    #[error("variadic parameter `{0}` must be the last parameter")]
    VariadicNotLast(String),

    #[error("duplicate member `{0}`")]
    DuplicateMember(String),

    #[error("handler `{0}` is declared more than once")]
    DuplicateHandler(String),

    #[error("unknown handler `{0}`")]
    UnknownHandler(String),

    #[error("handler `{handler}` has no parameter `{param}`")]
    UnmatchedParamMapping { handler: String, param: String },

    #[error("parameter `{param}` of handler `{handler}` is not mapped")]
    MissingParamMapping { handler: String, param: String },

    #[error("handler `{0}` must return bool to decide on the default action")]
    AskWithoutBool(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("{span}: syntax error in {production}: expected {expected}")]
    Syntax {
        production: Production,
        expected: String,
        span: ParseSourceSpan,
    },

    #[error("{span}: {error}")]
    Semantic {
        error: SemanticError,
        span: ParseSourceSpan,
    },

    #[error("{span}: {message}")]
    Structural {
        message: String,
        span: ParseSourceSpan,
    },

    #[error("{0}")]
    Markup(ParseError),
}

impl CompileError {
    pub fn structural(message: impl Into<String>, span: &ParseSourceSpan) -> Self {
        CompileError::Structural {
            message: message.into(),
            span: span.clone(),
        }
    }

    pub fn semantic(error: SemanticError, span: &ParseSourceSpan) -> Self {
        CompileError::Semantic {
            error,
            span: span.clone(),
        }
    }

    pub fn span(&self) -> &ParseSourceSpan {
        match self {
            CompileError::Syntax { span, .. }
            | CompileError::Semantic { span, .. }
            | CompileError::Structural { span, .. } => span,
            CompileError::Markup(e) => &e.span,
        }
    }

    pub fn semantic_error(&self) -> Option<&SemanticError> {
        match self {
            CompileError::Semantic { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Markup(e)
    }
}
