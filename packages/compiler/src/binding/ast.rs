//! Binding Model
//!
//! The typed records the binding parser and the template walker produce.
//! All of them are compile-time inputs to code generation.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

/// Child indices from a component or block root; empty is the root itself.
pub type Path = SmallVec<[usize; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoundKind {
    SelfNode,
    Dataset,
    Property,
    Style,
    Class,
    FormValue,
    EventValue,
}

impl BoundKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BoundKind::SelfNode => "self",
            BoundKind::Dataset => "dataset",
            BoundKind::Property => "prop",
            BoundKind::Style => "style",
            BoundKind::Class => "class",
            BoundKind::FormValue => "form",
            BoundKind::EventValue => "event",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundValue {
    pub kind: BoundKind,
    pub ids: Vec<String>,
    /// Levels from the bound node up to the enclosing `<form>`.
    pub form_depth: usize,
    pub is_radio: bool,
}

impl BoundValue {
    pub fn new(kind: BoundKind, ids: Vec<String>) -> Self {
        BoundValue {
            kind,
            ids,
            form_depth: 0,
            is_radio: false,
        }
    }

    /// The single id of non-class kinds.
    pub fn id(&self) -> &str {
        self.ids.first().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.keyword(), self.ids.join(", "))
    }
}

/// Host-language source copied verbatim into generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Expression(String);

impl Expression {
    pub fn new(source: impl Into<String>) -> Self {
        Expression(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub target: BoundValue,
    pub expression: Expression,
    pub path: Path,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Block {
    pub assignments: Vec<Assignment>,
    pub controlled: Vec<ControlledBlock>,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.controlled.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ControlledBlock {
    Conditional {
        expression: Expression,
        path: Path,
        block: Block,
    },
    Repeated {
        expression: Expression,
        index_var: String,
        item_var: Option<String>,
        path: Path,
        block: Block,
    },
}

impl ControlledBlock {
    pub fn path(&self) -> &Path {
        match self {
            ControlledBlock::Conditional { path, .. } | ControlledBlock::Repeated { path, .. } => {
                path
            }
        }
    }

    pub fn block(&self) -> &Block {
        match self {
            ControlledBlock::Conditional { block, .. }
            | ControlledBlock::Repeated { block, .. } => block,
        }
    }
}

/// The `for` production: `index (, item)? := range expr`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForLoop {
    pub index_var: String,
    pub item_var: Option<String>,
    pub expression: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum EventHandling {
    #[default]
    AutoPreventDefault,
    PreventDefault,
    DontPreventDefault,
    AskPreventDefault,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMapping {
    pub event: String,
    pub handler: String,
    pub param_mappings: IndexMap<String, BoundValue>,
    pub handling: EventHandling,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capture {
    pub path: Path,
    pub mappings: Vec<EventMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: ParamType,
    pub default_value: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    /// None when the type follows from the bound kind.
    pub ty: Option<ParamType>,
    pub value: BoundValue,
    pub path: Path,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentParam {
    pub name: String,
    pub ty: ParamType,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: ParamType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerSpec {
    pub params: Vec<Param>,
    pub returns: Option<ParamType>,
}

impl HandlerSpec {
    pub fn returns_bool(&self) -> bool {
        matches!(self.returns, Some(ParamType::Bool))
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmbedKind {
    Direct,
    List,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstructorKind {
    Unconditional,
    Conditional {
        expression: Expression,
    },
    Repeated {
        expression: Expression,
        index_var: String,
        item_var: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorCall {
    pub kind: ConstructorKind,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Embed {
    pub field: String,
    pub component_type: String,
    pub namespace: Option<String>,
    pub kind: EmbedKind,
    pub path: Path,
    pub constructor_args: Vec<Expression>,
    /// The embedding component acts as the child's controller.
    pub control: bool,
    pub constructor_calls: Vec<ConstructorCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Component {
    pub name: String,
    pub parameters: Vec<ComponentParam>,
    pub fields: Vec<Field>,
    pub variables: Vec<Variable>,
    pub block: Block,
    pub captures: Vec<Capture>,
    pub embeds: Vec<Embed>,
    pub handlers: IndexMap<String, HandlerSpec>,
    pub controller_methods: IndexMap<String, HandlerSpec>,
}

impl Component {
    pub fn has_controller(&self) -> bool {
        !self.controller_methods.is_empty()
    }

    /// Looks a handler up in the component's own handlers, then in its
    /// controller interface.
    pub fn handler(&self, name: &str) -> Option<&HandlerSpec> {
        self.handlers
            .get(name)
            .or_else(|| self.controller_methods.get(name))
    }
}

/// Rust type descriptors accepted by the type grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ParamType {
    Bool,
    Int(String),
    Float(String),
    String,
    Named(String),
    Generic { base: String, args: Vec<ParamType> },
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Classifies a plain path.
    pub fn from_path(path: &str) -> Self {
        match path {
            "bool" => ParamType::Bool,
            "String" => ParamType::String,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => ParamType::Int(path.to_string()),
            "f32" | "f64" => ParamType::Float(path.to_string()),
            _ => ParamType::Named(path.to_string()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => f.write_str("bool"),
            ParamType::Int(name) | ParamType::Float(name) | ParamType::Named(name) => {
                f.write_str(name)
            }
            ParamType::String => f.write_str("String"),
            ParamType::Generic { base, args } => {
                write!(f, "{}<", base)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            ParamType::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}
