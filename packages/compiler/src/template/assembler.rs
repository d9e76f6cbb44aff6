//! Component Assembler
//!
//! Cross-checks a walked component: captures against handlers, member
//! names against each other, embeds against known components. Resolves
//! each capture's automatic event handling on the way.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::walker::WalkedComponent;
use crate::binding::{Component, EventHandling};
use crate::compiler::PackageRegistry;
use crate::error::{CompileError, Result, SemanticError};
use crate::parse_util::ParseSourceSpan;

/// Member names taken by generated code.
const RESERVED_MEMBERS: &[&str] = &["cd", "controller"];

/// What an embedding component needs to know about an embedded one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSignature {
    pub name: String,
    pub has_controller: bool,
}

pub struct Assembler<'a> {
    local: &'a IndexMap<String, ComponentSignature>,
    imports: &'a IndexMap<String, String>,
    registry: &'a PackageRegistry,
}

impl<'a> Assembler<'a> {
    pub fn new(
        local: &'a IndexMap<String, ComponentSignature>,
        imports: &'a IndexMap<String, String>,
        registry: &'a PackageRegistry,
    ) -> Self {
        Assembler {
            local,
            imports,
            registry,
        }
    }

    pub fn assemble(&self, walked: &mut WalkedComponent) -> Result<()> {
        let WalkedComponent {
            component, spans, ..
        } = walked;

        for name in component.controller_methods.keys() {
            if component.handlers.contains_key(name) {
                return Err(CompileError::semantic(
                    SemanticError::DuplicateHandler(name.clone()),
                    &spans.controller,
                ));
            }
        }

        let mut members = HashSet::new();
        let fields = component.fields.iter().map(|f| (&f.name, &spans.fields));
        let variables = component
            .variables
            .iter()
            .zip(&spans.variables)
            .map(|(v, span)| (&v.name, span));
        let embeds = component
            .embeds
            .iter()
            .zip(&spans.embeds)
            .map(|(e, span)| (&e.field, span));
        for (name, span) in fields.chain(variables).chain(embeds) {
            if RESERVED_MEMBERS.contains(&name.as_str()) || !members.insert(name.as_str()) {
                return Err(CompileError::semantic(
                    SemanticError::DuplicateMember(name.clone()),
                    span,
                ));
            }
        }

        resolve_captures(component, &spans.captures)?;
        self.check_embeds(component, &spans.embeds)
    }

    fn check_embeds(&self, component: &Component, spans: &[ParseSourceSpan]) -> Result<()> {
        for (embed, span) in component.embeds.iter().zip(spans) {
            let signature = match &embed.namespace {
                None => Some(self.local.get(&embed.component_type).ok_or_else(|| {
                    CompileError::structural(
                        format!("unknown component `{}`", embed.component_type),
                        span,
                    )
                })?),
                Some(alias) => {
                    // the walker only accepts imported aliases
                    let package = self.imports.get(alias).map_or(alias.as_str(), String::as_str);
                    match self.registry.package(package) {
                        Some(signatures) => {
                            Some(signatures.get(&embed.component_type).ok_or_else(|| {
                                CompileError::structural(
                                    format!(
                                        "package `{}` has no component `{}`",
                                        package, embed.component_type
                                    ),
                                    span,
                                )
                            })?)
                        }
                        None => {
                            log::warn!(
                                "package `{}` is not known, assuming it provides `{}`",
                                package,
                                embed.component_type
                            );
                            None
                        }
                    }
                }
            };

            if let Some(signature) = signature {
                if embed.control && !signature.has_controller {
                    return Err(CompileError::structural(
                        format!(
                            "`{}` has no controller for `{}` to implement",
                            signature.name, component.name
                        ),
                        span,
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Checks every capture's handler and mappings and settles
/// `AutoPreventDefault`.
fn resolve_captures(component: &mut Component, spans: &[ParseSourceSpan]) -> Result<()> {
    let Component {
        captures,
        handlers,
        controller_methods,
        ..
    } = component;

    for (capture, span) in captures.iter_mut().zip(spans) {
        for mapping in &mut capture.mappings {
            let handler = handlers
                .get(&mapping.handler)
                .or_else(|| controller_methods.get(&mapping.handler))
                .ok_or_else(|| {
                    CompileError::semantic(
                        SemanticError::UnknownHandler(mapping.handler.clone()),
                        span,
                    )
                })?;

            if let Some(param) = mapping
                .param_mappings
                .keys()
                .find(|name| handler.param(name).is_none())
            {
                return Err(CompileError::semantic(
                    SemanticError::UnmatchedParamMapping {
                        handler: mapping.handler.clone(),
                        param: param.clone(),
                    },
                    span,
                ));
            }
            if let Some(param) = handler
                .params
                .iter()
                .find(|p| !mapping.param_mappings.contains_key(&p.name))
            {
                return Err(CompileError::semantic(
                    SemanticError::MissingParamMapping {
                        handler: mapping.handler.clone(),
                        param: param.name.clone(),
                    },
                    span,
                ));
            }

            mapping.handling = match mapping.handling {
                EventHandling::AutoPreventDefault if handler.returns_bool() => {
                    EventHandling::AskPreventDefault
                }
                EventHandling::AutoPreventDefault => EventHandling::PreventDefault,
                EventHandling::AskPreventDefault if !handler.returns_bool() => {
                    return Err(CompileError::semantic(
                        SemanticError::AskWithoutBool(mapping.handler.clone()),
                        span,
                    ))
                }
                other => other,
            };
        }
    }
    Ok(())
}
