/**
 * Binding Parser Tests
 *
 * One module per grammar production, plus error placement.
 */

#[cfg(test)]
mod binding_parser_tests {
    use skein_compiler::binding::*;
    use skein_compiler::error::{Production, SemanticError};
    use skein_compiler::parse_util::{ParseSourceFile, ParseSourceSpan};

    fn semantic<T: std::fmt::Debug>(result: ScanResult<T>) -> SemanticError {
        result
            .unwrap_err()
            .semantic_error()
            .cloned()
            .expect("expected a semantic error")
    }

    fn expected<T: std::fmt::Debug>(result: ScanResult<T>) -> String {
        match result.unwrap_err().kind {
            BindingErrorKind::Syntax(expected) => expected,
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    fn ids(value: &BoundValue) -> Vec<&str> {
        value.ids.iter().map(String::as_str).collect()
    }

    mod bindings {
        use super::*;

        #[test]
        fn should_parse_named_bindings() {
            let vars = parse_bindings("self():node, prop(value):text").unwrap();
            assert_eq!(vars.len(), 2);
            assert_eq!(vars[0].name, "node");
            assert_eq!(vars[0].value.kind, BoundKind::SelfNode);
            assert!(vars[0].value.ids.is_empty());
            assert_eq!(vars[1].name, "text");
            assert_eq!(vars[1].value.kind, BoundKind::Property);
            assert_eq!(ids(&vars[1].value), vec!["value"]);
            assert_eq!(vars[1].ty, None);
        }

        #[test]
        fn should_parse_typed_bindings() {
            let vars = parse_bindings("class(a, b-c):(flags u32)").unwrap();
            assert_eq!(vars[0].name, "flags");
            assert_eq!(vars[0].ty, Some(ParamType::Int("u32".to_string())));
            assert_eq!(ids(&vars[0].value), vec!["a", "b-c"]);
        }

        #[test]
        fn should_accept_keywords_in_any_case() {
            let vars = parse_bindings("PROP(x):y; Dataset(user-id):uid").unwrap();
            assert_eq!(vars[0].value.kind, BoundKind::Property);
            assert_eq!(vars[1].value.kind, BoundKind::Dataset);
            assert_eq!(vars[1].value.id(), "user-id");
        }

        #[test]
        fn should_allow_empty_input_and_trailing_separators() {
            assert!(parse_bindings("  ").unwrap().is_empty());
            assert_eq!(parse_bindings("self():a;").unwrap().len(), 1);
        }

        #[test]
        fn should_parse_whole_event_values() {
            let vars = parse_bindings("event():e").unwrap();
            assert_eq!(vars[0].value.kind, BoundKind::EventValue);
            assert_eq!(ids(&vars[0].value), vec![""]);
        }

        #[test]
        fn should_reject_duplicate_class_names() {
            assert_eq!(
                semantic(parse_bindings("class(a, a):x")),
                SemanticError::DuplicateClass("a".to_string())
            );
        }

        #[test]
        fn should_report_the_missing_colon() {
            let error = parse_bindings("prop(x) y").unwrap_err();
            assert_eq!(error.kind, BindingErrorKind::Syntax("':'".to_string()));
            assert_eq!((error.start, error.end), (8, 9));
        }

        #[test]
        fn should_reject_unknown_bound_kinds() {
            assert_eq!(expected(parse_bindings("attr(x):y")), "bound value");
        }
    }

    mod assignments {
        use super::*;

        #[test]
        fn should_capture_expressions_verbatim() {
            let assignments = parse_assignments(
                "prop(textContent) = \"a, b\", style(color) = pick(x, y); dataset(id) = [1, 2].len()",
            )
            .unwrap();
            let exprs: Vec<&str> = assignments.iter().map(|a| a.expression.as_str()).collect();
            assert_eq!(exprs, vec!["\"a, b\"", "pick(x, y)", "[1, 2].len()"]);
            assert_eq!(assignments[1].target.kind, BoundKind::Style);
        }

        #[test]
        fn should_keep_closures_and_blocks_whole() {
            let assignments =
                parse_assignments("prop(hidden) = { let n = xs.len(); n == 0 }").unwrap();
            assert_eq!(assignments.len(), 1);
            assert_eq!(assignments[0].expression.as_str(), "{ let n = xs.len(); n == 0 }");
        }

        #[test]
        fn should_reject_unbalanced_expressions() {
            assert_eq!(expected(parse_assignments("prop(x) = f(a")), "')'");
        }

        #[test]
        fn should_require_an_expression() {
            assert_eq!(expected(parse_assignments("prop(x) = ,")), "expression");
        }
    }

    mod captures {
        use super::*;

        #[test]
        fn should_default_to_automatic_handling() {
            let captures = parse_captures("click: on_click").unwrap();
            assert_eq!(captures[0].event, "click");
            assert_eq!(captures[0].handler, "on_click");
            assert!(captures[0].param_mappings.is_empty());
            assert_eq!(captures[0].handling, EventHandling::AutoPreventDefault);
        }

        #[test]
        fn should_parse_mappings_and_tags() {
            let captures = parse_captures(
                "submit: save(name = form(name), key = event(key)) {preventDefault(false)}",
            )
            .unwrap();
            let mapping = &captures[0];
            let names: Vec<&String> = mapping.param_mappings.keys().collect();
            assert_eq!(names, vec!["name", "key"]);
            assert_eq!(mapping.param_mappings["name"].kind, BoundKind::FormValue);
            assert_eq!(mapping.param_mappings["key"].kind, BoundKind::EventValue);
            assert_eq!(mapping.handling, EventHandling::DontPreventDefault);
        }

        #[test]
        fn should_map_tag_arguments_to_handling() {
            let handling = |src: &str| parse_captures(src).unwrap()[0].handling;
            assert_eq!(handling("click: h {preventDefault}"), EventHandling::PreventDefault);
            assert_eq!(handling("click: h {preventDefault(true)}"), EventHandling::PreventDefault);
            assert_eq!(handling("click: h {preventDefault(ask)}"), EventHandling::AskPreventDefault);
        }

        #[test]
        fn should_parse_several_mappings() {
            let captures = parse_captures("click: a, input: b()").unwrap();
            assert_eq!(captures.len(), 2);
            assert_eq!(captures[1].handler, "b");
        }

        #[test]
        fn should_reject_bad_tags() {
            assert_eq!(
                semantic(parse_captures("click: h {preventDefault, preventDefault}")),
                SemanticError::DuplicateTag("preventDefault".to_string())
            );
            assert_eq!(
                semantic(parse_captures("click: h {stopPropagation}")),
                SemanticError::UnknownTag("stopPropagation".to_string())
            );
            assert_eq!(
                semantic(parse_captures("click: h {preventDefault(maybe)}")),
                SemanticError::InvalidTagArgument {
                    tag: "preventDefault".to_string(),
                    argument: "maybe".to_string(),
                }
            );
            assert_eq!(
                semantic(parse_captures("click: h {preventDefault(true, false)}")),
                SemanticError::TooManyTagArguments("preventDefault".to_string())
            );
        }

        #[test]
        fn should_limit_event_names_to_lowercase_letters() {
            assert_eq!(parse_captures("dblclick: h").unwrap()[0].event, "dblclick");
            assert_eq!(expected(parse_captures("Click: h")), "event name");
            assert_eq!(expected(parse_captures("key-up: h")), "':'");
            assert_eq!(expected(parse_captures("2click: h")), "event name");
        }

        #[test]
        fn should_reject_duplicate_mappings() {
            assert_eq!(
                semantic(parse_captures("click: h(a = prop(x), a = prop(y))")),
                SemanticError::DuplicateParam("a".to_string())
            );
        }
    }

    mod fields {
        use super::*;

        #[test]
        fn should_share_type_and_default_across_names() {
            let fields = parse_fields("count, total i32 = 0\nname String").unwrap();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[0].name, "count");
            assert_eq!(fields[1].name, "total");
            assert_eq!(fields[1].ty, ParamType::Int("i32".to_string()));
            assert_eq!(fields[1].default_value.as_ref().unwrap().as_str(), "0");
            assert_eq!(fields[2].ty, ParamType::String);
            assert!(fields[2].default_value.is_none());
        }

        #[test]
        fn should_parse_generic_types() {
            let fields = parse_fields("items Vec<String> = Vec::new(); done bool").unwrap();
            assert_eq!(
                fields[0].ty,
                ParamType::Generic {
                    base: "Vec".to_string(),
                    args: vec![ParamType::String],
                }
            );
            assert_eq!(fields[0].default_value.as_ref().unwrap().as_str(), "Vec::new()");
            assert_eq!(fields[1].ty, ParamType::Bool);
        }

        #[test]
        fn should_reject_duplicate_fields() {
            assert_eq!(
                semantic(parse_fields("a i32\na i32")),
                SemanticError::DuplicateMember("a".to_string())
            );
        }
    }

    mod handlers {
        use super::*;

        #[test]
        fn should_parse_params_and_return_types() {
            let handlers = parse_handlers("on_click()\nselect(index usize, label String) bool").unwrap();
            assert!(handlers["on_click"].params.is_empty());
            assert_eq!(handlers["on_click"].returns, None);
            let select = &handlers["select"];
            assert_eq!(select.params[0].name, "index");
            assert_eq!(select.params[0].ty, ParamType::Int("usize".to_string()));
            assert_eq!(select.params[1].ty, ParamType::String);
            assert!(select.returns_bool());
        }

        #[test]
        fn should_keep_declaration_order() {
            let handlers = parse_handlers("b(); a(); c()").unwrap();
            let names: Vec<&String> = handlers.keys().collect();
            assert_eq!(names, vec!["b", "a", "c"]);
        }

        #[test]
        fn should_reject_duplicates() {
            assert_eq!(
                semantic(parse_handlers("a()\na()")),
                SemanticError::DuplicateHandler("a".to_string())
            );
            assert_eq!(
                semantic(parse_handlers("a(x i32, x i32)")),
                SemanticError::DuplicateParam("x".to_string())
            );
        }
    }

    mod component_params {
        use super::*;

        #[test]
        fn should_parse_variadic_last_parameter() {
            let params = parse_cparams("title String, var rows i64").unwrap();
            assert_eq!(params.len(), 2);
            assert!(!params[0].is_variadic);
            assert!(params[1].is_variadic);
            assert_eq!(params[1].ty, ParamType::Int("i64".to_string()));
        }

        #[test]
        fn should_reject_duplicate_parameters() {
            assert_eq!(
                semantic(parse_cparams("var a int, a string")),
                SemanticError::DuplicateParam("a".to_string())
            );
        }

        #[test]
        fn should_reject_variadic_before_the_last_parameter() {
            assert_eq!(
                semantic(parse_cparams("var a i32, b i32")),
                SemanticError::VariadicNotLast("a".to_string())
            );
        }
    }

    mod for_loops {
        use super::*;

        #[test]
        fn should_parse_index_and_item() {
            let for_loop = parse_for("i, item := range o.items.iter()").unwrap();
            assert_eq!(for_loop.index_var, "i");
            assert_eq!(for_loop.item_var.as_deref(), Some("item"));
            assert_eq!(for_loop.expression.as_str(), "o.items.iter()");
        }

        #[test]
        fn should_allow_index_only() {
            let for_loop = parse_for("i := range 0..3").unwrap();
            assert_eq!(for_loop.item_var, None);
            assert_eq!(for_loop.expression.as_str(), "0..3");
        }

        #[test]
        fn should_require_the_walrus() {
            assert_eq!(expected(parse_for("i = range x")), "':='");
            assert_eq!(expected(parse_for("i := x")), "'range'");
        }
    }

    mod imports {
        use super::*;

        #[test]
        fn should_default_the_alias_to_the_last_segment() {
            let imports = parse_imports("\"crate/widgets\"\nui \"crate::ui::forms\"\n\"crate/my-kit\"").unwrap();
            assert_eq!(imports["widgets"], "crate::widgets");
            assert_eq!(imports["ui"], "crate::ui::forms");
            assert_eq!(imports["my_kit"], "crate::my-kit");
        }

        #[test]
        fn should_reject_duplicate_aliases() {
            assert_eq!(
                semantic(parse_imports("x \"pkg1\"\nx \"pkg2\"")),
                SemanticError::DuplicateImport("x".to_string())
            );
        }

        #[test]
        fn should_reject_empty_paths() {
            assert_eq!(expected(parse_imports("x \"\"")), "import path");
        }
    }

    mod args_and_types {
        use super::*;

        #[test]
        fn should_split_args_at_top_level_commas() {
            let args = parse_args("1, \"x, y\", vec![a, b]").unwrap();
            let args: Vec<&str> = args.iter().map(Expression::as_str).collect();
            assert_eq!(args, vec!["1", "\"x, y\"", "vec![a, b]"]);
        }

        #[test]
        fn should_round_trip_nested_types() {
            let ty = parse_type("HashMap<String, Vec<(i32, bool)>>").unwrap();
            assert_eq!(ty.to_string(), "HashMap<String, Vec<(i32, bool)>>");
            let ty = parse_type("std::rc::Rc<Node>").unwrap();
            assert!(matches!(ty, ParamType::Generic { ref base, .. } if base == "std::rc::Rc"));
        }

        #[test]
        fn should_print_one_tuples_with_a_comma() {
            assert_eq!(parse_type("(u8)").unwrap().to_string(), "(u8,)");
        }

        #[test]
        fn should_reject_trailing_input() {
            assert_eq!(expected(parse_type("i32 x")), "end of type");
        }
    }

    mod error_placement {
        use super::*;

        #[test]
        fn should_place_errors_inside_the_attribute_value() {
            let file = ParseSourceFile::new("<p a:bindings=\"prop(x) y\">", "t.html");
            let value_span = ParseSourceSpan::from_offsets(&file, 15, 24);
            let error = parse_bindings("prop(x) y")
                .unwrap_err()
                .locate(Production::Bindings, &value_span);
            assert_eq!(error.span().start.col, 23);
            assert_eq!(error.span().snippet(), "y");
            assert_eq!(
                error.to_string(),
                "t.html:1:24 (\"y\"): syntax error in bindings: expected ':'"
            );
        }
    }
}
