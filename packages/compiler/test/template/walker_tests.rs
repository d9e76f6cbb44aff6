/**
 * Template Walker Tests
 *
 * Path recording, template normalization, controlled blocks, embeds and
 * the structural rules of the vocabulary.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod template_walker_tests {
    use super::utils::*;
    use skein_compiler::binding::*;
    use skein_compiler::error::{CompileError, Production, SemanticError};
    use skein_compiler::ml_parser::Node;
    use skein_compiler::template::path;

    fn path(indices: &[usize]) -> Path {
        indices.iter().copied().collect()
    }

    fn element_at<'a>(walked: &'a WalkedComponent, p: &[usize]) -> &'a skein_compiler::ml_parser::Element {
        path::resolve(&walked.template, p)
            .and_then(Node::as_element)
            .unwrap_or_else(|| panic!("no element at {:?}", p))
    }

    use skein_compiler::template::WalkedComponent;

    mod paths {
        use super::*;

        #[test]
        fn should_record_child_index_paths() {
            let walked = walk(&component(
                "<div><span a:assign=\"prop(textContent) = o.title\"></span>text<b a:bindings=\"self():bold\"></b></div>",
            ));
            let c = &walked.component;
            assert_eq!(c.block.assignments[0].path, path(&[0, 0]));
            assert_eq!(c.variables[0].path, path(&[0, 2]));
        }

        #[test]
        fn should_resolve_every_recorded_path_to_the_visited_node() {
            let walked = walk(&component(concat!(
                "\n  <section id=\"s\">\n",
                "    <h1 id=\"h\" a:assign=\"prop(textContent) = o.title\">x</h1>\n",
                "    <!-- dropped -->\n",
                "    <p id=\"p\" a:bindings=\"prop(value):value\">a</p>\n",
                "    <button id=\"b\" a:capture=\"click: go\">go</button>\n",
                "  </section>\n",
            )));
            let c = &walked.component;
            let recorded = [
                (&c.block.assignments[0].path, "h"),
                (&c.variables[0].path, "p"),
                (&c.captures[0].path, "b"),
            ];
            let all = path::element_paths(&walked.template);
            for (p, id) in recorded {
                assert!(all.contains(p));
                assert_eq!(element_at(&walked, p).attr_value("id"), Some(id));
            }
        }

        #[test]
        fn should_merge_text_around_dropped_comments() {
            let walked = walk(&component(
                "<div>a<!-- c -->b<i a:bindings=\"self():x\"></i></div>",
            ));
            let Node::Element(div) = &walked.template[0] else {
                panic!("expected an element");
            };
            assert!(matches!(&div.children[0], Node::Text(t) if t.value == "ab"));
            assert_eq!(walked.component.variables[0].path, path(&[0, 1]));
        }

        #[test]
        fn should_trim_whitespace_between_root_nodes_only() {
            let walked = walk(&component("\n  <div> <b></b> </div>\n  <span></span>\n"));
            assert_eq!(walked.template.len(), 2);
            let Node::Element(div) = &walked.template[0] else {
                panic!("expected an element");
            };
            assert_eq!(div.children.len(), 3);
        }

        #[test]
        fn should_strip_binding_attributes_only() {
            let walked = walk(&component(
                "<span class=\"x\" a:bindings=\"self():s\" a:assign=\"style(color) = c\"></span>",
            ));
            let span = element_at(&walked, &[0]);
            let names: Vec<&str> = span.attrs.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, vec!["class"]);
        }
    }

    mod special_elements {
        use super::*;

        #[test]
        fn should_read_fields_handlers_and_controller() {
            let walked = walk(
                "<a:component name=\"Counter\" params=\"start i64\">\
                 <a:data>count i64 = start</a:data>\
                 <a:handlers>inc()</a:handlers>\
                 <a:controller>changed(value i64)</a:controller>\
                 <p></p></a:component>",
            );
            let c = &walked.component;
            assert_eq!(c.name, "Counter");
            assert_eq!(c.parameters[0].name, "start");
            assert_eq!(c.fields[0].default_value.as_ref().unwrap().as_str(), "start");
            assert!(c.handlers.contains_key("inc"));
            assert!(c.has_controller());
            assert_eq!(walked.template.len(), 1);
        }

        #[test]
        fn should_reject_duplicate_special_elements() {
            let error = walk_err(&component("<a:data>a i32</a:data><a:data>b i32</a:data>"));
            assert_eq!(message(&error), "duplicate <a:data>");
        }

        #[test]
        fn should_reject_special_elements_below_the_root() {
            let error = walk_err(&component("<div><a:data>a i32</a:data></div>"));
            assert_eq!(message(&error), "<a:data> is not allowed here");
        }

        #[test]
        fn should_report_grammar_errors_with_their_production() {
            let error = walk_err(&component("<a:handlers>go(</a:handlers>"));
            assert!(matches!(
                error,
                CompileError::Syntax {
                    production: Production::Handlers,
                    ..
                }
            ));
        }

        #[test]
        fn should_collect_declarations_without_walking() {
            let vocab = skein_compiler::config::Vocabulary::new("a");
            let walker = skein_compiler::template::TemplateWalker::new(&vocab);
            let roots = parse_markup(
                "<a:component name=\"A\"><a:controller>picked()</a:controller></a:component>\
                 <a:component name=\"B\"><a:controller> </a:controller></a:component>",
            );
            let decls = walker.declarations(&roots);
            assert_eq!(decls.len(), 2);
            assert!(decls[0].has_controller);
            assert!(!decls[1].has_controller);
        }
    }

    mod file_structure {
        use super::*;

        #[test]
        fn should_merge_imports_across_elements() {
            let file = walk_file(
                "<a:import>w \"crate::widgets\"</a:import>\n<a:import>\"crate/forms\"</a:import>",
            )
            .unwrap();
            assert_eq!(file.imports["w"], "crate::widgets");
            assert_eq!(file.imports["forms"], "crate::forms");
            assert!(file.components.is_empty());
        }

        #[test]
        fn should_reject_duplicate_imports_across_elements() {
            let error = walk_file("<a:import>x \"a\"</a:import><a:import>x \"b\"</a:import>").unwrap_err();
            assert_eq!(
                error.semantic_error(),
                Some(&SemanticError::DuplicateImport("x".to_string()))
            );
        }

        #[test]
        fn should_reject_top_level_markup() {
            let error = walk_file("hello").unwrap_err();
            assert_eq!(
                message(&error),
                "only <a:import>, <a:macro> and <a:component> may appear at the top level"
            );
        }

        #[test]
        fn should_require_a_valid_component_name() {
            assert_eq!(
                message(&walk_err("<a:component></a:component>")),
                "<a:component> requires a name"
            );
            assert_eq!(
                message(&walk_err("<a:component name=\"match\"></a:component>")),
                "component name `match` is a reserved word"
            );
            assert_eq!(
                message(&walk_err("<a:component name=\"my-view\"></a:component>")),
                "`my-view` is not a valid component name"
            );
        }

        #[test]
        fn should_fail_components_independently() {
            let file = walk_file(
                "<a:component name=\"Good\"><p></p></a:component>\
                 <a:component name=\"Bad\"><div a:foo=\"x\"></div></a:component>",
            )
            .unwrap();
            assert!(file.components[0].is_ok());
            let error = file.components[1].as_ref().unwrap_err();
            assert_eq!(message(error), "unknown attribute `a:foo`");
        }
    }

    mod controlled_blocks {
        use super::*;

        #[test]
        fn should_root_repeated_blocks_at_their_element() {
            let walked = walk(&component(
                "<ul><li a:for=\"i, item := range o.items.iter()\" a:assign=\"prop(textContent) = item\">\
                 <b a:assign=\"dataset(index) = i\"></b></li></ul>",
            ));
            let ControlledBlock::Repeated {
                index_var,
                item_var,
                expression,
                path: block_path,
                block,
            } = &walked.component.block.controlled[0]
            else {
                panic!("expected a repeated block");
            };
            assert_eq!(index_var, "i");
            assert_eq!(item_var.as_deref(), Some("item"));
            assert_eq!(expression.as_str(), "o.items.iter()");
            assert_eq!(*block_path, path(&[0, 0]));
            assert_eq!(block.assignments[0].path, path(&[]));
            assert_eq!(block.assignments[1].path, path(&[0]));
        }

        #[test]
        fn should_nest_conditionals_in_repeated_blocks() {
            let walked = walk(&component(
                "<div a:for=\"i := range 0..3\"><span a:if=\"i % 2 == 0\">even</span></div>",
            ));
            let outer = &walked.component.block.controlled[0];
            let ControlledBlock::Conditional { expression, path: p, .. } =
                &outer.block().controlled[0]
            else {
                panic!("expected a conditional block");
            };
            assert_eq!(expression.as_str(), "i % 2 == 0");
            assert_eq!(*p, path(&[0]));
        }

        #[test]
        fn should_reject_if_and_for_on_one_element() {
            let error = walk_err(&component("<div a:if=\"x\" a:for=\"i := range y\"></div>"));
            assert_eq!(message(&error), "<div> cannot carry both a:if and a:for");
        }

        #[test]
        fn should_reject_variables_captures_and_embeds_inside_blocks() {
            assert_eq!(
                message(&walk_err(&component(
                    "<ul><li a:for=\"i := range 0..3\" a:bindings=\"self():li\"></li></ul>"
                ))),
                "variables cannot be declared inside a:if or a:for blocks"
            );
            assert_eq!(
                message(&walk_err(&component(
                    "<div a:if=\"o.x\"><button a:capture=\"click: go\"></button></div>"
                ))),
                "captures cannot be declared inside a:if or a:for blocks"
            );
            assert_eq!(
                message(&walk_err(&component(
                    "<div a:if=\"o.x\"><a:embed name=\"r\" type=\"Row\"/></div>"
                ))),
                "<a:embed> cannot appear inside a:if or a:for blocks"
            );
        }

        #[test]
        fn should_reject_duplicate_binding_attributes() {
            let error = walk_err(&component("<div a:if=\"x\" A:IF=\"y\"></div>"));
            assert_eq!(message(&error), "duplicate attribute `A:IF`");
        }
    }

    mod content_writes {
        use super::*;

        #[test]
        fn should_reject_text_writes_over_bound_descendants() {
            let error = walk_err(&component(
                "<div a:assign=\"prop(textContent) = x\"><span a:bindings=\"prop(title):t\"></span></div>",
            ));
            assert!(matches!(error, CompileError::Structural { .. }));
            assert_eq!(
                message(&error),
                "prop(textContent) replaces the content of <div>, whose descendants carry bindings"
            );
        }

        #[test]
        fn should_reject_self_assignments_and_html_variables_over_embeds() {
            assert_eq!(
                message(&walk_err(&component(
                    "<div a:assign=\"self() = n\"><p><b a:capture=\"click: go\"></b></p></div>"
                ))),
                "self() replaces the content of <div>, whose descendants carry bindings"
            );
            assert_eq!(
                message(&walk_err(&component(
                    "<div a:bindings=\"prop(innerHTML):html\"><a:embed name=\"r\" type=\"Row\"/></div>"
                ))),
                "prop(innerHTML) replaces the content of <div>, whose descendants carry bindings"
            );
        }

        #[test]
        fn should_allow_text_writes_over_plain_markup() {
            let walked = walk(&component(
                "<button a:assign='prop(textContent) = \"hi\"' a:capture=\"click: go\">press <b>now</b></button>",
            ));
            assert_eq!(walked.component.block.assignments.len(), 1);
        }

        #[test]
        fn should_allow_node_handles_over_bound_descendants() {
            let walked = walk(&component(
                "<div a:bindings=\"self():box\"><span a:bindings=\"prop(title):t\"></span></div>",
            ));
            assert_eq!(walked.component.variables.len(), 2);
        }
    }

    mod forms {
        use super::*;

        #[test]
        fn should_resolve_form_depth_and_radio_groups() {
            let walked = walk(&component(
                "<form><div><input name=\"q\" a:bindings=\"form(q):query\"></div>\
                 <input type=\"radio\" name=\"size\" value=\"s\">\
                 <input type=\"radio\" name=\"size\" value=\"l\" a:bindings=\"form(size):size\"></form>",
            ));
            let vars = &walked.component.variables;
            assert_eq!(vars[0].value.form_depth, 2);
            assert!(!vars[0].value.is_radio);
            assert_eq!(vars[1].value.form_depth, 1);
            assert!(vars[1].value.is_radio);
        }

        #[test]
        fn should_resolve_form_values_in_capture_mappings() {
            let walked = walk(&component(
                "<form a:capture=\"submit: save(name = form(name))\"><input name=\"name\"></form>",
            ));
            let value = &walked.component.captures[0].mappings[0].param_mappings["name"];
            assert_eq!(value.form_depth, 0);
        }

        #[test]
        fn should_require_an_enclosing_form() {
            let error = walk_err(&component("<input name=\"q\" a:bindings=\"form(q):q\">"));
            assert_eq!(message(&error), "form(q) is not inside a <form>");
        }

        #[test]
        fn should_require_a_matching_control() {
            let error = walk_err(&component(
                "<form><input name=\"q\"><span a:bindings=\"form(other):o\"></span></form>",
            ));
            assert_eq!(message(&error), "the enclosing <form> has no control named `other`");
        }

        #[test]
        fn should_keep_event_values_out_of_bindings() {
            let error = walk_err(&component("<div a:bindings=\"event(key):k\"></div>"));
            assert_eq!(
                message(&error),
                "event() is only available in capture parameter mappings"
            );
        }
    }

    mod embeds {
        use super::*;

        #[test]
        fn should_replace_embeds_with_anchor_comments() {
            let walked = walk(&component(
                "<div><a:embed name=\"row\" type=\"Row\" args=\"1, o.title.clone()\"/><i></i></div>",
            ));
            let embed = &walked.component.embeds[0];
            assert_eq!(embed.field, "row");
            assert_eq!(embed.component_type, "Row");
            assert_eq!(embed.kind, EmbedKind::Direct);
            assert_eq!(embed.path, path(&[0, 0]));
            assert_eq!(embed.constructor_args.len(), 2);
            assert!(matches!(
                path::resolve(&walked.template, &[0, 0]),
                Some(Node::Comment(c)) if c.value.as_deref() == Some("row")
            ));
            assert!(matches!(path::resolve(&walked.template, &[0, 1]), Some(Node::Element(_))));
        }

        #[test]
        fn should_collect_constructor_calls() {
            let walked = walk(&component(
                "<ul><a:embed name=\"rows\" type=\"Row\" list control>\
                 <a:construct a:for=\"i, r := range o.names.clone()\" args=\"r\"></a:construct>\
                 <a:construct a:if=\"o.extra\" args=\"String::new()\"></a:construct>\
                 <a:construct args=\"0\"/></a:embed></ul>",
            ));
            let embed = &walked.component.embeds[0];
            assert_eq!(embed.kind, EmbedKind::List);
            assert!(embed.control);
            let calls = &embed.constructor_calls;
            assert!(matches!(
                &calls[0].kind,
                ConstructorKind::Repeated { index_var, item_var: Some(item), .. }
                    if index_var == "i" && item == "r"
            ));
            assert!(matches!(&calls[1].kind, ConstructorKind::Conditional { .. }));
            assert_eq!(calls[2].kind, ConstructorKind::Unconditional);
            assert_eq!(calls[2].args[0].as_str(), "0");
        }

        #[test]
        fn should_resolve_imported_types() {
            let walked = walk(
                "<a:import>w \"crate::widgets\"</a:import>\
                 <a:component name=\"Test\"><div><a:embed name=\"b\" type=\"w.Button\" optional/></div></a:component>",
            );
            let embed = &walked.component.embeds[0];
            assert_eq!(embed.namespace.as_deref(), Some("w"));
            assert_eq!(embed.component_type, "Button");
            assert_eq!(embed.kind, EmbedKind::Optional);
        }

        #[test]
        fn should_reject_malformed_embeds() {
            let cases = [
                (
                    "<div><a:embed name=\"b\" type=\"x.Button\"/></div>",
                    "`x` is not an imported package",
                ),
                (
                    "<div><a:embed name=\"b\" type=\"Row\" list optional/></div>",
                    "an embed cannot be both list and optional",
                ),
                (
                    "<div><a:embed name=\"b\" type=\"Row\"><a:construct/></a:embed></div>",
                    "<a:construct> requires a list or optional embed",
                ),
                (
                    "<div><a:embed name=\"b\" type=\"Row\" list args=\"1\"/></div>",
                    "list and optional embeds take their arguments from <a:construct>",
                ),
                ("<div><a:embed type=\"Row\"/></div>", "<a:embed> requires a name"),
                ("<div><a:embed name=\"b\"/></div>", "<a:embed> requires a type"),
                (
                    "<div><a:embed name=\"b\" type=\"Row\" list><p></p></a:embed></div>",
                    "<a:embed> may only contain <a:construct>",
                ),
            ];
            for (body, expected) in cases {
                assert_eq!(message(&walk_err(&component(body))), expected, "{}", body);
            }
        }
    }
}
