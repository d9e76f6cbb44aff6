/**
 * Template Macro Tests
 *
 * Macro collection, include expansion, slot filling and how expanded
 * components flow through the package compiler.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod template_macro_tests {
    use super::utils::*;
    use skein_compiler::ml_parser::Node;
    use skein_compiler::output::render_html;
    use skein_compiler::Compiler;

    const BADGE: &str = "<a:macro name=\"Badge\"><span class=\"badge\">new</span></a:macro>";
    const CARD: &str = "<a:macro name=\"Card\">\
        <div><h2><a:slot name=\"title\">Untitled</a:slot></h2><a:slot></a:slot></div>\
        </a:macro>";

    /// Markup of the expanded body of component `name`.
    fn body(roots: &[Node], name: &str) -> String {
        let component = roots
            .iter()
            .filter_map(Node::as_element)
            .find(|e| e.attr_value("name") == Some(name))
            .unwrap_or_else(|| panic!("no component {}", name));
        render_html(&component.children)
            .trim_start_matches("<!DOCTYPE html>\n")
            .trim_end()
            .to_string()
    }

    fn expanded(source: &str) -> Vec<Node> {
        let (roots, errors) = expand(source);
        if let Some(e) = errors.first() {
            panic!("expansion failed: {}", e);
        }
        roots
    }

    fn expand_err(source: &str) -> String {
        let (_, errors) = expand(source);
        match errors.first() {
            Some(e) => message(e),
            None => panic!("expected the expansion to fail"),
        }
    }

    mod includes {
        use super::*;

        #[test]
        fn should_splice_macro_bodies_in_place() {
            let roots = expanded(&format!(
                "{}<a:component name=\"Test\"><p>a<a:include name=\"Badge\"/>b</p></a:component>",
                BADGE
            ));
            assert_eq!(roots.len(), 1);
            assert_eq!(body(&roots, "Test"), "<p>a<span class=\"badge\">new</span>b</p>");
        }

        #[test]
        fn should_fill_named_and_unnamed_slots() {
            let roots = expanded(&format!(
                "{}<a:component name=\"Test\">\
                 <a:include name=\"Card\"><a:slot name=\"title\">Hello</a:slot><p>body</p></a:include>\
                 <a:include name=\"Card\"></a:include>\
                 </a:component>",
                CARD
            ));
            assert_eq!(
                body(&roots, "Test"),
                "<div><h2>Hello</h2><p>body</p></div><div><h2>Untitled</h2></div>"
            );
        }

        #[test]
        fn should_forward_slots_into_nested_includes() {
            let roots = expanded(&format!(
                "<a:macro name=\"Page\"><section><a:include name=\"Card\">\
                 <a:slot name=\"title\"><a:slot name=\"heading\">Page</a:slot></a:slot>x\
                 </a:include></section></a:macro>{}\
                 <a:component name=\"Test\"><a:include name=\"Page\"><a:slot name=\"heading\">Home</a:slot></a:include></a:component>",
                CARD
            ));
            assert_eq!(
                body(&roots, "Test"),
                "<section><div><h2>Home</h2>x</div></section>"
            );
        }

        #[test]
        fn should_keep_macros_of_the_same_definition_once() {
            let vocab = skein_compiler::config::Vocabulary::new("a");
            let mut macros = skein_compiler::template::MacroSet::new();
            let mut first = parse_markup(BADGE);
            let mut again = parse_markup(BADGE);
            assert!(macros.collect(&vocab, &mut first).is_empty());
            assert!(macros.collect(&vocab, &mut again).is_empty());
            assert_eq!(macros.len(), 1);
            assert!(first.is_empty());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_drop_components_including_unknown_macros() {
            let (roots, errors) = expand(
                "<a:component name=\"Test\"><a:include name=\"Nope\"/></a:component>\
                 <a:component name=\"Other\"><p></p></a:component>",
            );
            assert_eq!(errors.iter().map(message).collect::<Vec<_>>(), vec!["unknown macro `Nope`"]);
            assert_eq!(roots.len(), 1);
            assert_eq!(body(&roots, "Other"), "<p></p>");
        }

        #[test]
        fn should_reject_fillers_without_a_slot() {
            assert_eq!(
                expand_err(&format!(
                    "{}<a:component name=\"Test\"><a:include name=\"Badge\"><a:slot name=\"x\">y</a:slot></a:include></a:component>",
                    BADGE
                )),
                "macro `Badge` has no slot `x`"
            );
            assert_eq!(
                expand_err(&format!(
                    "{}<a:component name=\"Test\"><a:include name=\"Badge\">text</a:include></a:component>",
                    BADGE
                )),
                "macro `Badge` has no unnamed slot"
            );
        }

        #[test]
        fn should_reject_recursive_includes() {
            assert_eq!(
                expand_err(
                    "<a:macro name=\"A\"><i><a:include name=\"B\"/></i></a:macro>\
                     <a:macro name=\"B\"><b><a:include name=\"A\"/></b></a:macro>\
                     <a:component name=\"Test\"><a:include name=\"A\"/></a:component>"
                ),
                "macro `A` includes itself"
            );
        }

        #[test]
        fn should_reject_malformed_definitions() {
            assert_eq!(
                expand_err(&format!("{}{}", BADGE, BADGE.replace("new", "old"))),
                "macro `Badge` is defined more than once"
            );
            assert_eq!(expand_err("<a:macro><p></p></a:macro>"), "<a:macro> requires a name");
            assert_eq!(
                expand_err(&format!(
                    "{}<a:component name=\"Test\"><a:include name=\"Badge\" x=\"1\"/></a:component>",
                    BADGE
                )),
                "unknown attribute `x` on <a:include>"
            );
        }
    }

    mod compilation {
        use super::*;

        #[test]
        fn should_record_paths_into_expanded_markup() {
            let source = generated(
                "<a:macro name=\"Label\"><b a:bindings=\"prop(textContent):label\"></b></a:macro>\
                 <a:component name=\"Test\"><p>x<a:include name=\"Label\"/></p></a:component>",
                "test",
            );
            assert!(source.contains("let n0 = o.cd.walk(&[0, 1])?;\n"));
            assert!(source.contains("rt::Node::element(\"b\")"));
        }

        #[test]
        fn should_not_resolve_embeds_to_components_that_failed_to_expand() {
            let result = compile(
                "<a:component name=\"Bad\"><a:include name=\"Nope\"/></a:component>\
                 <a:component name=\"Host\"><div><a:embed name=\"b\" type=\"Bad\"/></div></a:component>",
            );
            let messages: Vec<String> = result.errors.iter().map(message).collect();
            assert_eq!(messages, vec!["unknown macro `Nope`", "unknown component `Bad`"]);
        }

        #[test]
        fn should_include_macros_collected_from_other_packages() {
            let shared = vec![("shared.html".to_string(), BADGE.to_string())];
            let app = vec![(
                "app.html".to_string(),
                "<a:component name=\"App\"><p><a:include name=\"Badge\"/></p></a:component>".to_string(),
            )];
            let mut compiler = Compiler::new(test_config());
            assert!(compiler.collect_macros(&shared).is_empty());
            assert_eq!(compiler.macros().len(), 1);

            let shared_result = compiler.compile_sources(&shared);
            assert!(!shared_result.has_errors());
            let app_result = compiler.compile_sources(&app);
            assert!(!app_result.has_errors());
            assert!(app_result
                .file("app.rs")
                .unwrap()
                .contents
                .contains("rt::Node::element(\"span\").with_attr(\"class\", \"badge\")"));
        }
    }
}
