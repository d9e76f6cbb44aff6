/**
 * Markup Parser Tests
 *
 * Tree building, implicit end tags, spans and error recovery.
 */

#[path = "util/mod.rs"]
mod utils;

#[cfg(test)]
mod tests {
    use super::utils::*;
    use skein_compiler::ml_parser::Node;

    mod text_nodes {
        use super::*;

        #[test]
        fn should_parse_root_level_text_nodes() {
            assert_eq!(humanize_dom(&parse("a")), vec![row(&["Text", "a", "0"])]);
        }

        #[test]
        fn should_parse_text_nodes_inside_elements() {
            assert_eq!(
                humanize_dom(&parse("<div>a</div>")),
                vec![row(&["Element", "div", "0"]), row(&["Text", "a", "1"])]
            );
        }

        #[test]
        fn should_drop_the_first_lf_in_pre() {
            assert_eq!(
                humanize_dom(&parse("<pre>\nline</pre>")),
                vec![row(&["Element", "pre", "0"]), row(&["Text", "line", "1"])]
            );
        }
    }

    mod elements {
        use super::*;

        #[test]
        fn should_parse_nested_elements_with_attributes() {
            assert_eq!(
                humanize_dom(&parse("<div class=\"a\"><span a:bindings=\"self():x\">t</span></div>")),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Attribute", "class", "a"]),
                    row(&["Element", "span", "1"]),
                    row(&["Attribute", "a:bindings", "self():x"]),
                    row(&["Text", "t", "2"]),
                ]
            );
        }

        #[test]
        fn should_not_expect_children_of_void_elements() {
            assert_eq!(
                humanize_dom(&parse("<div><input name=\"q\">after</div>")),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "input", "1"]),
                    row(&["Attribute", "name", "q"]),
                    row(&["Text", "after", "1"]),
                ]
            );
        }

        #[test]
        fn should_allow_self_closing_namespaced_elements() {
            assert_eq!(
                humanize_dom(&parse("<div><a:embed name=\"x\" type=\"Row\"/>t</div>")),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Element", "a:embed", "1"]),
                    row(&["Attribute", "name", "x"]),
                    row(&["Attribute", "type", "Row"]),
                    row(&["Text", "t", "1"]),
                ]
            );
        }

        #[test]
        fn should_close_list_items_implicitly() {
            assert_eq!(
                humanize_dom(&parse("<ul><li>a<li>b</ul>")),
                vec![
                    row(&["Element", "ul", "0"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "a", "2"]),
                    row(&["Element", "li", "1"]),
                    row(&["Text", "b", "2"]),
                ]
            );
        }

        #[test]
        fn should_close_paragraphs_before_block_elements() {
            assert_eq!(
                humanize_dom(&parse("<p>a<div>b</div>")),
                vec![
                    row(&["Element", "p", "0"]),
                    row(&["Text", "a", "1"]),
                    row(&["Element", "div", "0"]),
                    row(&["Text", "b", "1"]),
                ]
            );
        }

        #[test]
        fn should_keep_comments() {
            assert_eq!(
                humanize_dom(&parse("<div><!-- note --></div>")),
                vec![
                    row(&["Element", "div", "0"]),
                    row(&["Comment", " note ", "1"]),
                ]
            );
        }
    }

    mod source_spans {
        use super::*;

        #[test]
        fn should_span_whole_elements() {
            let result = parse("<div><span>a</span>b</div>");
            let div = result.root_nodes[0].as_element().unwrap();
            assert_eq!(div.source_span.snippet(), "<div><span>a</span>b</div>");
            assert_eq!(div.start_source_span.snippet(), "<div>");
            assert_eq!(div.end_source_span.as_ref().unwrap().snippet(), "</div>");
        }

        #[test]
        fn should_span_attribute_keys_and_values() {
            let result = parse("<p a:assign=\"prop(hidden) = !shown\"></p>");
            let p = result.root_nodes[0].as_element().unwrap();
            let attr = p.attr("a:assign").unwrap();
            assert_eq!(attr.key_span.snippet(), "a:assign");
            assert_eq!(attr.value_span.as_ref().unwrap().snippet(), "prop(hidden) = !shown");
            assert_eq!(attr.source_span.snippet(), "a:assign=\"prop(hidden) = !shown\"");
        }

        #[test]
        fn should_report_line_and_column_of_nested_nodes() {
            let result = parse("<div>\n  <span>x</span>\n</div>");
            let div = result.root_nodes[0].as_element().unwrap();
            let span = div.child_elements().next().unwrap();
            assert_eq!(humanize_line_column(&span.source_span.start), "1:2");
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_report_unexpected_closing_tags() {
            let result = parse("<div></span></div>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![row(&[
                    "Unexpected closing tag \"span\". It may happen when the tag has already been closed by another tag.",
                    "0:5"
                ])]
            );
        }

        #[test]
        fn should_report_end_tags_of_void_elements() {
            let result = parse("<input></input>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![row(&["Void elements do not have end tags \"input\"", "0:7"])]
            );
        }

        #[test]
        fn should_report_unclosed_elements() {
            let result = parse("<div><span>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![
                    row(&["Unclosed element \"span\"", "0:5"]),
                    row(&["Unclosed element \"div\"", "0:0"]),
                ]
            );
            assert!(matches!(result.root_nodes[0], Node::Element(_)));
        }

        #[test]
        fn should_reject_self_closing_plain_elements() {
            let result = parse("<div/>");
            assert_eq!(
                humanize_errors(&result.errors),
                vec![row(&["Only void and custom elements can be self closed \"div\"", "0:0"])]
            );
        }
    }
}
