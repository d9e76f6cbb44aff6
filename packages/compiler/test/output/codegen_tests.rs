/**
 * Component Code Generation Tests
 *
 * Checks the Rust emitted for each component feature, line by line.
 */

#[path = "../util/mod.rs"]
mod utils;

#[cfg(test)]
mod codegen_tests {
    use super::utils::*;

    /// Whether `source` has a line equal to `line` once trimmed.
    fn has_line(source: &str, line: &str) -> bool {
        source.lines().any(|l| l.trim() == line)
    }

    fn assert_lines(source: &str, lines: &[&str]) {
        for line in lines {
            assert!(has_line(source, line), "missing line `{}` in:\n{}", line, source);
        }
    }

    /// Index of the first line equal to `line`, for ordering checks.
    fn line_index(source: &str, line: &str) -> usize {
        source
            .lines()
            .position(|l| l.trim() == line)
            .unwrap_or_else(|| panic!("missing line `{}` in:\n{}", line, source))
    }

    const HELLO: &str = "<a:component name=\"Hello\">\
        <a:handlers>on_click()</a:handlers>\
        <button a:assign='prop(textContent) = \"hello\"' a:capture=\"click: on_click\">x</button>\
        </a:component>";

    mod hello {
        use super::*;

        #[test]
        fn should_emit_uses_and_template() {
            let source = generated(HELLO, "hello");
            assert!(source.starts_with("#[allow(unused_imports)]\nuse super::*;\nuse skein_runtime as rt;\nuse std::rc::Rc;\n"));
            assert_lines(
                &source,
                &[
                    "static TEMPLATE: rt::Node = template();",
                    "fn template() -> rt::Node {",
                    "rt::Node::element(\"button\").with_children(vec![",
                    "rt::Node::text(\"x\"),",
                ],
            );
            assert!(!source.contains("a:assign"));
            assert!(!source.contains("RefCell"));
        }

        #[test]
        fn should_emit_struct_and_constructors() {
            let source = generated(HELLO, "hello");
            assert_lines(
                &source,
                &[
                    "#[derive(Default)]",
                    "pub struct Hello {",
                    "cd: rt::ComponentData,",
                    "pub fn new() -> rt::Result<rt::Handle<Self>> {",
                    "Self::init(&this)?;",
                    "pub fn alloc() -> rt::Handle<Self> {",
                    "pub fn init(this: &rt::Handle<Self>) -> rt::Result<()> {",
                    "let mut guard = this.try_borrow_mut().map_err(|_| rt::Error::Busy)?;",
                    "TEMPLATE.with(|t| o.cd.init(t))?;",
                    "let n0 = o.cd.walk(&[0])?;",
                    "rt::assign(&mut rt::BoundProperty::new(&n0, \"textContent\"), \"hello\")?;",
                ],
            );
        }

        #[test]
        fn should_call_the_handler_and_prevent_default() {
            let source = generated(HELLO, "hello");
            assert_lines(
                &source,
                &[
                    "let weak = Rc::downgrade(this);",
                    "n0.add_event_listener(\"click\", move |ev: &rt::Event| -> rt::Result<()> {",
                    "let Some(this) = weak.upgrade() else {",
                    "Self::call_on_click(&this)?;",
                    "ev.prevent_default();",
                    "fn call_on_click(this: &rt::Handle<Self>) -> rt::Result<()> {",
                    "Ok(o.on_click())",
                ],
            );
            // no mapping reads the target node
            assert!(!source.contains("current_target"));
            assert!(
                line_index(&source, "Self::call_on_click(&this)?;")
                    < line_index(&source, "ev.prevent_default();")
            );
        }

        #[test]
        fn should_implement_component_without_controller() {
            let source = generated(HELLO, "hello");
            assert_lines(
                &source,
                &[
                    "impl rt::Component for Hello {",
                    "type Controller = dyn rt::NoController;",
                    "self.cd.insert_into(parent, before).map(|_| ())",
                    "self.cd.extract().map(|_| ())",
                    "self.cd.destroy()",
                ],
            );
            assert!(!source.contains("fn set_controller"));
            assert!(!source.contains("fn reparented"));
        }

        #[test]
        fn should_emit_the_header_by_default() {
            use skein_compiler::{Compiler, CompilerConfig};

            let result = Compiler::new(CompilerConfig::default())
                .compile_sources(&[(URL.to_string(), HELLO.to_string())]);
            let file = result.file("hello.rs").unwrap();
            assert!(file
                .contents
                .starts_with("// Code generated by skein. DO NOT EDIT.\n\n"));
        }
    }

    mod members {
        use super::*;

        #[test]
        fn should_declare_parameters_and_fields() {
            let source = generated(
                &component(
                    "<a:data>count i64 = start\nlabel String</a:data><p></p>"
                )
                .replace("name=\"Test\"", "name=\"Test\" params=\"start i64, var rest String\""),
                "test",
            );
            assert_lines(
                &source,
                &[
                    "pub count: i64,",
                    "pub label: String,",
                    "pub fn new(start: i64, rest: Vec<String>) -> rt::Result<rt::Handle<Self>> {",
                    "Self::init(&this, start, rest)?;",
                    "pub fn init(this: &rt::Handle<Self>, start: i64, rest: Vec<String>) -> rt::Result<()> {",
                    "o.count = start;",
                ],
            );
            assert!(!source.contains("o.label ="));
        }

        #[test]
        fn should_bind_variables_with_natural_types() {
            let source = generated(
                &component(
                    "<p a:bindings=\"self():node, prop(value):text, class(on, off):state, dataset(n):(n usize)\"></p>",
                ),
                "test",
            );
            assert_lines(
                &source,
                &[
                    "pub node: rt::Variable<rt::Node>,",
                    "pub text: rt::Variable<String>,",
                    "pub state: rt::Variable<i64>,",
                    "pub n: rt::Variable<usize>,",
                    "o.node.bind(rt::BoundSelf::new(&n0));",
                    "o.text.bind(rt::BoundProperty::new(&n0, \"value\"));",
                    "o.state.bind(rt::BoundClass::new(&n0, &[\"on\", \"off\"]));",
                    "o.n.bind(rt::BoundDataset::new(&n0, \"n\"));",
                ],
            );
        }

        #[test]
        fn should_bind_form_values_by_depth() {
            let source = generated(
                &component(
                    "<form><input name=\"q\" a:bindings=\"form(q):query\">\
                     <input type=\"radio\" name=\"size\" value=\"s\" a:bindings=\"form(size):size\"></form>",
                ),
                "test",
            );
            assert_lines(
                &source,
                &[
                    "let n0 = o.cd.walk(&[0, 0])?;",
                    "let n1 = o.cd.walk(&[0, 1])?;",
                    "o.query.bind(rt::BoundFormValue::new(&n0, 1, \"q\", false)?);",
                    "o.size.bind(rt::BoundFormValue::new(&n1, 1, \"size\", true)?);",
                ],
            );
        }
    }

    mod controlled_blocks {
        use super::*;

        #[test]
        fn should_emit_conditionals() {
            let source = generated(
                &component(
                    "<a:data>visible bool\nlabel String</a:data>\
                     <p a:if=\"o.visible\" a:assign=\"prop(textContent) = o.label.clone()\"></p>",
                ),
                "test",
            );
            assert_lines(
                &source,
                &[
                    "let n0 = o.cd.walk(&[0])?;",
                    "let mut slot1 = rt::ConditionalSlot::new(&n0);",
                    "if o.visible {",
                    "rt::assign(&mut rt::BoundProperty::new(&n0, \"textContent\"), o.label.clone())?;",
                    "} else {",
                    "slot1.update(false)?;",
                    "}",
                    "o.cd.keep_conditional(slot1);",
                ],
            );
        }

        #[test]
        fn should_emit_repetitions_relative_to_each_clone() {
            let source = generated(
                &component(
                    "<a:data>names Vec&lt;String></a:data>\
                     <ul><li a:for=\"i, name := range o.names.clone()\">\
                     <b a:assign=\"prop(textContent) = name.clone(), dataset(index) = i\"></b></li></ul>",
                ),
                "test",
            );
            assert_lines(
                &source,
                &[
                    "pub names: Vec<String>,",
                    "let n0 = o.cd.walk(&[0, 0])?;",
                    "let repeat1 = rt::Repeat::detach(&n0)?;",
                    "for (i, name) in (o.names.clone()).into_iter().enumerate() {",
                    "let n2 = repeat1.instantiate()?;",
                    "let n3 = n2.walk(&[0])?;",
                    "rt::assign(&mut rt::BoundProperty::new(&n3, \"textContent\"), name.clone())?;",
                    "rt::assign(&mut rt::BoundDataset::new(&n3, \"index\"), i)?;",
                ],
            );
        }
    }

    mod handlers {
        use super::*;

        const PICKER: &str = "<a:component name=\"Picker\">\
            <a:handlers>typed(text String)</a:handlers>\
            <a:controller>picked(index usize) bool</a:controller>\
            <li a:capture=\"click: picked(index = dataset(index))\"></li>\
            <input a:capture=\"input: typed(text = event(type)) {preventDefault(false)}\">\
            </a:component>";

        #[test]
        fn should_emit_the_controller_trait_and_field() {
            let source = generated(PICKER, "picker");
            assert_lines(
                &source,
                &[
                    "use std::cell::RefCell;",
                    "use std::rc::{Rc, Weak};",
                    "pub trait PickerController {",
                    "fn picked(&mut self, index: usize) -> bool;",
                    "controller: Option<Weak<RefCell<dyn PickerController>>>,",
                    "type Controller = dyn PickerController;",
                    "fn set_controller(&mut self, controller: Weak<RefCell<dyn PickerController>>) {",
                    "self.controller = Some(controller);",
                ],
            );
        }

        #[test]
        fn should_ask_bool_handlers_about_the_default() {
            let source = generated(PICKER, "picker");
            assert_lines(
                &source,
                &[
                    "let target = ev.current_target().ok_or(rt::Error::NoCurrentTarget)?;",
                    "let p_index = rt::BoundDataset::new(&target, \"index\");",
                    "if Self::call_picked(&this, &p_index)? {",
                ],
            );
        }

        #[test]
        fn should_read_event_values_without_a_target() {
            let source = generated(PICKER, "picker");
            assert_lines(
                &source,
                &[
                    "let p_text = rt::BoundEventValue::new(ev, \"type\");",
                    "Self::call_typed(&this, &p_text)?;",
                ],
            );
            assert_eq!(source.matches("ev.prevent_default();").count(), 1);
            assert_eq!(source.matches("current_target()").count(), 1);
        }

        #[test]
        fn should_emit_trampolines() {
            let source = generated(PICKER, "picker");
            assert_lines(
                &source,
                &[
                    "#[allow(dead_code)]",
                    "fn call_typed(this: &rt::Handle<Self>, p_text: &dyn rt::BoundValue) -> rt::Result<()> {",
                    "let v_text = rt::Typed::<String>::new(p_text).get()?;",
                    "Ok(o.typed(v_text))",
                    "fn call_picked(this: &rt::Handle<Self>, p_index: &dyn rt::BoundValue) -> rt::Result<bool> {",
                    "let v_index = rt::Typed::<usize>::new(p_index).get()?;",
                    "return Ok(Default::default());",
                    "Ok(c.picked(v_index))",
                ],
            );
        }
    }

    mod embeds {
        use super::*;

        const ROWS: &str = "<a:component name=\"Row\" params=\"n usize\">\
            <a:controller>removed()</a:controller><li></li></a:component>\
            <a:component name=\"Table\"><a:handlers>removed()</a:handlers>\
            <ul><a:embed name=\"rows\" type=\"Row\" list control>\
            <a:construct a:for=\"i := range 0..3\" args=\"i\"/></a:embed></ul>\
            <div><a:embed name=\"extra\" type=\"Row\" optional><a:construct a:if=\"true\" args=\"9\"/></a:embed></div>\
            </a:component>";

        #[test]
        fn should_declare_container_fields_and_aliases() {
            let table = generated(ROWS, "table");
            assert_lines(
                &table,
                &[
                    "pub rows: rt::List<Row>,",
                    "pub extra: rt::Optional<Row>,",
                    "o.rows = Default::default();",
                    "o.extra = Default::default();",
                    "rt::Node::comment(\"rows\"),",
                ],
            );
            let row = generated(ROWS, "row");
            assert_lines(
                &row,
                &["pub type RowList = rt::List<Row>;", "pub type OptionalRow = rt::Optional<Row>;"],
            );
            assert!(!table.contains("pub type TableList"));
        }

        #[test]
        fn should_construct_into_containers() {
            let table = generated(ROWS, "table");
            assert_lines(
                &table,
                &[
                    "let n0 = o.cd.walk(&[0, 0])?;",
                    "let n1 = o.cd.walk(&[1, 0])?;",
                    "let container = n0.parent().ok_or(rt::Error::NoParent)?;",
                    "o.rows.init(&container, &n0);",
                    "let controller: rt::Handle<dyn RowController> = this.clone();",
                    "o.rows.set_default_controller(Rc::downgrade(&controller));",
                    "for (i, _) in (0..3).into_iter().enumerate() {",
                    "o.rows.append(Row::new(i)?)?;",
                    "o.extra.init(&container, &n1);",
                    "if true {",
                    "o.extra.set(Some(Row::new(9)?))?;",
                ],
            );
        }

        #[test]
        fn should_forward_lifecycle_to_embeds() {
            let table = generated(ROWS, "table");
            assert_lines(
                &table,
                &[
                    "fn component_data_mut(&mut self) -> &mut rt::ComponentData {",
                    "let moved = self.cd.insert_into(parent, before)?;",
                    "rt::Component::reparented(self, &moved);",
                    "self.cd.ensure_live()?;",
                    "let mut result = Ok(());",
                    "result = result.and(self.rows.destroy_all());",
                    "result = result.and(self.extra.set(None));",
                    "result.and(self.cd.destroy())",
                    "fn reparented(&mut self, moved: &rt::Reparent) {",
                    "self.rows.update_parent(moved);",
                    "self.extra.update_parent(moved);",
                ],
            );
        }

        #[test]
        fn should_embed_imported_components_directly() {
            let source = generated(
                "<a:import>w \"crate::widgets\"</a:import>\
                 <a:import>unused \"crate::other\"</a:import>\
                 <a:component name=\"Test\"><div><a:embed name=\"ok\" type=\"w.Button\" args=\"1, 2\" control/></div></a:component>",
                "test",
            );
            assert_lines(
                &source,
                &[
                    "use crate::widgets as w;",
                    "pub ok: Option<rt::Handle<w::Button>>,",
                    "let child = w::Button::new(1, 2)?;",
                    "let controller: rt::Handle<dyn w::ButtonController> = this.clone();",
                    "rt::Component::set_controller(&mut *child.borrow_mut(), Rc::downgrade(&controller));",
                    "rt::Component::insert_into(&mut *child.borrow_mut(), &container, Some(&n0))?;",
                    "o.ok = Some(child);",
                    "if let Some(child) = self.ok.take() {",
                    "result = result.and(rt::Component::destroy(&mut *child.borrow_mut()));",
                    "if let Ok(mut child) = child.try_borrow_mut() {",
                ],
            );
            assert!(!source.contains("crate::other"));
        }
    }
}
