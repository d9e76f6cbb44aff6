//! Hand-written components shaped like generated ones.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Weak;

use skein_runtime::*;

pub trait ItemController {
    fn picked(&mut self, label: String);
}

/// `<li>{label}</li>`
pub struct Item {
    cd: ComponentData,
    pub label: Variable<String>,
    controller: Option<Weak<RefCell<dyn ItemController>>>,
}

thread_local! {
    static ITEM_TEMPLATE: Node = Node::fragment()
        .with_children([Node::element("li").with_children([Node::text("")])]);

    static PANEL_TEMPLATE: Node = Node::fragment().with_children([
        Node::element("div")
            .with_attr("class", "panel")
            .with_children([Node::comment("items")]),
        Node::comment("extra"),
    ]);
}

impl Item {
    pub fn new(label: &str) -> Result<Handle<Item>> {
        let this = handle(Item {
            cd: ComponentData::default(),
            label: Variable::default(),
            controller: None,
        });
        {
            let mut guard = this.borrow_mut();
            let o = &mut *guard;
            ITEM_TEMPLATE.with(|t| o.cd.init(t))?;
            let n0 = o.cd.walk(&[0])?;
            o.label.bind(BoundProperty::new(&n0, "textContent"));
            o.label.set(label.to_string())?;
        }
        Ok(this)
    }

    pub fn uninitialized() -> Handle<Item> {
        handle(Item {
            cd: ComponentData::default(),
            label: Variable::default(),
            controller: None,
        })
    }

    pub fn pick(&mut self) -> Result<()> {
        let label = self.label.get()?;
        if let Some(controller) = self.controller.as_ref().and_then(|c| c.upgrade()) {
            controller.try_borrow_mut().map_err(|_| Error::Busy)?.picked(label);
        }
        Ok(())
    }

    pub fn has_controller(&self) -> bool {
        self.controller.as_ref().map_or(false, |c| c.upgrade().is_some())
    }
}

impl Component for Item {
    type Controller = dyn ItemController;

    fn component_data(&self) -> &ComponentData {
        &self.cd
    }

    fn component_data_mut(&mut self) -> &mut ComponentData {
        &mut self.cd
    }

    fn insert_into(&mut self, parent: &Node, before: Option<&Node>) -> Result<()> {
        self.cd.insert_into(parent, before).map(|_| ())
    }

    fn extract(&mut self) -> Result<()> {
        self.cd.extract().map(|_| ())
    }

    fn destroy(&mut self) -> Result<()> {
        self.cd.destroy()
    }

    fn set_controller(&mut self, controller: Weak<RefCell<dyn ItemController>>) {
        self.controller = Some(controller);
    }
}

/// `<div class="panel"><!--items--></div><!--extra-->` with a list embed
/// inside the div and an optional embed at root level.
pub struct Panel {
    cd: ComponentData,
    pub items: List<Item>,
    pub extra: Optional<Item>,
    pub picked: Vec<String>,
}

impl Panel {
    pub fn new() -> Result<Handle<Panel>> {
        let this = handle(Panel {
            cd: ComponentData::default(),
            items: List::default(),
            extra: Optional::default(),
            picked: Vec::new(),
        });
        {
            let mut guard = this.borrow_mut();
            let o = &mut *guard;
            PANEL_TEMPLATE.with(|t| o.cd.init(t))?;
            let n0_0 = o.cd.walk(&[0, 0])?;
            let n1 = o.cd.walk(&[1])?;
            o.items.init(&n0_0.parent().ok_or(Error::NoParent)?, &n0_0);
            o.extra.init(&n1.parent().ok_or(Error::NoParent)?, &n1);
        }
        let controller: Handle<dyn ItemController> = this.clone();
        this.borrow_mut()
            .items
            .set_default_controller(std::rc::Rc::downgrade(&controller));
        Ok(this)
    }

    pub fn items_container(&self) -> Result<Node> {
        self.items
            .manager()
            .map(|m| m.container().clone())
            .ok_or(Error::ContainerNotInitialized)
    }
}

impl ItemController for Panel {
    fn picked(&mut self, label: String) {
        self.picked.push(label);
    }
}

impl Component for Panel {
    type Controller = dyn NoController;

    fn component_data(&self) -> &ComponentData {
        &self.cd
    }

    fn component_data_mut(&mut self) -> &mut ComponentData {
        &mut self.cd
    }

    fn insert_into(&mut self, parent: &Node, before: Option<&Node>) -> Result<()> {
        let moved = self.cd.insert_into(parent, before)?;
        self.items.update_parent(&moved);
        self.extra.update_parent(&moved);
        Ok(())
    }

    fn extract(&mut self) -> Result<()> {
        let moved = self.cd.extract()?;
        self.items.update_parent(&moved);
        self.extra.update_parent(&moved);
        Ok(())
    }

    fn destroy(&mut self) -> Result<()> {
        self.cd.ensure_live()?;
        let mut result = Ok(());
        result = result.and(self.items.destroy_all());
        result = result.and(self.extra.set(None));
        result.and(self.cd.destroy())
    }
}

/// Labels of the `<li>` children of `node`, in order.
pub fn labels(node: &Node) -> Vec<String> {
    node.child_nodes()
        .iter()
        .filter(|n| n.tag_name().as_deref() == Some("li"))
        .map(|n| n.text_content())
        .collect()
}
