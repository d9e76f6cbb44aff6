//! List and Optional Embeds
//!
//! Containers owning child component instances that are placed before an
//! anchor node inside a managed container node.

use std::cell::RefCell;
use std::rc::Weak;

use crate::component::{Component, Handle, Reparent};
use crate::dom::Node;
use crate::error::{Error, Result};

/// Knows where contained items live in the document.
#[derive(Debug, Clone)]
pub struct ListManager {
    container: Node,
    anchor: Node,
}

impl ListManager {
    pub fn new(container: &Node, anchor: &Node) -> Self {
        ListManager {
            container: container.clone(),
            anchor: anchor.clone(),
        }
    }

    pub fn container(&self) -> &Node {
        &self.container
    }

    pub fn anchor(&self) -> &Node {
        &self.anchor
    }

    /// Follows the owning component when its root nodes move. Returns
    /// true if the container changed.
    pub fn update_parent(&mut self, moved: &Reparent) -> bool {
        match &moved.from {
            Some(from) if self.container.ptr_eq(from) => {
                self.container = moved.to.clone();
                true
            }
            _ => false,
        }
    }

    fn place<T: Component>(&self, item: &Handle<T>, before: Option<&Node>) -> Result<()> {
        let before = before.unwrap_or(&self.anchor);
        item.borrow_mut().insert_into(&self.container, Some(before))
    }
}

fn reparent_item<T: Component>(item: &Handle<T>, moved: &Reparent) {
    match item.try_borrow_mut() {
        Ok(mut item) => item.reparented(moved),
        Err(_) => log::warn!("skipping reparent of a busy component"),
    }
}

pub struct List<T: Component> {
    manager: Option<ListManager>,
    items: Vec<Handle<T>>,
    default_controller: Option<Weak<RefCell<T::Controller>>>,
}

impl<T: Component> Default for List<T> {
    fn default() -> Self {
        List {
            manager: None,
            items: Vec::new(),
            default_controller: None,
        }
    }
}

impl<T: Component> List<T> {
    pub fn init(&mut self, container: &Node, anchor: &Node) {
        self.manager = Some(ListManager::new(container, anchor));
    }

    pub fn set_default_controller(&mut self, controller: Weak<RefCell<T::Controller>>) {
        self.default_controller = Some(controller);
    }

    /// Retargets the manager and, when the items moved along, the items.
    pub fn update_parent(&mut self, moved: &Reparent) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        if manager.update_parent(moved) {
            for item in &self.items {
                reparent_item(item, moved);
            }
        }
    }

    pub fn manager(&self) -> Option<&ListManager> {
        self.manager.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Handle<T>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle<T>> {
        self.items.iter()
    }

    fn adopt(&self, item: &Handle<T>) {
        if let Some(controller) = &self.default_controller {
            item.borrow_mut().set_controller(controller.clone());
        }
    }

    pub fn append(&mut self, item: Handle<T>) -> Result<()> {
        let manager = self.manager.as_ref().ok_or(Error::ContainerNotInitialized)?;
        self.adopt(&item);
        manager.place(&item, None)?;
        self.items.push(item);
        Ok(())
    }

    /// Inserts before the item currently at `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, item: Handle<T>) -> Result<()> {
        let len = self.items.len();
        if index > len {
            return Err(Error::IndexOutOfBounds { index, len });
        }
        if index == len {
            return self.append(item);
        }
        let manager = self.manager.as_ref().ok_or(Error::ContainerNotInitialized)?;
        let before = self.items[index].borrow().first_node();
        self.adopt(&item);
        manager.place(&item, before.as_ref())?;
        self.items.insert(index, item);
        Ok(())
    }

    /// Extracts the item at `index` and hands it back without destroying it.
    /// The item stays in the list if extracting fails.
    pub fn remove(&mut self, index: usize) -> Result<Handle<T>> {
        self.check_index(index)?;
        self.items[index]
            .try_borrow_mut()
            .map_err(|_| Error::Busy)?
            .extract()?;
        Ok(self.items.remove(index))
    }

    pub fn destroy(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let item = self.items.remove(index);
        let result = item.borrow_mut().destroy();
        result
    }

    /// Destroys every item, even past a failure, and empties the list. The
    /// first failure is returned.
    pub fn destroy_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for item in self.items.drain(..) {
            let result = match item.try_borrow_mut() {
                Ok(mut item) => item.destroy(),
                Err(_) => Err(Error::Busy),
            };
            if let Err(e) = result {
                log::warn!("destroying list item: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}

pub struct Optional<T: Component> {
    manager: Option<ListManager>,
    item: Option<Handle<T>>,
    default_controller: Option<Weak<RefCell<T::Controller>>>,
}

impl<T: Component> Default for Optional<T> {
    fn default() -> Self {
        Optional {
            manager: None,
            item: None,
            default_controller: None,
        }
    }
}

impl<T: Component> Optional<T> {
    pub fn init(&mut self, container: &Node, anchor: &Node) {
        self.manager = Some(ListManager::new(container, anchor));
    }

    pub fn set_default_controller(&mut self, controller: Weak<RefCell<T::Controller>>) {
        self.default_controller = Some(controller);
    }

    pub fn update_parent(&mut self, moved: &Reparent) {
        let Some(manager) = self.manager.as_mut() else {
            return;
        };
        if manager.update_parent(moved) {
            if let Some(item) = &self.item {
                reparent_item(item, moved);
            }
        }
    }

    pub fn manager(&self) -> Option<&ListManager> {
        self.manager.as_ref()
    }

    pub fn get(&self) -> Option<&Handle<T>> {
        self.item.as_ref()
    }

    pub fn is_some(&self) -> bool {
        self.item.is_some()
    }

    /// Destroys the current item, then stores and inserts `value`.
    pub fn set(&mut self, value: Option<Handle<T>>) -> Result<()> {
        if let Some(current) = self.item.take() {
            current.borrow_mut().destroy()?;
        }
        if let Some(item) = value {
            let manager = self.manager.as_ref().ok_or(Error::ContainerNotInitialized)?;
            if let Some(controller) = &self.default_controller {
                item.borrow_mut().set_controller(controller.clone());
            }
            manager.place(&item, None)?;
            self.item = Some(item);
        }
        Ok(())
    }

    /// Extracts the current item and leaves the slot empty.
    pub fn remove(&mut self) -> Result<Option<Handle<T>>> {
        match self.item.take() {
            Some(item) => {
                item.borrow_mut().extract()?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}
