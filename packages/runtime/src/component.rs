//! Component Lifecycle
//!
//! State shared by every generated component: the cloned template fragment,
//! the markers bracketing its root nodes, the slots of its conditional
//! blocks, and the lifecycle state machine.
//!
//! ```text
//! Uninitialized --init--> Unattached --insert_into--> Inserted
//!                             ^  |                      |  ^
//!                             |  +--------init          |  | insert_into
//!                             +-----------extract-------+--+
//! Unattached | Inserted --destroy--> Destroyed
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::control::ConditionalSlot;
use crate::dom::Node;
use crate::error::{Error, Result};

pub type Handle<T> = Rc<RefCell<T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Unattached,
    Inserted,
    Destroyed,
}

/// A move of a component's root nodes from one parent to another. `from`
/// is absent when the previous parent no longer exists.
#[derive(Debug, Clone)]
pub struct Reparent {
    pub from: Option<Node>,
    pub to: Node,
}

#[derive(Debug, Default)]
pub struct ComponentData {
    state: LifecycleState,
    fragment: Option<Node>,
    start: Option<Node>,
    end: Option<Node>,
    /// Strong handles on the nodes between the markers, markers included,
    /// as of the last init or move. The document may drop its parent while
    /// the component is inserted.
    roots: Vec<Node>,
    conditionals: Vec<ConditionalSlot>,
}

impl ComponentData {
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Clones `template` into a fresh holding fragment. Legal before the
    /// first init and while unattached.
    pub fn init(&mut self, template: &Node) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized | LifecycleState::Unattached => {}
            LifecycleState::Inserted => return Err(Error::AlreadyInserted),
            LifecycleState::Destroyed => return Err(Error::Destroyed),
        }
        let fragment = Node::fragment();
        let start = Node::comment("");
        let end = Node::comment("");
        fragment.append_child(&start)?;
        for child in template.child_nodes() {
            fragment.append_child(&child.clone_node(true))?;
        }
        fragment.append_child(&end)?;
        self.roots = fragment.child_nodes();
        self.fragment = Some(fragment);
        self.start = Some(start);
        self.end = Some(end);
        self.conditionals.clear();
        self.state = LifecycleState::Unattached;
        Ok(())
    }

    /// Resolves a root-relative path. The first index selects a root node;
    /// the empty path is the holding fragment.
    pub fn walk(&self, path: &[usize]) -> Result<Node> {
        let fragment = self.fragment.as_ref().ok_or(Error::NotInitialized)?;
        let Some((&first, rest)) = path.split_first() else {
            return Ok(fragment.clone());
        };
        let not_found = || Error::PathNotFound {
            path: path.to_vec(),
        };
        let roots = self.root_nodes()?;
        let root = roots.get(first + 1).ok_or_else(not_found)?;
        if root.ptr_eq(roots.last().ok_or_else(not_found)?) {
            return Err(not_found());
        }
        root.walk(rest).map_err(|_| not_found())
    }

    pub fn ensure_live(&self) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized => Err(Error::NotInitialized),
            LifecycleState::Destroyed => Err(Error::Destroyed),
            _ => Ok(()),
        }
    }

    /// First node of the component, usable as an insertion reference.
    pub fn first(&self) -> Option<Node> {
        self.start.clone()
    }

    pub fn holder(&self) -> Option<Node> {
        self.fragment.clone()
    }

    /// Current parent of the root nodes.
    pub fn container(&self) -> Option<Node> {
        self.start.as_ref().and_then(Node::parent)
    }

    /// The component's top-level nodes, without the markers.
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes = self.root_nodes().unwrap_or_default();
        nodes.pop();
        if !nodes.is_empty() {
            nodes.remove(0);
        }
        nodes
    }

    /// Markers and everything between them. Follows the sibling chain while
    /// it is intact, so rows added by repeated blocks are included, and
    /// falls back to the nodes recorded at the last move otherwise.
    fn root_nodes(&self) -> Result<Vec<Node>> {
        let start = self.start.as_ref().ok_or(Error::NotInitialized)?;
        let end = self.end.as_ref().ok_or(Error::NotInitialized)?;
        let mut nodes = vec![start.clone()];
        let mut current = start.next_sibling();
        while let Some(node) = current {
            nodes.push(node.clone());
            if node.ptr_eq(end) {
                return Ok(nodes);
            }
            current = node.next_sibling();
        }
        log::debug!("component markers are not siblings, using recorded roots");
        Ok(self.roots.clone())
    }

    /// Moves the root nodes before `before` in `parent`, or appends them.
    pub fn insert_into(&mut self, parent: &Node, before: Option<&Node>) -> Result<Reparent> {
        self.ensure_live()?;
        let from = self.container();
        let roots = self.root_nodes()?;
        for node in &roots {
            parent.insert_before(node, before)?;
        }
        self.roots = roots;
        self.state = LifecycleState::Inserted;
        Ok(Reparent {
            from,
            to: parent.clone(),
        })
    }

    /// Moves the root nodes back into the holding fragment.
    pub fn extract(&mut self) -> Result<Reparent> {
        self.ensure_live()?;
        if self.state != LifecycleState::Inserted {
            return Err(Error::NotInserted);
        }
        let from = self.container();
        let fragment = self.fragment.clone().ok_or(Error::NotInitialized)?;
        let roots = self.root_nodes()?;
        for node in &roots {
            fragment.append_child(node)?;
        }
        self.roots = roots;
        self.state = LifecycleState::Unattached;
        Ok(Reparent { from, to: fragment })
    }

    /// Removes the root nodes from wherever they are and releases the
    /// fragment. Always ends in `Destroyed` once the component is live.
    pub fn destroy(&mut self) -> Result<()> {
        self.ensure_live()?;
        for node in self.root_nodes().unwrap_or_default() {
            node.detach();
        }
        self.fragment = None;
        self.start = None;
        self.end = None;
        self.roots.clear();
        self.conditionals.clear();
        self.state = LifecycleState::Destroyed;
        Ok(())
    }

    /// Keeps a conditional block's slot so it can be toggled after init.
    pub fn keep_conditional(&mut self, slot: ConditionalSlot) {
        self.conditionals.push(slot);
    }

    /// Conditional blocks in the order init met them.
    pub fn conditionals(&self) -> &[ConditionalSlot] {
        &self.conditionals
    }

    /// Shows or hides the conditional block at `index`. Returns true if the
    /// document changed.
    pub fn update_conditional(&mut self, index: usize, present: bool) -> Result<bool> {
        self.ensure_live()?;
        let len = self.conditionals.len();
        let slot = self
            .conditionals
            .get_mut(index)
            .ok_or(Error::IndexOutOfBounds { index, len })?;
        slot.update(present)
    }
}

/// Marker for components without a controller.
pub trait NoController {}

/// Lifecycle operations every generated component implements.
pub trait Component {
    type Controller: ?Sized + 'static;

    fn component_data(&self) -> &ComponentData;

    fn component_data_mut(&mut self) -> &mut ComponentData;

    fn insert_into(&mut self, parent: &Node, before: Option<&Node>) -> Result<()>;

    fn extract(&mut self) -> Result<()>;

    fn destroy(&mut self) -> Result<()>;

    fn set_controller(&mut self, _controller: Weak<RefCell<Self::Controller>>) {}

    /// Called when an ancestor's root nodes, which include this component's
    /// nodes, moved to another parent.
    fn reparented(&mut self, _moved: &Reparent) {}

    fn state(&self) -> LifecycleState {
        self.component_data().state()
    }

    fn first_node(&self) -> Option<Node> {
        self.component_data().first()
    }
}
