//! Controlled Blocks
//!
//! Runtime support for conditional and repeated subtrees of a cloned
//! template.

use crate::dom::Node;
use crate::error::{Error, Result};

/// A conditional subtree and the placeholder that stands in for it while
/// the condition is false. The materialized subtree keeps its identity
/// across updates.
#[derive(Debug)]
pub struct ConditionalSlot {
    node: Node,
    placeholder: Node,
    present: bool,
}

impl ConditionalSlot {
    /// Wraps a node that is currently in the document.
    pub fn new(node: &Node) -> Self {
        ConditionalSlot {
            node: node.clone(),
            placeholder: Node::comment("removed"),
            present: true,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    /// Shows or hides the subtree. Returns true if the document changed.
    pub fn update(&mut self, present: bool) -> Result<bool> {
        if present == self.present {
            return Ok(false);
        }
        if present {
            self.placeholder.replace_with(&self.node)?;
        } else {
            self.node.replace_with(&self.placeholder)?;
        }
        self.present = present;
        Ok(true)
    }
}

/// The detached template of a repeated subtree plus the position its
/// clones are inserted at.
#[derive(Debug)]
pub struct Repeat {
    template: Node,
    parent: Node,
    next: Option<Node>,
}

impl Repeat {
    /// Detaches `node` from its parent and remembers where it was.
    pub fn detach(node: &Node) -> Result<Self> {
        let parent = node.parent().ok_or(Error::NoParent)?;
        let next = node.next_sibling();
        node.detach();
        Ok(Repeat {
            template: node.clone(),
            parent,
            next,
        })
    }

    /// Clones the template and inserts the clone after the previous ones.
    pub fn instantiate(&self) -> Result<Node> {
        let clone = self.template.clone_node(true);
        self.parent.insert_before(&clone, self.next.as_ref())?;
        Ok(clone)
    }
}
