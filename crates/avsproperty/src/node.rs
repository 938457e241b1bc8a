//! The in-memory property tree.

use crate::name::NodeName;
use crate::types::{self, NodeType};
use crate::value::{IntoValue, Value};
use crate::{Error, Result};

/// A named string slot on a node. Keys share the node-name alphabet and are
/// unique within one node.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub(crate) key: NodeName,
    pub value: String,
}

impl Attribute {
    /// The attribute key.
    pub fn key(&self) -> &NodeName {
        &self.key
    }
}

/// One element of a property tree.
///
/// A node either carries a typed value or children, never both: assigning a
/// value to a node with children fails, and appending a child to a valued
/// node drops the value and resets the type to void. Children are owned
/// exclusively by their parent; [`Node::append_child`] takes the child by
/// value, so a node can never be attached twice.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: NodeName,
    pub(crate) node_type: &'static NodeType,
    pub(crate) is_array: bool,
    pub(crate) value: Option<Value>,
    pub(crate) children: Vec<Node>,
    pub(crate) attributes: Vec<Attribute>,
}

impl Node {
    /// Create a detached void node.
    pub fn new(name: &str) -> Result<Node> {
        Ok(Node::from_parts(NodeName::new(name)?, &types::VOID, false))
    }

    /// Create a detached node holding a value.
    pub fn with_value<V: IntoValue>(name: &str, value: V) -> Result<Node> {
        let mut node = Node::new(name)?;
        node.set_value(value)?;
        Ok(node)
    }

    pub(crate) fn from_parts(name: NodeName, node_type: &'static NodeType, is_array: bool) -> Node {
        Node { name, node_type, is_array, value: None, children: Vec::new(), attributes: Vec::new() }
    }

    /// The node's name.
    pub fn name(&self) -> &NodeName {
        &self.name
    }

    /// The node's type descriptor.
    pub fn node_type(&self) -> &'static NodeType {
        self.node_type
    }

    /// The node's value, if it carries one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether the value is an array of elements.
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The node's children, in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The node's attributes, in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Find the first child with the given name.
    ///
    /// Returns `None` for names that do not fit the alphabet.
    pub fn search_child(&self, name: &str) -> Option<&Node> {
        let name = NodeName::new(name).ok()?;
        self.children.iter().find(|c| c.name == name)
    }

    /// Find the first child with the given name, mutably.
    pub fn search_child_mut(&mut self, name: &str) -> Option<&mut Node> {
        let name = NodeName::new(name).ok()?;
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Collect every child with the given name.
    pub fn search_children(&self, name: &str) -> Vec<&Node> {
        match NodeName::new(name) {
            Ok(name) => self.children.iter().filter(|c| c.name == name).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// The value of the first child with the given name.
    pub fn child_value(&self, name: &str) -> Option<&Value> {
        self.search_child(name)?.value()
    }

    /// Find an attribute by key.
    pub fn search_attribute(&self, key: &str) -> Option<&Attribute> {
        let key = NodeName::new(key).ok()?;
        self.attributes.iter().find(|a| a.key == key)
    }

    /// The value of the attribute with the given key, or `""` if absent.
    pub fn attribute_value(&self, key: &str) -> &str {
        self.search_attribute(key).map(|a| a.value.as_str()).unwrap_or("")
    }

    /// Set an attribute. An existing attribute with the same key keeps its
    /// position and gets the new value.
    pub fn set_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        let key = NodeName::new(key)?;
        if let Some(attr) = self.attributes.iter_mut().find(|a| a.key == key) {
            attr.value = value.to_owned();
            return Ok(());
        }
        self.attributes.push(Attribute { key, value: value.to_owned() });
        Ok(())
    }

    /// Set the node's value, selecting the node type from the value's shape.
    pub fn set_value<V: IntoValue>(&mut self, value: V) -> Result<()> {
        if !self.children.is_empty() {
            return Err(self.err("cannot assign value to node that has children"));
        }
        let (node_type, is_array, value) = value.into_value();
        self.node_type = node_type;
        self.is_array = is_array;
        self.value = Some(value);
        Ok(())
    }

    /// The value as a signed integer, or 0 if the node does not hold a single
    /// signed scalar.
    pub fn int_value(&self) -> i64 {
        if self.is_array {
            return 0;
        }
        match self.value.as_ref() {
            Some(Value::S8(v)) if v.len() == 1 => v[0] as i64,
            Some(Value::S16(v)) if v.len() == 1 => v[0] as i64,
            Some(Value::S32(v)) if v.len() == 1 => v[0] as i64,
            Some(Value::S64(v)) if v.len() == 1 => v[0],
            _ => 0,
        }
    }

    /// The value as an unsigned integer, or 0 if the node does not hold a
    /// single unsigned scalar.
    pub fn uint_value(&self) -> u64 {
        if self.is_array {
            return 0;
        }
        match self.value.as_ref() {
            Some(Value::U8(v)) if v.len() == 1 => v[0] as u64,
            Some(Value::U16(v)) if v.len() == 1 => v[0] as u64,
            Some(Value::U32(v)) if v.len() == 1 => v[0] as u64,
            Some(Value::U64(v)) if v.len() == 1 => v[0],
            _ => 0,
        }
    }

    /// The value as a string, or `""` if the node does not hold one.
    pub fn string_value(&self) -> &str {
        match self.value.as_ref() {
            Some(Value::Str(s)) => s,
            _ => "",
        }
    }

    /// The value as binary data, or an empty slice if the node does not hold
    /// any.
    pub fn binary_value(&self) -> &[u8] {
        match self.value.as_ref() {
            Some(Value::Bin(b)) => b,
            _ => &[],
        }
    }

    /// The length of an array, string, or binary value. Nodes holding none
    /// of those report 1.
    pub fn array_length(&self) -> usize {
        match self.value.as_ref() {
            Some(Value::Str(s)) => s.len(),
            Some(Value::Bin(b)) => b.len(),
            Some(v) if self.is_array => v.scalar_len() / self.node_type.count(),
            _ => 1,
        }
    }

    /// Add `child` as the last child. A typed parent reverts to void and
    /// loses its value. Returns a reference to the appended child.
    pub fn append_child(&mut self, child: Node) -> &mut Node {
        if self.node_type != &types::VOID {
            self.node_type = &types::VOID;
            self.value = None;
            self.is_array = false;
        }
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Create a new void node as the last child.
    pub fn new_node(&mut self, name: &str) -> Result<&mut Node> {
        let child = Node::new(name)?;
        Ok(self.append_child(child))
    }

    /// Create a new node with a value as the last child.
    pub fn new_node_with_value<V: IntoValue>(&mut self, name: &str, value: V) -> Result<&mut Node> {
        let child = Node::with_value(name, value)?;
        Ok(self.append_child(child))
    }

    /// Preorder traversal. `start` runs before a node's children, `end`
    /// after; either callback can stop the walk by returning an error.
    pub fn traverse<F, G>(&self, start: &mut F, end: &mut G) -> Result<()>
    where
        F: FnMut(&Node) -> Result<()>,
        G: FnMut(&Node) -> Result<()>,
    {
        start(self)?;
        for child in &self.children {
            child.traverse(start, end)?;
        }
        end(self)
    }

    /// An error attributed to this node.
    pub(crate) fn err(&self, message: impl Into<String>) -> Error {
        Error::Node { name: self.name.to_string(), message: message.into() }
    }
}
