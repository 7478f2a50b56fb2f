//! Widget-tree snapshots.
//!
//! `save()` turns any widget into a [`WidgetNode`]: a generic key-value
//! tree that an external serializer writes to disk in whatever syntax it
//! likes. Loading goes through the [`WidgetFactory`], a registration table
//! from type tag to constructor; an unknown tag is programmer misuse and
//! fails loudly.

use crate::layout::Layout2d;
use crate::widget::Widget;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use vellum_shared::{GuiError, GuiResult};

/// A typed value inside a saved widget node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeValue {
    /// A flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A scalar.
    Float(f32),
    /// A string.
    Text(String),
    /// A layout expression (position or size).
    Layout(Layout2d),
}

/// One node of a saved widget tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetNode {
    /// Widget type tag ("Scrollbar", "Label", ...).
    pub type_tag: String,
    /// Named properties. Sorted map so snapshots are stable.
    pub properties: BTreeMap<String, NodeValue>,
    /// Child nodes, in insertion (z) order.
    pub children: Vec<WidgetNode>,
}

impl WidgetNode {
    /// Creates an empty node for a widget type.
    #[must_use]
    pub fn new(type_tag: &str) -> Self {
        Self {
            type_tag: type_tag.to_owned(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Sets a property.
    pub fn set(&mut self, name: &str, value: NodeValue) {
        self.properties.insert(name.to_owned(), value);
    }

    /// Reads a property if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NodeValue> {
        self.properties.get(name)
    }

    fn missing(&self, name: &str) -> GuiError {
        GuiError::MissingProperty {
            property: name.to_owned(),
            widget_type: self.type_tag.clone(),
        }
    }

    /// Reads a required flag property.
    ///
    /// # Errors
    ///
    /// Missing property or a value of a different type.
    pub fn get_bool(&self, name: &str) -> GuiResult<bool> {
        match self.get(name) {
            Some(NodeValue::Bool(flag)) => Ok(*flag),
            Some(_) => Err(GuiError::PropertyTypeMismatch {
                property: name.to_owned(),
                expected: "bool",
            }),
            None => Err(self.missing(name)),
        }
    }

    /// Reads a required integer property.
    ///
    /// # Errors
    ///
    /// Missing property or a value of a different type.
    pub fn get_int(&self, name: &str) -> GuiResult<i64> {
        match self.get(name) {
            Some(NodeValue::Int(value)) => Ok(*value),
            Some(_) => Err(GuiError::PropertyTypeMismatch {
                property: name.to_owned(),
                expected: "int",
            }),
            None => Err(self.missing(name)),
        }
    }

    /// Reads a required scalar property.
    ///
    /// # Errors
    ///
    /// Missing property or a value of a different type.
    pub fn get_float(&self, name: &str) -> GuiResult<f32> {
        match self.get(name) {
            Some(NodeValue::Float(value)) => Ok(*value),
            Some(_) => Err(GuiError::PropertyTypeMismatch {
                property: name.to_owned(),
                expected: "float",
            }),
            None => Err(self.missing(name)),
        }
    }

    /// Reads a required string property.
    ///
    /// # Errors
    ///
    /// Missing property or a value of a different type.
    pub fn get_text(&self, name: &str) -> GuiResult<&str> {
        match self.get(name) {
            Some(NodeValue::Text(text)) => Ok(text),
            Some(_) => Err(GuiError::PropertyTypeMismatch {
                property: name.to_owned(),
                expected: "text",
            }),
            None => Err(self.missing(name)),
        }
    }

    /// Reads a required layout property.
    ///
    /// # Errors
    ///
    /// Missing property or a value of a different type.
    pub fn get_layout(&self, name: &str) -> GuiResult<Layout2d> {
        match self.get(name) {
            Some(NodeValue::Layout(layout)) => Ok(layout.clone()),
            Some(_) => Err(GuiError::PropertyTypeMismatch {
                property: name.to_owned(),
                expected: "layout",
            }),
            None => Err(self.missing(name)),
        }
    }
}

/// Constructor for an empty widget of one type.
pub type WidgetConstructor = fn() -> Box<dyn Widget>;

/// Registration table from widget type tag to constructor, built at
/// startup. Loading a tag that was never registered fails with
/// [`GuiError::UnknownWidgetType`].
pub struct WidgetFactory {
    constructors: HashMap<String, WidgetConstructor>,
}

impl WidgetFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Creates a factory with every built-in widget type registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register("Container", || Box::new(crate::widget::Container::new()));
        factory.register("Label", || Box::new(crate::widget::Label::new()));
        factory.register("Scrollbar", || Box::new(crate::widget::Scrollbar::new()));
        factory.register("TreeView", || Box::new(crate::widget::TreeView::new()));
        factory.register("SpriteSheet", || {
            Box::new(crate::widget::SpriteSheet::new())
        });
        factory
    }

    /// Registers (or replaces) a constructor for a type tag.
    pub fn register(&mut self, type_tag: &str, constructor: WidgetConstructor) {
        self.constructors.insert(type_tag.to_owned(), constructor);
    }

    /// Builds a widget from a saved node, recursing through children.
    ///
    /// # Errors
    ///
    /// [`GuiError::UnknownWidgetType`] for an unregistered tag, or any
    /// error from the widget's own `load`.
    pub fn build(&self, node: &WidgetNode) -> GuiResult<Box<dyn Widget>> {
        let Some(constructor) = self.constructors.get(&node.type_tag) else {
            tracing::debug!(type_tag = %node.type_tag, "no constructor registered");
            return Err(GuiError::UnknownWidgetType(node.type_tag.clone()));
        };
        let mut widget = constructor();
        widget.load(node, self)?;
        Ok(widget)
    }
}

impl Default for WidgetFactory {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let mut node = WidgetNode::new("Scrollbar");
        node.set("Maximum", NodeValue::Int(100));
        node.set("AutoHide", NodeValue::Bool(false));

        assert_eq!(node.get_int("Maximum").unwrap(), 100);
        assert!(!node.get_bool("AutoHide").unwrap());

        assert!(matches!(
            node.get_bool("Maximum"),
            Err(GuiError::PropertyTypeMismatch { .. })
        ));
        assert!(matches!(
            node.get_int("Value"),
            Err(GuiError::MissingProperty { .. })
        ));
    }

    #[test]
    fn test_unknown_type_tag_fails() {
        let factory = WidgetFactory::with_builtins();
        let node = WidgetNode::new("Carousel");

        assert_eq!(
            factory.build(&node).unwrap_err(),
            GuiError::UnknownWidgetType("Carousel".to_owned())
        );
    }

    #[test]
    fn test_node_toml_round_trip() {
        let mut node = WidgetNode::new("Label");
        node.set("Text", NodeValue::Text("hello".to_owned()));
        node.set("Size", NodeValue::Layout(Layout2d::constant(80.0, 20.0)));
        node.children.push(WidgetNode::new("SpriteSheet"));

        let text = toml::to_string(&node).unwrap();
        let restored: WidgetNode = toml::from_str(&text).unwrap();
        assert_eq!(restored, node);
    }
}
