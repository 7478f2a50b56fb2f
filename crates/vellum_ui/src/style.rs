//! Style objects and the per-widget renderer property cache.
//!
//! A [`Renderer`] is a shared bag of named display properties. Widgets do
//! not read it on every frame: each widget keeps a [`PropertyCache`] of
//! typed copies, and the bag pushes change notifications into a
//! per-widget [`RendererObserver`] whenever a property is written. A cache
//! entry is re-resolved if and only if its property was reported changed
//! since the last read. Invalidation is never time-based.

use crate::render::TextureHandle;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Weak};
use vellum_shared::{Color, GuiError, GuiResult};

/// Border thicknesses around a widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Left border width.
    pub left: f32,
    /// Top border width.
    pub top: f32,
    /// Right border width.
    pub right: f32,
    /// Bottom border width.
    pub bottom: f32,
}

impl Outline {
    /// Uniform thickness on all sides.
    #[must_use]
    pub const fn uniform(width: f32) -> Self {
        Self {
            left: width,
            top: width,
            right: width,
            bottom: width,
        }
    }
}

/// A typed style property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// A color.
    Color(Color),
    /// A scalar.
    Float(f32),
    /// A flag.
    Bool(bool),
    /// A string.
    Text(String),
    /// Border thicknesses.
    Outline(Outline),
    /// A texture reference.
    Texture(TextureHandle),
}

/// Pending change notifications for one subscriber.
#[derive(Debug, Default)]
struct ChangeSet {
    /// Everything must be re-resolved (fresh subscription or bag swap).
    all: bool,
    /// Individual properties written since the last read.
    names: HashSet<String>,
}

/// Shared state behind a [`Renderer`] handle.
#[derive(Default)]
struct RendererData {
    properties: HashMap<String, PropertyValue>,
    observers: Vec<Weak<Mutex<ChangeSet>>>,
}

/// A shared, possibly widget-spanning bag of named display properties.
///
/// Cloning the handle shares the bag (copies of a widget keep pointing at
/// the same renderer); [`PropertyCache::make_unique`] breaks the sharing
/// with a deep copy.
#[derive(Clone, Default)]
pub struct Renderer {
    data: Arc<RwLock<RendererData>>,
}

impl Renderer {
    /// Creates an empty property bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a property and pushes a change notification to every live
    /// subscriber.
    pub fn set_property(&self, name: &str, value: PropertyValue) {
        let mut data = self.data.write();
        data.properties.insert(name.to_owned(), value);
        data.observers.retain(|observer| match observer.upgrade() {
            Some(changes) => {
                changes.lock().names.insert(name.to_owned());
                true
            }
            None => false,
        });
    }

    /// Reads a property directly, bypassing any cache.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        self.data.read().properties.get(name).cloned()
    }

    /// Registers a new subscriber. The observer starts fully invalidated
    /// so the first cache read resolves everything.
    #[must_use]
    pub fn subscribe(&self) -> RendererObserver {
        let changes = Arc::new(Mutex::new(ChangeSet {
            all: true,
            names: HashSet::new(),
        }));
        self.data.write().observers.push(Arc::downgrade(&changes));
        RendererObserver { changes }
    }

    /// Returns an unshared deep copy of the bag with no subscribers.
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let properties = self.data.read().properties.clone();
        Self {
            data: Arc::new(RwLock::new(RendererData {
                properties,
                observers: Vec::new(),
            })),
        }
    }

    /// Returns true if two handles share the same bag.
    #[must_use]
    pub fn same_bag(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        f.debug_struct("Renderer")
            .field("properties", &data.properties.len())
            .field("observers", &data.observers.len())
            .finish()
    }
}

/// The change-notification channel between a renderer and one widget.
#[derive(Debug)]
pub struct RendererObserver {
    changes: Arc<Mutex<ChangeSet>>,
}

/// Per-widget cache of typed, last-resolved property copies.
pub struct PropertyCache {
    renderer: Renderer,
    observer: RendererObserver,
    values: HashMap<String, Option<PropertyValue>>,
}

impl PropertyCache {
    /// Creates a cache subscribed to the given renderer.
    #[must_use]
    pub fn new(renderer: Renderer) -> Self {
        let observer = renderer.subscribe();
        Self {
            renderer,
            observer,
            values: HashMap::new(),
        }
    }

    /// The renderer this cache reads from.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Replaces the shared renderer with an unshared deep copy
    /// (copy-on-write escape hatch).
    pub fn make_unique(&mut self) {
        self.renderer = self.renderer.deep_clone();
        self.observer = self.renderer.subscribe();
        self.values.clear();
    }

    /// Points the cache at a different renderer, invalidating everything.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.observer = renderer.subscribe();
        self.renderer = renderer;
        self.values.clear();
    }

    /// Applies pending change notifications, evicting stale entries.
    fn drain_changes(&mut self) {
        let mut changes = self.observer.changes.lock();
        if changes.all {
            self.values.clear();
            changes.all = false;
            changes.names.clear();
            return;
        }
        for name in changes.names.drain() {
            self.values.remove(&name);
        }
    }

    /// Reads a property through the cache, re-resolving it only if the
    /// renderer reported it changed since the last read.
    #[must_use]
    pub fn get(&mut self, name: &str) -> Option<PropertyValue> {
        self.drain_changes();
        if let Some(cached) = self.values.get(name) {
            return cached.clone();
        }
        let value = self.renderer.property(name);
        self.values.insert(name.to_owned(), value.clone());
        value
    }

    /// Reads a color property, falling back to a default.
    #[must_use]
    pub fn color(&mut self, name: &str, default: Color) -> Color {
        match self.get(name) {
            Some(PropertyValue::Color(color)) => color,
            _ => default,
        }
    }

    /// Reads a scalar property, falling back to a default.
    #[must_use]
    pub fn float(&mut self, name: &str, default: f32) -> f32 {
        match self.get(name) {
            Some(PropertyValue::Float(value)) => value,
            _ => default,
        }
    }

    /// Reads a border property, falling back to a default.
    #[must_use]
    pub fn outline(&mut self, name: &str, default: Outline) -> Outline {
        match self.get(name) {
            Some(PropertyValue::Outline(outline)) => outline,
            _ => default,
        }
    }

    /// Reads a texture property if one is set.
    #[must_use]
    pub fn texture(&mut self, name: &str) -> Option<TextureHandle> {
        match self.get(name) {
            Some(PropertyValue::Texture(texture)) => Some(texture),
            _ => None,
        }
    }
}

impl Clone for PropertyCache {
    /// A cloned cache shares the renderer bag (copy-on-write policy) but
    /// gets its own subscription, fully invalidated.
    fn clone(&self) -> Self {
        Self::new(self.renderer.clone())
    }
}

impl std::fmt::Debug for PropertyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyCache")
            .field("renderer", &self.renderer)
            .field("cached", &self.values.len())
            .finish()
    }
}

/// One theme value as written in a TOML theme file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeValue {
    /// A flag.
    Bool(bool),
    /// A scalar.
    Float(f32),
    /// A color table (`{ r = .., g = .., b = .., a = .. }`).
    Color(Color),
    /// A string.
    Text(String),
}

impl From<ThemeValue> for PropertyValue {
    fn from(value: ThemeValue) -> Self {
        match value {
            ThemeValue::Bool(flag) => Self::Bool(flag),
            ThemeValue::Float(scalar) => Self::Float(scalar),
            ThemeValue::Color(color) => Self::Color(color),
            ThemeValue::Text(text) => Self::Text(text),
        }
    }
}

/// A named set of style properties per widget type, loaded once at
/// startup from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name.
    pub name: String,
    /// Widget type tag -> property name -> value.
    pub widgets: BTreeMap<String, BTreeMap<String, ThemeValue>>,
}

impl Theme {
    /// Parses a theme from TOML text.
    ///
    /// # Errors
    ///
    /// [`GuiError::InvalidConfig`] when the text is not a valid theme.
    pub fn from_toml_str(text: &str) -> GuiResult<Self> {
        toml::from_str(text).map_err(|err| GuiError::InvalidConfig(err.to_string()))
    }

    /// Writes every property the theme defines for a widget type into the
    /// given renderer.
    pub fn apply_to(&self, widget_type: &str, renderer: &Renderer) {
        let Some(properties) = self.widgets.get(widget_type) else {
            return;
        };
        tracing::debug!(theme = %self.name, widget_type, "applying theme properties");
        for (name, value) in properties {
            renderer.set_property(name, value.clone().into());
        }
    }
}
