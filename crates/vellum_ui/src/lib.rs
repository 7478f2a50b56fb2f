//! # Vellum UI
//!
//! Retained-mode widget toolkit: a widget tree with deferred layout,
//! shared style bags and a backend-agnostic render command stream.
//!
//! ```text
//!   window events                    frame tick
//!        |                               |
//!        v                               v
//!   +---------+   hit test / capture  +--------+   commands   +---------+
//!   |   Gui   | --------------------> | widget | -----------> | Render  |
//!   | (root)  |    focus chain        |  tree  |   (draw)     | Target  |
//!   +---------+                       +--------+              +---------+
//!        ^                               |
//!        |        save / load            v
//!        +------------------------- WidgetNode tree
//! ```
//!
//! Widgets never render pixels; drawing emits [`render::RenderCommand`]s
//! against a [`render::RenderTarget`] supplied by the embedding
//! application. Layout values are expressions resolved lazily against
//! the parent size, and widget styling flows through shared
//! [`style::Renderer`] bags with per-widget caches.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod event;
pub mod layout;
pub mod persist;
pub mod render;
pub mod signal;
pub mod style;
pub mod widget;

pub use event::{Event, Key, Modifiers, MouseButton};
pub use layout::{Axis, BindTarget, Binding, GeometryHandle, Layout2d, Length};
pub use persist::{NodeValue, WidgetFactory, WidgetNode};
pub use render::{CommandRecorder, RenderCommand, RenderStates, RenderTarget, TextureHandle};
pub use signal::{Signal, SignalKind, SignalTable};
pub use style::{Outline, PropertyCache, PropertyValue, Renderer, Theme};
pub use widget::{
    Container, Gui, Label, Scrollbar, SpriteSheet, TreeView, Widget, WidgetCommon,
};
pub use vellum_shared::{Color, GuiError, GuiResult, Rect, Vec2};
