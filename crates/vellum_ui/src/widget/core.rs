//! The widget contract.
//!
//! Capabilities are split into small traits ([`Drawable`], [`HitTestable`],
//! [`FocusParticipant`]) composed by the [`Widget`] trait; there is no
//! inheritance chain. Every widget embeds a [`WidgetCommon`] for the state
//! all widgets share: layout expressions, the resolved-geometry cache and
//! the visibility/enabled/focus flags.

use crate::layout::{GeometryHandle, Layout2d};
use crate::persist::{NodeValue, WidgetFactory, WidgetNode};
use crate::render::{RenderStates, RenderTarget};
use crate::widget::Container;
use std::time::Instant;
use vellum_shared::{GuiResult, Rect, Vec2};

/// Widget state flags (bitfield for efficiency).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidgetFlags(u32);

impl WidgetFlags {
    /// Widget is visible.
    pub const VISIBLE: u32 = 1 << 0;
    /// Widget is enabled (can receive input).
    pub const ENABLED: u32 = 1 << 1;
    /// Widget holds keyboard focus.
    pub const FOCUSED: u32 = 1 << 2;
    /// Pointer is over the widget.
    pub const HOVERED: u32 = 1 << 3;
    /// Resolved geometry is stale and must be recomputed on next query.
    pub const DIRTY_LAYOUT: u32 = 1 << 4;

    /// Default flags for a new widget.
    pub const DEFAULT: Self = Self(Self::VISIBLE | Self::ENABLED | Self::DIRTY_LAYOUT);

    /// Creates new flags with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn put(&mut self, flag: u32, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

/// State shared by every widget: layout expressions, resolved geometry,
/// flags, opacity and origin.
///
/// Geometry invariant: `rect()` is consistent with the parent size passed
/// to the last `resolved_rect` call. It goes stale when the widget's own
/// expressions are replaced or when the parent announces a size change via
/// [`WidgetCommon::parent_size_changed`]; recomputation is deferred to the
/// next query, never eager.
#[derive(Debug)]
pub struct WidgetCommon {
    position: Layout2d,
    size: Layout2d,
    origin: Vec2,
    opacity: f32,
    flags: WidgetFlags,
    resolved: Rect,
    last_parent_size: Vec2,
    geometry: GeometryHandle,
}

impl WidgetCommon {
    /// Creates default widget state: visible, enabled, zero geometry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Layout2d::default(),
            size: Layout2d::default(),
            origin: Vec2::ZERO,
            opacity: 1.0,
            flags: WidgetFlags::DEFAULT,
            resolved: Rect::ZERO,
            last_parent_size: Vec2::ZERO,
            geometry: GeometryHandle::default(),
        }
    }

    /// Replaces the position expression.
    pub fn set_position(&mut self, position: Layout2d) {
        self.position = position;
        self.flags.set(WidgetFlags::DIRTY_LAYOUT);
    }

    /// The position expression.
    #[must_use]
    pub fn position(&self) -> &Layout2d {
        &self.position
    }

    /// Replaces the size expression.
    pub fn set_size(&mut self, size: Layout2d) {
        self.size = size;
        self.flags.set(WidgetFlags::DIRTY_LAYOUT);
    }

    /// The size expression.
    #[must_use]
    pub fn size(&self) -> &Layout2d {
        &self.size
    }

    /// Sets the origin as a fraction of the widget's size. (0.5, 0.5)
    /// positions the widget by its center.
    pub fn set_origin(&mut self, origin: Vec2) {
        self.origin = origin;
        self.flags.set(WidgetFlags::DIRTY_LAYOUT);
    }

    /// The origin fraction.
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Sets the opacity, clamped to 0-1.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Current opacity.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Shows or hides the widget.
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.put(WidgetFlags::VISIBLE, visible);
    }

    /// Returns true if the widget is visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.has(WidgetFlags::VISIBLE)
    }

    /// Enables or disables the widget.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.put(WidgetFlags::ENABLED, enabled);
    }

    /// Returns true if the widget is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.flags.has(WidgetFlags::ENABLED)
    }

    /// Direct flag access.
    #[must_use]
    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    /// Direct mutable flag access.
    pub fn flags_mut(&mut self) -> &mut WidgetFlags {
        &mut self.flags
    }

    /// Explicit notification that the parent's size changed. The resolved
    /// geometry is stale from now until the next `resolved_rect` query.
    pub fn parent_size_changed(&mut self) {
        self.flags.set(WidgetFlags::DIRTY_LAYOUT);
    }

    /// Returns the resolved geometry for the given parent size,
    /// recomputing it only when stale.
    pub fn resolved_rect(&mut self, parent_size: Vec2) -> Rect {
        if self.flags.has(WidgetFlags::DIRTY_LAYOUT) || parent_size != self.last_parent_size {
            let size = self.size.resolve(parent_size);
            let pos = self.position.resolve(parent_size) - self.origin.scale(size);
            self.resolved = Rect::from_pos_size(pos, size);
            self.last_parent_size = parent_size;
            self.geometry.set(self.resolved);
            self.flags.clear(WidgetFlags::DIRTY_LAYOUT);
        }
        self.resolved
    }

    /// The last resolved geometry, without re-resolving.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.resolved
    }

    /// Returns true if a widget-local point lies within the resolved size.
    #[must_use]
    pub fn contains_local(&self, pos: Vec2) -> bool {
        Rect::from_pos_size(Vec2::ZERO, self.resolved.size()).contains(pos)
    }

    /// A live handle to the resolved geometry, for layout bindings.
    #[must_use]
    pub fn geometry_handle(&self) -> GeometryHandle {
        self.geometry.clone()
    }

    /// Writes the shared properties into a save node.
    pub fn save_into(&self, node: &mut WidgetNode) {
        node.set("Position", NodeValue::Layout(self.position.clone()));
        node.set("Size", NodeValue::Layout(self.size.clone()));
        node.set("Visible", NodeValue::Bool(self.is_visible()));
        node.set("Enabled", NodeValue::Bool(self.is_enabled()));
        node.set("Opacity", NodeValue::Float(self.opacity));
    }

    /// Restores the shared properties from a save node.
    ///
    /// # Errors
    ///
    /// Missing or mistyped properties.
    pub fn load_from(&mut self, node: &WidgetNode) -> GuiResult<()> {
        self.set_position(node.get_layout("Position")?);
        self.set_size(node.get_layout("Size")?);
        self.set_visible(node.get_bool("Visible")?);
        self.set_enabled(node.get_bool("Enabled")?);
        self.set_opacity(node.get_float("Opacity")?);
        Ok(())
    }
}

impl Default for WidgetCommon {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for WidgetCommon {
    /// A cloned widget gets its own geometry handle: bindings against the
    /// original must not observe the copy.
    fn clone(&self) -> Self {
        Self {
            position: self.position.clone(),
            size: self.size.clone(),
            origin: self.origin,
            opacity: self.opacity,
            flags: self.flags,
            resolved: self.resolved,
            last_parent_size: self.last_parent_size,
            geometry: GeometryHandle::new(self.resolved),
        }
    }
}

/// Pure rendering: emit commands against the given target. Must not
/// mutate logical state, so a frame can be drawn more than once
/// (render-to-texture previews).
pub trait Drawable {
    /// Draws the widget with the composed transform/opacity state.
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates);
}

/// Pure geometric containment test in the widget's own local space.
pub trait HitTestable {
    /// Returns true if the (already transformed) point is on the widget.
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool;
}

/// Participation in the keyboard focus chain.
pub trait FocusParticipant {
    /// Returns true if the widget can take keyboard focus.
    fn is_focusable(&self) -> bool;

    /// Grants or revokes focus.
    fn set_focused(&mut self, focused: bool);

    /// Returns true if the widget currently holds focus.
    fn is_focused(&self) -> bool;
}

/// The full widget contract: capability traits plus identity, the pointer
/// lifecycle hooks, per-frame update, cloning and persistence.
///
/// Pointer hooks receive positions in the widget's local space and may
/// emit signals. No hook may assume its converse will fire: a press is
/// not guaranteed a matching release (capture can be torn down by a
/// forced cancel), which is why [`Widget::left_mouse_button_no_longer_down`]
/// exists as the recovery path.
pub trait Widget: Drawable + HitTestable + FocusParticipant + std::fmt::Debug {
    /// Stable type tag ("Scrollbar", "TreeView", ...).
    fn type_name(&self) -> &'static str;

    /// Shared widget state.
    fn common(&self) -> &WidgetCommon;

    /// Shared widget state, mutable.
    fn common_mut(&mut self) -> &mut WidgetCommon;

    /// Replaces the position expression.
    fn set_position(&mut self, position: Layout2d) {
        self.common_mut().set_position(position);
    }

    /// Replaces the size expression. Overridden by widgets with auto-size
    /// or orientation behavior.
    fn set_size(&mut self, size: Layout2d) {
        self.common_mut().set_size(size);
    }

    /// Left button went down at a local position.
    fn left_mouse_pressed(&mut self, _pos: Vec2) {}

    /// Left button came up at a local position.
    fn left_mouse_released(&mut self, _pos: Vec2) {}

    /// Pointer moved to a local position.
    fn mouse_moved(&mut self, _pos: Vec2) {}

    /// Scroll wheel turned over the widget. Returns true when consumed.
    fn scrolled(&mut self, _delta: f32, _pos: Vec2) -> bool {
        false
    }

    /// Forced recovery: the left button is no longer down, with no
    /// matching release delivered (window lost focus, capture torn down).
    /// No interaction state may survive this call.
    fn left_mouse_button_no_longer_down(&mut self) {}

    /// The pointer left the widget.
    fn mouse_no_longer_on_widget(&mut self) {
        self.common_mut().flags_mut().clear(WidgetFlags::HOVERED);
    }

    /// Per-frame tick: lazily-checked timers (double click, auto-repeat)
    /// and deferred recomputation run here, before the draw pass.
    fn update(&mut self, _now: Instant) {}

    /// Deep, independent copy. Renderer bags stay shared per the
    /// copy-on-write policy; signal listeners are not copied.
    fn clone_boxed(&self) -> Box<dyn Widget>;

    /// Saves the widget (and any children) as a generic key-value tree.
    fn save(&self) -> WidgetNode;

    /// Restores the widget from a saved node.
    ///
    /// # Errors
    ///
    /// Missing/mistyped properties or unknown child type tags.
    fn load(&mut self, node: &WidgetNode, factory: &WidgetFactory) -> GuiResult<()>;

    /// Downcast to a container, if this widget owns children.
    fn as_container(&self) -> Option<&Container> {
        None
    }

    /// Mutable downcast to a container, if this widget owns children.
    fn as_container_mut(&mut self) -> Option<&mut Container> {
        None
    }
}

impl Clone for Box<dyn Widget> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}
