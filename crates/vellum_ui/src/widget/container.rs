//! Widget container: child ownership, hit testing, pointer capture and
//! the keyboard focus chain.
//!
//! Children are stored in insertion order; drawing walks that order
//! front to back while hit testing walks it in reverse, so the last
//! widget added sits on top. Pointer positions handed to a child are
//! translated into that child's local space first.

use crate::layout::Layout2d;
use crate::persist::{WidgetFactory, WidgetNode};
use crate::render::{RenderCommand, RenderStates, RenderTarget};
use crate::style::{PropertyCache, Renderer};
use crate::widget::core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon};
use std::cell::RefCell;
use std::time::Instant;
use vellum_shared::{Color, GuiResult, Rect, Vec2};

/// A widget owning an ordered list of children.
///
/// Capture invariant: once a press lands on a child, every pointer event
/// until the matching release (or a forced cancel) goes to that child,
/// bypassing hit testing. At most one child holds capture at a time.
#[derive(Debug)]
pub struct Container {
    common: WidgetCommon,
    style: RefCell<PropertyCache>,
    children: Vec<Box<dyn Widget>>,
    focus: Option<usize>,
    capture: Option<usize>,
    hovered: Option<usize>,
}

impl Container {
    /// The persistence type tag.
    pub const TYPE_NAME: &'static str = "Container";

    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: WidgetCommon::new(),
            style: RefCell::new(PropertyCache::new(Renderer::new())),
            children: Vec::new(),
            focus: None,
            capture: None,
            hovered: None,
        }
    }

    /// Appends a child on top of the existing ones. Returns its index.
    pub fn add(&mut self, mut widget: Box<dyn Widget>) -> usize {
        widget.common_mut().parent_size_changed();
        self.children.push(widget);
        self.children.len() - 1
    }

    /// Removes the child at an index, fixing up focus, capture and hover
    /// bookkeeping. Returns the removed widget.
    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Widget>> {
        if index >= self.children.len() {
            return None;
        }
        let widget = self.children.remove(index);
        self.focus = shift_index(self.focus, index);
        self.capture = shift_index(self.capture, index);
        self.hovered = shift_index(self.hovered, index);
        Some(widget)
    }

    /// Removes every child.
    pub fn remove_all_widgets(&mut self) {
        self.children.clear();
        self.focus = None;
        self.capture = None;
        self.hovered = None;
    }

    /// The children, bottom to top.
    #[must_use]
    pub fn widgets(&self) -> &[Box<dyn Widget>] {
        &self.children
    }

    /// The children, mutable.
    pub fn widgets_mut(&mut self) -> &mut [Box<dyn Widget>] {
        &mut self.children
    }

    /// Index of the child holding keyboard focus, or holding it deeper
    /// in its subtree.
    #[must_use]
    pub fn focused_index(&self) -> Option<usize> {
        self.focus
    }

    /// Index of the child holding pointer capture.
    #[must_use]
    pub fn captured_index(&self) -> Option<usize> {
        self.capture
    }

    /// Shares another widget's renderer bag.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.style.borrow_mut().set_renderer(renderer);
    }

    /// Re-resolves every child's geometry against this container's size.
    pub fn ensure_layout(&mut self) {
        let size = self.common.rect().size();
        for child in &mut self.children {
            let _ = child.common_mut().resolved_rect(size);
        }
    }

    /// The topmost visible, enabled child under a container-local point.
    fn topmost_child_at(&self, pos: Vec2) -> Option<usize> {
        for index in (0..self.children.len()).rev() {
            let child = &self.children[index];
            if !child.common().is_visible() || !child.common().is_enabled() {
                continue;
            }
            let local = pos - child.common().rect().position();
            if child.is_mouse_on_widget(local) {
                return Some(index);
            }
        }
        None
    }

    /// Returns true when a visible, enabled child sits under the
    /// container-local point.
    #[must_use]
    pub fn has_widget_at(&self, pos: Vec2) -> bool {
        self.topmost_child_at(pos).is_some()
    }

    fn child_local(&self, index: usize, pos: Vec2) -> Vec2 {
        pos - self.children[index].common().rect().position()
    }

    fn set_focus(&mut self, index: Option<usize>) {
        if self.focus == index {
            return;
        }
        if let Some(old) = self.focus {
            self.children[old].set_focused(false);
        }
        self.focus = index;
        if let Some(new) = index {
            self.children[new].set_focused(true);
        }
    }

    /// Records that focus lives somewhere inside the child container at
    /// `index`, without granting the container focus itself.
    fn set_focus_path(&mut self, index: usize) {
        if self.focus == Some(index) {
            return;
        }
        if let Some(old) = self.focus {
            self.children[old].set_focused(false);
        }
        self.focus = Some(index);
    }

    /// Moves focus to the next focusable widget in insertion order,
    /// recursing into child containers and wrapping around. Returns
    /// false when the subtree has no focusable widget.
    pub fn focus_next_widget(&mut self) -> bool {
        // A failed advance clears focus, so the retry starts over from
        // the beginning: that is the wrap-around.
        self.advance_focus(true) || self.advance_focus(true)
    }

    /// Like [`Container::focus_next_widget`] but walking backwards.
    pub fn focus_previous_widget(&mut self) -> bool {
        self.advance_focus(false) || self.advance_focus(false)
    }

    /// Advances focus strictly past the current position, without
    /// wrapping. Clears focus and returns false when this subtree is
    /// exhausted, letting the parent level move on.
    fn advance_focus(&mut self, forward: bool) -> bool {
        let count = self.children.len();
        if count == 0 {
            return false;
        }
        // The focused subtree advances internally before focus moves on.
        if let Some(current) = self.focus {
            if let Some(inner) = self.children[current].as_container_mut() {
                if inner.advance_focus(forward) {
                    return true;
                }
            }
        }
        let candidates: Vec<usize> = match (self.focus, forward) {
            (Some(current), true) => (current + 1..count).collect(),
            (Some(current), false) => (0..current).rev().collect(),
            (None, true) => (0..count).collect(),
            (None, false) => (0..count).rev().collect(),
        };
        for index in candidates {
            let child = &mut self.children[index];
            if !child.common().is_visible() || !child.common().is_enabled() {
                continue;
            }
            if child.is_focusable() {
                self.set_focus(Some(index));
                return true;
            }
            if let Some(inner) = child.as_container_mut() {
                if inner.advance_focus(forward) {
                    self.set_focus_path(index);
                    return true;
                }
            }
        }
        self.set_focus(None);
        false
    }
}

fn shift_index(slot: Option<usize>, removed: usize) -> Option<usize> {
    match slot {
        Some(index) if index == removed => None,
        Some(index) if index > removed => Some(index - 1),
        other => other,
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for Container {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates) {
        if !self.common.is_visible() {
            return;
        }
        let states = states.faded(self.common.opacity());
        let local = Rect::from_pos_size(Vec2::ZERO, self.common.rect().size());

        let background = self
            .style
            .borrow_mut()
            .color("BackgroundColor", Color::TRANSPARENT);
        if background.a > 0.0 {
            target.submit(RenderCommand::Rect {
                bounds: states.map(local),
                color: states.tint(background),
            });
        }
        target.submit(RenderCommand::PushClip {
            bounds: states.map(local),
        });
        for child in &self.children {
            if child.common().is_visible() {
                child.draw(target, states.translated(child.common().rect().position()));
            }
        }
        target.submit(RenderCommand::PopClip);
    }
}

impl HitTestable for Container {
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool {
        self.common.contains_local(pos)
    }
}

impl FocusParticipant for Container {
    /// A container is never focused itself; focus lives in its subtree.
    fn is_focusable(&self) -> bool {
        false
    }

    fn set_focused(&mut self, focused: bool) {
        if !focused {
            self.set_focus(None);
        }
    }

    fn is_focused(&self) -> bool {
        self.focus.is_some()
    }
}

impl Widget for Container {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn common(&self) -> &WidgetCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut WidgetCommon {
        &mut self.common
    }

    /// Resizing a container makes every child's geometry stale.
    fn set_size(&mut self, size: Layout2d) {
        self.common.set_size(size);
        for child in &mut self.children {
            child.common_mut().parent_size_changed();
        }
    }

    fn left_mouse_pressed(&mut self, pos: Vec2) {
        self.ensure_layout();
        match self.topmost_child_at(pos) {
            Some(index) => {
                let local = self.child_local(index, pos);
                self.capture = Some(index);
                tracing::trace!(
                    index,
                    widget = self.children[index].type_name(),
                    "pointer capture granted"
                );
                self.children[index].left_mouse_pressed(local);
                if self.children[index].is_focusable() {
                    self.set_focus(Some(index));
                } else if self.children[index].as_container().is_some() {
                    self.set_focus_path(index);
                } else {
                    self.set_focus(None);
                }
            }
            None => self.set_focus(None),
        }
    }

    fn mouse_moved(&mut self, pos: Vec2) {
        self.ensure_layout();
        if let Some(index) = self.capture {
            let local = self.child_local(index, pos);
            self.children[index].mouse_moved(local);
            return;
        }
        let hit = self.topmost_child_at(pos);
        if self.hovered != hit {
            if let Some(old) = self.hovered {
                self.children[old].mouse_no_longer_on_widget();
            }
            self.hovered = hit;
        }
        if let Some(index) = hit {
            let local = self.child_local(index, pos);
            self.children[index].mouse_moved(local);
        }
    }

    fn left_mouse_released(&mut self, pos: Vec2) {
        self.ensure_layout();
        if let Some(index) = self.capture.take() {
            tracing::trace!(index, "pointer capture released");
            let local = self.child_local(index, pos);
            self.children[index].left_mouse_released(local);
            return;
        }
        if let Some(index) = self.topmost_child_at(pos) {
            let local = self.child_local(index, pos);
            self.children[index].left_mouse_released(local);
        }
    }

    /// Forced cancel fans out to every child; no capture survives.
    fn left_mouse_button_no_longer_down(&mut self) {
        self.capture = None;
        for child in &mut self.children {
            child.left_mouse_button_no_longer_down();
        }
    }

    fn mouse_no_longer_on_widget(&mut self) {
        if let Some(index) = self.hovered.take() {
            self.children[index].mouse_no_longer_on_widget();
        }
    }

    fn scrolled(&mut self, delta: f32, pos: Vec2) -> bool {
        self.ensure_layout();
        if let Some(index) = self.capture {
            let local = self.child_local(index, pos);
            return self.children[index].scrolled(delta, local);
        }
        if let Some(index) = self.topmost_child_at(pos) {
            let local = self.child_local(index, pos);
            return self.children[index].scrolled(delta, local);
        }
        false
    }

    fn update(&mut self, now: Instant) {
        self.ensure_layout();
        for child in &mut self.children {
            child.update(now);
        }
    }

    fn clone_boxed(&self) -> Box<dyn Widget> {
        Box::new(Self {
            common: self.common.clone(),
            style: RefCell::new(self.style.borrow().clone()),
            children: self.children.clone(),
            focus: self.focus,
            capture: None,
            hovered: None,
        })
    }

    fn save(&self) -> WidgetNode {
        let mut node = WidgetNode::new(Self::TYPE_NAME);
        self.common.save_into(&mut node);
        node.children = self.children.iter().map(|child| child.save()).collect();
        node
    }

    fn load(&mut self, node: &WidgetNode, factory: &WidgetFactory) -> GuiResult<()> {
        self.common.load_from(node)?;
        self.remove_all_widgets();
        for child in &node.children {
            self.children.push(factory.build(child)?);
        }
        Ok(())
    }

    fn as_container(&self) -> Option<&Container> {
        Some(self)
    }

    fn as_container_mut(&mut self) -> Option<&mut Container> {
        Some(self)
    }
}
