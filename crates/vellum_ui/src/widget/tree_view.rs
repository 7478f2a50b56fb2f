//! Tree view widget: hierarchical items with expand/collapse, selection
//! and an embedded scrollbar.
//!
//! Nodes live in an arena indexed by [`NodeId`]; parent/child links are
//! ids, never references. What the user sees is the visible projection, a
//! flat pre-order list of ids that skips collapsed subtrees. The
//! projection is recomputed in full whenever structure or expansion
//! changes; it is never patched incrementally.

use crate::layout::Layout2d;
use crate::persist::{NodeValue, WidgetFactory, WidgetNode};
use crate::render::{RenderCommand, RenderStates, RenderTarget};
use crate::signal::{Signal, SignalKind, SignalTable};
use crate::style::{PropertyCache, Renderer};
use crate::widget::core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon, WidgetFlags};
use crate::widget::Scrollbar;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use vellum_shared::{Color, GuiResult, Rect, Vec2};

const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);
const INDENT_WIDTH: f32 = 16.0;
const SCROLLBAR_BREADTH: f32 = 16.0;
const TEXT_PADDING: f32 = 4.0;

/// Stable identity of a tree node. Ids are never reused while the node
/// is alive; freed slots go on a free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Node {
    text: String,
    depth: u32,
    expanded: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Read-only snapshot of a subtree, for inspection and persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstNode {
    /// The item's text.
    pub text: String,
    /// Whether the item is expanded.
    pub expanded: bool,
    /// Child snapshots in insertion order.
    pub nodes: Vec<ConstNode>,
}

/// A hierarchical item list with expandable branches.
#[derive(Debug)]
pub struct TreeView {
    common: WidgetCommon,
    signals: SignalTable,
    style: RefCell<PropertyCache>,
    arena: Vec<Option<Node>>,
    free: Vec<usize>,
    roots: Vec<NodeId>,
    visible: Vec<NodeId>,
    visible_dirty: bool,
    selected: Option<NodeId>,
    hovered: Option<usize>,
    item_height: f32,
    scrollbar: Scrollbar,
    scrollbar_captured: bool,
    last_click: Option<(Instant, NodeId)>,
}

impl TreeView {
    /// The persistence type tag.
    pub const TYPE_NAME: &'static str = "TreeView";

    const SIGNALS: &'static [SignalKind] = &[
        SignalKind::ItemSelected,
        SignalKind::DoubleClicked,
        SignalKind::Expanded,
        SignalKind::Collapsed,
    ];

    /// Creates an empty tree view.
    #[must_use]
    pub fn new() -> Self {
        let mut common = WidgetCommon::new();
        common.set_size(Layout2d::constant(200.0, 200.0));
        Self {
            common,
            signals: SignalTable::new(Self::TYPE_NAME, Self::SIGNALS),
            style: RefCell::new(PropertyCache::new(Renderer::new())),
            arena: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            visible: Vec::new(),
            visible_dirty: false,
            selected: None,
            hovered: None,
            item_height: 20.0,
            scrollbar: Scrollbar::new(),
            scrollbar_captured: false,
            last_click: None,
        }
    }

    fn node(&self, id: NodeId) -> &Node {
        self.arena[id.0].as_ref().unwrap_or_else(|| unreachable!("live id {id:?}"))
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.arena[id.0].as_mut().unwrap_or_else(|| unreachable!("live id {id:?}"))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(slot) = self.free.pop() {
            self.arena[slot] = Some(node);
            NodeId(slot)
        } else {
            self.arena.push(Some(node));
            NodeId(self.arena.len() - 1)
        }
    }

    /// Resolves a path to a node by matching text at each level. The
    /// first match wins among duplicate siblings.
    fn find_node(&self, path: &[&str]) -> Option<NodeId> {
        let mut level: &[NodeId] = &self.roots;
        let mut found = None;
        for component in path {
            found = level
                .iter()
                .copied()
                .find(|&id| self.node(id).text == *component);
            match found {
                Some(id) => level = &self.node(id).children,
                None => return None,
            }
        }
        found
    }

    /// The path from the root down to a node.
    fn path_of(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            path.push(self.node(current).text.clone());
            cursor = self.node(current).parent;
        }
        path.reverse();
        path
    }

    /// Adds an item at a path. When `create_parents` is set, missing
    /// intermediate items are created (expanded); otherwise a missing
    /// parent fails the call. The leaf is always appended, so duplicate
    /// leaf texts are allowed.
    pub fn add_item(&mut self, path: &[&str], create_parents: bool) -> bool {
        let Some((leaf, parents)) = path.split_last() else {
            return false;
        };

        let mut parent: Option<NodeId> = None;
        let mut depth = 0u32;
        for component in parents {
            let level: &[NodeId] = match parent {
                Some(id) => &self.node(id).children,
                None => &self.roots,
            };
            let existing = level
                .iter()
                .copied()
                .find(|&id| self.node(id).text == *component);
            let id = match existing {
                Some(id) => id,
                None if create_parents => {
                    let id = self.alloc(Node {
                        text: (*component).to_owned(),
                        depth,
                        expanded: true,
                        parent,
                        children: Vec::new(),
                    });
                    match parent {
                        Some(parent_id) => self.node_mut(parent_id).children.push(id),
                        None => self.roots.push(id),
                    }
                    id
                }
                None => return false,
            };
            parent = Some(id);
            depth += 1;
        }

        let id = self.alloc(Node {
            text: (*leaf).to_owned(),
            depth,
            expanded: true,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent_id) => self.node_mut(parent_id).children.push(id),
            None => self.roots.push(id),
        }
        self.visible_dirty = true;
        true
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.free_subtree(child);
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if let Some((_, clicked)) = self.last_click {
            if clicked == id {
                self.last_click = None;
            }
        }
        self.arena[id.0] = None;
        self.free.push(id.0);
    }

    fn detach(&mut self, id: NodeId) {
        let parent = self.node(id).parent;
        match parent {
            Some(parent_id) => {
                self.node_mut(parent_id).children.retain(|&child| child != id);
            }
            None => self.roots.retain(|&root| root != id),
        }
    }

    /// Removes the item at a path along with its subtree. With
    /// `remove_parents_when_empty`, ancestors left childless are removed
    /// as well, propagating upward.
    pub fn remove_item(&mut self, path: &[&str], remove_parents_when_empty: bool) -> bool {
        let Some(id) = self.find_node(path) else {
            return false;
        };
        let mut parent = self.node(id).parent;
        self.detach(id);
        self.free_subtree(id);

        if remove_parents_when_empty {
            while let Some(current) = parent {
                if !self.node(current).children.is_empty() {
                    break;
                }
                parent = self.node(current).parent;
                self.detach(current);
                self.free_subtree(current);
            }
        }
        self.visible_dirty = true;
        true
    }

    /// Removes every item.
    pub fn remove_all_items(&mut self) {
        self.arena.clear();
        self.free.clear();
        self.roots.clear();
        self.visible.clear();
        self.visible_dirty = false;
        self.selected = None;
        self.hovered = None;
        self.last_click = None;
    }

    fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if self.node(id).expanded == expanded {
            return false;
        }
        self.node_mut(id).expanded = expanded;
        self.visible_dirty = true;
        let path = self.path_of(id);
        let signal = if expanded {
            Signal::Expanded { path }
        } else {
            Signal::Collapsed { path }
        };
        self.signals.emit(&signal);
        true
    }

    /// Expands the item at a path. Idempotent: expanding an expanded
    /// item is a no-op and emits nothing.
    pub fn expand(&mut self, path: &[&str]) -> bool {
        match self.find_node(path) {
            Some(id) => {
                self.set_expanded(id, true);
                true
            }
            None => false,
        }
    }

    /// Collapses the item at a path. Idempotent like [`TreeView::expand`].
    pub fn collapse(&mut self, path: &[&str]) -> bool {
        match self.find_node(path) {
            Some(id) => {
                self.set_expanded(id, false);
                true
            }
            None => false,
        }
    }

    /// Expands every item, silently.
    pub fn expand_all(&mut self) {
        for slot in self.arena.iter_mut().flatten() {
            slot.expanded = true;
        }
        self.visible_dirty = true;
    }

    /// Collapses every item, silently.
    pub fn collapse_all(&mut self) {
        for slot in self.arena.iter_mut().flatten() {
            slot.expanded = false;
        }
        self.visible_dirty = true;
    }

    fn set_selected(&mut self, id: Option<NodeId>) {
        if self.selected == id {
            return;
        }
        self.selected = id;
        if let Some(selected) = id {
            let path = self.path_of(selected);
            self.signals.emit(&Signal::ItemSelected { path });
        }
    }

    /// Selects the item at a path, emitting [`SignalKind::ItemSelected`].
    pub fn select_item(&mut self, path: &[&str]) -> bool {
        match self.find_node(path) {
            Some(id) => {
                self.set_selected(Some(id));
                true
            }
            None => false,
        }
    }

    /// Clears the selection.
    pub fn deselect_item(&mut self) {
        self.set_selected(None);
    }

    /// The path of the selected item, if any.
    #[must_use]
    pub fn selected_item(&self) -> Option<Vec<String>> {
        self.selected.map(|id| self.path_of(id))
    }

    fn snapshot(&self, id: NodeId) -> ConstNode {
        let node = self.node(id);
        ConstNode {
            text: node.text.clone(),
            expanded: node.expanded,
            nodes: node.children.iter().map(|&child| self.snapshot(child)).collect(),
        }
    }

    /// Read-only snapshot of the whole tree.
    #[must_use]
    pub fn nodes(&self) -> Vec<ConstNode> {
        self.roots.iter().map(|&root| self.snapshot(root)).collect()
    }

    /// Sets the row height in pixels.
    pub fn set_item_height(&mut self, height: f32) {
        self.item_height = height.max(1.0);
    }

    /// The row height in pixels.
    #[must_use]
    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    /// Connects a listener for a supported signal.
    ///
    /// # Errors
    ///
    /// [`vellum_shared::GuiError::UnknownSignal`] for unsupported kinds.
    pub fn on(
        &mut self,
        kind: SignalKind,
        handler: impl FnMut(&Signal) + 'static,
    ) -> GuiResult<()> {
        self.signals.connect(kind, handler)
    }

    /// Shares another widget's renderer bag.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.style.borrow_mut().set_renderer(renderer);
    }

    /// The renderer feeding this tree view's style cache.
    #[must_use]
    pub fn renderer(&self) -> Renderer {
        self.style.borrow().renderer().clone()
    }

    /// Recomputes the visible projection if structure or expansion
    /// changed. Pre-order walk; collapsed subtrees are skipped entirely.
    fn ensure_visible(&mut self) {
        if !self.visible_dirty {
            return;
        }
        self.visible.clear();
        self.hovered = None;
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            self.visible.push(id);
            let node = self.node(id);
            if node.expanded {
                stack.extend(node.children.iter().rev());
            }
        }
        self.visible_dirty = false;
        tracing::trace!(visible = self.visible.len(), "tree projection rebuilt");
    }

    /// The visible projection, recomputing it first when stale.
    fn visible_ids(&mut self) -> &[NodeId] {
        self.ensure_visible();
        &self.visible
    }

    /// Number of currently visible rows.
    pub fn visible_count(&mut self) -> usize {
        self.visible_ids().len()
    }

    /// Positions and ranges the embedded scrollbar for the current
    /// content and resolved size.
    fn layout_scrollbar(&mut self) {
        self.ensure_visible();
        let size = self.common.rect().size();
        #[allow(clippy::cast_precision_loss)]
        let content = self.visible.len() as f32 * self.item_height;
        #[allow(clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        {
            self.scrollbar.set_maximum(content.max(0.0) as u32);
            self.scrollbar.set_viewport_size(size.y.max(0.0) as u32);
        }
        #[allow(clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        let amount = self.item_height as u32;
        self.scrollbar.set_scroll_amount(amount);
        Widget::set_size(
            &mut self.scrollbar,
            Layout2d::constant(SCROLLBAR_BREADTH, size.y),
        );
        let _ = self.scrollbar.common_mut().resolved_rect(size);
    }

    fn scrollbar_origin(&self) -> Vec2 {
        Vec2::new(self.common.rect().size().x - SCROLLBAR_BREADTH, 0.0)
    }

    #[allow(clippy::cast_precision_loss)]
    fn scroll_offset(&self) -> f32 {
        self.scrollbar.value() as f32
    }

    /// The visible row index under a local point, if any.
    fn row_at(&mut self, pos: Vec2) -> Option<usize> {
        self.layout_scrollbar();
        let size = self.common.rect().size();
        let content_width = if self.scrollbar.is_shown() {
            size.x - SCROLLBAR_BREADTH
        } else {
            size.x
        };
        if pos.x < 0.0 || pos.x >= content_width || pos.y < 0.0 || pos.y >= size.y {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        let index = ((pos.y + self.scroll_offset()) / self.item_height).floor() as usize;
        (index < self.visible.len()).then_some(index)
    }

    /// The path of the item under a local point, if any.
    pub fn item_at(&mut self, pos: Vec2) -> Option<Vec<String>> {
        let index = self.row_at(pos)?;
        Some(self.path_of(self.visible[index]))
    }

    fn over_scrollbar(&mut self, pos: Vec2) -> bool {
        self.layout_scrollbar();
        if !self.scrollbar.is_shown() {
            return false;
        }
        let local = pos - self.scrollbar_origin();
        self.scrollbar.is_mouse_on_widget(local)
    }
}

impl Default for TreeView {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for TreeView {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates) {
        if !self.common.is_visible() {
            return;
        }
        let states = states.faded(self.common.opacity());
        let size = self.common.rect().size();
        let local = Rect::from_pos_size(Vec2::ZERO, size);
        let mut style = self.style.borrow_mut();

        target.submit(RenderCommand::Rect {
            bounds: states.map(local),
            color: states.tint(style.color("BackgroundColor", Color::WHITE)),
        });
        target.submit(RenderCommand::PushClip {
            bounds: states.map(local),
        });

        let selected_color = style.color("SelectedBackgroundColor", Color::rgb(0.0, 0.4, 0.9));
        let text_color = style.color("TextColor", Color::BLACK);
        let selected_text_color = style.color("SelectedTextColor", Color::WHITE);
        let offset = self.scroll_offset();

        // A structural edit may have freed ids the projection still holds.
        // Draw cannot rebuild it (&self), so rows wait for the next update.
        let rows: &[NodeId] = if self.visible_dirty { &[] } else { &self.visible };
        for (index, &id) in rows.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let y = index as f32 * self.item_height - offset;
            if y + self.item_height < 0.0 || y > size.y {
                continue;
            }
            let node = self.node(id);
            let row = Rect::new(0.0, y, size.x, self.item_height);
            let is_selected = self.selected == Some(id);
            if is_selected {
                target.submit(RenderCommand::Rect {
                    bounds: states.map(row),
                    color: states.tint(selected_color),
                });
            } else if self.hovered == Some(index) {
                target.submit(RenderCommand::Rect {
                    bounds: states.map(row),
                    color: states.tint(selected_color.with_alpha(0.3)),
                });
            }

            #[allow(clippy::cast_precision_loss)]
            let indent = node.depth as f32 * INDENT_WIDTH;
            let marker = if node.children.is_empty() {
                " "
            } else if node.expanded {
                "-"
            } else {
                "+"
            };
            target.submit(RenderCommand::Text {
                text: format!("{marker} {}", node.text),
                pos: states.map(row).position() + Vec2::new(indent + TEXT_PADDING, 2.0),
                color: states.tint(if is_selected {
                    selected_text_color
                } else {
                    text_color
                }),
                font_size: self.item_height - 6.0,
            });
        }
        target.submit(RenderCommand::PopClip);

        self.scrollbar
            .draw(target, states.translated(self.scrollbar_origin()));
    }
}

impl HitTestable for TreeView {
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool {
        self.common.contains_local(pos)
    }
}

impl FocusParticipant for TreeView {
    fn is_focusable(&self) -> bool {
        true
    }

    fn set_focused(&mut self, focused: bool) {
        self.common.flags_mut().put(WidgetFlags::FOCUSED, focused);
    }

    fn is_focused(&self) -> bool {
        self.common.flags().has(WidgetFlags::FOCUSED)
    }
}

impl Widget for TreeView {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn common(&self) -> &WidgetCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut WidgetCommon {
        &mut self.common
    }

    fn left_mouse_pressed(&mut self, pos: Vec2) {
        if self.over_scrollbar(pos) {
            let local = pos - self.scrollbar_origin();
            self.scrollbar.left_mouse_pressed(local);
            self.scrollbar_captured = true;
            return;
        }
        if let Some(index) = self.row_at(pos) {
            let id = self.visible[index];
            self.set_selected(Some(id));
            if !self.node(id).children.is_empty() {
                let expanded = self.node(id).expanded;
                self.set_expanded(id, !expanded);
            }
        } else {
            self.set_selected(None);
        }
    }

    fn mouse_moved(&mut self, pos: Vec2) {
        self.common.flags_mut().set(WidgetFlags::HOVERED);
        if self.scrollbar_captured {
            let local = pos - self.scrollbar_origin();
            self.scrollbar.mouse_moved(local);
            return;
        }
        self.hovered = self.row_at(pos);
    }

    fn left_mouse_released(&mut self, pos: Vec2) {
        if self.scrollbar_captured {
            let local = pos - self.scrollbar_origin();
            self.scrollbar.left_mouse_released(local);
            self.scrollbar_captured = false;
            return;
        }
        // Leaf double click: two releases on the same item inside the
        // window.
        let Some(index) = self.row_at(pos) else {
            self.last_click = None;
            return;
        };
        let id = self.visible[index];
        if !self.node(id).children.is_empty() {
            self.last_click = None;
            return;
        }
        let now = Instant::now();
        if let Some((previous, clicked)) = self.last_click.take() {
            if clicked == id && now.duration_since(previous) <= DOUBLE_CLICK_WINDOW {
                let path = self.path_of(id);
                self.signals.emit(&Signal::DoubleClicked { path });
                return;
            }
        }
        self.last_click = Some((now, id));
    }

    fn left_mouse_button_no_longer_down(&mut self) {
        self.scrollbar.left_mouse_button_no_longer_down();
        self.scrollbar_captured = false;
        self.last_click = None;
    }

    fn mouse_no_longer_on_widget(&mut self) {
        self.common.flags_mut().clear(WidgetFlags::HOVERED);
        self.hovered = None;
    }

    fn scrolled(&mut self, delta: f32, _pos: Vec2) -> bool {
        self.layout_scrollbar();
        if !self.scrollbar.is_shown() {
            return false;
        }
        self.scrollbar.scrolled(delta, Vec2::ZERO)
    }

    fn update(&mut self, now: Instant) {
        self.layout_scrollbar();
        self.scrollbar.update(now);
    }

    fn clone_boxed(&self) -> Box<dyn Widget> {
        Box::new(Self {
            common: self.common.clone(),
            signals: self.signals.respec(),
            style: RefCell::new(self.style.borrow().clone()),
            arena: self.arena.clone(),
            free: self.free.clone(),
            roots: self.roots.clone(),
            visible: self.visible.clone(),
            visible_dirty: self.visible_dirty,
            selected: self.selected,
            hovered: None,
            item_height: self.item_height,
            scrollbar: self.scrollbar.detached_copy(),
            scrollbar_captured: false,
            last_click: None,
        })
    }

    fn save(&self) -> WidgetNode {
        fn save_node(tree: &TreeView, id: NodeId) -> WidgetNode {
            let node = tree.node(id);
            let mut item = WidgetNode::new("Item");
            item.set("Text", NodeValue::Text(node.text.clone()));
            item.set("Expanded", NodeValue::Bool(node.expanded));
            item.children = node.children.iter().map(|&child| save_node(tree, child)).collect();
            item
        }

        let mut node = WidgetNode::new(Self::TYPE_NAME);
        self.common.save_into(&mut node);
        node.set("ItemHeight", NodeValue::Float(self.item_height));
        node.children = self.roots.iter().map(|&root| save_node(self, root)).collect();
        node
    }

    fn load(&mut self, node: &WidgetNode, _factory: &WidgetFactory) -> GuiResult<()> {
        fn load_node(
            tree: &mut TreeView,
            item: &WidgetNode,
            parent: Option<NodeId>,
            depth: u32,
        ) -> GuiResult<()> {
            let id = tree.alloc(Node {
                text: item.get_text("Text")?.to_owned(),
                depth,
                expanded: item.get_bool("Expanded")?,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(parent_id) => tree.node_mut(parent_id).children.push(id),
                None => tree.roots.push(id),
            }
            for child in &item.children {
                load_node(tree, child, Some(id), depth + 1)?;
            }
            Ok(())
        }

        self.common.load_from(node)?;
        self.item_height = node.get_float("ItemHeight")?;
        self.remove_all_items();
        for item in &node.children {
            load_node(self, item, None, 0)?;
        }
        self.visible_dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeView {
        let mut tree = TreeView::new();
        tree.add_item(&["vehicles", "cars", "sedan"], true);
        tree.add_item(&["vehicles", "cars", "coupe"], true);
        tree.add_item(&["vehicles", "bikes"], true);
        tree.add_item(&["plants"], true);
        tree
    }

    #[test]
    fn test_add_item_creates_parents() {
        let mut tree = sample();
        let nodes = tree.nodes();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].text, "vehicles");
        assert_eq!(nodes[0].nodes[0].text, "cars");
        assert_eq!(nodes[0].nodes[0].nodes.len(), 2);

        // Without create_parents a missing parent fails.
        assert!(!tree.add_item(&["missing", "child"], false));
        // An existing parent works without the flag.
        assert!(tree.add_item(&["vehicles", "trucks"], false));
    }

    #[test]
    fn test_remove_item_propagates_empty_parents() {
        let mut tree = TreeView::new();
        tree.add_item(&["a", "b", "c"], true);
        assert!(tree.remove_item(&["a", "b", "c"], true));
        assert!(tree.nodes().is_empty());

        tree.add_item(&["a", "b", "c"], true);
        tree.add_item(&["a", "d"], true);
        assert!(tree.remove_item(&["a", "b", "c"], true));
        let nodes = tree.nodes();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].nodes.len(), 1);
        assert_eq!(nodes[0].nodes[0].text, "d");

        // Without the flag the empty parent stays.
        tree.add_item(&["a", "b", "c"], true);
        assert!(tree.remove_item(&["a", "b", "c"], false));
        assert_eq!(tree.nodes()[0].nodes.len(), 2);
    }

    #[test]
    fn test_removing_selected_subtree_clears_selection() {
        let mut tree = sample();
        assert!(tree.select_item(&["vehicles", "cars", "sedan"]));
        assert!(tree.remove_item(&["vehicles", "cars"], false));
        assert_eq!(tree.selected_item(), None);
    }

    #[test]
    fn test_collapse_hides_descendants_from_projection() {
        let mut tree = sample();
        assert_eq!(tree.visible_count(), 6);

        assert!(tree.collapse(&["vehicles", "cars"]));
        assert_eq!(tree.visible_count(), 4);

        tree.collapse_all();
        assert_eq!(tree.visible_count(), 2);

        tree.expand_all();
        assert_eq!(tree.visible_count(), 6);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut tree = sample();
        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);
        tree.on(SignalKind::Collapsed, move |_| {
            counter.set(counter.get() + 1);
        })
        .unwrap();

        assert!(tree.collapse(&["vehicles"]));
        assert!(tree.collapse(&["vehicles"]));
        assert_eq!(fired.get(), 1);
        assert!(!tree.collapse(&["no-such-item"]));
    }

    #[test]
    fn test_item_at_respects_collapse() {
        let mut tree = sample();
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));

        // Row 2 is "sedan" while expanded.
        assert_eq!(
            tree.item_at(Vec2::new(10.0, 2.0 * 20.0 + 5.0)),
            Some(vec!["vehicles".into(), "cars".into(), "sedan".into()])
        );

        tree.collapse_all();
        assert_eq!(
            tree.item_at(Vec2::new(10.0, 25.0)),
            Some(vec!["plants".into()])
        );
        assert_eq!(tree.item_at(Vec2::new(10.0, 45.0)), None);
    }

    #[test]
    fn test_press_selects_and_toggles_branches() {
        use std::cell::RefCell as Cell2;
        use std::rc::Rc;

        let mut tree = sample();
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));

        let log: Rc<Cell2<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&log);
        tree.on(SignalKind::ItemSelected, move |signal| {
            if let Signal::ItemSelected { path } = signal {
                sink.borrow_mut().push(path.join("/"));
            }
        })
        .unwrap();

        // Press row 0 ("vehicles"): selects it and collapses the branch.
        tree.left_mouse_pressed(Vec2::new(10.0, 5.0));
        assert_eq!(log.borrow().as_slice(), ["vehicles"]);
        assert_eq!(tree.visible_count(), 2);

        // Pressing again re-expands without re-emitting a selection.
        tree.left_mouse_pressed(Vec2::new(10.0, 5.0));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(tree.visible_count(), 6);
    }

    #[test]
    fn test_double_click_on_leaf() {
        use std::cell::RefCell as Cell2;
        use std::rc::Rc;

        let mut tree = sample();
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));

        let log: Rc<Cell2<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&log);
        tree.on(SignalKind::DoubleClicked, move |signal| {
            if let Signal::DoubleClicked { path } = signal {
                sink.borrow_mut().push(path.join("/"));
            }
        })
        .unwrap();

        // Row 4 is the "bikes" leaf.
        let bikes = Vec2::new(10.0, 4.0 * 20.0 + 5.0);
        tree.left_mouse_released(bikes);
        tree.left_mouse_released(bikes);
        assert_eq!(log.borrow().as_slice(), ["vehicles/bikes"]);

        // No double click across branch rows.
        let branch = Vec2::new(10.0, 5.0);
        tree.left_mouse_released(branch);
        tree.left_mouse_released(branch);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_scrollbar_ranges_track_content() {
        let mut tree = TreeView::new();
        Widget::set_size(&mut tree, Layout2d::constant(200.0, 100.0));
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));
        for index in 0..20 {
            tree.add_item(&[&format!("item {index}")], true);
        }
        tree.update(Instant::now());

        assert_eq!(tree.scrollbar.maximum(), 400);
        assert_eq!(tree.scrollbar.viewport_size(), 100);
        assert!(tree.scrollbar.is_shown());

        // Scrolling shifts which item sits at the top.
        assert!(tree.scrolled(-1.0, Vec2::ZERO));
        assert_eq!(tree.scroll_offset(), 20.0);
        assert_eq!(tree.item_at(Vec2::new(10.0, 5.0)), Some(vec!["item 1".into()]));
    }

    #[test]
    fn test_draw_skips_rows_while_projection_is_stale() {
        use crate::render::CommandRecorder;

        let mut tree = TreeView::new();
        Widget::set_size(&mut tree, Layout2d::constant(200.0, 100.0));
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));
        tree.add_item(&["a", "b"], true);
        tree.update(Instant::now());
        assert!(tree.remove_item(&["a", "b"], true));

        // Between the removal and the next update the projection still
        // holds freed ids; a frame drawn in that window has no rows.
        let mut recorder = CommandRecorder::new();
        tree.draw(&mut recorder, RenderStates::DEFAULT);
        assert!(!recorder
            .commands()
            .iter()
            .any(|command| matches!(command, RenderCommand::Text { .. })));

        tree.add_item(&["c"], true);
        tree.update(Instant::now());
        recorder.clear();
        tree.draw(&mut recorder, RenderStates::DEFAULT);
        assert!(recorder
            .commands()
            .iter()
            .any(|command| matches!(command, RenderCommand::Text { .. })));
    }

    #[test]
    fn test_clone_keeps_scroll_position() {
        use crate::render::CommandRecorder;

        let mut tree = TreeView::new();
        Widget::set_size(&mut tree, Layout2d::constant(200.0, 100.0));
        let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));
        for index in 0..20 {
            tree.add_item(&[&format!("item {index}")], true);
        }
        tree.update(Instant::now());
        assert!(tree.scrolled(-2.0, Vec2::ZERO));
        assert_eq!(tree.scroll_offset(), 40.0);

        let copy = tree.clone_boxed();
        let mut recorder = CommandRecorder::new();
        copy.draw(&mut recorder, RenderStates::DEFAULT);
        let texts: Vec<&str> = recorder
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(!texts.iter().any(|text| text.ends_with("item 0")));
        assert!(texts.iter().any(|text| text.ends_with("item 2")));
    }

    #[test]
    fn test_save_load_round_trip() {
        let factory = WidgetFactory::with_builtins();
        let mut tree = sample();
        tree.collapse(&["vehicles", "cars"]);
        tree.set_item_height(24.0);

        let node = tree.save();
        let restored = factory.build(&node).unwrap();
        assert_eq!(node, restored.save());
    }
}
