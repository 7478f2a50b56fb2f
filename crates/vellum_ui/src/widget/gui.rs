//! Top-level entry point: owns the root container and translates window
//! events into widget hooks.

use crate::event::{Event, Key, MouseButton};
use crate::persist::{WidgetFactory, WidgetNode};
use crate::render::{RenderStates, RenderTarget};
use crate::widget::core::{Drawable, Widget};
use crate::widget::Container;
use std::time::Instant;
use vellum_shared::{GuiResult, Vec2};

/// The root of a widget tree, sized to the view it fills.
///
/// Per frame: feed window events through [`Gui::handle_event`], tick
/// [`Gui::update`], then [`Gui::draw`]. `update` runs the lazy timers and
/// layout, so draw observes a settled tree.
#[derive(Debug)]
pub struct Gui {
    root: Container,
    view_size: Vec2,
}

impl Gui {
    /// Creates a GUI filling a view of the given size.
    #[must_use]
    pub fn new(view_size: Vec2) -> Self {
        let mut root = Container::new();
        Widget::set_size(&mut root, crate::layout::Layout2d::constant(view_size.x, view_size.y));
        let _ = root.common_mut().resolved_rect(view_size);
        Self { root, view_size }
    }

    /// The view size events are interpreted against.
    #[must_use]
    pub fn view_size(&self) -> Vec2 {
        self.view_size
    }

    /// The root container.
    #[must_use]
    pub fn root(&self) -> &Container {
        &self.root
    }

    /// The root container, mutable.
    pub fn root_mut(&mut self) -> &mut Container {
        &mut self.root
    }

    /// Adds a widget to the root. Returns its index.
    pub fn add(&mut self, widget: Box<dyn Widget>) -> usize {
        self.root.add(widget)
    }

    /// Routes a window event into the widget tree. Returns true when the
    /// event was consumed by a widget.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match *event {
            Event::MouseButtonPressed { button, pos } => {
                if button != MouseButton::Left {
                    return false;
                }
                self.root.ensure_layout();
                let consumed = self.root.has_widget_at(pos);
                self.root.left_mouse_pressed(pos);
                consumed
            }
            Event::MouseButtonReleased { button, pos } => {
                if button != MouseButton::Left {
                    return false;
                }
                self.root.ensure_layout();
                let consumed =
                    self.root.captured_index().is_some() || self.root.has_widget_at(pos);
                self.root.left_mouse_released(pos);
                consumed
            }
            Event::MouseMoved { pos } => {
                self.root.ensure_layout();
                let consumed =
                    self.root.captured_index().is_some() || self.root.has_widget_at(pos);
                self.root.mouse_moved(pos);
                consumed
            }
            Event::MouseWheelScrolled { delta, pos } => self.root.scrolled(delta, pos),
            Event::MouseLeft => {
                self.root.mouse_no_longer_on_widget();
                false
            }
            Event::KeyPressed { key, modifiers } => {
                if key == Key::Tab {
                    if modifiers.shift {
                        self.root.focus_previous_widget()
                    } else {
                        self.root.focus_next_widget()
                    }
                } else {
                    false
                }
            }
            Event::Resized { size } => {
                tracing::debug!(width = size.x, height = size.y, "view resized");
                self.view_size = size;
                Widget::set_size(
                    &mut self.root,
                    crate::layout::Layout2d::constant(size.x, size.y),
                );
                let _ = self.root.common_mut().resolved_rect(size);
                true
            }
            Event::LostFocus => {
                self.root.left_mouse_button_no_longer_down();
                false
            }
        }
    }

    /// Per-frame tick: lazy layout and timers, before the draw pass.
    pub fn update(&mut self, now: Instant) {
        let _ = self.root.common_mut().resolved_rect(self.view_size);
        self.root.update(now);
    }

    /// Draws the whole tree.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.root.draw(target, RenderStates::DEFAULT);
    }

    /// Saves the widget tree as a generic node tree.
    #[must_use]
    pub fn save(&self) -> WidgetNode {
        self.root.save()
    }

    /// Restores the widget tree from a saved node.
    ///
    /// # Errors
    ///
    /// Unknown widget type tags or missing/mistyped properties.
    pub fn load(&mut self, node: &WidgetNode, factory: &WidgetFactory) -> GuiResult<()> {
        self.root.load(node, factory)?;
        // The saved root geometry is replaced by the live view size.
        Widget::set_size(
            &mut self.root,
            crate::layout::Layout2d::constant(self.view_size.x, self.view_size.y),
        );
        let _ = self.root.common_mut().resolved_rect(self.view_size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use crate::layout::Layout2d;
    use crate::widget::Scrollbar;

    fn gui_with_scrollbars() -> Gui {
        let mut gui = Gui::new(Vec2::new(800.0, 600.0));
        for x in [0.0, 40.0] {
            let mut bar = Scrollbar::new();
            bar.set_position(Layout2d::constant(x, 0.0));
            bar.set_maximum(100);
            bar.set_viewport_size(10);
            gui.add(Box::new(bar));
        }
        gui
    }

    #[test]
    fn test_tab_cycles_focus() {
        let mut gui = gui_with_scrollbars();
        let tab = Event::KeyPressed {
            key: Key::Tab,
            modifiers: Modifiers::default(),
        };
        assert!(gui.handle_event(&tab));
        assert_eq!(gui.root().focused_index(), Some(0));
        assert!(gui.handle_event(&tab));
        assert_eq!(gui.root().focused_index(), Some(1));
        assert!(gui.handle_event(&tab));
        assert_eq!(gui.root().focused_index(), Some(0));

        let back_tab = Event::KeyPressed {
            key: Key::Tab,
            modifiers: Modifiers {
                shift: true,
                ..Modifiers::default()
            },
        };
        assert!(gui.handle_event(&back_tab));
        assert_eq!(gui.root().focused_index(), Some(1));
    }

    #[test]
    fn test_press_reports_consumption() {
        let mut gui = gui_with_scrollbars();
        let on_widget = Event::MouseButtonPressed {
            button: MouseButton::Left,
            pos: Vec2::new(8.0, 80.0),
        };
        assert!(gui.handle_event(&on_widget));

        let off_widget = Event::MouseButtonPressed {
            button: MouseButton::Left,
            pos: Vec2::new(700.0, 500.0),
        };
        // Still dispatched (it unfocuses), but nothing consumed it.
        assert!(!gui.handle_event(&off_widget));

        let right_button = Event::MouseButtonPressed {
            button: MouseButton::Right,
            pos: Vec2::new(8.0, 80.0),
        };
        assert!(!gui.handle_event(&right_button));
    }

    #[test]
    fn test_resize_relayouts_relative_children() {
        let mut gui = Gui::new(Vec2::new(800.0, 600.0));
        let mut bar = Scrollbar::new();
        bar.set_position(Layout2d::relative(0.5, 0.0));
        gui.add(Box::new(bar));
        gui.update(Instant::now());

        assert_eq!(gui.root().widgets()[0].common().rect().x, 400.0);

        assert!(gui.handle_event(&Event::Resized {
            size: Vec2::new(400.0, 600.0),
        }));
        gui.update(Instant::now());
        assert_eq!(gui.root().widgets()[0].common().rect().x, 200.0);
    }

    #[test]
    fn test_lost_focus_cancels_capture() {
        let mut gui = gui_with_scrollbars();
        gui.handle_event(&Event::MouseButtonPressed {
            button: MouseButton::Left,
            pos: Vec2::new(8.0, 30.0),
        });
        assert_eq!(gui.root().captured_index(), Some(0));

        gui.handle_event(&Event::LostFocus);
        assert_eq!(gui.root().captured_index(), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let factory = WidgetFactory::with_builtins();
        let gui = gui_with_scrollbars();
        let node = gui.save();

        let mut restored = Gui::new(Vec2::new(800.0, 600.0));
        restored.load(&node, &factory).unwrap();
        assert_eq!(node, restored.save());
    }
}
