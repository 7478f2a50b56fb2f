//! End-to-end behavior of the widget tree: event routing through nested
//! containers, capture, focus, styling and persistence.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Instant;
use vellum_ui::event::Modifiers;
use vellum_ui::layout::{BindTarget, Binding, Layout2d, Length};
use vellum_ui::signal::{Signal, SignalKind};
use vellum_ui::style::{PropertyValue, Theme};
use vellum_ui::widget::Widget;
use vellum_ui::{
    Color, CommandRecorder, Container, Event, Gui, Key, Label, MouseButton, RenderCommand,
    Scrollbar, SpriteSheet, TextureHandle, TreeView, Vec2, WidgetFactory,
};

fn press(pos: Vec2) -> Event {
    Event::MouseButtonPressed {
        button: MouseButton::Left,
        pos,
    }
}

fn release(pos: Vec2) -> Event {
    Event::MouseButtonReleased {
        button: MouseButton::Left,
        pos,
    }
}

fn moved(pos: Vec2) -> Event {
    Event::MouseMoved { pos }
}

fn scrollbar(x: f32, y: f32) -> Box<Scrollbar> {
    let mut bar = Scrollbar::new();
    bar.set_position(Layout2d::constant(x, y));
    bar.set_maximum(100);
    bar.set_viewport_size(10);
    Box::new(bar)
}

#[test]
fn capture_routes_drag_through_overlapping_widgets() {
    let mut gui = Gui::new(Vec2::new(800.0, 600.0));
    let changed = Rc::new(Cell::new(0u32));

    let mut bar = Scrollbar::new();
    bar.set_position(Layout2d::constant(100.0, 100.0));
    bar.set_maximum(100);
    bar.set_viewport_size(10);
    let counter = Rc::clone(&changed);
    bar.on(SignalKind::ValueChanged, move |_| {
        counter.set(counter.get() + 1);
    })
    .unwrap();
    gui.add(Box::new(bar));

    // A label added later covers the top of the scrollbar, so it wins
    // hit testing there.
    let mut cover = Label::with_text("cover");
    Widget::set_size(&mut cover, Layout2d::constant(50.0, 20.0));
    cover.set_position(Layout2d::constant(90.0, 90.0));
    gui.add(Box::new(cover));
    gui.update(Instant::now());

    // Press on the scrollbar thumb, below the label.
    gui.handle_event(&press(Vec2::new(108.0, 125.0)));
    assert_eq!(gui.root().captured_index(), Some(0));

    // The drag crosses the covering label; capture keeps routing to the
    // scrollbar anyway.
    gui.handle_event(&moved(Vec2::new(110.0, 110.0)));
    gui.handle_event(&moved(Vec2::new(108.0, 250.0)));
    assert!(changed.get() > 0);

    gui.handle_event(&release(Vec2::new(108.0, 250.0)));
    assert_eq!(gui.root().captured_index(), None);

    // After release, hit testing applies again: a press at the overlap
    // goes to the label, not the scrollbar.
    let before = changed.get();
    gui.handle_event(&press(Vec2::new(100.0, 100.0)));
    assert_eq!(changed.get(), before);
}

#[test]
fn events_transform_into_nested_container_space() {
    let mut gui = Gui::new(Vec2::new(800.0, 600.0));

    let mut inner = Container::new();
    inner.set_position(Layout2d::constant(200.0, 100.0));
    Widget::set_size(&mut inner, Layout2d::constant(300.0, 300.0));
    inner.add(scrollbar(50.0, 20.0));
    gui.add(Box::new(inner));
    gui.update(Instant::now());

    // Global (258, 150) is (58, 50) in the inner container and (8, 30)
    // on the scrollbar: its thumb.
    assert!(gui.handle_event(&press(Vec2::new(258.0, 150.0))));
    let inner_ref = gui.root().widgets()[0].as_container().unwrap();
    assert_eq!(inner_ref.captured_index(), Some(0));

    // The same point shifted outside the scrollbar hits nothing.
    gui.handle_event(&release(Vec2::new(258.0, 150.0)));
    assert!(!gui.handle_event(&press(Vec2::new(790.0, 590.0))));
}

#[test]
fn tab_reaches_into_nested_containers_and_wraps() {
    let mut gui = Gui::new(Vec2::new(800.0, 600.0));
    gui.add(Box::new(Label::with_text("decoration")));

    let mut inner = Container::new();
    Widget::set_size(&mut inner, Layout2d::constant(300.0, 300.0));
    inner.add(scrollbar(0.0, 0.0));
    inner.add(scrollbar(40.0, 0.0));
    gui.add(Box::new(inner));
    gui.add(scrollbar(700.0, 0.0));
    gui.update(Instant::now());

    let tab = Event::KeyPressed {
        key: Key::Tab,
        modifiers: Modifiers::default(),
    };

    // Order: inner/0, inner/1, outer scrollbar, wrap to inner/0.
    assert!(gui.handle_event(&tab));
    assert_eq!(gui.root().focused_index(), Some(1));
    assert!(gui.handle_event(&tab));
    assert_eq!(gui.root().focused_index(), Some(1));
    assert!(gui.handle_event(&tab));
    assert_eq!(gui.root().focused_index(), Some(2));
    assert!(gui.handle_event(&tab));
    assert_eq!(gui.root().focused_index(), Some(1));
    let inner_ref = gui.root().widgets()[1].as_container().unwrap();
    assert_eq!(inner_ref.focused_index(), Some(0));
}

#[test]
fn scrollbar_invariant_holds_under_any_setter_order() {
    // Apply the same three settings in every order; the clamp invariant
    // must hold after each permutation.
    let orders: &[[u8; 3]] = &[
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    for order in orders {
        let mut bar = Scrollbar::new();
        for step in order {
            match step {
                0 => bar.set_maximum(30),
                1 => bar.set_viewport_size(8),
                _ => bar.set_value(1000),
            }
        }
        assert!(
            bar.value() <= bar.maximum().saturating_sub(bar.viewport_size()),
            "order {order:?} broke the clamp: value={} max={} viewport={}",
            bar.value(),
            bar.maximum(),
            bar.viewport_size()
        );
    }
}

#[test]
fn tree_view_add_remove_round_trip() {
    let mut tree = TreeView::new();
    assert!(tree.add_item(&["world", "region", "city"], true));
    assert!(tree.add_item(&["world", "region", "village"], true));

    // Removing both leaves with parent propagation empties the tree.
    assert!(tree.remove_item(&["world", "region", "city"], true));
    assert!(tree.remove_item(&["world", "region", "village"], true));
    assert!(tree.nodes().is_empty());

    // Ids freed by the removal are recycled without confusing paths.
    assert!(tree.add_item(&["a", "b"], true));
    assert!(tree.select_item(&["a", "b"]));
    assert_eq!(tree.selected_item(), Some(vec!["a".into(), "b".into()]));
}

#[test]
fn collapse_all_hides_descendants_from_hit_testing() {
    let mut tree = TreeView::new();
    tree.add_item(&["root", "child", "grandchild"], true);
    tree.add_item(&["root", "sibling"], true);
    let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));

    // Expanded: rows are root, child, grandchild, sibling.
    assert_eq!(
        tree.item_at(Vec2::new(10.0, 30.0)),
        Some(vec!["root".into(), "child".into()])
    );

    tree.collapse_all();
    assert_eq!(tree.item_at(Vec2::new(10.0, 10.0)), Some(vec!["root".into()]));
    assert_eq!(tree.item_at(Vec2::new(10.0, 30.0)), None);

    tree.expand_all();
    assert_eq!(
        tree.item_at(Vec2::new(10.0, 50.0)),
        Some(vec!["root".into(), "child".into(), "grandchild".into()])
    );
}

#[test]
fn tree_selection_survives_unrelated_removal() {
    let mut tree = TreeView::new();
    tree.add_item(&["alpha"], true);
    tree.add_item(&["beta", "leaf"], true);
    tree.add_item(&["gamma"], true);

    assert!(tree.select_item(&["gamma"]));
    assert!(tree.remove_item(&["alpha"], false));
    assert_eq!(tree.selected_item(), Some(vec!["gamma".into()]));

    assert!(tree.remove_item(&["gamma"], false));
    assert_eq!(tree.selected_item(), None);
}

#[test]
fn layout_binding_follows_sibling_geometry() {
    let mut gui = Gui::new(Vec2::new(800.0, 600.0));
    let mut anchor = Label::with_text("anchor");
    Widget::set_size(&mut anchor, Layout2d::constant(120.0, 30.0));
    anchor.set_position(Layout2d::constant(10.0, 10.0));
    let handle = anchor.common().geometry_handle();
    gui.add(Box::new(anchor));

    // Position the follower just right of the anchor.
    let mut follower = Label::with_text("follower");
    follower.set_position(Layout2d {
        x: Length::Bound(Binding::new(handle.clone(), BindTarget::Left))
            + Length::Bound(Binding::new(handle, BindTarget::Width)),
        y: Length::Constant(10.0),
    });
    gui.add(Box::new(follower));
    gui.update(Instant::now());

    assert_eq!(gui.root().widgets()[1].common().rect().x, 130.0);

    // Move the anchor; the follower reads the new geometry after the
    // next layout pass.
    gui.root_mut().widgets_mut()[0].set_position(Layout2d::constant(50.0, 10.0));
    gui.update(Instant::now());
    gui.root_mut().widgets_mut()[1]
        .common_mut()
        .parent_size_changed();
    gui.update(Instant::now());
    assert_eq!(gui.root().widgets()[1].common().rect().x, 170.0);
}

#[test]
fn theme_changes_propagate_to_drawn_colors() {
    let theme = Theme::from_toml_str(
        r#"
        name = "midnight"

        [widgets.Label]
        BackgroundColor = { r = 0.1, g = 0.2, b = 0.3, a = 1.0 }
        "#,
    )
    .unwrap();

    let mut gui = Gui::new(Vec2::new(800.0, 600.0));
    let label = Label::with_text("themed");
    let renderer = label.renderer();
    gui.add(Box::new(label));
    gui.update(Instant::now());

    let mut recorder = CommandRecorder::new();
    gui.draw(&mut recorder);
    let background_of = |commands: &[RenderCommand]| {
        commands.iter().find_map(|command| match command {
            RenderCommand::Rect { color, .. } => Some(*color),
            _ => None,
        })
    };
    // Default label background is transparent: no rect emitted.
    assert_eq!(background_of(recorder.commands()), None);

    theme.apply_to("Label", &renderer);
    recorder.clear();
    gui.draw(&mut recorder);
    assert_eq!(
        background_of(recorder.commands()),
        Some(Color::rgb(0.1, 0.2, 0.3))
    );

    // A direct property write lands on the next draw too.
    renderer.set_property("BackgroundColor", PropertyValue::Color(Color::WHITE));
    recorder.clear();
    gui.draw(&mut recorder);
    assert_eq!(background_of(recorder.commands()), Some(Color::WHITE));
}

#[test]
fn full_tree_save_load_round_trip() {
    let factory = WidgetFactory::with_builtins();
    let mut gui = Gui::new(Vec2::new(800.0, 600.0));

    let mut panel = Container::new();
    Widget::set_size(&mut panel, Layout2d::constant(400.0, 300.0));
    panel.add(Box::new(Label::with_text("inside panel")));
    panel.add(scrollbar(360.0, 0.0));
    gui.add(Box::new(panel));

    let mut tree = TreeView::new();
    tree.add_item(&["saved", "item"], true);
    tree.collapse(&["saved"]);
    gui.add(Box::new(tree));

    let mut sheet = SpriteSheet::new();
    sheet.set_texture(TextureHandle {
        id: 3,
        size: Vec2::new(64.0, 64.0),
    });
    sheet.set_grid(2, 2);
    sheet.set_visible_cell(1, 0);
    gui.add(Box::new(sheet));

    let node = gui.save();
    let mut restored = Gui::new(Vec2::new(800.0, 600.0));
    restored.load(&node, &factory).unwrap();
    assert_eq!(node, restored.save());

    // Structure survives with the right types and states.
    assert_eq!(restored.root().widgets()[1].type_name(), "TreeView");
    let tree_node = &node.children[1];
    assert!(!tree_node.children[0].get_bool("Expanded").unwrap());
}

#[test]
fn load_rejects_unknown_widget_type() {
    let factory = WidgetFactory::with_builtins();
    let node = vellum_ui::WidgetNode::new("Doodad");
    assert!(factory.build(&node).is_err());
}

#[test]
fn signal_handlers_receive_payloads() {
    let mut tree = TreeView::new();
    tree.add_item(&["files", "readme"], true);
    let _ = tree.common_mut().resolved_rect(Vec2::new(800.0, 600.0));

    let selected: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&selected);
    tree.on(SignalKind::ItemSelected, move |signal| {
        if let Signal::ItemSelected { path } = signal {
            sink.borrow_mut().push(path.join("/"));
        }
    })
    .unwrap();

    tree.select_item(&["files", "readme"]);
    assert_eq!(selected.borrow().as_slice(), ["files/readme"]);

    // Unknown signal names are rejected with the widget type attached.
    let err = tree
        .on(SignalKind::ValueChanged, |_| {})
        .unwrap_err();
    assert!(err.to_string().contains("TreeView"));
}
