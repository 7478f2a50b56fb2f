//! Static text widget with alignment and auto-sizing.

use crate::persist::{NodeValue, WidgetFactory, WidgetNode};
use crate::render::{RenderCommand, RenderStates, RenderTarget};
use crate::signal::{Signal, SignalKind, SignalTable};
use crate::style::{Outline, PropertyCache, Renderer};
use crate::widget::core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon, WidgetFlags};
use crate::layout::Layout2d;
use std::cell::RefCell;
use std::time::{Duration, Instant};
use vellum_shared::{Color, GuiError, GuiResult, Vec2};

/// Metrics for the built-in monospace layout model. Text is measured, not
/// rasterized, at this level; the backend that consumes [`RenderCommand::Text`]
/// must use the same ratios for pixel-exact alignment.
const CHAR_WIDTH_RATIO: f32 = 0.6;
const LINE_HEIGHT_RATIO: f32 = 1.2;
const TEXT_PADDING: f32 = 2.0;

/// Window inside which a second click counts as a double click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(500);

/// Horizontal text placement inside the label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Flush against the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush against the right edge.
    Right,
}

impl HorizontalAlignment {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Center => "Center",
            Self::Right => "Right",
        }
    }

    fn from_str(text: &str) -> GuiResult<Self> {
        match text {
            "Left" => Ok(Self::Left),
            "Center" => Ok(Self::Center),
            "Right" => Ok(Self::Right),
            other => Err(GuiError::InvalidConfig(format!(
                "unknown horizontal alignment '{other}'"
            ))),
        }
    }
}

/// Vertical text placement inside the label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    /// Flush against the top edge.
    #[default]
    Top,
    /// Centered.
    Center,
    /// Flush against the bottom edge.
    Bottom,
}

impl VerticalAlignment {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Center => "Center",
            Self::Bottom => "Bottom",
        }
    }

    fn from_str(text: &str) -> GuiResult<Self> {
        match text {
            "Top" => Ok(Self::Top),
            "Center" => Ok(Self::Center),
            "Bottom" => Ok(Self::Bottom),
            other => Err(GuiError::InvalidConfig(format!(
                "unknown vertical alignment '{other}'"
            ))),
        }
    }
}

/// A non-focusable text display widget.
///
/// While auto-sizing (the default), `set_text` and `set_text_size` resize
/// the widget to fit its content; an explicit `set_size` switches it to
/// fixed-size mode.
#[derive(Debug)]
pub struct Label {
    common: WidgetCommon,
    signals: SignalTable,
    style: RefCell<PropertyCache>,
    text: String,
    text_size: f32,
    horizontal_alignment: HorizontalAlignment,
    vertical_alignment: VerticalAlignment,
    auto_size: bool,
    last_click: Option<Instant>,
}

impl Label {
    /// The persistence type tag.
    pub const TYPE_NAME: &'static str = "Label";

    const SIGNALS: &'static [SignalKind] = &[SignalKind::Clicked, SignalKind::DoubleClicked];

    /// Creates an empty auto-sizing label.
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: WidgetCommon::new(),
            signals: SignalTable::new(Self::TYPE_NAME, Self::SIGNALS),
            style: RefCell::new(PropertyCache::new(Renderer::new())),
            text: String::new(),
            text_size: 13.0,
            horizontal_alignment: HorizontalAlignment::default(),
            vertical_alignment: VerticalAlignment::default(),
            auto_size: true,
            last_click: None,
        }
    }

    /// Creates a label showing the given text.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut label = Self::new();
        label.set_text(text);
        label
    }

    /// Replaces the displayed text, resizing the widget when auto-sizing.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.fit_to_text();
    }

    /// The displayed text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sets the character size in pixels.
    pub fn set_text_size(&mut self, size: f32) {
        self.text_size = size.max(1.0);
        self.fit_to_text();
    }

    /// The character size in pixels.
    #[must_use]
    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Sets the horizontal text placement.
    pub fn set_horizontal_alignment(&mut self, alignment: HorizontalAlignment) {
        self.horizontal_alignment = alignment;
    }

    /// The horizontal text placement.
    #[must_use]
    pub fn horizontal_alignment(&self) -> HorizontalAlignment {
        self.horizontal_alignment
    }

    /// Sets the vertical text placement.
    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        self.vertical_alignment = alignment;
    }

    /// The vertical text placement.
    #[must_use]
    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    /// Returns true while the label sizes itself to its content.
    #[must_use]
    pub fn auto_size(&self) -> bool {
        self.auto_size
    }

    /// Re-enables content-driven sizing.
    pub fn set_auto_size(&mut self, auto_size: bool) {
        self.auto_size = auto_size;
        self.fit_to_text();
    }

    /// Connects a listener for a supported signal.
    ///
    /// # Errors
    ///
    /// [`GuiError::UnknownSignal`] when the label does not emit the signal.
    pub fn on(
        &mut self,
        kind: SignalKind,
        handler: impl FnMut(&Signal) + 'static,
    ) -> GuiResult<()> {
        self.signals.connect(kind, handler)
    }

    /// The dimensions of the text block under the monospace model.
    #[allow(clippy::cast_precision_loss)]
    fn text_block_size(&self) -> Vec2 {
        let mut lines = 0usize;
        let mut widest = 0usize;
        for line in self.text.lines() {
            lines += 1;
            widest = widest.max(line.chars().count());
        }
        Vec2::new(
            widest as f32 * self.text_size * CHAR_WIDTH_RATIO,
            lines as f32 * self.text_size * LINE_HEIGHT_RATIO,
        )
    }

    fn fit_to_text(&mut self) {
        if self.auto_size {
            let block = self.text_block_size();
            self.common.set_size(Layout2d::constant(
                block.x + 2.0 * TEXT_PADDING,
                block.y + 2.0 * TEXT_PADDING,
            ));
        }
    }

    /// Shares another widget's renderer bag.
    pub fn set_renderer(&mut self, renderer: Renderer) {
        self.style.borrow_mut().set_renderer(renderer);
    }

    /// The renderer feeding this label's style cache.
    #[must_use]
    pub fn renderer(&self) -> Renderer {
        self.style.borrow().renderer().clone()
    }

    fn text_offset(&self) -> Vec2 {
        let inner = self.common.rect().size() - Vec2::new(2.0 * TEXT_PADDING, 2.0 * TEXT_PADDING);
        let block = self.text_block_size();
        let x = match self.horizontal_alignment {
            HorizontalAlignment::Left => 0.0,
            HorizontalAlignment::Center => (inner.x - block.x) / 2.0,
            HorizontalAlignment::Right => inner.x - block.x,
        };
        let y = match self.vertical_alignment {
            VerticalAlignment::Top => 0.0,
            VerticalAlignment::Center => (inner.y - block.y) / 2.0,
            VerticalAlignment::Bottom => inner.y - block.y,
        };
        Vec2::new(TEXT_PADDING + x, TEXT_PADDING + y)
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for Label {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates) {
        if !self.common.is_visible() {
            return;
        }
        let states = states.faded(self.common.opacity());
        let size = self.common.rect().size();
        let local = vellum_shared::Rect::from_pos_size(Vec2::ZERO, size);

        let mut style = self.style.borrow_mut();
        let background = style.color("BackgroundColor", Color::TRANSPARENT);
        if background.a > 0.0 {
            target.submit(RenderCommand::Rect {
                bounds: states.map(local),
                color: states.tint(background),
            });
        }
        let borders = style.outline("Borders", Outline::uniform(0.0));
        if borders.left > 0.0 {
            target.submit(RenderCommand::RectOutline {
                bounds: states.map(local),
                color: states.tint(style.color("BorderColor", Color::BLACK)),
                width: borders.left,
            });
        }

        let offset = self.text_offset();
        target.submit(RenderCommand::Text {
            text: self.text.clone(),
            pos: states.map(local).position() + offset,
            color: states.tint(style.color("TextColor", Color::BLACK)),
            font_size: self.text_size,
        });
    }
}

impl HitTestable for Label {
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool {
        self.common.contains_local(pos)
    }
}

impl FocusParticipant for Label {
    fn is_focusable(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    fn is_focused(&self) -> bool {
        false
    }
}

impl Widget for Label {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn common(&self) -> &WidgetCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut WidgetCommon {
        &mut self.common
    }

    /// An explicit size ends auto-sizing.
    fn set_size(&mut self, size: Layout2d) {
        self.auto_size = false;
        self.common.set_size(size);
    }

    fn mouse_moved(&mut self, _pos: Vec2) {
        self.common.flags_mut().set(WidgetFlags::HOVERED);
    }

    fn left_mouse_released(&mut self, pos: Vec2) {
        if !self.common.contains_local(pos) {
            self.last_click = None;
            return;
        }
        self.signals.emit(&Signal::Clicked { pos });
        let now = Instant::now();
        if let Some(previous) = self.last_click.take() {
            if now.duration_since(previous) <= DOUBLE_CLICK_WINDOW {
                self.signals.emit(&Signal::DoubleClicked {
                    path: vec![self.text.clone()],
                });
                return;
            }
        }
        self.last_click = Some(now);
    }

    fn left_mouse_button_no_longer_down(&mut self) {
        self.last_click = None;
    }

    fn clone_boxed(&self) -> Box<dyn Widget> {
        Box::new(Self {
            common: self.common.clone(),
            signals: self.signals.respec(),
            style: RefCell::new(self.style.borrow().clone()),
            text: self.text.clone(),
            text_size: self.text_size,
            horizontal_alignment: self.horizontal_alignment,
            vertical_alignment: self.vertical_alignment,
            auto_size: self.auto_size,
            last_click: None,
        })
    }

    fn save(&self) -> WidgetNode {
        let mut node = WidgetNode::new(Self::TYPE_NAME);
        self.common.save_into(&mut node);
        node.set("Text", NodeValue::Text(self.text.clone()));
        node.set("TextSize", NodeValue::Float(self.text_size));
        node.set("AutoSize", NodeValue::Bool(self.auto_size));
        node.set(
            "HorizontalAlignment",
            NodeValue::Text(self.horizontal_alignment.as_str().to_owned()),
        );
        node.set(
            "VerticalAlignment",
            NodeValue::Text(self.vertical_alignment.as_str().to_owned()),
        );
        node
    }

    fn load(&mut self, node: &WidgetNode, _factory: &WidgetFactory) -> GuiResult<()> {
        self.common.load_from(node)?;
        self.text = node.get_text("Text")?.to_owned();
        self.text_size = node.get_float("TextSize")?;
        self.horizontal_alignment = HorizontalAlignment::from_str(node.get_text("HorizontalAlignment")?)?;
        self.vertical_alignment = VerticalAlignment::from_str(node.get_text("VerticalAlignment")?)?;
        // AutoSize last: the saved size is authoritative for fixed labels
        // and recomputed for auto-sizing ones.
        self.auto_size = node.get_bool("AutoSize")?;
        self.fit_to_text();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_size_tracks_text() {
        let mut label = Label::new();
        label.set_text("hello");
        let size = label.common_mut().resolved_rect(Vec2::new(800.0, 600.0)).size();
        assert!((size.x - (5.0 * 13.0 * CHAR_WIDTH_RATIO + 4.0)).abs() < 1e-4);
        assert!((size.y - (13.0 * LINE_HEIGHT_RATIO + 4.0)).abs() < 1e-4);

        label.set_text("longer text");
        let grown = label.common_mut().resolved_rect(Vec2::new(800.0, 600.0)).size();
        assert!(grown.x > size.x);
    }

    #[test]
    fn test_explicit_size_disables_auto_size() {
        let mut label = Label::with_text("abc");
        Widget::set_size(&mut label, Layout2d::constant(200.0, 40.0));
        assert!(!label.auto_size());

        label.set_text("a much longer replacement text");
        let size = label.common_mut().resolved_rect(Vec2::new(800.0, 600.0)).size();
        assert_eq!(size, Vec2::new(200.0, 40.0));
    }

    #[test]
    fn test_double_click_emits_text_payload() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let mut label = Label::with_text("title");
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = Rc::clone(&seen);
        label
            .on(SignalKind::DoubleClicked, move |signal| {
                if let Signal::DoubleClicked { path } = signal {
                    sink.borrow_mut().extend(path.iter().cloned());
                }
            })
            .unwrap();

        let _ = label.common_mut().resolved_rect(Vec2::new(800.0, 600.0));
        let inside = Vec2::new(1.0, 1.0);
        label.left_mouse_released(inside);
        label.left_mouse_released(inside);
        assert_eq!(seen.borrow().as_slice(), ["title"]);
    }

    #[test]
    fn test_save_load_round_trip() {
        let factory = WidgetFactory::with_builtins();
        let mut label = Label::with_text("status");
        label.set_horizontal_alignment(HorizontalAlignment::Center);
        label.set_text_size(16.0);

        let node = label.save();
        let restored = factory.build(&node).unwrap();
        let restored_node = restored.save();
        assert_eq!(node, restored_node);
    }
}
