//! Scrollbar widget: track, draggable thumb and auto-repeating arrows.

use crate::layout::Layout2d;
use crate::persist::{NodeValue, WidgetFactory, WidgetNode};
use crate::render::{RenderCommand, RenderStates, RenderTarget};
use crate::signal::{Signal, SignalKind, SignalTable};
use crate::style::{PropertyCache, Renderer};
use crate::widget::core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon, WidgetFlags};
use std::cell::RefCell;
use std::time::{Duration, Instant};
use vellum_shared::{Color, GuiResult, Rect, Vec2};

/// Delay before a held arrow starts repeating, then the repeat interval.
const ARROW_REPEAT_DELAY: Duration = Duration::from_millis(500);
const ARROW_REPEAT_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_BREADTH: f32 = 16.0;
const DEFAULT_LENGTH: f32 = 160.0;

/// The region of the scrollbar a point falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    /// The groove between the arrows.
    Track,
    /// The draggable indicator.
    Thumb,
    /// The arrow that decreases the value.
    ArrowUp,
    /// The arrow that increases the value.
    ArrowDown,
}

/// Scroll direction of an arrow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepDirection {
    Decrease,
    Increase,
}

/// The pointer interaction the scrollbar is currently in. Exactly one
/// state holds at a time; release and forced cancel both return to Idle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Interaction {
    Idle,
    /// Dragging the thumb. `grab` is the major-axis offset between the
    /// press point and the thumb's leading edge, so the thumb does not
    /// jump under the pointer.
    ThumbDragging { grab: f32 },
    /// Holding an arrow; `next_step` is when the auto-repeat fires next.
    ArrowPressed {
        direction: StepDirection,
        next_step: Instant,
    },
}

/// Local geometry of the scrollbar parts for the current size and value.
#[derive(Debug, Clone, Copy)]
struct PartRects {
    track: Rect,
    thumb: Rect,
    arrow_up: Rect,
    arrow_down: Rect,
}

/// A scrollbar over an integer range.
///
/// Invariant: `0 <= value <= maximum.saturating_sub(viewport_size)`,
/// re-established by every setter in any call order.
#[derive(Debug)]
pub struct Scrollbar {
    common: WidgetCommon,
    signals: SignalTable,
    style: RefCell<PropertyCache>,
    value: u32,
    maximum: u32,
    viewport_size: u32,
    scroll_amount: u32,
    vertical: bool,
    orientation_locked: bool,
    auto_hide: bool,
    interaction: Interaction,
}

impl Scrollbar {
    /// The persistence type tag.
    pub const TYPE_NAME: &'static str = "Scrollbar";

    const SIGNALS: &'static [SignalKind] = &[SignalKind::ValueChanged];

    /// Creates a vertical scrollbar with maximum 10 and viewport 1.
    #[must_use]
    pub fn new() -> Self {
        let mut common = WidgetCommon::new();
        common.set_size(Layout2d::constant(DEFAULT_BREADTH, DEFAULT_LENGTH));
        Self {
            common,
            signals: SignalTable::new(Self::TYPE_NAME, Self::SIGNALS),
            style: RefCell::new(PropertyCache::new(Renderer::new())),
            value: 0,
            maximum: 10,
            viewport_size: 1,
            scroll_amount: 1,
            vertical: true,
            orientation_locked: false,
            auto_hide: true,
            interaction: Interaction::Idle,
        }
    }

    /// The largest value the invariant admits.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.maximum.saturating_sub(self.viewport_size)
    }

    /// Sets the value, clamped into range. Emits
    /// [`SignalKind::ValueChanged`] only when the stored value changes.
    pub fn set_value(&mut self, value: u32) {
        let clamped = value.min(self.max_value());
        if clamped != self.value {
            self.value = clamped;
            self.signals.emit(&Signal::ValueChanged { value: clamped });
        }
    }

    /// The current value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Sets the upper end of the range and re-clamps the value.
    pub fn set_maximum(&mut self, maximum: u32) {
        self.maximum = maximum;
        self.set_value(self.value);
    }

    /// The upper end of the range.
    #[must_use]
    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Sets how much of the range is visible at once and re-clamps.
    pub fn set_viewport_size(&mut self, viewport_size: u32) {
        self.viewport_size = viewport_size;
        self.set_value(self.value);
    }

    /// The visible span of the range.
    #[must_use]
    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    /// Sets the step applied by arrows and wheel scrolling.
    pub fn set_scroll_amount(&mut self, amount: u32) {
        self.scroll_amount = amount.max(1);
    }

    /// The step applied by arrows and wheel scrolling.
    #[must_use]
    pub fn scroll_amount(&self) -> u32 {
        self.scroll_amount
    }

    /// Hides the scrollbar while the whole range fits the viewport.
    pub fn set_auto_hide(&mut self, auto_hide: bool) {
        self.auto_hide = auto_hide;
    }

    /// Returns true when auto-hide is on.
    #[must_use]
    pub fn auto_hide(&self) -> bool {
        self.auto_hide
    }

    /// Forces the orientation, swapping the size expression when it flips.
    pub fn set_vertical_scroll(&mut self, vertical: bool) {
        self.orientation_locked = true;
        if vertical != self.vertical {
            self.vertical = vertical;
            let swapped = self.common.size().clone().swapped();
            self.common.set_size(swapped);
        }
    }

    /// Returns true for a vertical scrollbar.
    #[must_use]
    pub fn vertical_scroll(&self) -> bool {
        self.vertical
    }

    /// Returns true if the scrollbar is currently drawn and hit-testable.
    #[must_use]
    pub fn is_shown(&self) -> bool {
        !self.auto_hide || self.maximum > self.viewport_size
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

    /// The renderer feeding this scrollbar's style cache.
    #[must_use]
    pub fn renderer(&self) -> Renderer {
        self.style.borrow().renderer().clone()
    }

    /// A deep copy with all settings and the current value, but no
    /// listeners and no in-flight interaction.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            common: self.common.clone(),
            signals: self.signals.respec(),
            style: RefCell::new(self.style.borrow().clone()),
            value: self.value,
            maximum: self.maximum,
            viewport_size: self.viewport_size,
            scroll_amount: self.scroll_amount,
            vertical: self.vertical,
            orientation_locked: self.orientation_locked,
            auto_hide: self.auto_hide,
            interaction: Interaction::Idle,
        }
    }

    fn major(&self, v: Vec2) -> f32 {
        if self.vertical {
            v.y
        } else {
            v.x
        }
    }

    fn from_major(&self, along: f32, across: f32, extent_along: f32, extent_across: f32) -> Rect {
        if self.vertical {
            Rect::new(across, along, extent_across, extent_along)
        } else {
            Rect::new(along, across, extent_along, extent_across)
        }
    }

    /// Lays out track, thumb and arrows in local space for the resolved
    /// size. Arrows are square (breadth by breadth); the thumb length is
    /// proportional to `viewport_size / maximum` and fills the track when
    /// nothing can scroll.
    fn part_rects(&self) -> PartRects {
        let size = self.common.rect().size();
        let length = self.major(size);
        let breadth = self.major(Vec2::new(size.y, size.x));
        let arrow_len = breadth.min(length / 2.0);

        let track_start = arrow_len;
        let track_len = (length - 2.0 * arrow_len).max(0.0);

        #[allow(clippy::cast_precision_loss)]
        let thumb_len = if self.maximum > self.viewport_size {
            (track_len * self.viewport_size as f32 / self.maximum as f32).max(breadth.min(track_len))
        } else {
            track_len
        };
        #[allow(clippy::cast_precision_loss)]
        let thumb_start = if self.max_value() == 0 {
            track_start
        } else {
            track_start
                + (track_len - thumb_len) * self.value as f32 / self.max_value() as f32
        };

        PartRects {
            track: self.from_major(track_start, 0.0, track_len, breadth),
            thumb: self.from_major(thumb_start, 0.0, thumb_len, breadth),
            arrow_up: self.from_major(0.0, 0.0, arrow_len, breadth),
            arrow_down: self.from_major(length - arrow_len, 0.0, arrow_len, breadth),
        }
    }

    /// Classifies a local point already known to be on the widget.
    #[must_use]
    pub fn part_at(&self, pos: Vec2) -> Part {
        let rects = self.part_rects();
        if rects.arrow_up.contains(pos) {
            Part::ArrowUp
        } else if rects.arrow_down.contains(pos) {
            Part::ArrowDown
        } else if rects.thumb.contains(pos) {
            Part::Thumb
        } else {
            Part::Track
        }
    }

    fn step(&mut self, direction: StepDirection) {
        match direction {
            StepDirection::Decrease => self.set_value(self.value.saturating_sub(self.scroll_amount)),
            StepDirection::Increase => self.set_value(self.value.saturating_add(self.scroll_amount)),
        }
    }

    fn drag_to(&mut self, pos: Vec2, grab: f32) {
        let rects = self.part_rects();
        let track_start = self.major(rects.track.position());
        let track_len = self.major(rects.track.size());
        let thumb_len = self.major(rects.thumb.size());
        let travel = track_len - thumb_len;
        if travel <= 0.0 || self.max_value() == 0 {
            return;
        }
        let ratio = ((self.major(pos) - track_start - grab) / travel).clamp(0.0, 1.0);
        #[allow(clippy::cast_precision_loss)]
        #[allow(clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        self.set_value((ratio * self.max_value() as f32).round() as u32);
    }
}

impl Default for Scrollbar {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for Scrollbar {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates) {
        if !self.common.is_visible() || !self.is_shown() {
            return;
        }
        let states = states.faded(self.common.opacity());
        let rects = self.part_rects();
        let mut style = self.style.borrow_mut();

        target.submit(RenderCommand::Rect {
            bounds: states.map(rects.track),
            color: states.tint(style.color("TrackColor", Color::rgb(0.9, 0.9, 0.9))),
        });
        let arrow = states.tint(style.color("ArrowBackgroundColor", Color::rgb(0.8, 0.8, 0.8)));
        target.submit(RenderCommand::Rect {
            bounds: states.map(rects.arrow_up),
            color: arrow,
        });
        target.submit(RenderCommand::Rect {
            bounds: states.map(rects.arrow_down),
            color: arrow,
        });
        target.submit(RenderCommand::Rect {
            bounds: states.map(rects.thumb),
            color: states.tint(style.color("ThumbColor", Color::rgb(0.6, 0.6, 0.6))),
        });
    }
}

impl HitTestable for Scrollbar {
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool {
        self.is_shown() && self.common.contains_local(pos)
    }
}

impl FocusParticipant for Scrollbar {
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

impl Widget for Scrollbar {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn common(&self) -> &WidgetCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut WidgetCommon {
        &mut self.common
    }

    /// An explicit size re-derives the orientation from its aspect ratio
    /// unless `set_vertical_scroll` pinned it.
    fn set_size(&mut self, size: Layout2d) {
        self.common.set_size(size);
        if !self.orientation_locked {
            let parent = self.common.rect().size();
            let resolved = self.common.resolved_rect(parent);
            self.vertical = resolved.height >= resolved.width;
        }
    }

    fn left_mouse_pressed(&mut self, pos: Vec2) {
        let rects = self.part_rects();
        match self.part_at(pos) {
            Part::Thumb => {
                let grab = self.major(pos) - self.major(rects.thumb.position());
                self.interaction = Interaction::ThumbDragging { grab };
            }
            Part::ArrowUp => {
                self.step(StepDirection::Decrease);
                self.interaction = Interaction::ArrowPressed {
                    direction: StepDirection::Decrease,
                    next_step: Instant::now() + ARROW_REPEAT_DELAY,
                };
            }
            Part::ArrowDown => {
                self.step(StepDirection::Increase);
                self.interaction = Interaction::ArrowPressed {
                    direction: StepDirection::Increase,
                    next_step: Instant::now() + ARROW_REPEAT_DELAY,
                };
            }
            Part::Track => {
                // Page toward the press point by one viewport.
                if self.major(pos) < self.major(rects.thumb.position()) {
                    self.set_value(self.value.saturating_sub(self.viewport_size.max(1)));
                } else {
                    self.set_value(self.value.saturating_add(self.viewport_size.max(1)));
                }
            }
        }
    }

    fn mouse_moved(&mut self, pos: Vec2) {
        self.common.flags_mut().set(WidgetFlags::HOVERED);
        if let Interaction::ThumbDragging { grab } = self.interaction {
            self.drag_to(pos, grab);
        }
    }

    fn left_mouse_released(&mut self, _pos: Vec2) {
        self.interaction = Interaction::Idle;
    }

    fn left_mouse_button_no_longer_down(&mut self) {
        self.interaction = Interaction::Idle;
    }

    fn scrolled(&mut self, delta: f32, _pos: Vec2) -> bool {
        if self.max_value() == 0 {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        #[allow(clippy::cast_possible_truncation)]
        #[allow(clippy::cast_sign_loss)]
        let step = (delta.abs() * self.scroll_amount as f32).round().max(1.0) as u32;
        if delta > 0.0 {
            self.set_value(self.value.saturating_sub(step));
        } else {
            self.set_value(self.value.saturating_add(step));
        }
        true
    }

    /// Lazily fires auto-repeat for a held arrow. The timer only advances
    /// here; no background thread is involved.
    fn update(&mut self, now: Instant) {
        if let Interaction::ArrowPressed {
            direction,
            mut next_step,
        } = self.interaction
        {
            while now >= next_step {
                next_step += ARROW_REPEAT_INTERVAL;
                self.step(direction);
            }
            self.interaction = Interaction::ArrowPressed {
                direction,
                next_step,
            };
        }
    }

    fn clone_boxed(&self) -> Box<dyn Widget> {
        Box::new(self.detached_copy())
    }

    fn save(&self) -> WidgetNode {
        let mut node = WidgetNode::new(Self::TYPE_NAME);
        self.common.save_into(&mut node);
        node.set("Value", NodeValue::Int(i64::from(self.value)));
        node.set("Maximum", NodeValue::Int(i64::from(self.maximum)));
        node.set("ViewportSize", NodeValue::Int(i64::from(self.viewport_size)));
        node.set("ScrollAmount", NodeValue::Int(i64::from(self.scroll_amount)));
        node.set("AutoHide", NodeValue::Bool(self.auto_hide));
        node.set("VerticalScroll", NodeValue::Bool(self.vertical));
        node
    }

    fn load(&mut self, node: &WidgetNode, _factory: &WidgetFactory) -> GuiResult<()> {
        self.common.load_from(node)?;
        self.auto_hide = node.get_bool("AutoHide")?;
        self.vertical = node.get_bool("VerticalScroll")?;
        self.orientation_locked = true;
        #[allow(clippy::cast_sign_loss)]
        #[allow(clippy::cast_possible_truncation)]
        {
            self.maximum = node.get_int("Maximum")? as u32;
            self.viewport_size = node.get_int("ViewportSize")? as u32;
            self.scroll_amount = (node.get_int("ScrollAmount")? as u32).max(1);
            self.value = (node.get_int("Value")? as u32).min(self.max_value());
        }
        Ok(())
    }
}
