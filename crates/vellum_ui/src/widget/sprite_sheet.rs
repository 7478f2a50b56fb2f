//! Sprite sheet widget: shows one cell of a grid-partitioned texture.

use crate::layout::Layout2d;
use crate::persist::{NodeValue, WidgetFactory, WidgetNode};
use crate::render::{RenderCommand, RenderStates, RenderTarget, TextureHandle};
use crate::widget::core::{Drawable, FocusParticipant, HitTestable, Widget, WidgetCommon};
use vellum_shared::{Color, GuiResult, Vec2};

/// A widget that displays a single cell of a texture laid out as a grid.
///
/// The cell size is `texture_size / (columns, rows)`; until an explicit
/// size is set, the widget sizes itself to one cell.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    common: WidgetCommon,
    texture: Option<TextureHandle>,
    rows: u32,
    columns: u32,
    visible_cell: (u32, u32),
    size_set: bool,
}

impl SpriteSheet {
    /// The persistence type tag.
    pub const TYPE_NAME: &'static str = "SpriteSheet";

    /// Creates an empty 1x1 sprite sheet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            common: WidgetCommon::new(),
            texture: None,
            rows: 1,
            columns: 1,
            visible_cell: (0, 0),
            size_set: false,
        }
    }

    /// Sets the texture the grid partitions.
    pub fn set_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
        self.fit_to_cell();
    }

    /// The texture, if one was set.
    #[must_use]
    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Sets the grid partition. Zero is treated as one.
    pub fn set_grid(&mut self, rows: u32, columns: u32) {
        self.rows = rows.max(1);
        self.columns = columns.max(1);
        self.clamp_cell();
        self.fit_to_cell();
    }

    /// Number of grid rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of grid columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Selects the cell to show, clamped into the grid.
    pub fn set_visible_cell(&mut self, row: u32, column: u32) {
        self.visible_cell = (row, column);
        self.clamp_cell();
    }

    /// The currently shown (row, column).
    #[must_use]
    pub fn visible_cell(&self) -> (u32, u32) {
        self.visible_cell
    }

    /// The pixel size of one cell, zero without a texture.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_size(&self) -> Vec2 {
        self.texture.as_ref().map_or(Vec2::ZERO, |texture| {
            Vec2::new(
                texture.size.x / self.columns as f32,
                texture.size.y / self.rows as f32,
            )
        })
    }

    fn clamp_cell(&mut self) {
        self.visible_cell.0 = self.visible_cell.0.min(self.rows - 1);
        self.visible_cell.1 = self.visible_cell.1.min(self.columns - 1);
    }

    fn fit_to_cell(&mut self) {
        if !self.size_set {
            let cell = self.cell_size();
            self.common.set_size(Layout2d::constant(cell.x, cell.y));
        }
    }

    /// Normalized texture coordinates of the visible cell.
    fn cell_uv(&self) -> [f32; 4] {
        #[allow(clippy::cast_precision_loss)]
        let (rows, cols) = (self.rows as f32, self.columns as f32);
        #[allow(clippy::cast_precision_loss)]
        let (row, col) = (self.visible_cell.0 as f32, self.visible_cell.1 as f32);
        [col / cols, row / rows, (col + 1.0) / cols, (row + 1.0) / rows]
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drawable for SpriteSheet {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates) {
        if !self.common.is_visible() {
            return;
        }
        let Some(texture) = &self.texture else {
            return;
        };
        let states = states.faded(self.common.opacity());
        let local = vellum_shared::Rect::from_pos_size(Vec2::ZERO, self.common.rect().size());
        target.submit(RenderCommand::Texture {
            bounds: states.map(local),
            texture_id: texture.id,
            uv: self.cell_uv(),
            color: states.tint(Color::WHITE),
        });
    }
}

impl HitTestable for SpriteSheet {
    fn is_mouse_on_widget(&self, pos: Vec2) -> bool {
        self.common.contains_local(pos)
    }
}

impl FocusParticipant for SpriteSheet {
    fn is_focusable(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    fn is_focused(&self) -> bool {
        false
    }
}

impl Widget for SpriteSheet {
    fn type_name(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn common(&self) -> &WidgetCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut WidgetCommon {
        &mut self.common
    }

    /// An explicit size stops cell-driven sizing.
    fn set_size(&mut self, size: Layout2d) {
        self.size_set = true;
        self.common.set_size(size);
    }

    fn clone_boxed(&self) -> Box<dyn Widget> {
        Box::new(self.clone())
    }

    fn save(&self) -> WidgetNode {
        let mut node = WidgetNode::new(Self::TYPE_NAME);
        self.common.save_into(&mut node);
        node.set("Rows", NodeValue::Int(i64::from(self.rows)));
        node.set("Columns", NodeValue::Int(i64::from(self.columns)));
        node.set("VisibleRow", NodeValue::Int(i64::from(self.visible_cell.0)));
        node.set("VisibleColumn", NodeValue::Int(i64::from(self.visible_cell.1)));
        node.set("SizeSet", NodeValue::Bool(self.size_set));
        if let Some(texture) = &self.texture {
            node.set("TextureId", NodeValue::Int(i64::try_from(texture.id).unwrap_or(0)));
            node.set("TextureWidth", NodeValue::Float(texture.size.x));
            node.set("TextureHeight", NodeValue::Float(texture.size.y));
        }
        node
    }

    fn load(&mut self, node: &WidgetNode, _factory: &WidgetFactory) -> GuiResult<()> {
        self.common.load_from(node)?;
        self.size_set = node.get_bool("SizeSet")?;
        #[allow(clippy::cast_sign_loss)]
        #[allow(clippy::cast_possible_truncation)]
        {
            self.rows = (node.get_int("Rows")? as u32).max(1);
            self.columns = (node.get_int("Columns")? as u32).max(1);
            self.visible_cell = (
                node.get_int("VisibleRow")? as u32,
                node.get_int("VisibleColumn")? as u32,
            );
        }
        self.clamp_cell();
        if node.get("TextureId").is_some() {
            #[allow(clippy::cast_sign_loss)]
            let id = node.get_int("TextureId")? as u64;
            self.texture = Some(TextureHandle {
                id,
                size: Vec2::new(
                    node.get_float("TextureWidth")?,
                    node.get_float("TextureHeight")?,
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SpriteSheet {
        let mut sheet = SpriteSheet::new();
        sheet.set_texture(TextureHandle {
            id: 7,
            size: Vec2::new(128.0, 96.0),
        });
        sheet.set_grid(3, 4);
        sheet
    }

    #[test]
    fn test_cell_size_partitions_texture() {
        let sheet = sheet();
        assert_eq!(sheet.cell_size(), Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_auto_sizes_to_one_cell_until_explicit_size() {
        let mut sheet = sheet();
        let size = sheet.common_mut().resolved_rect(Vec2::new(800.0, 600.0)).size();
        assert_eq!(size, Vec2::new(32.0, 32.0));

        Widget::set_size(&mut sheet, Layout2d::constant(64.0, 64.0));
        sheet.set_grid(1, 1);
        let size = sheet.common_mut().resolved_rect(Vec2::new(800.0, 600.0)).size();
        assert_eq!(size, Vec2::new(64.0, 64.0));
    }

    #[test]
    fn test_visible_cell_clamped() {
        let mut sheet = sheet();
        sheet.set_visible_cell(10, 10);
        assert_eq!(sheet.visible_cell(), (2, 3));

        sheet.set_visible_cell(1, 2);
        sheet.set_grid(2, 2);
        assert_eq!(sheet.visible_cell(), (1, 1));
    }

    #[test]
    fn test_uv_covers_selected_cell() {
        let mut sheet = sheet();
        sheet.set_visible_cell(1, 2);
        let [u0, v0, u1, v1] = sheet.cell_uv();
        assert!((u0 - 0.5).abs() < 1e-6);
        assert!((v0 - 1.0 / 3.0).abs() < 1e-6);
        assert!((u1 - 0.75).abs() < 1e-6);
        assert!((v1 - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_save_load_round_trip() {
        let factory = WidgetFactory::with_builtins();
        let mut sheet = sheet();
        sheet.set_visible_cell(2, 1);
        let node = sheet.save();
        let restored = factory.build(&node).unwrap();
        assert_eq!(node, restored.save());
    }
}
